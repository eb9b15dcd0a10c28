use axum::{routing::get, Router};

use crate::app::AppState;
use crate::handler::historical_data::tick_data;
use crate::utils::config::RewriteRule;
use crate::utils::upstream::UpstreamError;

mod company;
mod gtt_prediction;
mod market_data;
mod prediction;
mod rewrite;
mod root;
mod sentiment;
mod watchlist;

pub fn build_routes(rewrites: &[RewriteRule]) -> Result<Router<AppState>, UpstreamError> {
    Ok(Router::new()
        // 根路径与健康检查
        .merge(root::router())
        // 业务 API
        .nest("/api/companies", company::router())
        .nest("/api/watchlist", watchlist::router())
        .nest("/api/predictions", prediction::router())
        .nest("/api/gtt-predictions", gtt_prediction::router())
        .nest("/api/market-data", market_data::router())
        .nest("/api/sentiment", sentiment::router())
        .route("/api/historical-data", get(tick_data))
        // 转发到其他后端进程
        .merge(rewrite::router(rewrites)?))
}
