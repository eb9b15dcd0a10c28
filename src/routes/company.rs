use axum::{routing::get, Router};

use crate::app::AppState;
use crate::handler::company_historical_data::{list_historical_stats, upsert_historical_stats};
use crate::handler::company_master::{create_company, get_company, list_companies, top_companies};
use crate::handler::ohlcv::get_ohlcv;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_companies).post(create_company))
        .route("/top5", get(top_companies))
        .route("/:company_code", get(get_company))
        .route(
            "/:company_code/historical",
            get(list_historical_stats).put(upsert_historical_stats),
        )
        .route("/:company_code/ohlcv", get(get_ohlcv))
}
