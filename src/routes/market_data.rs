use axum::{routing::{get, post}, Router};

use crate::app::AppState;
use crate::handler::market_data::{subscribe, subscriptions};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/subscribe", post(subscribe))
        .route("/subscriptions", get(subscriptions))
}
