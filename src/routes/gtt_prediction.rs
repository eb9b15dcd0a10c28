use axum::{routing::get, Router};

use crate::app::AppState;
use crate::handler::gtt_prediction::{gtt_health, gtt_predictions};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(gtt_predictions))
        .route("/health", get(gtt_health))
}
