use axum::{routing::get, Router};

use crate::app::AppState;
use crate::handler::prediction::{
    batch_predictions, company_predictions, create_prediction, lookup_predictions,
    prediction_at, prediction_companies, prediction_health, prediction_history,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(lookup_predictions).post(create_prediction))
        .route("/health", get(prediction_health))
        .route("/companies", get(prediction_companies))
        .route("/batch/multiple", get(batch_predictions))
        .route("/:company", get(company_predictions))
        .route("/:company/history", get(prediction_history))
        .route("/:company/:timestamp", get(prediction_at))
}
