use axum::{routing::get, Router};

use crate::app::AppState;
use crate::handler::sentiment::get_sentiment;

pub fn router() -> Router<AppState> {
    Router::new().route("/:ticker", get(get_sentiment))
}
