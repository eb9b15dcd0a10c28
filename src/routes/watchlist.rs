use axum::{routing::{delete, get}, Router};

use crate::app::AppState;
use crate::handler::watchlist::{
    add_to_watchlist, check_watchlist, get_watchlist, list_watchlists, remove_from_watchlist,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_watchlists))
        .route("/:watchlist", get(get_watchlist).post(add_to_watchlist))
        .route("/:watchlist/check", get(check_watchlist))
        .route("/:watchlist/:date/:company_code", delete(remove_from_watchlist))
}
