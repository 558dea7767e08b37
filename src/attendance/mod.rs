pub mod calendar;
mod dto;
pub mod handlers;
pub mod model;
pub mod services;
pub mod store;
pub mod summary;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
