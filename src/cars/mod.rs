pub mod export;
pub mod filters;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use repo::CarRepository;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::car_routes()
}
