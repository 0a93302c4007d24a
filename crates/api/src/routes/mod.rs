pub mod auth;
pub mod carousel;
pub mod events;
pub mod health;
pub mod investments;
pub mod properties;
pub mod site;
pub mod storage;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use serde::Serialize;
use tower_http::limit::RequestBodyLimitLayer;

use crate::state::AppState;

/// Body of every delete response, whether or not the row existed.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub success: bool,
}

impl Deleted {
    pub const OK: Deleted = Deleted { success: true };
}

/// Assemble the full router with all route groups.
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config().max_body_bytes;
    Router::new()
        .merge(health::routes())
        .merge(carousel::routes())
        .merge(investments::routes())
        .merge(properties::routes())
        .merge(site::routes())
        .merge(storage::routes())
        .merge(auth::routes())
        .merge(events::routes())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body))
        .with_state(state)
}
