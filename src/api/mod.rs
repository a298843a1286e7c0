pub mod handlers;

use axum::{routing::post, Router};
use std::sync::Arc;

use crate::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/native/validate", post(handlers::handle_validate))
        .route("/native/targeting", post(handlers::handle_targeting))
        .route("/native/message", post(handlers::handle_message))
        .with_state(state)
}
