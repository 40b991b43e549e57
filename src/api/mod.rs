use axum::{
    Router,
    routing::{delete, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::pipeline::Pipeline;
use crate::youtube::VideoPlatform;

pub mod handlers;
pub mod models;

pub fn create_router<P: VideoPlatform + 'static>(pipeline: Arc<Pipeline<P>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/search", post(handlers::search_handler::<P>))
        .route("/api/cache", delete(handlers::clear_cache_handler::<P>))
        .with_state(pipeline)
        .layer(cors)
}
