use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;
use std::time::Instant;

use crate::error::Error;
use crate::pipeline::Pipeline;
use crate::youtube::VideoPlatform;

use super::models::{ErrorResponse, SearchBody, SearchResponse};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(err: Error) -> ApiError {
    let status = match &err {
        Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        Error::Upstream { .. } | Error::UpstreamStatus { .. } => StatusCode::BAD_GATEWAY,
        Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status != StatusCode::BAD_REQUEST {
        tracing::error!(error = %err, "search request failed");
    }
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

pub async fn search_handler<P: VideoPlatform + 'static>(
    State(pipeline): State<Arc<Pipeline<P>>>,
    Json(body): Json<SearchBody>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = Instant::now();

    let request = body.into_request().map_err(error_response)?;
    let result = pipeline.run(&request).await.map_err(error_response)?;

    Ok(Json(SearchResponse {
        total_results: result.len(),
        result: (*result).clone(),
        processing_time_ms: start.elapsed().as_millis(),
    }))
}

pub async fn clear_cache_handler<P: VideoPlatform + 'static>(
    State(pipeline): State<Arc<Pipeline<P>>>,
) -> StatusCode {
    pipeline.cache().clear();
    tracing::info!("query cache cleared");
    StatusCode::NO_CONTENT
}
