//! HTTP handler for the image upload endpoint.

use axum::{
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{HeaderMap, Method, StatusCode},
};
use tracing::info;

use crate::AppState;
use crate::api::models::upload::ImageUpload;
use crate::errors::{Error, Result};

/// Dispatch on method: `GET` is a liveness check, `POST` uploads, everything else is 405.
#[tracing::instrument(skip_all, fields(method = %method))]
pub async fn handle_request(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<StatusCode> {
    match method {
        Method::GET => Ok(StatusCode::OK),
        Method::POST => upload_image(&state, &headers, body).await,
        method => Err(Error::MethodNotAllowed { method }),
    }
}

/// Validate upload headers and write the body to the configured bucket.
///
/// Every validation failure returns before the store is touched. A successful validation leads to
/// exactly one store write, whose outcome decides between 200 and 500.
async fn upload_image(state: &AppState, headers: &HeaderMap, body: std::result::Result<Bytes, BytesRejection>) -> Result<StatusCode> {
    let upload = ImageUpload::from_headers(headers)?;

    let content = body.map_err(|rejection| match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => Error::PayloadTooLarge {
            limit: state.config.max_upload_size,
        },
        _ => Error::BadRequest {
            message: format!("Failed to read request body: {}", rejection.body_text()),
        },
    })?;

    let bucket = &state.config.bucket_name;
    let size = content.len();

    state.store.write(bucket, &upload.filename, content).await?;

    info!(bucket = %bucket, key = %upload.filename, size, "Stored uploaded image");
    Ok(StatusCode::OK)
}
