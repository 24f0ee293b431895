//! Photo upload HTTP handlers.
//!
//! ```text
//! POST /api/photos
//! POST /api/upload
//! ```
//!
//! Uploads are raw image bodies with a `content-type` header, capped at 5 MB
//! and restricted to JPEG, PNG, and WebP. Both routes share one
//! implementation; `/api/upload` is kept for older clients.

use actix_web::http::header;
use actix_web::{HttpRequest, post, web};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::ports::StorageError;
use crate::domain::upload::validate_upload;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Stored photo reference returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoBody {
    /// Store-internal key.
    pub key: String,
    /// Public location for the photo.
    pub url: String,
    /// Stored content type.
    pub content_type: String,
}

fn map_storage_error(error: StorageError) -> Error {
    match error {
        StorageError::Io { message } => {
            Error::internal(format!("object store write failed: {message}"))
        }
        StorageError::InvalidKey { message } => {
            Error::internal(format!("object store rejected the key: {message}"))
        }
    }
}

async fn store_photo(
    state: &HttpState,
    session: &SessionContext,
    req: &HttpRequest,
    bytes: &[u8],
) -> Result<PhotoBody, Error> {
    session.acting_user(state).await?;

    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(';').next().unwrap_or(value).trim().to_owned())
        .ok_or_else(|| Error::invalid_request("content-type header is required"))?;

    let format = validate_upload(&content_type, bytes)?;
    let key = format!("photos/{}.{}", Uuid::new_v4(), format.extension());
    let stored = state
        .storage
        .put(&key, format.content_type(), bytes)
        .await
        .map_err(map_storage_error)?;

    Ok(PhotoBody {
        key: stored.key,
        url: stored.url,
        content_type: format.content_type().to_owned(),
    })
}

/// Upload a photo.
#[utoipa::path(
    post,
    path = "/api/photos",
    request_body(content = Vec<u8>, description = "Raw photo bytes", content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Photo stored", body = PhotoBody),
        (status = 400, description = "Wrong type, size, or content", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["photos"],
    operation_id = "uploadPhoto",
    security(("SessionCookie" = []))
)]
#[post("/photos")]
pub async fn upload_photo(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    bytes: web::Bytes,
) -> ApiResult<web::Json<PhotoBody>> {
    let photo = store_photo(&state, &session, &req, &bytes).await?;
    Ok(web::Json(photo))
}

/// Upload a photo (legacy route).
#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = Vec<u8>, description = "Raw photo bytes", content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Photo stored", body = PhotoBody),
        (status = 400, description = "Wrong type, size, or content", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["photos"],
    operation_id = "uploadPhotoLegacy",
    security(("SessionCookie" = []))
)]
#[post("/upload")]
pub async fn upload_photo_legacy(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    bytes: web::Bytes,
) -> ApiResult<web::Json<PhotoBody>> {
    let photo = store_photo(&state, &session, &req, &bytes).await?;
    Ok(web::Json(photo))
}
