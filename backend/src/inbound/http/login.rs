//! Login HTTP handlers.
//!
//! ```text
//! POST /api/login/{token}
//! GET  /api/login/{token}
//! ```
//!
//! A valid token secret establishes the acting user for the session. The
//! POST variant is for API clients; the GET variant serves links embedded in
//! notifications and redirects to the token's destination.

use actix_web::http::header;
use actix_web::{HttpResponse, get, post, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Successful login payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponseBody {
    /// The authenticated user.
    #[schema(format = "uuid")]
    pub user_id: String,
    /// Redirect destination carried by the token, if any.
    pub destination: Option<String>,
}

/// Authenticate with a token secret, JSON flavour.
#[utoipa::path(
    post,
    path = "/api/login/{token}",
    params(("token" = String, Path, description = "Raw token secret")),
    responses(
        (status = 200, description = "Session established", body = LoginResponseBody),
        (status = 401, description = "Token did not resolve", body = ErrorSchema)
    ),
    tags = ["login"],
    operation_id = "login"
)]
#[post("/login/{token}")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<LoginResponseBody>> {
    let login = state
        .login
        .redeem(&path.into_inner())
        .await?
        .ok_or_else(|| Error::unauthorized("login token did not resolve"))?;
    session.persist_user(login.user_id)?;
    Ok(web::Json(LoginResponseBody {
        user_id: login.user_id.to_string(),
        destination: login.destination,
    }))
}

/// Authenticate with a token secret, link flavour.
///
/// Redirects to the token's destination (or `/`) on success and to the
/// static error view otherwise; link-driven endpoints never surface JSON
/// errors.
#[utoipa::path(
    get,
    path = "/api/login/{token}",
    params(("token" = String, Path, description = "Raw token secret")),
    responses((status = 303, description = "Redirects to the destination or an error view")),
    tags = ["login"],
    operation_id = "loginLink"
)]
#[get("/login/{token}")]
pub async fn login_link(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> HttpResponse {
    let location = match state.login.redeem(&path.into_inner()).await {
        Ok(Some(resolved)) => match session.persist_user(resolved.user_id) {
            Ok(()) => resolved.destination.unwrap_or_else(|| "/".to_owned()),
            Err(error) => {
                tracing::error!(error = %error, "failed to persist login session");
                "/login/error".to_owned()
            }
        },
        Ok(None) => "/login/error".to_owned(),
        Err(error) => {
            tracing::error!(error = %error, "login token redemption failed");
            "/login/error".to_owned()
        }
    };
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}
