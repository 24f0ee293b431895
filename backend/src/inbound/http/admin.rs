//! Administrator HTTP handlers.
//!
//! ```text
//! POST /api/admin/users
//! POST /api/admin/login-links
//! ```
//!
//! Gated by the `ADMIN_TOKEN` environment secret presented in the
//! `x-admin-token` header. When the secret is not configured the endpoints
//! report service-unavailable rather than crashing request handling.

use actix_web::{HttpRequest, post, web};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    CreateUserRequest, Error, IssueTokenRequest, User,
};
use crate::domain::user::{DisplayName, PhoneNumber, UserRole};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field, parse_user_id};

const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

fn require_admin(state: &HttpState, req: &HttpRequest) -> Result<(), Error> {
    let configured = state
        .admin_token
        .as_deref()
        .ok_or_else(|| Error::service_unavailable("admin access is not configured"))?;
    let presented = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| Error::unauthorized("missing admin token"))?;
    if presented == configured {
        Ok(())
    } else {
        Err(Error::forbidden("admin token does not match"))
    }
}

/// Request payload for creating a user.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequestBody {
    /// Display name.
    pub display_name: String,
    /// `owner` or `friend`; immutable afterwards.
    pub role: String,
    /// Optional dialable phone number.
    pub phone_number: Option<String>,
    /// Optional free-text address.
    pub address_text: Option<String>,
}

/// User representation returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    /// Stable identifier.
    #[schema(format = "uuid")]
    pub id: String,
    /// Display name.
    pub display_name: String,
    /// `owner` or `friend`.
    pub role: String,
    /// Phone number, if recorded.
    pub phone_number: Option<String>,
    /// Free-text address, if recorded.
    pub address_text: Option<String>,
}

impl From<User> for UserBody {
    fn from(value: User) -> Self {
        Self {
            id: value.id().to_string(),
            display_name: value.display_name().as_ref().to_owned(),
            role: value.role().as_str().to_owned(),
            phone_number: value.phone_number().map(|p| p.as_ref().to_owned()),
            address_text: value.address_text().map(str::to_owned),
        }
    }
}

/// Request payload for issuing a login link.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueLoginLinkRequestBody {
    /// The user the link authenticates as.
    #[schema(format = "uuid")]
    pub user_id: String,
    /// Optional post-login redirect destination.
    pub destination: Option<String>,
    /// Optional validity in minutes.
    pub ttl_minutes: Option<i64>,
    /// Whether the first redemption consumes the token. Defaults to true.
    pub single_use: Option<bool>,
}

/// A freshly issued login link.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginLinkBody {
    /// Raw token secret; shown exactly once.
    pub token: String,
    /// Ready-to-share login path embedding the secret.
    pub login_path: String,
    /// Expiry, RFC 3339, when the token is time-bounded.
    #[schema(format = "date-time")]
    pub expires_at: Option<String>,
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUserRequestBody,
    responses(
        (status = 200, description = "User created", body = UserBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Missing admin token", body = ErrorSchema),
        (status = 403, description = "Admin token mismatch", body = ErrorSchema),
        (status = 503, description = "Admin access not configured", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "createUser"
)]
#[post("/admin/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    req: HttpRequest,
    payload: web::Json<CreateUserRequestBody>,
) -> ApiResult<web::Json<UserBody>> {
    require_admin(&state, &req)?;
    let body = payload.into_inner();

    let display_name = DisplayName::new(body.display_name.clone())
        .map_err(|err| invalid_field(FieldName::new("displayName"), err, &body.display_name))?;
    let role = UserRole::parse(&body.role)
        .map_err(|err| invalid_field(FieldName::new("role"), err, &body.role))?;
    let phone_number = body
        .phone_number
        .as_deref()
        .map(|raw| {
            PhoneNumber::new(raw)
                .map_err(|err| invalid_field(FieldName::new("phoneNumber"), err, raw))
        })
        .transpose()?;

    let user = state
        .accounts
        .create_user(CreateUserRequest {
            display_name,
            role,
            phone_number,
            address_text: body.address_text,
        })
        .await?;
    Ok(web::Json(UserBody::from(user)))
}

/// Issue a login link for a user (onboarding, respond links).
#[utoipa::path(
    post,
    path = "/api/admin/login-links",
    request_body = IssueLoginLinkRequestBody,
    responses(
        (status = 200, description = "Link issued", body = LoginLinkBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Missing admin token", body = ErrorSchema),
        (status = 403, description = "Admin token mismatch", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 503, description = "Admin access not configured", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "issueLoginLink"
)]
#[post("/admin/login-links")]
pub async fn issue_login_link(
    state: web::Data<HttpState>,
    req: HttpRequest,
    payload: web::Json<IssueLoginLinkRequestBody>,
) -> ApiResult<web::Json<LoginLinkBody>> {
    require_admin(&state, &req)?;
    let body = payload.into_inner();

    let user_id = parse_user_id(&body.user_id, FieldName::new("userId"))?;
    let ttl = body
        .ttl_minutes
        .map(|minutes| {
            if minutes <= 0 {
                Err(Error::invalid_request("ttlMinutes must be positive"))
            } else {
                Ok(Duration::minutes(minutes))
            }
        })
        .transpose()?;

    let issued = state
        .login
        .issue(IssueTokenRequest {
            user_id,
            destination: body.destination,
            ttl,
            single_use: body.single_use.unwrap_or(true),
        })
        .await?;

    let secret = issued.secret.reveal().to_owned();
    Ok(web::Json(LoginLinkBody {
        login_path: format!("/api/login/{secret}"),
        token: secret,
        expires_at: issued.token.expires_at.map(|t| t.to_rfc3339()),
    }))
}
