//! Contact-form HTTP handler.
//!
//! ```text
//! POST /api/contact
//! ```
//!
//! Unlike notification delivery, contact mail is a primary effect: absent
//! mail configuration is server misconfiguration and surfaces as an
//! internal error rather than a skipped outcome.

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Request payload for the contact form.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequestBody {
    /// Mail subject.
    pub subject: String,
    /// Mail body.
    pub message: String,
}

/// Send a contact email to the configured address.
#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequestBody,
    responses(
        (status = 204, description = "Mail accepted"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 500, description = "Mail is not configured or failed", body = ErrorSchema)
    ),
    tags = ["contact"],
    operation_id = "contact",
    security(("SessionCookie" = []))
)]
#[post("/contact")]
pub async fn contact(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ContactRequestBody>,
) -> ApiResult<HttpResponse> {
    let acting = session.acting_user(&state).await?;
    let body = payload.into_inner();
    if body.subject.trim().is_empty() || body.message.trim().is_empty() {
        return Err(Error::invalid_request(
            "subject and message must not be empty",
        ));
    }

    let to = state
        .contact_address
        .as_deref()
        .ok_or_else(|| Error::internal("contact mail is not configured"))?;

    let message = format!("From: {} ({})\n\n{}", acting.display_name, acting.id, body.message);
    state
        .mailer
        .send(to, &body.subject, &message)
        .await
        .map_err(|err| {
            error!(error = %err, "contact mail delivery failed");
            Error::internal("contact mail delivery failed")
        })?;

    Ok(HttpResponse::NoContent().finish())
}
