//! Suggestion HTTP handlers.
//!
//! ```text
//! POST /api/suggestions
//! GET  /api/suggestions?pupId=…
//! POST /api/suggestions/{id}/approve
//! POST /api/suggestions/{id}/reject
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ApprovalOutcome, CreateSuggestionRequest, HangoutSuggestion};
use crate::inbound::http::ApiResult;
use crate::inbound::http::hangouts::{DeliveryReportBody, HangoutBody};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid, parse_window};

/// Request payload for proposing a hangout.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSuggestionRequestBody {
    /// Pup the proposal is for.
    #[schema(format = "uuid")]
    pub pup_id: String,
    /// Proposed start, RFC 3339.
    #[schema(format = "date-time")]
    pub start_at: String,
    /// Proposed end, RFC 3339.
    #[schema(format = "date-time")]
    pub end_at: String,
    /// Optional comment shown to the owner.
    pub friend_comment: Option<String>,
}

/// Suggestion representation returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionBody {
    /// Stable identifier.
    #[schema(format = "uuid")]
    pub id: String,
    /// Pup the proposal is for.
    #[schema(format = "uuid")]
    pub pup_id: String,
    /// The proposing friend.
    #[schema(format = "uuid")]
    pub suggested_by_friend_user_id: String,
    /// Proposed start, RFC 3339.
    #[schema(format = "date-time")]
    pub start_at: String,
    /// Proposed end, RFC 3339.
    #[schema(format = "date-time")]
    pub end_at: String,
    /// Optional comment from the friend.
    pub friend_comment: Option<String>,
    /// `pending`, `approved`, or `rejected`.
    pub status: String,
}

impl From<HangoutSuggestion> for SuggestionBody {
    fn from(value: HangoutSuggestion) -> Self {
        Self {
            id: value.id().to_string(),
            pup_id: value.pup_id().to_string(),
            suggested_by_friend_user_id: value.suggested_by_friend_user_id().to_string(),
            start_at: value.window().start_at().to_rfc3339(),
            end_at: value.window().end_at().to_rfc3339(),
            friend_comment: value.friend_comment().map(str::to_owned),
            status: value.status().as_str().to_owned(),
        }
    }
}

/// Approval result: the decided suggestion, the materialised hangout, and
/// the delivery reports for the confirmation notification.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalResponseBody {
    /// The suggestion after the decision.
    pub suggestion: SuggestionBody,
    /// The hangout created from it.
    pub hangout: HangoutBody,
    /// Delivery outcomes for the confirmation message.
    pub deliveries: Vec<DeliveryReportBody>,
}

impl From<ApprovalOutcome> for ApprovalResponseBody {
    fn from(value: ApprovalOutcome) -> Self {
        Self {
            suggestion: SuggestionBody::from(value.suggestion),
            hangout: HangoutBody::from(value.transition.hangout),
            deliveries: value
                .transition
                .deliveries
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

/// Query parameters for the pending-suggestion listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSuggestionsQuery {
    /// Pup whose pending suggestions to list.
    pub pup_id: String,
}

/// Propose a hangout time for a befriended pup.
#[utoipa::path(
    post,
    path = "/api/suggestions",
    request_body = CreateSuggestionRequestBody,
    responses(
        (status = 200, description = "Suggestion created", body = SuggestionBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "No friendship with the pup", body = ErrorSchema),
        (status = 404, description = "Pup not found", body = ErrorSchema)
    ),
    tags = ["suggestions"],
    operation_id = "createSuggestion",
    security(("SessionCookie" = []))
)]
#[post("/suggestions")]
pub async fn create_suggestion(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateSuggestionRequestBody>,
) -> ApiResult<web::Json<SuggestionBody>> {
    let acting = session.acting_user(&state).await?;
    let body = payload.into_inner();
    let request = CreateSuggestionRequest {
        pup_id: parse_uuid(&body.pup_id, FieldName::new("pupId"))?,
        window: parse_window(&body.start_at, &body.end_at)?,
        friend_comment: body.friend_comment,
    };
    let suggestion = state.suggestions.create_suggestion(&acting, request).await?;
    Ok(web::Json(SuggestionBody::from(suggestion)))
}

/// List an owned pup's pending suggestions.
#[utoipa::path(
    get,
    path = "/api/suggestions",
    params(("pupId" = String, Query, description = "Pup whose pending suggestions to list")),
    responses(
        (status = 200, description = "Pending suggestions", body = [SuggestionBody]),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Not the pup's owner", body = ErrorSchema)
    ),
    tags = ["suggestions"],
    operation_id = "listSuggestions",
    security(("SessionCookie" = []))
)]
#[get("/suggestions")]
pub async fn list_suggestions(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListSuggestionsQuery>,
) -> ApiResult<web::Json<Vec<SuggestionBody>>> {
    let acting = session.acting_user(&state).await?;
    let pup_id = parse_uuid(&query.pup_id, FieldName::new("pupId"))?;
    let suggestions = state.suggestions.list_pending(&acting, pup_id).await?;
    Ok(web::Json(suggestions.into_iter().map(Into::into).collect()))
}

/// Approve a pending suggestion, creating an assigned hangout.
#[utoipa::path(
    post,
    path = "/api/suggestions/{id}/approve",
    params(("id" = String, Path, description = "Suggestion id")),
    responses(
        (status = 200, description = "Approved", body = ApprovalResponseBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Not the pup's owner", body = ErrorSchema),
        (status = 404, description = "Suggestion not found", body = ErrorSchema),
        (status = 409, description = "Already decided", body = ErrorSchema)
    ),
    tags = ["suggestions"],
    operation_id = "approveSuggestion",
    security(("SessionCookie" = []))
)]
#[post("/suggestions/{id}/approve")]
pub async fn approve_suggestion(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ApprovalResponseBody>> {
    let acting = session.acting_user(&state).await?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let outcome = state.suggestions.approve(&acting, id).await?;
    Ok(web::Json(ApprovalResponseBody::from(outcome)))
}

/// Reject a pending suggestion.
#[utoipa::path(
    post,
    path = "/api/suggestions/{id}/reject",
    params(("id" = String, Path, description = "Suggestion id")),
    responses(
        (status = 200, description = "Rejected", body = SuggestionBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Not the pup's owner", body = ErrorSchema),
        (status = 404, description = "Suggestion not found", body = ErrorSchema),
        (status = 409, description = "Already decided", body = ErrorSchema)
    ),
    tags = ["suggestions"],
    operation_id = "rejectSuggestion",
    security(("SessionCookie" = []))
)]
#[post("/suggestions/{id}/reject")]
pub async fn reject_suggestion(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<SuggestionBody>> {
    let acting = session.acting_user(&state).await?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let suggestion = state.suggestions.reject(&acting, id).await?;
    Ok(web::Json(SuggestionBody::from(suggestion)))
}
