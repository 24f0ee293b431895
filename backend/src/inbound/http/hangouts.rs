//! Hangout HTTP handlers.
//!
//! ```text
//! POST /api/hangouts
//! GET  /api/hangouts?pupId=…
//! GET  /api/hangouts/{id}
//! POST /api/hangouts/{id}/assign
//! POST /api/hangouts/{id}/quick-assign
//! POST /api/hangouts/{id}/unassign
//! GET  /api/hangouts/{id}/respond?response=yes|no&token=…
//! GET  /api/hangouts/{id}/calendar
//! ```

use actix_web::http::header;
use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{
    CreateHangoutRequest, DeliveryOutcome, DeliveryReport, Error, Hangout, ResponseAnswer,
    TransitionOutcome,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field, parse_user_id, parse_uuid, parse_window,
};

/// Request payload for creating a hangout.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateHangoutRequestBody {
    /// Pup the slot cares for.
    #[schema(format = "uuid")]
    pub pup_id: String,
    /// Window start, RFC 3339.
    #[schema(format = "date-time")]
    pub start_at: String,
    /// Window end, RFC 3339.
    #[schema(format = "date-time")]
    pub end_at: String,
    /// Optional notes from the owner.
    pub owner_notes: Option<String>,
    /// Optional custom event name.
    pub event_name: Option<String>,
}

/// Request payload for quick-assigning a named friend.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuickAssignRequestBody {
    /// The friend to attach.
    #[schema(format = "uuid")]
    pub friend_user_id: String,
}

/// Hangout representation returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HangoutBody {
    /// Stable identifier.
    #[schema(format = "uuid")]
    pub id: String,
    /// Pup the slot cares for.
    #[schema(format = "uuid")]
    pub pup_id: String,
    /// Window start, RFC 3339.
    #[schema(format = "date-time")]
    pub start_at: String,
    /// Window end, RFC 3339.
    #[schema(format = "date-time")]
    pub end_at: String,
    /// Lifecycle status.
    pub status: String,
    /// Attached friend while assigned.
    #[schema(format = "uuid")]
    pub assigned_friend_user_id: Option<String>,
    /// Owner who created the slot.
    #[schema(format = "uuid")]
    pub created_by_owner_id: String,
    /// Optional notes from the owner.
    pub owner_notes: Option<String>,
    /// Optional custom event name.
    pub event_name: Option<String>,
}

impl From<Hangout> for HangoutBody {
    fn from(value: Hangout) -> Self {
        Self {
            id: value.id().to_string(),
            pup_id: value.pup_id().to_string(),
            start_at: value.window().start_at().to_rfc3339(),
            end_at: value.window().end_at().to_rfc3339(),
            status: value.status().as_str().to_owned(),
            assigned_friend_user_id: value.assigned_friend_user_id().map(|id| id.to_string()),
            created_by_owner_id: value.created_by_owner_id().to_string(),
            owner_notes: value.owner_notes().map(str::to_owned),
            event_name: value.event_name().map(str::to_owned),
        }
    }
}

/// Per-recipient delivery report returned alongside a transition.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReportBody {
    /// Recipient user id.
    #[schema(format = "uuid")]
    pub recipient_user_id: String,
    /// Recipient display name at dispatch time.
    pub recipient_name: String,
    /// `sent`, `skipped`, or `failed`.
    pub status: String,
    /// Reason for a skipped or failed outcome.
    pub reason: Option<String>,
}

impl From<DeliveryReport> for DeliveryReportBody {
    fn from(value: DeliveryReport) -> Self {
        let (status, reason) = match value.outcome {
            DeliveryOutcome::Sent => ("sent", None),
            DeliveryOutcome::Skipped(reason) => ("skipped", Some(reason)),
            DeliveryOutcome::Failed(reason) => ("failed", Some(reason)),
        };
        Self {
            recipient_user_id: value.recipient_user_id.to_string(),
            recipient_name: value.recipient_name,
            status: status.to_owned(),
            reason,
        }
    }
}

/// A persisted transition plus best-effort delivery reports.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionResponseBody {
    /// The hangout after the transition.
    pub hangout: HangoutBody,
    /// Delivery outcomes, in dispatch order.
    pub deliveries: Vec<DeliveryReportBody>,
}

impl From<TransitionOutcome> for TransitionResponseBody {
    fn from(value: TransitionOutcome) -> Self {
        Self {
            hangout: HangoutBody::from(value.hangout),
            deliveries: value.deliveries.into_iter().map(Into::into).collect(),
        }
    }
}

/// Query parameters for the hangout listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListHangoutsQuery {
    /// Pup whose hangouts to list.
    pub pup_id: String,
}

/// Query parameters for the link-driven respond endpoint.
#[derive(Debug, Deserialize)]
pub struct RespondQuery {
    /// `yes` or `no`.
    pub response: String,
    /// Raw login-token secret from the notification link.
    pub token: String,
}

/// Create an open hangout for an owned pup.
#[utoipa::path(
    post,
    path = "/api/hangouts",
    request_body = CreateHangoutRequestBody,
    responses(
        (status = 200, description = "Hangout created", body = HangoutBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Not the pup's owner", body = ErrorSchema),
        (status = 404, description = "Pup not found", body = ErrorSchema)
    ),
    tags = ["hangouts"],
    operation_id = "createHangout",
    security(("SessionCookie" = []))
)]
#[post("/hangouts")]
pub async fn create_hangout(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateHangoutRequestBody>,
) -> ApiResult<web::Json<HangoutBody>> {
    let acting = session.acting_user(&state).await?;
    let body = payload.into_inner();
    let request = CreateHangoutRequest {
        pup_id: parse_uuid(&body.pup_id, FieldName::new("pupId"))?,
        window: parse_window(&body.start_at, &body.end_at)?,
        owner_notes: body.owner_notes,
        event_name: body.event_name,
    };
    let hangout = state.hangouts.create_hangout(&acting, request).await?;
    Ok(web::Json(HangoutBody::from(hangout)))
}

/// List a pup's hangouts.
#[utoipa::path(
    get,
    path = "/api/hangouts",
    params(("pupId" = String, Query, description = "Pup whose hangouts to list")),
    responses(
        (status = 200, description = "Hangouts for the pup", body = [HangoutBody]),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "No relationship with the pup", body = ErrorSchema)
    ),
    tags = ["hangouts"],
    operation_id = "listHangouts",
    security(("SessionCookie" = []))
)]
#[get("/hangouts")]
pub async fn list_hangouts(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListHangoutsQuery>,
) -> ApiResult<web::Json<Vec<HangoutBody>>> {
    let acting = session.acting_user(&state).await?;
    let pup_id = parse_uuid(&query.pup_id, FieldName::new("pupId"))?;
    let hangouts = state.hangouts.list_by_pup(&acting, pup_id).await?;
    Ok(web::Json(hangouts.into_iter().map(Into::into).collect()))
}

/// Fetch one hangout.
#[utoipa::path(
    get,
    path = "/api/hangouts/{id}",
    params(("id" = String, Path, description = "Hangout id")),
    responses(
        (status = 200, description = "The hangout", body = HangoutBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "No relationship with the pup", body = ErrorSchema),
        (status = 404, description = "Hangout not found", body = ErrorSchema)
    ),
    tags = ["hangouts"],
    operation_id = "getHangout",
    security(("SessionCookie" = []))
)]
#[get("/hangouts/{id}")]
pub async fn get_hangout(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<HangoutBody>> {
    let acting = session.acting_user(&state).await?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let hangout = state.hangouts.get_hangout(&acting, id).await?;
    Ok(web::Json(HangoutBody::from(hangout)))
}

/// Self-assign: the acting friend takes the open slot.
#[utoipa::path(
    post,
    path = "/api/hangouts/{id}/assign",
    params(("id" = String, Path, description = "Hangout id")),
    responses(
        (status = 200, description = "Assigned", body = TransitionResponseBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Not a befriended friend", body = ErrorSchema),
        (status = 404, description = "Hangout not found", body = ErrorSchema),
        (status = 409, description = "Hangout is not open", body = ErrorSchema)
    ),
    tags = ["hangouts"],
    operation_id = "selfAssignHangout",
    security(("SessionCookie" = []))
)]
#[post("/hangouts/{id}/assign")]
pub async fn self_assign(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<TransitionResponseBody>> {
    let acting = session.acting_user(&state).await?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let outcome = state.hangouts.self_assign(&acting, id).await?;
    Ok(web::Json(TransitionResponseBody::from(outcome)))
}

/// Quick-assign: the owner attaches a named friend.
#[utoipa::path(
    post,
    path = "/api/hangouts/{id}/quick-assign",
    params(("id" = String, Path, description = "Hangout id")),
    request_body = QuickAssignRequestBody,
    responses(
        (status = 200, description = "Assigned", body = TransitionResponseBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Not the owner, or no friendship", body = ErrorSchema),
        (status = 404, description = "Hangout or friend not found", body = ErrorSchema),
        (status = 409, description = "Hangout is not open", body = ErrorSchema)
    ),
    tags = ["hangouts"],
    operation_id = "quickAssignHangout",
    security(("SessionCookie" = []))
)]
#[post("/hangouts/{id}/quick-assign")]
pub async fn quick_assign(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<QuickAssignRequestBody>,
) -> ApiResult<web::Json<TransitionResponseBody>> {
    let acting = session.acting_user(&state).await?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let friend = parse_user_id(&payload.friend_user_id, FieldName::new("friendUserId"))?;
    let outcome = state.hangouts.quick_assign(&acting, id, friend).await?;
    Ok(web::Json(TransitionResponseBody::from(outcome)))
}

/// Unassign: the currently assigned friend steps back.
#[utoipa::path(
    post,
    path = "/api/hangouts/{id}/unassign",
    params(("id" = String, Path, description = "Hangout id")),
    responses(
        (status = 200, description = "Reopened", body = TransitionResponseBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Not the assigned friend", body = ErrorSchema),
        (status = 404, description = "Hangout not found", body = ErrorSchema),
        (status = 409, description = "Hangout is not assigned", body = ErrorSchema)
    ),
    tags = ["hangouts"],
    operation_id = "unassignHangout",
    security(("SessionCookie" = []))
)]
#[post("/hangouts/{id}/unassign")]
pub async fn unassign(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<TransitionResponseBody>> {
    let acting = session.acting_user(&state).await?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let outcome = state.hangouts.unassign(&acting, id).await?;
    Ok(web::Json(TransitionResponseBody::from(outcome)))
}

/// Recorded reply representation returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    /// The replying friend.
    #[schema(format = "uuid")]
    pub responder_user_id: String,
    /// `yes` or `no`.
    pub answer: String,
    /// When the latest reply was recorded, RFC 3339.
    #[schema(format = "date-time")]
    pub responded_at: String,
}

impl From<crate::domain::HangoutResponse> for ResponseBody {
    fn from(value: crate::domain::HangoutResponse) -> Self {
        Self {
            responder_user_id: value.responder_user_id().to_string(),
            answer: value.answer().as_str().to_owned(),
            responded_at: value.responded_at().to_rfc3339(),
        }
    }
}

/// List the replies friends have recorded for a hangout.
#[utoipa::path(
    get,
    path = "/api/hangouts/{id}/responses",
    params(("id" = String, Path, description = "Hangout id")),
    responses(
        (status = 200, description = "Recorded replies", body = [ResponseBody]),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Not the pup's owner", body = ErrorSchema),
        (status = 404, description = "Hangout not found", body = ErrorSchema)
    ),
    tags = ["hangouts"],
    operation_id = "listResponses",
    security(("SessionCookie" = []))
)]
#[get("/hangouts/{id}/responses")]
pub async fn list_responses(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<ResponseBody>>> {
    let acting = session.acting_user(&state).await?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let responses = state.hangouts.list_responses(&acting, id).await?;
    Ok(web::Json(responses.into_iter().map(Into::into).collect()))
}

/// Path shown after a successful link-driven response.
pub const RESPOND_THANKS_PATH: &str = "/respond/thanks";
/// Path shown when a link-driven response cannot be recorded.
pub const RESPOND_ERROR_PATH: &str = "/respond/error";

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Record a yes/no reply from a notification link.
///
/// This endpoint is link-driven, not a JSON API: the token in the query
/// authenticates the friend, a valid reply sets the session cookie, and
/// every failure redirects to a static error view instead of surfacing an
/// API error.
#[utoipa::path(
    get,
    path = "/api/hangouts/{id}/respond",
    params(
        ("id" = String, Path, description = "Hangout id"),
        ("response" = String, Query, description = "yes or no"),
        ("token" = String, Query, description = "Login-token secret from the link")
    ),
    responses(
        (status = 303, description = "Redirects to a thanks or error view")
    ),
    tags = ["hangouts"],
    operation_id = "respondToHangout"
)]
#[get("/hangouts/{id}/respond")]
pub async fn respond(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<RespondQuery>,
) -> HttpResponse {
    match try_respond(&state, &session, &path.into_inner(), &query).await {
        Ok(answer) => see_other(&format!("{RESPOND_THANKS_PATH}?answer={answer}")),
        Err(error) => {
            info!(error = %error, "link-driven response rejected");
            see_other(RESPOND_ERROR_PATH)
        }
    }
}

async fn try_respond(
    state: &HttpState,
    session: &SessionContext,
    raw_id: &str,
    query: &RespondQuery,
) -> Result<ResponseAnswer, Error> {
    let hangout_id = parse_uuid(raw_id, FieldName::new("id"))?;
    let answer = ResponseAnswer::parse(&query.response)
        .map_err(|err| invalid_field(FieldName::new("response"), err, &query.response))?;

    let login = state
        .login
        .redeem(&query.token)
        .await?
        .ok_or_else(|| Error::unauthorized("login token did not resolve"))?;
    session.persist_user(login.user_id)?;

    let acting = crate::domain::resolve_acting_user(state.users.as_ref(), login.user_id).await?;
    state.hangouts.respond(&acting, hangout_id, answer).await?;
    Ok(answer)
}

/// Export a confirmed hangout as an iCalendar document.
#[utoipa::path(
    get,
    path = "/api/hangouts/{id}/calendar",
    params(("id" = String, Path, description = "Hangout id")),
    responses(
        (status = 200, description = "iCalendar document", body = String, content_type = "text/calendar"),
        (status = 400, description = "Hangout is not assigned", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Hangout not found", body = ErrorSchema)
    ),
    tags = ["hangouts"],
    operation_id = "hangoutCalendar",
    security(("SessionCookie" = []))
)]
#[get("/hangouts/{id}/calendar")]
pub async fn calendar(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let acting = session.acting_user(&state).await?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let document = state
        .hangouts
        .calendar(&acting, id, chrono::Utc::now())
        .await?;
    Ok(HttpResponse::Ok()
        .content_type("text/calendar; charset=utf-8")
        .body(document))
}
