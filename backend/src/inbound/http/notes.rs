//! Hangout note HTTP handlers.
//!
//! ```text
//! GET  /api/hangouts/{id}/notes?skip=…&take=…
//! POST /api/hangouts/{id}/notes
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::HangoutNote;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Request payload for appending a note.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequestBody {
    /// The note body.
    pub note_text: String,
}

/// Note representation returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteBody {
    /// Stable identifier.
    #[schema(format = "uuid")]
    pub id: String,
    /// Hangout the note belongs to.
    #[schema(format = "uuid")]
    pub hangout_id: String,
    /// Author user id.
    #[schema(format = "uuid")]
    pub author_user_id: String,
    /// The note body.
    pub note_text: String,
    /// Creation time, RFC 3339.
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<HangoutNote> for NoteBody {
    fn from(value: HangoutNote) -> Self {
        Self {
            id: value.id().to_string(),
            hangout_id: value.hangout_id().to_string(),
            author_user_id: value.author_user_id().to_string(),
            note_text: value.note_text().to_owned(),
            created_at: value.created_at().to_rfc3339(),
        }
    }
}

/// Pagination query for the note listing. `take` defaults to 20 and is
/// capped at 50 by the domain service.
#[derive(Debug, Deserialize)]
pub struct ListNotesQuery {
    /// Entries to skip from the start of the log.
    pub skip: Option<u32>,
    /// Entries to return.
    pub take: Option<u32>,
}

/// List one page of a hangout's note log, oldest first.
#[utoipa::path(
    get,
    path = "/api/hangouts/{id}/notes",
    params(
        ("id" = String, Path, description = "Hangout id"),
        ("skip" = Option<u32>, Query, description = "Entries to skip"),
        ("take" = Option<u32>, Query, description = "Page size, default 20, capped at 50")
    ),
    responses(
        (status = 200, description = "One page of notes", body = [NoteBody]),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Not the owner or assigned friend", body = ErrorSchema),
        (status = 404, description = "Hangout not found", body = ErrorSchema)
    ),
    tags = ["notes"],
    operation_id = "listNotes",
    security(("SessionCookie" = []))
)]
#[get("/hangouts/{id}/notes")]
pub async fn list_notes(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<ListNotesQuery>,
) -> ApiResult<web::Json<Vec<NoteBody>>> {
    let acting = session.acting_user(&state).await?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let notes = state
        .hangouts
        .list_notes(&acting, id, query.skip.unwrap_or(0), query.take)
        .await?;
    Ok(web::Json(notes.into_iter().map(Into::into).collect()))
}

/// Append a note to a hangout.
#[utoipa::path(
    post,
    path = "/api/hangouts/{id}/notes",
    params(("id" = String, Path, description = "Hangout id")),
    request_body = CreateNoteRequestBody,
    responses(
        (status = 200, description = "Note appended", body = NoteBody),
        (status = 400, description = "Invalid note text", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Not the owner or assigned friend", body = ErrorSchema),
        (status = 404, description = "Hangout not found", body = ErrorSchema)
    ),
    tags = ["notes"],
    operation_id = "createNote",
    security(("SessionCookie" = []))
)]
#[post("/hangouts/{id}/notes")]
pub async fn create_note(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CreateNoteRequestBody>,
) -> ApiResult<web::Json<NoteBody>> {
    let acting = session.acting_user(&state).await?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let note = state
        .hangouts
        .add_note(&acting, id, payload.into_inner().note_text)
        .await?;
    Ok(web::Json(NoteBody::from(note)))
}
