//! Pup HTTP handlers.
//!
//! ```text
//! POST /api/pups
//! GET  /api/pups
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CreatePupRequest, Pup, PupName};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field};

/// Request payload for registering a pup.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePupRequestBody {
    /// The pup's name.
    pub name: String,
    /// Optional care instructions for sitters.
    pub care_instructions: Option<String>,
}

/// Pup representation returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PupBody {
    /// Stable identifier.
    #[schema(format = "uuid")]
    pub id: String,
    /// The pup's name.
    pub name: String,
    /// The owning user.
    #[schema(format = "uuid")]
    pub owner_user_id: String,
    /// Care instructions, if recorded.
    pub care_instructions: Option<String>,
    /// Profile photo location, if uploaded.
    pub profile_photo_url: Option<String>,
}

impl From<Pup> for PupBody {
    fn from(value: Pup) -> Self {
        Self {
            id: value.id().to_string(),
            name: value.name().as_ref().to_owned(),
            owner_user_id: value.owner_user_id().to_string(),
            care_instructions: value.care_instructions().map(str::to_owned),
            profile_photo_url: value.profile_photo_url().map(str::to_owned),
        }
    }
}

/// Register a pup owned by the acting user.
#[utoipa::path(
    post,
    path = "/api/pups",
    request_body = CreatePupRequestBody,
    responses(
        (status = 200, description = "Pup registered", body = PupBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Acting user is not an owner", body = ErrorSchema)
    ),
    tags = ["pups"],
    operation_id = "createPup",
    security(("SessionCookie" = []))
)]
#[post("/pups")]
pub async fn create_pup(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreatePupRequestBody>,
) -> ApiResult<web::Json<PupBody>> {
    let acting = session.acting_user(&state).await?;
    let body = payload.into_inner();
    let name = PupName::new(body.name.clone())
        .map_err(|err| invalid_field(FieldName::new("name"), err, &body.name))?;
    let pup = state
        .accounts
        .create_pup(
            &acting,
            CreatePupRequest {
                name,
                care_instructions: body.care_instructions,
            },
        )
        .await?;
    Ok(web::Json(PupBody::from(pup)))
}

/// List the acting user's pups.
#[utoipa::path(
    get,
    path = "/api/pups",
    responses(
        (status = 200, description = "Owned pups", body = [PupBody]),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["pups"],
    operation_id = "listPups",
    security(("SessionCookie" = []))
)]
#[get("/pups")]
pub async fn list_pups(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<PupBody>>> {
    let acting = session.acting_user(&state).await?;
    let pups = state.accounts.list_pups(&acting).await?;
    Ok(web::Json(pups.into_iter().map(Into::into).collect()))
}
