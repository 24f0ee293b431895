//! Friendship HTTP handlers.
//!
//! ```text
//! POST   /api/friendships
//! GET    /api/friendships?pupId=…
//! PATCH  /api/friendships/{id}
//! DELETE /api/friendships/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CreateFriendshipRequest, PupFriendship};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_user_id, parse_uuid};

/// Request payload for linking a friend to a pup.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFriendshipRequestBody {
    /// The pup to link.
    #[schema(format = "uuid")]
    pub pup_id: String,
    /// The friend user to link.
    #[schema(format = "uuid")]
    pub friend_user_id: String,
    /// Optional free-text history with the pup.
    pub history_with_pup: Option<String>,
}

/// Request payload for replacing the history text.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFriendshipRequestBody {
    /// New history text; `null` clears it.
    pub history_with_pup: Option<String>,
}

/// Friendship representation returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FriendshipBody {
    /// Stable identifier.
    #[schema(format = "uuid")]
    pub id: String,
    /// The linked pup.
    #[schema(format = "uuid")]
    pub pup_id: String,
    /// The linked friend.
    #[schema(format = "uuid")]
    pub friend_user_id: String,
    /// Free-text history with the pup.
    pub history_with_pup: Option<String>,
}

impl From<PupFriendship> for FriendshipBody {
    fn from(value: PupFriendship) -> Self {
        Self {
            id: value.id().to_string(),
            pup_id: value.pup_id().to_string(),
            friend_user_id: value.friend_user_id().to_string(),
            history_with_pup: value.history_with_pup().map(str::to_owned),
        }
    }
}

/// Query parameters for the friendship listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFriendshipsQuery {
    /// Pup whose friendships to list.
    pub pup_id: String,
}

/// Link a friend to an owned pup.
#[utoipa::path(
    post,
    path = "/api/friendships",
    request_body = CreateFriendshipRequestBody,
    responses(
        (status = 200, description = "Friendship created", body = FriendshipBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Not the pup's owner", body = ErrorSchema),
        (status = 404, description = "Pup or friend not found", body = ErrorSchema),
        (status = 409, description = "Pair already linked", body = ErrorSchema)
    ),
    tags = ["friendships"],
    operation_id = "createFriendship",
    security(("SessionCookie" = []))
)]
#[post("/friendships")]
pub async fn create_friendship(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateFriendshipRequestBody>,
) -> ApiResult<web::Json<FriendshipBody>> {
    let acting = session.acting_user(&state).await?;
    let body = payload.into_inner();
    let request = CreateFriendshipRequest {
        pup_id: parse_uuid(&body.pup_id, FieldName::new("pupId"))?,
        friend_user_id: parse_user_id(&body.friend_user_id, FieldName::new("friendUserId"))?,
        history_with_pup: body.history_with_pup,
    };
    let friendship = state.friendships.create(&acting, request).await?;
    Ok(web::Json(FriendshipBody::from(friendship)))
}

/// List an owned pup's friendships.
#[utoipa::path(
    get,
    path = "/api/friendships",
    params(("pupId" = String, Query, description = "Pup whose friendships to list")),
    responses(
        (status = 200, description = "Friendships for the pup", body = [FriendshipBody]),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Not the pup's owner", body = ErrorSchema)
    ),
    tags = ["friendships"],
    operation_id = "listFriendships",
    security(("SessionCookie" = []))
)]
#[get("/friendships")]
pub async fn list_friendships(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListFriendshipsQuery>,
) -> ApiResult<web::Json<Vec<FriendshipBody>>> {
    let acting = session.acting_user(&state).await?;
    let pup_id = parse_uuid(&query.pup_id, FieldName::new("pupId"))?;
    let friendships = state.friendships.list_by_pup(&acting, pup_id).await?;
    Ok(web::Json(friendships.into_iter().map(Into::into).collect()))
}

/// Replace a friendship's history text.
#[utoipa::path(
    patch,
    path = "/api/friendships/{id}",
    params(("id" = String, Path, description = "Friendship id")),
    request_body = UpdateFriendshipRequestBody,
    responses(
        (status = 200, description = "Friendship updated", body = FriendshipBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Not a party to the friendship", body = ErrorSchema),
        (status = 404, description = "Friendship not found", body = ErrorSchema)
    ),
    tags = ["friendships"],
    operation_id = "updateFriendship",
    security(("SessionCookie" = []))
)]
#[patch("/friendships/{id}")]
pub async fn update_friendship(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateFriendshipRequestBody>,
) -> ApiResult<web::Json<FriendshipBody>> {
    let acting = session.acting_user(&state).await?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let friendship = state
        .friendships
        .update_history(&acting, id, payload.into_inner().history_with_pup)
        .await?;
    Ok(web::Json(FriendshipBody::from(friendship)))
}

/// Sever a friendship.
#[utoipa::path(
    delete,
    path = "/api/friendships/{id}",
    params(("id" = String, Path, description = "Friendship id")),
    responses(
        (status = 204, description = "Friendship removed"),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Not a party to the friendship", body = ErrorSchema),
        (status = 404, description = "Friendship not found", body = ErrorSchema)
    ),
    tags = ["friendships"],
    operation_id = "deleteFriendship",
    security(("SessionCookie" = []))
)]
#[delete("/friendships/{id}")]
pub async fn delete_friendship(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let acting = session.acting_user(&state).await?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    state.friendships.delete(&acting, id).await?;
    Ok(HttpResponse::NoContent().finish())
}
