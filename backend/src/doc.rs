//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the REST API: every HTTP endpoint from the inbound layer, the body DTO
//! schemas, and the session cookie security scheme. Swagger UI serves the
//! document in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::admin::{
    CreateUserRequestBody, IssueLoginLinkRequestBody, LoginLinkBody, UserBody,
};
use crate::inbound::http::contact::ContactRequestBody;
use crate::inbound::http::friendships::{
    CreateFriendshipRequestBody, FriendshipBody, UpdateFriendshipRequestBody,
};
use crate::inbound::http::hangouts::{
    CreateHangoutRequestBody, DeliveryReportBody, HangoutBody, QuickAssignRequestBody,
    ResponseBody, TransitionResponseBody,
};
use crate::inbound::http::login::LoginResponseBody;
use crate::inbound::http::notes::{CreateNoteRequestBody, NoteBody};
use crate::inbound::http::pups::{CreatePupRequestBody, PupBody};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::suggestions::{
    ApprovalResponseBody, CreateSuggestionRequestBody, SuggestionBody,
};
use crate::inbound::http::uploads::PhotoBody;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/login/{token}.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Dogcal backend API",
        description = "Scheduling dog-care hangouts between pup owners and trusted friends.",
        license(name = "MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::login::login,
        crate::inbound::http::login::login_link,
        crate::inbound::http::admin::create_user,
        crate::inbound::http::admin::issue_login_link,
        crate::inbound::http::pups::create_pup,
        crate::inbound::http::pups::list_pups,
        crate::inbound::http::friendships::create_friendship,
        crate::inbound::http::friendships::list_friendships,
        crate::inbound::http::friendships::update_friendship,
        crate::inbound::http::friendships::delete_friendship,
        crate::inbound::http::hangouts::create_hangout,
        crate::inbound::http::hangouts::list_hangouts,
        crate::inbound::http::hangouts::get_hangout,
        crate::inbound::http::hangouts::self_assign,
        crate::inbound::http::hangouts::quick_assign,
        crate::inbound::http::hangouts::unassign,
        crate::inbound::http::hangouts::respond,
        crate::inbound::http::hangouts::list_responses,
        crate::inbound::http::hangouts::calendar,
        crate::inbound::http::notes::list_notes,
        crate::inbound::http::notes::create_note,
        crate::inbound::http::suggestions::create_suggestion,
        crate::inbound::http::suggestions::list_suggestions,
        crate::inbound::http::suggestions::approve_suggestion,
        crate::inbound::http::suggestions::reject_suggestion,
        crate::inbound::http::uploads::upload_photo,
        crate::inbound::http::uploads::upload_photo_legacy,
        crate::inbound::http::contact::contact,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        UserBody,
        CreateUserRequestBody,
        IssueLoginLinkRequestBody,
        LoginLinkBody,
        LoginResponseBody,
        PupBody,
        CreatePupRequestBody,
        FriendshipBody,
        CreateFriendshipRequestBody,
        UpdateFriendshipRequestBody,
        HangoutBody,
        CreateHangoutRequestBody,
        QuickAssignRequestBody,
        TransitionResponseBody,
        DeliveryReportBody,
        ResponseBody,
        NoteBody,
        CreateNoteRequestBody,
        SuggestionBody,
        CreateSuggestionRequestBody,
        ApprovalResponseBody,
        PhotoBody,
        ContactRequestBody,
    )),
    tags(
        (name = "login", description = "Token-based session establishment"),
        (name = "admin", description = "Administrator operations"),
        (name = "pups", description = "Pup registration and listing"),
        (name = "friendships", description = "Friend-to-pup links"),
        (name = "hangouts", description = "Hangout lifecycle"),
        (name = "notes", description = "Hangout note log"),
        (name = "suggestions", description = "Friend-proposed hangouts"),
        (name = "photos", description = "Photo uploads"),
        (name = "contact", description = "Contact form"),
        (name = "health", description = "Probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI document structure.
    use super::*;
    use utoipa::OpenApi;

    #[test]
    fn document_registers_the_lifecycle_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/hangouts/{id}/assign",
            "/api/hangouts/{id}/quick-assign",
            "/api/hangouts/{id}/unassign",
            "/api/hangouts/{id}/respond",
            "/api/hangouts/{id}/calendar",
            "/api/hangouts/{id}/notes",
            "/api/login/{token}",
            "/api/friendships",
            "/api/suggestions",
            "/api/photos",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn document_registers_the_error_schema() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        // utoipa replaces :: with . in schema names
        assert!(schemas.contains_key("crate.domain.Error"));
        assert!(schemas.contains_key("crate.domain.ErrorCode"));
    }
}
