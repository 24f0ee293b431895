//! End-to-end coverage of the suggestion workflow, friendship management,
//! admin endpoints, uploads, and the contact form.

mod support;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::{Value, json};

use dogcal_backend::domain::UserRole;
use dogcal_backend::server::register_api;

use support::{
    issue_token, seed_friendship, seed_pup, seed_user, session_cookie, test_context,
    test_session_middleware,
};

macro_rules! init_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($ctx.state.clone()))
                .service(register_api(
                    web::scope("/api").wrap(test_session_middleware()),
                )),
        )
        .await
    };
}

macro_rules! login {
    ($app:expr, $ctx:expr, $user:expr) => {{
        let token = issue_token(&$ctx.state, $user).await;
        let res = test::call_service(
            &$app,
            test::TestRequest::post()
                .uri(&format!("/api/login/{token}"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        session_cookie(&res)
    }};
}

const WINDOW_START: &str = "2024-06-02T09:00:00Z";
const WINDOW_END: &str = "2024-06-02T11:00:00Z";

#[actix_web::test]
async fn suggestion_flow_approve_materialises_an_assigned_hangout() {
    let ctx = test_context(None);
    let app = init_app!(ctx);

    let edi = seed_user(&ctx.store, "Edi", UserRole::Owner, None).await;
    let sam = seed_user(&ctx.store, "Sam", UserRole::Friend, Some("+447700900002")).await;
    let fido = seed_pup(&ctx.store, "Fido", &edi).await;
    seed_friendship(&ctx.store, &fido, &sam).await;

    let owner_cookie = login!(app, ctx, &edi);
    let sam_cookie = login!(app, ctx, &sam);

    // Sam proposes a time.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/suggestions")
            .cookie(sam_cookie)
            .set_json(json!({
                "pupId": fido.id().to_string(),
                "startAt": WINDOW_START,
                "endAt": WINDOW_END,
                "friendComment": "Morning suits me",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let suggestion: Value = test::read_body_json(res).await;
    assert_eq!(suggestion["status"], "pending");
    let suggestion_id = suggestion["id"].as_str().expect("suggestion id").to_owned();

    // The owner sees it in the pending queue.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/suggestions?pupId={}", fido.id()))
            .cookie(owner_cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let pending: Value = test::read_body_json(res).await;
    assert_eq!(pending.as_array().map(Vec::len), Some(1));

    // Approval creates a hangout assigned to Sam and confirms them.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/suggestions/{suggestion_id}/approve"))
            .cookie(owner_cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["suggestion"]["status"], "approved");
    assert_eq!(body["hangout"]["status"], "assigned");
    assert_eq!(body["hangout"]["assignedFriendUserId"], sam.id().to_string());
    assert_eq!(body["hangout"]["startAt"], "2024-06-02T09:00:00+00:00");
    assert_eq!(body["deliveries"][0]["status"], "sent");

    // A second decision conflicts.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/suggestions/{suggestion_id}/reject"))
            .cookie(owner_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn suggestions_require_a_friendship() {
    let ctx = test_context(None);
    let app = init_app!(ctx);

    let edi = seed_user(&ctx.store, "Edi", UserRole::Owner, None).await;
    let zoe = seed_user(&ctx.store, "Zoe", UserRole::Friend, None).await;
    let fido = seed_pup(&ctx.store, "Fido", &edi).await;

    let zoe_cookie = login!(app, ctx, &zoe);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/suggestions")
            .cookie(zoe_cookie)
            .set_json(json!({
                "pupId": fido.id().to_string(),
                "startAt": WINDOW_START,
                "endAt": WINDOW_END,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn friendship_management_is_party_scoped() {
    let ctx = test_context(None);
    let app = init_app!(ctx);

    let edi = seed_user(&ctx.store, "Edi", UserRole::Owner, None).await;
    let sam = seed_user(&ctx.store, "Sam", UserRole::Friend, None).await;
    let fido = seed_pup(&ctx.store, "Fido", &edi).await;

    let owner_cookie = login!(app, ctx, &edi);
    let sam_cookie = login!(app, ctx, &sam);

    // Owner links Sam.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/friendships")
            .cookie(owner_cookie.clone())
            .set_json(json!({
                "pupId": fido.id().to_string(),
                "friendUserId": sam.id().to_string(),
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let friendship: Value = test::read_body_json(res).await;
    let friendship_id = friendship["id"].as_str().expect("friendship id").to_owned();

    // Duplicate pair conflicts.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/friendships")
            .cookie(owner_cookie.clone())
            .set_json(json!({
                "pupId": fido.id().to_string(),
                "friendUserId": sam.id().to_string(),
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // The friend can annotate their own history.
    let res = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/friendships/{friendship_id}"))
            .cookie(sam_cookie.clone())
            .set_json(json!({ "historyWithPup": "Fed Fido for a week" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = test::read_body_json(res).await;
    assert_eq!(updated["historyWithPup"], "Fed Fido for a week");

    // Listing is owner-scoped.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/friendships?pupId={}", fido.id()))
            .cookie(sam_cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // The owner severs the link; a second delete is a 404.
    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/friendships/{friendship_id}"))
            .cookie(owner_cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/friendships/{friendship_id}"))
            .cookie(owner_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn admin_endpoints_are_token_gated() {
    let ctx = test_context(Some("sekrit"));
    let app = init_app!(ctx);

    // Missing header: 401.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/admin/users")
            .set_json(json!({ "displayName": "Edi", "role": "owner" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Wrong header: 403.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/admin/users")
            .insert_header(("x-admin-token", "wrong"))
            .set_json(json!({ "displayName": "Edi", "role": "owner" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Correct header: user created.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/admin/users")
            .insert_header(("x-admin-token", "sekrit"))
            .set_json(json!({
                "displayName": "Edi",
                "role": "owner",
                "phoneNumber": "+44 7700 900001",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let user: Value = test::read_body_json(res).await;
    assert_eq!(user["role"], "owner");
    assert_eq!(user["phoneNumber"], "+447700900001");
    let user_id = user["id"].as_str().expect("user id").to_owned();

    // An onboarding link issued for the user logs them in.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/admin/login-links")
            .insert_header(("x-admin-token", "sekrit"))
            .set_json(json!({
                "userId": user_id,
                "destination": "/pups",
                "ttlMinutes": 60,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let link: Value = test::read_body_json(res).await;
    let token = link["token"].as_str().expect("token secret").to_owned();

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/login/{token}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let location = res
        .headers()
        .get("location")
        .expect("redirect location")
        .to_str()
        .expect("ascii location");
    assert_eq!(location, "/pups");

    // Single-use by default: the link is now spent.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/login/{token}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let location = res
        .headers()
        .get("location")
        .expect("redirect location")
        .to_str()
        .expect("ascii location");
    assert_eq!(location, "/login/error");
}

#[actix_web::test]
async fn admin_endpoints_degrade_without_configuration() {
    let ctx = test_context(None);
    let app = init_app!(ctx);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/admin/users")
            .insert_header(("x-admin-token", "anything"))
            .set_json(json!({ "displayName": "Edi", "role": "owner" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn uploads_validate_type_and_content() {
    let ctx = test_context(None);
    let app = init_app!(ctx);

    let edi = seed_user(&ctx.store, "Edi", UserRole::Owner, None).await;
    let cookie = login!(app, ctx, &edi);

    let mut png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    png.extend_from_slice(&[0u8; 32]);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/photos")
            .cookie(cookie.clone())
            .insert_header(("content-type", "image/png"))
            .set_payload(png.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let photo: Value = test::read_body_json(res).await;
    let key = photo["key"].as_str().expect("photo key").to_owned();
    assert!(key.starts_with("photos/"));
    assert!(key.ends_with(".png"));
    assert_eq!(photo["url"], format!("/media/{key}"));
    assert_eq!(ctx.storage.keys(), vec![key]);

    // Declared type must match the magic bytes.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/upload")
            .cookie(cookie.clone())
            .insert_header(("content-type", "image/jpeg"))
            .set_payload(png)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Disallowed type is rejected outright.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/photos")
            .cookie(cookie)
            .insert_header(("content-type", "image/gif"))
            .set_payload(vec![0u8; 8])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn contact_without_mail_configuration_is_a_server_error() {
    let ctx = test_context(None);
    let app = init_app!(ctx);

    let edi = seed_user(&ctx.store, "Edi", UserRole::Owner, None).await;
    let cookie = login!(app, ctx, &edi);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/contact")
            .cookie(cookie)
            .set_json(json!({ "subject": "Hello", "message": "Question about Fido" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(res).await;
    // Internal errors are redacted.
    assert_eq!(body["message"], "Internal server error");
}
