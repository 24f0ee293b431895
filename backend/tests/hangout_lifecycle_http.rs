//! End-to-end coverage of the hangout lifecycle over the HTTP surface.

mod support;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::{Value, json};

use dogcal_backend::domain::HangoutEventKind;
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

const WINDOW_START: &str = "2024-06-01T10:00:00Z";
const WINDOW_END: &str = "2024-06-01T12:00:00Z";

#[actix_web::test]
async fn owner_creates_friend_assigns_and_unassigns() {
    let ctx = test_context(None);
    let app = init_app!(ctx);

    let edi = seed_user(&ctx.store, "Edi", UserRole::Owner, Some("+447700900001")).await;
    let sam = seed_user(&ctx.store, "Sam", UserRole::Friend, Some("+447700900002")).await;
    let fido = seed_pup(&ctx.store, "Fido", &edi).await;
    seed_friendship(&ctx.store, &fido, &sam).await;

    let owner_cookie = login!(app, ctx, &edi);
    let sam_cookie = login!(app, ctx, &sam);

    // Owner creates an open hangout.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/hangouts")
            .cookie(owner_cookie.clone())
            .set_json(json!({
                "pupId": fido.id().to_string(),
                "startAt": WINDOW_START,
                "endAt": WINDOW_END,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let hangout: Value = test::read_body_json(res).await;
    assert_eq!(hangout["status"], "open");
    let hangout_id = hangout["id"].as_str().expect("hangout id").to_owned();

    // Sam self-assigns.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/hangouts/{hangout_id}/assign"))
            .cookie(sam_cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["hangout"]["status"], "assigned");
    assert_eq!(
        body["hangout"]["assignedFriendUserId"],
        sam.id().to_string()
    );
    assert_eq!(body["deliveries"][0]["status"], "sent");

    // Sam unassigns; the slot reopens and the owner is notified.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/hangouts/{hangout_id}/unassign"))
            .cookie(sam_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["hangout"]["status"], "open");
    assert!(body["hangout"]["assignedFriendUserId"].is_null());

    assert_eq!(
        ctx.sender.deliveries(),
        vec![
            ("+447700900001".to_owned(), HangoutEventKind::Assigned),
            ("+447700900001".to_owned(), HangoutEventKind::Unassigned),
        ]
    );
}

#[actix_web::test]
async fn assignment_preconditions_map_to_http_statuses() {
    let ctx = test_context(None);
    let app = init_app!(ctx);

    let edi = seed_user(&ctx.store, "Edi", UserRole::Owner, None).await;
    let sam = seed_user(&ctx.store, "Sam", UserRole::Friend, None).await;
    let ana = seed_user(&ctx.store, "Ana", UserRole::Friend, None).await;
    let zoe = seed_user(&ctx.store, "Zoe", UserRole::Friend, None).await;
    let fido = seed_pup(&ctx.store, "Fido", &edi).await;
    seed_friendship(&ctx.store, &fido, &sam).await;
    seed_friendship(&ctx.store, &fido, &ana).await;

    let owner_cookie = login!(app, ctx, &edi);
    let sam_cookie = login!(app, ctx, &sam);
    let ana_cookie = login!(app, ctx, &ana);
    let zoe_cookie = login!(app, ctx, &zoe);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/hangouts")
            .cookie(owner_cookie.clone())
            .set_json(json!({
                "pupId": fido.id().to_string(),
                "startAt": WINDOW_START,
                "endAt": WINDOW_END,
            }))
            .to_request(),
    )
    .await;
    let hangout: Value = test::read_body_json(res).await;
    let hangout_id = hangout["id"].as_str().expect("hangout id").to_owned();

    // No session: 401.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/hangouts/{hangout_id}/assign"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // No friendship: 403.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/hangouts/{hangout_id}/assign"))
            .cookie(zoe_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Unknown hangout: 404.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/hangouts/{}/assign", uuid::Uuid::new_v4()))
            .cookie(sam_cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // First assign wins.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/hangouts/{hangout_id}/assign"))
            .cookie(sam_cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    // Second assign conflicts, regardless of actor.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/hangouts/{hangout_id}/assign"))
            .cookie(ana_cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "conflict");
    assert_eq!(body["details"]["status"], "assigned");

    // Unassign by anyone but the assignee: 403, owner included.
    for cookie in [owner_cookie, ana_cookie] {
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/hangouts/{hangout_id}/unassign"))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}

#[actix_web::test]
async fn quick_assign_notifies_assignee_and_other_friends() {
    let ctx = test_context(None);
    let app = init_app!(ctx);

    let edi = seed_user(&ctx.store, "Edi", UserRole::Owner, Some("+447700900001")).await;
    let sam = seed_user(&ctx.store, "Sam", UserRole::Friend, Some("+447700900002")).await;
    let ana = seed_user(&ctx.store, "Ana", UserRole::Friend, Some("+447700900003")).await;
    let fido = seed_pup(&ctx.store, "Fido", &edi).await;
    seed_friendship(&ctx.store, &fido, &sam).await;
    seed_friendship(&ctx.store, &fido, &ana).await;

    let owner_cookie = login!(app, ctx, &edi);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/hangouts")
            .cookie(owner_cookie.clone())
            .set_json(json!({
                "pupId": fido.id().to_string(),
                "startAt": WINDOW_START,
                "endAt": WINDOW_END,
            }))
            .to_request(),
    )
    .await;
    let hangout: Value = test::read_body_json(res).await;
    let hangout_id = hangout["id"].as_str().expect("hangout id").to_owned();

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/hangouts/{hangout_id}/quick-assign"))
            .cookie(owner_cookie)
            .set_json(json!({ "friendUserId": sam.id().to_string() }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["hangout"]["assignedFriendUserId"], sam.id().to_string());
    let deliveries = body["deliveries"].as_array().expect("delivery array");
    assert_eq!(deliveries.len(), 2);

    assert_eq!(
        ctx.sender.deliveries(),
        vec![
            ("+447700900002".to_owned(), HangoutEventKind::Confirmed),
            ("+447700900003".to_owned(), HangoutEventKind::Closed),
        ]
    );
}

#[actix_web::test]
async fn respond_link_is_idempotent_and_redirects() {
    let ctx = test_context(None);
    let app = init_app!(ctx);

    let edi = seed_user(&ctx.store, "Edi", UserRole::Owner, None).await;
    let sam = seed_user(&ctx.store, "Sam", UserRole::Friend, None).await;
    let fido = seed_pup(&ctx.store, "Fido", &edi).await;
    seed_friendship(&ctx.store, &fido, &sam).await;

    let owner_cookie = login!(app, ctx, &edi);
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/hangouts")
            .cookie(owner_cookie.clone())
            .set_json(json!({
                "pupId": fido.id().to_string(),
                "startAt": WINDOW_START,
                "endAt": WINDOW_END,
            }))
            .to_request(),
    )
    .await;
    let hangout: Value = test::read_body_json(res).await;
    let hangout_id = hangout["id"].as_str().expect("hangout id").to_owned();

    let token = issue_token(&ctx.state, &sam).await;
    let respond_uri =
        format!("/api/hangouts/{hangout_id}/respond?response=yes&token={token}");

    for _ in 0..2 {
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri(&respond_uri).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let location = res
            .headers()
            .get("location")
            .expect("redirect location")
            .to_str()
            .expect("ascii location");
        assert_eq!(location, "/respond/thanks?answer=yes");
    }

    // Exactly one row, answer yes, visible to the owner.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/hangouts/{hangout_id}/responses"))
            .cookie(owner_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let replies: Value = test::read_body_json(res).await;
    let replies = replies.as_array().expect("reply array");
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["responderUserId"], sam.id().to_string());
    assert_eq!(replies[0]["answer"], "yes");

    // An invalid token redirects to the error view instead of erroring.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!(
                "/api/hangouts/{hangout_id}/respond?response=yes&token=bogus"
            ))
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
    assert_eq!(location, "/respond/error");
}

#[actix_web::test]
async fn calendar_exports_only_assigned_hangouts() {
    let ctx = test_context(None);
    let app = init_app!(ctx);

    let edi = seed_user(&ctx.store, "Edi", UserRole::Owner, None).await;
    let sam = seed_user(&ctx.store, "Sam", UserRole::Friend, None).await;
    let fido = seed_pup(&ctx.store, "Fido", &edi).await;
    seed_friendship(&ctx.store, &fido, &sam).await;

    let owner_cookie = login!(app, ctx, &edi);
    let sam_cookie = login!(app, ctx, &sam);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/hangouts")
            .cookie(owner_cookie.clone())
            .set_json(json!({
                "pupId": fido.id().to_string(),
                "startAt": WINDOW_START,
                "endAt": WINDOW_END,
            }))
            .to_request(),
    )
    .await;
    let hangout: Value = test::read_body_json(res).await;
    let hangout_id = hangout["id"].as_str().expect("hangout id").to_owned();

    // Open hangout: 400, no partial document.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/hangouts/{hangout_id}/calendar"))
            .cookie(owner_cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/hangouts/{hangout_id}/assign"))
            .cookie(sam_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/hangouts/{hangout_id}/calendar"))
            .cookie(owner_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let content_type = res
        .headers()
        .get("content-type")
        .expect("content type")
        .to_str()
        .expect("ascii content type")
        .to_owned();
    assert!(content_type.starts_with("text/calendar"));
    let body = test::read_body(res).await;
    let document = std::str::from_utf8(&body).expect("utf8 body");
    assert!(document.contains("DTSTART:20240601T100000Z"));
    assert!(document.contains("DTEND:20240601T120000Z"));
    assert!(document.contains("SUMMARY:Dog hangout with Fido"));
}

#[actix_web::test]
async fn notes_are_scoped_and_paginated() {
    let ctx = test_context(None);
    let app = init_app!(ctx);

    let edi = seed_user(&ctx.store, "Edi", UserRole::Owner, None).await;
    let sam = seed_user(&ctx.store, "Sam", UserRole::Friend, None).await;
    let ana = seed_user(&ctx.store, "Ana", UserRole::Friend, None).await;
    let fido = seed_pup(&ctx.store, "Fido", &edi).await;
    seed_friendship(&ctx.store, &fido, &sam).await;
    seed_friendship(&ctx.store, &fido, &ana).await;

    let owner_cookie = login!(app, ctx, &edi);
    let sam_cookie = login!(app, ctx, &sam);
    let ana_cookie = login!(app, ctx, &ana);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/hangouts")
            .cookie(owner_cookie.clone())
            .set_json(json!({
                "pupId": fido.id().to_string(),
                "startAt": WINDOW_START,
                "endAt": WINDOW_END,
            }))
            .to_request(),
    )
    .await;
    let hangout: Value = test::read_body_json(res).await;
    let hangout_id = hangout["id"].as_str().expect("hangout id").to_owned();

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/hangouts/{hangout_id}/assign"))
            .cookie(sam_cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    for (cookie, text) in [(&owner_cookie, "Key under the mat"), (&sam_cookie, "Walked at noon")] {
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/hangouts/{hangout_id}/notes"))
                .cookie((*cookie).clone())
                .set_json(json!({ "noteText": text }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    // Another friend of the pup is still not a note party.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/hangouts/{hangout_id}/notes"))
            .cookie(ana_cookie)
            .set_json(json!({ "noteText": "hello" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/hangouts/{hangout_id}/notes?skip=1&take=1"))
            .cookie(owner_cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let notes: Value = test::read_body_json(res).await;
    let notes = notes.as_array().expect("note array");
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["noteText"], "Walked at noon");

    // Blank note text is a validation error.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/hangouts/{hangout_id}/notes"))
            .cookie(owner_cookie)
            .set_json(json!({ "noteText": "   " }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
