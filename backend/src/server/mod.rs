//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;
pub use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, Scope, web};

use crate::domain::upload::MAX_UPLOAD_BYTES;
use crate::inbound::http::admin::{create_user, issue_login_link};
use crate::inbound::http::contact::contact;
use crate::inbound::http::friendships::{
    create_friendship, delete_friendship, list_friendships, update_friendship,
};
use crate::inbound::http::hangouts::{
    calendar, create_hangout, get_hangout, list_hangouts, list_responses, quick_assign, respond,
    self_assign, unassign,
};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::login::{login, login_link};
use crate::inbound::http::notes::{create_note, list_notes};
use crate::inbound::http::pups::{create_pup, list_pups};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::suggestions::{
    approve_suggestion, create_suggestion, list_suggestions, reject_suggestion,
};
use crate::inbound::http::uploads::{upload_photo, upload_photo_legacy};
use crate::middleware::Trace;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Attach every `/api` endpoint to the given scope.
///
/// Shared between the production server and the integration tests so both
/// exercise the same routing table.
pub fn register_api<T>(api: Scope<T>) -> Scope<T>
where
    T: ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
{
    api.service(login)
        .service(login_link)
        .service(create_user)
        .service(issue_login_link)
        .service(create_pup)
        .service(list_pups)
        .service(create_friendship)
        .service(list_friendships)
        .service(update_friendship)
        .service(delete_friendship)
        .service(create_hangout)
        .service(list_hangouts)
        .service(get_hangout)
        .service(self_assign)
        .service(quick_assign)
        .service(unassign)
        .service(respond)
        .service(list_responses)
        .service(calendar)
        .service(list_notes)
        .service(create_note)
        .service(create_suggestion)
        .service(list_suggestions)
        .service(approve_suggestion)
        .service(reject_suggestion)
        .service(upload_photo)
        .service(upload_photo_legacy)
        .service(contact)
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = register_api(web::scope("/api").wrap(session))
        .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES + 4096));

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server from the provided configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when adapter wiring or socket binding
/// fails.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(build_http_state(&config).await?);
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        ..
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
