//! Builders selecting adapters and wiring domain services.
//!
//! Database-backed adapters serve when a database URL is configured;
//! otherwise everything runs over the shared in-memory store, which keeps
//! local development and the integration tests free of external services.

use std::sync::Arc;

use tracing::info;

use crate::domain::ports::{
    Clock, DisabledEmailSender, DisabledWhatsAppSender, EmailSender, FriendshipRepository,
    HangoutRepository, LoginTokenRepository, NoteRepository, ObjectStorage, PupRepository,
    ResponseRepository, SuggestionRepository, SystemClock, UserRepository, WhatsAppSender,
};
use crate::domain::{
    AccountService, DispatchPolicy, FriendshipService, HangoutService, HangoutServiceDeps,
    LoginService, NotificationDispatcher, SuggestionService, SuggestionServiceDeps,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::mailer::HttpMailer;
use crate::outbound::memory::InMemoryStore;
use crate::outbound::persistence::{
    DbPool, DieselFriendshipRepository, DieselHangoutRepository, DieselLoginTokenRepository,
    DieselNoteRepository, DieselPupRepository, DieselResponseRepository,
    DieselSuggestionRepository, DieselUserRepository, PoolConfig,
};
use crate::outbound::storage::DirObjectStorage;
use crate::outbound::whatsapp::HttpWhatsAppSender;

use super::config::ServerConfig;

struct Repositories {
    users: Arc<dyn UserRepository>,
    pups: Arc<dyn PupRepository>,
    friendships: Arc<dyn FriendshipRepository>,
    hangouts: Arc<dyn HangoutRepository>,
    suggestions: Arc<dyn SuggestionRepository>,
    responses: Arc<dyn ResponseRepository>,
    notes: Arc<dyn NoteRepository>,
    tokens: Arc<dyn LoginTokenRepository>,
}

async fn build_repositories(config: &ServerConfig) -> std::io::Result<Repositories> {
    match &config.database_url {
        Some(url) => {
            let pool = DbPool::new(PoolConfig::new(url.clone()))
                .await
                .map_err(|err| std::io::Error::other(format!("database pool: {err}")))?;
            info!("using PostgreSQL persistence");
            Ok(Repositories {
                users: Arc::new(DieselUserRepository::new(pool.clone())),
                pups: Arc::new(DieselPupRepository::new(pool.clone())),
                friendships: Arc::new(DieselFriendshipRepository::new(pool.clone())),
                hangouts: Arc::new(DieselHangoutRepository::new(pool.clone())),
                suggestions: Arc::new(DieselSuggestionRepository::new(pool.clone())),
                responses: Arc::new(DieselResponseRepository::new(pool.clone())),
                notes: Arc::new(DieselNoteRepository::new(pool.clone())),
                tokens: Arc::new(DieselLoginTokenRepository::new(pool)),
            })
        }
        None => {
            info!("no database configured; using in-memory persistence");
            let store = InMemoryStore::new();
            Ok(Repositories {
                users: Arc::new(store.clone()),
                pups: Arc::new(store.clone()),
                friendships: Arc::new(store.clone()),
                hangouts: Arc::new(store.clone()),
                suggestions: Arc::new(store.clone()),
                responses: Arc::new(store.clone()),
                notes: Arc::new(store.clone()),
                tokens: Arc::new(store),
            })
        }
    }
}

fn build_whatsapp_sender(config: &ServerConfig) -> Arc<dyn WhatsAppSender> {
    match &config.whatsapp {
        Some(settings) => Arc::new(HttpWhatsAppSender::new(settings.clone())),
        None => {
            info!("whatsapp delivery disabled; notification sends will be skipped");
            Arc::new(DisabledWhatsAppSender)
        }
    }
}

fn build_mailer(config: &ServerConfig) -> Arc<dyn EmailSender> {
    match &config.mailer {
        Some(settings) => Arc::new(HttpMailer::new(settings.clone())),
        None => Arc::new(DisabledEmailSender),
    }
}

/// Build the full HTTP state from configuration.
pub async fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let repos = build_repositories(config).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let dispatcher =
        NotificationDispatcher::new(build_whatsapp_sender(config), DispatchPolicy::default());

    let storage: Arc<dyn ObjectStorage> = Arc::new(
        DirObjectStorage::open(&config.media_dir, "/media")
            .map_err(|err| std::io::Error::other(format!("media storage: {err}")))?,
    );

    let hangouts = HangoutService::new(HangoutServiceDeps {
        hangouts: repos.hangouts.clone(),
        pups: repos.pups.clone(),
        friendships: repos.friendships.clone(),
        users: repos.users.clone(),
        responses: repos.responses.clone(),
        notes: repos.notes.clone(),
        clock: clock.clone(),
        dispatcher: dispatcher.clone(),
    });
    let suggestions = SuggestionService::new(SuggestionServiceDeps {
        suggestions: repos.suggestions.clone(),
        hangouts: repos.hangouts.clone(),
        pups: repos.pups.clone(),
        friendships: repos.friendships.clone(),
        users: repos.users.clone(),
        dispatcher,
    });
    let friendships = FriendshipService::new(
        repos.friendships.clone(),
        repos.pups.clone(),
        repos.users.clone(),
    );
    let accounts = AccountService::new(repos.users.clone(), repos.pups.clone());
    let login = LoginService::new(repos.tokens.clone(), repos.users.clone(), clock);

    Ok(HttpState {
        accounts,
        friendships,
        hangouts,
        suggestions,
        login,
        users: repos.users,
        mailer: build_mailer(config),
        storage,
        admin_token: config.admin_token.clone(),
        contact_address: config.contact_address.clone(),
    })
}
