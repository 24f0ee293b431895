//! Shared fixtures for the HTTP integration tests.
//!
//! Builds the real routing table over the in-memory adapters, so tests
//! exercise the same handlers, session middleware shape, and error mapping
//! as production without external services.

use std::sync::{Arc, Mutex};

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use dogcal_backend::domain::ports::{
    Clock, FriendshipRepository, ObjectStorage, PupRepository, SendError, StorageError,
    StoredObject, SystemClock, UserRepository, WhatsAppSender,
};
use dogcal_backend::domain::{
    AccountService, DispatchPolicy, DisplayName, FriendshipService, HangoutEventKind,
    HangoutService, HangoutServiceDeps, IssueTokenRequest, LoginService, NotificationDispatcher,
    NotificationMessage, PhoneNumber, Pup, PupFriendship, PupName, SuggestionService,
    SuggestionServiceDeps, User, UserDraft, UserId, UserRole,
};
use dogcal_backend::inbound::http::state::HttpState;
use dogcal_backend::outbound::memory::InMemoryStore;

/// WhatsApp sender recording deliveries instead of calling a provider.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<(String, HangoutEventKind)>>,
}

impl RecordingSender {
    pub fn deliveries(&self) -> Vec<(String, HangoutEventKind)> {
        self.sent.lock().expect("sender lock").clone()
    }
}

#[async_trait]
impl WhatsAppSender for RecordingSender {
    async fn send(
        &self,
        to: &PhoneNumber,
        message: &NotificationMessage,
    ) -> Result<(), SendError> {
        self.sent
            .lock()
            .expect("sender lock")
            .push((to.as_ref().to_owned(), message.kind));
        Ok(())
    }
}

/// Object store keeping uploads in memory.
#[derive(Default, Clone)]
pub struct RecordingStorage {
    objects: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl RecordingStorage {
    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .expect("storage lock")
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }
}

#[async_trait]
impl ObjectStorage for RecordingStorage {
    async fn put(
        &self,
        key: &str,
        _content_type: &str,
        bytes: &[u8],
    ) -> Result<StoredObject, StorageError> {
        self.objects
            .lock()
            .expect("storage lock")
            .push((key.to_owned(), bytes.to_vec()));
        Ok(StoredObject {
            key: key.to_owned(),
            url: format!("/media/{key}"),
        })
    }
}

/// Everything a test needs: the state for the app plus seeding handles.
pub struct TestContext {
    pub store: InMemoryStore,
    pub sender: Arc<RecordingSender>,
    pub storage: RecordingStorage,
    pub state: HttpState,
}

/// Build an [`HttpState`] over the in-memory store with recording doubles.
pub fn test_context(admin_token: Option<&str>) -> TestContext {
    let store = InMemoryStore::new();
    let sender = Arc::new(RecordingSender::default());
    let storage = RecordingStorage::default();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let dispatcher =
        NotificationDispatcher::new(sender.clone(), DispatchPolicy::immediate());

    let hangouts = HangoutService::new(HangoutServiceDeps {
        hangouts: Arc::new(store.clone()),
        pups: Arc::new(store.clone()),
        friendships: Arc::new(store.clone()),
        users: Arc::new(store.clone()),
        responses: Arc::new(store.clone()),
        notes: Arc::new(store.clone()),
        clock: clock.clone(),
        dispatcher: dispatcher.clone(),
    });
    let suggestions = SuggestionService::new(SuggestionServiceDeps {
        suggestions: Arc::new(store.clone()),
        hangouts: Arc::new(store.clone()),
        pups: Arc::new(store.clone()),
        friendships: Arc::new(store.clone()),
        users: Arc::new(store.clone()),
        dispatcher,
    });
    let friendships = FriendshipService::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
    );
    let accounts = AccountService::new(Arc::new(store.clone()), Arc::new(store.clone()));
    let login = LoginService::new(Arc::new(store.clone()), Arc::new(store.clone()), clock);

    let state = HttpState {
        accounts,
        friendships,
        hangouts,
        suggestions,
        login,
        users: Arc::new(store.clone()),
        mailer: Arc::new(dogcal_backend::domain::ports::DisabledEmailSender),
        storage: Arc::new(storage.clone()),
        admin_token: admin_token.map(str::to_owned),
        contact_address: None,
    };

    TestContext {
        store,
        sender,
        storage,
        state,
    }
}

/// Session middleware matching production shape, minus the Secure flag.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Seed a user directly through the repository port.
pub async fn seed_user(store: &InMemoryStore, name: &str, role: UserRole, phone: Option<&str>) -> User {
    let user = User::new(UserDraft {
        id: UserId::random(),
        display_name: DisplayName::new(name).expect("valid name"),
        role,
        phone_number: phone.map(|p| PhoneNumber::new(p).expect("valid phone")),
        profile_photo_url: None,
        address_text: None,
    });
    UserRepository::create(store, &user).await.expect("seed user");
    user
}

/// Seed a pup owned by `owner`.
pub async fn seed_pup(store: &InMemoryStore, name: &str, owner: &User) -> Pup {
    let pup = Pup::new(
        Uuid::new_v4(),
        PupName::new(name).expect("valid name"),
        owner.id(),
        None,
        None,
    );
    PupRepository::create(store, &pup).await.expect("seed pup");
    pup
}

/// Seed a friendship between a pup and a friend.
pub async fn seed_friendship(store: &InMemoryStore, pup: &Pup, friend: &User) -> PupFriendship {
    let friendship = PupFriendship::new(Uuid::new_v4(), pup.id(), friend.id(), None);
    FriendshipRepository::create(store, &friendship)
        .await
        .expect("seed friendship");
    friendship
}

/// Issue a multi-use login token for `user` and return its raw secret.
pub async fn issue_token(state: &HttpState, user: &User) -> String {
    state
        .login
        .issue(IssueTokenRequest {
            user_id: user.id(),
            destination: None,
            ttl: Some(Duration::hours(1)),
            single_use: false,
        })
        .await
        .expect("issue token")
        .secret
        .reveal()
        .to_owned()
}

/// Extract the session cookie from a response.
pub fn session_cookie<B>(res: &actix_web::dev::ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}
