//! In-memory persistence adapters.
//!
//! Used when no database URL is configured (local development, demos) and by
//! the integration tests. One shared store implements every repository port;
//! the conditional writes hold the store lock for the whole check-and-write,
//! which gives the same first-writer-wins guarantee the SQL adapters get
//! from conditional `UPDATE` statements.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::friendship::PupFriendship;
use crate::domain::hangout::{Hangout, HangoutStatus};
use crate::domain::login_token::LoginToken;
use crate::domain::note::HangoutNote;
use crate::domain::ports::{
    ConditionalWrite, DecisionWrite, FriendshipPersistenceError, FriendshipRepository,
    HangoutPersistenceError, HangoutRepository, LoginTokenPersistenceError, LoginTokenRepository,
    NotePersistenceError, NoteRepository, PupPersistenceError, PupRepository,
    ResponsePersistenceError, ResponseRepository, SuggestionPersistenceError,
    SuggestionRepository, UserPersistenceError, UserRepository,
};
use crate::domain::pup::Pup;
use crate::domain::response::HangoutResponse;
use crate::domain::suggestion::{HangoutSuggestion, SuggestionStatus};
use crate::domain::user::{User, UserId};

#[derive(Default)]
struct StoreState {
    users: HashMap<UserId, User>,
    pups: HashMap<Uuid, Pup>,
    friendships: HashMap<Uuid, PupFriendship>,
    hangouts: HashMap<Uuid, Hangout>,
    suggestions: HashMap<Uuid, HangoutSuggestion>,
    responses: HashMap<(Uuid, UserId), HangoutResponse>,
    notes: Vec<HangoutNote>,
    tokens: HashMap<String, LoginToken>,
}

/// Shared in-memory store implementing all repository ports.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self.lock();
        if state.users.contains_key(&user.id()) {
            return Err(UserPersistenceError::duplicate(user.id().to_string()));
        }
        state.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock().users.get(&id).cloned())
    }
}

#[async_trait]
impl PupRepository for InMemoryStore {
    async fn create(&self, pup: &Pup) -> Result<(), PupPersistenceError> {
        self.lock().pups.insert(pup.id(), pup.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Pup>, PupPersistenceError> {
        Ok(self.lock().pups.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Pup>, PupPersistenceError> {
        let mut pups: Vec<Pup> = self
            .lock()
            .pups
            .values()
            .filter(|pup| pup.owner_user_id() == owner)
            .cloned()
            .collect();
        pups.sort_by(|a, b| a.name().as_ref().cmp(b.name().as_ref()));
        Ok(pups)
    }
}

#[async_trait]
impl FriendshipRepository for InMemoryStore {
    async fn create(&self, friendship: &PupFriendship) -> Result<(), FriendshipPersistenceError> {
        let mut state = self.lock();
        let duplicate = state.friendships.values().any(|existing| {
            existing.pup_id() == friendship.pup_id()
                && existing.friend_user_id() == friendship.friend_user_id()
        });
        if duplicate {
            return Err(FriendshipPersistenceError::duplicate_pair(format!(
                "pup {} and friend {}",
                friendship.pup_id(),
                friendship.friend_user_id()
            )));
        }
        state.friendships.insert(friendship.id(), friendship.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<PupFriendship>, FriendshipPersistenceError> {
        Ok(self.lock().friendships.get(&id).cloned())
    }

    async fn find_by_pup_and_friend(
        &self,
        pup_id: Uuid,
        friend_user_id: UserId,
    ) -> Result<Option<PupFriendship>, FriendshipPersistenceError> {
        Ok(self
            .lock()
            .friendships
            .values()
            .find(|f| f.pup_id() == pup_id && f.friend_user_id() == friend_user_id)
            .cloned())
    }

    async fn list_by_pup(
        &self,
        pup_id: Uuid,
    ) -> Result<Vec<PupFriendship>, FriendshipPersistenceError> {
        let mut friendships: Vec<PupFriendship> = self
            .lock()
            .friendships
            .values()
            .filter(|f| f.pup_id() == pup_id)
            .cloned()
            .collect();
        friendships.sort_by_key(PupFriendship::id);
        Ok(friendships)
    }

    async fn update_history(
        &self,
        id: Uuid,
        history_with_pup: Option<String>,
    ) -> Result<Option<PupFriendship>, FriendshipPersistenceError> {
        let mut state = self.lock();
        match state.friendships.get_mut(&id) {
            Some(friendship) => {
                friendship.set_history_with_pup(history_with_pup);
                Ok(Some(friendship.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, FriendshipPersistenceError> {
        Ok(self.lock().friendships.remove(&id).is_some())
    }
}

#[async_trait]
impl HangoutRepository for InMemoryStore {
    async fn create(&self, hangout: &Hangout) -> Result<(), HangoutPersistenceError> {
        self.lock().hangouts.insert(hangout.id(), hangout.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Hangout>, HangoutPersistenceError> {
        Ok(self.lock().hangouts.get(&id).cloned())
    }

    async fn list_by_pup(&self, pup_id: Uuid) -> Result<Vec<Hangout>, HangoutPersistenceError> {
        let mut hangouts: Vec<Hangout> = self
            .lock()
            .hangouts
            .values()
            .filter(|h| h.pup_id() == pup_id)
            .cloned()
            .collect();
        hangouts.sort_by(|a, b| b.window().start_at().cmp(&a.window().start_at()));
        Ok(hangouts)
    }

    async fn assign_if_open(
        &self,
        id: Uuid,
        friend: UserId,
    ) -> Result<ConditionalWrite, HangoutPersistenceError> {
        let mut state = self.lock();
        let Some(hangout) = state.hangouts.get(&id) else {
            return Ok(ConditionalWrite::Missing);
        };
        if hangout.status() != HangoutStatus::Open {
            return Ok(ConditionalWrite::StatusConflict {
                current: hangout.status(),
            });
        }
        let assigned = hangout.assigned_to(friend);
        state.hangouts.insert(id, assigned.clone());
        Ok(ConditionalWrite::Applied(assigned))
    }

    async fn unassign_if_assigned_to(
        &self,
        id: Uuid,
        friend: UserId,
    ) -> Result<ConditionalWrite, HangoutPersistenceError> {
        let mut state = self.lock();
        let Some(hangout) = state.hangouts.get(&id) else {
            return Ok(ConditionalWrite::Missing);
        };
        if hangout.status() != HangoutStatus::Assigned {
            return Ok(ConditionalWrite::StatusConflict {
                current: hangout.status(),
            });
        }
        if hangout.assigned_friend_user_id() != Some(friend) {
            return Ok(ConditionalWrite::AssigneeMismatch);
        }
        let reopened = hangout.unassigned();
        state.hangouts.insert(id, reopened.clone());
        Ok(ConditionalWrite::Applied(reopened))
    }
}

#[async_trait]
impl SuggestionRepository for InMemoryStore {
    async fn create(
        &self,
        suggestion: &HangoutSuggestion,
    ) -> Result<(), SuggestionPersistenceError> {
        self.lock()
            .suggestions
            .insert(suggestion.id(), suggestion.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<HangoutSuggestion>, SuggestionPersistenceError> {
        Ok(self.lock().suggestions.get(&id).cloned())
    }

    async fn list_pending_by_pup(
        &self,
        pup_id: Uuid,
    ) -> Result<Vec<HangoutSuggestion>, SuggestionPersistenceError> {
        let mut suggestions: Vec<HangoutSuggestion> = self
            .lock()
            .suggestions
            .values()
            .filter(|s| s.pup_id() == pup_id && s.status() == SuggestionStatus::Pending)
            .cloned()
            .collect();
        suggestions.sort_by_key(|s| s.window().start_at());
        Ok(suggestions)
    }

    async fn decide_if_pending(
        &self,
        id: Uuid,
        decision: SuggestionStatus,
    ) -> Result<DecisionWrite, SuggestionPersistenceError> {
        let mut state = self.lock();
        let Some(suggestion) = state.suggestions.get(&id) else {
            return Ok(DecisionWrite::Missing);
        };
        if suggestion.status() != SuggestionStatus::Pending {
            return Ok(DecisionWrite::AlreadyDecided {
                current: suggestion.status(),
            });
        }
        let decided = HangoutSuggestion::from_parts(
            suggestion.id(),
            suggestion.pup_id(),
            suggestion.suggested_by_friend_user_id(),
            suggestion.window(),
            suggestion.friend_comment().map(str::to_owned),
            decision,
        );
        state.suggestions.insert(id, decided.clone());
        Ok(DecisionWrite::Applied(decided))
    }
}

#[async_trait]
impl ResponseRepository for InMemoryStore {
    async fn upsert(&self, response: &HangoutResponse) -> Result<(), ResponsePersistenceError> {
        self.lock().responses.insert(
            (response.hangout_id(), response.responder_user_id()),
            response.clone(),
        );
        Ok(())
    }

    async fn list_by_hangout(
        &self,
        hangout_id: Uuid,
    ) -> Result<Vec<HangoutResponse>, ResponsePersistenceError> {
        let mut responses: Vec<HangoutResponse> = self
            .lock()
            .responses
            .values()
            .filter(|r| r.hangout_id() == hangout_id)
            .cloned()
            .collect();
        responses.sort_by_key(HangoutResponse::responded_at);
        Ok(responses)
    }
}

#[async_trait]
impl NoteRepository for InMemoryStore {
    async fn append(&self, note: &HangoutNote) -> Result<(), NotePersistenceError> {
        self.lock().notes.push(note.clone());
        Ok(())
    }

    async fn list_page(
        &self,
        hangout_id: Uuid,
        skip: u32,
        take: u32,
    ) -> Result<Vec<HangoutNote>, NotePersistenceError> {
        let state = self.lock();
        let mut notes: Vec<HangoutNote> = state
            .notes
            .iter()
            .filter(|note| note.hangout_id() == hangout_id)
            .cloned()
            .collect();
        notes.sort_by_key(HangoutNote::created_at);
        Ok(notes
            .into_iter()
            .skip(skip as usize)
            .take(take as usize)
            .collect())
    }
}

#[async_trait]
impl LoginTokenRepository for InMemoryStore {
    async fn insert(&self, token: &LoginToken) -> Result<(), LoginTokenPersistenceError> {
        self.lock().tokens.insert(token.digest.clone(), token.clone());
        Ok(())
    }

    async fn redeem(
        &self,
        digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<LoginToken>, LoginTokenPersistenceError> {
        let mut state = self.lock();
        let Some(token) = state.tokens.get_mut(digest) else {
            return Ok(None);
        };
        if !token.is_usable(now) {
            return Ok(None);
        }
        if token.single_use {
            token.consumed_at = Some(now);
        }
        Ok(Some(token.clone()))
    }
}
