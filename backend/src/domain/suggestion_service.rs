//! Suggestion workflow use-cases.
//!
//! A friend proposes a hangout time for a pup they are befriended with; the
//! owner approves or rejects. Approval materialises a hangout assigned to
//! the proposing friend. Decisions are first-write-wins: a second decision
//! on the same suggestion observes a conflict.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::domain::dispatcher::NotificationDispatcher;
use crate::domain::error::Error;
use crate::domain::hangout::{Hangout, HangoutDraft, HangoutStatus, TimeWindow};
use crate::domain::hangout_service::TransitionOutcome;
use crate::domain::notification::{
    HangoutEventKind, NotificationMessage, Recipient, TemplateVars,
};
use crate::domain::ports::{
    DecisionWrite, FriendshipPersistenceError, FriendshipRepository, HangoutPersistenceError,
    HangoutRepository, PupPersistenceError, PupRepository, SuggestionPersistenceError,
    SuggestionRepository, UserPersistenceError, UserRepository,
};
use crate::domain::pup::Pup;
use crate::domain::suggestion::{HangoutSuggestion, SuggestionStatus};
use crate::domain::user::{ActingUser, UserRole};

fn map_suggestion_error(error: SuggestionPersistenceError) -> Error {
    match error {
        SuggestionPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("suggestion repository unavailable: {message}"))
        }
        SuggestionPersistenceError::Query { message } => {
            Error::internal(format!("suggestion repository error: {message}"))
        }
    }
}

fn map_hangout_error(error: HangoutPersistenceError) -> Error {
    match error {
        HangoutPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("hangout repository unavailable: {message}"))
        }
        HangoutPersistenceError::Query { message } => {
            Error::internal(format!("hangout repository error: {message}"))
        }
    }
}

fn map_pup_error(error: PupPersistenceError) -> Error {
    match error {
        PupPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("pup repository unavailable: {message}"))
        }
        PupPersistenceError::Query { message } => {
            Error::internal(format!("pup repository error: {message}"))
        }
    }
}

fn map_friendship_error(error: FriendshipPersistenceError) -> Error {
    match error {
        FriendshipPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("friendship repository unavailable: {message}"))
        }
        FriendshipPersistenceError::Query { message }
        | FriendshipPersistenceError::DuplicatePair { message } => {
            Error::internal(format!("friendship repository error: {message}"))
        }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } | UserPersistenceError::Duplicate { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

/// Request payload for proposing a hangout.
#[derive(Debug, Clone)]
pub struct CreateSuggestionRequest {
    /// Pup the proposal is for.
    pub pup_id: Uuid,
    /// Proposed care window.
    pub window: TimeWindow,
    /// Optional comment shown to the owner.
    pub friend_comment: Option<String>,
}

/// An approval decision plus the materialised hangout and delivery reports.
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    /// The suggestion after the decision.
    pub suggestion: HangoutSuggestion,
    /// The hangout created from it.
    pub transition: TransitionOutcome,
}

/// Dependency bundle for [`SuggestionService`].
pub struct SuggestionServiceDeps {
    /// Suggestion persistence.
    pub suggestions: Arc<dyn SuggestionRepository>,
    /// Hangout persistence.
    pub hangouts: Arc<dyn HangoutRepository>,
    /// Pup persistence.
    pub pups: Arc<dyn PupRepository>,
    /// Friendship persistence.
    pub friendships: Arc<dyn FriendshipRepository>,
    /// User persistence.
    pub users: Arc<dyn UserRepository>,
    /// Notification fan-out worker.
    pub dispatcher: NotificationDispatcher,
}

/// Domain service owning the suggestion workflow.
#[derive(Clone)]
pub struct SuggestionService {
    suggestions: Arc<dyn SuggestionRepository>,
    hangouts: Arc<dyn HangoutRepository>,
    pups: Arc<dyn PupRepository>,
    friendships: Arc<dyn FriendshipRepository>,
    users: Arc<dyn UserRepository>,
    dispatcher: NotificationDispatcher,
}

impl SuggestionService {
    /// Create the service from its dependency bundle.
    pub fn new(deps: SuggestionServiceDeps) -> Self {
        let SuggestionServiceDeps {
            suggestions,
            hangouts,
            pups,
            friendships,
            users,
            dispatcher,
        } = deps;
        Self {
            suggestions,
            hangouts,
            pups,
            friendships,
            users,
            dispatcher,
        }
    }

    /// Propose a hangout time. The proposer must have the friend role and a
    /// friendship with the pup; a proposal without one is rejected here, at
    /// creation, so no dangling pending suggestion can exist.
    pub async fn create_suggestion(
        &self,
        acting: &ActingUser,
        request: CreateSuggestionRequest,
    ) -> Result<HangoutSuggestion, Error> {
        if acting.role != UserRole::Friend {
            return Err(Error::forbidden("only friends can suggest hangouts"));
        }
        let pup = self.require_pup(request.pup_id).await?;
        self.require_friendship(&pup, acting).await?;

        let suggestion = HangoutSuggestion::pending(
            Uuid::new_v4(),
            pup.id(),
            acting.id,
            request.window,
            request.friend_comment,
        );
        self.suggestions
            .create(&suggestion)
            .await
            .map_err(map_suggestion_error)?;
        Ok(suggestion)
    }

    /// List the pending suggestions for a pup the acting user owns.
    pub async fn list_pending(
        &self,
        acting: &ActingUser,
        pup_id: Uuid,
    ) -> Result<Vec<HangoutSuggestion>, Error> {
        let pup = self.require_pup(pup_id).await?;
        require_pup_owner(acting, &pup)?;
        self.suggestions
            .list_pending_by_pup(pup_id)
            .await
            .map_err(map_suggestion_error)
    }

    /// Approve a pending suggestion, materialising an assigned hangout for
    /// the proposing friend and notifying them.
    ///
    /// First decision wins: a suggestion that is no longer pending yields a
    /// conflict and no second hangout.
    pub async fn approve(
        &self,
        acting: &ActingUser,
        suggestion_id: Uuid,
    ) -> Result<ApprovalOutcome, Error> {
        let (suggestion, pup) = self.require_decidable(acting, suggestion_id).await?;

        let decided = self
            .apply_decision(suggestion.id(), SuggestionStatus::Approved)
            .await?;

        let hangout = Hangout::new(HangoutDraft {
            id: Uuid::new_v4(),
            pup_id: pup.id(),
            window: decided.window(),
            status: HangoutStatus::Assigned,
            assigned_friend_user_id: Some(decided.suggested_by_friend_user_id()),
            created_by_owner_id: acting.id,
            owner_notes: None,
            event_name: None,
        })
        .map_err(|err| Error::internal(format!("invalid approval hangout: {err}")))?;
        self.hangouts
            .create(&hangout)
            .await
            .map_err(map_hangout_error)?;

        let friend = self
            .users
            .find_by_id(decided.suggested_by_friend_user_id())
            .await
            .map_err(map_user_error)?;
        let deliveries = match friend {
            Some(friend) => {
                let vars = TemplateVars {
                    owner_name: acting.display_name.as_ref().to_owned(),
                    friend_name: friend.display_name().as_ref().to_owned(),
                    pup_name: pup.name().as_ref().to_owned(),
                    window: hangout.window(),
                    event_name: None,
                };
                let message = NotificationMessage::render(HangoutEventKind::Confirmed, vars);
                self.dispatcher
                    .dispatch(&message, &[Recipient::from(&friend)])
                    .await
            }
            None => Vec::new(),
        };

        Ok(ApprovalOutcome {
            suggestion: decided,
            transition: TransitionOutcome {
                hangout,
                deliveries,
            },
        })
    }

    /// Reject a pending suggestion. No hangout is created.
    pub async fn reject(
        &self,
        acting: &ActingUser,
        suggestion_id: Uuid,
    ) -> Result<HangoutSuggestion, Error> {
        let (suggestion, _pup) = self.require_decidable(acting, suggestion_id).await?;
        self.apply_decision(suggestion.id(), SuggestionStatus::Rejected)
            .await
    }

    async fn require_decidable(
        &self,
        acting: &ActingUser,
        suggestion_id: Uuid,
    ) -> Result<(HangoutSuggestion, Pup), Error> {
        let suggestion = self
            .suggestions
            .find_by_id(suggestion_id)
            .await
            .map_err(map_suggestion_error)?
            .ok_or_else(|| Error::not_found("suggestion does not exist"))?;
        let pup = self.require_pup(suggestion.pup_id()).await?;
        require_pup_owner(acting, &pup)?;
        Ok((suggestion, pup))
    }

    async fn apply_decision(
        &self,
        suggestion_id: Uuid,
        decision: SuggestionStatus,
    ) -> Result<HangoutSuggestion, Error> {
        let write = self
            .suggestions
            .decide_if_pending(suggestion_id, decision)
            .await
            .map_err(map_suggestion_error)?;
        match write {
            DecisionWrite::Applied(suggestion) => Ok(suggestion),
            DecisionWrite::Missing => Err(Error::not_found("suggestion does not exist")),
            DecisionWrite::AlreadyDecided { current } => {
                Err(Error::conflict("suggestion has already been decided")
                    .with_details(json!({ "status": current.as_str() })))
            }
        }
    }

    async fn require_pup(&self, id: Uuid) -> Result<Pup, Error> {
        self.pups
            .find_by_id(id)
            .await
            .map_err(map_pup_error)?
            .ok_or_else(|| Error::not_found("pup does not exist"))
    }

    async fn require_friendship(&self, pup: &Pup, acting: &ActingUser) -> Result<(), Error> {
        self.friendships
            .find_by_pup_and_friend(pup.id(), acting.id)
            .await
            .map_err(map_friendship_error)?
            .ok_or_else(|| Error::forbidden("no friendship with this pup"))?;
        Ok(())
    }
}

fn require_pup_owner(acting: &ActingUser, pup: &Pup) -> Result<(), Error> {
    if acting.id == pup.owner_user_id() {
        Ok(())
    } else {
        Err(Error::forbidden("only the pup's owner can do this"))
    }
}

#[cfg(test)]
#[path = "suggestion_service_tests.rs"]
mod tests;
