//! Hangout lifecycle use-cases.
//!
//! Owns the status transitions of a hangout and the authorization rules for
//! who may trigger each one. Every transition is persisted first; the
//! notification fan-out runs afterwards and its outcomes ride along in the
//! result rather than influencing it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::domain::calendar;
use crate::domain::dispatcher::NotificationDispatcher;
use crate::domain::error::Error;
use crate::domain::friendship::PupFriendship;
use crate::domain::hangout::{Hangout, HangoutStatus, TimeWindow};
use crate::domain::note::HangoutNote;
use crate::domain::notification::{
    DeliveryReport, HangoutEventKind, NotificationMessage, Recipient, TemplateVars,
};
use crate::domain::ports::{
    Clock, ConditionalWrite, FriendshipPersistenceError, FriendshipRepository,
    HangoutPersistenceError, HangoutRepository, NotePersistenceError, NoteRepository,
    PupPersistenceError, PupRepository, ResponsePersistenceError, ResponseRepository,
    UserPersistenceError, UserRepository,
};
use crate::domain::pup::Pup;
use crate::domain::response::{HangoutResponse, ResponseAnswer};
use crate::domain::user::{ActingUser, User, UserId, UserRole};

/// Default page size for note listings.
pub const NOTES_PAGE_DEFAULT: u32 = 20;
/// Maximum page size for note listings.
pub const NOTES_PAGE_MAX: u32 = 50;

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

fn map_response_error(error: ResponsePersistenceError) -> Error {
    match error {
        ResponsePersistenceError::Connection { message } => {
            Error::service_unavailable(format!("response repository unavailable: {message}"))
        }
        ResponsePersistenceError::Query { message } => {
            Error::internal(format!("response repository error: {message}"))
        }
    }
}

fn map_note_error(error: NotePersistenceError) -> Error {
    match error {
        NotePersistenceError::Connection { message } => {
            Error::service_unavailable(format!("note repository unavailable: {message}"))
        }
        NotePersistenceError::Query { message } => {
            Error::internal(format!("note repository error: {message}"))
        }
    }
}

fn status_conflict(current: HangoutStatus) -> Error {
    Error::conflict("hangout is not in the required status")
        .with_details(json!({ "status": current.as_str() }))
}

/// Request payload for creating a hangout.
#[derive(Debug, Clone)]
pub struct CreateHangoutRequest {
    /// Pup the slot cares for.
    pub pup_id: Uuid,
    /// Care window.
    pub window: TimeWindow,
    /// Optional notes from the owner.
    pub owner_notes: Option<String>,
    /// Optional custom name for calendars and messages.
    pub event_name: Option<String>,
}

/// A persisted transition plus the per-recipient notification outcomes.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    /// The hangout after the transition.
    pub hangout: Hangout,
    /// Best-effort delivery reports, in dispatch order.
    pub deliveries: Vec<DeliveryReport>,
}

/// Dependency bundle for [`HangoutService`].
pub struct HangoutServiceDeps {
    /// Hangout persistence.
    pub hangouts: Arc<dyn HangoutRepository>,
    /// Pup persistence.
    pub pups: Arc<dyn PupRepository>,
    /// Friendship persistence.
    pub friendships: Arc<dyn FriendshipRepository>,
    /// User persistence.
    pub users: Arc<dyn UserRepository>,
    /// Response persistence.
    pub responses: Arc<dyn ResponseRepository>,
    /// Note persistence.
    pub notes: Arc<dyn NoteRepository>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
    /// Notification fan-out worker.
    pub dispatcher: NotificationDispatcher,
}

/// Domain service owning the hangout lifecycle.
#[derive(Clone)]
pub struct HangoutService {
    hangouts: Arc<dyn HangoutRepository>,
    pups: Arc<dyn PupRepository>,
    friendships: Arc<dyn FriendshipRepository>,
    users: Arc<dyn UserRepository>,
    responses: Arc<dyn ResponseRepository>,
    notes: Arc<dyn NoteRepository>,
    clock: Arc<dyn Clock>,
    dispatcher: NotificationDispatcher,
}

impl HangoutService {
    /// Create the service from its dependency bundle.
    pub fn new(deps: HangoutServiceDeps) -> Self {
        let HangoutServiceDeps {
            hangouts,
            pups,
            friendships,
            users,
            responses,
            notes,
            clock,
            dispatcher,
        } = deps;
        Self {
            hangouts,
            pups,
            friendships,
            users,
            responses,
            notes,
            clock,
            dispatcher,
        }
    }

    /// Create an open hangout for a pup the acting user owns.
    pub async fn create_hangout(
        &self,
        acting: &ActingUser,
        request: CreateHangoutRequest,
    ) -> Result<Hangout, Error> {
        let pup = self.require_pup(request.pup_id).await?;
        require_pup_owner(acting, &pup)?;

        let hangout = Hangout::open(
            Uuid::new_v4(),
            pup.id(),
            request.window,
            acting.id,
            request.owner_notes,
            request.event_name,
        );
        self.hangouts
            .create(&hangout)
            .await
            .map_err(map_hangout_error)?;
        Ok(hangout)
    }

    /// Fetch one hangout for the owner or a befriended friend of its pup.
    pub async fn get_hangout(&self, acting: &ActingUser, id: Uuid) -> Result<Hangout, Error> {
        let hangout = self.require_hangout(id).await?;
        self.require_view_access(acting, &hangout).await?;
        Ok(hangout)
    }

    /// List a pup's hangouts for its owner or a befriended friend.
    pub async fn list_by_pup(
        &self,
        acting: &ActingUser,
        pup_id: Uuid,
    ) -> Result<Vec<Hangout>, Error> {
        let pup = self.require_pup(pup_id).await?;
        if acting.id != pup.owner_user_id() {
            self.require_friendship(pup_id, acting.id).await?;
        }
        self.hangouts
            .list_by_pup(pup_id)
            .await
            .map_err(map_hangout_error)
    }

    /// Self-assign: a befriended friend takes an open slot.
    ///
    /// Dispatches an "assigned" notification to the creating owner.
    pub async fn self_assign(
        &self,
        acting: &ActingUser,
        hangout_id: Uuid,
    ) -> Result<TransitionOutcome, Error> {
        if acting.role != UserRole::Friend {
            return Err(Error::forbidden("only friends can take a hangout"));
        }
        let hangout = self.require_hangout(hangout_id).await?;
        self.require_friendship(hangout.pup_id(), acting.id).await?;

        let assigned = self.apply_assign(hangout_id, acting.id).await?;
        let pup = self.require_pup(assigned.pup_id()).await?;

        let vars = self
            .template_vars(&assigned, &pup, acting.display_name.as_ref().to_owned())
            .await?;
        let message = NotificationMessage::render(HangoutEventKind::Assigned, vars);
        let owner = self.recipient_for(assigned.created_by_owner_id()).await;
        let deliveries = self.dispatcher.dispatch(&message, &owner).await;

        Ok(TransitionOutcome {
            hangout: assigned,
            deliveries,
        })
    }

    /// Quick-assign: the owner attaches a named, befriended friend.
    ///
    /// Dispatches a "confirmed" notification to the assigned friend and a
    /// "closed" notification to every other friend of the pup.
    pub async fn quick_assign(
        &self,
        acting: &ActingUser,
        hangout_id: Uuid,
        friend_user_id: UserId,
    ) -> Result<TransitionOutcome, Error> {
        let hangout = self.require_hangout(hangout_id).await?;
        let pup = self.require_pup(hangout.pup_id()).await?;
        require_pup_owner(acting, &pup)?;

        let friend = self
            .users
            .find_by_id(friend_user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("friend user does not exist"))?;
        if friend.role() != UserRole::Friend {
            return Err(Error::forbidden("assignee must have the friend role"));
        }
        self.require_friendship(pup.id(), friend.id()).await?;

        let assigned = self.apply_assign(hangout_id, friend.id()).await?;

        let vars = self
            .template_vars(&assigned, &pup, friend.display_name().as_ref().to_owned())
            .await?;
        let confirmed = NotificationMessage::render(HangoutEventKind::Confirmed, vars.clone());
        let mut deliveries = self
            .dispatcher
            .dispatch(&confirmed, &[Recipient::from(&friend)])
            .await;

        let others = self.other_friends_of(pup.id(), friend.id()).await?;
        if !others.is_empty() {
            let closed = NotificationMessage::render(HangoutEventKind::Closed, vars);
            deliveries.extend(self.dispatcher.dispatch(&closed, &others).await);
        }

        Ok(TransitionOutcome {
            hangout: assigned,
            deliveries,
        })
    }

    /// Unassign: only the currently assigned friend can step back.
    ///
    /// Dispatches an "unassigned" notification to the creating owner.
    pub async fn unassign(
        &self,
        acting: &ActingUser,
        hangout_id: Uuid,
    ) -> Result<TransitionOutcome, Error> {
        let write = self
            .hangouts
            .unassign_if_assigned_to(hangout_id, acting.id)
            .await
            .map_err(map_hangout_error)?;
        let reopened = match write {
            ConditionalWrite::Applied(hangout) => hangout,
            ConditionalWrite::Missing => return Err(Error::not_found("hangout does not exist")),
            ConditionalWrite::StatusConflict { current } => {
                return Err(status_conflict(current));
            }
            ConditionalWrite::AssigneeMismatch => {
                return Err(Error::forbidden(
                    "only the currently assigned friend can unassign",
                ));
            }
        };

        let pup = self.require_pup(reopened.pup_id()).await?;
        let vars = self
            .template_vars(&reopened, &pup, acting.display_name.as_ref().to_owned())
            .await?;
        let message = NotificationMessage::render(HangoutEventKind::Unassigned, vars);
        let owner = self.recipient_for(reopened.created_by_owner_id()).await;
        let deliveries = self.dispatcher.dispatch(&message, &owner).await;

        Ok(TransitionOutcome {
            hangout: reopened,
            deliveries,
        })
    }

    /// Record a yes/no reply from a link-authenticated friend.
    ///
    /// Idempotent per (hangout, responder): repeated replies update the
    /// answer and timestamp in place. Does not mutate the hangout status.
    pub async fn respond(
        &self,
        acting: &ActingUser,
        hangout_id: Uuid,
        answer: ResponseAnswer,
    ) -> Result<HangoutResponse, Error> {
        if acting.role != UserRole::Friend {
            return Err(Error::forbidden("only friends can respond to an invite"));
        }
        let hangout = self.require_hangout(hangout_id).await?;
        if hangout.status() != HangoutStatus::Open {
            return Err(status_conflict(hangout.status()));
        }
        self.require_friendship(hangout.pup_id(), acting.id).await?;

        let response =
            HangoutResponse::new(hangout_id, acting.id, answer, self.clock.now());
        self.responses
            .upsert(&response)
            .await
            .map_err(map_response_error)?;
        Ok(response)
    }

    /// List the replies recorded for a hangout, oldest first.
    ///
    /// Owner only: the yes/no tally informs the owner's assignment
    /// decision.
    pub async fn list_responses(
        &self,
        acting: &ActingUser,
        hangout_id: Uuid,
    ) -> Result<Vec<HangoutResponse>, Error> {
        let hangout = self.require_hangout(hangout_id).await?;
        let pup = self.require_pup(hangout.pup_id()).await?;
        require_pup_owner(acting, &pup)?;
        self.responses
            .list_by_hangout(hangout_id)
            .await
            .map_err(map_response_error)
    }

    /// Append a note; the author must be the pup's owner or the assigned
    /// friend.
    pub async fn add_note(
        &self,
        acting: &ActingUser,
        hangout_id: Uuid,
        note_text: String,
    ) -> Result<HangoutNote, Error> {
        let hangout = self.require_hangout(hangout_id).await?;
        self.require_note_access(acting, &hangout).await?;

        let note = HangoutNote::new(
            Uuid::new_v4(),
            hangout_id,
            acting.id,
            note_text,
            self.clock.now(),
        )
        .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.notes.append(&note).await.map_err(map_note_error)?;
        Ok(note)
    }

    /// Read one page of a hangout's note log in creation order.
    ///
    /// `take` is clamped to [`NOTES_PAGE_MAX`]; `None` means
    /// [`NOTES_PAGE_DEFAULT`].
    pub async fn list_notes(
        &self,
        acting: &ActingUser,
        hangout_id: Uuid,
        skip: u32,
        take: Option<u32>,
    ) -> Result<Vec<HangoutNote>, Error> {
        let hangout = self.require_hangout(hangout_id).await?;
        self.require_note_access(acting, &hangout).await?;

        let take = take.unwrap_or(NOTES_PAGE_DEFAULT).min(NOTES_PAGE_MAX);
        self.notes
            .list_page(hangout_id, skip, take)
            .await
            .map_err(map_note_error)
    }

    /// Render a confirmed hangout as an iCalendar document.
    pub async fn calendar(
        &self,
        acting: &ActingUser,
        hangout_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<String, Error> {
        let hangout = self.require_hangout(hangout_id).await?;
        self.require_view_access(acting, &hangout).await?;
        let pup = self.require_pup(hangout.pup_id()).await?;
        calendar::hangout_to_ics(&hangout, pup.name().as_ref(), now)
    }

    async fn apply_assign(&self, hangout_id: Uuid, friend: UserId) -> Result<Hangout, Error> {
        let write = self
            .hangouts
            .assign_if_open(hangout_id, friend)
            .await
            .map_err(map_hangout_error)?;
        match write {
            ConditionalWrite::Applied(hangout) => Ok(hangout),
            ConditionalWrite::Missing => Err(Error::not_found("hangout does not exist")),
            ConditionalWrite::StatusConflict { current } => Err(status_conflict(current)),
            ConditionalWrite::AssigneeMismatch => {
                Err(Error::internal("unexpected assignee mismatch on assign"))
            }
        }
    }

    async fn require_hangout(&self, id: Uuid) -> Result<Hangout, Error> {
        self.hangouts
            .find_by_id(id)
            .await
            .map_err(map_hangout_error)?
            .ok_or_else(|| Error::not_found("hangout does not exist"))
    }

    async fn require_pup(&self, id: Uuid) -> Result<Pup, Error> {
        self.pups
            .find_by_id(id)
            .await
            .map_err(map_pup_error)?
            .ok_or_else(|| Error::not_found("pup does not exist"))
    }

    async fn require_friendship(
        &self,
        pup_id: Uuid,
        friend: UserId,
    ) -> Result<PupFriendship, Error> {
        self.friendships
            .find_by_pup_and_friend(pup_id, friend)
            .await
            .map_err(map_friendship_error)?
            .ok_or_else(|| Error::forbidden("no friendship with this pup"))
    }

    async fn require_view_access(
        &self,
        acting: &ActingUser,
        hangout: &Hangout,
    ) -> Result<(), Error> {
        let pup = self.require_pup(hangout.pup_id()).await?;
        if acting.id == pup.owner_user_id() {
            return Ok(());
        }
        self.require_friendship(pup.id(), acting.id).await?;
        Ok(())
    }

    async fn require_note_access(
        &self,
        acting: &ActingUser,
        hangout: &Hangout,
    ) -> Result<(), Error> {
        let pup = self.require_pup(hangout.pup_id()).await?;
        if acting.id == pup.owner_user_id() {
            return Ok(());
        }
        if hangout.assigned_friend_user_id() == Some(acting.id) {
            return Ok(());
        }
        Err(Error::forbidden(
            "notes are limited to the pup's owner and the assigned friend",
        ))
    }

    async fn template_vars(
        &self,
        hangout: &Hangout,
        pup: &Pup,
        friend_name: String,
    ) -> Result<TemplateVars, Error> {
        let owner_name = match self
            .users
            .find_by_id(pup.owner_user_id())
            .await
            .map_err(map_user_error)?
        {
            Some(owner) => owner.display_name().as_ref().to_owned(),
            None => {
                warn!(pup = %pup.id(), "owner user record missing; using placeholder name");
                "the owner".to_owned()
            }
        };
        Ok(TemplateVars {
            owner_name,
            friend_name,
            pup_name: pup.name().as_ref().to_owned(),
            window: hangout.window(),
            event_name: hangout.event_name().map(str::to_owned),
        })
    }

    /// Resolve a user id into a one-element recipient list, or empty with a
    /// warning when the record is gone.
    async fn recipient_for(&self, user_id: UserId) -> Vec<Recipient> {
        match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => vec![Recipient::from(&user)],
            Ok(None) => {
                warn!(user = %user_id, "notification recipient record missing");
                Vec::new()
            }
            Err(err) => {
                warn!(user = %user_id, error = %err, "recipient lookup failed");
                Vec::new()
            }
        }
    }

    async fn other_friends_of(
        &self,
        pup_id: Uuid,
        except: UserId,
    ) -> Result<Vec<Recipient>, Error> {
        let friendships = self
            .friendships
            .list_by_pup(pup_id)
            .await
            .map_err(map_friendship_error)?;
        let mut recipients = Vec::with_capacity(friendships.len());
        for friendship in friendships {
            if friendship.friend_user_id() == except {
                continue;
            }
            recipients.extend(self.recipient_for(friendship.friend_user_id()).await);
        }
        Ok(recipients)
    }
}

/// Resolve a user by id into the immutable acting-user context.
///
/// A session naming a user that no longer exists is treated as
/// unauthenticated rather than an internal fault.
pub async fn resolve_acting_user(
    users: &dyn UserRepository,
    user_id: UserId,
) -> Result<ActingUser, Error> {
    let user: User = users
        .find_by_id(user_id)
        .await
        .map_err(map_user_error)?
        .ok_or_else(|| Error::unauthorized("unknown acting user"))?;
    Ok(ActingUser::from_user(&user))
}

fn require_pup_owner(acting: &ActingUser, pup: &Pup) -> Result<(), Error> {
    if acting.id == pup.owner_user_id() {
        Ok(())
    } else {
        Err(Error::forbidden("only the pup's owner can do this"))
    }
}

#[cfg(test)]
#[path = "hangout_service_tests.rs"]
mod tests;
