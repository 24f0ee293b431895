//! Friendship management use-cases.
//!
//! Owners link friend users to their pups; the friend (or the owner) can
//! later annotate or sever the link. The friendship row is the authorization
//! backbone of the lifecycle workflows, so creation enforces the role and
//! ownership invariants up front.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::error::Error;
use crate::domain::friendship::PupFriendship;
use crate::domain::ports::{
    FriendshipPersistenceError, FriendshipRepository, PupPersistenceError, PupRepository,
    UserPersistenceError, UserRepository,
};
use crate::domain::pup::Pup;
use crate::domain::user::{ActingUser, UserId, UserRole};

fn map_friendship_error(error: FriendshipPersistenceError) -> Error {
    match error {
        FriendshipPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("friendship repository unavailable: {message}"))
        }
        FriendshipPersistenceError::Query { message } => {
            Error::internal(format!("friendship repository error: {message}"))
        }
        FriendshipPersistenceError::DuplicatePair { .. } => {
            Error::conflict("this friend is already linked to the pup")
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

/// Request payload for linking a friend to a pup.
#[derive(Debug, Clone)]
pub struct CreateFriendshipRequest {
    /// The pup to link.
    pub pup_id: Uuid,
    /// The friend user to link.
    pub friend_user_id: UserId,
    /// Optional free-text history with the pup.
    pub history_with_pup: Option<String>,
}

/// Domain service owning friendship management.
#[derive(Clone)]
pub struct FriendshipService {
    friendships: Arc<dyn FriendshipRepository>,
    pups: Arc<dyn PupRepository>,
    users: Arc<dyn UserRepository>,
}

impl FriendshipService {
    /// Create the service over its repositories.
    pub fn new(
        friendships: Arc<dyn FriendshipRepository>,
        pups: Arc<dyn PupRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            friendships,
            pups,
            users,
        }
    }

    /// Link a friend to a pup the acting user owns.
    ///
    /// The friend must exist with the friend role and must not be the pup's
    /// owner; a duplicate (pup, friend) pair conflicts.
    pub async fn create(
        &self,
        acting: &ActingUser,
        request: CreateFriendshipRequest,
    ) -> Result<PupFriendship, Error> {
        let pup = self.require_pup(request.pup_id).await?;
        require_pup_owner(acting, &pup)?;

        let friend = self
            .users
            .find_by_id(request.friend_user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("friend user does not exist"))?;
        if friend.role() != UserRole::Friend {
            return Err(Error::invalid_request(
                "only users with the friend role can be linked to a pup",
            ));
        }
        if friend.id() == pup.owner_user_id() {
            return Err(Error::invalid_request(
                "a pup's owner cannot also be its friend",
            ));
        }

        let friendship = PupFriendship::new(
            Uuid::new_v4(),
            pup.id(),
            friend.id(),
            request.history_with_pup,
        );
        self.friendships
            .create(&friendship)
            .await
            .map_err(map_friendship_error)?;
        Ok(friendship)
    }

    /// List a pup's friendships for its owner.
    pub async fn list_by_pup(
        &self,
        acting: &ActingUser,
        pup_id: Uuid,
    ) -> Result<Vec<PupFriendship>, Error> {
        let pup = self.require_pup(pup_id).await?;
        require_pup_owner(acting, &pup)?;
        self.friendships
            .list_by_pup(pup_id)
            .await
            .map_err(map_friendship_error)
    }

    /// Replace the history text. Permitted to the pup's owner and to the
    /// linked friend themselves.
    pub async fn update_history(
        &self,
        acting: &ActingUser,
        friendship_id: Uuid,
        history_with_pup: Option<String>,
    ) -> Result<PupFriendship, Error> {
        self.require_party(acting, friendship_id).await?;
        self.friendships
            .update_history(friendship_id, history_with_pup)
            .await
            .map_err(map_friendship_error)?
            .ok_or_else(|| Error::not_found("friendship does not exist"))
    }

    /// Sever a friendship. Permitted to the pup's owner and to the linked
    /// friend themselves.
    pub async fn delete(&self, acting: &ActingUser, friendship_id: Uuid) -> Result<(), Error> {
        self.require_party(acting, friendship_id).await?;
        let removed = self
            .friendships
            .delete(friendship_id)
            .await
            .map_err(map_friendship_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found("friendship does not exist"))
        }
    }

    async fn require_party(&self, acting: &ActingUser, friendship_id: Uuid) -> Result<(), Error> {
        let friendship = self
            .friendships
            .find_by_id(friendship_id)
            .await
            .map_err(map_friendship_error)?
            .ok_or_else(|| Error::not_found("friendship does not exist"))?;
        if friendship.friend_user_id() == acting.id {
            return Ok(());
        }
        let pup = self.require_pup(friendship.pup_id()).await?;
        require_pup_owner(acting, &pup)
    }

    async fn require_pup(&self, id: Uuid) -> Result<Pup, Error> {
        self.pups
            .find_by_id(id)
            .await
            .map_err(map_pup_error)?
            .ok_or_else(|| Error::not_found("pup does not exist"))
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
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::user::{DisplayName, User, UserDraft};
    use crate::outbound::memory::InMemoryStore;
    use crate::domain::pup::PupName;

    struct Harness {
        service: FriendshipService,
        store: InMemoryStore,
        owner: ActingUser,
        sam: ActingUser,
        pup: Pup,
    }

    fn user(name: &str, role: UserRole) -> User {
        User::new(UserDraft {
            id: UserId::random(),
            display_name: DisplayName::new(name).expect("valid name"),
            role,
            phone_number: None,
            profile_photo_url: None,
            address_text: None,
        })
    }

    async fn harness() -> Harness {
        let store = InMemoryStore::new();
        let service = FriendshipService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
        );
        let edi = user("Edi", UserRole::Owner);
        let sam = user("Sam", UserRole::Friend);
        for u in [&edi, &sam] {
            crate::domain::ports::UserRepository::create(&store, u)
                .await
                .expect("create user");
        }
        let pup = Pup::new(
            Uuid::new_v4(),
            PupName::new("Fido").expect("valid name"),
            edi.id(),
            None,
            None,
        );
        crate::domain::ports::PupRepository::create(&store, &pup)
            .await
            .expect("create pup");
        Harness {
            service,
            store,
            owner: ActingUser::from_user(&edi),
            sam: ActingUser::from_user(&sam),
            pup,
        }
    }

    fn request(h: &Harness) -> CreateFriendshipRequest {
        CreateFriendshipRequest {
            pup_id: h.pup.id(),
            friend_user_id: h.sam.id,
            history_with_pup: None,
        }
    }

    #[tokio::test]
    async fn owners_link_friends_to_their_pups() {
        let h = harness().await;
        let friendship = h
            .service
            .create(&h.owner, request(&h))
            .await
            .expect("friendship created");
        assert_eq!(friendship.pup_id(), h.pup.id());
        assert_eq!(friendship.friend_user_id(), h.sam.id);
    }

    #[tokio::test]
    async fn duplicate_pairs_conflict() {
        let h = harness().await;
        h.service
            .create(&h.owner, request(&h))
            .await
            .expect("first link");
        let err = h
            .service
            .create(&h.owner, request(&h))
            .await
            .expect_err("duplicate link");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn owners_cannot_befriend_their_own_pup() {
        let h = harness().await;
        let err = h
            .service
            .create(
                &h.owner,
                CreateFriendshipRequest {
                    pup_id: h.pup.id(),
                    friend_user_id: h.owner.id,
                    history_with_pup: None,
                },
            )
            .await
            .expect_err("owner is not a friend");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn linking_requires_the_friend_role() {
        let h = harness().await;
        let other_owner = user("Kim", UserRole::Owner);
        crate::domain::ports::UserRepository::create(&h.store, &other_owner)
            .await
            .expect("create user");
        let err = h
            .service
            .create(
                &h.owner,
                CreateFriendshipRequest {
                    pup_id: h.pup.id(),
                    friend_user_id: other_owner.id(),
                    history_with_pup: None,
                },
            )
            .await
            .expect_err("owners cannot be linked as friends");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn history_updates_are_party_scoped() {
        let h = harness().await;
        let friendship = h
            .service
            .create(&h.owner, request(&h))
            .await
            .expect("friendship created");

        let updated = h
            .service
            .update_history(
                &h.sam,
                friendship.id(),
                Some("Fed Fido for a week".to_owned()),
            )
            .await
            .expect("friend updates their own history");
        assert_eq!(updated.history_with_pup(), Some("Fed Fido for a week"));

        let outsider = user("Zoe", UserRole::Friend);
        crate::domain::ports::UserRepository::create(&h.store, &outsider)
            .await
            .expect("create user");
        let err = h
            .service
            .update_history(
                &ActingUser::from_user(&outsider),
                friendship.id(),
                None,
            )
            .await
            .expect_err("unrelated users cannot edit");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn deletion_is_party_scoped() {
        let h = harness().await;
        let friendship = h
            .service
            .create(&h.owner, request(&h))
            .await
            .expect("friendship created");

        h.service
            .delete(&h.owner, friendship.id())
            .await
            .expect("owner severs the link");

        let err = h
            .service
            .delete(&h.owner, friendship.id())
            .await
            .expect_err("already gone");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
