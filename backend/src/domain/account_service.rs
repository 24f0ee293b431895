//! User and pup registration use-cases.
//!
//! Users are created through an administrator action (the HTTP layer gates
//! it behind the admin token); pups are created by their owner.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::error::Error;
use crate::domain::ports::{
    PupPersistenceError, PupRepository, UserPersistenceError, UserRepository,
};
use crate::domain::pup::{Pup, PupName};
use crate::domain::user::{ActingUser, User, UserDraft, UserId, UserRole};

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::Duplicate { .. } => Error::conflict("user already exists"),
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

/// Validated fields for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    /// Display name.
    pub display_name: crate::domain::user::DisplayName,
    /// Immutable role.
    pub role: UserRole,
    /// Optional dialable phone number.
    pub phone_number: Option<crate::domain::user::PhoneNumber>,
    /// Optional free-text address.
    pub address_text: Option<String>,
}

/// Validated fields for creating a pup.
#[derive(Debug, Clone)]
pub struct CreatePupRequest {
    /// The pup's name.
    pub name: PupName,
    /// Optional care instructions for sitters.
    pub care_instructions: Option<String>,
}

/// Domain service for user and pup registration.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    pups: Arc<dyn PupRepository>,
}

impl AccountService {
    /// Create the service over its repositories.
    pub fn new(users: Arc<dyn UserRepository>, pups: Arc<dyn PupRepository>) -> Self {
        Self { users, pups }
    }

    /// Register a user.
    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User, Error> {
        let user = User::new(UserDraft {
            id: UserId::random(),
            display_name: request.display_name,
            role: request.role,
            phone_number: request.phone_number,
            profile_photo_url: None,
            address_text: request.address_text,
        });
        self.users.create(&user).await.map_err(map_user_error)?;
        Ok(user)
    }

    /// Register a pup owned by the acting user.
    pub async fn create_pup(
        &self,
        acting: &ActingUser,
        request: CreatePupRequest,
    ) -> Result<Pup, Error> {
        if acting.role != UserRole::Owner {
            return Err(Error::forbidden("only owners can register pups"));
        }
        let pup = Pup::new(
            Uuid::new_v4(),
            request.name,
            acting.id,
            request.care_instructions,
            None,
        );
        self.pups.create(&pup).await.map_err(map_pup_error)?;
        Ok(pup)
    }

    /// List the acting user's pups.
    pub async fn list_pups(&self, acting: &ActingUser) -> Result<Vec<Pup>, Error> {
        self.pups
            .list_by_owner(acting.id)
            .await
            .map_err(map_pup_error)
    }
}
