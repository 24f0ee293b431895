//! PostgreSQL-backed `UserRepository` using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::user::{User, UserId};

use super::error_map::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::UserRow;
use super::pool::DbPool;
use super::schema::users;

/// Diesel adapter for user persistence.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_err(error: super::pool::PoolError) -> UserPersistenceError {
    map_pool_error(error, |m| UserPersistenceError::connection(m))
}

fn diesel_err(error: diesel::result::Error) -> UserPersistenceError {
    map_diesel_error(
        error,
        |m| UserPersistenceError::connection(m),
        |m| UserPersistenceError::query(m),
    )
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_err)?;
        let row = UserRow::from_domain(user);
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    UserPersistenceError::duplicate(user.id().to_string())
                } else {
                    diesel_err(err)
                }
            })?;
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_err)?;
        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_err)?;
        row.map(|row| {
            row.into_domain()
                .map_err(|err| UserPersistenceError::query(err.to_string()))
        })
        .transpose()
    }
}
