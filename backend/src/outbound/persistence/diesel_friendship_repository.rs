//! PostgreSQL-backed `FriendshipRepository` using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::friendship::PupFriendship;
use crate::domain::ports::{FriendshipPersistenceError, FriendshipRepository};
use crate::domain::user::UserId;

use super::error_map::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::FriendshipRow;
use super::pool::DbPool;
use super::schema::pup_friendships;

/// Diesel adapter for friendship persistence.
#[derive(Clone)]
pub struct DieselFriendshipRepository {
    pool: DbPool,
}

impl DieselFriendshipRepository {
    /// Create a repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_err(error: super::pool::PoolError) -> FriendshipPersistenceError {
    map_pool_error(error, |m| FriendshipPersistenceError::connection(m))
}

fn diesel_err(error: diesel::result::Error) -> FriendshipPersistenceError {
    map_diesel_error(
        error,
        |m| FriendshipPersistenceError::connection(m),
        |m| FriendshipPersistenceError::query(m),
    )
}

#[async_trait]
impl FriendshipRepository for DieselFriendshipRepository {
    async fn create(&self, friendship: &PupFriendship) -> Result<(), FriendshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_err)?;
        let row = FriendshipRow::from_domain(friendship);
        diesel::insert_into(pup_friendships::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    FriendshipPersistenceError::duplicate_pair(format!(
                        "pup {} and friend {}",
                        friendship.pup_id(),
                        friendship.friend_user_id()
                    ))
                } else {
                    diesel_err(err)
                }
            })?;
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<PupFriendship>, FriendshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_err)?;
        let row: Option<FriendshipRow> = pup_friendships::table
            .filter(pup_friendships::id.eq(id))
            .select(FriendshipRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_err)?;
        Ok(row.map(FriendshipRow::into_domain))
    }

    async fn find_by_pup_and_friend(
        &self,
        pup_id: Uuid,
        friend_user_id: UserId,
    ) -> Result<Option<PupFriendship>, FriendshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_err)?;
        let row: Option<FriendshipRow> = pup_friendships::table
            .filter(pup_friendships::pup_id.eq(pup_id))
            .filter(pup_friendships::friend_user_id.eq(friend_user_id.as_uuid()))
            .select(FriendshipRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_err)?;
        Ok(row.map(FriendshipRow::into_domain))
    }

    async fn list_by_pup(
        &self,
        pup_id: Uuid,
    ) -> Result<Vec<PupFriendship>, FriendshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_err)?;
        let rows: Vec<FriendshipRow> = pup_friendships::table
            .filter(pup_friendships::pup_id.eq(pup_id))
            .order(pup_friendships::created_at.asc())
            .select(FriendshipRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_err)?;
        Ok(rows.into_iter().map(FriendshipRow::into_domain).collect())
    }

    async fn update_history(
        &self,
        id: Uuid,
        history_with_pup: Option<String>,
    ) -> Result<Option<PupFriendship>, FriendshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_err)?;
        let row: Option<FriendshipRow> =
            diesel::update(pup_friendships::table.filter(pup_friendships::id.eq(id)))
                .set(pup_friendships::history_with_pup.eq(history_with_pup))
                .returning(FriendshipRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(diesel_err)?;
        Ok(row.map(FriendshipRow::into_domain))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, FriendshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_err)?;
        let removed =
            diesel::delete(pup_friendships::table.filter(pup_friendships::id.eq(id)))
                .execute(&mut conn)
                .await
                .map_err(diesel_err)?;
        Ok(removed > 0)
    }
}
