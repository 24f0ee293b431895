//! PostgreSQL-backed `HangoutRepository` using Diesel.
//!
//! The status-gated transitions are single conditional `UPDATE … WHERE`
//! statements, so two racing assigns resolve at the database: exactly one
//! statement matches a row, the other observes zero rows and reports the
//! conflicting state.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::hangout::{Hangout, HangoutStatus};
use crate::domain::ports::{ConditionalWrite, HangoutPersistenceError, HangoutRepository};
use crate::domain::user::UserId;

use super::error_map::{map_diesel_error, map_pool_error};
use super::models::HangoutRow;
use super::pool::DbPool;
use super::schema::hangouts;

/// Diesel adapter for hangout persistence.
#[derive(Clone)]
pub struct DieselHangoutRepository {
    pool: DbPool,
}

impl DieselHangoutRepository {
    /// Create a repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Explain a zero-row conditional write by looking at the current row.
    async fn classify_miss(
        &self,
        id: Uuid,
        required: HangoutStatus,
        expected_assignee: Option<UserId>,
    ) -> Result<ConditionalWrite, HangoutPersistenceError> {
        let current = self.find_by_id(id).await?;
        let Some(hangout) = current else {
            return Ok(ConditionalWrite::Missing);
        };
        if hangout.status() != required {
            return Ok(ConditionalWrite::StatusConflict {
                current: hangout.status(),
            });
        }
        if expected_assignee.is_some() && hangout.assigned_friend_user_id() != expected_assignee {
            return Ok(ConditionalWrite::AssigneeMismatch);
        }
        // The row matched by the time we re-read it; the caller lost a race
        // it would now win. Report the state it observed.
        Ok(ConditionalWrite::StatusConflict {
            current: hangout.status(),
        })
    }
}

fn pool_err(error: super::pool::PoolError) -> HangoutPersistenceError {
    map_pool_error(error, |m| HangoutPersistenceError::connection(m))
}

fn diesel_err(error: diesel::result::Error) -> HangoutPersistenceError {
    map_diesel_error(
        error,
        |m| HangoutPersistenceError::connection(m),
        |m| HangoutPersistenceError::query(m),
    )
}

fn convert(row: HangoutRow) -> Result<Hangout, HangoutPersistenceError> {
    row.into_domain()
        .map_err(|err| HangoutPersistenceError::query(err.to_string()))
}

#[async_trait]
impl HangoutRepository for DieselHangoutRepository {
    async fn create(&self, hangout: &Hangout) -> Result<(), HangoutPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_err)?;
        let row = HangoutRow::from_domain(hangout);
        diesel::insert_into(hangouts::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(diesel_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Hangout>, HangoutPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_err)?;
        let row: Option<HangoutRow> = hangouts::table
            .filter(hangouts::id.eq(id))
            .select(HangoutRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_err)?;
        row.map(convert).transpose()
    }

    async fn list_by_pup(&self, pup_id: Uuid) -> Result<Vec<Hangout>, HangoutPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_err)?;
        let rows: Vec<HangoutRow> = hangouts::table
            .filter(hangouts::pup_id.eq(pup_id))
            .order(hangouts::start_at.desc())
            .select(HangoutRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_err)?;
        rows.into_iter().map(convert).collect()
    }

    async fn assign_if_open(
        &self,
        id: Uuid,
        friend: UserId,
    ) -> Result<ConditionalWrite, HangoutPersistenceError> {
        let updated: Option<HangoutRow> = {
            let mut conn = self.pool.get().await.map_err(pool_err)?;
            diesel::update(
                hangouts::table
                    .filter(hangouts::id.eq(id))
                    .filter(hangouts::status.eq(HangoutStatus::Open.as_str())),
            )
            .set((
                hangouts::status.eq(HangoutStatus::Assigned.as_str()),
                hangouts::assigned_friend_user_id.eq(Some(*friend.as_uuid())),
            ))
            .returning(HangoutRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(diesel_err)?
        };

        match updated {
            Some(row) => Ok(ConditionalWrite::Applied(convert(row)?)),
            None => self.classify_miss(id, HangoutStatus::Open, None).await,
        }
    }

    async fn unassign_if_assigned_to(
        &self,
        id: Uuid,
        friend: UserId,
    ) -> Result<ConditionalWrite, HangoutPersistenceError> {
        let updated: Option<HangoutRow> = {
            let mut conn = self.pool.get().await.map_err(pool_err)?;
            diesel::update(
                hangouts::table
                    .filter(hangouts::id.eq(id))
                    .filter(hangouts::status.eq(HangoutStatus::Assigned.as_str()))
                    .filter(hangouts::assigned_friend_user_id.eq(Some(*friend.as_uuid()))),
            )
            .set((
                hangouts::status.eq(HangoutStatus::Open.as_str()),
                hangouts::assigned_friend_user_id.eq(None::<Uuid>),
            ))
            .returning(HangoutRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(diesel_err)?
        };

        match updated {
            Some(row) => Ok(ConditionalWrite::Applied(convert(row)?)),
            None => {
                self.classify_miss(id, HangoutStatus::Assigned, Some(friend))
                    .await
            }
        }
    }
}
