//! PostgreSQL-backed `SuggestionRepository` using Diesel.
//!
//! The owner decision is a conditional `UPDATE … WHERE status = 'pending'`,
//! so concurrent approvals resolve at the database: the first statement
//! matches, later ones observe zero rows and report the recorded decision.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{DecisionWrite, SuggestionPersistenceError, SuggestionRepository};
use crate::domain::suggestion::{HangoutSuggestion, SuggestionStatus};

use super::error_map::{map_diesel_error, map_pool_error};
use super::models::SuggestionRow;
use super::pool::DbPool;
use super::schema::hangout_suggestions;

/// Diesel adapter for suggestion persistence.
#[derive(Clone)]
pub struct DieselSuggestionRepository {
    pool: DbPool,
}

impl DieselSuggestionRepository {
    /// Create a repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_err(error: super::pool::PoolError) -> SuggestionPersistenceError {
    map_pool_error(error, |m| SuggestionPersistenceError::connection(m))
}

fn diesel_err(error: diesel::result::Error) -> SuggestionPersistenceError {
    map_diesel_error(
        error,
        |m| SuggestionPersistenceError::connection(m),
        |m| SuggestionPersistenceError::query(m),
    )
}

fn convert(row: SuggestionRow) -> Result<HangoutSuggestion, SuggestionPersistenceError> {
    row.into_domain()
        .map_err(|err| SuggestionPersistenceError::query(err.to_string()))
}

#[async_trait]
impl SuggestionRepository for DieselSuggestionRepository {
    async fn create(
        &self,
        suggestion: &HangoutSuggestion,
    ) -> Result<(), SuggestionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_err)?;
        let row = SuggestionRow::from_domain(suggestion);
        diesel::insert_into(hangout_suggestions::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(diesel_err)?;
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<HangoutSuggestion>, SuggestionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_err)?;
        let row: Option<SuggestionRow> = hangout_suggestions::table
            .filter(hangout_suggestions::id.eq(id))
            .select(SuggestionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_err)?;
        row.map(convert).transpose()
    }

    async fn list_pending_by_pup(
        &self,
        pup_id: Uuid,
    ) -> Result<Vec<HangoutSuggestion>, SuggestionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_err)?;
        let rows: Vec<SuggestionRow> = hangout_suggestions::table
            .filter(hangout_suggestions::pup_id.eq(pup_id))
            .filter(hangout_suggestions::status.eq(SuggestionStatus::Pending.as_str()))
            .order(hangout_suggestions::start_at.asc())
            .select(SuggestionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_err)?;
        rows.into_iter().map(convert).collect()
    }

    async fn decide_if_pending(
        &self,
        id: Uuid,
        decision: SuggestionStatus,
    ) -> Result<DecisionWrite, SuggestionPersistenceError> {
        let updated: Option<SuggestionRow> = {
            let mut conn = self.pool.get().await.map_err(pool_err)?;
            diesel::update(
                hangout_suggestions::table
                    .filter(hangout_suggestions::id.eq(id))
                    .filter(hangout_suggestions::status.eq(SuggestionStatus::Pending.as_str())),
            )
            .set(hangout_suggestions::status.eq(decision.as_str()))
            .returning(SuggestionRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(diesel_err)?
        };

        match updated {
            Some(row) => Ok(DecisionWrite::Applied(convert(row)?)),
            None => {
                let current = self.find_by_id(id).await?;
                match current {
                    None => Ok(DecisionWrite::Missing),
                    Some(suggestion) => Ok(DecisionWrite::AlreadyDecided {
                        current: suggestion.status(),
                    }),
                }
            }
        }
    }
}
