//! PostgreSQL-backed `ResponseRepository` using Diesel.
//!
//! The reply upsert is an `INSERT … ON CONFLICT DO UPDATE` on the
//! (hangout, responder) unique pair, matching the idempotence contract of
//! the respond endpoint.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ResponsePersistenceError, ResponseRepository};
use crate::domain::response::HangoutResponse;

use super::error_map::{map_diesel_error, map_pool_error};
use super::models::ResponseRow;
use super::pool::DbPool;
use super::schema::hangout_responses;

/// Diesel adapter for hangout response persistence.
#[derive(Clone)]
pub struct DieselResponseRepository {
    pool: DbPool,
}

impl DieselResponseRepository {
    /// Create a repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_err(error: super::pool::PoolError) -> ResponsePersistenceError {
    map_pool_error(error, |m| ResponsePersistenceError::connection(m))
}

fn diesel_err(error: diesel::result::Error) -> ResponsePersistenceError {
    map_diesel_error(
        error,
        |m| ResponsePersistenceError::connection(m),
        |m| ResponsePersistenceError::query(m),
    )
}

fn convert(row: ResponseRow) -> Result<HangoutResponse, ResponsePersistenceError> {
    row.into_domain()
        .map_err(|err| ResponsePersistenceError::query(err.to_string()))
}

#[async_trait]
impl ResponseRepository for DieselResponseRepository {
    async fn upsert(&self, response: &HangoutResponse) -> Result<(), ResponsePersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_err)?;
        let row = ResponseRow::from_domain(response);
        diesel::insert_into(hangout_responses::table)
            .values(&row)
            .on_conflict((
                hangout_responses::hangout_id,
                hangout_responses::responder_user_id,
            ))
            .do_update()
            .set((
                hangout_responses::answer.eq(&row.answer),
                hangout_responses::responded_at.eq(row.responded_at),
            ))
            .execute(&mut conn)
            .await
            .map_err(diesel_err)?;
        Ok(())
    }

    async fn list_by_hangout(
        &self,
        hangout_id: Uuid,
    ) -> Result<Vec<HangoutResponse>, ResponsePersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_err)?;
        let rows: Vec<ResponseRow> = hangout_responses::table
            .filter(hangout_responses::hangout_id.eq(hangout_id))
            .order(hangout_responses::responded_at.asc())
            .select(ResponseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_err)?;
        rows.into_iter().map(convert).collect()
    }
}
