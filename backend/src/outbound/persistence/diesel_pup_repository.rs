//! PostgreSQL-backed `PupRepository` using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{PupPersistenceError, PupRepository};
use crate::domain::pup::Pup;
use crate::domain::user::UserId;

use super::error_map::{map_diesel_error, map_pool_error};
use super::models::PupRow;
use super::pool::DbPool;
use super::schema::pups;

/// Diesel adapter for pup persistence.
#[derive(Clone)]
pub struct DieselPupRepository {
    pool: DbPool,
}

impl DieselPupRepository {
    /// Create a repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_err(error: super::pool::PoolError) -> PupPersistenceError {
    map_pool_error(error, |m| PupPersistenceError::connection(m))
}

fn diesel_err(error: diesel::result::Error) -> PupPersistenceError {
    map_diesel_error(
        error,
        |m| PupPersistenceError::connection(m),
        |m| PupPersistenceError::query(m),
    )
}

fn convert(row: PupRow) -> Result<Pup, PupPersistenceError> {
    row.into_domain()
        .map_err(|err| PupPersistenceError::query(err.to_string()))
}

#[async_trait]
impl PupRepository for DieselPupRepository {
    async fn create(&self, pup: &Pup) -> Result<(), PupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_err)?;
        let row = PupRow::from_domain(pup);
        diesel::insert_into(pups::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(diesel_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Pup>, PupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_err)?;
        let row: Option<PupRow> = pups::table
            .filter(pups::id.eq(id))
            .select(PupRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_err)?;
        row.map(convert).transpose()
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Pup>, PupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_err)?;
        let rows: Vec<PupRow> = pups::table
            .filter(pups::owner_user_id.eq(owner.as_uuid()))
            .order(pups::name.asc())
            .select(PupRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_err)?;
        rows.into_iter().map(convert).collect()
    }
}
