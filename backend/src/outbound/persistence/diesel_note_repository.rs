//! PostgreSQL-backed `NoteRepository` using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::note::HangoutNote;
use crate::domain::ports::{NotePersistenceError, NoteRepository};

use super::error_map::{map_diesel_error, map_pool_error};
use super::models::NoteRow;
use super::pool::DbPool;
use super::schema::hangout_notes;

/// Diesel adapter for hangout note persistence.
#[derive(Clone)]
pub struct DieselNoteRepository {
    pool: DbPool,
}

impl DieselNoteRepository {
    /// Create a repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_err(error: super::pool::PoolError) -> NotePersistenceError {
    map_pool_error(error, |m| NotePersistenceError::connection(m))
}

fn diesel_err(error: diesel::result::Error) -> NotePersistenceError {
    map_diesel_error(
        error,
        |m| NotePersistenceError::connection(m),
        |m| NotePersistenceError::query(m),
    )
}

#[async_trait]
impl NoteRepository for DieselNoteRepository {
    async fn append(&self, note: &HangoutNote) -> Result<(), NotePersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_err)?;
        let row = NoteRow::from_domain(note);
        diesel::insert_into(hangout_notes::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(diesel_err)?;
        Ok(())
    }

    async fn list_page(
        &self,
        hangout_id: Uuid,
        skip: u32,
        take: u32,
    ) -> Result<Vec<HangoutNote>, NotePersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_err)?;
        let rows: Vec<NoteRow> = hangout_notes::table
            .filter(hangout_notes::hangout_id.eq(hangout_id))
            .order(hangout_notes::created_at.asc())
            .offset(i64::from(skip))
            .limit(i64::from(take))
            .select(NoteRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_err)?;
        rows.into_iter()
            .map(|row| {
                row.into_domain()
                    .map_err(|err| NotePersistenceError::query(err.to_string()))
            })
            .collect()
    }
}
