//! PostgreSQL-backed `LoginTokenRepository` using Diesel.
//!
//! Redemption is a single conditional `UPDATE`: the usability checks live
//! in the `WHERE` clause, so two concurrent redeems of a single-use token
//! resolve at the database and only one yields the record.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::login_token::LoginToken;
use crate::domain::ports::{LoginTokenPersistenceError, LoginTokenRepository};

use super::error_map::{map_diesel_error, map_pool_error};
use super::models::LoginTokenRow;
use super::pool::DbPool;
use super::schema::login_tokens;

/// Diesel adapter for login token persistence.
#[derive(Clone)]
pub struct DieselLoginTokenRepository {
    pool: DbPool,
}

impl DieselLoginTokenRepository {
    /// Create a repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_err(error: super::pool::PoolError) -> LoginTokenPersistenceError {
    map_pool_error(error, |m| LoginTokenPersistenceError::connection(m))
}

fn diesel_err(error: diesel::result::Error) -> LoginTokenPersistenceError {
    map_diesel_error(
        error,
        |m| LoginTokenPersistenceError::connection(m),
        |m| LoginTokenPersistenceError::query(m),
    )
}

#[async_trait]
impl LoginTokenRepository for DieselLoginTokenRepository {
    async fn insert(&self, token: &LoginToken) -> Result<(), LoginTokenPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_err)?;
        let row = LoginTokenRow::from_domain(token);
        diesel::insert_into(login_tokens::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(diesel_err)?;
        Ok(())
    }

    async fn redeem(
        &self,
        digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<LoginToken>, LoginTokenPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_err)?;
        // `consumed_at` doubles as a last-redeemed marker for multi-use
        // tokens; only single-use tokens refuse a second redemption.
        let row: Option<LoginTokenRow> = diesel::update(
            login_tokens::table
                .filter(login_tokens::digest.eq(digest))
                .filter(
                    login_tokens::expires_at
                        .is_null()
                        .or(login_tokens::expires_at.gt(now)),
                )
                .filter(
                    login_tokens::consumed_at
                        .is_null()
                        .or(login_tokens::single_use.eq(false)),
                ),
        )
        .set(login_tokens::consumed_at.eq(Some(now)))
        .returning(LoginTokenRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(diesel_err)?;
        Ok(row.map(LoginTokenRow::into_domain))
    }
}
