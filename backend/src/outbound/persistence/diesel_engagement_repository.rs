//! PostgreSQL-backed `EngagementRepository` implementation using Diesel.
//!
//! The open upsert is a single `INSERT .. ON CONFLICT .. DO UPDATE`
//! statement expressing the reconciliation merge in SQL: `GREATEST` for the
//! open time, boolean `AND` for the suspect flag, `excluded.*` for the
//! descriptive fields. One round trip, no read-then-write pair, so
//! concurrent signals for the same key cannot lose updates.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::Timestamptz;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{EngagementCounts, EngagementRepository, EngagementRepositoryError};
use crate::domain::{ClickEvent, OpenObservation};

use super::models::{NewClickRow, OpenUpsertRow};
use super::pool::{DbPool, PoolError};
use super::schema::{email_clicks, email_opens};

diesel::define_sql_function! {
    /// Later of two timestamps; keeps the open time from regressing on
    /// out-of-order delivery.
    fn greatest(left: Timestamptz, right: Timestamptz) -> Timestamptz;
}

/// Diesel-backed implementation of the `EngagementRepository` port.
#[derive(Clone)]
pub struct DieselEngagementRepository {
    pool: DbPool,
}

impl DieselEngagementRepository {
    /// Create a new repository over the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain repository errors.
fn map_pool_error(error: PoolError) -> EngagementRepositoryError {
    match error {
        PoolError::Build { message } | PoolError::Checkout { message } => {
            EngagementRepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors to domain repository errors.
fn map_diesel_error(error: diesel::result::Error) -> EngagementRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            EngagementRepositoryError::connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => EngagementRepositoryError::query("database error"),
        _ => EngagementRepositoryError::query("database error"),
    }
}

#[async_trait]
impl EngagementRepository for DieselEngagementRepository {
    async fn upsert_open(
        &self,
        observation: &OpenObservation,
    ) -> Result<(), EngagementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = OpenUpsertRow::from(observation);

        diesel::insert_into(email_opens::table)
            .values(&row)
            .on_conflict((email_opens::subject_id, email_opens::recipient))
            .do_update()
            .set((
                email_opens::open_time.eq(greatest(
                    email_opens::open_time,
                    excluded(email_opens::open_time),
                )),
                email_opens::user_agent.eq(excluded(email_opens::user_agent)),
                email_opens::client_ip.eq(excluded(email_opens::client_ip)),
                email_opens::via.eq(excluded(email_opens::via)),
                email_opens::is_suspect
                    .eq(email_opens::is_suspect.and(excluded(email_opens::is_suspect))),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn insert_click(&self, click: &ClickEvent) -> Result<(), EngagementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewClickRow::from(click);

        diesel::insert_into(email_clicks::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn counts(&self) -> Result<EngagementCounts, EngagementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let opens = email_opens::table
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let clicks = email_clicks::table
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(EngagementCounts { opens, clicks })
    }
}
