//! PostgreSQL-backed `SportRepository` implementation using Diesel ORM.
//!
//! The per-owner case-insensitive name uniqueness lives in a database index;
//! this adapter translates its violation into the port's duplicate error.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{SportRepository, SportRepositoryError};
use crate::domain::{Sport, SportId, UserId};

use super::diesel_error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{NewSportRow, SportRow};
use super::pool::{DbPool, PoolError};
use super::schema::sports;

/// Diesel-backed implementation of the sport repository port.
#[derive(Clone)]
pub struct DieselSportRepository {
    pool: DbPool,
}

impl DieselSportRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> SportRepositoryError {
    map_pool_error(error, SportRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> SportRepositoryError {
    map_diesel_error(
        error,
        SportRepositoryError::query,
        SportRepositoryError::connection,
    )
}

fn map_write_error(sport: &Sport, error: diesel::result::Error) -> SportRepositoryError {
    if is_unique_violation(&error) {
        SportRepositoryError::duplicate_name(sport.name().to_owned())
    } else {
        map_diesel(error)
    }
}

/// Convert a database row into a validated domain sport.
fn row_to_sport(row: SportRow) -> Result<Sport, SportRepositoryError> {
    Sport::new(
        SportId::from_uuid(row.id),
        UserId::from_uuid(row.owner_id),
        &row.name,
    )
    .map_err(|err| SportRepositoryError::query(err.to_string()))
}

#[async_trait]
impl SportRepository for DieselSportRepository {
    async fn insert(&self, sport: &Sport) -> Result<(), SportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        diesel::insert_into(sports::table)
            .values(NewSportRow {
                id: *sport.id().as_uuid(),
                owner_id: *sport.owner_id().as_uuid(),
                name: sport.name(),
            })
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_write_error(sport, err))
    }

    async fn rename(&self, sport: &Sport) -> Result<(), SportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let affected = diesel::update(sports::table.find(sport.id().as_uuid()))
            .set(sports::name.eq(sport.name()))
            .execute(&mut conn)
            .await
            .map_err(|err| map_write_error(sport, err))?;

        if affected == 0 {
            return Err(SportRepositoryError::query(format!(
                "sport {} not found",
                sport.id()
            )));
        }
        Ok(())
    }

    async fn find_by_id(
        &self,
        sport_id: SportId,
    ) -> Result<Option<Sport>, SportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = sports::table
            .find(sport_id.as_uuid())
            .select(SportRow::as_select())
            .first::<SportRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_sport).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Sport>, SportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<SportRow> = sports::table
            .order(sports::name)
            .select(SportRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter().map(row_to_sport).collect()
    }
}
