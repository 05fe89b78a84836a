//! PostgreSQL-backed `RosterRepository` implementation using Diesel ORM.
//!
//! Roster writes are the race-critical path: two users may try to take the
//! last slot at once. [`DieselRosterRepository::add`] therefore runs in one
//! transaction that locks the session row `FOR UPDATE`, then decides
//! duplicate membership before capacity under the lock, so the pre-checks in
//! the service layer are advisory only. The `(session_id, user_id)` primary
//! key backstops duplicates written outside this path.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::AsyncConnection;
use uuid::Uuid;

use crate::domain::ports::{RosterRepository, RosterRepositoryError};
use crate::domain::sessions::SessionId;
use crate::domain::UserId;

use super::diesel_error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::NewSessionMemberRow;
use super::pool::{DbPool, PoolError};
use super::schema::{session_members, sessions};

/// Diesel-backed implementation of the roster repository port.
#[derive(Clone)]
pub struct DieselRosterRepository {
    pool: DbPool,
}

impl DieselRosterRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> RosterRepositoryError {
    map_pool_error(error, RosterRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> RosterRepositoryError {
    map_diesel_error(
        error,
        RosterRepositoryError::query,
        RosterRepositoryError::connection,
    )
}

/// Transaction error carrying either a Diesel failure or a refusal decided
/// under the row lock.
#[derive(Debug)]
enum TxError {
    Diesel(diesel::result::Error),
    Refused(RosterRepositoryError),
}

impl From<diesel::result::Error> for TxError {
    fn from(value: diesel::result::Error) -> Self {
        Self::Diesel(value)
    }
}

#[async_trait]
impl RosterRepository for DieselRosterRepository {
    async fn add(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> Result<(), RosterRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let session = *session_id.as_uuid();
        let user = *user_id.as_uuid();

        conn.transaction(|conn| {
            async move {
                // Lock the session row so concurrent joins serialise here.
                let capacity: Option<i16> = sessions::table
                    .find(session)
                    .select(sessions::players_needed)
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;
                let Some(capacity) = capacity else {
                    return Err(TxError::Refused(RosterRepositoryError::session_missing(
                        format!("session {session} not found"),
                    )));
                };

                let already_member: bool = diesel::select(diesel::dsl::exists(
                    session_members::table
                        .filter(session_members::session_id.eq(session))
                        .filter(session_members::user_id.eq(user)),
                ))
                .get_result(conn)
                .await?;
                if already_member {
                    return Err(TxError::Refused(RosterRepositoryError::duplicate_member(
                        format!("user {user} already joined session {session}"),
                    )));
                }

                let occupied: i64 = session_members::table
                    .filter(session_members::session_id.eq(session))
                    .count()
                    .get_result(conn)
                    .await?;
                if occupied >= i64::from(capacity) {
                    return Err(TxError::Refused(RosterRepositoryError::capacity_exceeded(
                        format!("session {session} is at capacity {capacity}"),
                    )));
                }

                diesel::insert_into(session_members::table)
                    .values(NewSessionMemberRow {
                        session_id: session,
                        user_id: user,
                    })
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| match err {
            TxError::Diesel(err) if is_unique_violation(&err) => {
                RosterRepositoryError::duplicate_member(format!(
                    "user {user} already joined session {session}"
                ))
            }
            TxError::Diesel(err) => map_diesel(err),
            TxError::Refused(err) => err,
        })
    }

    async fn remove(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> Result<bool, RosterRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let deleted = diesel::delete(
            session_members::table
                .filter(session_members::session_id.eq(session_id.as_uuid()))
                .filter(session_members::user_id.eq(user_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel)?;

        Ok(deleted > 0)
    }

    async fn count_for(&self, session_id: SessionId) -> Result<u64, RosterRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let count: i64 = session_members::table
            .filter(session_members::session_id.eq(session_id.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn contains(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> Result<bool, RosterRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        diesel::select(diesel::dsl::exists(
            session_members::table
                .filter(session_members::session_id.eq(session_id.as_uuid()))
                .filter(session_members::user_id.eq(user_id.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel)
    }

    async fn list_members(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<UserId>, RosterRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let members: Vec<Uuid> = session_members::table
            .filter(session_members::session_id.eq(session_id.as_uuid()))
            .order(session_members::joined_at)
            .select(session_members::user_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(members.into_iter().map(UserId::from_uuid).collect())
    }

    async fn sessions_joined_by(
        &self,
        user_id: UserId,
    ) -> Result<Vec<SessionId>, RosterRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let joined: Vec<Uuid> = session_members::table
            .filter(session_members::user_id.eq(user_id.as_uuid()))
            .order(session_members::joined_at)
            .select(session_members::session_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(joined.into_iter().map(SessionId::from_uuid).collect())
    }

    async fn members_for_sessions(
        &self,
        session_ids: &[SessionId],
    ) -> Result<Vec<(SessionId, UserId)>, RosterRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let ids: Vec<Uuid> = session_ids.iter().map(|id| *id.as_uuid()).collect();

        let rows: Vec<(Uuid, Uuid)> = session_members::table
            .filter(session_members::session_id.eq_any(ids))
            .select((session_members::session_id, session_members::user_id))
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(rows
            .into_iter()
            .map(|(session, user)| (SessionId::from_uuid(session), UserId::from_uuid(user)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the error mapping paths.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn pool_errors_map_to_connection() {
        let err = map_pool(PoolError::checkout("connection refused"));
        assert!(matches!(err, RosterRepositoryError::Connection { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn not_found_maps_to_query() {
        let err = map_diesel(diesel::result::Error::NotFound);
        assert!(matches!(err, RosterRepositoryError::Query { .. }));
    }
}
