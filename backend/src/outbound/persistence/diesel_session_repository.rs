//! PostgreSQL-backed `SessionRepository` implementation using Diesel ORM.
//!
//! This adapter persists sessions and loads listings through validated domain
//! constructors. Updates run as a single guarded statement so a row whose
//! stored status is already `cancelled` can never be overwritten.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, AsyncPgConnection};
use uuid::Uuid;

use crate::domain::ports::{SessionRepository, SessionRepositoryError};
use crate::domain::sessions::{Session, SessionDraft, SessionId, SessionStatus};
use crate::domain::{SportId, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewSessionRow, SessionRow, SessionUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{session_members, sessions};

/// Diesel-backed implementation of the session repository port.
#[derive(Clone)]
pub struct DieselSessionRepository {
    pool: DbPool,
}

impl DieselSessionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> SessionRepositoryError {
    map_pool_error(error, SessionRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> SessionRepositoryError {
    map_diesel_error(
        error,
        SessionRepositoryError::query,
        SessionRepositoryError::connection,
    )
}

/// Convert a database row into a validated domain session.
fn row_to_session(row: SessionRow) -> Result<Session, SessionRepositoryError> {
    let SessionRow {
        id,
        sport_id,
        creator_id,
        session_date,
        start_time,
        venue,
        players_needed,
        status,
        cancellation_reason,
        created_at: _,
        updated_at: _,
    } = row;

    let status = SessionStatus::parse(&status)
        .ok_or_else(|| SessionRepositoryError::query(format!("unknown session status: {status}")))?;
    let players_needed = u8::try_from(players_needed).map_err(|_| {
        SessionRepositoryError::query(format!("players_needed out of range: {players_needed}"))
    })?;

    Session::new(SessionDraft {
        id: SessionId::from_uuid(id),
        sport_id: SportId::from_uuid(sport_id),
        creator_id: UserId::from_uuid(creator_id),
        date: session_date,
        time: start_time,
        venue,
        players_needed,
        status,
        cancellation_reason,
    })
    .map_err(|err| SessionRepositoryError::query(err.to_string()))
}

fn new_row(session: &Session) -> NewSessionRow<'_> {
    NewSessionRow {
        id: *session.id().as_uuid(),
        sport_id: *session.sport_id().as_uuid(),
        creator_id: *session.creator_id().as_uuid(),
        session_date: session.date(),
        start_time: session.time(),
        venue: session.venue(),
        players_needed: i16::from(session.players_needed()),
        status: session.status().as_str(),
        cancellation_reason: session.cancellation_reason(),
    }
}

fn update_row(session: &Session) -> SessionUpdate<'_> {
    SessionUpdate {
        sport_id: *session.sport_id().as_uuid(),
        session_date: session.date(),
        start_time: session.time(),
        venue: session.venue(),
        players_needed: i16::from(session.players_needed()),
        status: session.status().as_str(),
        cancellation_reason: session.cancellation_reason(),
    }
}

/// Distinguish "row missing" from "row already cancelled" after a guarded
/// update matched nothing.
async fn explain_unmatched_update(
    conn: &mut AsyncPgConnection,
    session_id: Uuid,
) -> Result<SessionRepositoryError, diesel::result::Error> {
    let status: Option<String> = sessions::table
        .find(session_id)
        .select(sessions::status)
        .first(conn)
        .await
        .optional()?;

    Ok(match status.as_deref() {
        None => SessionRepositoryError::missing(format!("session {session_id} not found")),
        Some(_) => SessionRepositoryError::already_cancelled(format!(
            "session {session_id} is already cancelled"
        )),
    })
}

#[async_trait]
impl SessionRepository for DieselSessionRepository {
    async fn insert(&self, session: &Session) -> Result<(), SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        diesel::insert_into(sessions::table)
            .values(new_row(session))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel)
    }

    async fn update(&self, session: &Session) -> Result<(), SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let session_id = *session.id().as_uuid();
        let row = update_row(session);

        // One transaction: the guarded update plus, on a miss, a re-read to
        // tell a missing row apart from a concurrently cancelled one.
        conn.transaction(|conn| {
            async move {
                let affected = diesel::update(
                    sessions::table
                        .find(session_id)
                        .filter(sessions::status.ne(SessionStatus::Cancelled.as_str())),
                )
                .set(row)
                .execute(conn)
                .await?;

                if affected == 0 {
                    let refused = explain_unmatched_update(conn, session_id).await?;
                    return Err(TxError::Refused(refused));
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| match err {
            TxError::Diesel(err) => map_diesel(err),
            TxError::Refused(err) => err,
        })
    }

    async fn find_by_id(
        &self,
        session_id: SessionId,
    ) -> Result<Option<Session>, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = sessions::table
            .find(session_id.as_uuid())
            .select(SessionRow::as_select())
            .first::<SessionRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_session).transpose()
    }

    async fn list_by_ids(
        &self,
        session_ids: &[SessionId],
    ) -> Result<Vec<Session>, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let ids: Vec<Uuid> = session_ids.iter().map(|id| *id.as_uuid()).collect();

        let rows: Vec<SessionRow> = sessions::table
            .filter(sessions::id.eq_any(ids))
            .order((sessions::session_date, sessions::start_time))
            .select(SessionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter().map(row_to_session).collect()
    }

    async fn list_active(
        &self,
        sport_id: Option<SportId>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Session>, u64), SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let sport_filter = sport_id.map(|id| *id.as_uuid());

        // Page and count inside one transaction so they observe the same
        // MVCC snapshot.
        let (rows, total) = conn
            .transaction(|conn| {
                async move {
                    let mut listing = sessions::table
                        .filter(sessions::status.eq(SessionStatus::Active.as_str()))
                        .into_boxed();
                    let mut counting = sessions::table
                        .filter(sessions::status.eq(SessionStatus::Active.as_str()))
                        .into_boxed();
                    if let Some(sport) = sport_filter {
                        listing = listing.filter(sessions::sport_id.eq(sport));
                        counting = counting.filter(sessions::sport_id.eq(sport));
                    }

                    let rows: Vec<SessionRow> = listing
                        .order((sessions::session_date, sessions::start_time))
                        .offset(offset)
                        .limit(limit)
                        .select(SessionRow::as_select())
                        .load(conn)
                        .await?;
                    let total: i64 = counting.count().get_result(conn).await?;
                    Ok::<_, diesel::result::Error>((rows, total))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel)?;

        let items = rows
            .into_iter()
            .map(row_to_session)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, u64::try_from(total).unwrap_or(0)))
    }

    async fn list_created_by(
        &self,
        creator_id: UserId,
    ) -> Result<Vec<Session>, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<SessionRow> = sessions::table
            .filter(sessions::creator_id.eq(creator_id.as_uuid()))
            .order((sessions::session_date, sessions::start_time))
            .select(SessionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter().map(row_to_session).collect()
    }

    async fn list_candidates_for(
        &self,
        user_id: UserId,
        on_or_after: NaiveDate,
        limit: i64,
    ) -> Result<Vec<Session>, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let joined = session_members::table
            .filter(session_members::user_id.eq(user_id.as_uuid()))
            .select(session_members::session_id);

        let rows: Vec<SessionRow> = sessions::table
            .filter(sessions::status.eq(SessionStatus::Active.as_str()))
            .filter(sessions::session_date.ge(on_or_after))
            .filter(sessions::creator_id.ne(user_id.as_uuid()))
            .filter(sessions::id.ne_all(joined))
            .order((sessions::session_date, sessions::start_time))
            .limit(limit)
            .select(SessionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter().map(row_to_session).collect()
    }

    async fn list_in_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Session>, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<SessionRow> = sessions::table
            .filter(sessions::session_date.between(start, end))
            .order((sessions::session_date, sessions::start_time, sessions::id))
            .select(SessionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter().map(row_to_session).collect()
    }
}

/// Transaction error carrying either a Diesel failure or a refusal decided
/// inside the transaction.
#[derive(Debug)]
enum TxError {
    Diesel(diesel::result::Error),
    Refused(SessionRepositoryError),
}

impl From<diesel::result::Error> for TxError {
    fn from(value: diesel::result::Error) -> Self {
        Self::Diesel(value)
    }
}

impl From<SessionRepositoryError> for TxError {
    fn from(value: SessionRepositoryError) -> Self {
        Self::Refused(value)
    }
}
