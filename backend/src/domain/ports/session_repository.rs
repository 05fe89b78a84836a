//! Port for session persistence and session listings.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Session, SessionId, SportId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by session repository adapters.
    pub enum SessionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "session repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "session repository query failed: {message}",
        /// The targeted session row does not exist.
        Missing { message: String } =>
            "session not found: {message}",
        /// A guarded write found the stored status already cancelled.
        AlreadyCancelled { message: String } =>
            "session already cancelled: {message}",
    }
}

/// Port for writing sessions and reading ordered session listings.
///
/// Mutations are guarded at the storage layer: [`SessionRepository::update`]
/// must refuse to touch a row whose stored status is already `cancelled`,
/// reporting [`SessionRepositoryError::AlreadyCancelled`], so a concurrent
/// cancellation cannot be overwritten after the service's pre-check.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a new session.
    async fn insert(&self, session: &Session) -> Result<(), SessionRepositoryError>;

    /// Replace a session's stored fields inside one transaction, guarded on
    /// the stored status not being `cancelled`.
    async fn update(&self, session: &Session) -> Result<(), SessionRepositoryError>;

    /// Find a session by id.
    async fn find_by_id(
        &self,
        session_id: SessionId,
    ) -> Result<Option<Session>, SessionRepositoryError>;

    /// Load several sessions by id, ordered by date then time ascending.
    async fn list_by_ids(
        &self,
        session_ids: &[SessionId],
    ) -> Result<Vec<Session>, SessionRepositoryError>;

    /// Active sessions ordered by date then time ascending, optionally
    /// filtered by sport, plus the total matching row count.
    async fn list_active(
        &self,
        sport_id: Option<SportId>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Session>, u64), SessionRepositoryError>;

    /// Sessions created by the given user, date then time ascending.
    async fn list_created_by(
        &self,
        creator_id: UserId,
    ) -> Result<Vec<Session>, SessionRepositoryError>;

    /// Active sessions on or after the given date that the user neither
    /// created nor joined, date then time ascending, at most `limit` rows.
    async fn list_candidates_for(
        &self,
        user_id: UserId,
        on_or_after: NaiveDate,
        limit: i64,
    ) -> Result<Vec<Session>, SessionRepositoryError>;

    /// Sessions whose date falls in `[start, end]`, in stable storage order.
    async fn list_in_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Session>, SessionRepositoryError>;
}

/// Fixture implementation for tests that do not exercise session persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSessionRepository;

#[async_trait]
impl SessionRepository for FixtureSessionRepository {
    async fn insert(&self, _session: &Session) -> Result<(), SessionRepositoryError> {
        Ok(())
    }

    async fn update(&self, _session: &Session) -> Result<(), SessionRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _session_id: SessionId,
    ) -> Result<Option<Session>, SessionRepositoryError> {
        Ok(None)
    }

    async fn list_by_ids(
        &self,
        _session_ids: &[SessionId],
    ) -> Result<Vec<Session>, SessionRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_active(
        &self,
        _sport_id: Option<SportId>,
        _offset: i64,
        _limit: i64,
    ) -> Result<(Vec<Session>, u64), SessionRepositoryError> {
        Ok((Vec::new(), 0))
    }

    async fn list_created_by(
        &self,
        _creator_id: UserId,
    ) -> Result<Vec<Session>, SessionRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_candidates_for(
        &self,
        _user_id: UserId,
        _on_or_after: NaiveDate,
        _limit: i64,
    ) -> Result<Vec<Session>, SessionRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_in_date_range(
        &self,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<Session>, SessionRepositoryError> {
        Ok(Vec::new())
    }
}
