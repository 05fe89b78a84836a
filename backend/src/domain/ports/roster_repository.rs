//! Port for roster membership persistence.
//!
//! The roster store is the race-safe gate for joins: uniqueness and capacity
//! are enforced as write-time invariants, not pre-checks, so the second of
//! two concurrent joins for the last slot fails here even after passing the
//! eligibility engine.

use async_trait::async_trait;

use crate::domain::{SessionId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by roster repository adapters.
    pub enum RosterRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "roster repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "roster repository query failed: {message}",
        /// The referenced session row does not exist.
        SessionMissing { message: String } =>
            "session not found: {message}",
        /// The (session, user) pair already exists; a concurrent or repeated
        /// join lost the uniqueness race.
        DuplicateMember { message: String } =>
            "user already joined this session: {message}",
        /// Adding the member would exceed the session's capacity.
        CapacityExceeded { message: String } =>
            "session is at capacity: {message}",
    }
}

/// Port for roster membership writes and reads.
///
/// [`RosterRepository::add`] must be atomic with respect to concurrent adds
/// on the same session: implementations lock or serialise at single-session
/// granularity, re-count the roster against the session's capacity, and rely
/// on the uniqueness constraint for duplicate pairs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RosterRepository: Send + Sync {
    /// Add a member, enforcing uniqueness and capacity at write time.
    async fn add(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> Result<(), RosterRepositoryError>;

    /// Remove a member; returns whether a row was actually deleted.
    async fn remove(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> Result<bool, RosterRepositoryError>;

    /// Current roster size for a session.
    async fn count_for(&self, session_id: SessionId) -> Result<u64, RosterRepositoryError>;

    /// Whether the user is on the session's roster.
    async fn contains(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> Result<bool, RosterRepositoryError>;

    /// Members of a session, in join order.
    async fn list_members(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<UserId>, RosterRepositoryError>;

    /// Sessions the user has joined.
    async fn sessions_joined_by(
        &self,
        user_id: UserId,
    ) -> Result<Vec<SessionId>, RosterRepositoryError>;

    /// Membership pairs for a set of sessions, for aggregate reporting.
    async fn members_for_sessions(
        &self,
        session_ids: &[SessionId],
    ) -> Result<Vec<(SessionId, UserId)>, RosterRepositoryError>;
}

/// Fixture implementation for tests that do not exercise roster persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRosterRepository;

#[async_trait]
impl RosterRepository for FixtureRosterRepository {
    async fn add(
        &self,
        _session_id: SessionId,
        _user_id: UserId,
    ) -> Result<(), RosterRepositoryError> {
        Ok(())
    }

    async fn remove(
        &self,
        _session_id: SessionId,
        _user_id: UserId,
    ) -> Result<bool, RosterRepositoryError> {
        Ok(false)
    }

    async fn count_for(&self, _session_id: SessionId) -> Result<u64, RosterRepositoryError> {
        Ok(0)
    }

    async fn contains(
        &self,
        _session_id: SessionId,
        _user_id: UserId,
    ) -> Result<bool, RosterRepositoryError> {
        Ok(false)
    }

    async fn list_members(
        &self,
        _session_id: SessionId,
    ) -> Result<Vec<UserId>, RosterRepositoryError> {
        Ok(Vec::new())
    }

    async fn sessions_joined_by(
        &self,
        _user_id: UserId,
    ) -> Result<Vec<SessionId>, RosterRepositoryError> {
        Ok(Vec::new())
    }

    async fn members_for_sessions(
        &self,
        _session_ids: &[SessionId],
    ) -> Result<Vec<(SessionId, UserId)>, RosterRepositoryError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;

    #[tokio::test]
    async fn fixture_roster_is_empty() {
        let repo = FixtureRosterRepository;
        assert_eq!(
            repo.count_for(SessionId::random())
                .await
                .expect("fixture count succeeds"),
            0
        );
        assert!(
            !repo
                .contains(SessionId::random(), UserId::random())
                .await
                .expect("fixture contains succeeds")
        );
    }

    #[test]
    fn duplicate_member_error_formats_message() {
        let err = RosterRepositoryError::duplicate_member("unique index hit");
        assert!(err.to_string().contains("unique index hit"));
    }

    #[test]
    fn capacity_error_formats_message() {
        let err = RosterRepositoryError::capacity_exceeded("10 of 10 joined");
        assert!(err.to_string().contains("10 of 10 joined"));
    }
}
