//! Port for user account persistence.

use async_trait::async_trait;

use crate::domain::{User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "user repository query failed: {message}",
        /// The email address is already registered; uniqueness is enforced by
        /// the storage layer to survive concurrent signups.
        DuplicateEmail { message: String } =>
            "email already registered: {message}",
    }
}

/// Port for user account writes and reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user; email uniqueness is re-asserted at write time.
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Find a user by id.
    async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Find a user by normalised email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError>;
}

/// Fixture implementation for tests that do not exercise user persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn insert(&self, _user: &User) -> Result<(), UserRepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, _user_id: UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(None)
    }

    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, UserRepositoryError> {
        Ok(None)
    }
}
