//! Port for sport catalogue persistence.

use async_trait::async_trait;

use crate::domain::{Sport, SportId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by sport repository adapters.
    pub enum SportRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "sport repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "sport repository query failed: {message}",
        /// The owning admin already has a sport with this name; uniqueness is
        /// enforced by the storage layer so concurrent creates cannot slip
        /// past the pre-check.
        DuplicateName { message: String } =>
            "sport name already in use: {message}",
    }
}

/// Port for sport catalogue writes and ordered reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SportRepository: Send + Sync {
    /// Persist a new sport; the per-owner name uniqueness is re-asserted at
    /// write time.
    async fn insert(&self, sport: &Sport) -> Result<(), SportRepositoryError>;

    /// Replace a sport's name, subject to the same uniqueness constraint.
    async fn rename(&self, sport: &Sport) -> Result<(), SportRepositoryError>;

    /// Find a sport by id.
    async fn find_by_id(&self, sport_id: SportId)
    -> Result<Option<Sport>, SportRepositoryError>;

    /// All sports ordered by name ascending, for session-creation pickers.
    async fn list_all(&self) -> Result<Vec<Sport>, SportRepositoryError>;
}

/// Fixture implementation for tests that do not exercise sport persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSportRepository;

#[async_trait]
impl SportRepository for FixtureSportRepository {
    async fn insert(&self, _sport: &Sport) -> Result<(), SportRepositoryError> {
        Ok(())
    }

    async fn rename(&self, _sport: &Sport) -> Result<(), SportRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _sport_id: SportId,
    ) -> Result<Option<Sport>, SportRepositoryError> {
        Ok(None)
    }

    async fn list_all(&self) -> Result<Vec<Sport>, SportRepositoryError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;

    #[tokio::test]
    async fn fixture_catalogue_is_empty() {
        let repo = FixtureSportRepository;
        assert!(
            repo.list_all()
                .await
                .expect("fixture list succeeds")
                .is_empty()
        );
    }

    #[test]
    fn duplicate_name_error_formats_message() {
        let err = SportRepositoryError::duplicate_name("futsal");
        assert!(err.to_string().contains("futsal"));
    }
}
