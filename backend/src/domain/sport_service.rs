//! Sport catalogue domain service.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{
    CreateSportRequest, CreateSportResponse, ListSportsResponse, RenameSportRequest,
    RenameSportResponse, SportCatalog, SportPayload, SportRepository, SportRepositoryError,
};
use crate::domain::{Error, Sport, SportId};

fn map_repository_error(error: SportRepositoryError) -> Error {
    match error {
        SportRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("sport repository unavailable: {message}"))
        }
        SportRepositoryError::Query { message } => {
            Error::internal(format!("sport repository error: {message}"))
        }
        SportRepositoryError::DuplicateName { message } => {
            Error::conflict(format!("a sport with this name already exists: {message}"))
        }
    }
}

/// Catalogue service implementing the [`SportCatalog`] driving port.
///
/// Sports are admin-managed: only admins create them, and a sport may be
/// renamed only by the admin who owns it. Sessions reference sports by id,
/// so a rename needs no cascade.
#[derive(Clone)]
pub struct SportCatalogService<P> {
    sports: Arc<P>,
}

impl<P> SportCatalogService<P> {
    /// Create a new catalogue service over the sport repository.
    pub fn new(sports: Arc<P>) -> Self {
        Self { sports }
    }
}

#[async_trait]
impl<P> SportCatalog for SportCatalogService<P>
where
    P: SportRepository,
{
    async fn create_sport(&self, request: CreateSportRequest) -> Result<CreateSportResponse, Error> {
        if !request.actor.is_admin() {
            return Err(Error::forbidden("only admins may create sports"));
        }

        let sport = Sport::new(SportId::random(), request.actor.id, request.name)
            .map_err(|err| Error::validation(err.to_string()))?;

        self.sports
            .insert(&sport)
            .await
            .map_err(map_repository_error)?;

        Ok(CreateSportResponse {
            sport: SportPayload::from(sport),
        })
    }

    async fn rename_sport(&self, request: RenameSportRequest) -> Result<RenameSportResponse, Error> {
        if !request.actor.is_admin() {
            return Err(Error::forbidden("only admins may rename sports"));
        }

        let mut sport = self
            .sports
            .find_by_id(request.sport_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("sport {} not found", request.sport_id)))?;

        if sport.owner_id() != request.actor.id {
            return Err(Error::forbidden(
                "only the admin who created a sport may rename it",
            ));
        }

        sport
            .rename(&request.new_name)
            .map_err(|err| Error::validation(err.to_string()))?;

        self.sports
            .rename(&sport)
            .await
            .map_err(map_repository_error)?;

        Ok(RenameSportResponse {
            sport: SportPayload::from(sport),
        })
    }

    async fn list_sports(&self) -> Result<ListSportsResponse, Error> {
        let sports = self
            .sports
            .list_all()
            .await
            .map_err(map_repository_error)?;

        Ok(ListSportsResponse {
            sports: sports.into_iter().map(SportPayload::from).collect(),
        })
    }
}

#[cfg(test)]
#[path = "sport_service_tests.rs"]
mod tests;
