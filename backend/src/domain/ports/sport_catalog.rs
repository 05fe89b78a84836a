//! Driving port for sport catalogue management.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Actor, Error, Sport, SportId, UserId};

/// Serializable sport payload for driving ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SportPayload {
    /// Sport identifier.
    pub id: SportId,
    /// Owning admin.
    pub owner_id: UserId,
    /// Trimmed sport name.
    pub name: String,
}

impl From<Sport> for SportPayload {
    fn from(value: Sport) -> Self {
        Self {
            id: value.id(),
            owner_id: value.owner_id(),
            name: value.name().to_owned(),
        }
    }
}

/// Request to create a sport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSportRequest {
    /// Authenticated caller; must be an admin.
    pub actor: Actor,
    /// Name, trimmed and unique per owning admin.
    pub name: String,
}

/// Response from creating a sport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSportResponse {
    /// The stored sport.
    pub sport: SportPayload,
}

/// Request to rename a sport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameSportRequest {
    /// Authenticated caller; must be the owning admin.
    pub actor: Actor,
    /// Sport to rename.
    pub sport_id: SportId,
    /// Replacement name, same constraints as creation.
    pub new_name: String,
}

/// Response from renaming a sport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameSportResponse {
    /// The stored sport after the rename.
    pub sport: SportPayload,
}

/// Response listing all sports, name ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListSportsResponse {
    /// Sports ordered by name.
    pub sports: Vec<SportPayload>,
}

/// Driving port for sport catalogue operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SportCatalog: Send + Sync {
    /// Create a sport owned by the calling admin.
    async fn create_sport(&self, request: CreateSportRequest)
    -> Result<CreateSportResponse, Error>;

    /// Rename a sport, owning admin only.
    async fn rename_sport(&self, request: RenameSportRequest)
    -> Result<RenameSportResponse, Error>;

    /// All sports ordered by name, for session-creation pickers.
    async fn list_sports(&self) -> Result<ListSportsResponse, Error>;
}
