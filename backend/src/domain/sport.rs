//! Sport catalogue data model.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::UserId;

/// Stable sport identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct SportId(Uuid);

impl SportId {
    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`SportId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Minimum sport name length in characters.
pub const MIN_SPORT_NAME_LEN: usize = 2;
/// Maximum sport name length in characters.
pub const MAX_SPORT_NAME_LEN: usize = 50;

/// Validation errors returned by [`Sport::new`] and [`Sport::rename`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SportValidationError {
    /// The name was empty or too short after trimming.
    NameTooShort {
        /// Minimum accepted length in characters.
        min: usize,
    },
    /// The name exceeded the maximum length.
    NameTooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },
}

impl fmt::Display for SportValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameTooShort { min } => {
                write!(f, "sport name must be at least {min} characters")
            }
            Self::NameTooLong { max } => {
                write!(f, "sport name must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for SportValidationError {}

/// A named activity category owned by the admin who created it.
///
/// The name is unique per owning admin; sessions reference sports by id only,
/// so a rename needs no cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sport {
    id: SportId,
    owner_id: UserId,
    name: String,
}

impl Sport {
    /// Creates a validated sport with a trimmed name.
    pub fn new(
        id: SportId,
        owner_id: UserId,
        name: impl AsRef<str>,
    ) -> Result<Self, SportValidationError> {
        let name = validate_name(name.as_ref())?;
        Ok(Self { id, owner_id, name })
    }

    /// Returns the sport id.
    pub fn id(&self) -> SportId {
        self.id
    }

    /// Returns the owning admin's user id.
    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    /// Returns the trimmed sport name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Replace the name, applying the same bounds as creation.
    pub fn rename(&mut self, name: impl AsRef<str>) -> Result<(), SportValidationError> {
        self.name = validate_name(name.as_ref())?;
        Ok(())
    }
}

fn validate_name(raw: &str) -> Result<String, SportValidationError> {
    let name = raw.trim();
    let len = name.chars().count();
    if len < MIN_SPORT_NAME_LEN {
        return Err(SportValidationError::NameTooShort {
            min: MIN_SPORT_NAME_LEN,
        });
    }
    if len > MAX_SPORT_NAME_LEN {
        return Err(SportValidationError::NameTooLong {
            max: MAX_SPORT_NAME_LEN,
        });
    }
    Ok(name.to_owned())
}
