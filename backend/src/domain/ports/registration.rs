//! Driving port for user signup.
//!
//! Password hashing and form validation happen in the web layer; the core
//! receives the already-hashed credential and enforces email uniqueness at
//! write time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, Role, User, UserId};

/// Serializable user payload for driving ports. The credential hash is never
/// echoed back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    /// User identifier.
    pub id: UserId,
    /// Normalised email address.
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// Role fixed at signup.
    pub role: Role,
}

impl From<User> for UserPayload {
    fn from(value: User) -> Self {
        Self {
            id: value.id(),
            email: value.email().to_owned(),
            display_name: value.display_name().to_owned(),
            role: value.role(),
        }
    }
}

/// Request to register a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    /// Email address; unique across all users.
    pub email: String,
    /// Credential hash produced by the web layer.
    pub password_hash: String,
    /// Display name.
    pub display_name: String,
    /// Role fixed at signup; there is no promotion flow.
    pub role: Role,
}

/// Response from registering a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserResponse {
    /// The stored user.
    pub user: UserPayload,
}

/// Driving port for user signup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Registration: Send + Sync {
    /// Store a validated user; a concurrent signup with the same email loses
    /// the uniqueness race and surfaces as a conflict.
    async fn register_user(
        &self,
        request: RegisterUserRequest,
    ) -> Result<RegisterUserResponse, Error>;
}
