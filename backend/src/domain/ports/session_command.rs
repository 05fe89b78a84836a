//! Driving port for session mutations.
//!
//! The web layer calls these operations with an authenticated [`Actor`] and
//! syntactically validated primitives; the core re-validates everything that
//! is consistency-critical (past-ness, ownership, capacity) because those can
//! change between form render and submission.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Actor, Error, Session, SessionDraft, SessionId, SessionStatus, SportId, UserId,
};

/// Serializable session payload for driving ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    /// Session identifier.
    pub id: SessionId,
    /// Referenced sport.
    pub sport_id: SportId,
    /// Creating user; never changes.
    pub creator_id: UserId,
    /// Calendar date of the gathering.
    pub date: NaiveDate,
    /// Wall-clock start time.
    pub time: NaiveTime,
    /// Venue text.
    pub venue: String,
    /// Capacity.
    pub players_needed: u8,
    /// Lifecycle state.
    pub status: SessionStatus,
    /// Present iff the session is cancelled.
    pub cancellation_reason: Option<String>,
}

impl From<Session> for SessionPayload {
    fn from(value: Session) -> Self {
        Self {
            id: value.id(),
            sport_id: value.sport_id(),
            creator_id: value.creator_id(),
            date: value.date(),
            time: value.time(),
            venue: value.venue().to_owned(),
            players_needed: value.players_needed(),
            status: value.status(),
            cancellation_reason: value.cancellation_reason().map(str::to_owned),
        }
    }
}

impl TryFrom<SessionPayload> for Session {
    type Error = crate::domain::SessionValidationError;

    fn try_from(value: SessionPayload) -> Result<Self, Self::Error> {
        Self::new(SessionDraft {
            id: value.id,
            sport_id: value.sport_id,
            creator_id: value.creator_id,
            date: value.date,
            time: value.time,
            venue: value.venue,
            players_needed: value.players_needed,
            status: value.status,
            cancellation_reason: value.cancellation_reason,
        })
    }
}

/// Request to create a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    /// Authenticated caller; becomes the session's creator.
    pub actor: Actor,
    /// Sport the session is for; must exist.
    pub sport_id: SportId,
    /// Calendar date; must not be in the past at the moment of creation.
    pub date: NaiveDate,
    /// Wall-clock start time.
    pub time: NaiveTime,
    /// Venue text.
    pub venue: String,
    /// Capacity.
    pub players_needed: u8,
}

/// Response from creating a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    /// The stored session.
    pub session: SessionPayload,
}

/// Request to replace a session's editable fields.
///
/// Partial updates are not supported; all editable fields arrive together
/// and are applied atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionRequest {
    /// Authenticated caller; must be the creator or an admin.
    pub actor: Actor,
    /// Session to update.
    pub session_id: SessionId,
    /// Replacement sport reference.
    pub sport_id: SportId,
    /// Replacement date.
    pub date: NaiveDate,
    /// Replacement time.
    pub time: NaiveTime,
    /// Replacement venue.
    pub venue: String,
    /// Replacement capacity; must not undercut the current roster size.
    pub players_needed: u8,
}

/// Response from updating a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionResponse {
    /// The stored session after the update.
    pub session: SessionPayload,
}

/// Request to cancel a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelSessionRequest {
    /// Authenticated caller; must be the creator or an admin.
    pub actor: Actor,
    /// Session to cancel.
    pub session_id: SessionId,
    /// Reason stored verbatim; 10 to 500 characters.
    pub reason: String,
}

/// Response from cancelling a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelSessionResponse {
    /// The stored session after cancellation.
    pub session: SessionPayload,
}

/// Request to join a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinSessionRequest {
    /// Authenticated caller.
    pub actor: Actor,
    /// Session to join.
    pub session_id: SessionId,
}

/// Response from joining a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinSessionResponse {
    /// Session that was joined.
    pub session_id: SessionId,
    /// Open capacity remaining after the join.
    pub available_slots: u32,
}

/// Request to leave a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveSessionRequest {
    /// Authenticated caller.
    pub actor: Actor,
    /// Session to leave.
    pub session_id: SessionId,
}

/// Response from leaving a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveSessionResponse {
    /// Session that was left.
    pub session_id: SessionId,
}

/// Driving port for session write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionCommand: Send + Sync {
    /// Create an active session with an empty roster.
    async fn create_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<CreateSessionResponse, Error>;

    /// Replace a session's editable fields, creator-or-admin only.
    async fn update_session(
        &self,
        request: UpdateSessionRequest,
    ) -> Result<UpdateSessionResponse, Error>;

    /// Cancel a session with a stored reason, creator-or-admin only.
    async fn cancel_session(
        &self,
        request: CancelSessionRequest,
    ) -> Result<CancelSessionResponse, Error>;

    /// Join a session; capacity and uniqueness are re-asserted at write time.
    async fn join_session(
        &self,
        request: JoinSessionRequest,
    ) -> Result<JoinSessionResponse, Error>;

    /// Leave a session; permitted even after the session is past or cancelled.
    async fn leave_session(
        &self,
        request: LeaveSessionRequest,
    ) -> Result<LeaveSessionResponse, Error>;
}
