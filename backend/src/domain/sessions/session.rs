//! Session entity and lifecycle state.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{SportId, UserId};

use super::SessionValidationError;

/// Stable session identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`SessionId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session lifecycle state.
///
/// `Active` is the only state permitting joins and edits. `Completed` is
/// non-authoritative metadata reachable only by explicit action; past-ness is
/// always decided by [`Session::is_past`], never by this flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Open for joins, edits, and cancellation.
    Active,
    /// Cancelled with a stored reason; immutable thereafter.
    Cancelled,
    /// Explicitly marked finished; informational only.
    Completed,
}

impl SessionStatus {
    /// Stable string form used by the persistence layer.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Parse the persisted string form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "cancelled" => Some(Self::Cancelled),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Minimum venue length in characters.
pub const MIN_VENUE_LEN: usize = 2;
/// Maximum venue length in characters.
pub const MAX_VENUE_LEN: usize = 200;
/// Minimum capacity a session may be created with.
pub const MIN_PLAYERS_NEEDED: u8 = 1;
/// Maximum capacity a session may be created with.
pub const MAX_PLAYERS_NEEDED: u8 = 50;
/// Minimum cancellation reason length in characters.
pub const MIN_CANCEL_REASON_LEN: usize = 10;
/// Maximum cancellation reason length in characters.
pub const MAX_CANCEL_REASON_LEN: usize = 500;

/// Input payload for [`Session::new`].
#[derive(Debug, Clone)]
pub struct SessionDraft {
    /// Identifier for the session.
    pub id: SessionId,
    /// Sport this session is for.
    pub sport_id: SportId,
    /// User who created the session; never changes.
    pub creator_id: UserId,
    /// Calendar date of the gathering.
    pub date: NaiveDate,
    /// Wall-clock start time; the deployment is single-timezone.
    pub time: NaiveTime,
    /// Free-text venue description.
    pub venue: String,
    /// Capacity: how many players the creator is looking for.
    pub players_needed: u8,
    /// Lifecycle state.
    pub status: SessionStatus,
    /// Present iff `status` is [`SessionStatus::Cancelled`].
    pub cancellation_reason: Option<String>,
}

/// A scheduled sports gathering with a fixed capacity.
///
/// The roster is not embedded here; it lives behind the roster repository
/// port so membership writes stay race-safe at the storage layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub(super) id: SessionId,
    pub(super) sport_id: SportId,
    pub(super) creator_id: UserId,
    pub(super) date: NaiveDate,
    pub(super) time: NaiveTime,
    pub(super) venue: String,
    pub(super) players_needed: u8,
    pub(super) status: SessionStatus,
    pub(super) cancellation_reason: Option<String>,
}

impl Session {
    /// Creates a validated session.
    pub fn new(draft: SessionDraft) -> Result<Self, SessionValidationError> {
        Self::try_from(draft)
    }

    /// Returns the session id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the referenced sport id.
    pub fn sport_id(&self) -> SportId {
        self.sport_id
    }

    /// Returns the creator's user id.
    pub fn creator_id(&self) -> UserId {
        self.creator_id
    }

    /// Returns the calendar date.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the wall-clock start time.
    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// Returns the venue text.
    pub fn venue(&self) -> &str {
        self.venue.as_str()
    }

    /// Returns the capacity.
    pub fn players_needed(&self) -> u8 {
        self.players_needed
    }

    /// Returns the lifecycle state.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Returns the stored cancellation reason, if any.
    pub fn cancellation_reason(&self) -> Option<&str> {
        self.cancellation_reason.as_deref()
    }

    /// Combined date and time instant of the gathering.
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// True iff the session's instant is strictly before `now`.
    ///
    /// Every mutation guard evaluates this against the wall clock at call
    /// time; a past session is frozen against edit, cancel, and join.
    pub fn is_past(&self, now: NaiveDateTime) -> bool {
        self.starts_at() < now
    }

    /// Whether the session is in the [`SessionStatus::Active`] state.
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Derive the cancelled form of this session with the given reason.
    ///
    /// Validates the reason bounds; the caller is responsible for the state
    /// and time guards via [`super::check_cancel`].
    pub fn into_cancelled(
        self,
        reason: impl Into<String>,
    ) -> Result<Self, SessionValidationError> {
        Self::new(SessionDraft {
            status: SessionStatus::Cancelled,
            cancellation_reason: Some(reason.into()),
            ..SessionDraft::from(self)
        })
    }
}

impl From<Session> for SessionDraft {
    fn from(value: Session) -> Self {
        Self {
            id: value.id,
            sport_id: value.sport_id,
            creator_id: value.creator_id,
            date: value.date,
            time: value.time,
            venue: value.venue,
            players_needed: value.players_needed,
            status: value.status,
            cancellation_reason: value.cancellation_reason,
        }
    }
}
