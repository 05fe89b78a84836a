//! Session validation and conversion helpers.

use std::fmt;

use super::{
    MAX_CANCEL_REASON_LEN, MAX_PLAYERS_NEEDED, MAX_VENUE_LEN, MIN_CANCEL_REASON_LEN,
    MIN_PLAYERS_NEEDED, MIN_VENUE_LEN, Session, SessionDraft, SessionStatus,
};

/// Validation errors returned when constructing a [`Session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionValidationError {
    /// The venue was too short after trimming.
    VenueTooShort {
        /// Minimum accepted length in characters.
        min: usize,
    },
    /// The venue exceeded the maximum length.
    VenueTooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },
    /// The capacity fell outside the accepted range.
    PlayersNeededOutOfRange {
        /// Smallest accepted capacity.
        min: u8,
        /// Largest accepted capacity.
        max: u8,
    },
    /// A cancelled session must carry a reason.
    CancellationReasonMissing,
    /// The cancellation reason was too short after trimming.
    CancellationReasonTooShort {
        /// Minimum accepted length in characters.
        min: usize,
    },
    /// The cancellation reason exceeded the maximum length.
    CancellationReasonTooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },
    /// Only a cancelled session may carry a reason.
    ReasonOnUncancelledSession,
}

impl fmt::Display for SessionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VenueTooShort { min } => {
                write!(f, "venue must be at least {min} characters")
            }
            Self::VenueTooLong { max } => {
                write!(f, "venue must be at most {max} characters")
            }
            Self::PlayersNeededOutOfRange { min, max } => {
                write!(f, "players needed must be between {min} and {max}")
            }
            Self::CancellationReasonMissing => {
                write!(f, "a cancellation reason is required")
            }
            Self::CancellationReasonTooShort { min } => {
                write!(f, "cancellation reason must be at least {min} characters")
            }
            Self::CancellationReasonTooLong { max } => {
                write!(f, "cancellation reason must be at most {max} characters")
            }
            Self::ReasonOnUncancelledSession => {
                write!(f, "only a cancelled session may carry a cancellation reason")
            }
        }
    }
}

impl std::error::Error for SessionValidationError {}

impl TryFrom<SessionDraft> for Session {
    type Error = SessionValidationError;

    fn try_from(value: SessionDraft) -> Result<Self, Self::Error> {
        let venue = validate_venue(&value.venue)?;
        validate_players_needed(value.players_needed)?;
        let cancellation_reason =
            validate_reason_for_status(value.status, value.cancellation_reason)?;

        Ok(Self {
            id: value.id,
            sport_id: value.sport_id,
            creator_id: value.creator_id,
            date: value.date,
            time: value.time,
            venue,
            players_needed: value.players_needed,
            status: value.status,
            cancellation_reason,
        })
    }
}

fn validate_venue(raw: &str) -> Result<String, SessionValidationError> {
    let venue = raw.trim();
    let len = venue.chars().count();
    if len < MIN_VENUE_LEN {
        return Err(SessionValidationError::VenueTooShort { min: MIN_VENUE_LEN });
    }
    if len > MAX_VENUE_LEN {
        return Err(SessionValidationError::VenueTooLong { max: MAX_VENUE_LEN });
    }
    Ok(venue.to_owned())
}

fn validate_players_needed(players_needed: u8) -> Result<(), SessionValidationError> {
    if !(MIN_PLAYERS_NEEDED..=MAX_PLAYERS_NEEDED).contains(&players_needed) {
        return Err(SessionValidationError::PlayersNeededOutOfRange {
            min: MIN_PLAYERS_NEEDED,
            max: MAX_PLAYERS_NEEDED,
        });
    }
    Ok(())
}

fn validate_reason_for_status(
    status: SessionStatus,
    reason: Option<String>,
) -> Result<Option<String>, SessionValidationError> {
    match (status, reason) {
        (SessionStatus::Cancelled, None) => Err(SessionValidationError::CancellationReasonMissing),
        (SessionStatus::Cancelled, Some(reason)) => {
            validate_cancellation_reason(&reason).map(Some)
        }
        (_, Some(_)) => Err(SessionValidationError::ReasonOnUncancelledSession),
        (_, None) => Ok(None),
    }
}

/// Check the bounds of a cancellation reason and return it verbatim.
///
/// Trimming applies to the length check only; the stored reason keeps the
/// caller's original text.
pub(super) fn validate_cancellation_reason(
    raw: &str,
) -> Result<String, SessionValidationError> {
    let len = raw.trim().chars().count();
    if len < MIN_CANCEL_REASON_LEN {
        return Err(SessionValidationError::CancellationReasonTooShort {
            min: MIN_CANCEL_REASON_LEN,
        });
    }
    if len > MAX_CANCEL_REASON_LEN {
        return Err(SessionValidationError::CancellationReasonTooLong {
            max: MAX_CANCEL_REASON_LEN,
        });
    }
    Ok(raw.to_owned())
}
