//! Pure capacity and eligibility decisions.
//!
//! These functions answer "may user U join/leave/edit/cancel session S right
//! now" without touching storage. Each refusal is a distinct variant with a
//! user-facing message; callers surface the specific reason rather than a
//! generic failure. The storage layer independently re-asserts the
//! uniqueness and capacity invariants at write time, so a passing check here
//! is advisory under concurrency, never authoritative.

use std::fmt;

use chrono::NaiveDateTime;

use crate::domain::{Actor, UserId};

use super::{Session, SessionStatus};

/// Open capacity remaining on a session; never negative.
pub fn available_slots(session: &Session, roster_size: usize) -> usize {
    usize::from(session.players_needed()).saturating_sub(roster_size)
}

/// True once the roster has reached the session's capacity.
pub fn is_full(session: &Session, roster_size: usize) -> bool {
    roster_size >= usize::from(session.players_needed())
}

/// Reasons a join is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinRefusal {
    /// The session was cancelled.
    SessionCancelled,
    /// The session was explicitly marked completed.
    SessionCompleted,
    /// The session's start time has passed.
    SessionPast,
    /// The caller created this session.
    OwnSession,
    /// The caller is already on the roster.
    AlreadyJoined,
    /// The roster has reached capacity.
    SessionFull,
}

impl fmt::Display for JoinRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionCancelled => write!(f, "this session has been cancelled"),
            Self::SessionCompleted => write!(f, "this session is no longer active"),
            Self::SessionPast => write!(f, "this session has already taken place"),
            Self::OwnSession => write!(f, "you cannot join your own session"),
            Self::AlreadyJoined => write!(f, "you have already joined this session"),
            Self::SessionFull => write!(f, "this session is full"),
        }
    }
}

/// Decide whether `user` may join `session` right now.
///
/// `roster_size` and `already_joined` reflect the caller's most recent read
/// of the roster; the roster store re-checks both at write time.
pub fn check_join(
    session: &Session,
    roster_size: usize,
    already_joined: bool,
    user: UserId,
    now: NaiveDateTime,
) -> Result<(), JoinRefusal> {
    match session.status() {
        SessionStatus::Cancelled => return Err(JoinRefusal::SessionCancelled),
        SessionStatus::Completed => return Err(JoinRefusal::SessionCompleted),
        SessionStatus::Active => {}
    }
    if session.is_past(now) {
        return Err(JoinRefusal::SessionPast);
    }
    if user == session.creator_id() {
        return Err(JoinRefusal::OwnSession);
    }
    if already_joined {
        return Err(JoinRefusal::AlreadyJoined);
    }
    if is_full(session, roster_size) {
        return Err(JoinRefusal::SessionFull);
    }
    Ok(())
}

/// Reasons a leave is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveRefusal {
    /// The caller is not on the roster.
    NotJoined,
}

impl fmt::Display for LeaveRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotJoined => write!(f, "you have not joined this session"),
        }
    }
}

/// Decide whether a user currently on (or off) the roster may leave.
///
/// Leaving stays permitted after the session's time has passed or after a
/// cancellation: it only removes a historical commitment. This is a
/// deliberate asymmetry with join/edit/cancel, which freeze on past-ness.
pub fn check_leave(is_member: bool) -> Result<(), LeaveRefusal> {
    if is_member {
        Ok(())
    } else {
        Err(LeaveRefusal::NotJoined)
    }
}

/// Reasons an edit or cancellation is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationRefusal {
    /// The caller is neither the creator nor an admin.
    NotOwner,
    /// The session's start time has passed; it is frozen.
    SessionPast,
    /// The session was already cancelled and cannot change again.
    AlreadyCancelled,
}

impl fmt::Display for MutationRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotOwner => write!(f, "only the creator or an admin may do this"),
            Self::SessionPast => write!(f, "this session has already taken place"),
            Self::AlreadyCancelled => write!(f, "this session has already been cancelled"),
        }
    }
}

/// Decide whether `actor` may edit `session` right now.
pub fn check_edit(
    session: &Session,
    actor: Actor,
    now: NaiveDateTime,
) -> Result<(), MutationRefusal> {
    if !actor.is_owner_or_admin(session.creator_id()) {
        return Err(MutationRefusal::NotOwner);
    }
    if session.is_past(now) {
        return Err(MutationRefusal::SessionPast);
    }
    Ok(())
}

/// Decide whether `actor` may cancel `session` right now.
pub fn check_cancel(
    session: &Session,
    actor: Actor,
    now: NaiveDateTime,
) -> Result<(), MutationRefusal> {
    check_edit(session, actor, now)?;
    if session.status() == SessionStatus::Cancelled {
        return Err(MutationRefusal::AlreadyCancelled);
    }
    Ok(())
}
