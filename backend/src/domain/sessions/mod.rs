//! Session aggregate, invariants, and the capacity/eligibility engine.
//!
//! A session is one scheduled sports gathering with a fixed capacity and a
//! roster of joined users. Constructors validate every invariant the storage
//! layer also enforces, so an in-memory [`Session`] is always consistent.

mod eligibility;
mod session;
mod validation;

pub use eligibility::{
    JoinRefusal, LeaveRefusal, MutationRefusal, available_slots, check_cancel, check_edit,
    check_join, check_leave, is_full,
};
pub use session::{
    MAX_CANCEL_REASON_LEN, MAX_PLAYERS_NEEDED, MAX_VENUE_LEN, MIN_CANCEL_REASON_LEN,
    MIN_PLAYERS_NEEDED, MIN_VENUE_LEN, Session, SessionDraft, SessionId, SessionStatus,
};
pub use validation::SessionValidationError;

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
