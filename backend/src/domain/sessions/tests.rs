//! Unit tests for the session aggregate and the eligibility engine.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rstest::{fixture, rstest};

use crate::domain::{Actor, Role, SportId, UserId};

use super::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid calendar date")
}

fn time(h: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, min, 0).expect("valid wall-clock time")
}

fn draft(creator: UserId) -> SessionDraft {
    SessionDraft {
        id: SessionId::random(),
        sport_id: SportId::random(),
        creator_id: creator,
        date: date(2026, 10, 3),
        time: time(18, 30),
        venue: "Riverside pitch 2".to_owned(),
        players_needed: 10,
        status: SessionStatus::Active,
        cancellation_reason: None,
    }
}

#[fixture]
fn session() -> Session {
    Session::new(draft(UserId::random())).expect("valid session draft")
}

fn before_start() -> NaiveDateTime {
    date(2026, 10, 3).and_time(time(12, 0))
}

fn after_start() -> NaiveDateTime {
    date(2026, 10, 3).and_time(time(19, 0))
}

mod construction {
    use super::*;

    #[rstest]
    fn trims_venue() {
        let mut input = draft(UserId::random());
        input.venue = "  Court 1  ".to_owned();
        let session = Session::new(input).expect("valid draft");
        assert_eq!(session.venue(), "Court 1");
    }

    #[rstest]
    #[case("V")]
    #[case(" ")]
    fn rejects_short_venues(#[case] venue: &str) {
        let mut input = draft(UserId::random());
        input.venue = venue.to_owned();
        assert_eq!(
            Session::new(input),
            Err(SessionValidationError::VenueTooShort { min: MIN_VENUE_LEN })
        );
    }

    #[rstest]
    fn rejects_overlong_venue() {
        let mut input = draft(UserId::random());
        input.venue = "x".repeat(MAX_VENUE_LEN + 1);
        assert_eq!(
            Session::new(input),
            Err(SessionValidationError::VenueTooLong { max: MAX_VENUE_LEN })
        );
    }

    #[rstest]
    #[case(0)]
    #[case(MAX_PLAYERS_NEEDED + 1)]
    fn rejects_capacity_out_of_range(#[case] players_needed: u8) {
        let mut input = draft(UserId::random());
        input.players_needed = players_needed;
        assert_eq!(
            Session::new(input),
            Err(SessionValidationError::PlayersNeededOutOfRange {
                min: MIN_PLAYERS_NEEDED,
                max: MAX_PLAYERS_NEEDED,
            })
        );
    }

    #[rstest]
    fn cancelled_draft_requires_reason() {
        let mut input = draft(UserId::random());
        input.status = SessionStatus::Cancelled;
        assert_eq!(
            Session::new(input),
            Err(SessionValidationError::CancellationReasonMissing)
        );
    }

    #[rstest]
    fn active_draft_must_not_carry_reason() {
        let mut input = draft(UserId::random());
        input.cancellation_reason = Some("rained off, pitch flooded".to_owned());
        assert_eq!(
            Session::new(input),
            Err(SessionValidationError::ReasonOnUncancelledSession)
        );
    }
}

mod past_ness {
    use super::*;

    #[rstest]
    fn instant_before_now_is_past(session: Session) {
        assert!(session.is_past(after_start()));
    }

    #[rstest]
    fn exact_instant_is_not_past(session: Session) {
        assert!(!session.is_past(session.starts_at()));
    }

    #[rstest]
    fn future_instant_is_not_past(session: Session) {
        assert!(!session.is_past(before_start()));
    }
}

mod cancellation {
    use super::*;

    #[rstest]
    fn stores_reason_verbatim(session: Session) {
        let cancelled = session
            .into_cancelled("pitch flooded after storms")
            .expect("valid reason");
        assert_eq!(cancelled.status(), SessionStatus::Cancelled);
        assert_eq!(
            cancelled.cancellation_reason(),
            Some("pitch flooded after storms")
        );
    }

    #[rstest]
    fn rejects_short_reason(session: Session) {
        assert_eq!(
            session.into_cancelled("too wet"),
            Err(SessionValidationError::CancellationReasonTooShort {
                min: MIN_CANCEL_REASON_LEN
            })
        );
    }

    #[rstest]
    fn rejects_padded_short_reason(session: Session) {
        // Whitespace padding must not smuggle an under-length reason through.
        assert_eq!(
            session.into_cancelled("   too wet    "),
            Err(SessionValidationError::CancellationReasonTooShort {
                min: MIN_CANCEL_REASON_LEN
            })
        );
    }

    #[rstest]
    fn rejects_overlong_reason(session: Session) {
        assert_eq!(
            session.into_cancelled("x".repeat(MAX_CANCEL_REASON_LEN + 1)),
            Err(SessionValidationError::CancellationReasonTooLong {
                max: MAX_CANCEL_REASON_LEN
            })
        );
    }
}

mod capacity {
    use super::*;

    #[rstest]
    fn available_slots_never_goes_negative(session: Session) {
        assert_eq!(available_slots(&session, 0), 10);
        assert_eq!(available_slots(&session, 10), 0);
        assert_eq!(available_slots(&session, 12), 0);
    }

    #[rstest]
    fn full_at_capacity(session: Session) {
        assert!(!is_full(&session, 9));
        assert!(is_full(&session, 10));
        assert!(is_full(&session, 11));
    }
}

mod join_eligibility {
    use super::*;

    #[rstest]
    fn eligible_on_open_future_session(session: Session) {
        let user = UserId::random();
        assert_eq!(
            check_join(&session, 3, false, user, before_start()),
            Ok(())
        );
    }

    #[rstest]
    fn creator_cannot_join_own_session(session: Session) {
        assert_eq!(
            check_join(&session, 0, false, session.creator_id(), before_start()),
            Err(JoinRefusal::OwnSession)
        );
    }

    #[rstest]
    fn past_session_refuses_joins(session: Session) {
        assert_eq!(
            check_join(&session, 0, false, UserId::random(), after_start()),
            Err(JoinRefusal::SessionPast)
        );
    }

    #[rstest]
    fn cancelled_session_refuses_joins(session: Session) {
        let cancelled = session
            .into_cancelled("not enough interest this week")
            .expect("valid reason");
        assert_eq!(
            check_join(&cancelled, 0, false, UserId::random(), before_start()),
            Err(JoinRefusal::SessionCancelled)
        );
    }

    #[rstest]
    fn duplicate_join_is_refused(session: Session) {
        assert_eq!(
            check_join(&session, 3, true, UserId::random(), before_start()),
            Err(JoinRefusal::AlreadyJoined)
        );
    }

    #[rstest]
    fn full_session_refuses_joins(session: Session) {
        assert_eq!(
            check_join(&session, 10, false, UserId::random(), before_start()),
            Err(JoinRefusal::SessionFull)
        );
    }

    #[rstest]
    fn cancellation_outranks_past_ness(session: Session) {
        // A cancelled session that is also past reports the cancellation.
        let cancelled = session
            .into_cancelled("referee unavailable, sorry")
            .expect("valid reason");
        assert_eq!(
            check_join(&cancelled, 0, false, UserId::random(), after_start()),
            Err(JoinRefusal::SessionCancelled)
        );
    }
}

mod leave_eligibility {
    use super::*;

    #[rstest]
    fn member_may_leave() {
        assert_eq!(check_leave(true), Ok(()));
    }

    #[rstest]
    fn non_member_may_not_leave() {
        assert_eq!(check_leave(false), Err(LeaveRefusal::NotJoined));
    }
}

mod edit_and_cancel_eligibility {
    use super::*;

    #[rstest]
    fn creator_may_edit_future_session(session: Session) {
        let actor = Actor::new(session.creator_id(), Role::Player);
        assert_eq!(check_edit(&session, actor, before_start()), Ok(()));
    }

    #[rstest]
    fn admin_may_edit_someone_elses_session(session: Session) {
        let actor = Actor::new(UserId::random(), Role::Admin);
        assert_eq!(check_edit(&session, actor, before_start()), Ok(()));
    }

    #[rstest]
    fn stranger_may_not_edit(session: Session) {
        let actor = Actor::new(UserId::random(), Role::Player);
        assert_eq!(
            check_edit(&session, actor, before_start()),
            Err(MutationRefusal::NotOwner)
        );
    }

    #[rstest]
    fn past_session_is_frozen_even_for_creator(session: Session) {
        let actor = Actor::new(session.creator_id(), Role::Player);
        assert_eq!(
            check_edit(&session, actor, after_start()),
            Err(MutationRefusal::SessionPast)
        );
    }

    #[rstest]
    fn cancel_refused_when_already_cancelled(session: Session) {
        let actor = Actor::new(session.creator_id(), Role::Player);
        let cancelled = session
            .into_cancelled("pitch double-booked by the venue")
            .expect("valid reason");
        assert_eq!(
            check_cancel(&cancelled, actor, before_start()),
            Err(MutationRefusal::AlreadyCancelled)
        );
    }

    #[rstest]
    fn cancel_allowed_on_active_future_session(session: Session) {
        let actor = Actor::new(UserId::random(), Role::Admin);
        assert_eq!(check_cancel(&session, actor, before_start()), Ok(()));
    }
}
