//! Behavioural coverage for [`SessionService`] over mocked repositories.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};

use crate::domain::ports::{
    BrowseRequest, CancelSessionRequest, CreateSessionRequest, DashboardRequest,
    JoinSessionRequest, LeaveSessionRequest, MockRosterRepository, MockSessionRepository,
    MockSportRepository, RosterRepositoryError, SessionCommand, SessionQuery,
    SessionRepositoryError, SportPopularityRequest, UpdateSessionRequest,
};
use crate::domain::sessions::{Session, SessionDraft, SessionId, SessionStatus};
use crate::domain::{Actor, ErrorCode, Role, Sport, SportId, UserId};
use crate::test_support::FixedClock;
use pagination::PageRequest;

use super::SessionService;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn time(h: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, min, 0).expect("valid time")
}

/// The tests run with "now" pinned to midday on 1 October 2026.
fn now() -> NaiveDateTime {
    date(2026, 10, 1).and_time(time(12, 0))
}

fn clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock::new(Utc.from_utc_datetime(&now())))
}

fn player() -> Actor {
    Actor::new(UserId::random(), Role::Player)
}

fn session_for(creator: UserId, sport_id: SportId) -> Session {
    Session::new(SessionDraft {
        id: SessionId::random(),
        sport_id,
        creator_id: creator,
        date: date(2026, 10, 3),
        time: time(18, 30),
        venue: "Riverside pitch 2".into(),
        players_needed: 10,
        status: SessionStatus::Active,
        cancellation_reason: None,
    })
    .expect("valid session")
}

fn known_sport(sport_id: SportId) -> MockSportRepository {
    let mut sports = MockSportRepository::new();
    sports.expect_find_by_id().returning(move |id| {
        Ok((id == sport_id)
            .then(|| Sport::new(sport_id, UserId::random(), "Football").expect("valid sport")))
    });
    sports
}

#[fixture]
fn sport_id() -> SportId {
    SportId::random()
}

mod create {
    use super::*;

    #[rstest]
    #[tokio::test]
    async fn persists_a_valid_session(sport_id: SportId) {
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_insert()
            .withf(|s: &Session| s.venue() == "Riverside pitch 2" && s.is_active())
            .returning(|_| Ok(()));
        let service = SessionService::new(
            Arc::new(sessions),
            Arc::new(MockRosterRepository::new()),
            Arc::new(known_sport(sport_id)),
            clock(),
        );

        let response = service
            .create_session(CreateSessionRequest {
                actor: player(),
                sport_id,
                date: date(2026, 10, 3),
                time: time(18, 30),
                venue: "Riverside pitch 2".into(),
                players_needed: 10,
            })
            .await
            .expect("creation succeeds");

        assert_eq!(response.session.status, SessionStatus::Active);
        assert!(response.session.cancellation_reason.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn rejects_a_past_start_instant(sport_id: SportId) {
        let service = SessionService::new(
            Arc::new(MockSessionRepository::new()),
            Arc::new(MockRosterRepository::new()),
            Arc::new(known_sport(sport_id)),
            clock(),
        );

        let error = service
            .create_session(CreateSessionRequest {
                actor: player(),
                sport_id,
                date: date(2026, 10, 1),
                time: time(9, 0),
                venue: "Riverside pitch 2".into(),
                players_needed: 10,
            })
            .await
            .expect_err("past date refused");

        assert_eq!(error.code(), ErrorCode::Validation);
        assert_eq!(error.message(), "date must be in the future");
    }

    #[rstest]
    #[tokio::test]
    async fn rejects_an_unknown_sport(sport_id: SportId) {
        let mut sports = MockSportRepository::new();
        sports.expect_find_by_id().returning(|_| Ok(None));
        let service = SessionService::new(
            Arc::new(MockSessionRepository::new()),
            Arc::new(MockRosterRepository::new()),
            Arc::new(sports),
            clock(),
        );

        let error = service
            .create_session(CreateSessionRequest {
                actor: player(),
                sport_id,
                date: date(2026, 10, 3),
                time: time(18, 30),
                venue: "Riverside pitch 2".into(),
                players_needed: 10,
            })
            .await
            .expect_err("unknown sport refused");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn surfaces_entity_validation_failures(sport_id: SportId) {
        let service = SessionService::new(
            Arc::new(MockSessionRepository::new()),
            Arc::new(MockRosterRepository::new()),
            Arc::new(known_sport(sport_id)),
            clock(),
        );

        let error = service
            .create_session(CreateSessionRequest {
                actor: player(),
                sport_id,
                date: date(2026, 10, 3),
                time: time(18, 30),
                venue: "Riverside pitch 2".into(),
                players_needed: 0,
            })
            .await
            .expect_err("zero capacity refused");

        assert_eq!(error.code(), ErrorCode::Validation);
    }
}

mod update {
    use super::*;

    fn service_with_session(
        session: Session,
        roster_size: u64,
        sport_id: SportId,
    ) -> SessionService<MockSessionRepository, MockRosterRepository, MockSportRepository> {
        let mut sessions = MockSessionRepository::new();
        let found = session.clone();
        sessions
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        sessions.expect_update().returning(|_| Ok(()));
        let mut roster = MockRosterRepository::new();
        roster.expect_count_for().returning(move |_| Ok(roster_size));
        SessionService::new(
            Arc::new(sessions),
            Arc::new(roster),
            Arc::new(known_sport(sport_id)),
            clock(),
        )
    }

    fn update_request(actor: Actor, session: &Session, players_needed: u8) -> UpdateSessionRequest {
        UpdateSessionRequest {
            actor,
            session_id: session.id(),
            sport_id: session.sport_id(),
            date: session.date(),
            time: session.time(),
            venue: "Moved to pitch 5".into(),
            players_needed,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn creator_replaces_fields(sport_id: SportId) {
        let creator = player();
        let session = session_for(creator.id, sport_id);
        let service = service_with_session(session.clone(), 3, sport_id);

        let response = service
            .update_session(update_request(creator, &session, 8))
            .await
            .expect("update succeeds");

        assert_eq!(response.session.venue, "Moved to pitch 5");
        assert_eq!(response.session.players_needed, 8);
    }

    #[rstest]
    #[tokio::test]
    async fn admin_may_edit_another_users_session(sport_id: SportId) {
        let session = session_for(UserId::random(), sport_id);
        let service = service_with_session(session.clone(), 0, sport_id);
        let admin = Actor::new(UserId::random(), Role::Admin);

        service
            .update_session(update_request(admin, &session, 10))
            .await
            .expect("admin update succeeds");
    }

    #[rstest]
    #[tokio::test]
    async fn refuses_rescheduling_into_the_past(sport_id: SportId) {
        let creator = player();
        let session = session_for(creator.id, sport_id);
        let service = service_with_session(session.clone(), 0, sport_id);
        let mut request = update_request(creator, &session, 10);
        request.date = date(2026, 9, 20);

        let error = service
            .update_session(request)
            .await
            .expect_err("backdated reschedule refused");

        assert_eq!(error.code(), ErrorCode::Validation);
        assert_eq!(error.message(), "date must be in the future");
    }

    #[rstest]
    #[tokio::test]
    async fn refuses_a_stranger(sport_id: SportId) {
        let session = session_for(UserId::random(), sport_id);
        let service = service_with_session(session.clone(), 0, sport_id);

        let error = service
            .update_session(update_request(player(), &session, 10))
            .await
            .expect_err("stranger refused");

        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn refuses_capacity_below_roster_size(sport_id: SportId) {
        let creator = player();
        let session = session_for(creator.id, sport_id);
        let service = service_with_session(session.clone(), 6, sport_id);

        let error = service
            .update_session(update_request(creator, &session, 5))
            .await
            .expect_err("shrink below roster refused");

        assert_eq!(error.code(), ErrorCode::Validation);
        assert!(error.message().contains("roster size of 6"));
    }

    #[rstest]
    #[tokio::test]
    async fn refuses_a_cancelled_session(sport_id: SportId) {
        let creator = player();
        let cancelled = session_for(creator.id, sport_id)
            .into_cancelled("Pitch flooded after the storm")
            .expect("valid cancellation");
        let service = service_with_session(cancelled.clone(), 0, sport_id);

        let error = service
            .update_session(update_request(creator, &cancelled, 10))
            .await
            .expect_err("cancelled session frozen");

        assert_eq!(error.code(), ErrorCode::InvalidState);
    }
}

mod cancel {
    use super::*;

    #[rstest]
    #[tokio::test]
    async fn stores_the_reason_verbatim(sport_id: SportId) {
        let creator = player();
        let session = session_for(creator.id, sport_id);
        let mut sessions = MockSessionRepository::new();
        let found = session.clone();
        sessions
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        sessions
            .expect_update()
            .withf(|s: &Session| {
                s.status() == SessionStatus::Cancelled
                    && s.cancellation_reason() == Some("Pitch flooded after the storm")
            })
            .returning(|_| Ok(()));
        let service = SessionService::new(
            Arc::new(sessions),
            Arc::new(MockRosterRepository::new()),
            Arc::new(MockSportRepository::new()),
            clock(),
        );

        let response = service
            .cancel_session(CancelSessionRequest {
                actor: creator,
                session_id: session.id(),
                reason: "Pitch flooded after the storm".into(),
            })
            .await
            .expect("cancellation succeeds");

        assert_eq!(response.session.status, SessionStatus::Cancelled);
    }

    #[rstest]
    #[tokio::test]
    async fn refuses_a_second_cancellation(sport_id: SportId) {
        let creator = player();
        let cancelled = session_for(creator.id, sport_id)
            .into_cancelled("Pitch flooded after the storm")
            .expect("valid cancellation");
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_find_by_id()
            .returning(move |_| Ok(Some(cancelled.clone())));
        let service = SessionService::new(
            Arc::new(sessions),
            Arc::new(MockRosterRepository::new()),
            Arc::new(MockSportRepository::new()),
            clock(),
        );

        let error = service
            .cancel_session(CancelSessionRequest {
                actor: creator,
                session_id: SessionId::random(),
                reason: "Still raining heavily today".into(),
            })
            .await
            .expect_err("double cancel refused");

        assert_eq!(error.code(), ErrorCode::InvalidState);
    }

    #[rstest]
    #[tokio::test]
    async fn maps_a_lost_cancellation_race(sport_id: SportId) {
        let creator = player();
        let session = session_for(creator.id, sport_id);
        let mut sessions = MockSessionRepository::new();
        let found = session.clone();
        sessions
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        sessions.expect_update().returning(|s: &Session| {
            Err(SessionRepositoryError::already_cancelled(s.id().to_string()))
        });
        let service = SessionService::new(
            Arc::new(sessions),
            Arc::new(MockRosterRepository::new()),
            Arc::new(MockSportRepository::new()),
            clock(),
        );

        let error = service
            .cancel_session(CancelSessionRequest {
                actor: creator,
                session_id: session.id(),
                reason: "Pitch flooded after the storm".into(),
            })
            .await
            .expect_err("lost race surfaces");

        assert_eq!(error.code(), ErrorCode::InvalidState);
    }
}

mod join {
    use super::*;

    fn joinable(
        session: Session,
        roster_size: u64,
    ) -> (MockSessionRepository, MockRosterRepository) {
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_find_by_id()
            .returning(move |_| Ok(Some(session.clone())));
        let mut roster = MockRosterRepository::new();
        roster.expect_count_for().returning(move |_| Ok(roster_size));
        roster.expect_contains().returning(|_, _| Ok(false));
        (sessions, roster)
    }

    #[rstest]
    #[tokio::test]
    async fn reports_remaining_slots_after_joining(sport_id: SportId) {
        let session = session_for(UserId::random(), sport_id);
        let (sessions, mut roster) = joinable(session.clone(), 7);
        roster.expect_add().returning(|_, _| Ok(()));
        let service = SessionService::new(
            Arc::new(sessions),
            Arc::new(roster),
            Arc::new(MockSportRepository::new()),
            clock(),
        );

        let response = service
            .join_session(JoinSessionRequest {
                actor: player(),
                session_id: session.id(),
            })
            .await
            .expect("join succeeds");

        assert_eq!(response.available_slots, 2);
    }

    #[rstest]
    #[tokio::test]
    async fn creator_cannot_join_their_own_session(sport_id: SportId) {
        let creator = player();
        let session = session_for(creator.id, sport_id);
        let (sessions, roster) = joinable(session.clone(), 0);
        let service = SessionService::new(
            Arc::new(sessions),
            Arc::new(roster),
            Arc::new(MockSportRepository::new()),
            clock(),
        );

        let error = service
            .join_session(JoinSessionRequest {
                actor: creator,
                session_id: session.id(),
            })
            .await
            .expect_err("own session refused");

        assert_eq!(error.code(), ErrorCode::InvalidState);
        assert_eq!(error.message(), "you cannot join your own session");
    }

    #[rstest]
    #[tokio::test]
    async fn full_session_is_refused_before_writing(sport_id: SportId) {
        let session = session_for(UserId::random(), sport_id);
        let (sessions, roster) = joinable(session.clone(), 10);
        let service = SessionService::new(
            Arc::new(sessions),
            Arc::new(roster),
            Arc::new(MockSportRepository::new()),
            clock(),
        );

        let error = service
            .join_session(JoinSessionRequest {
                actor: player(),
                session_id: session.id(),
            })
            .await
            .expect_err("full session refused");

        assert_eq!(error.code(), ErrorCode::InvalidState);
        assert_eq!(error.message(), "this session is full");
    }

    #[rstest]
    #[tokio::test]
    async fn a_lost_capacity_race_reads_like_a_full_session(sport_id: SportId) {
        let session = session_for(UserId::random(), sport_id);
        let (sessions, mut roster) = joinable(session.clone(), 9);
        roster.expect_add().returning(|session_id, _| {
            Err(RosterRepositoryError::capacity_exceeded(
                session_id.to_string(),
            ))
        });
        let service = SessionService::new(
            Arc::new(sessions),
            Arc::new(roster),
            Arc::new(MockSportRepository::new()),
            clock(),
        );

        let error = service
            .join_session(JoinSessionRequest {
                actor: player(),
                session_id: session.id(),
            })
            .await
            .expect_err("write-time capacity check holds");

        assert_eq!(error.code(), ErrorCode::Conflict);
        assert_eq!(error.message(), "this session is full");
    }

    #[rstest]
    #[tokio::test]
    async fn joining_a_cancelled_session_is_refused(sport_id: SportId) {
        let cancelled = session_for(UserId::random(), sport_id)
            .into_cancelled("Pitch flooded after the storm")
            .expect("valid cancellation");
        let (sessions, roster) = joinable(cancelled.clone(), 0);
        let service = SessionService::new(
            Arc::new(sessions),
            Arc::new(roster),
            Arc::new(MockSportRepository::new()),
            clock(),
        );

        let error = service
            .join_session(JoinSessionRequest {
                actor: player(),
                session_id: cancelled.id(),
            })
            .await
            .expect_err("cancelled session refused");

        assert_eq!(error.message(), "this session has been cancelled");
    }
}

mod leave {
    use super::*;

    #[rstest]
    #[tokio::test]
    async fn removes_an_existing_member(sport_id: SportId) {
        let session = session_for(UserId::random(), sport_id);
        let mut sessions = MockSessionRepository::new();
        let found = session.clone();
        sessions
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        let mut roster = MockRosterRepository::new();
        roster.expect_contains().returning(|_, _| Ok(true));
        roster.expect_remove().returning(|_, _| Ok(true));
        let service = SessionService::new(
            Arc::new(sessions),
            Arc::new(roster),
            Arc::new(MockSportRepository::new()),
            clock(),
        );

        let response = service
            .leave_session(LeaveSessionRequest {
                actor: player(),
                session_id: session.id(),
            })
            .await
            .expect("leave succeeds");

        assert_eq!(response.session_id, session.id());
    }

    #[rstest]
    #[tokio::test]
    async fn refuses_a_non_member(sport_id: SportId) {
        let session = session_for(UserId::random(), sport_id);
        let mut sessions = MockSessionRepository::new();
        let found = session.clone();
        sessions
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        let mut roster = MockRosterRepository::new();
        roster.expect_contains().returning(|_, _| Ok(false));
        let service = SessionService::new(
            Arc::new(sessions),
            Arc::new(roster),
            Arc::new(MockSportRepository::new()),
            clock(),
        );

        let error = service
            .leave_session(LeaveSessionRequest {
                actor: player(),
                session_id: session.id(),
            })
            .await
            .expect_err("non-member refused");

        assert_eq!(error.code(), ErrorCode::InvalidState);
        assert_eq!(error.message(), "you have not joined this session");
    }
}

mod queries {
    use super::*;

    fn dated(session: Session, on: NaiveDate) -> Session {
        Session::new(SessionDraft {
            date: on,
            ..SessionDraft::from(session)
        })
        .expect("valid session")
    }

    #[rstest]
    #[tokio::test]
    async fn dashboard_buckets_split_on_calendar_date(sport_id: SportId) {
        let user = UserId::random();
        let created = session_for(user, sport_id);
        let today = dated(session_for(user, sport_id), date(2026, 10, 1));
        let yesterday = dated(session_for(user, sport_id), date(2026, 9, 30));
        let joined = session_for(UserId::random(), sport_id);

        let mut sessions = MockSessionRepository::new();
        let mine = vec![created, today, yesterday];
        sessions
            .expect_list_created_by()
            .returning(move |_| Ok(mine.clone()));
        let theirs = vec![joined.clone()];
        sessions
            .expect_list_by_ids()
            .returning(move |_| Ok(theirs.clone()));
        sessions
            .expect_list_candidates_for()
            .withf(|_, on_or_after, limit| {
                *on_or_after == date(2026, 10, 1) && *limit == 5
            })
            .returning(|_, _, _| Ok(Vec::new()));
        let mut roster = MockRosterRepository::new();
        let joined_id = joined.id();
        roster
            .expect_sessions_joined_by()
            .returning(move |_| Ok(vec![joined_id]));
        let service = SessionService::new(
            Arc::new(sessions),
            Arc::new(roster),
            Arc::new(MockSportRepository::new()),
            clock(),
        );

        let response = service
            .dashboard_for(DashboardRequest {
                user_id: user,
                candidate_limit: 5,
            })
            .await
            .expect("dashboard succeeds");

        // A session dated today is upcoming even though midday has passed.
        assert_eq!(response.created_upcoming.len(), 2);
        assert_eq!(response.created_past.len(), 1);
        assert_eq!(response.joined_upcoming.len(), 1);
        assert!(response.joined_past.is_empty());
        assert!(response.candidates.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn browse_annotates_membership_and_slots(sport_id: SportId) {
        let joined = session_for(UserId::random(), sport_id);
        let open = session_for(UserId::random(), sport_id);

        let mut sessions = MockSessionRepository::new();
        let listed = vec![joined.clone(), open.clone()];
        sessions
            .expect_list_active()
            .withf(|sport, offset, limit| sport.is_none() && *offset == 0 && *limit == 20)
            .returning(move |_, _, _| Ok((listed.clone(), 2)));
        let mut roster = MockRosterRepository::new();
        let joined_id = joined.id();
        roster
            .expect_sessions_joined_by()
            .returning(move |_| Ok(vec![joined_id]));
        roster.expect_count_for().returning(|_| Ok(4));
        let service = SessionService::new(
            Arc::new(sessions),
            Arc::new(roster),
            Arc::new(MockSportRepository::new()),
            clock(),
        );

        let response = service
            .browse(BrowseRequest {
                user_id: UserId::random(),
                sport_id: None,
                page: PageRequest::first(),
            })
            .await
            .expect("browse succeeds");

        assert_eq!(response.page.total, 2);
        assert!(response.page.items[0].already_joined);
        assert!(!response.page.items[1].already_joined);
        assert_eq!(response.page.items[0].available_slots, 6);
    }

    #[rstest]
    #[tokio::test]
    async fn popularity_orders_by_session_count(sport_id: SportId) {
        let busy_sport = sport_id;
        let quiet_sport = SportId::random();
        let a = session_for(UserId::random(), busy_sport);
        let b = session_for(UserId::random(), busy_sport);
        let c = session_for(UserId::random(), quiet_sport);
        let shared_player = UserId::random();

        let mut sessions = MockSessionRepository::new();
        let listed = vec![c.clone(), a.clone(), b.clone()];
        sessions
            .expect_list_in_date_range()
            .returning(move |_, _| Ok(listed.clone()));
        let mut roster = MockRosterRepository::new();
        let memberships = vec![
            (a.id(), shared_player),
            (b.id(), shared_player),
            (b.id(), UserId::random()),
        ];
        roster
            .expect_members_for_sessions()
            .returning(move |_| Ok(memberships.clone()));
        let mut sports = MockSportRepository::new();
        sports.expect_list_all().returning(move || {
            Ok(vec![
                Sport::new(busy_sport, UserId::random(), "Football").expect("valid sport"),
                Sport::new(quiet_sport, UserId::random(), "Chess").expect("valid sport"),
            ])
        });
        let service = SessionService::new(
            Arc::new(sessions),
            Arc::new(roster),
            Arc::new(sports),
            clock(),
        );

        let response = service
            .sport_popularity(SportPopularityRequest {
                start: date(2026, 10, 1),
                end: date(2026, 10, 31),
            })
            .await
            .expect("popularity succeeds");

        assert_eq!(response.entries.len(), 2);
        assert_eq!(response.entries[0].sport_name, "Football");
        assert_eq!(response.entries[0].session_count, 2);
        assert_eq!(response.entries[0].distinct_player_count, 2);
        assert_eq!(response.entries[1].sport_name, "Chess");
        assert_eq!(response.entries[1].distinct_player_count, 0);
    }
}
