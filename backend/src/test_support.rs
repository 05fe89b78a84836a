//! Test utilities for the backend crate.
//!
//! Shared helpers for both unit tests (in `src/`) and integration tests (in
//! `tests/`): a pinnable clock and an in-memory store implementing every
//! repository port with the same write-time semantics as the PostgreSQL
//! adapters, so lifecycle and concurrency scenarios run without a database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, Utc};
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{
    RosterRepository, RosterRepositoryError, SessionRepository, SessionRepositoryError,
    SportRepository, SportRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::sessions::{Session, SessionId, SessionStatus};
use crate::domain::{Sport, SportId, User, UserId};

/// A clock pinned to a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    /// Pin the clock to the given instant.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.now
    }
}

#[derive(Debug, Default)]
struct State {
    users: HashMap<Uuid, User>,
    sports: HashMap<Uuid, Sport>,
    sessions: HashMap<Uuid, Session>,
    // Insertion order stands in for `joined_at` ordering.
    roster: Vec<(SessionId, UserId)>,
}

/// Shared in-memory backing store for all four repository handles.
///
/// Every write takes the single mutex, so uniqueness and capacity checks are
/// atomic with the writes they guard, mirroring the database transactions.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|err| err.into_inner())
    }

    /// Session repository handle over this store.
    pub fn sessions(&self) -> InMemorySessionRepository {
        InMemorySessionRepository {
            store: self.clone(),
        }
    }

    /// Roster repository handle over this store.
    pub fn roster(&self) -> InMemoryRosterRepository {
        InMemoryRosterRepository {
            store: self.clone(),
        }
    }

    /// Sport repository handle over this store.
    pub fn sports(&self) -> InMemorySportRepository {
        InMemorySportRepository {
            store: self.clone(),
        }
    }

    /// User repository handle over this store.
    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository {
            store: self.clone(),
        }
    }

    /// Seed a user directly, bypassing the signup flow.
    pub fn seed_user(&self, user: User) {
        self.lock().users.insert(*user.id().as_uuid(), user);
    }

    /// Seed a sport directly, bypassing the catalogue flow.
    pub fn seed_sport(&self, sport: Sport) {
        self.lock().sports.insert(*sport.id().as_uuid(), sport);
    }

    /// Seed a session directly, bypassing the command flow.
    pub fn seed_session(&self, session: Session) {
        self.lock().sessions.insert(*session.id().as_uuid(), session);
    }

    /// Current roster pairs, in join order.
    pub fn roster_snapshot(&self) -> Vec<(SessionId, UserId)> {
        self.lock().roster.clone()
    }
}

fn by_schedule(a: &Session, b: &Session) -> std::cmp::Ordering {
    a.date()
        .cmp(&b.date())
        .then_with(|| a.time().cmp(&b.time()))
}

/// In-memory [`SessionRepository`].
#[derive(Debug, Clone)]
pub struct InMemorySessionRepository {
    store: InMemoryStore,
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn insert(&self, session: &Session) -> Result<(), SessionRepositoryError> {
        self.store
            .lock()
            .sessions
            .insert(*session.id().as_uuid(), session.clone());
        Ok(())
    }

    async fn update(&self, session: &Session) -> Result<(), SessionRepositoryError> {
        let mut state = self.store.lock();
        let Some(stored) = state.sessions.get(session.id().as_uuid()) else {
            return Err(SessionRepositoryError::missing(format!(
                "session {} not found",
                session.id()
            )));
        };
        if stored.status() == SessionStatus::Cancelled {
            return Err(SessionRepositoryError::already_cancelled(format!(
                "session {} is already cancelled",
                session.id()
            )));
        }
        state
            .sessions
            .insert(*session.id().as_uuid(), session.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        session_id: SessionId,
    ) -> Result<Option<Session>, SessionRepositoryError> {
        Ok(self.store.lock().sessions.get(session_id.as_uuid()).cloned())
    }

    async fn list_by_ids(
        &self,
        session_ids: &[SessionId],
    ) -> Result<Vec<Session>, SessionRepositoryError> {
        let state = self.store.lock();
        let mut found: Vec<Session> = session_ids
            .iter()
            .filter_map(|id| state.sessions.get(id.as_uuid()).cloned())
            .collect();
        found.sort_by(by_schedule);
        Ok(found)
    }

    async fn list_active(
        &self,
        sport_id: Option<SportId>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Session>, u64), SessionRepositoryError> {
        let state = self.store.lock();
        let mut matching: Vec<Session> = state
            .sessions
            .values()
            .filter(|s| s.is_active())
            .filter(|s| sport_id.map_or(true, |sport| s.sport_id() == sport))
            .cloned()
            .collect();
        matching.sort_by(by_schedule);
        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect();
        Ok((page, total))
    }

    async fn list_created_by(
        &self,
        creator_id: UserId,
    ) -> Result<Vec<Session>, SessionRepositoryError> {
        let state = self.store.lock();
        let mut created: Vec<Session> = state
            .sessions
            .values()
            .filter(|s| s.creator_id() == creator_id)
            .cloned()
            .collect();
        created.sort_by(by_schedule);
        Ok(created)
    }

    async fn list_candidates_for(
        &self,
        user_id: UserId,
        on_or_after: NaiveDate,
        limit: i64,
    ) -> Result<Vec<Session>, SessionRepositoryError> {
        let state = self.store.lock();
        let mut candidates: Vec<Session> = state
            .sessions
            .values()
            .filter(|s| s.is_active())
            .filter(|s| s.date() >= on_or_after)
            .filter(|s| s.creator_id() != user_id)
            .filter(|s| {
                !state
                    .roster
                    .iter()
                    .any(|(session, member)| *session == s.id() && *member == user_id)
            })
            .cloned()
            .collect();
        candidates.sort_by(by_schedule);
        candidates.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(candidates)
    }

    async fn list_in_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Session>, SessionRepositoryError> {
        let state = self.store.lock();
        let mut dated: Vec<Session> = state
            .sessions
            .values()
            .filter(|s| s.date() >= start && s.date() <= end)
            .cloned()
            .collect();
        dated.sort_by(by_schedule);
        Ok(dated)
    }
}

/// In-memory [`RosterRepository`].
#[derive(Debug, Clone)]
pub struct InMemoryRosterRepository {
    store: InMemoryStore,
}

#[async_trait]
impl RosterRepository for InMemoryRosterRepository {
    async fn add(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> Result<(), RosterRepositoryError> {
        // One lock spans the checks and the write, like the SQL transaction.
        let mut state = self.store.lock();
        let Some(session) = state.sessions.get(session_id.as_uuid()) else {
            return Err(RosterRepositoryError::session_missing(format!(
                "session {session_id} not found"
            )));
        };
        let capacity = usize::from(session.players_needed());

        if state
            .roster
            .iter()
            .any(|(session, member)| *session == session_id && *member == user_id)
        {
            return Err(RosterRepositoryError::duplicate_member(format!(
                "user {user_id} already joined session {session_id}"
            )));
        }
        let occupied = state
            .roster
            .iter()
            .filter(|(session, _)| *session == session_id)
            .count();
        if occupied >= capacity {
            return Err(RosterRepositoryError::capacity_exceeded(format!(
                "session {session_id} is at capacity {capacity}"
            )));
        }

        state.roster.push((session_id, user_id));
        Ok(())
    }

    async fn remove(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> Result<bool, RosterRepositoryError> {
        let mut state = self.store.lock();
        let before = state.roster.len();
        state
            .roster
            .retain(|(session, member)| !(*session == session_id && *member == user_id));
        Ok(state.roster.len() < before)
    }

    async fn count_for(&self, session_id: SessionId) -> Result<u64, RosterRepositoryError> {
        let state = self.store.lock();
        Ok(state
            .roster
            .iter()
            .filter(|(session, _)| *session == session_id)
            .count() as u64)
    }

    async fn contains(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> Result<bool, RosterRepositoryError> {
        let state = self.store.lock();
        Ok(state
            .roster
            .iter()
            .any(|(session, member)| *session == session_id && *member == user_id))
    }

    async fn list_members(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<UserId>, RosterRepositoryError> {
        let state = self.store.lock();
        Ok(state
            .roster
            .iter()
            .filter(|(session, _)| *session == session_id)
            .map(|(_, member)| *member)
            .collect())
    }

    async fn sessions_joined_by(
        &self,
        user_id: UserId,
    ) -> Result<Vec<SessionId>, RosterRepositoryError> {
        let state = self.store.lock();
        Ok(state
            .roster
            .iter()
            .filter(|(_, member)| *member == user_id)
            .map(|(session, _)| *session)
            .collect())
    }

    async fn members_for_sessions(
        &self,
        session_ids: &[SessionId],
    ) -> Result<Vec<(SessionId, UserId)>, RosterRepositoryError> {
        let state = self.store.lock();
        Ok(state
            .roster
            .iter()
            .filter(|(session, _)| session_ids.contains(session))
            .copied()
            .collect())
    }
}

/// In-memory [`SportRepository`].
#[derive(Debug, Clone)]
pub struct InMemorySportRepository {
    store: InMemoryStore,
}

fn name_taken(state: &State, owner_id: UserId, name: &str, except: SportId) -> bool {
    state.sports.values().any(|sport| {
        sport.id() != except
            && sport.owner_id() == owner_id
            && sport.name().eq_ignore_ascii_case(name)
    })
}

#[async_trait]
impl SportRepository for InMemorySportRepository {
    async fn insert(&self, sport: &Sport) -> Result<(), SportRepositoryError> {
        let mut state = self.store.lock();
        if name_taken(&state, sport.owner_id(), sport.name(), sport.id()) {
            return Err(SportRepositoryError::duplicate_name(sport.name().to_owned()));
        }
        state.sports.insert(*sport.id().as_uuid(), sport.clone());
        Ok(())
    }

    async fn rename(&self, sport: &Sport) -> Result<(), SportRepositoryError> {
        let mut state = self.store.lock();
        if !state.sports.contains_key(sport.id().as_uuid()) {
            return Err(SportRepositoryError::query(format!(
                "sport {} not found",
                sport.id()
            )));
        }
        if name_taken(&state, sport.owner_id(), sport.name(), sport.id()) {
            return Err(SportRepositoryError::duplicate_name(sport.name().to_owned()));
        }
        state.sports.insert(*sport.id().as_uuid(), sport.clone());
        Ok(())
    }

    async fn find_by_id(&self, sport_id: SportId) -> Result<Option<Sport>, SportRepositoryError> {
        Ok(self.store.lock().sports.get(sport_id.as_uuid()).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Sport>, SportRepositoryError> {
        let state = self.store.lock();
        let mut sports: Vec<Sport> = state.sports.values().cloned().collect();
        sports.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(sports)
    }
}

/// In-memory [`UserRepository`].
#[derive(Debug, Clone)]
pub struct InMemoryUserRepository {
    store: InMemoryStore,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut state = self.store.lock();
        if state.users.values().any(|u| u.email() == user.email()) {
            return Err(UserRepositoryError::duplicate_email(user.email().to_owned()));
        }
        state.users.insert(*user.id().as_uuid(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.store.lock().users.get(user_id.as_uuid()).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError> {
        Ok(self
            .store
            .lock()
            .users
            .values()
            .find(|u| u.email() == email)
            .cloned())
    }
}
