//! Session domain services.
//!
//! [`SessionService`] implements the session driving ports. Every mutation
//! follows the same two-phase contract: consult the pure eligibility engine
//! against the wall clock read at call time, then hand the write to a
//! repository that re-asserts the race-critical invariants itself.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use mockable::Clock;
use pagination::Page;

use crate::domain::ports::{
    BrowseItem, BrowseRequest, BrowseResponse, CancelSessionRequest, CancelSessionResponse,
    CreateSessionRequest, CreateSessionResponse, DashboardRequest, DashboardResponse,
    JoinSessionRequest, JoinSessionResponse, LeaveSessionRequest, LeaveSessionResponse,
    RosterRepository, RosterRepositoryError, SessionCommand, SessionPayload, SessionQuery,
    SessionRepository, SessionRepositoryError, SportPopularityEntry, SportPopularityRequest,
    SportPopularityResponse, SportRepository, SportRepositoryError, UpdateSessionRequest,
    UpdateSessionResponse,
};
use crate::domain::sessions::{
    JoinRefusal, LeaveRefusal, MutationRefusal, Session, SessionDraft, SessionId, SessionStatus,
    available_slots, check_cancel, check_edit, check_join, check_leave,
};
use crate::domain::{Error, SportId};

fn map_session_repository_error(error: SessionRepositoryError) -> Error {
    match error {
        SessionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("session repository unavailable: {message}"))
        }
        SessionRepositoryError::Query { message } => {
            Error::internal(format!("session repository error: {message}"))
        }
        SessionRepositoryError::Missing { message } => Error::not_found(message),
        SessionRepositoryError::AlreadyCancelled { .. } => {
            Error::invalid_state(MutationRefusal::AlreadyCancelled.to_string())
        }
    }
}

/// The write-time roster failures surface with the same user-facing text as
/// the corresponding pre-check refusal, so a lost race reads identically to
/// an up-front "session is full" or "already joined" outcome.
fn map_roster_repository_error(error: RosterRepositoryError) -> Error {
    match error {
        RosterRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("roster repository unavailable: {message}"))
        }
        RosterRepositoryError::Query { message } => {
            Error::internal(format!("roster repository error: {message}"))
        }
        RosterRepositoryError::SessionMissing { message } => Error::not_found(message),
        RosterRepositoryError::DuplicateMember { .. } => {
            Error::conflict(JoinRefusal::AlreadyJoined.to_string())
        }
        RosterRepositoryError::CapacityExceeded { .. } => {
            Error::conflict(JoinRefusal::SessionFull.to_string())
        }
    }
}

fn map_sport_repository_error(error: SportRepositoryError) -> Error {
    match error {
        SportRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("sport repository unavailable: {message}"))
        }
        SportRepositoryError::Query { message } => {
            Error::internal(format!("sport repository error: {message}"))
        }
        SportRepositoryError::DuplicateName { message } => Error::conflict(message),
    }
}

fn map_join_refusal(refusal: JoinRefusal) -> Error {
    Error::invalid_state(refusal.to_string())
}

fn map_mutation_refusal(refusal: MutationRefusal) -> Error {
    match refusal {
        MutationRefusal::NotOwner => Error::forbidden(refusal.to_string()),
        MutationRefusal::SessionPast | MutationRefusal::AlreadyCancelled => {
            Error::invalid_state(refusal.to_string())
        }
    }
}

/// Session service implementing the command and query driving ports.
#[derive(Clone)]
pub struct SessionService<S, R, P> {
    sessions: Arc<S>,
    roster: Arc<R>,
    sports: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<S, R, P> SessionService<S, R, P> {
    /// Create a new service over the session, roster, and sport repositories.
    pub fn new(sessions: Arc<S>, roster: Arc<R>, sports: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions,
            roster,
            sports,
            clock,
        }
    }

    /// Wall-clock now; the deployment is single-timezone so naive UTC is the
    /// comparison basis everywhere.
    fn now(&self) -> NaiveDateTime {
        self.clock.utc().naive_utc()
    }
}

impl<S, R, P> SessionService<S, R, P>
where
    S: SessionRepository,
    R: RosterRepository,
    P: SportRepository,
{
    async fn fetch_session(&self, session_id: SessionId) -> Result<Session, Error> {
        self.sessions
            .find_by_id(session_id)
            .await
            .map_err(map_session_repository_error)?
            .ok_or_else(|| Error::not_found(format!("session {session_id} not found")))
    }

    async fn require_sport(&self, sport_id: SportId) -> Result<(), Error> {
        self.sports
            .find_by_id(sport_id)
            .await
            .map_err(map_sport_repository_error)?
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("sport {sport_id} not found")))
    }

    async fn roster_size(&self, session_id: SessionId) -> Result<usize, Error> {
        let count = self
            .roster
            .count_for(session_id)
            .await
            .map_err(map_roster_repository_error)?;
        Ok(usize::try_from(count).unwrap_or(usize::MAX))
    }
}

#[async_trait]
impl<S, R, P> SessionCommand for SessionService<S, R, P>
where
    S: SessionRepository,
    R: RosterRepository,
    P: SportRepository,
{
    async fn create_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<CreateSessionResponse, Error> {
        self.require_sport(request.sport_id).await?;

        let now = self.now();
        if request.date.and_time(request.time) < now {
            return Err(Error::validation("date must be in the future"));
        }

        let session = Session::new(SessionDraft {
            id: SessionId::random(),
            sport_id: request.sport_id,
            creator_id: request.actor.id,
            date: request.date,
            time: request.time,
            venue: request.venue,
            players_needed: request.players_needed,
            status: SessionStatus::Active,
            cancellation_reason: None,
        })
        .map_err(|err| Error::validation(err.to_string()))?;

        self.sessions
            .insert(&session)
            .await
            .map_err(map_session_repository_error)?;

        Ok(CreateSessionResponse {
            session: SessionPayload::from(session),
        })
    }

    async fn update_session(
        &self,
        request: UpdateSessionRequest,
    ) -> Result<UpdateSessionResponse, Error> {
        let current = self.fetch_session(request.session_id).await?;

        let now = self.now();
        check_edit(&current, request.actor, now).map_err(map_mutation_refusal)?;
        if current.status() == SessionStatus::Cancelled {
            return Err(Error::invalid_state(
                MutationRefusal::AlreadyCancelled.to_string(),
            ));
        }

        self.require_sport(request.sport_id).await?;

        if request.date.and_time(request.time) < now {
            return Err(Error::validation("date must be in the future"));
        }

        let roster_size = self.roster_size(request.session_id).await?;
        if usize::from(request.players_needed) < roster_size {
            return Err(Error::validation(format!(
                "players needed cannot be set below the current roster size of {roster_size}"
            )));
        }

        let updated = Session::new(SessionDraft {
            id: current.id(),
            sport_id: request.sport_id,
            creator_id: current.creator_id(),
            date: request.date,
            time: request.time,
            venue: request.venue,
            players_needed: request.players_needed,
            status: current.status(),
            cancellation_reason: current.cancellation_reason().map(str::to_owned),
        })
        .map_err(|err| Error::validation(err.to_string()))?;

        self.sessions
            .update(&updated)
            .await
            .map_err(map_session_repository_error)?;

        Ok(UpdateSessionResponse {
            session: SessionPayload::from(updated),
        })
    }

    async fn cancel_session(
        &self,
        request: CancelSessionRequest,
    ) -> Result<CancelSessionResponse, Error> {
        let current = self.fetch_session(request.session_id).await?;

        check_cancel(&current, request.actor, self.now()).map_err(map_mutation_refusal)?;

        let cancelled = current
            .into_cancelled(request.reason)
            .map_err(|err| Error::validation(err.to_string()))?;

        // The repository guard on the stored status catches a concurrent
        // cancellation that landed after the pre-check above.
        self.sessions
            .update(&cancelled)
            .await
            .map_err(map_session_repository_error)?;

        Ok(CancelSessionResponse {
            session: SessionPayload::from(cancelled),
        })
    }

    async fn join_session(
        &self,
        request: JoinSessionRequest,
    ) -> Result<JoinSessionResponse, Error> {
        let session = self.fetch_session(request.session_id).await?;

        let roster_size = self.roster_size(request.session_id).await?;
        let already_joined = self
            .roster
            .contains(request.session_id, request.actor.id)
            .await
            .map_err(map_roster_repository_error)?;

        check_join(
            &session,
            roster_size,
            already_joined,
            request.actor.id,
            self.now(),
        )
        .map_err(map_join_refusal)?;

        self.roster
            .add(request.session_id, request.actor.id)
            .await
            .map_err(map_roster_repository_error)?;

        let remaining = available_slots(&session, roster_size.saturating_add(1));
        Ok(JoinSessionResponse {
            session_id: request.session_id,
            available_slots: u32::try_from(remaining).unwrap_or(u32::MAX),
        })
    }

    async fn leave_session(
        &self,
        request: LeaveSessionRequest,
    ) -> Result<LeaveSessionResponse, Error> {
        // Resolve the session first so a bogus id reports "not found" rather
        // than "not joined".
        let _ = self.fetch_session(request.session_id).await?;

        let is_member = self
            .roster
            .contains(request.session_id, request.actor.id)
            .await
            .map_err(map_roster_repository_error)?;
        check_leave(is_member).map_err(|refusal| Error::invalid_state(refusal.to_string()))?;

        let removed = self
            .roster
            .remove(request.session_id, request.actor.id)
            .await
            .map_err(map_roster_repository_error)?;
        if !removed {
            // A concurrent leave deleted the row between the check and the
            // write; surface it as the same "not joined" outcome.
            return Err(Error::invalid_state(LeaveRefusal::NotJoined.to_string()));
        }

        Ok(LeaveSessionResponse {
            session_id: request.session_id,
        })
    }
}

#[async_trait]
impl<S, R, P> SessionQuery for SessionService<S, R, P>
where
    S: SessionRepository,
    R: RosterRepository,
    P: SportRepository,
{
    async fn dashboard_for(&self, request: DashboardRequest) -> Result<DashboardResponse, Error> {
        let today = self.now().date();

        let created = self
            .sessions
            .list_created_by(request.user_id)
            .await
            .map_err(map_session_repository_error)?;

        let joined_ids = self
            .roster
            .sessions_joined_by(request.user_id)
            .await
            .map_err(map_roster_repository_error)?;
        let joined = self
            .sessions
            .list_by_ids(&joined_ids)
            .await
            .map_err(map_session_repository_error)?;

        let candidates = self
            .sessions
            .list_candidates_for(request.user_id, today, i64::from(request.candidate_limit))
            .await
            .map_err(map_session_repository_error)?;

        let (created_upcoming, created_past): (Vec<_>, Vec<_>) =
            created.into_iter().partition(|s| s.date() >= today);
        let (joined_upcoming, joined_past): (Vec<_>, Vec<_>) =
            joined.into_iter().partition(|s| s.date() >= today);

        let to_payloads =
            |sessions: Vec<Session>| sessions.into_iter().map(SessionPayload::from).collect();

        Ok(DashboardResponse {
            created_upcoming: to_payloads(created_upcoming),
            created_past: to_payloads(created_past),
            joined_upcoming: to_payloads(joined_upcoming),
            joined_past: to_payloads(joined_past),
            candidates: to_payloads(candidates),
        })
    }

    async fn browse(&self, request: BrowseRequest) -> Result<BrowseResponse, Error> {
        let (sessions, total) = self
            .sessions
            .list_active(request.sport_id, request.page.offset(), request.page.limit())
            .await
            .map_err(map_session_repository_error)?;

        let joined: HashSet<SessionId> = self
            .roster
            .sessions_joined_by(request.user_id)
            .await
            .map_err(map_roster_repository_error)?
            .into_iter()
            .collect();

        let mut items = Vec::with_capacity(sessions.len());
        for session in sessions {
            let roster_size = self.roster_size(session.id()).await?;
            let remaining = available_slots(&session, roster_size);
            items.push(BrowseItem {
                already_joined: joined.contains(&session.id()),
                available_slots: u32::try_from(remaining).unwrap_or(u32::MAX),
                session: SessionPayload::from(session),
            });
        }

        Ok(BrowseResponse {
            page: Page::new(items, request.page, total),
        })
    }

    async fn sport_popularity(
        &self,
        request: SportPopularityRequest,
    ) -> Result<SportPopularityResponse, Error> {
        let sessions = self
            .sessions
            .list_in_date_range(request.start, request.end)
            .await
            .map_err(map_session_repository_error)?;

        let session_ids: Vec<SessionId> = sessions.iter().map(Session::id).collect();
        let memberships = self
            .roster
            .members_for_sessions(&session_ids)
            .await
            .map_err(map_roster_repository_error)?;

        let mut players_by_session: HashMap<SessionId, Vec<_>> = HashMap::new();
        for (session_id, user_id) in memberships {
            players_by_session.entry(session_id).or_default().push(user_id);
        }

        let sport_names: HashMap<SportId, String> = self
            .sports
            .list_all()
            .await
            .map_err(map_sport_repository_error)?
            .into_iter()
            .map(|sport| (sport.id(), sport.name().to_owned()))
            .collect();

        // Group in first-seen order so the descending sort below stays stable
        // for equal session counts.
        let mut order: Vec<SportId> = Vec::new();
        let mut grouped: HashMap<SportId, (u64, HashSet<_>)> = HashMap::new();
        for session in &sessions {
            let entry = grouped.entry(session.sport_id()).or_insert_with(|| {
                order.push(session.sport_id());
                (0, HashSet::new())
            });
            entry.0 += 1;
            if let Some(players) = players_by_session.get(&session.id()) {
                entry.1.extend(players.iter().copied());
            }
        }

        let mut entries = Vec::with_capacity(order.len());
        for sport_id in order {
            let (session_count, players) = grouped.remove(&sport_id).unwrap_or_default();
            let sport_name = sport_names.get(&sport_id).cloned().ok_or_else(|| {
                Error::internal(format!("sport {sport_id} referenced by sessions is missing"))
            })?;
            entries.push(SportPopularityEntry {
                sport_id,
                sport_name,
                session_count,
                distinct_player_count: players.len() as u64,
            });
        }
        entries.sort_by(|a, b| b.session_count.cmp(&a.session_count));

        Ok(SportPopularityResponse { entries })
    }
}

#[cfg(test)]
#[path = "session_service_tests.rs"]
mod tests;
