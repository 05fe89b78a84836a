//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`) are implemented by persistence adapters;
//! driving ports ([`SessionCommand`], [`SessionQuery`], [`SportCatalog`],
//! [`Registration`]) are implemented by domain services and consumed by the
//! web layer.

mod macros;
pub(crate) use macros::define_port_error;

mod registration;
mod roster_repository;
mod session_command;
mod session_query;
mod session_repository;
mod sport_catalog;
mod sport_repository;
mod user_repository;

#[cfg(test)]
pub use registration::MockRegistration;
pub use registration::{RegisterUserRequest, RegisterUserResponse, Registration, UserPayload};
#[cfg(test)]
pub use roster_repository::MockRosterRepository;
pub use roster_repository::{FixtureRosterRepository, RosterRepository, RosterRepositoryError};
#[cfg(test)]
pub use session_command::MockSessionCommand;
pub use session_command::{
    CancelSessionRequest, CancelSessionResponse, CreateSessionRequest, CreateSessionResponse,
    JoinSessionRequest, JoinSessionResponse, LeaveSessionRequest, LeaveSessionResponse,
    SessionCommand, SessionPayload, UpdateSessionRequest, UpdateSessionResponse,
};
#[cfg(test)]
pub use session_query::MockSessionQuery;
pub use session_query::{
    BrowseItem, BrowseRequest, BrowseResponse, DashboardRequest, DashboardResponse, SessionQuery,
    SportPopularityEntry, SportPopularityRequest, SportPopularityResponse,
};
#[cfg(test)]
pub use session_repository::MockSessionRepository;
pub use session_repository::{
    FixtureSessionRepository, SessionRepository, SessionRepositoryError,
};
#[cfg(test)]
pub use sport_catalog::MockSportCatalog;
pub use sport_catalog::{
    CreateSportRequest, CreateSportResponse, ListSportsResponse, RenameSportRequest,
    RenameSportResponse, SportCatalog, SportPayload,
};
#[cfg(test)]
pub use sport_repository::MockSportRepository;
pub use sport_repository::{FixtureSportRepository, SportRepository, SportRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{FixtureUserRepository, UserRepository, UserRepositoryError};
