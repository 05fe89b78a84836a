//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define strongly typed domain entities, the ports they are read
//! and written through, and the services that implement the driving ports.
//! Keep entities immutable after construction and document invariants and
//! serialisation contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode — stable error payload shared by every driving port.
//! - User, Actor, Role — caller identity and authorisation primitives.
//! - Sport — admin-managed catalogue entry that sessions reference by id.
//! - sessions — the session aggregate and its capacity/eligibility engine.
//! - ports — driven repository ports and driving operation ports.
//! - SessionService, SportCatalogService, RegistrationService — driving-port
//!   implementations wired over the repository ports.

pub mod error;
pub mod ports;
mod registration_service;
pub mod sessions;
mod session_service;
pub mod sport;
mod sport_service;
pub mod user;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::registration_service::RegistrationService;
pub use self::session_service::SessionService;
pub use self::sessions::{Session, SessionDraft, SessionId, SessionStatus, SessionValidationError};
pub use self::sport::{Sport, SportId, SportValidationError};
pub use self::sport_service::SportCatalogService;
pub use self::user::{Actor, Role, User, UserDraft, UserId, UserValidationError};

/// Convenient result alias for driving-port operations.
pub type ApiResult<T> = Result<T, Error>;
