//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports, backed by
//! PostgreSQL via `diesel-async` with `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repository implementations only translate between
//!   Diesel models and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are implementation details, never exposed to
//!   the domain layer.
//! - **Write-time invariants**: the roster adapter serialises joins on a row
//!   lock and the session adapter guards updates on the stored status, so
//!   capacity, uniqueness, and cancellation immutability hold under
//!   concurrency regardless of what the service layer pre-checked.
//! - **Strongly typed errors**: all database errors are mapped to the port
//!   error types.

mod diesel_error_mapping;
mod diesel_roster_repository;
mod diesel_session_repository;
mod diesel_sport_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_roster_repository::DieselRosterRepository;
pub use diesel_session_repository::DieselSessionRepository;
pub use diesel_sport_repository::DieselSportRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
