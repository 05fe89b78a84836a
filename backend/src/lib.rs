//! Kickabout backend library modules.
//!
//! The crate is organised hexagonally: `domain` holds the entities, ports,
//! and services; `outbound` holds the PostgreSQL adapters implementing the
//! driven ports. The web layer drives the `domain::ports` traits and is
//! deliberately outside this crate.

pub mod domain;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
