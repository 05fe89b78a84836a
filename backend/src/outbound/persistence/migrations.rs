//! Embedded SQL migrations.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

/// All migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while applying migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Could not connect to the database.
    #[error("failed to connect for migrations: {0}")]
    Connection(#[from] diesel::ConnectionError),

    /// A migration failed to apply.
    #[error("failed to apply migrations: {0}")]
    Apply(String),
}

/// Apply any pending migrations over a short-lived synchronous connection.
///
/// Runs once at startup, before the async pool is built.
pub fn run_pending_migrations(database_url: &str) -> Result<(), MigrationError> {
    let mut conn = PgConnection::establish(database_url)?;
    conn.run_pending_migrations(MIGRATIONS)
        .map(|_| ())
        .map_err(|err| MigrationError::Apply(err.to_string()))
}
