//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Signup races resolve at the unique index on the normalised email; this
//! adapter translates its violation into the port's duplicate error.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::user::{Role, User, UserDraft, UserId};

use super::diesel_error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> UserRepositoryError {
    map_pool_error(error, UserRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> UserRepositoryError {
    map_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

/// Convert a database row into a validated domain user.
fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let role = Role::parse(&row.role)
        .ok_or_else(|| UserRepositoryError::query(format!("unknown role: {}", row.role)))?;

    User::new(UserDraft {
        id: UserId::from_uuid(row.id),
        email: row.email,
        password_hash: row.password_hash,
        display_name: row.display_name,
        role,
    })
    .map_err(|err| UserRepositoryError::query(err.to_string()))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        diesel::insert_into(users::table)
            .values(NewUserRow {
                id: *user.id().as_uuid(),
                email: user.email(),
                password_hash: user.password_hash(),
                display_name: user.display_name(),
                role: user.role().as_str(),
            })
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if is_unique_violation(&err) {
                    UserRepositoryError::duplicate_email(user.email().to_owned())
                } else {
                    map_diesel(err)
                }
            })
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = users::table
            .find(user_id.as_uuid())
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_user).transpose()
    }
}
