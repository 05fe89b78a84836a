//! User signup domain service.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{
    Registration, RegisterUserRequest, RegisterUserResponse, UserPayload, UserRepository,
    UserRepositoryError,
};
use crate::domain::{Error, User, UserDraft, UserId};

fn map_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateEmail { .. } => {
            Error::conflict("an account with this email already exists")
        }
    }
}

/// Signup service implementing the [`Registration`] driving port.
#[derive(Clone)]
pub struct RegistrationService<U> {
    users: Arc<U>,
}

impl<U> RegistrationService<U> {
    /// Create a new signup service over the user repository.
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl<U> Registration for RegistrationService<U>
where
    U: UserRepository,
{
    async fn register_user(
        &self,
        request: RegisterUserRequest,
    ) -> Result<RegisterUserResponse, Error> {
        let user = User::new(UserDraft {
            id: UserId::random(),
            email: request.email,
            password_hash: request.password_hash,
            display_name: request.display_name,
            role: request.role,
        })
        .map_err(|err| Error::validation(err.to_string()))?;

        // The unique index on the normalised email is the authority; a
        // concurrent signup with the same address loses here.
        self.users
            .insert(&user)
            .await
            .map_err(map_repository_error)?;

        Ok(RegisterUserResponse {
            user: UserPayload::from(user),
        })
    }
}

#[cfg(test)]
#[path = "registration_service_tests.rs"]
mod tests;
