//! User data model and caller identity.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Capability level a user holds. Admins implicitly hold every player
/// capability; the role is fixed at signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May manage sports in addition to everything a player can do.
    Admin,
    /// May create, join, and leave sessions.
    Player,
}

impl Role {
    /// Stable string form used by the persistence layer.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Player => "player",
        }
    }

    /// Parse the persisted string form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "player" => Some(Self::Player),
            _ => None,
        }
    }
}

/// Authenticated caller identity supplied by the web layer.
///
/// Every mutating operation takes an [`Actor`]; ownership checks reduce to
/// [`Actor::is_admin`] and [`Actor::is_owner_or_admin`] rather than being
/// re-derived per endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    /// The caller's user id.
    pub id: UserId,
    /// The caller's role.
    pub role: Role,
}

impl Actor {
    /// Build an actor identity.
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Whether the caller holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether the caller owns the given resource or is an admin.
    pub fn is_owner_or_admin(&self, owner: UserId) -> bool {
        self.id == owner || self.is_admin()
    }
}

/// Validation errors returned by [`User::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// The email address was empty.
    EmptyEmail,
    /// The email address did not look like `local@domain`.
    InvalidEmail,
    /// The display name was empty after trimming.
    EmptyDisplayName,
    /// The display name exceeded the maximum length.
    DisplayNameTooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },
    /// The credential hash was empty; hashing happens upstream but the core
    /// never stores a user without one.
    EmptyPasswordHash,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmptyDisplayName => write!(f, "display name must not be empty"),
            Self::DisplayNameTooLong { max } => {
                write!(f, "display name must be at most {max} characters")
            }
            Self::EmptyPasswordHash => write!(f, "credential hash must not be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Maximum display name length in characters.
pub const MAX_DISPLAY_NAME_LEN: usize = 64;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|err| panic!("email pattern must compile: {err}"))
    })
}

/// Input payload for [`User::new`].
#[derive(Debug, Clone)]
pub struct UserDraft {
    /// Identifier for the new user.
    pub id: UserId,
    /// Unique email address.
    pub email: String,
    /// Credential hash produced by the web layer.
    pub password_hash: String,
    /// Human-readable display name.
    pub display_name: String,
    /// Role fixed at signup.
    pub role: Role,
}

/// A registered user.
///
/// Fields are immutable after construction; the role in particular has no
/// promotion or demotion flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: String,
    password_hash: String,
    display_name: String,
    role: Role,
}

impl User {
    /// Creates a validated user.
    pub fn new(draft: UserDraft) -> Result<Self, UserValidationError> {
        Self::try_from(draft)
    }

    /// Returns the user id.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the unique email address.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Returns the opaque credential hash.
    pub fn password_hash(&self) -> &str {
        self.password_hash.as_str()
    }

    /// Returns the display name.
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the role fixed at signup.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Caller identity for this user.
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }
}

impl TryFrom<UserDraft> for User {
    type Error = UserValidationError;

    fn try_from(value: UserDraft) -> Result<Self, Self::Error> {
        let email = value.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !email_pattern().is_match(&email) {
            return Err(UserValidationError::InvalidEmail);
        }

        let display_name = value.display_name.trim().to_owned();
        if display_name.is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if display_name.chars().count() > MAX_DISPLAY_NAME_LEN {
            return Err(UserValidationError::DisplayNameTooLong {
                max: MAX_DISPLAY_NAME_LEN,
            });
        }

        if value.password_hash.is_empty() {
            return Err(UserValidationError::EmptyPasswordHash);
        }

        Ok(Self {
            id: value.id,
            email,
            password_hash: value.password_hash,
            display_name,
            role: value.role,
        })
    }
}
