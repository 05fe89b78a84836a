//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//! When migrations change the schema, regenerate or update this file to match.

diesel::table! {
    /// Registered user accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Normalised (trimmed, lowercased) email; unique.
        email -> Varchar,
        /// Opaque credential hash produced by the web layer.
        password_hash -> Varchar,
        /// Human-readable display name (max 64 characters).
        display_name -> Varchar,
        /// Role fixed at signup: `admin` or `player`.
        role -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Admin-managed sport catalogue.
    sports (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Admin who created the sport.
        owner_id -> Uuid,
        /// Trimmed name; unique per owner (case-insensitive).
        name -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Scheduled sports sessions.
    sessions (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Referenced sport.
        sport_id -> Uuid,
        /// Creating user; never changes.
        creator_id -> Uuid,
        /// Calendar date of the gathering.
        session_date -> Date,
        /// Wall-clock start time.
        start_time -> Time,
        /// Free-text venue (max 200 characters).
        venue -> Varchar,
        /// Capacity the creator is looking for.
        players_needed -> SmallInt,
        /// Lifecycle state: `active`, `cancelled`, or `completed`.
        status -> Varchar,
        /// Present iff `status` is `cancelled`.
        cancellation_reason -> Nullable<Varchar>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Session rosters; one row per joined user.
    session_members (session_id, user_id) {
        /// Session being joined.
        session_id -> Uuid,
        /// Joining user.
        user_id -> Uuid,
        /// When the user joined.
        joined_at -> Timestamptz,
    }
}

diesel::joinable!(sessions -> sports (sport_id));
diesel::joinable!(session_members -> sessions (session_id));

diesel::allow_tables_to_appear_in_same_query!(users, sports, sessions, session_members);
