//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{session_members, sessions, sports, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub role: String,
    #[expect(dead_code, reason = "schema field read for completeness")]
    pub created_at: DateTime<Utc>,
    #[expect(dead_code, reason = "schema field read for completeness")]
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub display_name: &'a str,
    pub role: &'a str,
}

/// Row struct for reading from the sports table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SportRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    #[expect(dead_code, reason = "schema field read for completeness")]
    pub created_at: DateTime<Utc>,
    #[expect(dead_code, reason = "schema field read for completeness")]
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new sport records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sports)]
pub(crate) struct NewSportRow<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: &'a str,
}

/// Row struct for reading from the sessions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SessionRow {
    pub id: Uuid,
    pub sport_id: Uuid,
    pub creator_id: Uuid,
    pub session_date: NaiveDate,
    pub start_time: NaiveTime,
    pub venue: String,
    pub players_needed: i16,
    pub status: String,
    pub cancellation_reason: Option<String>,
    #[expect(dead_code, reason = "schema field read for completeness")]
    pub created_at: DateTime<Utc>,
    #[expect(dead_code, reason = "schema field read for completeness")]
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new session records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sessions)]
pub(crate) struct NewSessionRow<'a> {
    pub id: Uuid,
    pub sport_id: Uuid,
    pub creator_id: Uuid,
    pub session_date: NaiveDate,
    pub start_time: NaiveTime,
    pub venue: &'a str,
    pub players_needed: i16,
    pub status: &'a str,
    pub cancellation_reason: Option<&'a str>,
}

/// Changeset struct for replacing a session's stored fields.
///
/// `treat_none_as_null` makes a `None` reason clear the column rather than
/// skip it, so an update can never leave a stale reason behind.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = sessions)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct SessionUpdate<'a> {
    pub sport_id: Uuid,
    pub session_date: NaiveDate,
    pub start_time: NaiveTime,
    pub venue: &'a str,
    pub players_needed: i16,
    pub status: &'a str,
    pub cancellation_reason: Option<&'a str>,
}

/// Insertable struct for adding a roster member.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = session_members)]
pub(crate) struct NewSessionMemberRow {
    pub session_id: Uuid,
    pub user_id: Uuid,
}
