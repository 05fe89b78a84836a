//! Driving port for session dashboards, browsing, and analytics.
//!
//! Queries read session and roster state and never mutate it.

use async_trait::async_trait;
use chrono::NaiveDate;
use pagination::{Page, PageRequest};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, SportId, UserId};

use super::SessionPayload;

/// Request for a user's dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRequest {
    /// User the dashboard is for.
    pub user_id: UserId,
    /// Maximum number of joinable candidate sessions to include.
    pub candidate_limit: u32,
}

/// Dashboard buckets for one user.
///
/// Upcoming and past are split on the calendar date relative to today:
/// a session dated today counts as upcoming even if its time has passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    /// Sessions the user created, dated today or later.
    pub created_upcoming: Vec<SessionPayload>,
    /// Sessions the user created, dated before today.
    pub created_past: Vec<SessionPayload>,
    /// Sessions the user joined, dated today or later.
    pub joined_upcoming: Vec<SessionPayload>,
    /// Sessions the user joined, dated before today.
    pub joined_past: Vec<SessionPayload>,
    /// Active sessions the user could join, date then time ascending.
    pub candidates: Vec<SessionPayload>,
}

/// Request to browse active sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrowseRequest {
    /// Requesting user; drives the already-joined annotation.
    pub user_id: UserId,
    /// Optional sport filter.
    pub sport_id: Option<SportId>,
    /// Page to return.
    pub page: PageRequest,
}

/// One browsable session with the requesting user's annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrowseItem {
    /// The session.
    pub session: SessionPayload,
    /// Whether the requesting user has already joined it.
    pub already_joined: bool,
    /// Open capacity remaining.
    pub available_slots: u32,
}

/// Response from browsing active sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrowseResponse {
    /// The requested page, date then time ascending.
    pub page: Page<BrowseItem>,
}

/// Request for sport popularity aggregates over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SportPopularityRequest {
    /// First date included.
    pub start: NaiveDate,
    /// Last date included.
    pub end: NaiveDate,
}

/// Aggregates for one sport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SportPopularityEntry {
    /// The sport.
    pub sport_id: SportId,
    /// The sport's current name.
    pub sport_name: String,
    /// Number of sessions dated within the range.
    pub session_count: u64,
    /// Distinct players across those sessions.
    pub distinct_player_count: u64,
}

/// Response with per-sport aggregates, session count descending; ties keep
/// their first-seen order (stable sort).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SportPopularityResponse {
    /// Ordered aggregate entries.
    pub entries: Vec<SportPopularityEntry>,
}

/// Driving port for session read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionQuery: Send + Sync {
    /// Partition the user's created and joined sessions into upcoming and
    /// past buckets, plus joinable candidates.
    async fn dashboard_for(&self, request: DashboardRequest) -> Result<DashboardResponse, Error>;

    /// Page through active sessions, optionally filtered by sport.
    async fn browse(&self, request: BrowseRequest) -> Result<BrowseResponse, Error>;

    /// Aggregate session and distinct-player counts per sport over a range.
    async fn sport_popularity(
        &self,
        request: SportPopularityRequest,
    ) -> Result<SportPopularityResponse, Error>;
}

#[cfg(test)]
mod tests {
    use utoipa::PartialSchema;

    use super::*;

    #[test]
    fn payloads_expose_openapi_schemas() {
        let schema =
            serde_json::to_value(BrowseResponse::schema()).expect("schema serialises");
        assert!(schema.get("properties").is_some());

        let schema =
            serde_json::to_value(SportPopularityEntry::schema()).expect("schema serialises");
        let properties = schema
            .get("properties")
            .expect("entry schema is an object");
        assert!(properties.get("sportName").is_some());
    }
}
