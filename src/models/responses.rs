use serde::{Deserialize, Serialize};
use crate::models::domain::{BadgeStatus, MatchView, Profile};

/// Response for the feed endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    pub profiles: Vec<Profile>,
    pub count: usize,
}

/// Response for the matches endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchesResponse {
    pub matches: Vec<MatchView>,
    pub count: usize,
}

/// Response for the badges endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgesResponse {
    #[serde(rename = "matchCount")]
    pub match_count: usize,
    pub badges: Vec<BadgeStatus>,
}

/// Response after toggling a badge's profile display flag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleBadgeResponse {
    #[serde(rename = "badgeId")]
    pub badge_id: String,
    #[serde(rename = "displayOnProfile")]
    pub display_on_profile: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
