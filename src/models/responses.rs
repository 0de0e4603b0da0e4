use serde::{Deserialize, Serialize};
use crate::models::domain::UserProfile;
use crate::services::CacheStats;

/// Response for the queue endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueResponse {
    pub candidates: Vec<UserProfile>,
    #[serde(rename = "totalRemaining")]
    pub total_remaining: usize,
}

/// Head of the viewer's queue; `candidate` is null once the queue is exhausted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextCandidateResponse {
    pub candidate: Option<UserProfile>,
    pub exhausted: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: String,
    pub cache: CacheStats,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeResponse {
    pub success: bool,
    #[serde(rename = "isMatch")]
    pub is_match: bool,
    #[serde(rename = "matchId")]
    pub match_id: Option<String>,
}
