// Model exports
pub mod domain;
pub mod requests;
pub mod responses;
pub mod seed;

pub use domain::{
    GenderFilter, Match, Message, MessageSummary, Notification, NotificationKind, Preferences,
    PreferencesUpdate, ProfileUpdate, SwipeDecision, UserProfile, Verdict,
    NOTIFICATION_DISPLAY_SECS,
};
pub use requests::{
    BackendMessageRequest, DecisionRequest, LikeRequest, MatchQuery, NotificationRequest,
    ResetRequest, SendMessageRequest, UpdatePreferencesRequest, ViewerQuery,
};
pub use responses::{ErrorResponse, HealthResponse, LikeResponse, NextCandidateResponse, QueueResponse};
