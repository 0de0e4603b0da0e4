use std::collections::HashMap;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};
use crate::core::build_queue;
use crate::models::{Match, Message, MessageSummary, Preferences, ProfileUpdate, UserProfile};

/// Capacity of each subscription channel
const SUBSCRIPTION_CAPACITY: usize = 64;

/// Default page size for backend discovery queries
pub const DISCOVERY_LIMIT: usize = 20;

/// Typed failure reasons of the persistence contract
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result of recording a like
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikeOutcome {
    #[serde(rename = "isMatch")]
    pub is_match: bool,
    #[serde(rename = "match")]
    pub new_match: Option<Match>,
}

/// Id of the like record for `liker -> liked`
pub fn like_key(liker_id: &str, liked_id: &str) -> String {
    format!("{}_{}", liker_id, liked_id)
}

/// Storage contract for profiles, likes, matches and messages
///
/// The live swipe path never calls this; it is the reciprocal-like design,
/// kept separate from the random heuristic in the resolver.
#[async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Short name reported by the health check
    fn name(&self) -> &'static str;

    async fn create_profile(&self, profile: UserProfile) -> Result<(), BackendError>;

    async fn get_profile(&self, user_id: &str) -> Result<UserProfile, BackendError>;

    async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<UserProfile, BackendError>;

    /// Profiles the viewer could be shown, filtered like the discovery queue
    async fn discovery_users(
        &self,
        viewer_id: &str,
        preferences: &Preferences,
        limit: usize,
    ) -> Result<Vec<UserProfile>, BackendError>;

    /// Store `liker -> liked`; creates a match once both directions exist
    async fn record_like(&self, liker_id: &str, liked_id: &str) -> Result<LikeOutcome, BackendError>;

    async fn user_matches(&self, user_id: &str) -> Result<Vec<Match>, BackendError>;

    async fn send_message(&self, match_id: &str, sender_id: &str, text: &str) -> Result<Message, BackendError>;

    /// Messages of a match ordered by send time
    async fn messages(&self, match_id: &str) -> Result<Vec<Message>, BackendError>;

    /// New messages of one match as they are written
    fn subscribe_messages(&self, match_id: &str) -> broadcast::Receiver<Message>;

    /// New matches involving one user as they are created
    fn subscribe_matches(&self, user_id: &str) -> broadcast::Receiver<Match>;
}

/// Fan-out of backend writes to in-process subscribers
#[derive(Debug, Default)]
pub struct Subscriptions {
    messages: std::sync::Mutex<HashMap<String, broadcast::Sender<Message>>>,
    matches: std::sync::Mutex<HashMap<String, broadcast::Sender<Match>>>,
}

impl Subscriptions {
    fn subscribe<T: Clone>(
        channels: &std::sync::Mutex<HashMap<String, broadcast::Sender<T>>>,
        key: &str,
    ) -> broadcast::Receiver<T> {
        let mut channels = channels.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !channels.contains_key(key) {
            // Drop channels whose subscribers have all gone away
            channels.retain(|_, sender| sender.receiver_count() > 0);
        }
        channels
            .entry(key.to_string())
            .or_insert_with(|| broadcast::channel(SUBSCRIPTION_CAPACITY).0)
            .subscribe()
    }

    fn publish<T: Clone>(
        channels: &std::sync::Mutex<HashMap<String, broadcast::Sender<T>>>,
        key: &str,
        value: T,
    ) {
        let mut channels = channels.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let Some(sender) = channels.get(key) else {
            return;
        };
        if sender.send(value).is_err() {
            channels.remove(key);
        }
    }

    pub fn messages(&self, match_id: &str) -> broadcast::Receiver<Message> {
        Self::subscribe(&self.messages, match_id)
    }

    pub fn matches(&self, user_id: &str) -> broadcast::Receiver<Match> {
        Self::subscribe(&self.matches, user_id)
    }

    pub fn publish_message(&self, message: &Message) {
        Self::publish(&self.messages, &message.match_id, message.clone());
    }

    pub fn publish_match(&self, new_match: &Match) {
        Self::publish(&self.matches, &new_match.participants.0, new_match.clone());
        Self::publish(&self.matches, &new_match.participants.1, new_match.clone());
    }
}

#[derive(Debug, Default)]
struct MemoryData {
    profiles: Vec<UserProfile>,
    likes: HashMap<String, chrono::DateTime<Utc>>,
    matches: Vec<Match>,
    messages: Vec<Message>,
}

/// In-process backend used when no database is configured
#[derive(Debug, Default)]
pub struct MemoryBackend {
    data: RwLock<MemoryData>,
    subscriptions: Subscriptions,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersistenceBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn create_profile(&self, profile: UserProfile) -> Result<(), BackendError> {
        let mut data = self.data.write().await;
        match data.profiles.iter_mut().find(|p| p.user_id == profile.user_id) {
            Some(existing) => *existing = profile,
            None => data.profiles.push(profile),
        }
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<UserProfile, BackendError> {
        let data = self.data.read().await;
        data.profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("user {}", user_id)))
    }

    async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<UserProfile, BackendError> {
        let mut data = self.data.write().await;
        let profile = data
            .profiles
            .iter_mut()
            .find(|p| p.user_id == user_id)
            .ok_or_else(|| BackendError::NotFound(format!("user {}", user_id)))?;
        profile.apply(update);
        Ok(profile.clone())
    }

    async fn discovery_users(
        &self,
        viewer_id: &str,
        preferences: &Preferences,
        limit: usize,
    ) -> Result<Vec<UserProfile>, BackendError> {
        let data = self.data.read().await;
        let decided = Default::default();
        Ok(build_queue(viewer_id, &data.profiles, preferences, &decided)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn record_like(&self, liker_id: &str, liked_id: &str) -> Result<LikeOutcome, BackendError> {
        if liker_id == liked_id {
            return Err(BackendError::InvalidInput("cannot like yourself".to_string()));
        }

        let now = Utc::now();
        let mut data = self.data.write().await;
        data.likes.insert(like_key(liker_id, liked_id), now);

        if !data.likes.contains_key(&like_key(liked_id, liker_id)) {
            return Ok(LikeOutcome { is_match: false, new_match: None });
        }

        if let Some(existing) = data.matches.iter().find(|m| m.joins(liker_id, liked_id)) {
            return Ok(LikeOutcome {
                is_match: true,
                new_match: Some(existing.clone()),
            });
        }

        let new_match = Match {
            id: like_key(liker_id, liked_id),
            participants: (liker_id.to_string(), liked_id.to_string()),
            created_at: now,
            last_message: None,
            unread: false,
        };
        data.matches.push(new_match.clone());
        drop(data);

        tracing::info!("Reciprocal like: match {} created", new_match.id);
        self.subscriptions.publish_match(&new_match);

        Ok(LikeOutcome {
            is_match: true,
            new_match: Some(new_match),
        })
    }

    async fn user_matches(&self, user_id: &str) -> Result<Vec<Match>, BackendError> {
        let data = self.data.read().await;
        Ok(data.matches.iter().filter(|m| m.involves(user_id)).cloned().collect())
    }

    async fn send_message(&self, match_id: &str, sender_id: &str, text: &str) -> Result<Message, BackendError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(BackendError::InvalidInput("message text is empty".to_string()));
        }

        let now = Utc::now();
        let mut data = self.data.write().await;
        let m = data
            .matches
            .iter_mut()
            .find(|m| m.id == match_id)
            .ok_or_else(|| BackendError::NotFound(format!("match {}", match_id)))?;
        if !m.involves(sender_id) {
            return Err(BackendError::InvalidInput(format!("{} is not part of match {}", sender_id, match_id)));
        }
        m.last_message = Some(MessageSummary {
            text: text.to_string(),
            sent_at: now,
        });
        m.unread = true;

        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            match_id: match_id.to_string(),
            sender_id: sender_id.to_string(),
            text: text.to_string(),
            sent_at: now,
            is_read: false,
        };
        data.messages.push(message.clone());
        drop(data);

        self.subscriptions.publish_message(&message);
        Ok(message)
    }

    async fn messages(&self, match_id: &str) -> Result<Vec<Message>, BackendError> {
        let data = self.data.read().await;
        let mut messages: Vec<Message> = data
            .messages
            .iter()
            .filter(|m| m.match_id == match_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.sent_at);
        Ok(messages)
    }

    fn subscribe_messages(&self, match_id: &str) -> broadcast::Receiver<Message> {
        self.subscriptions.messages(match_id)
    }

    fn subscribe_matches(&self, user_id: &str) -> broadcast::Receiver<Match> {
        self.subscriptions.matches(user_id)
    }
}
