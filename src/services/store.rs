use std::collections::{HashMap, HashSet};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use crate::core::{build_queue, DecisionResolver, DiscoveryState, Resolution, ResolveError, SessionError};
use crate::models::{
    seed, Match, Message, MessageSummary, Notification, NotificationKind, Preferences,
    PreferencesUpdate, ProfileUpdate, SwipeDecision, UserProfile, Verdict,
};
use crate::services::notifications::NotificationQueue;

/// Errors that can occur when applying a command
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Match not found: {0}")]
    MatchNotFound(String),

    #[error("Notification not found: {0}")]
    NotificationNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Every state change the store accepts
#[derive(Debug, Clone)]
pub enum Command {
    Like { viewer_id: String, candidate_id: String },
    Pass { viewer_id: String, candidate_id: String },
    ResetDiscovery { viewer_id: String },
    UpdatePreferences { viewer_id: String, update: PreferencesUpdate },
    UpdateProfile { user_id: String, update: ProfileUpdate },
    SendMessage { match_id: String, sender_id: String, text: String },
    MarkRead { match_id: String, reader_id: String },
    AddNotification { recipient_id: String, kind: NotificationKind, message: String },
    RemoveNotification { id: String },
}

/// What a command changed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Outcome {
    Decision {
        #[serde(rename = "candidateId")]
        candidate_id: String,
        verdict: Verdict,
        #[serde(rename = "matchCreated")]
        match_created: bool,
        resolution: Resolution,
        remaining: usize,
    },
    Reset {
        remaining: usize,
    },
    Preferences(Preferences),
    Profile(UserProfile),
    Message(Message),
    MarkedRead {
        #[serde(rename = "matchId")]
        match_id: String,
        #[serde(rename = "messagesMarked")]
        messages_marked: usize,
    },
    Notification(Notification),
    NotificationRemoved {
        id: String,
    },
}

/// The single owner of discovery, match, chat and notification state
///
/// Engine components only read from here or return deltas; every mutation
/// goes through [`AppStore::apply`].
#[derive(Debug)]
pub struct AppStore {
    profiles: Vec<UserProfile>,
    profile_index: HashMap<String, usize>,
    preferences: HashMap<String, Preferences>,
    default_preferences: Preferences,
    sessions: HashMap<String, DiscoveryState>,
    matches: Vec<Match>,
    messages: Vec<Message>,
    notifications: NotificationQueue,
    resolver: DecisionResolver,
}

impl AppStore {
    pub fn new(resolver: DecisionResolver, default_preferences: Preferences) -> Self {
        Self {
            profiles: Vec::new(),
            profile_index: HashMap::new(),
            preferences: HashMap::new(),
            default_preferences,
            sessions: HashMap::new(),
            matches: Vec::new(),
            messages: Vec::new(),
            notifications: NotificationQueue::new(),
            resolver,
        }
    }

    /// Store preloaded with the demo profiles, matches and messages
    pub fn seeded(resolver: DecisionResolver, default_preferences: Preferences) -> Self {
        let mut store = Self::new(resolver, default_preferences);
        for profile in seed::demo_profiles() {
            store.insert_profile(profile);
        }
        store.matches = seed::demo_matches();
        store.messages = seed::demo_messages();
        store
    }

    /// Add a profile to the pool, or replace the one with the same id in place
    pub fn insert_profile(&mut self, profile: UserProfile) {
        match self.profile_index.get(&profile.user_id) {
            Some(&index) => self.profiles[index] = profile,
            None => {
                self.profile_index.insert(profile.user_id.clone(), self.profiles.len());
                self.profiles.push(profile);
            }
        }
    }

    pub fn profile(&self, user_id: &str) -> Option<&UserProfile> {
        self.profile_index.get(user_id).map(|&index| &self.profiles[index])
    }

    pub fn profiles(&self) -> &[UserProfile] {
        &self.profiles
    }

    pub fn preferences(&self, viewer_id: &str) -> &Preferences {
        self.preferences.get(viewer_id).unwrap_or(&self.default_preferences)
    }

    /// The viewer's discovery state, if they have started a session
    pub fn session(&self, viewer_id: &str) -> Option<&DiscoveryState> {
        self.sessions.get(viewer_id)
    }

    /// Eligible candidates for the viewer, in pool order
    pub fn queue(&self, viewer_id: &str, limit: Option<usize>) -> Vec<UserProfile> {
        let decided = self
            .sessions
            .get(viewer_id)
            .map(DiscoveryState::decided_ids)
            .unwrap_or_default();
        let queue = build_queue(viewer_id, &self.profiles, self.preferences(viewer_id), &decided);

        match limit {
            Some(limit) => queue.take(limit).cloned().collect(),
            None => queue.cloned().collect(),
        }
    }

    /// Head of the viewer's queue; `None` means there is nobody left to show
    pub fn current_candidate(&self, viewer_id: &str) -> Option<UserProfile> {
        match self.sessions.get(viewer_id) {
            Some(state) => state.current().and_then(|id| self.profile(id)).cloned(),
            None => self.queue(viewer_id, Some(1)).into_iter().next(),
        }
    }

    pub fn matches_for(&self, user_id: &str) -> Vec<Match> {
        self.matches.iter().filter(|m| m.involves(user_id)).cloned().collect()
    }

    /// Chat history of a match, oldest first
    pub fn messages_for(&self, match_id: &str) -> Result<Vec<Message>, StoreError> {
        if !self.matches.iter().any(|m| m.id == match_id) {
            return Err(StoreError::MatchNotFound(match_id.to_string()));
        }

        let mut messages: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| m.match_id == match_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.sent_at);
        Ok(messages)
    }

    pub fn notifications_for(&self, user_id: &str, now: DateTime<Utc>) -> Vec<Notification> {
        self.notifications.for_recipient(user_id, now).cloned().collect()
    }

    /// Drop notifications past their display window
    pub fn purge_notifications(&mut self, now: DateTime<Utc>) -> usize {
        self.notifications.purge_expired(now)
    }

    /// Apply one command at time `now`
    ///
    /// A failed command leaves the store untouched.
    pub fn apply(&mut self, command: Command, now: DateTime<Utc>) -> Result<Outcome, StoreError> {
        match command {
            Command::Like { viewer_id, candidate_id } => {
                self.decide(viewer_id, candidate_id, Verdict::Like, now)
            }
            Command::Pass { viewer_id, candidate_id } => {
                self.decide(viewer_id, candidate_id, Verdict::Pass, now)
            }
            Command::ResetDiscovery { viewer_id } => {
                let session = self.sessions.entry(viewer_id.clone()).or_default();
                session.reset();
                self.reload_session(&viewer_id);
                let remaining = self.sessions.get(&viewer_id).map_or(0, DiscoveryState::remaining);
                tracing::info!("Reset discovery for {} ({} candidates)", viewer_id, remaining);
                Ok(Outcome::Reset { remaining })
            }
            Command::UpdatePreferences { viewer_id, update } => {
                let mut preferences = self.preferences(&viewer_id).clone();
                preferences.apply(update);
                if !preferences.is_valid() {
                    return Err(StoreError::InvalidInput(format!(
                        "age range {}-{} is not ascending",
                        preferences.min_age(),
                        preferences.max_age()
                    )));
                }

                self.preferences.insert(viewer_id.clone(), preferences.clone());
                if self.sessions.contains_key(&viewer_id) {
                    self.reload_session(&viewer_id);
                }
                tracing::debug!("Updated preferences for {}: {:?}", viewer_id, preferences);
                Ok(Outcome::Preferences(preferences))
            }
            Command::UpdateProfile { user_id, update } => {
                let index = *self
                    .profile_index
                    .get(&user_id)
                    .ok_or_else(|| StoreError::ProfileNotFound(user_id.clone()))?;
                self.profiles[index].apply(update);

                // Age or gender may have changed, so loaded queues can be stale
                let viewers: Vec<String> = self.sessions.keys().cloned().collect();
                for viewer_id in viewers {
                    self.reload_session(&viewer_id);
                }
                Ok(Outcome::Profile(self.profiles[index].clone()))
            }
            Command::SendMessage { match_id, sender_id, text } => {
                self.send_message(match_id, sender_id, text, now)
            }
            Command::MarkRead { match_id, reader_id } => {
                let m = self
                    .matches
                    .iter_mut()
                    .find(|m| m.id == match_id)
                    .ok_or_else(|| StoreError::MatchNotFound(match_id.clone()))?;
                m.unread = false;

                let mut messages_marked = 0;
                for message in self
                    .messages
                    .iter_mut()
                    .filter(|msg| msg.match_id == match_id && msg.sender_id != reader_id && !msg.is_read)
                {
                    message.is_read = true;
                    messages_marked += 1;
                }
                Ok(Outcome::MarkedRead { match_id, messages_marked })
            }
            Command::AddNotification { recipient_id, kind, message } => {
                let notification = Notification::new(recipient_id, kind, message, now);
                self.notifications.push(notification.clone());
                Ok(Outcome::Notification(notification))
            }
            Command::RemoveNotification { id } => {
                self.notifications
                    .remove(&id)
                    .ok_or_else(|| StoreError::NotificationNotFound(id.clone()))?;
                Ok(Outcome::NotificationRemoved { id })
            }
        }
    }

    fn decide(
        &mut self,
        viewer_id: String,
        candidate_id: String,
        verdict: Verdict,
        now: DateTime<Utc>,
    ) -> Result<Outcome, StoreError> {
        if viewer_id == candidate_id {
            return Err(StoreError::InvalidInput("cannot decide on your own profile".to_string()));
        }
        if self.sessions.get(&viewer_id).is_some_and(|s| s.is_decided(&candidate_id)) {
            return Err(SessionError::AlreadyDecided(candidate_id).into());
        }

        let decision = SwipeDecision {
            viewer_id,
            candidate_id,
            verdict,
            timestamp: now,
        };
        let resolution = self
            .resolver
            .resolve(&decision, self.profile(&decision.candidate_id))?;

        let session = self.session_mut(&decision.viewer_id);
        session.record(verdict, &decision.candidate_id)?;
        session.advance();
        let remaining = session.remaining();

        if let Resolution::Matched { new_match, notification } = &resolution {
            tracing::info!(
                "Match {} created: {} <-> {}",
                new_match.id,
                decision.viewer_id,
                decision.candidate_id
            );
            self.matches.push(new_match.clone());
            self.notifications.push(notification.clone());
        } else {
            tracing::debug!(
                "Recorded {:?}: {} -> {}",
                verdict,
                decision.viewer_id,
                decision.candidate_id
            );
        }

        Ok(Outcome::Decision {
            candidate_id: decision.candidate_id,
            verdict,
            match_created: resolution.match_created(),
            resolution,
            remaining,
        })
    }

    fn send_message(
        &mut self,
        match_id: String,
        sender_id: String,
        text: String,
        now: DateTime<Utc>,
    ) -> Result<Outcome, StoreError> {
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(StoreError::InvalidInput("message text is empty".to_string()));
        }

        let m = self
            .matches
            .iter_mut()
            .find(|m| m.id == match_id)
            .ok_or_else(|| StoreError::MatchNotFound(match_id.clone()))?;
        let recipient_id = m
            .other(&sender_id)
            .map(str::to_string)
            .ok_or_else(|| StoreError::InvalidInput(format!("{} is not part of match {}", sender_id, match_id)))?;

        m.last_message = Some(MessageSummary {
            text: text.clone(),
            sent_at: now,
        });
        m.unread = true;

        let message = Message {
            id: format!("msg-{}", uuid::Uuid::new_v4()),
            match_id,
            sender_id,
            text,
            sent_at: now,
            is_read: false,
        };
        self.messages.push(message.clone());

        let sender_name = self
            .profile(&message.sender_id)
            .map_or(message.sender_id.as_str(), |p| p.name.as_str());
        let notification = Notification::new(
            recipient_id,
            NotificationKind::Message,
            format!("New message from {}", sender_name),
            now,
        );
        self.notifications.push(notification);

        Ok(Outcome::Message(message))
    }

    fn session_mut(&mut self, viewer_id: &str) -> &mut DiscoveryState {
        if !self.sessions.contains_key(viewer_id) {
            self.reload_session(viewer_id);
        }
        self.sessions.entry(viewer_id.to_string()).or_default()
    }

    /// Rebuild the viewer's loaded queue from the current decided set
    fn reload_session(&mut self, viewer_id: &str) {
        let Self {
            sessions,
            profiles,
            preferences,
            default_preferences,
            ..
        } = self;
        let viewer_preferences = preferences.get(viewer_id).unwrap_or(&*default_preferences);
        let session = sessions.entry(viewer_id.to_string()).or_default();
        let decided: HashSet<String> = session.decided_ids();
        session.load(build_queue(viewer_id, profiles, viewer_preferences, &decided));
    }
}
