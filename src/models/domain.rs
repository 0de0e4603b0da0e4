use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How long a notification stays visible before the sweeper drops it
pub const NOTIFICATION_DISPLAY_SECS: i64 = 5;

/// User profile as supplied by the profile store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    pub age: u8,
    pub gender: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub interests: BTreeSet<String>,
    #[serde(rename = "isVerified", default)]
    pub is_verified: bool,
    #[serde(rename = "lastActive", default)]
    pub last_active: Option<String>,
}

impl UserProfile {
    /// First photo, used as the thumbnail in match lists
    pub fn primary_photo(&self) -> Option<&str> {
        self.photos.first().map(String::as_str)
    }

    /// Merge a partial update into this profile
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(age) = update.age {
            self.age = age;
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(bio) = update.bio {
            self.bio = bio;
        }
        if let Some(photos) = update.photos {
            self.photos = photos;
        }
        if let Some(interests) = update.interests {
            self.interests = interests;
        }
        if let Some(last_active) = update.last_active {
            self.last_active = Some(last_active);
        }
    }
}

/// Partial profile update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub photos: Option<Vec<String>>,
    #[serde(default)]
    pub interests: Option<BTreeSet<String>>,
    #[serde(rename = "lastActive", default)]
    pub last_active: Option<String>,
}

/// Which genders a viewer wants to see
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenderFilter {
    #[default]
    All,
    Only(String),
}

impl GenderFilter {
    pub fn accepts(&self, gender: &str) -> bool {
        match self {
            GenderFilter::All => true,
            GenderFilter::Only(wanted) => wanted.eq_ignore_ascii_case(gender),
        }
    }
}

// "all" on the wire, any other string is a specific gender
impl Serialize for GenderFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GenderFilter::All => serializer.serialize_str("all"),
            GenderFilter::Only(value) => serializer.serialize_str(value),
        }
    }
}

impl<'de> Deserialize<'de> for GenderFilter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(if raw.eq_ignore_ascii_case("all") {
            GenderFilter::All
        } else {
            GenderFilter::Only(raw)
        })
    }
}

/// Per-viewer discovery filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(rename = "ageRange")]
    pub age_range: (u8, u8),
    #[serde(rename = "maxDistance")]
    pub max_distance: u16,
    #[serde(rename = "interestedIn", default)]
    pub interested_in: GenderFilter,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            age_range: (18, 35),
            max_distance: 50,
            interested_in: GenderFilter::All,
        }
    }
}

impl Preferences {
    pub fn min_age(&self) -> u8 {
        self.age_range.0
    }

    pub fn max_age(&self) -> u8 {
        self.age_range.1
    }

    /// Age range is an ascending pair
    pub fn is_valid(&self) -> bool {
        self.age_range.0 <= self.age_range.1
    }

    pub fn apply(&mut self, update: PreferencesUpdate) {
        if let Some(age_range) = update.age_range {
            self.age_range = age_range;
        }
        if let Some(max_distance) = update.max_distance {
            self.max_distance = max_distance;
        }
        if let Some(interested_in) = update.interested_in {
            self.interested_in = interested_in;
        }
    }
}

/// Partial preferences update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreferencesUpdate {
    #[serde(rename = "ageRange", default)]
    pub age_range: Option<(u8, u8)>,
    #[serde(rename = "maxDistance", default)]
    pub max_distance: Option<u16>,
    #[serde(rename = "interestedIn", default)]
    pub interested_in: Option<GenderFilter>,
}

/// Outcome of a single swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Like,
    Pass,
}

/// One swipe, consumed synchronously by the resolver
#[derive(Debug, Clone)]
pub struct SwipeDecision {
    pub viewer_id: String,
    pub candidate_id: String,
    pub verdict: Verdict,
    pub timestamp: DateTime<Utc>,
}

impl SwipeDecision {
    pub fn new(viewer_id: impl Into<String>, candidate_id: impl Into<String>, verdict: Verdict) -> Self {
        Self {
            viewer_id: viewer_id.into(),
            candidate_id: candidate_id.into(),
            verdict,
            timestamp: Utc::now(),
        }
    }
}

/// Last message shown in the match list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSummary {
    pub text: String,
    #[serde(rename = "sentAt")]
    pub sent_at: DateTime<Utc>,
}

/// Mutual-like relationship between two users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub participants: (String, String),
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "lastMessage")]
    pub last_message: Option<MessageSummary>,
    pub unread: bool,
}

impl Match {
    pub fn involves(&self, user_id: &str) -> bool {
        self.participants.0 == user_id || self.participants.1 == user_id
    }

    /// The participant that is not `user_id`
    pub fn other(&self, user_id: &str) -> Option<&str> {
        if self.participants.0 == user_id {
            Some(&self.participants.1)
        } else if self.participants.1 == user_id {
            Some(&self.participants.0)
        } else {
            None
        }
    }

    /// True when the match joins exactly `a` and `b`, in either order
    pub fn joins(&self, a: &str, b: &str) -> bool {
        (self.participants.0 == a && self.participants.1 == b)
            || (self.participants.0 == b && self.participants.1 == a)
    }
}

/// Chat message within a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(rename = "matchId")]
    pub match_id: String,
    #[serde(rename = "senderId")]
    pub sender_id: String,
    pub text: String,
    #[serde(rename = "sentAt")]
    pub sent_at: DateTime<Utc>,
    #[serde(rename = "isRead")]
    pub is_read: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Match,
    Message,
    Success,
    Generic,
}

/// Transient toast shown to one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "recipientId")]
    pub recipient_id: String,
    pub kind: NotificationKind,
    pub message: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        recipient_id: impl Into<String>,
        kind: NotificationKind,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            recipient_id: recipient_id.into(),
            kind,
            message: message.into(),
            created_at: now,
            expires_at: now + Duration::seconds(NOTIFICATION_DISPLAY_SECS),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_filter_wire_format() {
        let all: GenderFilter = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(all, GenderFilter::All);

        let only: GenderFilter = serde_json::from_str("\"Female\"").unwrap();
        assert_eq!(only, GenderFilter::Only("Female".to_string()));
        assert!(only.accepts("female"));
        assert!(!only.accepts("Male"));

        assert_eq!(serde_json::to_string(&GenderFilter::All).unwrap(), "\"all\"");
    }

    #[test]
    fn test_preferences_partial_update() {
        let mut prefs = Preferences::default();
        prefs.apply(PreferencesUpdate {
            age_range: Some((25, 40)),
            ..Default::default()
        });

        assert_eq!(prefs.age_range, (25, 40));
        assert_eq!(prefs.max_distance, 50);
        assert_eq!(prefs.interested_in, GenderFilter::All);
    }

    #[test]
    fn test_notification_expiry_window() {
        let now = Utc::now();
        let notification = Notification::new("u1", NotificationKind::Success, "Saved", now);

        assert!(!notification.is_expired(now + Duration::seconds(4)));
        assert!(notification.is_expired(now + Duration::seconds(5)));
    }

    #[test]
    fn test_match_other_participant() {
        let m = Match {
            id: "m1".to_string(),
            participants: ("a".to_string(), "b".to_string()),
            created_at: Utc::now(),
            last_message: None,
            unread: false,
        };

        assert_eq!(m.other("a"), Some("b"));
        assert_eq!(m.other("b"), Some("a"));
        assert_eq!(m.other("c"), None);
        assert!(m.joins("b", "a"));
    }
}
