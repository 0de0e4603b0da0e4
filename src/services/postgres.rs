use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Duration;
use tokio::sync::broadcast;
use crate::core::filters::is_eligible;
use crate::models::{Match, Message, MessageSummary, Preferences, ProfileUpdate, UserProfile};
use crate::services::backend::{like_key, BackendError, LikeOutcome, PersistenceBackend, Subscriptions};

/// PostgreSQL implementation of the persistence contract
///
/// Profiles are stored as JSONB documents; likes are keyed by the ordered
/// pair so the reciprocal lookup is a primary-key read.
pub struct PostgresBackend {
    pool: PgPool,
    subscriptions: Subscriptions,
}

impl PostgresBackend {
    /// Create a new backend from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, BackendError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self {
            pool,
            subscriptions: Subscriptions::default(),
        })
    }

    /// Create a new backend from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, BackendError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, BackendError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }

    async fn find_match(&self, a: &str, b: &str) -> Result<Option<Match>, BackendError> {
        let query = r#"
            SELECT id, user1_id, user2_id, created_at, last_message, last_message_at, unread
            FROM matches
            WHERE (user1_id = $1 AND user2_id = $2) OR (user1_id = $2 AND user2_id = $1)
        "#;

        let row = sqlx::query(query).bind(a).bind(b).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(match_from_row))
    }
}

fn match_from_row(row: &PgRow) -> Match {
    let last_message: Option<String> = row.get("last_message");
    let last_message_at: Option<DateTime<Utc>> = row.get("last_message_at");

    Match {
        id: row.get("id"),
        participants: (row.get("user1_id"), row.get("user2_id")),
        created_at: row.get("created_at"),
        last_message: last_message
            .zip(last_message_at)
            .map(|(text, sent_at)| MessageSummary { text, sent_at }),
        unread: row.get("unread"),
    }
}

fn message_from_row(row: &PgRow) -> Message {
    Message {
        id: row.get("id"),
        match_id: row.get("match_id"),
        sender_id: row.get("sender_id"),
        text: row.get("text"),
        sent_at: row.get("sent_at"),
        is_read: row.get("is_read"),
    }
}

#[async_trait]
impl PersistenceBackend for PostgresBackend {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn create_profile(&self, profile: UserProfile) -> Result<(), BackendError> {
        let query = r#"
            INSERT INTO profiles (user_id, data, created_at, updated_at)
            VALUES ($1, $2, NOW(), NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET
                data = EXCLUDED.data,
                updated_at = EXCLUDED.updated_at
        "#;

        sqlx::query(query)
            .bind(&profile.user_id)
            .bind(Json(&profile))
            .execute(&self.pool)
            .await?;

        tracing::debug!("Stored profile {}", profile.user_id);
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<UserProfile, BackendError> {
        let row = sqlx::query("SELECT data FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| BackendError::NotFound(format!("user {}", user_id)))?;

        let Json(profile): Json<UserProfile> = row.try_get("data")?;
        Ok(profile)
    }

    async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<UserProfile, BackendError> {
        let mut profile = self.get_profile(user_id).await?;
        profile.apply(update);

        sqlx::query("UPDATE profiles SET data = $2, updated_at = NOW() WHERE user_id = $1")
            .bind(user_id)
            .bind(Json(&profile))
            .execute(&self.pool)
            .await?;

        Ok(profile)
    }

    async fn discovery_users(
        &self,
        viewer_id: &str,
        preferences: &Preferences,
        limit: usize,
    ) -> Result<Vec<UserProfile>, BackendError> {
        // Age is filtered in SQL; gender matching stays in Rust so both
        // backends share the same comparison rules
        let query = r#"
            SELECT data
            FROM profiles
            WHERE user_id <> $1
              AND (data->>'age')::int BETWEEN $2 AND $3
            ORDER BY created_at, user_id
        "#;

        let rows = sqlx::query(query)
            .bind(viewer_id)
            .bind(preferences.min_age() as i32)
            .bind(preferences.max_age() as i32)
            .fetch_all(&self.pool)
            .await?;

        let decided = Default::default();
        let mut users = Vec::new();
        for row in &rows {
            if users.len() >= limit {
                break;
            }
            let Json(profile): Json<UserProfile> = row.try_get("data")?;
            if is_eligible(&profile, viewer_id, preferences, &decided) {
                users.push(profile);
            }
        }

        Ok(users)
    }

    async fn record_like(&self, liker_id: &str, liked_id: &str) -> Result<LikeOutcome, BackendError> {
        if liker_id == liked_id {
            return Err(BackendError::InvalidInput("cannot like yourself".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        // Likes in either direction of a pair serialize here, so the
        // reciprocal check below always sees a concurrent opposite like
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext(LEAST($1, $2) || ':' || GREATEST($1, $2)))")
            .bind(liker_id)
            .bind(liked_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO likes (id, liker_id, liked_id, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (id) DO UPDATE SET created_at = EXCLUDED.created_at
            "#,
        )
        .bind(like_key(liker_id, liked_id))
        .bind(liker_id)
        .bind(liked_id)
        .execute(&mut *tx)
        .await?;

        let reciprocal = sqlx::query("SELECT 1 FROM likes WHERE id = $1")
            .bind(like_key(liked_id, liker_id))
            .fetch_optional(&mut *tx)
            .await?
            .is_some();

        if !reciprocal {
            tx.commit().await?;
            return Ok(LikeOutcome { is_match: false, new_match: None });
        }

        // The pair index makes this a no-op when the match already exists
        let inserted = sqlx::query(
            r#"
            INSERT INTO matches (id, user1_id, user2_id, created_at, unread)
            VALUES ($1, $2, $3, NOW(), FALSE)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(like_key(liker_id, liked_id))
        .bind(liker_id)
        .bind(liked_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        tx.commit().await?;

        let new_match = self.find_match(liker_id, liked_id).await?;
        if inserted {
            if let Some(m) = &new_match {
                tracing::info!("Reciprocal like: match {} created", m.id);
                self.subscriptions.publish_match(m);
            }
        }

        Ok(LikeOutcome { is_match: true, new_match })
    }

    async fn user_matches(&self, user_id: &str) -> Result<Vec<Match>, BackendError> {
        let query = r#"
            SELECT id, user1_id, user2_id, created_at, last_message, last_message_at, unread
            FROM matches
            WHERE user1_id = $1 OR user2_id = $1
            ORDER BY created_at
        "#;

        let rows = sqlx::query(query).bind(user_id).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(match_from_row).collect())
    }

    async fn send_message(&self, match_id: &str, sender_id: &str, text: &str) -> Result<Message, BackendError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(BackendError::InvalidInput("message text is empty".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT user1_id, user2_id FROM matches WHERE id = $1 FOR UPDATE")
            .bind(match_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| BackendError::NotFound(format!("match {}", match_id)))?;
        let user1: String = row.get("user1_id");
        let user2: String = row.get("user2_id");
        if sender_id != user1 && sender_id != user2 {
            return Err(BackendError::InvalidInput(format!("{} is not part of match {}", sender_id, match_id)));
        }

        let message_row = sqlx::query(
            r#"
            INSERT INTO messages (id, match_id, sender_id, text, sent_at, is_read)
            VALUES ($1, $2, $3, $4, NOW(), FALSE)
            RETURNING id, match_id, sender_id, text, sent_at, is_read
            "#,
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(match_id)
        .bind(sender_id)
        .bind(text)
        .fetch_one(&mut *tx)
        .await?;
        let message = message_from_row(&message_row);

        sqlx::query(
            "UPDATE matches SET last_message = $2, last_message_at = $3, unread = TRUE WHERE id = $1",
        )
        .bind(match_id)
        .bind(&message.text)
        .bind(message.sent_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.subscriptions.publish_message(&message);
        Ok(message)
    }

    async fn messages(&self, match_id: &str) -> Result<Vec<Message>, BackendError> {
        let query = r#"
            SELECT id, match_id, sender_id, text, sent_at, is_read
            FROM messages
            WHERE match_id = $1
            ORDER BY sent_at ASC
        "#;

        let rows = sqlx::query(query).bind(match_id).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(message_from_row).collect())
    }

    fn subscribe_messages(&self, match_id: &str) -> broadcast::Receiver<Message> {
        self.subscriptions.messages(match_id)
    }

    fn subscribe_matches(&self, user_id: &str) -> broadcast::Receiver<Match> {
        self.subscriptions.matches(user_id)
    }
}
