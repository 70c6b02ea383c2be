//! PostgreSQL implementation of the persistence layer.
//!
//! Uniqueness rests on the indexes created by `migrations/`: `swipes` is
//! unique on `(actor_id, target_id)` and `matches` on `(user_low,
//! user_high)`. Racing writers are resolved by those indexes, not by
//! application-level locks.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::{MatchStore, MessageStore, ProfileDirectory, SwipeLedger};
use crate::config::GatewayConfig;
use crate::domain::{
    MatchId, MatchRecord, MessageId, MessageRecord, NewMessage, PairKey, ProfileSummary,
    SwipeAction, SwipeKey, SwipeRecord, UserId,
};
use crate::error::GatewayError;

type SwipeRow = (Uuid, Uuid, String, DateTime<Utc>);
type MatchRow = (Uuid, Uuid, Uuid, bool, DateTime<Utc>);
type MessageRow = (Uuid, Uuid, Uuid, Uuid, String, bool, DateTime<Utc>);
type ProfileRow = (
    Uuid,
    Option<String>,
    Option<String>,
    Option<i32>,
    Option<String>,
    Option<String>,
    Option<String>,
);

const MATCH_COLUMNS: &str = "id, user_low, user_high, is_active, matched_at";
const MESSAGE_COLUMNS: &str = "id, match_id, sender_id, receiver_id, content, seen, created_at";

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool sized from `config` and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] if the database is
    /// unreachable or a migration fails.
    pub async fn connect(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(std::time::Duration::from_secs(
                config.database_connect_timeout_secs,
            ))
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        tracing::info!(
            max_connections = config.database_max_connections,
            "postgres persistence ready"
        );
        Ok(Self::new(pool))
    }
}

fn swipe_from_row((actor, target, action, created_at): SwipeRow) -> Result<SwipeRecord, GatewayError> {
    let action = action
        .parse::<SwipeAction>()
        .map_err(GatewayError::PersistenceError)?;
    Ok(SwipeRecord {
        actor: UserId::from_uuid(actor),
        target: UserId::from_uuid(target),
        action,
        created_at,
    })
}

fn match_from_row((id, user_low, user_high, is_active, matched_at): MatchRow) -> MatchRecord {
    MatchRecord {
        id: MatchId::from_uuid(id),
        user_low: UserId::from_uuid(user_low),
        user_high: UserId::from_uuid(user_high),
        is_active,
        matched_at,
    }
}

fn message_from_row(
    (id, match_id, sender_id, receiver_id, content, seen, created_at): MessageRow,
) -> MessageRecord {
    MessageRecord {
        id: MessageId::from_uuid(id),
        match_id: MatchId::from_uuid(match_id),
        sender_id: UserId::from_uuid(sender_id),
        receiver_id: UserId::from_uuid(receiver_id),
        content,
        seen,
        created_at,
    }
}

#[async_trait]
impl SwipeLedger for PostgresPersistence {
    async fn record(
        &self,
        actor: UserId,
        target: UserId,
        action: SwipeAction,
    ) -> Result<SwipeRecord, GatewayError> {
        if actor == target {
            return Err(GatewayError::InvalidTarget);
        }
        let row = sqlx::query_as::<_, SwipeRow>(
            "INSERT INTO swipes (actor_id, target_id, action) VALUES ($1, $2, $3) \
             RETURNING actor_id, target_id, action, created_at",
        )
        .bind(actor.as_uuid())
        .bind(target.as_uuid())
        .bind(action.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => GatewayError::DuplicateSwipe,
            other => GatewayError::from(other),
        })?;

        swipe_from_row(row)
    }

    async fn find(&self, key: SwipeKey) -> Result<Option<SwipeRecord>, GatewayError> {
        let row = sqlx::query_as::<_, SwipeRow>(
            "SELECT actor_id, target_id, action, created_at FROM swipes \
             WHERE actor_id = $1 AND target_id = $2",
        )
        .bind(key.actor.as_uuid())
        .bind(key.target.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(swipe_from_row).transpose()
    }

    async fn likers_of(&self, target: UserId) -> Result<Vec<SwipeRecord>, GatewayError> {
        let rows = sqlx::query_as::<_, SwipeRow>(
            "SELECT actor_id, target_id, action, created_at FROM swipes \
             WHERE target_id = $1 AND action IN ('like', 'superlike') \
             ORDER BY created_at DESC",
        )
        .bind(target.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(swipe_from_row).collect()
    }
}

#[async_trait]
impl MatchStore for PostgresPersistence {
    async fn find_by_pair(
        &self,
        a: UserId,
        b: UserId,
    ) -> Result<Option<MatchRecord>, GatewayError> {
        let Some(pair) = PairKey::new(a, b) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, MatchRow>(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches WHERE user_low = $1 AND user_high = $2"
        ))
        .bind(pair.low().as_uuid())
        .bind(pair.high().as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(match_from_row))
    }

    async fn insert_if_absent(&self, pair: PairKey) -> Result<(MatchRecord, bool), GatewayError> {
        let fresh = MatchRecord::new(pair);
        let inserted = sqlx::query_as::<_, MatchRow>(&format!(
            "INSERT INTO matches (id, user_low, user_high, is_active, matched_at) \
             VALUES ($1, $2, $3, TRUE, $4) \
             ON CONFLICT (user_low, user_high) DO NOTHING \
             RETURNING {MATCH_COLUMNS}"
        ))
        .bind(fresh.id.as_uuid())
        .bind(pair.low().as_uuid())
        .bind(pair.high().as_uuid())
        .bind(fresh.matched_at)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok((match_from_row(row), true));
        }

        // Lost the race (or the pair matched before): the winner's row exists.
        let existing = self
            .find_by_pair(pair.low(), pair.high())
            .await?
            .ok_or_else(|| {
                GatewayError::Internal("match conflict without existing row".to_string())
            })?;
        Ok((existing, false))
    }

    async fn find_active_for_participant(
        &self,
        match_id: MatchId,
        user: UserId,
    ) -> Result<Option<MatchRecord>, GatewayError> {
        let row = sqlx::query_as::<_, MatchRow>(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches \
             WHERE id = $1 AND is_active AND (user_low = $2 OR user_high = $2)"
        ))
        .bind(match_id.as_uuid())
        .bind(user.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(match_from_row))
    }

    async fn list_for_user(&self, user: UserId) -> Result<Vec<MatchRecord>, GatewayError> {
        let rows = sqlx::query_as::<_, MatchRow>(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches \
             WHERE is_active AND (user_low = $1 OR user_high = $1) \
             ORDER BY matched_at DESC"
        ))
        .bind(user.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(match_from_row).collect())
    }

    async fn deactivate(
        &self,
        match_id: MatchId,
        requester: UserId,
    ) -> Result<MatchRecord, GatewayError> {
        let current = sqlx::query_as::<_, MatchRow>(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches WHERE id = $1"
        ))
        .bind(match_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .map(match_from_row)
        .ok_or(GatewayError::MatchNotFound(match_id))?;

        if !current.involves(requester) {
            return Err(GatewayError::Forbidden);
        }

        let row = sqlx::query_as::<_, MatchRow>(&format!(
            "UPDATE matches SET is_active = FALSE WHERE id = $1 RETURNING {MATCH_COLUMNS}"
        ))
        .bind(match_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(match_from_row(row))
    }
}

#[async_trait]
impl MessageStore for PostgresPersistence {
    async fn append(&self, message: NewMessage) -> Result<MessageRecord, GatewayError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "INSERT INTO messages (id, match_id, sender_id, receiver_id, content) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(MessageId::new().as_uuid())
        .bind(message.match_id.as_uuid())
        .bind(message.sender_id.as_uuid())
        .bind(message.receiver_id.as_uuid())
        .bind(&message.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(message_from_row(row))
    }

    async fn page(
        &self,
        match_id: MatchId,
        limit: u32,
        skip: u32,
    ) -> Result<Vec<MessageRecord>, GatewayError> {
        let rows = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE match_id = $1 \
             ORDER BY created_at DESC, seq DESC LIMIT $2 OFFSET $3"
        ))
        .bind(match_id.as_uuid())
        .bind(i64::from(limit))
        .bind(i64::from(skip))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(message_from_row).collect())
    }

    async fn mark_seen(
        &self,
        ids: &[MessageId],
        match_id: MatchId,
        receiver: UserId,
    ) -> Result<u64, GatewayError> {
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let result = sqlx::query(
            "UPDATE messages SET seen = TRUE \
             WHERE id = ANY($1) AND match_id = $2 AND receiver_id = $3 AND NOT seen",
        )
        .bind(&ids)
        .bind(match_id.as_uuid())
        .bind(receiver.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ProfileDirectory for PostgresPersistence {
    async fn summaries(
        &self,
        ids: &[UserId],
    ) -> Result<HashMap<UserId, ProfileSummary>, GatewayError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query_as::<_, ProfileRow>(
            "SELECT user_id, first_name, last_name, age, address, profession, bio \
             FROM user_profiles WHERE user_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(user_id, first_name, last_name, age, address, profession, bio)| {
                    let user_id = UserId::from_uuid(user_id);
                    (
                        user_id,
                        ProfileSummary {
                            user_id,
                            first_name,
                            last_name,
                            age,
                            address,
                            profession,
                            bio,
                        },
                    )
                },
            )
            .collect())
    }
}
