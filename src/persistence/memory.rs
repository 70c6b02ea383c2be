//! In-memory store implementations.
//!
//! Each store keeps its rows in a `HashMap` behind a single
//! [`tokio::sync::RwLock`]. Check-and-insert happens under one write guard,
//! which gives the same atomicity a unique index gives the PostgreSQL store.
//! Contents live for the lifetime of the process.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{MatchStore, MessageStore, ProfileDirectory, SwipeLedger};
use crate::domain::{
    MatchId, MatchRecord, MessageId, MessageRecord, NewMessage, PairKey, ProfileSummary,
    SwipeAction, SwipeKey, SwipeRecord, UserId,
};
use crate::error::GatewayError;

/// Swipe ledger keyed by the ordered `(actor, target)` pair.
#[derive(Debug, Default)]
pub struct MemorySwipeLedger {
    swipes: RwLock<HashMap<SwipeKey, SwipeRecord>>,
}

impl MemorySwipeLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded swipes.
    pub async fn len(&self) -> usize {
        self.swipes.read().await.len()
    }

    /// Returns `true` when nothing has been recorded.
    pub async fn is_empty(&self) -> bool {
        self.swipes.read().await.is_empty()
    }
}

#[async_trait]
impl SwipeLedger for MemorySwipeLedger {
    async fn record(
        &self,
        actor: UserId,
        target: UserId,
        action: SwipeAction,
    ) -> Result<SwipeRecord, GatewayError> {
        if actor == target {
            return Err(GatewayError::InvalidTarget);
        }
        let record = SwipeRecord {
            actor,
            target,
            action,
            created_at: Utc::now(),
        };
        let mut map = self.swipes.write().await;
        if map.contains_key(&record.key()) {
            return Err(GatewayError::DuplicateSwipe);
        }
        map.insert(record.key(), record.clone());
        Ok(record)
    }

    async fn find(&self, key: SwipeKey) -> Result<Option<SwipeRecord>, GatewayError> {
        let map = self.swipes.read().await;
        Ok(map.get(&key).cloned())
    }

    async fn likers_of(&self, target: UserId) -> Result<Vec<SwipeRecord>, GatewayError> {
        let map = self.swipes.read().await;
        let mut likes: Vec<SwipeRecord> = map
            .values()
            .filter(|s| s.target == target && s.action.is_positive())
            .cloned()
            .collect();
        likes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(likes)
    }
}

#[derive(Debug, Default)]
struct MatchTable {
    by_id: HashMap<MatchId, MatchRecord>,
    by_pair: HashMap<PairKey, MatchId>,
}

/// Match store with a secondary index on the canonical pair.
#[derive(Debug, Default)]
pub struct MemoryMatchStore {
    table: RwLock<MatchTable>,
}

impl MemoryMatchStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of match records, active or not.
    pub async fn len(&self) -> usize {
        self.table.read().await.by_id.len()
    }

    /// Returns `true` when no match was ever created.
    pub async fn is_empty(&self) -> bool {
        self.table.read().await.by_id.is_empty()
    }
}

#[async_trait]
impl MatchStore for MemoryMatchStore {
    async fn find_by_pair(
        &self,
        a: UserId,
        b: UserId,
    ) -> Result<Option<MatchRecord>, GatewayError> {
        let Some(pair) = PairKey::new(a, b) else {
            return Ok(None);
        };
        let table = self.table.read().await;
        Ok(table
            .by_pair
            .get(&pair)
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    async fn insert_if_absent(&self, pair: PairKey) -> Result<(MatchRecord, bool), GatewayError> {
        let mut table = self.table.write().await;
        if let Some(existing) = table.by_pair.get(&pair).and_then(|id| table.by_id.get(id)) {
            return Ok((existing.clone(), false));
        }
        let record = MatchRecord::new(pair);
        table.by_pair.insert(record.pair(), record.id);
        table.by_id.insert(record.id, record.clone());
        Ok((record, true))
    }

    async fn find_active_for_participant(
        &self,
        match_id: MatchId,
        user: UserId,
    ) -> Result<Option<MatchRecord>, GatewayError> {
        let table = self.table.read().await;
        Ok(table
            .by_id
            .get(&match_id)
            .filter(|m| m.is_active && m.involves(user))
            .cloned())
    }

    async fn list_for_user(&self, user: UserId) -> Result<Vec<MatchRecord>, GatewayError> {
        let table = self.table.read().await;
        let mut matches: Vec<MatchRecord> = table
            .by_id
            .values()
            .filter(|m| m.is_active && m.involves(user))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.matched_at.cmp(&a.matched_at));
        Ok(matches)
    }

    async fn deactivate(
        &self,
        match_id: MatchId,
        requester: UserId,
    ) -> Result<MatchRecord, GatewayError> {
        let mut table = self.table.write().await;
        let record = table
            .by_id
            .get_mut(&match_id)
            .ok_or(GatewayError::MatchNotFound(match_id))?;
        if !record.involves(requester) {
            return Err(GatewayError::Forbidden);
        }
        record.is_active = false;
        Ok(record.clone())
    }
}

/// Message log with one append-ordered vector per match.
#[derive(Debug, Default)]
pub struct MemoryMessageStore {
    logs: RwLock<HashMap<MatchId, Vec<MessageRecord>>>,
}

impl MemoryMessageStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages stored for `match_id`.
    pub async fn count(&self, match_id: MatchId) -> usize {
        self.logs.read().await.get(&match_id).map_or(0, Vec::len)
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn append(&self, message: NewMessage) -> Result<MessageRecord, GatewayError> {
        let mut logs = self.logs.write().await;
        let record = message.into_record(MessageId::new(), Utc::now());
        logs.entry(record.match_id).or_default().push(record.clone());
        Ok(record)
    }

    async fn page(
        &self,
        match_id: MatchId,
        limit: u32,
        skip: u32,
    ) -> Result<Vec<MessageRecord>, GatewayError> {
        let logs = self.logs.read().await;
        let Some(log) = logs.get(&match_id) else {
            return Ok(Vec::new());
        };
        Ok(log
            .iter()
            .rev()
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn mark_seen(
        &self,
        ids: &[MessageId],
        match_id: MatchId,
        receiver: UserId,
    ) -> Result<u64, GatewayError> {
        let wanted: HashSet<&MessageId> = ids.iter().collect();
        let mut logs = self.logs.write().await;
        let Some(log) = logs.get_mut(&match_id) else {
            return Ok(0);
        };
        let mut changed = 0_u64;
        for message in log
            .iter_mut()
            .filter(|m| !m.seen && m.receiver_id == receiver && wanted.contains(&m.id))
        {
            message.seen = true;
            changed = changed.saturating_add(1);
        }
        Ok(changed)
    }
}

/// Profile directory fed by [`MemoryProfileDirectory::upsert`].
#[derive(Debug, Default)]
pub struct MemoryProfileDirectory {
    profiles: RwLock<HashMap<UserId, ProfileSummary>>,
}

impl MemoryProfileDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a profile summary.
    pub async fn upsert(&self, profile: ProfileSummary) {
        self.profiles.write().await.insert(profile.user_id, profile);
    }
}

#[async_trait]
impl ProfileDirectory for MemoryProfileDirectory {
    async fn summaries(
        &self,
        ids: &[UserId],
    ) -> Result<HashMap<UserId, ProfileSummary>, GatewayError> {
        let profiles = self.profiles.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| profiles.get(id).map(|p| (*id, p.clone())))
            .collect())
    }
}
