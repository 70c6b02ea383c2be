//! Persistence layer: swipe ledger, match store, message store, profiles.
//!
//! Each store is a trait so services receive them by injection. Two
//! implementations exist: [`memory`] (single-process, lock-guarded maps)
//! and [`postgres`] (`sqlx::PgPool`). In both, uniqueness of the ordered
//! swipe pair and of the canonical match pair is enforced by the store
//! itself, never by callers checking first.

pub mod memory;
pub mod postgres;

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    MatchId, MatchRecord, MessageId, MessageRecord, NewMessage, PairKey, ProfileSummary,
    SwipeAction, SwipeKey, SwipeRecord, UserId,
};
use crate::error::GatewayError;

/// Append-only record of swipe decisions, unique per ordered pair.
#[async_trait]
pub trait SwipeLedger: Send + Sync + Debug {
    /// Persists `actor → target`.
    ///
    /// # Errors
    ///
    /// [`GatewayError::InvalidTarget`] when `actor == target`,
    /// [`GatewayError::DuplicateSwipe`] when the ordered pair already exists,
    /// [`GatewayError::PersistenceError`] on storage failure.
    async fn record(
        &self,
        actor: UserId,
        target: UserId,
        action: SwipeAction,
    ) -> Result<SwipeRecord, GatewayError>;

    /// Returns the swipe stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// [`GatewayError::PersistenceError`] on storage failure.
    async fn find(&self, key: SwipeKey) -> Result<Option<SwipeRecord>, GatewayError>;

    /// Returns positive swipes received by `target`, newest first.
    ///
    /// # Errors
    ///
    /// [`GatewayError::PersistenceError`] on storage failure.
    async fn likers_of(&self, target: UserId) -> Result<Vec<SwipeRecord>, GatewayError>;
}

/// Match records keyed by id and by canonical pair.
#[async_trait]
pub trait MatchStore: Send + Sync + Debug {
    /// Returns the record for the unordered pair `{a, b}`, active or not.
    ///
    /// # Errors
    ///
    /// [`GatewayError::PersistenceError`] on storage failure.
    async fn find_by_pair(&self, a: UserId, b: UserId)
    -> Result<Option<MatchRecord>, GatewayError>;

    /// Inserts a fresh active record for `pair` unless one exists.
    /// Returns the stored record and whether this call created it.
    ///
    /// # Errors
    ///
    /// [`GatewayError::PersistenceError`] on storage failure.
    async fn insert_if_absent(&self, pair: PairKey) -> Result<(MatchRecord, bool), GatewayError>;

    /// Returns the match only if it is active and `user` participates.
    ///
    /// # Errors
    ///
    /// [`GatewayError::PersistenceError`] on storage failure.
    async fn find_active_for_participant(
        &self,
        match_id: MatchId,
        user: UserId,
    ) -> Result<Option<MatchRecord>, GatewayError>;

    /// Active matches of `user`, most recent first.
    ///
    /// # Errors
    ///
    /// [`GatewayError::PersistenceError`] on storage failure.
    async fn list_for_user(&self, user: UserId) -> Result<Vec<MatchRecord>, GatewayError>;

    /// Soft-deletes a match on behalf of one of its participants.
    ///
    /// # Errors
    ///
    /// [`GatewayError::MatchNotFound`] when no such match exists,
    /// [`GatewayError::Forbidden`] when `requester` is not a participant,
    /// [`GatewayError::PersistenceError`] on storage failure.
    async fn deactivate(
        &self,
        match_id: MatchId,
        requester: UserId,
    ) -> Result<MatchRecord, GatewayError>;
}

/// Append-only per-match message log.
#[async_trait]
pub trait MessageStore: Send + Sync + Debug {
    /// Stores a message with a server-assigned id and timestamp.
    ///
    /// # Errors
    ///
    /// [`GatewayError::PersistenceError`] on storage failure.
    async fn append(&self, message: NewMessage) -> Result<MessageRecord, GatewayError>;

    /// Returns up to `limit` messages after skipping `skip`, newest first.
    ///
    /// # Errors
    ///
    /// [`GatewayError::PersistenceError`] on storage failure.
    async fn page(
        &self,
        match_id: MatchId,
        limit: u32,
        skip: u32,
    ) -> Result<Vec<MessageRecord>, GatewayError>;

    /// Flags unseen messages of `match_id` addressed to `receiver` whose id
    /// is in `ids`. Returns the number of rows actually changed.
    ///
    /// # Errors
    ///
    /// [`GatewayError::PersistenceError`] on storage failure.
    async fn mark_seen(
        &self,
        ids: &[MessageId],
        match_id: MatchId,
        receiver: UserId,
    ) -> Result<u64, GatewayError>;
}

/// Read access to profile summaries owned by the profile service.
#[async_trait]
pub trait ProfileDirectory: Send + Sync + Debug {
    /// Returns summaries for the ids that have a profile.
    ///
    /// # Errors
    ///
    /// [`GatewayError::PersistenceError`] on storage failure.
    async fn summaries(
        &self,
        ids: &[UserId],
    ) -> Result<HashMap<UserId, ProfileSummary>, GatewayError>;
}

/// Bundle of store handles handed to the service layer.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Swipe ledger.
    pub swipes: Arc<dyn SwipeLedger>,
    /// Match store.
    pub matches: Arc<dyn MatchStore>,
    /// Message store.
    pub messages: Arc<dyn MessageStore>,
    /// Profile directory.
    pub profiles: Arc<dyn ProfileDirectory>,
}

impl Stores {
    /// All stores backed by process memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            swipes: Arc::new(memory::MemorySwipeLedger::new()),
            matches: Arc::new(memory::MemoryMatchStore::new()),
            messages: Arc::new(memory::MemoryMessageStore::new()),
            profiles: Arc::new(memory::MemoryProfileDirectory::new()),
        }
    }

    /// All stores backed by one PostgreSQL pool.
    #[must_use]
    pub fn postgres(persistence: postgres::PostgresPersistence) -> Self {
        let shared = Arc::new(persistence);
        Self {
            swipes: Arc::clone(&shared) as Arc<dyn SwipeLedger>,
            matches: Arc::clone(&shared) as Arc<dyn MatchStore>,
            messages: Arc::clone(&shared) as Arc<dyn MessageStore>,
            profiles: shared,
        }
    }
}
