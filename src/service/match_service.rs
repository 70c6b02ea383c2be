//! Match service: swipe recording, reciprocity resolution and match queries.

use std::sync::Arc;

use crate::domain::{
    ChatEvent, MatchId, MatchRecord, PairKey, ProfileSummary, SwipeAction, SwipeKey, SwipeRecord,
    UserId,
};
use crate::error::GatewayError;
use crate::persistence::{MatchStore, ProfileDirectory, SwipeLedger};
use crate::service::PresenceService;

/// Result of checking a positive swipe for reciprocity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The other user has not liked back.
    Pending,
    /// The pair has an active match.
    Matched {
        /// The active match record.
        record: MatchRecord,
        /// `true` when this resolution created the record.
        created: bool,
    },
    /// Mutual like over a pair that was unmatched earlier. The record stays
    /// inactive.
    Inactive(MatchRecord),
}

impl Resolution {
    /// Returns `true` only for an active match.
    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    /// The active match, if any.
    #[must_use]
    pub const fn active_match(&self) -> Option<&MatchRecord> {
        match self {
            Self::Matched { record, .. } => Some(record),
            Self::Pending | Self::Inactive(_) => None,
        }
    }
}

/// Outcome of one swipe.
#[derive(Debug, Clone)]
pub struct SwipeOutcome {
    /// The stored swipe.
    pub swipe: SwipeRecord,
    /// Reciprocity result; `None` after a dislike.
    pub resolution: Option<Resolution>,
}

impl SwipeOutcome {
    /// Returns `true` when the swipe ended in an active match.
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.resolution.as_ref().is_some_and(Resolution::is_match)
    }

    /// The active match, if any.
    #[must_use]
    pub fn active_match(&self) -> Option<&MatchRecord> {
        self.resolution.as_ref().and_then(Resolution::active_match)
    }
}

/// Active match seen from one participant, with the partner's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchView {
    /// The match.
    pub record: MatchRecord,
    /// The other participant. Only `user_id` is set when no profile exists.
    pub partner: ProfileSummary,
}

/// A positive swipe received by a user, with the liker's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Liker {
    /// The swipe.
    pub swipe: SwipeRecord,
    /// Liker's profile, when one exists.
    pub profile: Option<ProfileSummary>,
}

/// Turns swipes into matches and answers match queries.
#[derive(Debug, Clone)]
pub struct MatchService {
    swipes: Arc<dyn SwipeLedger>,
    matches: Arc<dyn MatchStore>,
    profiles: Arc<dyn ProfileDirectory>,
    presence: Arc<PresenceService>,
}

impl MatchService {
    /// Creates a new `MatchService`.
    #[must_use]
    pub fn new(
        swipes: Arc<dyn SwipeLedger>,
        matches: Arc<dyn MatchStore>,
        profiles: Arc<dyn ProfileDirectory>,
        presence: Arc<PresenceService>,
    ) -> Self {
        Self {
            swipes,
            matches,
            profiles,
            presence,
        }
    }

    /// Records a swipe and, for likes and superlikes, resolves the match.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTarget`] for a self swipe,
    /// [`GatewayError::DuplicateSwipe`] when the pair was already swiped,
    /// or a dependency failure.
    pub async fn swipe(
        &self,
        actor: UserId,
        target: UserId,
        action: SwipeAction,
    ) -> Result<SwipeOutcome, GatewayError> {
        let swipe = self.swipes.record(actor, target, action).await?;
        tracing::debug!(actor = %actor, target = %target, %action, "swipe recorded");

        let resolution = if action.is_positive() {
            Some(self.resolve_after_swipe(actor, target).await?)
        } else {
            None
        };
        Ok(SwipeOutcome { swipe, resolution })
    }

    /// Checks whether `target` already liked `actor` and, if so, returns or
    /// creates the canonical match of the pair. Both participants receive
    /// `newMatch` when the record is created by this call.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTarget`] when `actor == target`, or a
    /// dependency failure.
    pub async fn resolve_after_swipe(
        &self,
        actor: UserId,
        target: UserId,
    ) -> Result<Resolution, GatewayError> {
        let pair = PairKey::new(actor, target).ok_or(GatewayError::InvalidTarget)?;

        let reciprocal = self.swipes.find(SwipeKey::new(actor, target).reversed()).await?;
        if !reciprocal.is_some_and(|s| s.action.is_positive()) {
            return Ok(Resolution::Pending);
        }

        if let Some(existing) = self.matches.find_by_pair(actor, target).await? {
            return Ok(Self::classify(existing, false));
        }

        let (record, created) = self.matches.insert_if_absent(pair).await?;
        if created {
            tracing::info!(match_id = %record.id, user_low = %record.user_low, user_high = %record.user_high, "match created");
            self.announce(&record).await;
        }
        Ok(Self::classify(record, created))
    }

    /// Active matches of `user`, most recent first.
    ///
    /// # Errors
    ///
    /// Returns a dependency failure.
    pub async fn matches_for(&self, user: UserId) -> Result<Vec<MatchRecord>, GatewayError> {
        self.matches.list_for_user(user).await
    }

    /// Active matches of `user` with the partner's profile attached.
    ///
    /// # Errors
    ///
    /// Returns a dependency failure.
    pub async fn match_views(&self, user: UserId) -> Result<Vec<MatchView>, GatewayError> {
        let records = self.matches.list_for_user(user).await?;
        let partners: Vec<UserId> = records.iter().filter_map(|m| m.partner_of(user)).collect();
        let mut profiles = self.profiles.summaries(&partners).await?;

        Ok(records
            .into_iter()
            .filter_map(|record| {
                let partner_id = record.partner_of(user)?;
                let partner = profiles
                    .remove(&partner_id)
                    .unwrap_or_else(|| ProfileSummary::bare(partner_id));
                Some(MatchView { record, partner })
            })
            .collect())
    }

    /// `record` as seen by `viewer`, with the partner's profile.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Forbidden`] when `viewer` is not a
    /// participant, or a dependency failure.
    pub async fn view_of(
        &self,
        record: MatchRecord,
        viewer: UserId,
    ) -> Result<MatchView, GatewayError> {
        let partner_id = record.partner_of(viewer).ok_or(GatewayError::Forbidden)?;
        let partner = self
            .profiles
            .summaries(&[partner_id])
            .await?
            .remove(&partner_id)
            .unwrap_or_else(|| ProfileSummary::bare(partner_id));
        Ok(MatchView { record, partner })
    }

    /// Soft-deletes a match on behalf of `requester`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MatchNotFound`], [`GatewayError::Forbidden`]
    /// or a dependency failure.
    pub async fn unmatch(
        &self,
        match_id: MatchId,
        requester: UserId,
    ) -> Result<MatchRecord, GatewayError> {
        let record = self.matches.deactivate(match_id, requester).await?;
        tracing::info!(%match_id, requester = %requester, "match deactivated");
        Ok(record)
    }

    /// Users who liked or superliked `user`, newest first.
    ///
    /// # Errors
    ///
    /// Returns a dependency failure.
    pub async fn likes_you(&self, user: UserId) -> Result<Vec<Liker>, GatewayError> {
        let swipes = self.swipes.likers_of(user).await?;
        let ids: Vec<UserId> = swipes.iter().map(|s| s.actor).collect();
        let mut profiles = self.profiles.summaries(&ids).await?;

        Ok(swipes
            .into_iter()
            .map(|swipe| {
                let profile = profiles.remove(&swipe.actor);
                Liker { swipe, profile }
            })
            .collect())
    }

    fn classify(record: MatchRecord, created: bool) -> Resolution {
        if record.is_active {
            Resolution::Matched { record, created }
        } else {
            Resolution::Inactive(record)
        }
    }

    async fn announce(&self, record: &MatchRecord) {
        for user in [record.user_low, record.user_high] {
            match self
                .presence
                .notify_user(user, ChatEvent::NewMatch(record.clone()))
                .await
            {
                Ok(delivered) => {
                    tracing::debug!(match_id = %record.id, user_id = %user, delivered, "newMatch");
                }
                Err(e) => {
                    tracing::warn!(match_id = %record.id, user_id = %user, error = %e, "newMatch not delivered");
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ConnectionId;
    use crate::persistence::memory::{
        MemoryMatchStore, MemoryProfileDirectory, MemorySwipeLedger,
    };
    use crate::ws::presence::InMemoryPresence;
    use crate::ws::rooms::RoomRegistry;
    use tokio::sync::mpsc;
    use tokio_test::{assert_err, assert_ok};

    struct Fixture {
        service: Arc<MatchService>,
        matches: Arc<MemoryMatchStore>,
        profiles: Arc<MemoryProfileDirectory>,
        presence: Arc<PresenceService>,
        rooms: Arc<RoomRegistry>,
    }

    fn fixture() -> Fixture {
        let matches = Arc::new(MemoryMatchStore::new());
        let profiles = Arc::new(MemoryProfileDirectory::new());
        let rooms = Arc::new(RoomRegistry::new());
        let presence = Arc::new(PresenceService::new(
            Arc::new(InMemoryPresence::new()),
            Arc::clone(&matches) as Arc<dyn MatchStore>,
            Arc::clone(&rooms),
        ));
        let service = Arc::new(MatchService::new(
            Arc::new(MemorySwipeLedger::new()),
            Arc::clone(&matches) as Arc<dyn MatchStore>,
            Arc::clone(&profiles) as Arc<dyn ProfileDirectory>,
            Arc::clone(&presence),
        ));
        Fixture {
            service,
            matches,
            profiles,
            presence,
            rooms,
        }
    }

    #[tokio::test]
    async fn one_sided_like_is_pending() {
        let fx = fixture();
        let (u1, u2) = (UserId::new(), UserId::new());
        let outcome = assert_ok!(fx.service.swipe(u1, u2, SwipeAction::Like).await);
        assert_eq!(outcome.resolution, Some(Resolution::Pending));
        assert!(!outcome.is_match());
        assert!(fx.matches.is_empty().await);
    }

    #[tokio::test]
    async fn mutual_like_creates_one_match_in_either_order() {
        for reverse in [false, true] {
            let fx = fixture();
            let (u1, u2) = (UserId::new(), UserId::new());
            let (first, second) = if reverse { (u2, u1) } else { (u1, u2) };

            let _ = assert_ok!(fx.service.swipe(first, second, SwipeAction::Like).await);
            let outcome = assert_ok!(fx.service.swipe(second, first, SwipeAction::Superlike).await);

            let Some(record) = outcome.active_match() else {
                panic!("expected a match");
            };
            assert!(record.user_low < record.user_high);
            assert!(record.involves(u1) && record.involves(u2));
            assert_eq!(fx.matches.len().await, 1);
        }
    }

    #[tokio::test]
    async fn resolving_twice_returns_the_same_record() {
        let fx = fixture();
        let (u1, u2) = (UserId::new(), UserId::new());
        let _ = assert_ok!(fx.service.swipe(u1, u2, SwipeAction::Like).await);
        let outcome = assert_ok!(fx.service.swipe(u2, u1, SwipeAction::Like).await);
        let Some(Resolution::Matched { record, created }) = outcome.resolution else {
            panic!("expected a fresh match");
        };
        assert!(created);

        let again = assert_ok!(fx.service.resolve_after_swipe(u1, u2).await);
        assert_eq!(
            again,
            Resolution::Matched {
                record,
                created: false
            }
        );
        assert_eq!(fx.matches.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_resolution_yields_single_match() {
        let fx = fixture();
        let (u1, u2) = (UserId::new(), UserId::new());
        let _ = assert_ok!(fx.service.swipe(u1, u2, SwipeAction::Like).await);
        let _ = assert_ok!(fx.service.swipe(u2, u1, SwipeAction::Like).await);

        let mut handles = Vec::new();
        for i in 0..16 {
            let service = Arc::clone(&fx.service);
            let (a, b) = if i % 2 == 0 { (u1, u2) } else { (u2, u1) };
            handles.push(tokio::spawn(async move { service.resolve_after_swipe(a, b).await }));
        }
        let mut ids = Vec::new();
        for handle in handles {
            let Ok(result) = handle.await else {
                panic!("task panicked");
            };
            let resolution = assert_ok!(result);
            let Some(record) = resolution.active_match() else {
                panic!("expected a match");
            };
            ids.push(record.id);
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(fx.matches.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn simultaneous_mutual_likes_create_one_active_match() {
        for _ in 0..32 {
            let fx = fixture();
            let (u1, u2) = (UserId::new(), UserId::new());
            let forward = {
                let service = Arc::clone(&fx.service);
                tokio::spawn(async move { service.swipe(u1, u2, SwipeAction::Like).await })
            };
            let backward = {
                let service = Arc::clone(&fx.service);
                tokio::spawn(async move { service.swipe(u2, u1, SwipeAction::Like).await })
            };
            let (Ok(forward), Ok(backward)) = (forward.await, backward.await) else {
                panic!("swipe task panicked");
            };
            let forward = assert_ok!(forward);
            let backward = assert_ok!(backward);

            assert!(forward.is_match() || backward.is_match());
            let created = [&forward, &backward]
                .iter()
                .filter(|o| {
                    matches!(
                        o.resolution,
                        Some(Resolution::Matched { created: true, .. })
                    )
                })
                .count();
            assert_eq!(created, 1);

            let listed = assert_ok!(fx.service.matches_for(u1).await);
            assert_eq!(listed.len(), 1);
            assert_eq!(fx.matches.len().await, 1);
        }
    }

    #[tokio::test]
    async fn dislike_never_resolves() {
        let fx = fixture();
        let (u1, u2) = (UserId::new(), UserId::new());
        let _ = assert_ok!(fx.service.swipe(u1, u2, SwipeAction::Like).await);
        let outcome = assert_ok!(fx.service.swipe(u2, u1, SwipeAction::Dislike).await);
        assert_eq!(outcome.resolution, None);
        assert!(fx.matches.is_empty().await);
    }

    #[tokio::test]
    async fn reciprocal_dislike_keeps_like_pending() {
        let fx = fixture();
        let (u1, u2) = (UserId::new(), UserId::new());
        let _ = assert_ok!(fx.service.swipe(u2, u1, SwipeAction::Dislike).await);
        let outcome = assert_ok!(fx.service.swipe(u1, u2, SwipeAction::Like).await);
        assert_eq!(outcome.resolution, Some(Resolution::Pending));
    }

    #[tokio::test]
    async fn duplicate_and_self_swipes_are_rejected() {
        let fx = fixture();
        let (u1, u2) = (UserId::new(), UserId::new());
        let _ = assert_ok!(fx.service.swipe(u1, u2, SwipeAction::Like).await);
        let err = assert_err!(fx.service.swipe(u1, u2, SwipeAction::Dislike).await);
        assert!(matches!(err, GatewayError::DuplicateSwipe));
        let err = assert_err!(fx.service.swipe(u1, u1, SwipeAction::Like).await);
        assert!(matches!(err, GatewayError::InvalidTarget));
    }

    #[tokio::test]
    async fn unmatched_pair_is_not_reactivated() {
        let fx = fixture();
        let (u1, u2) = (UserId::new(), UserId::new());
        let _ = assert_ok!(fx.service.swipe(u1, u2, SwipeAction::Like).await);
        let outcome = assert_ok!(fx.service.swipe(u2, u1, SwipeAction::Like).await);
        let Some(record) = outcome.active_match().cloned() else {
            panic!("expected a match");
        };
        let _ = assert_ok!(fx.service.unmatch(record.id, u1).await);

        let again = assert_ok!(fx.service.resolve_after_swipe(u2, u1).await);
        assert!(matches!(again, Resolution::Inactive(ref r) if r.id == record.id));
        assert!(!again.is_match());
        assert!(assert_ok!(fx.service.matches_for(u1).await).is_empty());
    }

    #[tokio::test]
    async fn unmatch_checks_existence_and_participation() {
        let fx = fixture();
        let (u1, u2) = (UserId::new(), UserId::new());
        let err = assert_err!(fx.service.unmatch(MatchId::new(), u1).await);
        assert!(matches!(err, GatewayError::MatchNotFound(_)));

        let _ = assert_ok!(fx.service.swipe(u1, u2, SwipeAction::Like).await);
        let outcome = assert_ok!(fx.service.swipe(u2, u1, SwipeAction::Like).await);
        let Some(record) = outcome.active_match() else {
            panic!("expected a match");
        };
        let err = assert_err!(fx.service.unmatch(record.id, UserId::new()).await);
        assert!(matches!(err, GatewayError::Forbidden));
    }

    #[tokio::test]
    async fn new_match_is_pushed_to_online_participants() {
        let fx = fixture();
        let (u1, u2) = (UserId::new(), UserId::new());
        let conn = ConnectionId::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        fx.rooms.register(conn, u1, tx).await;
        let _ = assert_ok!(fx.presence.connect(u1, conn).await);
        let _ = rx.try_recv();

        let _ = assert_ok!(fx.service.swipe(u1, u2, SwipeAction::Like).await);
        let outcome = assert_ok!(fx.service.swipe(u2, u1, SwipeAction::Like).await);
        let Some(record) = outcome.active_match().cloned() else {
            panic!("expected a match");
        };
        assert_eq!(rx.try_recv().ok(), Some(ChatEvent::NewMatch(record)));

        let _ = assert_ok!(fx.service.resolve_after_swipe(u1, u2).await);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn match_views_attach_partner_profile() {
        let fx = fixture();
        let (u1, u2, u3) = (UserId::new(), UserId::new(), UserId::new());
        fx.profiles
            .upsert(ProfileSummary {
                first_name: Some("Ada".to_string()),
                ..ProfileSummary::bare(u2)
            })
            .await;
        for other in [u2, u3] {
            let _ = assert_ok!(fx.service.swipe(u1, other, SwipeAction::Like).await);
            let _ = assert_ok!(fx.service.swipe(other, u1, SwipeAction::Like).await);
        }

        let views = assert_ok!(fx.service.match_views(u1).await);
        assert_eq!(views.len(), 2);
        let Some(with_profile) = views.iter().find(|v| v.partner.user_id == u2) else {
            panic!("missing u2");
        };
        assert_eq!(with_profile.partner.first_name.as_deref(), Some("Ada"));
        let Some(bare) = views.iter().find(|v| v.partner.user_id == u3) else {
            panic!("missing u3");
        };
        assert_eq!(bare.partner, ProfileSummary::bare(u3));
    }

    #[tokio::test]
    async fn likes_you_lists_positive_swipes_only() {
        let fx = fixture();
        let (me, fan, hater) = (UserId::new(), UserId::new(), UserId::new());
        let _ = assert_ok!(fx.service.swipe(fan, me, SwipeAction::Superlike).await);
        let _ = assert_ok!(fx.service.swipe(hater, me, SwipeAction::Dislike).await);

        let likes = assert_ok!(fx.service.likes_you(me).await);
        assert_eq!(likes.len(), 1);
        let Some(liker) = likes.first() else {
            panic!("expected a liker");
        };
        assert_eq!(liker.swipe.actor, fan);
        assert_eq!(liker.swipe.action, SwipeAction::Superlike);
        assert_eq!(liker.profile, None);
    }
}
