//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::auth::Authenticator;
use crate::persistence::Stores;
use crate::service::{ChatService, MatchService, PresenceService};
use crate::ws::presence::InMemoryPresence;
use crate::ws::rooms::RoomRegistry;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Swipes, match resolution and match queries.
    pub match_service: Arc<MatchService>,
    /// Room routing and message log.
    pub chat_service: Arc<ChatService>,
    /// Connection lifecycle and presence fan-out.
    pub presence_service: Arc<PresenceService>,
    /// Live connections and room membership.
    pub rooms: Arc<RoomRegistry>,
    /// Bearer token verification.
    pub authenticator: Arc<dyn Authenticator>,
}

impl AppState {
    /// Wires the service graph over `stores` with an in-process presence
    /// table.
    #[must_use]
    pub fn new(stores: Stores, authenticator: Arc<dyn Authenticator>) -> Self {
        let rooms = Arc::new(RoomRegistry::new());
        let presence_service = Arc::new(PresenceService::new(
            Arc::new(InMemoryPresence::new()),
            Arc::clone(&stores.matches),
            Arc::clone(&rooms),
        ));
        let match_service = Arc::new(MatchService::new(
            Arc::clone(&stores.swipes),
            Arc::clone(&stores.matches),
            Arc::clone(&stores.profiles),
            Arc::clone(&presence_service),
        ));
        let chat_service = Arc::new(ChatService::new(
            Arc::clone(&stores.matches),
            Arc::clone(&stores.messages),
            Arc::clone(&rooms),
        ));

        Self {
            match_service,
            chat_service,
            presence_service,
            rooms,
            authenticator,
        }
    }
}
