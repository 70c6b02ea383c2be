//! OpenAPI document for the REST surface.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::handlers::{likes, matches, messages, system};

/// Aggregated OpenAPI description of every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "rendezvous-gateway",
        description = "Swipe, match and chat history endpoints. Real-time chat runs over the `/ws` WebSocket."
    ),
    paths(
        system::health_handler,
        likes::send_like,
        likes::send_super_like,
        likes::pass,
        likes::likes_you,
        matches::list_matches,
        matches::unmatch,
        messages::list_rooms,
        messages::get_messages,
    ),
    components(schemas(crate::error::ErrorResponse)),
    modifiers(&BearerAuth),
    tags(
        (name = "System", description = "Liveness"),
        (name = "Likes", description = "Swipes and incoming likes"),
        (name = "Matches", description = "Active matches"),
        (name = "Messages", description = "Chat history"),
    )
)]
pub struct ApiDoc;

#[derive(Debug)]
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
