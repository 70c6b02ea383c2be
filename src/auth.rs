//! Bearer token authentication.
//!
//! Tokens are issued by the login collaborator; this crate only decodes
//! them. [`AuthUser`] is the axum extractor for HTTP handlers, the
//! WebSocket handler calls [`Authenticator::authenticate`] directly before
//! upgrading.

use std::fmt::Debug;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::domain::UserId;
use crate::error::GatewayError;

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Caller's user id.
    pub user_id: UserId,
    /// E-mail address or phone number the account was registered with.
    pub contact: String,
    /// `true` once the account completed OTP verification.
    pub verified: bool,
}

/// Turns a bearer token into an [`Identity`].
pub trait Authenticator: Send + Sync + Debug {
    /// Validates `token`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unauthenticated`] when the token is malformed,
    /// badly signed or expired.
    fn authenticate(&self, token: &str) -> Result<Identity, GatewayError>;
}

/// JWT claims carried by access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: Uuid,
    /// Registered e-mail or phone.
    #[serde(default)]
    pub contact: String,
    /// Verification flag.
    #[serde(default)]
    pub verified: bool,
    /// Expiry, seconds since the epoch.
    pub exp: usize,
}

/// HS256 JWT authenticator.
pub struct JwtAuthenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Debug for JwtAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuthenticator")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

impl JwtAuthenticator {
    /// Creates an authenticator for the shared `secret`.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Signs a token for `identity` valid for `ttl`. Used by tooling and
    /// tests; production tokens come from the login service.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] if signing fails.
    pub fn issue(&self, identity: &Identity, ttl: chrono::Duration) -> Result<String, GatewayError> {
        let exp = (chrono::Utc::now() + ttl).timestamp();
        let claims = Claims {
            sub: *identity.user_id.as_uuid(),
            contact: identity.contact.clone(),
            verified: identity.verified,
            exp: usize::try_from(exp).unwrap_or_default(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| GatewayError::Internal(format!("token signing failed: {e}")))
    }
}

impl Authenticator for JwtAuthenticator {
    fn authenticate(&self, token: &str) -> Result<Identity, GatewayError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            GatewayError::Unauthenticated("invalid or expired token".to_string())
        })?;
        Ok(Identity {
            user_id: UserId::from_uuid(data.claims.sub),
            contact: data.claims.contact,
            verified: data.claims.verified,
        })
    }
}

/// Token from an `Authorization: Bearer <token>` header.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authenticates `token` and requires a verified account.
///
/// # Errors
///
/// Returns [`GatewayError::Unauthenticated`] for a missing or invalid token
/// and [`GatewayError::Unverified`] for an unverified account.
pub fn verified_identity(
    authenticator: &dyn Authenticator,
    token: Option<&str>,
) -> Result<Identity, GatewayError> {
    let token =
        token.ok_or_else(|| GatewayError::Unauthenticated("missing bearer token".to_string()))?;
    let identity = authenticator.authenticate(token)?;
    if !identity.verified {
        return Err(GatewayError::Unverified);
    }
    Ok(identity)
}

/// Verified caller of an HTTP handler.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        verified_identity(state.authenticator.as_ref(), bearer_token(&parts.headers)).map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn identity(verified: bool) -> Identity {
        Identity {
            user_id: UserId::new(),
            contact: "ada@example.com".to_string(),
            verified,
        }
    }

    #[test]
    fn issued_token_round_trips() {
        let auth = JwtAuthenticator::new("secret");
        let me = identity(true);
        let Ok(token) = auth.issue(&me, chrono::Duration::hours(1)) else {
            panic!("signing failed");
        };
        assert_eq!(auth.authenticate(&token).ok(), Some(me));
    }

    #[test]
    fn wrong_secret_is_unauthenticated() {
        let Ok(token) = JwtAuthenticator::new("a").issue(&identity(true), chrono::Duration::hours(1))
        else {
            panic!("signing failed");
        };
        let result = JwtAuthenticator::new("b").authenticate(&token);
        assert!(matches!(result, Err(GatewayError::Unauthenticated(_))));
    }

    #[test]
    fn expired_token_is_unauthenticated() {
        let auth = JwtAuthenticator::new("secret");
        let Ok(token) = auth.issue(&identity(true), chrono::Duration::hours(-2)) else {
            panic!("signing failed");
        };
        assert!(matches!(
            auth.authenticate(&token),
            Err(GatewayError::Unauthenticated(_))
        ));
    }

    #[test]
    fn unverified_identity_is_refused() {
        let auth = JwtAuthenticator::new("secret");
        let Ok(token) = auth.issue(&identity(false), chrono::Duration::hours(1)) else {
            panic!("signing failed");
        };
        assert!(matches!(
            verified_identity(&auth, Some(&token)),
            Err(GatewayError::Unverified)
        ));
        assert!(matches!(
            verified_identity(&auth, None),
            Err(GatewayError::Unauthenticated(_))
        ));
    }

    #[test]
    fn bearer_token_requires_scheme() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));
    }
}
