//! Session resolution against the hosted auth backend
//!
//! The backend issues HS256 JWTs to signed-in users. A request is resolved
//! once into a [`Session`]: either anonymous, or authenticated with the
//! user's id and (optionally) display name.

use crate::config::AuthConfig;
use crate::errors::{AppError, Result};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Who is making the request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Session {
    Anonymous,
    Authenticated {
        user_id: Uuid,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display_name: Option<String>,
    },
}

impl Session {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { user_id, .. } => Some(*user_id),
        }
    }

    /// Require a signed-in user, returning their id
    pub fn require_user(&self) -> Result<Uuid> {
        self.user_id().ok_or_else(|| AppError::Unauthorized {
            message: "Please log in to continue.".to_string(),
        })
    }

    pub fn with_display_name(self, name: Option<String>) -> Self {
        match self {
            Session::Anonymous => Session::Anonymous,
            Session::Authenticated { user_id, display_name } => Session::Authenticated {
                user_id,
                display_name: name.or(display_name),
            },
        }
    }
}

/// Claims carried by the backend's access tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,

    /// Audience
    pub aud: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: i64,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

/// Validates access tokens and turns them into sessions
pub struct SessionVerifier {
    keys: Option<(EncodingKey, DecodingKey)>,
    validation: Validation,
    audience: String,
}

impl SessionVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let keys = config.jwt_secret.as_ref().map(|secret| {
            (
                EncodingKey::from_secret(secret.as_bytes()),
                DecodingKey::from_secret(secret.as_bytes()),
            )
        });

        if keys.is_none() {
            tracing::warn!("No JWT secret configured, all requests are anonymous");
        }

        let mut validation = Validation::default();
        validation.set_audience(&[config.jwt_audience.as_str()]);

        Self {
            keys,
            validation,
            audience: config.jwt_audience.clone(),
        }
    }

    /// Validate a bearer token
    pub fn verify(&self, token: &str) -> Result<Session> {
        let Some((_, decoding_key)) = &self.keys else {
            return Ok(Session::Anonymous);
        };

        let claims = decode::<SessionClaims>(token, decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::ExpiredToken,
                _ => AppError::Unauthorized {
                    message: "Invalid session token".to_string(),
                },
            })?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthorized {
            message: "Invalid session token".to_string(),
        })?;

        let display_name = claims
            .user_metadata
            .get("display_name")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(String::from);

        Ok(Session::Authenticated { user_id, display_name })
    }

    /// Resolve the session from request headers
    pub fn resolve(&self, headers: &HeaderMap) -> Result<Session> {
        let Some(header) = headers.get(AUTHORIZATION) else {
            return Ok(Session::Anonymous);
        };

        let header = header.to_str().map_err(|_| AppError::Unauthorized {
            message: "Invalid Authorization header".to_string(),
        })?;

        match extract_bearer(header) {
            Some(token) => self.verify(token),
            None => Err(AppError::Unauthorized {
                message: "Invalid Authorization header".to_string(),
            }),
        }
    }

    /// Issue a token the same way the auth backend does (local tooling and tests)
    pub fn issue(&self, user_id: Uuid, display_name: Option<&str>, ttl_secs: i64) -> Result<String> {
        let Some((encoding_key, _)) = &self.keys else {
            return Err(AppError::Configuration {
                message: "JWT secret not configured".to_string(),
            });
        };

        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            aud: self.audience.clone(),
            exp: now + ttl_secs,
            iat: now,
            email: None,
            user_metadata: serde_json::json!({ "display_name": display_name }),
        };

        encode(&Header::default(), &claims, encoding_key).map_err(|e| AppError::Internal {
            message: format!("Failed to issue token: {}", e),
        })
    }
}

/// Extract the token from a `Bearer` Authorization header
pub fn extract_bearer(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Axum extractor for Session
impl<S> FromRequestParts<S> for Session
where
    Arc<SessionVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let verifier = Arc::<SessionVerifier>::from_ref(state);
        verifier.resolve(&parts.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn verifier() -> SessionVerifier {
        SessionVerifier::new(&AuthConfig {
            jwt_secret: Some("test_secret".to_string()),
            jwt_audience: "authenticated".to_string(),
        })
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer("Bearer "), None);
        assert_eq!(extract_bearer("Basic abc"), None);
    }

    #[test]
    fn test_token_roundtrip() {
        let verifier = verifier();
        let user_id = Uuid::new_v4();

        let token = verifier.issue(user_id, Some("Ada"), 3600).unwrap();
        let session = verifier.verify(&token).unwrap();

        assert_eq!(
            session,
            Session::Authenticated {
                user_id,
                display_name: Some("Ada".to_string()),
            }
        );
    }

    #[test]
    fn test_missing_header_is_anonymous() {
        let session = verifier().resolve(&HeaderMap::new()).unwrap();
        assert_eq!(session, Session::Anonymous);
        assert!(session.require_user().is_err());
    }

    #[test]
    fn test_bad_token_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer not-a-jwt"));

        let err = verifier().resolve(&headers).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_expired_token() {
        let verifier = verifier();
        let token = verifier.issue(Uuid::new_v4(), None, -3600).unwrap();
        assert!(matches!(verifier.verify(&token), Err(AppError::ExpiredToken)));
    }

    #[test]
    fn test_no_secret_means_anonymous() {
        let verifier = SessionVerifier::new(&AuthConfig::default());
        assert_eq!(verifier.verify("anything").unwrap(), Session::Anonymous);
    }

    #[test]
    fn test_session_json_shape() {
        let user_id = Uuid::nil();
        let json = serde_json::to_value(Session::Authenticated {
            user_id,
            display_name: None,
        })
        .unwrap();
        assert_eq!(json["authenticated"]["userId"], user_id.to_string());

        let json = serde_json::to_value(Session::Anonymous).unwrap();
        assert_eq!(json, "anonymous");
    }
}
