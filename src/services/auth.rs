use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use super::cache::{CacheKey, CacheManager};
use super::provider::{DataProvider, ProviderError};
use crate::models::ProfileId;

/// Errors raised while establishing who is calling
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid session token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Session subject is not a user id: {0}")]
    InvalidSubject(String),
}

/// Claims issued by the auth backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub aud: Option<String>,
}

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub email: Option<String>,
}

/// Validates HS256 session tokens signed with the backend's shared secret
#[derive(Clone)]
pub struct SessionVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    pub fn new(secret: &str, audience: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify an `Authorization` header value
    pub fn verify_header(&self, header: Option<&str>) -> Result<CurrentUser, AuthError> {
        let token = header
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        self.verify(token)
    }

    pub fn verify(&self, token: &str) -> Result<CurrentUser, AuthError> {
        let data = decode::<SessionClaims>(token, &self.key, &self.validation)?;
        let user_id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| AuthError::InvalidSubject(data.claims.sub.clone()))?;

        Ok(CurrentUser {
            user_id,
            email: data.claims.email,
        })
    }
}

/// Resolves an auth identity to its profile row, with a cache in front
pub struct ProfileDirectory {
    provider: Arc<dyn DataProvider>,
    cache: Arc<CacheManager>,
}

impl ProfileDirectory {
    pub fn new(provider: Arc<dyn DataProvider>, cache: Arc<CacheManager>) -> Self {
        Self { provider, cache }
    }

    /// `None` when the user has no profile yet. Only hits are cached, so a
    /// profile created later is picked up on the next call.
    pub async fn resolve(&self, user: &CurrentUser) -> Result<Option<ProfileId>, ProviderError> {
        let key = CacheKey::profile_id(user.user_id);
        if let Ok(id) = self.cache.get::<ProfileId>(&key).await {
            return Ok(Some(id));
        }

        let resolved = self.provider.profile_id_for_user(user.user_id).await?;
        if let Some(id) = resolved {
            if let Err(e) = self.cache.set(&key, &id).await {
                tracing::warn!("Failed to cache profile id for {}: {}", user.user_id, e);
            }
        } else {
            tracing::debug!("No profile row for user {}", user.user_id);
        }

        Ok(resolved)
    }
}
