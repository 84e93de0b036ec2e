// Route exports
pub mod badges;
pub mod feed;
pub mod matches;

use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse, Responder, ResponseError};
use std::sync::Arc;
use thiserror::Error;

use crate::core::{BadgeSessions, FeedSupplier, MatchLister, SwipeRecorder};
use crate::models::{ErrorResponse, HealthResponse, ProfileId};
use crate::services::{
    AuthError, CacheManager, CurrentUser, DataProvider, ProfileDirectory, ProviderError, SessionVerifier,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn DataProvider>,
    pub sessions: Arc<SessionVerifier>,
    pub profiles: Arc<ProfileDirectory>,
    pub feed: FeedSupplier,
    pub swipes: SwipeRecorder,
    pub matches: MatchLister,
    pub badges: BadgeSessions,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn DataProvider>,
        sessions: SessionVerifier,
        cache: Arc<CacheManager>,
        feed_page_size: usize,
        badges: BadgeSessions,
    ) -> Self {
        Self {
            profiles: Arc::new(ProfileDirectory::new(provider.clone(), cache)),
            feed: FeedSupplier::new(provider.clone(), feed_page_size),
            swipes: SwipeRecorder::new(provider.clone()),
            matches: MatchLister::new(provider.clone()),
            sessions: Arc::new(sessions),
            badges,
            provider,
        }
    }

    /// Verify the caller's session token
    pub fn authenticate(&self, req: &HttpRequest) -> Result<CurrentUser, ApiError> {
        let header = req
            .headers()
            .get(actix_web::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        self.sessions.verify_header(header).map_err(|e| {
            tracing::debug!("Rejected request to {}: {}", req.path(), e);
            ApiError::from(e)
        })
    }

    /// Authenticated caller and their profile id, if the profile exists
    pub async fn caller(&self, req: &HttpRequest) -> Result<(CurrentUser, Option<ProfileId>), ApiError> {
        let user = self.authenticate(req)?;
        let profile_id = self.profiles.resolve(&user).await?;
        Ok((user, profile_id))
    }
}

/// Errors returned by the HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(#[from] AuthError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "unauthenticated",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::NotFound(_) => "not_found",
            ApiError::Provider(_) => "provider_error",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Provider(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // Provider details stay in the logs
        let message = match self {
            ApiError::Provider(e) => {
                tracing::error!("Provider error: {}", e);
                "Backend request failed".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: self.code().to_string(),
            message,
            status_code: status.as_u16(),
        })
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(feed::configure)
            .configure(matches::configure)
            .configure(badges::configure),
    );
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let healthy = state.provider.health_check().await.unwrap_or(false);
    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}
