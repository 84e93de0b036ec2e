use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::{ChangeEvent, MatchRecord, NewSwipe, Profile, ProfileCard, ProfileId, Swipe};

/// Capacity of every provider's change feed
pub const CHANGE_FEED_CAPACITY: usize = 1024;

/// Errors that can occur when talking to a data provider
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    Api(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Storage seam for profiles, swipes and matches
///
/// Every backend the service can run against implements this trait; the
/// core components only ever see `Arc<dyn DataProvider>`.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Profile id owned by an auth identity, if the profile row exists
    async fn profile_id_for_user(&self, user_id: Uuid) -> Result<Option<ProfileId>, ProviderError>;

    /// Ids of every profile `swiper_id` has liked or disliked
    async fn swiped_ids(&self, swiper_id: ProfileId) -> Result<Vec<ProfileId>, ProviderError>;

    /// Profiles not in `exclude`, at most `limit` of them, in provider order
    async fn fetch_profiles(
        &self,
        exclude: &[ProfileId],
        limit: usize,
    ) -> Result<Vec<Profile>, ProviderError>;

    async fn insert_swipe(&self, swipe: &NewSwipe) -> Result<Swipe, ProviderError>;

    /// The like `swiped_id` gave `swiper_id`, if any
    async fn query_reciprocal_swipe(
        &self,
        swiper_id: ProfileId,
        swiped_id: ProfileId,
    ) -> Result<Option<Swipe>, ProviderError>;

    /// Store the match for an unordered pair; returns the existing row if present
    async fn upsert_match(&self, a: ProfileId, b: ProfileId) -> Result<MatchRecord, ProviderError>;

    /// Matches where `profile_id` is either side
    async fn fetch_matches(&self, profile_id: ProfileId) -> Result<Vec<MatchRecord>, ProviderError>;

    /// Public cards for the given profiles; missing ids are simply absent
    async fn profile_cards(&self, ids: &[ProfileId]) -> Result<Vec<ProfileCard>, ProviderError>;

    /// Subscribe to swipe and match changes
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;

    async fn health_check(&self) -> Result<bool, ProviderError>;
}
