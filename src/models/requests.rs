use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request to record a swipe decision
///
/// The swiper is always the caller's own profile, resolved from the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeRequest {
    #[serde(alias = "swiped_id", rename = "swipedId")]
    pub swiped_id: Uuid,
    #[serde(alias = "is_like", rename = "isLike")]
    pub is_like: bool,
}

/// Optional query for the feed endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FeedQuery {
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u16>,
}
