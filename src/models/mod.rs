// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Badge, BadgeStatus, BadgeTier, ChangeEvent, MatchRecord, MatchView, NewSwipe, Notice,
    NoticeVariant, Profile, ProfileCard, ProfileId, Swipe, SwipeOutcome,
};
pub use requests::{FeedQuery, SwipeRequest};
pub use responses::{
    BadgesResponse, ErrorResponse, FeedResponse, HealthResponse, MatchesResponse,
    ToggleBadgeResponse,
};
