// Core exports
pub mod badges;
pub mod feed;
pub mod matches;
pub mod swipes;

pub use badges::{default_catalog, evaluate, validate_catalog, BadgeBoard, BadgeSessions, CatalogError};
pub use feed::{filter_candidates, FeedSupplier, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use matches::{sort_matches, MatchLister, MatchWatcher};
pub use swipes::SwipeRecorder;
