//! Campus Match - swipe, match and badge service for a campus dating app
//!
//! The library holds the swipe/match reconciliation rule, the feed and match
//! readers built on a pluggable data provider, and the match-count badge
//! evaluator. `main.rs` wires them behind an actix-web API.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{evaluate, BadgeBoard, FeedSupplier, MatchLister, MatchWatcher, SwipeRecorder};
pub use models::{Badge, BadgeStatus, MatchView, Profile, SwipeOutcome};
pub use services::{DataProvider, InMemoryProvider, ProviderError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let catalog = crate::core::default_catalog();
        let statuses = evaluate(0, &catalog);
        assert!(statuses.iter().all(|s| !s.unlocked));
    }
}
