//! Match-count achievements.
//!
//! Unlocking is a pure function of the match count and the catalog. Which
//! unlocked badges a user shows on their profile is session state only.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::models::{Badge, BadgeStatus, BadgeTier, ProfileId};

/// Catalog problems detected at startup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Badge catalog is empty")]
    Empty,

    #[error("Badge with empty id")]
    EmptyId,

    #[error("Duplicate badge id: {0}")]
    DuplicateId(String),

    #[error("Badge {0} requires fewer matches than the badge before it")]
    Unordered(String),
}

fn badge(id: &str, name: &str, description: &str, required_matches: u32, tier: BadgeTier) -> Badge {
    Badge {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        required_matches,
        tier,
        icon: format!("/badges/{}.png", id),
    }
}

/// Catalog shipped with the app
pub fn default_catalog() -> Vec<Badge> {
    vec![
        badge("first-spark", "First Spark", "Your first connection! Welcome to the club.", 50, BadgeTier::Bronze),
        badge("heat-wave", "Heat Wave", "Getting warmed up! Keep swiping.", 100, BadgeTier::Silver),
        badge("classic-charm", "Classic Charm", "Timeless appeal unlocked!", 150, BadgeTier::Gold),
        badge("rare-find", "Rare Find", "Uncommon but special, just like you!", 200, BadgeTier::Platinum),
        badge("sticky-situation", "Sticky Situation", "Making lasting connections!", 250, BadgeTier::Diamond),
        badge("forever-friend", "Forever Friend", "The bond that keeps on bonding!", 300, BadgeTier::Legendary),
        badge("legend-status", "Legend Status", "Ultimate achievement - you're legendary!", 350, BadgeTier::Mythic),
    ]
}

/// Ids must be non-empty and unique; thresholds must not decrease
pub fn validate_catalog(catalog: &[Badge]) -> Result<(), CatalogError> {
    if catalog.is_empty() {
        return Err(CatalogError::Empty);
    }

    let mut seen = HashSet::new();
    let mut previous = 0u32;
    for badge in catalog {
        if badge.id.trim().is_empty() {
            return Err(CatalogError::EmptyId);
        }
        if !seen.insert(badge.id.as_str()) {
            return Err(CatalogError::DuplicateId(badge.id.clone()));
        }
        if badge.required_matches < previous {
            return Err(CatalogError::Unordered(badge.id.clone()));
        }
        previous = badge.required_matches;
    }

    Ok(())
}

/// Cross the catalog with a match count. Display flags are all off.
pub fn evaluate(match_count: usize, catalog: &[Badge]) -> Vec<BadgeStatus> {
    catalog
        .iter()
        .map(|badge| status(badge, match_count, false))
        .collect()
}

fn status(badge: &Badge, match_count: usize, display_on_profile: bool) -> BadgeStatus {
    let count = u32::try_from(match_count).unwrap_or(u32::MAX);
    BadgeStatus {
        badge: badge.clone(),
        tier_style: badge.tier.style().to_string(),
        unlocked: count >= badge.required_matches,
        matches_remaining: badge.required_matches.saturating_sub(count),
        progress_percent: progress_percent(count, badge.required_matches),
        display_on_profile,
    }
}

fn progress_percent(count: u32, required: u32) -> u8 {
    if required == 0 {
        return 100;
    }
    let percent = u64::from(count) * 100 / u64::from(required);
    percent.min(100) as u8
}

/// One session's "display on profile" toggles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeBoard {
    displayed: BTreeSet<String>,
}

impl BadgeBoard {
    /// Flip the flag for `badge_id`. Returns the new flag, or `None` if the
    /// catalog has no such badge.
    pub fn toggle_display(&mut self, badge_id: &str, catalog: &[Badge]) -> Option<bool> {
        if !catalog.iter().any(|b| b.id == badge_id) {
            return None;
        }

        if self.displayed.remove(badge_id) {
            Some(false)
        } else {
            self.displayed.insert(badge_id.to_string());
            Some(true)
        }
    }

    pub fn is_displayed(&self, badge_id: &str) -> bool {
        self.displayed.contains(badge_id)
    }

    /// Like [`evaluate`] with this board's flags applied
    pub fn evaluate(&self, match_count: usize, catalog: &[Badge]) -> Vec<BadgeStatus> {
        catalog
            .iter()
            .map(|badge| status(badge, match_count, self.is_displayed(&badge.id)))
            .collect()
    }

    /// Badges both unlocked and flagged for display
    pub fn displayed(&self, match_count: usize, catalog: &[Badge]) -> Vec<BadgeStatus> {
        self.evaluate(match_count, catalog)
            .into_iter()
            .filter(|s| s.unlocked && s.display_on_profile)
            .collect()
    }
}

/// Per-profile boards kept for the lifetime of a session
#[derive(Clone)]
pub struct BadgeSessions {
    catalog: Arc<Vec<Badge>>,
    boards: moka::future::Cache<ProfileId, BadgeBoard>,
}

impl BadgeSessions {
    pub fn new(catalog: Vec<Badge>, max_sessions: u64, session_ttl: Duration) -> Self {
        Self {
            catalog: Arc::new(catalog),
            boards: moka::future::CacheBuilder::new(max_sessions)
                .time_to_idle(session_ttl)
                .build(),
        }
    }

    pub fn catalog(&self) -> &[Badge] {
        &self.catalog
    }

    pub async fn board(&self, profile_id: ProfileId) -> BadgeBoard {
        self.boards.get(&profile_id).await.unwrap_or_default()
    }

    /// Toggle a badge for `profile_id`; `None` for an unknown badge id
    pub async fn toggle(&self, profile_id: ProfileId, badge_id: &str) -> Option<bool> {
        if !self.catalog.iter().any(|b| b.id == badge_id) {
            return None;
        }

        let catalog = self.catalog.clone();
        let entry = self
            .boards
            .entry(profile_id)
            .and_upsert_with(|existing| {
                let mut board = existing.map(|e| e.into_value()).unwrap_or_default();
                board.toggle_display(badge_id, &catalog);
                std::future::ready(board)
            })
            .await;

        Some(entry.into_value().is_displayed(badge_id))
    }

    pub async fn statuses(&self, profile_id: ProfileId, match_count: usize) -> Vec<BadgeStatus> {
        self.board(profile_id).await.evaluate(match_count, &self.catalog)
    }

    pub async fn displayed(&self, profile_id: ProfileId, match_count: usize) -> Vec<BadgeStatus> {
        self.board(profile_id).await.displayed(match_count, &self.catalog)
    }
}
