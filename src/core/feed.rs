use std::collections::HashSet;
use std::sync::Arc;

use crate::models::{Profile, ProfileId};
use crate::services::DataProvider;

/// Default number of candidates per feed page
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Upper bound on a requested page size
pub const MAX_PAGE_SIZE: usize = 100;

/// Supplies the candidates a user has not swiped on yet
#[derive(Clone)]
pub struct FeedSupplier {
    provider: Arc<dyn DataProvider>,
    page_size: usize,
}

impl FeedSupplier {
    pub fn new(provider: Arc<dyn DataProvider>, page_size: usize) -> Self {
        Self {
            provider,
            page_size: clamp_page_size(page_size),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Candidate profiles for `profile_id`, at most one page.
    ///
    /// Read-only. Provider failures are logged and yield an empty feed; the
    /// client refetches on its own schedule.
    pub async fn fetch(&self, profile_id: ProfileId) -> Vec<Profile> {
        self.fetch_page(profile_id, self.page_size).await
    }

    /// Like [`fetch`](Self::fetch) with an explicit page size
    pub async fn fetch_page(&self, profile_id: ProfileId, limit: usize) -> Vec<Profile> {
        let limit = clamp_page_size(limit);

        let swiped = match self.provider.swiped_ids(profile_id).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!("Failed to fetch swiped ids for {}: {}", profile_id, e);
                return vec![];
            }
        };

        let mut exclude: Vec<ProfileId> = Vec::with_capacity(swiped.len() + 1);
        exclude.push(profile_id);
        exclude.extend(swiped);
        exclude.sort_unstable();
        exclude.dedup();

        let candidates = match self.provider.fetch_profiles(&exclude, limit).await {
            Ok(profiles) => profiles,
            Err(e) => {
                tracing::warn!("Failed to fetch feed for {}: {}", profile_id, e);
                return vec![];
            }
        };

        let profiles = filter_candidates(candidates, &exclude, limit);
        tracing::debug!(
            "Feed for {}: {} profiles ({} excluded)",
            profile_id,
            profiles.len(),
            exclude.len()
        );
        profiles
    }
}

/// Drop excluded ids and cap the page, keeping provider order.
///
/// Providers already apply the exclusion; this guards against one that
/// ignores part of the filter.
pub fn filter_candidates(candidates: Vec<Profile>, exclude: &[ProfileId], limit: usize) -> Vec<Profile> {
    let excluded: HashSet<&ProfileId> = exclude.iter().collect();
    candidates
        .into_iter()
        .filter(|p| !excluded.contains(&p.id))
        .take(limit)
        .collect()
}

fn clamp_page_size(size: usize) -> usize {
    size.clamp(1, MAX_PAGE_SIZE)
}
