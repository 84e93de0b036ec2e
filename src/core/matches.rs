use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::models::{MatchView, ProfileCard, ProfileId};
use crate::services::{DataProvider, ProviderError};

/// Lists a user's matches joined with the counterpart's public card
#[derive(Clone)]
pub struct MatchLister {
    provider: Arc<dyn DataProvider>,
}

impl MatchLister {
    pub fn new(provider: Arc<dyn DataProvider>) -> Self {
        Self { provider }
    }

    /// Matches for `profile_id`, newest first
    pub async fn list(&self, profile_id: ProfileId) -> Result<Vec<MatchView>, ProviderError> {
        let records = self.provider.fetch_matches(profile_id).await?;
        if records.is_empty() {
            return Ok(vec![]);
        }

        let mut counterparts: Vec<ProfileId> = records.iter().map(|r| r.counterpart(profile_id)).collect();
        counterparts.sort_unstable();
        counterparts.dedup();

        // A missing card degrades to "Unknown" rather than failing the list
        let cards: HashMap<ProfileId, ProfileCard> = match self.provider.profile_cards(&counterparts).await {
            Ok(cards) => cards.into_iter().map(|c| (c.id, c)).collect(),
            Err(e) => {
                tracing::warn!("Failed to fetch match profiles for {}: {}", profile_id, e);
                HashMap::new()
            }
        };

        let mut views: Vec<MatchView> = records
            .into_iter()
            .map(|record| {
                let other = record.counterpart(profile_id);
                MatchView {
                    id: record.id,
                    matched_profile: cards.get(&other).cloned().unwrap_or_else(|| ProfileCard::unknown(other)),
                    created_at: record.created_at,
                }
            })
            .collect();

        sort_matches(&mut views);
        Ok(views)
    }

    /// Start a live view of `profile_id`'s matches.
    ///
    /// Every change touching the user triggers a full refetch. A failed
    /// refetch keeps the previous list.
    pub async fn watch(&self, profile_id: ProfileId) -> MatchWatcher {
        // Subscribe before the first fetch so nothing slips in between
        let mut changes = self.provider.subscribe();

        let initial = match self.list(profile_id).await {
            Ok(views) => views,
            Err(e) => {
                tracing::warn!("Initial match fetch failed for {}: {}", profile_id, e);
                vec![]
            }
        };

        let (tx, rx) = watch::channel(initial);
        let lister = self.clone();

        let task = tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(event) if !event.concerns(profile_id) => continue,
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!("Match watcher for {} lagged by {} changes", profile_id, skipped);
                    }
                    Err(RecvError::Closed) => break,
                }

                match lister.list(profile_id).await {
                    Ok(views) => {
                        if tx.send(views).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Match refetch failed for {}, keeping previous list: {}", profile_id, e);
                    }
                }
            }
            tracing::debug!("Match watcher for {} stopped", profile_id);
        });

        MatchWatcher { rx, task }
    }
}

/// Newest first; ties broken by counterpart id for a stable order
pub fn sort_matches(views: &mut [MatchView]) {
    views.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.matched_profile.id.cmp(&b.matched_profile.id))
    });
}

/// Live match list. Dropping it stops the background refetch task.
pub struct MatchWatcher {
    rx: watch::Receiver<Vec<MatchView>>,
    task: JoinHandle<()>,
}

impl MatchWatcher {
    /// Latest known list
    pub fn current(&self) -> Vec<MatchView> {
        self.rx.borrow().clone()
    }

    /// Wait for the next recomputed list
    pub async fn changed(&mut self) -> Result<Vec<MatchView>, watch::error::RecvError> {
        self.rx.changed().await?;
        Ok(self.rx.borrow_and_update().clone())
    }
}

impl Drop for MatchWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewSwipe, Profile};
    use crate::services::InMemoryProvider;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn view(created_offset_secs: i64) -> MatchView {
        MatchView {
            id: Uuid::new_v4(),
            matched_profile: ProfileCard::unknown(Uuid::new_v4()),
            created_at: Utc::now() + Duration::seconds(created_offset_secs),
        }
    }

    fn profile(name: &str) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            display_name: name.to_string(),
            age: Some(22),
            bio: Some("Hi".to_string()),
            profile_image_url: None,
            location: None,
            interests: None,
            created_at: None,
        }
    }

    #[test]
    fn test_sort_newest_first() {
        let mut views = vec![view(-100), view(0), view(-50)];
        sort_matches(&mut views);
        assert!(views[0].created_at >= views[1].created_at);
        assert!(views[1].created_at >= views[2].created_at);
    }

    #[tokio::test]
    async fn test_list_joins_cards_and_unknown() {
        let provider = Arc::new(InMemoryProvider::new());
        let me = profile("Me");
        let known = profile("Known");
        provider.add_profile(me.clone()).await;
        provider.add_profile(known.clone()).await;
        let ghost = Uuid::new_v4();

        provider.upsert_match(me.id, known.id).await.unwrap();
        provider.upsert_match(me.id, ghost).await.unwrap();

        let views = MatchLister::new(provider).list(me.id).await.unwrap();
        assert_eq!(views.len(), 2);

        let names: Vec<&str> = views.iter().map(|v| v.matched_profile.display_name.as_str()).collect();
        assert!(names.contains(&"Known"));
        assert!(names.contains(&"Unknown"));
    }

    #[tokio::test]
    async fn test_watcher_keeps_previous_list_on_failure() {
        let provider = Arc::new(InMemoryProvider::new());
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        provider.upsert_match(a, b).await.unwrap();

        let lister = MatchLister::new(provider.clone());
        let watcher = lister.watch(a).await;
        assert_eq!(watcher.current().len(), 1);

        provider.set_unavailable(true);
        // Fails before publishing, so nothing changes
        assert!(provider
            .insert_swipe(&NewSwipe { swiper_id: a, swiped_id: b, is_like: true })
            .await
            .is_err());
        assert_eq!(watcher.current().len(), 1);
    }

    #[tokio::test]
    async fn test_watcher_updates_on_match() {
        let provider = Arc::new(InMemoryProvider::new());
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        let lister = MatchLister::new(provider.clone());
        let mut watcher = lister.watch(a).await;
        assert!(watcher.current().is_empty());

        provider.upsert_match(a, b).await.unwrap();

        let updated = tokio::time::timeout(std::time::Duration::from_secs(2), watcher.changed())
            .await
            .expect("watcher did not update")
            .unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].matched_profile.id, b);
    }
}
