use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use super::provider::{DataProvider, ProviderError, CHANGE_FEED_CAPACITY};
use crate::models::{ChangeEvent, MatchRecord, NewSwipe, Profile, ProfileCard, ProfileId, Swipe};

#[derive(Default)]
struct State {
    profiles: Vec<Profile>,
    swipes: Vec<Swipe>,
    matches: HashMap<(ProfileId, ProfileId), MatchRecord>,
}

/// Process-local data provider
///
/// Used by the test suites and for `provider.kind = "memory"` development
/// runs. Profiles keep insertion order, which stands in for provider order.
pub struct InMemoryProvider {
    state: RwLock<State>,
    changes: broadcast::Sender<ChangeEvent>,
    unavailable: AtomicBool,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            state: RwLock::new(State::default()),
            changes,
            unavailable: AtomicBool::new(false),
        }
    }

    /// Seed a profile row, as the external profile flows would
    pub async fn add_profile(&self, profile: Profile) {
        let mut state = self.state.write().await;
        state.profiles.retain(|p| p.id != profile.id);
        state.profiles.push(profile);
    }

    /// Simulate an outage: every call fails while set
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), ProviderError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable("in-memory provider switched off".into()));
        }
        Ok(())
    }

    fn publish(&self, event: ChangeEvent) {
        // No subscribers is fine
        let _ = self.changes.send(event);
    }
}

impl Default for InMemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataProvider for InMemoryProvider {
    async fn profile_id_for_user(&self, user_id: Uuid) -> Result<Option<ProfileId>, ProviderError> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state.profiles.iter().find(|p| p.user_id == user_id).map(|p| p.id))
    }

    async fn swiped_ids(&self, swiper_id: ProfileId) -> Result<Vec<ProfileId>, ProviderError> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state
            .swipes
            .iter()
            .filter(|s| s.swiper_id == swiper_id)
            .map(|s| s.swiped_id)
            .collect())
    }

    async fn fetch_profiles(
        &self,
        exclude: &[ProfileId],
        limit: usize,
    ) -> Result<Vec<Profile>, ProviderError> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state
            .profiles
            .iter()
            .filter(|p| !exclude.contains(&p.id))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn insert_swipe(&self, swipe: &NewSwipe) -> Result<Swipe, ProviderError> {
        self.ensure_available()?;
        let record = Swipe {
            id: Uuid::new_v4(),
            swiper_id: swipe.swiper_id,
            swiped_id: swipe.swiped_id,
            is_like: swipe.is_like,
            created_at: chrono::Utc::now(),
        };
        self.state.write().await.swipes.push(record.clone());

        self.publish(ChangeEvent::SwipeInserted {
            swiper_id: record.swiper_id,
            swiped_id: record.swiped_id,
            is_like: record.is_like,
        });
        Ok(record)
    }

    async fn query_reciprocal_swipe(
        &self,
        swiper_id: ProfileId,
        swiped_id: ProfileId,
    ) -> Result<Option<Swipe>, ProviderError> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state
            .swipes
            .iter()
            .find(|s| s.swiper_id == swiped_id && s.swiped_id == swiper_id && s.is_like)
            .cloned())
    }

    async fn upsert_match(&self, a: ProfileId, b: ProfileId) -> Result<MatchRecord, ProviderError> {
        self.ensure_available()?;
        let key = MatchRecord::ordered_pair(a, b);

        let mut state = self.state.write().await;
        if let Some(existing) = state.matches.get(&key) {
            return Ok(existing.clone());
        }

        let record = MatchRecord {
            id: Uuid::new_v4(),
            user1_id: key.0,
            user2_id: key.1,
            created_at: chrono::Utc::now(),
        };
        state.matches.insert(key, record.clone());
        drop(state);

        self.publish(ChangeEvent::MatchCreated {
            user1_id: record.user1_id,
            user2_id: record.user2_id,
        });
        Ok(record)
    }

    async fn fetch_matches(&self, profile_id: ProfileId) -> Result<Vec<MatchRecord>, ProviderError> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state
            .matches
            .values()
            .filter(|m| m.involves(profile_id))
            .cloned()
            .collect())
    }

    async fn profile_cards(&self, ids: &[ProfileId]) -> Result<Vec<ProfileCard>, ProviderError> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state
            .profiles
            .iter()
            .filter(|p| ids.contains(&p.id))
            .map(Profile::card)
            .collect())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        Ok(!self.unavailable.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            display_name: name.to_string(),
            age: None,
            bio: None,
            profile_image_url: None,
            location: None,
            interests: None,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_match_keeps_single_row() {
        let provider = InMemoryProvider::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        let first = provider.upsert_match(a, b).await.unwrap();
        let second = provider.upsert_match(b, a).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(provider.fetch_matches(a).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_profiles_respects_exclusions_and_limit() {
        let provider = InMemoryProvider::new();
        let profiles: Vec<Profile> = (0..5).map(|i| profile(&format!("p{}", i))).collect();
        for p in &profiles {
            provider.add_profile(p.clone()).await;
        }

        let result = provider.fetch_profiles(&[profiles[0].id], 2).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, profiles[1].id);
    }

    #[tokio::test]
    async fn test_unavailable_fails_calls() {
        let provider = InMemoryProvider::new();
        provider.set_unavailable(true);
        assert!(provider.swiped_ids(Uuid::new_v4()).await.is_err());
        assert!(!provider.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_publishes_change() {
        let provider = InMemoryProvider::new();
        let mut rx = provider.subscribe();
        let swipe = NewSwipe {
            swiper_id: Uuid::new_v4(),
            swiped_id: Uuid::new_v4(),
            is_like: true,
        };
        provider.insert_swipe(&swipe).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert!(event.concerns(swipe.swiper_id));
        assert!(event.concerns(swipe.swiped_id));
    }
}
