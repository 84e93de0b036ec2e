use std::sync::Arc;

use crate::models::{NewSwipe, Notice, ProfileId, SwipeOutcome};
use crate::services::DataProvider;

/// Records swipe decisions and detects mutual likes
#[derive(Clone)]
pub struct SwipeRecorder {
    provider: Arc<dyn DataProvider>,
}

impl SwipeRecorder {
    pub fn new(provider: Arc<dyn DataProvider>) -> Self {
        Self { provider }
    }

    /// Record `swiper_id`'s decision on `swiped_id`.
    ///
    /// The insert completes before the reciprocity check runs. A failed insert
    /// is reported as not recorded with a generic notice; nothing is retried
    /// or rolled back. Two users liking each other at the same moment may
    /// both be told they matched; the match row itself stays unique.
    pub async fn record(&self, swiper_id: ProfileId, swiped_id: ProfileId, is_like: bool) -> SwipeOutcome {
        let swipe = NewSwipe {
            swiper_id,
            swiped_id,
            is_like,
        };

        if let Err(e) = self.provider.insert_swipe(&swipe).await {
            tracing::error!("Failed to record swipe {} -> {}: {}", swiper_id, swiped_id, e);
            return SwipeOutcome {
                recorded: false,
                matched: false,
                notice: Some(Notice::swipe_failed()),
            };
        }

        tracing::debug!("Recorded swipe {} -> {} (like: {})", swiper_id, swiped_id, is_like);

        if !is_like || swiper_id == swiped_id {
            return not_matched();
        }

        let reciprocal = match self.provider.query_reciprocal_swipe(swiper_id, swiped_id).await {
            Ok(found) => found,
            Err(e) => {
                tracing::error!("Reciprocity check failed for {} -> {}: {}", swiper_id, swiped_id, e);
                return recorded_with_error();
            }
        };

        if reciprocal.is_none() {
            return not_matched();
        }

        match self.provider.upsert_match(swiper_id, swiped_id).await {
            Ok(record) => {
                tracing::info!("Match {} between {} and {}", record.id, record.user1_id, record.user2_id);
                SwipeOutcome {
                    recorded: true,
                    matched: true,
                    notice: Some(Notice::matched()),
                }
            }
            Err(e) => {
                tracing::error!("Failed to store match {} / {}: {}", swiper_id, swiped_id, e);
                recorded_with_error()
            }
        }
    }
}

fn not_matched() -> SwipeOutcome {
    SwipeOutcome {
        recorded: true,
        matched: false,
        notice: None,
    }
}

fn recorded_with_error() -> SwipeOutcome {
    SwipeOutcome {
        recorded: true,
        matched: false,
        notice: Some(Notice::swipe_failed()),
    }
}
