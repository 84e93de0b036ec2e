use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a profile row (not the auth identity)
pub type ProfileId = Uuid;

/// Dating profile as stored by the data provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub user_id: Uuid,
    pub display_name: String,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub interests: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Profile {
    /// Public projection shown to a match counterpart
    pub fn card(&self) -> ProfileCard {
        ProfileCard {
            id: self.id,
            display_name: self.display_name.clone(),
            profile_image_url: self.profile_image_url.clone(),
            age: self.age,
            bio: self.bio.clone(),
        }
    }
}

/// Public profile fields joined onto a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileCard {
    pub id: ProfileId,
    pub display_name: String,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl ProfileCard {
    /// Placeholder for a counterpart whose profile row is gone
    pub fn unknown(id: ProfileId) -> Self {
        Self {
            id,
            display_name: "Unknown".to_string(),
            profile_image_url: None,
            age: None,
            bio: None,
        }
    }
}

/// Swipe to be inserted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSwipe {
    pub swiper_id: ProfileId,
    pub swiped_id: ProfileId,
    pub is_like: bool,
}

/// Persisted swipe decision, immutable once written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swipe {
    pub id: Uuid,
    pub swiper_id: ProfileId,
    pub swiped_id: ProfileId,
    pub is_like: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Stored mutual match. `user1_id` is always the smaller id of the pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: Uuid,
    pub user1_id: ProfileId,
    pub user2_id: ProfileId,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl MatchRecord {
    /// Normalize an unordered pair so `(a, b)` and `(b, a)` share one key
    pub fn ordered_pair(a: ProfileId, b: ProfileId) -> (ProfileId, ProfileId) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    pub fn involves(&self, id: ProfileId) -> bool {
        self.user1_id == id || self.user2_id == id
    }

    /// The other side of the pair, from `id`'s point of view
    pub fn counterpart(&self, id: ProfileId) -> ProfileId {
        if self.user1_id == id {
            self.user2_id
        } else {
            self.user1_id
        }
    }
}

/// Match as seen by one of its participants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchView {
    pub id: Uuid,
    #[serde(rename = "matchedProfile")]
    pub matched_profile: ProfileCard,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Change notification published by a data provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    SwipeInserted {
        swiper_id: ProfileId,
        swiped_id: ProfileId,
        is_like: bool,
    },
    MatchCreated {
        user1_id: ProfileId,
        user2_id: ProfileId,
    },
}

impl ChangeEvent {
    /// Whether a listener for `id` should recompute its matches
    pub fn concerns(&self, id: ProfileId) -> bool {
        match self {
            ChangeEvent::SwipeInserted { swiper_id, swiped_id, .. } => {
                *swiper_id == id || *swiped_id == id
            }
            ChangeEvent::MatchCreated { user1_id, user2_id } => *user1_id == id || *user2_id == id,
        }
    }
}

/// Visual style of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeVariant {
    Default,
    Destructive,
}

/// Message the client surfaces to the user after an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
}

impl Notice {
    pub fn matched() -> Self {
        Self {
            title: "It's a Match! 🎉".to_string(),
            description: "You can now start chatting!".to_string(),
            variant: NoticeVariant::Default,
        }
    }

    pub fn swipe_failed() -> Self {
        Self {
            title: "Error".to_string(),
            description: "Unable to process swipe. Please try again.".to_string(),
            variant: NoticeVariant::Destructive,
        }
    }
}

/// Result of recording a swipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwipeOutcome {
    pub recorded: bool,
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

/// Achievement tier, in ascending rarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Legendary,
    Mythic,
}

impl BadgeTier {
    /// Display style class for the tier label
    pub fn style(&self) -> &'static str {
        match self {
            BadgeTier::Bronze => "bg-orange-600 text-orange-100",
            BadgeTier::Silver => "bg-gray-400 text-gray-900",
            BadgeTier::Gold => "bg-yellow-500 text-yellow-900",
            BadgeTier::Platinum => "bg-purple-600 text-purple-100",
            BadgeTier::Diamond => "bg-blue-600 text-blue-100",
            BadgeTier::Legendary => "bg-red-600 text-red-100",
            BadgeTier::Mythic => "bg-gradient-to-r from-purple-600 to-pink-600 text-white",
        }
    }
}

/// Static catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "requiredMatches", alias = "required_matches", alias = "requiredmatches")]
    pub required_matches: u32,
    pub tier: BadgeTier,
    pub icon: String,
}

/// Catalog entry crossed with a user's match count and session toggles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeStatus {
    #[serde(flatten)]
    pub badge: Badge,
    #[serde(rename = "tierStyle")]
    pub tier_style: String,
    pub unlocked: bool,
    /// Matches still needed, zero once unlocked
    #[serde(rename = "matchesRemaining")]
    pub matches_remaining: u32,
    /// Whole percent towards the threshold, capped at 100
    #[serde(rename = "progressPercent")]
    pub progress_percent: u8,
    #[serde(rename = "displayOnProfile")]
    pub display_on_profile: bool,
}
