use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identifier of a profile row
pub type ProfileId = i32;

/// Genders accepted at registration and as discovery filters
pub const GENDERS: [&str; 3] = ["male", "female", "other"];

/// Geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub long: f64,
}

/// A registered profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub age: i32,
    pub name: String,
    pub gender: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub location: Location,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Registration input, carrying the plaintext password until it is hashed
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub email: String,
    pub password: String,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub location: Location,
}

/// Swipe history stored alongside a profile.
///
/// `swiped_on` holds every profile this one has evaluated, liked or passed.
/// `swiped_yes_by` holds profiles that liked this one and are still waiting
/// for a reciprocal like.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SwipeLedger {
    pub id: ProfileId,
    #[serde(rename = "swipedOn")]
    pub swiped_on: BTreeSet<ProfileId>,
    #[serde(rename = "swipedYesBy")]
    pub swiped_yes_by: BTreeSet<ProfileId>,
}

impl SwipeLedger {
    pub fn empty(id: ProfileId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Build a ledger from the raw array columns, collapsing duplicates
    pub fn from_columns(id: ProfileId, swiped_on: Vec<ProfileId>, swiped_yes_by: Vec<ProfileId>) -> Self {
        Self {
            id,
            swiped_on: swiped_on.into_iter().collect(),
            swiped_yes_by: swiped_yes_by.into_iter().collect(),
        }
    }

    pub fn swiped_on_column(&self) -> Vec<ProfileId> {
        self.swiped_on.iter().copied().collect()
    }

    pub fn swiped_yes_by_column(&self) -> Vec<ProfileId> {
        self.swiped_yes_by.iter().copied().collect()
    }

    pub fn has_pending_like_from(&self, other: ProfileId) -> bool {
        self.swiped_yes_by.contains(&other)
    }
}

/// A mutual like between two profiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: i32,
    #[serde(rename = "user1Id")]
    pub user1_id: ProfileId,
    #[serde(rename = "user2Id")]
    pub user2_id: ProfileId,
    #[serde(rename = "matchedAt")]
    pub matched_at: chrono::DateTime<chrono::Utc>,
}

impl Match {
    /// Matches are unordered, so the pair is always stored lowest id first
    pub fn normalized_pair(a: ProfileId, b: ProfileId) -> (ProfileId, ProfileId) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    pub fn involves(&self, id: ProfileId) -> bool {
        self.user1_id == id || self.user2_id == id
    }
}

/// Login session bound to a single user
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: ProfileId,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

/// Candidate returned by discovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverProfile {
    pub id: ProfileId,
    pub age: i32,
    pub name: String,
    pub gender: String,
    #[serde(rename = "distanceFromMe")]
    pub distance_km: u32,
    #[serde(skip)]
    pub location: Location,
}

/// Discovery filters. Zero ages and an empty gender list are unbounded.
#[derive(Debug, Clone, Default)]
pub struct DiscoverFilters {
    pub min_age: i32,
    pub max_age: i32,
    pub genders: Vec<String>,
}

impl DiscoverFilters {
    pub fn accepts(&self, age: i32, gender: &str) -> bool {
        if self.min_age != 0 && age < self.min_age {
            return false;
        }
        if self.max_age != 0 && age > self.max_age {
            return false;
        }
        self.genders.is_empty() || self.genders.iter().any(|g| g == gender)
    }
}

/// Outcome of a swipe as seen by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwipeResult {
    pub matched: bool,
    pub match_id: Option<i32>,
}

impl SwipeResult {
    pub fn no_match() -> Self {
        Self {
            matched: false,
            match_id: None,
        }
    }

    pub fn matched(match_id: i32) -> Self {
        Self {
            matched: true,
            match_id: Some(match_id),
        }
    }
}
