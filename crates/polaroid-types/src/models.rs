use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shown wherever a referenced user can no longer be resolved.
pub const UNKNOWN_USERNAME: &str = "unknown";

#[derive(Debug, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

// -- Cards --

/// Visual treatment the client applies when rendering a card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardFilter {
    #[default]
    None,
    Blur,
    Watermark,
}

impl CardFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Blur => "blur",
            Self::Watermark => "watermark",
        }
    }
}

impl FromStr for CardFilter {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "blur" => Ok(Self::Blur),
            "watermark" => Ok(Self::Watermark),
            other => Err(UnknownVariant {
                kind: "card filter",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub actor: String,
    pub title: String,
    /// Inline image payload (usually a `data:` URL) as uploaded.
    pub image_ref: String,
    pub description: String,
    pub filter: CardFilter,
    pub created_at: DateTime<Utc>,
}

/// A card as shown to someone other than its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    #[serde(flatten)]
    pub card: Card,
    pub owner_username: String,
}

// -- Swipes --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeKind {
    Like,
    Bookmark,
    Reject,
}

impl SwipeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Bookmark => "bookmark",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for SwipeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwipeKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            "bookmark" => Ok(Self::Bookmark),
            "reject" => Ok(Self::Reject),
            other => Err(UnknownVariant {
                kind: "swipe type",
                value: other.to_string(),
            }),
        }
    }
}

/// One user's current decision on one card. At most one exists per (user, card).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwipeEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub card_id: Uuid,
    #[serde(rename = "type")]
    pub kind: SwipeKind,
    pub created_at: DateTime<Utc>,
}

// -- Matches --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: Uuid,
    /// The user whose like completed the match.
    pub user_a_id: Uuid,
    pub user_b_id: Uuid,
    pub user_a_matching_card_ids: Vec<Uuid>,
    pub user_b_matching_card_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Match {
    /// Canonical identifier of an unordered user pair: `min:max`.
    pub fn pair_key(a: Uuid, b: Uuid) -> String {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        format!("{}:{}", lo, hi)
    }

    pub fn involves(&self, user_id: Uuid) -> bool {
        self.user_a_id == user_id || self.user_b_id == user_id
    }

    /// The participant that is not `user_id`, or `None` for outsiders.
    pub fn other_participant(&self, user_id: Uuid) -> Option<Uuid> {
        if self.user_a_id == user_id {
            Some(self.user_b_id)
        } else if self.user_b_id == user_id {
            Some(self.user_a_id)
        } else {
            None
        }
    }

    /// The cards `user_id` liked on the other participant's profile.
    pub fn cards_liked_by(&self, user_id: Uuid) -> &[Uuid] {
        if self.user_a_id == user_id {
            &self.user_a_matching_card_ids
        } else if self.user_b_id == user_id {
            &self.user_b_matching_card_ids
        } else {
            &[]
        }
    }
}

/// A match seen from one participant, with the first card each side liked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchDetail {
    #[serde(rename = "match")]
    pub matched: Match,
    pub other_user_id: Uuid,
    pub other_username: String,
    /// Owned by the other participant.
    pub card_i_liked: Option<Card>,
    /// Owned by the viewer.
    pub card_they_liked: Option<Card>,
}

// -- Notifications --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NotificationKind {
    Like { card_id: Uuid },
    Match { match_id: Uuid },
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like { .. } => "like",
            Self::Match { .. } => "match",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub to_user_id: Uuid,
    pub from_user_id: Uuid,
    #[serde(flatten)]
    pub kind: NotificationKind,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: Notification,
    pub from_username: String,
}

// -- Conversations --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub match_id: Uuid,
    pub sender_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

/// One row of the conversation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub match_id: Uuid,
    pub other_user_id: Uuid,
    pub other_username: String,
    pub last_message: String,
    pub last_timestamp: DateTime<Utc>,
    pub unread_count: u32,
}
