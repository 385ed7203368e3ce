use serde::{Deserialize, Serialize};
use std::fmt;

/// Mutations the client can capture while offline, one variant per remote
/// operation. The serde tag doubles as the persisted action type, so an
/// executor match over this enum is exhaustive; a tag this build does not
/// know about fails to parse and is discarded by the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ActionPayload {
    UpdateProfile {
        display_name: Option<String>,
        bio: Option<String>,
    },
    SendMessage {
        to: String,
        text: String,
    },
    LikeProfile {
        user_id: String,
    },
    SuperLikeProfile {
        user_id: String,
    },
}

impl ActionPayload {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionPayload::UpdateProfile { .. } => ActionKind::UpdateProfile,
            ActionPayload::SendMessage { .. } => ActionKind::SendMessage,
            ActionPayload::LikeProfile { .. } => ActionKind::LikeProfile,
            ActionPayload::SuperLikeProfile { .. } => ActionKind::SuperLikeProfile,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    UpdateProfile,
    SendMessage,
    LikeProfile,
    SuperLikeProfile,
}

impl ActionKind {
    pub fn as_str(&self) -> &str {
        match self {
            ActionKind::UpdateProfile => "update_profile",
            ActionKind::SendMessage => "send_message",
            ActionKind::LikeProfile => "like_profile",
            ActionKind::SuperLikeProfile => "super_like_profile",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
