use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(value: String) -> Result<Self, String> {
        Self::validate(&value)?;
        Ok(Self(value))
    }

    /// The signed-in user's own profile.
    pub fn profile() -> Self {
        Self("profile".to_string())
    }

    /// The current match list.
    pub fn matches() -> Self {
        Self("matches".to_string())
    }

    /// Message history for one conversation.
    pub fn messages(conversation_id: &str) -> Self {
        Self(format!("messages:{conversation_id}"))
    }

    /// Discovery / search preferences.
    pub fn preferences() -> Self {
        Self("preferences".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            return Err("Cache key cannot be empty".to_string());
        }
        Ok(())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}
