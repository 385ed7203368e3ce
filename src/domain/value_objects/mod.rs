mod action_id;
mod action_payload;
mod cache_key;

pub use action_id::ActionId;
pub use action_payload::{ActionKind, ActionPayload};
pub use cache_key::CacheKey;
