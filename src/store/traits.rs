use crate::model::{CaseType, Section};
use anyhow::Result;

/// Yes/no decision asked before destructive operations. Blocks until answered.
pub trait Confirmation: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

/// Fire-and-forget message to the user
pub trait Notification: Send + Sync {
    fn notify(&self, message: &str);
}

/// Both prompt directions, as held by the rule set store
pub trait UserPrompt: Confirmation + Notification {}
impl<T: Confirmation + Notification> UserPrompt for T {}

/// Source of selectable field names. Same key gives the same result.
#[async_trait::async_trait]
pub trait FieldSource: Send + Sync {
    async fn fetch_fields(&self, section: Section, case_type: CaseType) -> Result<Vec<String>>;
}
