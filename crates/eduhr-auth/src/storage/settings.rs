//! Settings record storage trait.

use async_trait::async_trait;

use super::StoreResult;
use crate::settings::SettingsRecord;

/// Storage for the single persisted settings record.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load the record. Returns the default (empty) record when nothing has
    /// been saved yet.
    async fn load(&self) -> StoreResult<SettingsRecord>;

    /// Replace the record.
    async fn save(&self, record: &SettingsRecord) -> StoreResult<()>;
}
