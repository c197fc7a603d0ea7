//! The backend seams the engines are written against

use async_trait::async_trait;
use fieldreg_fields::{EntityConfiguration, EntityKey, SelectOption};

use crate::error::Result;
use crate::types::{KanbanView, PipelineItem};

/// Serves entity configurations.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Fetch the configuration for `key`.
    ///
    /// Entities that were never customised still answer with their built-in
    /// configuration (possibly empty); only transport and server failures
    /// are errors.
    async fn fetch_config(&self, key: &EntityKey) -> Result<EntityConfiguration>;
}

/// Serves pipeline items and records stage changes.
#[async_trait]
pub trait PipelineSource: Send + Sync {
    /// Every item grouped by its current stage
    async fn kanban_view(&self, key: &EntityKey) -> Result<KanbanView>;

    /// Persist `item_id`'s move to `stage` and return the updated item
    async fn move_item(&self, key: &EntityKey, item_id: &str, stage: &str)
        -> Result<PipelineItem>;
}

/// Serves and extends master-data option categories.
#[async_trait]
pub trait OptionSource: Send + Sync {
    async fn list_options(&self, category: &str) -> Result<Vec<SelectOption>>;

    /// Append an option to `category` and return it as stored
    async fn add_option(&self, category: &str, option: &SelectOption) -> Result<SelectOption>;
}
