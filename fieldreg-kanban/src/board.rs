//! Items grouped into stage buckets

use fieldreg_backend::{KanbanView, PipelineItem};
use fieldreg_fields::EntityConfiguration;
use indexmap::IndexMap;
use serde::Serialize;

/// An ordered mapping from stage value to the items in that stage.
///
/// Every active stage has a bucket, even when it holds no items, so each
/// column always renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Board {
    pub(crate) buckets: IndexMap<String, Vec<PipelineItem>>,
}

impl Board {
    /// Build from a server-grouped view.
    ///
    /// Columns follow the configured active stages. Buckets the server sends
    /// for any other status (inactive or historical stages) are kept after
    /// them in server order.
    pub fn from_view(mut view: KanbanView, config: &EntityConfiguration) -> Self {
        let mut buckets: IndexMap<String, Vec<PipelineItem>> = config
            .active_stages()
            .into_iter()
            .map(|stage| {
                let items = view.shift_remove(&stage.value).unwrap_or_default();
                (stage.value.clone(), items)
            })
            .collect();
        buckets.extend(view);
        Self { buckets }
    }

    /// Group a flat item list by status into the active stages.
    ///
    /// Items whose status has no active stage are not shown.
    pub fn from_items(
        items: impl IntoIterator<Item = PipelineItem>,
        config: &EntityConfiguration,
    ) -> Self {
        let mut buckets: IndexMap<String, Vec<PipelineItem>> = config
            .active_stages()
            .into_iter()
            .map(|stage| (stage.value.clone(), Vec::new()))
            .collect();
        for item in items {
            if let Some(bucket) = buckets.get_mut(&item.status) {
                bucket.push(item);
            }
        }
        Self { buckets }
    }

    /// Items in `stage`; `None` if the board has no such column.
    pub fn bucket(&self, stage: &str) -> Option<&[PipelineItem]> {
        self.buckets.get(stage).map(Vec::as_slice)
    }

    pub fn buckets(&self) -> &IndexMap<String, Vec<PipelineItem>> {
        &self.buckets
    }

    pub fn stages(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// Item count per stage, in column order.
    pub fn counts(&self) -> Vec<(&str, usize)> {
        self.buckets
            .iter()
            .map(|(stage, items)| (stage.as_str(), items.len()))
            .collect()
    }

    pub fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Where an item currently sits: `(stage, index)`.
    pub fn find(&self, item_id: &str) -> Option<(&str, usize)> {
        self.buckets.iter().find_map(|(stage, items)| {
            items
                .iter()
                .position(|item| item.id == item_id)
                .map(|index| (stage.as_str(), index))
        })
    }

    pub fn item(&self, item_id: &str) -> Option<&PipelineItem> {
        self.buckets
            .values()
            .flatten()
            .find(|item| item.id == item_id)
    }
}
