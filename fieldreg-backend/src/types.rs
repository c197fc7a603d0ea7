//! Wire types for pipeline data

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A record shown on the Kanban board.
///
/// Only `id` and `status` are interpreted. Everything else the server sends
/// (company name, estimated value, ...) is kept verbatim in `attributes` and
/// written back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineItem {
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Servers hand out both integer and string ids.
fn id_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or integer id, got {other}"
        ))),
    }
}

impl PipelineItem {
    pub fn new(id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: status.into(),
            attributes: Map::new(),
        }
    }

    /// Attach an extra attribute
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// A string attribute, if present
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    /// A short human name for the item: the first of `company_name`,
    /// `name`, `title` that is set, else the id.
    pub fn title(&self) -> &str {
        ["company_name", "name", "title"]
            .iter()
            .find_map(|k| self.attr_str(k).filter(|s| !s.is_empty()))
            .unwrap_or(&self.id)
    }
}

/// Items grouped by stage value, in the order the server listed them.
pub type KanbanView = IndexMap<String, Vec<PipelineItem>>;

/// The kanban endpoint answers either with the map directly or wrapped in a
/// `{ "data": ... }` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum KanbanEnvelope {
    Wrapped { data: KanbanView },
    Bare(KanbanView),
}

impl KanbanEnvelope {
    pub(crate) fn into_view(self) -> KanbanView {
        match self {
            Self::Wrapped { data } => data,
            Self::Bare(view) => view,
        }
    }
}
