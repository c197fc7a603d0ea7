//! In-memory backend for offline use and tests.
//!
//! Configurations fall back to the built-in defaults for any key that has not
//! been set explicitly. Failures can be injected per operation so callers can
//! exercise their error paths without a server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use fieldreg_fields::{builtin_config, EntityConfiguration, EntityKey, SelectOption};
use indexmap::IndexMap;
use tracing::debug;

use crate::error::{BackendError, Result};
use crate::traits::{ConfigSource, OptionSource, PipelineSource};
use crate::types::{KanbanView, PipelineItem};

/// A failure to hand back instead of performing an operation.
#[derive(Debug, Clone)]
struct Failure {
    status: u16,
    detail: Option<String>,
}

impl Failure {
    fn to_error(&self) -> BackendError {
        BackendError::Api {
            status: self.status,
            detail: self.detail.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    configs: HashMap<EntityKey, EntityConfiguration>,
    items: HashMap<EntityKey, Vec<PipelineItem>>,
    options: IndexMap<String, Vec<SelectOption>>,
    /// Persistent until cleared
    config_failure: Option<Failure>,
    /// One-shot
    kanban_failure: Option<Failure>,
    move_failure: Option<Failure>,
    option_failure: Option<Failure>,
    list_failure: Option<Failure>,
}

/// Backend holding everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
    config_requests: AtomicUsize,
    kanban_requests: AtomicUsize,
    move_requests: AtomicUsize,
}

impl MemoryBackend {
    /// An empty backend: built-in configurations, no items, no options.
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend with sample leads and the master-data categories the lead
    /// form uses.
    pub fn seeded() -> Self {
        let backend = Self::new();
        let leads = EntityKey::new("crm", "leads");
        for (id, status, company, contact, value) in SAMPLE_LEADS {
            backend.insert_item(
                &leads,
                PipelineItem::new(*id, *status)
                    .with("company_name", *company)
                    .with("contact_person", *contact)
                    .with("estimated_value", *value),
            );
        }
        for (category, values) in SAMPLE_CATEGORIES {
            let options = values
                .iter()
                .enumerate()
                .map(|(i, v)| SelectOption {
                    order: i as i32,
                    ..SelectOption::new(*v, *v)
                })
                .collect();
            backend.state().options.insert(category.to_string(), options);
        }
        backend
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the configuration served for its key.
    pub fn set_config(&self, config: EntityConfiguration) {
        self.state().configs.insert(config.key(), config);
    }

    /// Append an item to the entity's pipeline.
    pub fn insert_item(&self, key: &EntityKey, item: PipelineItem) {
        self.state().items.entry(key.clone()).or_default().push(item);
    }

    /// Current items of an entity, in insertion order.
    pub fn items(&self, key: &EntityKey) -> Vec<PipelineItem> {
        self.state().items.get(key).cloned().unwrap_or_default()
    }

    pub fn set_options(&self, category: impl Into<String>, options: Vec<SelectOption>) {
        self.state().options.insert(category.into(), options);
    }

    /// Fail every config fetch until [`clear_failures`](Self::clear_failures).
    pub fn fail_config(&self, status: u16, detail: Option<&str>) {
        self.state().config_failure = Some(failure(status, detail));
    }

    /// Fail the next kanban view fetch.
    pub fn fail_next_kanban(&self, status: u16, detail: Option<&str>) {
        self.state().kanban_failure = Some(failure(status, detail));
    }

    /// Fail the next move.
    pub fn fail_next_move(&self, status: u16, detail: Option<&str>) {
        self.state().move_failure = Some(failure(status, detail));
    }

    /// Fail the next option list or add.
    pub fn fail_next_option(&self, status: u16, detail: Option<&str>) {
        self.state().option_failure = Some(failure(status, detail));
    }

    /// Fail the next option list only; adds still go through.
    pub fn fail_next_list(&self, status: u16, detail: Option<&str>) {
        self.state().list_failure = Some(failure(status, detail));
    }

    pub fn clear_failures(&self) {
        let mut state = self.state();
        state.config_failure = None;
        state.kanban_failure = None;
        state.move_failure = None;
        state.option_failure = None;
        state.list_failure = None;
    }

    pub fn config_requests(&self) -> usize {
        self.config_requests.load(Ordering::SeqCst)
    }

    pub fn kanban_requests(&self) -> usize {
        self.kanban_requests.load(Ordering::SeqCst)
    }

    pub fn move_requests(&self) -> usize {
        self.move_requests.load(Ordering::SeqCst)
    }
}

fn failure(status: u16, detail: Option<&str>) -> Failure {
    Failure {
        status,
        detail: detail.map(str::to_string),
    }
}

fn config_or_builtin(state: &State, key: &EntityKey) -> EntityConfiguration {
    state
        .configs
        .get(key)
        .cloned()
        .unwrap_or_else(|| builtin_config(key))
}

#[async_trait]
impl ConfigSource for MemoryBackend {
    async fn fetch_config(&self, key: &EntityKey) -> Result<EntityConfiguration> {
        self.config_requests.fetch_add(1, Ordering::SeqCst);
        let state = self.state();
        if let Some(failure) = &state.config_failure {
            return Err(failure.to_error());
        }
        Ok(config_or_builtin(&state, key))
    }
}

#[async_trait]
impl PipelineSource for MemoryBackend {
    async fn kanban_view(&self, key: &EntityKey) -> Result<KanbanView> {
        self.kanban_requests.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state();
        if let Some(failure) = state.kanban_failure.take() {
            return Err(failure.to_error());
        }

        let config = config_or_builtin(&state, key);
        let mut view: KanbanView = config
            .kanban_stages
            .iter()
            .map(|s| (s.value.clone(), Vec::new()))
            .collect();
        for item in state.items.get(key).into_iter().flatten() {
            view.entry(item.status.clone()).or_default().push(item.clone());
        }
        Ok(view)
    }

    async fn move_item(
        &self,
        key: &EntityKey,
        item_id: &str,
        stage: &str,
    ) -> Result<PipelineItem> {
        self.move_requests.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state();
        if let Some(failure) = state.move_failure.take() {
            return Err(failure.to_error());
        }

        let config = config_or_builtin(&state, key);
        if !config.kanban_stages.is_empty() && config.stage_for(stage).is_none() {
            return Err(BackendError::api(400, format!("Invalid status: {stage}")));
        }

        let item = state
            .items
            .get_mut(key)
            .and_then(|items| items.iter_mut().find(|i| i.id == item_id))
            .ok_or_else(|| BackendError::api(404, format!("Item {item_id} not found")))?;
        debug!(%key, item_id, from = %item.status, to = stage, "moved item");
        item.status = stage.to_string();
        Ok(item.clone())
    }
}

#[async_trait]
impl OptionSource for MemoryBackend {
    async fn list_options(&self, category: &str) -> Result<Vec<SelectOption>> {
        let mut state = self.state();
        if let Some(failure) = state.option_failure.take().or_else(|| state.list_failure.take()) {
            return Err(failure.to_error());
        }
        Ok(state.options.get(category).cloned().unwrap_or_default())
    }

    async fn add_option(&self, category: &str, option: &SelectOption) -> Result<SelectOption> {
        let mut state = self.state();
        if let Some(failure) = state.option_failure.take() {
            return Err(failure.to_error());
        }

        let options = state.options.entry(category.to_string()).or_default();
        if options.iter().any(|o| o.value == option.value) {
            return Err(BackendError::api(
                409,
                format!("Option '{}' already exists", option.value),
            ));
        }
        let stored = SelectOption {
            order: options.len() as i32,
            ..option.clone()
        };
        options.push(stored.clone());
        Ok(stored)
    }
}

const SAMPLE_LEADS: &[(&str, &str, &str, &str, i64)] = &[
    ("L-1001", "cold_leads", "Acme Tapes", "R. Mehta", 250000),
    ("L-1002", "cold_leads", "Sunrise Packaging", "A. Khan", 80000),
    ("L-1003", "contacted", "Delta Logistics", "P. Iyer", 120000),
    ("L-1004", "qualified", "Orbit Electricals", "S. Das", 450000),
    ("L-1005", "proposal", "Kiran Textiles", "M. Rao", 300000),
    ("L-1006", "hot_leads", "Nova Cartons", "J. Singh", 600000),
];

const SAMPLE_CATEGORIES: &[(&str, &[&str])] = &[
    ("industry", &["Automotive", "Electronics", "FMCG", "Packaging", "Pharma"]),
    ("lead_source", &["Website", "Referral", "Trade Show", "Cold Call"]),
    ("followup_type", &["Call", "Email", "Meeting", "Site Visit"]),
];
