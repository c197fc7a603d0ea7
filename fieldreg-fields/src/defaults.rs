//! Built-in entity configurations.
//!
//! A registry serves these when an entity has never been customised. The
//! documents live as YAML next to the crate and are compiled in.

use tracing::debug;

use crate::types::{EntityConfiguration, EntityKey, SelectOption, StageDefinition};

const LEAD_STAGES: &str = include_str!("../builtin/lead_stages.yaml");
const CRM_LEADS: &str = include_str!("../builtin/crm_leads.yaml");
const CRM_ACCOUNTS: &str = include_str!("../builtin/crm_accounts.yaml");
const CRM_QUOTATIONS: &str = include_str!("../builtin/crm_quotations.yaml");
const CRM_SAMPLES: &str = include_str!("../builtin/crm_samples.yaml");

/// Every key with a built-in configuration.
pub const BUILTIN_KEYS: &[(&str, &str)] = &[
    ("crm", "leads"),
    ("crm", "accounts"),
    ("crm", "quotations"),
    ("crm", "samples"),
];

fn parse(source: &str) -> EntityConfiguration {
    serde_yaml_ng::from_str(source).expect("invalid built-in configuration")
}

/// Default pipeline stages for leads.
pub fn default_lead_stages() -> Vec<StageDefinition> {
    serde_yaml_ng::from_str(LEAD_STAGES).expect("invalid built-in lead stages")
}

/// The configuration served for `key` when nothing has been saved.
///
/// Unknown keys get an empty configuration labelled from the entity name.
pub fn builtin_config(key: &EntityKey) -> EntityConfiguration {
    let config = match (key.module.as_str(), key.entity.as_str()) {
        ("crm", "leads") => leads(),
        ("crm", "accounts") => parse(CRM_ACCOUNTS),
        ("crm", "quotations") => parse(CRM_QUOTATIONS),
        ("crm", "samples") => parse(CRM_SAMPLES),
        _ => {
            let mut empty = EntityConfiguration::for_key(key);
            empty.entity_label = empty.entity_label();
            empty
        }
    };
    debug!(%key, fields = config.fields.len(), "resolved built-in configuration");
    config
}

/// Leads carry the lead stages twice: as Kanban columns and as the options
/// of the `stage` select.
fn leads() -> EntityConfiguration {
    let mut config = parse(CRM_LEADS);
    let stages = default_lead_stages();
    if let Some(stage_field) = config.fields.iter_mut().find(|f| f.field_name == "stage") {
        stage_field.options = stages
            .iter()
            .map(|s| SelectOption {
                color: s.color.clone(),
                order: s.order.unwrap_or(0),
                is_active: s.is_active,
                ..SelectOption::new(s.value.clone(), s.label.clone())
            })
            .collect();
    }
    config.kanban_stages = stages;
    config
}
