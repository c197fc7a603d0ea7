//! Form engine: pure derivations over an [`EntityConfiguration`].
//!
//! Nothing here mutates the configuration or fails on partial data. Missing
//! lookups return `None` or an empty collection.

use indexmap::IndexMap;
use serde_json::Value;

use crate::types::{title_case, EntityConfiguration, FieldDefinition, SelectOption, StageDefinition};

/// Section bucket for fields that do not name one.
pub const DEFAULT_SECTION: &str = "default";

/// Values of a record being edited, keyed by `field_name`.
pub type FormValues = IndexMap<String, Value>;

/// Advisory validation result: `field_name` → message. Empty means valid.
pub type ValidationErrors = IndexMap<String, String>;

/// Display label for a section key.
pub fn section_label(section: &str) -> String {
    match section {
        "basic" => "Basic Info".into(),
        "address" => "Address".into(),
        "contacts" => "Contacts".into(),
        "classification" => "Classification".into(),
        "followup" => "Follow-up".into(),
        "credit" => "Credit Terms".into(),
        "display" => "Display Fields".into(),
        "form" => "Form Fields".into(),
        DEFAULT_SECTION => "Other".into(),
        other => title_case(other),
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

impl EntityConfiguration {
    /// Fields grouped by section, sections in first-seen order.
    ///
    /// Each group is sorted ascending by `order`; the sort is stable so fields
    /// sharing an order keep their fetch order.
    pub fn fields_by_section(&self) -> IndexMap<&str, Vec<&FieldDefinition>> {
        let mut sections: IndexMap<&str, Vec<&FieldDefinition>> = IndexMap::new();
        for field in &self.fields {
            sections.entry(field.section_key()).or_default().push(field);
        }
        for group in sections.values_mut() {
            group.sort_by_key(|f| f.sort_order());
        }
        sections
    }

    /// Fields rendered in the create/edit form.
    pub fn form_fields(&self) -> Vec<&FieldDefinition> {
        self.fields.iter().filter(|f| f.in_form()).collect()
    }

    /// Fields rendered as list columns.
    pub fn list_fields(&self) -> Vec<&FieldDefinition> {
        self.fields.iter().filter(|f| f.in_list()).collect()
    }

    /// Field names for the list view: the explicit list when configured,
    /// otherwise every list field.
    pub fn list_display_fields(&self) -> Vec<&str> {
        if !self.list_display_fields.is_empty() {
            return self.list_display_fields.iter().map(String::as_str).collect();
        }
        self.list_fields()
            .into_iter()
            .map(|f| f.field_name.as_str())
            .collect()
    }

    pub fn required_fields(&self) -> Vec<&FieldDefinition> {
        self.fields.iter().filter(|f| f.is_required).collect()
    }

    /// Seed values for a new record.
    pub fn initial_values(&self) -> FormValues {
        self.fields
            .iter()
            .map(|f| {
                let value = match &f.default_value {
                    Some(v) if !v.is_null() => v.clone(),
                    _ => f.empty_value(),
                };
                (f.field_name.clone(), value)
            })
            .collect()
    }

    /// Check every required field has a non-blank value.
    ///
    /// Missing keys, `null`, `""` and `[]` are blank. `false` and `0` are not.
    pub fn validate_required(&self, data: &FormValues) -> ValidationErrors {
        self.required_fields()
            .into_iter()
            .filter(|f| is_blank(data.get(&f.field_name)))
            .map(|f| {
                (
                    f.field_name.clone(),
                    format!("{} is required", f.field_label),
                )
            })
            .collect()
    }

    pub fn config_for(&self, field_name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.field_name == field_name)
    }

    /// Options of a field; empty when the field is unknown.
    pub fn options_for(&self, field_name: &str) -> &[SelectOption] {
        self.config_for(field_name)
            .map(|f| f.options.as_slice())
            .unwrap_or(&[])
    }

    pub fn stage_for(&self, value: &str) -> Option<&StageDefinition> {
        self.kanban_stages.iter().find(|s| s.value == value)
    }

    /// Stages that get a Kanban column, in configured order.
    pub fn active_stages(&self) -> Vec<&StageDefinition> {
        self.kanban_stages.iter().filter(|s| s.active()).collect()
    }
}
