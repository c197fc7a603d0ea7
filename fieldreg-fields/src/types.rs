//! Core field, stage and entity types for the field registry.
//!
//! All types serialize to/from JSON (the backend wire format) and YAML (the
//! built-in defaults) via serde. Absent or `null` values fall back to the
//! defaults a field registry server applies, so a partial configuration still
//! deserializes.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Treat an explicit `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Identifies one configurable entity, e.g. `crm/leads`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    pub module: String,
    pub entity: String,
}

impl EntityKey {
    pub fn new(module: impl Into<String>, entity: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            entity: entity.into(),
        }
    }

    /// Both halves are present. An incomplete key never reaches the backend.
    pub fn is_complete(&self) -> bool {
        !self.module.trim().is_empty() && !self.entity.trim().is_empty()
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.module, self.entity)
    }
}

/// A single option in a select or multi-select field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectOption {
    pub value: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_default: bool,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            color: None,
            order: 0,
            is_active: None,
            is_default: false,
        }
    }

    /// Label for display, falling back to the raw value.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.value
        } else {
            &self.label
        }
    }

    pub fn active(&self) -> bool {
        self.is_active != Some(false)
    }
}

/// The type of a field. Determines the form control and the shape of its value.
///
/// The set is closed. Legacy type names served by older registries (`email`,
/// `phone`, `auto`) are read as plain text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[serde(alias = "email", alias = "phone", alias = "auto")]
    Text,
    Number,
    Currency,
    Date,
    Checkbox,
    Select,
    Multiselect,
    Textarea,
}

impl FieldType {
    /// Whether the field draws its values from an option set.
    pub fn has_options(self) -> bool {
        matches!(self, FieldType::Select | FieldType::Multiselect)
    }
}

/// The control a form renders for a field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FormControl {
    TextInput,
    NumberInput,
    CurrencyInput,
    DatePicker,
    Checkbox,
    Select,
    MultiSelect,
    TextArea,
}

/// Horizontal space a field takes in the form grid.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldWidth {
    #[default]
    Full,
    Half,
    Third,
}

/// A field definition: the complete schema for a single named attribute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDefinition {
    pub field_name: String,
    pub field_label: String,
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_in_form: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_in_list: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub options: Vec<SelectOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_readonly: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub width: FieldWidth,
}

impl FieldDefinition {
    /// A minimal definition; everything else takes its registry default.
    pub fn new(
        field_name: impl Into<String>,
        field_label: impl Into<String>,
        field_type: FieldType,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            field_label: field_label.into(),
            field_type,
            section: None,
            order: None,
            is_required: false,
            show_in_form: None,
            show_in_list: None,
            default_value: None,
            options: Vec::new(),
            placeholder: None,
            help_text: None,
            is_readonly: false,
            width: FieldWidth::Full,
        }
    }

    pub fn in_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    pub fn shown_in_list(mut self, shown: bool) -> Self {
        self.show_in_list = Some(shown);
        self
    }

    pub fn shown_in_form(mut self, shown: bool) -> Self {
        self.show_in_form = Some(shown);
        self
    }

    /// Section key, `"default"` when unset.
    pub fn section_key(&self) -> &str {
        self.section
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(crate::form::DEFAULT_SECTION)
    }

    /// Sort key within a section; a missing order sorts as 0.
    pub fn sort_order(&self) -> i32 {
        self.order.unwrap_or(0)
    }

    /// Form visibility is opt-out: only an explicit `false` hides the field.
    pub fn in_form(&self) -> bool {
        self.show_in_form != Some(false)
    }

    /// List visibility is opt-in.
    pub fn in_list(&self) -> bool {
        self.show_in_list == Some(true)
    }

    /// The control used to edit this field.
    pub fn control(&self) -> FormControl {
        match self.field_type {
            FieldType::Text => FormControl::TextInput,
            FieldType::Number => FormControl::NumberInput,
            FieldType::Currency => FormControl::CurrencyInput,
            FieldType::Date => FormControl::DatePicker,
            FieldType::Checkbox => FormControl::Checkbox,
            FieldType::Select => FormControl::Select,
            FieldType::Multiselect => FormControl::MultiSelect,
            FieldType::Textarea => FormControl::TextArea,
        }
    }

    /// The value a new record starts with when no default is configured.
    pub fn empty_value(&self) -> Value {
        match self.field_type {
            FieldType::Checkbox => Value::Bool(false),
            FieldType::Multiselect => Value::Array(Vec::new()),
            FieldType::Text
            | FieldType::Number
            | FieldType::Currency
            | FieldType::Date
            | FieldType::Select
            | FieldType::Textarea => Value::String(String::new()),
        }
    }
}

/// A pipeline stage, both a status value and a Kanban column id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageDefinition {
    pub value: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

impl StageDefinition {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            is_active: None,
            color: None,
            order: None,
        }
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = Some(false);
        self
    }

    /// Inactive stages stay valid status values but get no column.
    pub fn active(&self) -> bool {
        self.is_active != Some(false)
    }

    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.value
        } else {
            &self.label
        }
    }
}

/// Everything the registry knows about one entity. Superseded wholesale on refetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EntityConfiguration {
    #[serde(default, deserialize_with = "null_as_default")]
    pub module: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entity: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entity_label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<FieldDefinition>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub kanban_stages: Vec<StageDefinition>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub list_display_fields: Vec<String>,
}

impl EntityConfiguration {
    /// A configuration with no fields and no stages.
    pub fn empty() -> Self {
        Self::default()
    }

    /// An empty configuration bound to a key.
    pub fn for_key(key: &EntityKey) -> Self {
        Self {
            module: key.module.clone(),
            entity: key.entity.clone(),
            ..Self::default()
        }
    }

    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.module.clone(), self.entity.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.kanban_stages.is_empty()
    }

    /// Display label, derived from the entity key when none is configured.
    pub fn entity_label(&self) -> String {
        if !self.entity_label.is_empty() {
            return self.entity_label.clone();
        }
        title_case(&self.entity)
    }
}

/// `"purchase_orders"` → `"Purchase Orders"`.
pub(crate) fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
