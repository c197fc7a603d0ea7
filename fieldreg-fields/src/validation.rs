//! Structural checks for an [`EntityConfiguration`].
//!
//! These guard the invariants the form and pipeline engines rely on. They say
//! nothing about record values; see [`EntityConfiguration::validate_required`].

use std::collections::HashSet;

use serde_json::Value;

use crate::error::{FieldsError, Result};
use crate::types::{EntityConfiguration, FieldDefinition, FieldType};

impl EntityConfiguration {
    /// Check unique field names, unique stage values and type-matched defaults.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for (index, field) in self.fields.iter().enumerate() {
            if field.field_name.is_empty() {
                return Err(FieldsError::EmptyFieldName { index });
            }
            if !names.insert(field.field_name.as_str()) {
                return Err(FieldsError::DuplicateFieldName {
                    name: field.field_name.clone(),
                });
            }
            check_default(field)?;
        }

        let mut stages = HashSet::new();
        for stage in &self.kanban_stages {
            if !stages.insert(stage.value.as_str()) {
                return Err(FieldsError::DuplicateStage {
                    value: stage.value.clone(),
                });
            }
        }

        Ok(())
    }
}

fn check_default(field: &FieldDefinition) -> Result<()> {
    let Some(value) = &field.default_value else {
        return Ok(());
    };
    let (matches, expected) = match field.field_type {
        FieldType::Checkbox => (value.is_boolean(), "a boolean"),
        FieldType::Number | FieldType::Currency => (value.is_number(), "a number"),
        FieldType::Multiselect => (value.is_array(), "a list"),
        FieldType::Text
        | FieldType::Date
        | FieldType::Select
        | FieldType::Textarea => (value.is_string(), "a string"),
    };
    if matches || value == &Value::Null {
        Ok(())
    } else {
        Err(FieldsError::DefaultTypeMismatch {
            field: field.field_name.clone(),
            expected,
        })
    }
}
