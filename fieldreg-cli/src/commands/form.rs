//! `fieldreg form init` and `fieldreg form validate`

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context};
use fieldreg_fields::{FormValues, ValidationErrors};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::output::{display_value, emit, new_table};
use crate::services::Services;

use super::load_config;

pub async fn run_init(
    services: &Services,
    module: &str,
    entity: &str,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<bool> {
    let config = load_config(services, module, entity).await?;
    let values = config.initial_values();

    emit(out, format, &values, |out| {
        let mut table = new_table();
        table.set_header(vec!["Field", "Initial value"]);
        for (name, value) in &values {
            table.add_row(vec![name.clone(), display_value(value)]);
        }
        writeln!(out, "{table}")?;
        Ok(())
    })?;
    Ok(true)
}

#[derive(Serialize)]
struct ValidationReport<'a> {
    valid: bool,
    errors: &'a ValidationErrors,
}

pub async fn run_validate(
    services: &Services,
    module: &str,
    entity: &str,
    data: &str,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<bool> {
    let values = parse_values(data)?;
    let config = load_config(services, module, entity).await?;
    let errors = config.validate_required(&values);
    let report = ValidationReport {
        valid: errors.is_empty(),
        errors: &errors,
    };

    emit(out, format, &report, |out| {
        if errors.is_empty() {
            writeln!(out, "Valid: all required fields are filled.")?;
            return Ok(());
        }
        let mut table = new_table();
        table.set_header(vec!["Field", "Error"]);
        for (field, message) in &errors {
            table.add_row(vec![field.clone(), message.clone()]);
        }
        writeln!(out, "{table}")?;
        Ok(())
    })?;
    Ok(errors.is_empty())
}

/// Parse `--data`: inline JSON, or `@path` to a JSON file.
pub(crate) fn parse_values(data: &str) -> anyhow::Result<FormValues> {
    let text = match data.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(Path::new(path))
            .with_context(|| format!("failed to read record from {path}"))?,
        None => data.to_string(),
    };
    let value: serde_json::Value =
        serde_json::from_str(&text).context("record is not valid JSON")?;
    let serde_json::Value::Object(map) = value else {
        bail!("record must be a JSON object");
    };
    Ok(map.into_iter().collect())
}
