//! Rendering command results as tables, JSON or YAML.

use std::io::Write;

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;

/// Create a table that wraps to the terminal width.
pub fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Write `value` as JSON or YAML, or call `table` for table output.
pub fn emit<T, F>(out: &mut dyn Write, format: OutputFormat, value: &T, table: F) -> anyhow::Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&mut dyn Write) -> anyhow::Result<()>,
{
    match format {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(value)?)?,
        OutputFormat::Yaml => write!(out, "{}", serde_yaml_ng::to_string(value)?)?,
        OutputFormat::Table => table(out)?,
    }
    Ok(())
}

/// The serialized name of a unit enum variant, e.g. `multiselect`.
pub fn variant_name<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(Value::String(name)) => name,
        _ => String::new(),
    }
}

/// A compact single-line rendering of a field value.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
