//! `fieldreg config show`

use std::io::Write;

use fieldreg_fields::section_label;

use crate::cli::OutputFormat;
use crate::output::{display_value, emit, new_table, variant_name, yes_no};
use crate::services::Services;

use super::load_config;

pub async fn run_show(
    services: &Services,
    module: &str,
    entity: &str,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<bool> {
    let config = load_config(services, module, entity).await?;

    emit(out, format, config.as_ref(), |out| {
        writeln!(out, "{} ({}/{})", config.entity_label(), module, entity)?;
        if config.fields.is_empty() {
            writeln!(out, "No fields configured.")?;
        }

        for (section, fields) in config.fields_by_section() {
            writeln!(out, "\n{}", section_label(section))?;
            let mut table = new_table();
            table.set_header(vec![
                "Field", "Label", "Type", "Control", "Required", "Form", "List", "Default",
            ]);
            for field in fields {
                table.add_row(vec![
                    field.field_name.clone(),
                    field.field_label.clone(),
                    variant_name(&field.field_type),
                    variant_name(&field.control()),
                    yes_no(field.is_required).to_string(),
                    yes_no(field.in_form()).to_string(),
                    yes_no(field.in_list()).to_string(),
                    field
                        .default_value
                        .as_ref()
                        .map(display_value)
                        .unwrap_or_default(),
                ]);
            }
            writeln!(out, "{table}")?;
        }

        if !config.kanban_stages.is_empty() {
            writeln!(out, "\nStages")?;
            let mut table = new_table();
            table.set_header(vec!["Stage", "Label", "Active", "Color"]);
            for stage in &config.kanban_stages {
                table.add_row(vec![
                    stage.value.clone(),
                    stage.display_label().to_string(),
                    yes_no(stage.active()).to_string(),
                    stage.color.clone().unwrap_or_default(),
                ]);
            }
            writeln!(out, "{table}")?;
        }

        let list = config.list_display_fields();
        if !list.is_empty() {
            writeln!(out, "\nList columns: {}", list.join(", "))?;
        }
        Ok(())
    })?;
    Ok(true)
}
