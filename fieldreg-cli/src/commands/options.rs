//! `fieldreg options list` and `fieldreg options add`

use std::io::Write;
use std::sync::Arc;

use fieldreg_fields::SelectOption;
use fieldreg_registry::OptionRegistry;

use crate::cli::OutputFormat;
use crate::output::{emit, new_table};
use crate::services::Services;

fn write_options(out: &mut dyn Write, category: &str, options: &[SelectOption]) -> anyhow::Result<()> {
    if options.is_empty() {
        writeln!(out, "No options in \"{category}\".")?;
        return Ok(());
    }
    let mut table = new_table();
    table.set_header(vec!["Value", "Label", "Order"]);
    for option in options {
        table.add_row(vec![
            option.value.clone(),
            option.display_label().to_string(),
            option.order.to_string(),
        ]);
    }
    writeln!(out, "{table}")?;
    Ok(())
}

pub async fn run_list(
    services: &Services,
    category: &str,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<bool> {
    let registry = OptionRegistry::new(Arc::clone(&services.options));
    let options = registry.list_options(category).await?;
    emit(out, format, &options, |out| write_options(out, category, &options))?;
    Ok(true)
}

pub async fn run_add(
    services: &Services,
    category: &str,
    value: &str,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<bool> {
    let registry = OptionRegistry::new(Arc::clone(&services.options));
    let added = registry.add_option(category, value).await?;
    emit(out, format, &added.option, |out| {
        writeln!(out, "Added \"{}\" to {category}", added.option.value)?;
        match &added.options {
            Some(options) => write_options(out, category, options),
            None => Ok(()),
        }
    })?;
    Ok(true)
}
