//! Command implementations.
//!
//! Every command writes to the given writer so output can be captured. A
//! command returns `Ok(false)` when it ran but the result should fail the
//! process (e.g. validation errors).

use std::io::Write;
use std::sync::Arc;

use fieldreg_fields::EntityConfiguration;
use fieldreg_registry::ConfigLoader;

use crate::cli::{BoardAction, Commands, ConfigAction, FormAction, OptionsAction, OutputFormat};
use crate::services::Services;

pub mod board;
pub mod config;
pub mod form;
pub mod options;

/// Run one parsed command.
pub async fn run(
    command: &Commands,
    services: &Services,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<bool> {
    match command {
        Commands::Config {
            action: ConfigAction::Show { module, entity },
        } => config::run_show(services, module, entity, format, out).await,

        Commands::Form { action } => match action {
            FormAction::Init { module, entity } => {
                form::run_init(services, module, entity, format, out).await
            }
            FormAction::Validate {
                module,
                entity,
                data,
            } => form::run_validate(services, module, entity, data, format, out).await,
        },

        Commands::Board { action } => match action {
            BoardAction::Show { module, entity } => {
                board::run_show(services, module, entity, format, out).await
            }
            BoardAction::Move {
                module,
                entity,
                item,
                to,
                index,
            } => board::run_move(services, module, entity, item, to, *index, format, out).await,
        },

        Commands::Options { action } => match action {
            OptionsAction::List { category } => {
                options::run_list(services, category, format, out).await
            }
            OptionsAction::Add { category, value } => {
                options::run_add(services, category, value, format, out).await
            }
        },
    }
}

/// Load a configuration through the loader so incomplete keys and backend
/// failures are handled the same way as in any other consumer.
pub(crate) async fn load_config(
    services: &Services,
    module: &str,
    entity: &str,
) -> anyhow::Result<Arc<EntityConfiguration>> {
    let loader = ConfigLoader::new(Arc::clone(&services.configs));
    Ok(loader.load(module, entity).await?)
}
