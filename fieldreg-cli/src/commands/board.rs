//! `fieldreg board show` and `fieldreg board move`

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use fieldreg_fields::{EntityConfiguration, EntityKey};
use fieldreg_kanban::{Board, KanbanError, MoveOutcome, Pipeline};
use serde_json::json;

use crate::cli::OutputFormat;
use crate::output::{emit, new_table};
use crate::services::Services;

use super::load_config;

async fn load_pipeline(services: &Services, module: &str, entity: &str) -> anyhow::Result<Pipeline> {
    let config = load_config(services, module, entity).await?;
    let pipeline = Pipeline::new(
        EntityKey::new(module, entity),
        config,
        Arc::clone(&services.pipelines),
    );
    pipeline.load().await?;
    Ok(pipeline)
}

fn write_board(out: &mut dyn Write, config: &EntityConfiguration, board: &Board) -> anyhow::Result<()> {
    let mut table = new_table();
    table.set_header(vec!["Stage", "Label", "Count", "Items"]);
    for (stage, items) in board.buckets() {
        let label = config
            .stage_for(stage)
            .map(|s| s.display_label().to_string())
            .unwrap_or_else(|| stage.clone());
        let titles = items
            .iter()
            .map(|item| format!("{} ({})", item.title(), item.id))
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(vec![stage.clone(), label, items.len().to_string(), titles]);
    }
    writeln!(out, "{table}")?;
    writeln!(
        out,
        "{} {} across {} stages",
        board.total(),
        config.entity_label().to_lowercase(),
        board.stages().count()
    )?;
    Ok(())
}

pub async fn run_show(
    services: &Services,
    module: &str,
    entity: &str,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<bool> {
    let pipeline = load_pipeline(services, module, entity).await?;
    let board = pipeline.board();
    emit(out, format, &board, |out| write_board(out, pipeline.config(), &board))?;
    Ok(true)
}

#[allow(clippy::too_many_arguments)]
pub async fn run_move(
    services: &Services,
    module: &str,
    entity: &str,
    item_id: &str,
    to_stage: &str,
    to_index: Option<usize>,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<bool> {
    let pipeline = load_pipeline(services, module, entity).await?;

    let outcome = match pipeline.move_to(item_id, to_stage, to_index).await {
        Ok(outcome) => outcome,
        Err(err @ KanbanError::MoveRejected { .. }) => {
            return Err(err).context("move rejected; board resynced from server");
        }
        Err(err) => return Err(err.into()),
    };

    let report = match &outcome {
        MoveOutcome::Committed { item, stage_label } => json!({
            "outcome": "committed",
            "item": item,
            "stage_label": stage_label,
        }),
        MoveOutcome::NoOp => json!({ "outcome": "noop" }),
        MoveOutcome::Ignored => json!({ "outcome": "ignored" }),
    };
    emit(out, format, &report, |out| {
        match &outcome {
            MoveOutcome::Committed { stage_label, .. } => {
                writeln!(out, "Moved {item_id} to {stage_label}")?;
            }
            MoveOutcome::NoOp => writeln!(out, "{item_id} is already there")?,
            MoveOutcome::Ignored => writeln!(out, "{item_id} moved before the request ran; nothing changed")?,
        }
        Ok(())
    })?;
    Ok(true)
}
