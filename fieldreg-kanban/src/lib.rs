//! Pipeline (Kanban) engine
//!
//! A [`Board`] groups pipeline items into stage buckets. Moves are modelled
//! as a pure transition, [`apply_move`], so the grouping logic is testable on
//! its own. [`Pipeline`] wraps it with the effects: publish the optimistic
//! board, persist the stage change, and refetch the board when the backend
//! refuses.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fieldreg_backend::{MemoryBackend, PipelineSource};
//! use fieldreg_fields::{builtin_config, EntityKey};
//! use fieldreg_kanban::{Pipeline, StageMove};
//!
//! # async fn example() -> fieldreg_kanban::Result<()> {
//! let key = EntityKey::new("crm", "leads");
//! let backend: Arc<dyn PipelineSource> = Arc::new(MemoryBackend::seeded());
//! let pipeline = Pipeline::new(key.clone(), Arc::new(builtin_config(&key)), backend);
//! pipeline.load().await?;
//! pipeline
//!     .move_item(StageMove::new("L-1001", ("cold_leads", 0), ("qualified", 0)))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod board;
mod error;
mod pipeline;
mod transition;

pub use board::Board;
pub use error::{KanbanError, Result, GENERIC_MOVE_MESSAGE};
pub use pipeline::{MoveOutcome, Pipeline};
pub use transition::{apply_move, StageMove, Transition};
