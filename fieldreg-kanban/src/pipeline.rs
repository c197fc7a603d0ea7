//! Pipeline engine
//!
//! Owns the board of one entity and publishes it on a watch channel. Moves
//! are applied optimistically: the new board is published before the backend
//! is asked, and if the backend refuses, the whole board is fetched again
//! rather than undone locally.

use std::sync::Arc;

use fieldreg_backend::{PipelineItem, PipelineSource};
use fieldreg_fields::{EntityConfiguration, EntityKey};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::board::Board;
use crate::error::{KanbanError, Result};
use crate::transition::{apply_move, StageMove, Transition};

/// What became of a requested move.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// Dropped where it was picked up; nothing sent
    NoOp,
    /// The item was not where the move said; nothing changed or sent
    Ignored,
    /// The backend accepted the move
    Committed {
        item: PipelineItem,
        /// Display label of the target stage
        stage_label: String,
    },
}

/// Board state and stage changes for one entity.
pub struct Pipeline {
    key: EntityKey,
    config: Arc<EntityConfiguration>,
    source: Arc<dyn PipelineSource>,
    board: watch::Sender<Board>,
}

impl Pipeline {
    /// An engine with an empty board; call [`load`](Self::load) to fill it.
    pub fn new(
        key: EntityKey,
        config: Arc<EntityConfiguration>,
        source: Arc<dyn PipelineSource>,
    ) -> Self {
        let initial = Board::from_items(Vec::new(), &config);
        let (board, _) = watch::channel(initial);
        Self {
            key,
            config,
            source,
            board,
        }
    }

    pub fn key(&self) -> &EntityKey {
        &self.key
    }

    pub fn config(&self) -> &EntityConfiguration {
        &self.config
    }

    pub fn subscribe(&self) -> watch::Receiver<Board> {
        self.board.subscribe()
    }

    /// A copy of the current board.
    pub fn board(&self) -> Board {
        self.board.borrow().clone()
    }

    /// Fetch the authoritative grouping and publish it.
    pub async fn load(&self) -> Result<Board> {
        let view = self
            .source
            .kanban_view(&self.key)
            .await
            .map_err(|source| KanbanError::Load {
                key: self.key.clone(),
                source,
            })?;
        let board = Board::from_view(view, &self.config);
        debug!(key = %self.key, items = board.total(), "board loaded");
        self.board.send_replace(board.clone());
        Ok(board)
    }

    /// Publish a board derived from a flat item list.
    pub fn replace_items(&self, items: impl IntoIterator<Item = PipelineItem>) -> Board {
        let board = Board::from_items(items, &self.config);
        self.board.send_replace(board.clone());
        board
    }

    /// Move an item to `to_stage`, locating it on the current board.
    ///
    /// Without an index the item goes to the end of the target column.
    pub async fn move_to(
        &self,
        item_id: &str,
        to_stage: &str,
        to_index: Option<usize>,
    ) -> Result<MoveOutcome> {
        let mv = {
            let board = self.board.borrow();
            let (from_stage, from_index) =
                board
                    .find(item_id)
                    .ok_or_else(|| KanbanError::ItemNotFound {
                        id: item_id.to_string(),
                    })?;
            let end = match board.bucket(to_stage) {
                Some(items) if from_stage == to_stage => items.len() - 1,
                Some(items) => items.len(),
                None => 0,
            };
            StageMove::new(
                item_id,
                (from_stage, from_index),
                (to_stage, to_index.unwrap_or(end)),
            )
        };
        self.move_item(mv).await
    }

    /// Apply a move optimistically, then persist it.
    ///
    /// On rejection the board is refetched and [`KanbanError::MoveRejected`]
    /// returned. The board then reflects the server, not the attempted move.
    pub async fn move_item(&self, mv: StageMove) -> Result<MoveOutcome> {
        let mut skipped = None;
        self.board.send_if_modified(|board| match apply_move(board, &mv) {
            Transition::Applied(next) => {
                *board = next;
                true
            }
            other => {
                skipped = Some(other);
                false
            }
        });

        match skipped {
            Some(Transition::NoOp) => return Ok(MoveOutcome::NoOp),
            Some(_) => {
                debug!(item_id = %mv.item_id, from = %mv.from_stage, index = mv.from_index, "ignoring stale move");
                return Ok(MoveOutcome::Ignored);
            }
            None => {}
        }

        debug!(key = %self.key, item_id = %mv.item_id, to = %mv.to_stage, "optimistic move published");
        match self
            .source
            .move_item(&self.key, &mv.item_id, &mv.to_stage)
            .await
        {
            Ok(item) => {
                let stage_label = self.stage_label(&mv.to_stage);
                info!(key = %self.key, item_id = %mv.item_id, stage = %mv.to_stage, "item moved to {stage_label}");
                Ok(MoveOutcome::Committed { item, stage_label })
            }
            Err(err) => {
                warn!(key = %self.key, item_id = %mv.item_id, stage = %mv.to_stage, error = %err, "move rejected, resyncing board");
                let rejected = KanbanError::rejected(&mv.item_id, &mv.to_stage, err);
                match self.load().await {
                    Ok(_) => Err(rejected),
                    Err(KanbanError::Load { source, .. }) => {
                        warn!(key = %self.key, error = %source, "resync failed");
                        Err(KanbanError::ResyncFailed {
                            item_id: mv.item_id,
                            stage: mv.to_stage,
                            message: rejected.to_string(),
                            resync: source,
                        })
                    }
                    Err(other) => Err(other),
                }
            }
        }
    }

    fn stage_label(&self, stage: &str) -> String {
        self.config
            .stage_for(stage)
            .map(|s| s.display_label().to_string())
            .unwrap_or_else(|| stage.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldreg_backend::MemoryBackend;
    use fieldreg_fields::StageDefinition;

    fn setup() -> (Arc<MemoryBackend>, Pipeline) {
        let config = EntityConfiguration {
            module: "crm".into(),
            entity: "leads".into(),
            kanban_stages: vec![
                StageDefinition::new("new", "New"),
                StageDefinition::new("qualified", "Qualified"),
                StageDefinition::new("lost", "Lost"),
            ],
            ..EntityConfiguration::default()
        };
        let backend = Arc::new(MemoryBackend::new());
        backend.set_config(config.clone());
        let key = config.key();
        for (id, status) in [("a", "new"), ("b", "new"), ("c", "new"), ("q", "qualified")] {
            backend.insert_item(&key, PipelineItem::new(id, status));
        }
        let pipeline = Pipeline::new(
            key,
            Arc::new(config),
            Arc::clone(&backend) as Arc<dyn PipelineSource>,
        );
        (backend, pipeline)
    }

    #[tokio::test]
    async fn test_committed_move_reports_label() {
        let (backend, pipeline) = setup();
        pipeline.load().await.unwrap();

        let outcome = pipeline
            .move_item(StageMove::new("a", ("new", 0), ("qualified", 0)))
            .await
            .unwrap();
        let MoveOutcome::Committed { item, stage_label } = outcome else {
            panic!("expected commit");
        };
        assert_eq!(item.status, "qualified");
        assert_eq!(stage_label, "Qualified");
        assert_eq!(backend.move_requests(), 1);
        assert_eq!(pipeline.board().find("a"), Some(("qualified", 0)));
    }

    #[tokio::test]
    async fn test_reorder_keeps_local_order() {
        let (backend, pipeline) = setup();
        pipeline.load().await.unwrap();
        let outcome = pipeline
            .move_item(StageMove::new("c", ("new", 2), ("new", 0)))
            .await
            .unwrap();
        assert!(matches!(outcome, MoveOutcome::Committed { .. }));
        assert_eq!(backend.move_requests(), 1);
        assert_eq!(pipeline.board().find("c"), Some(("new", 0)));
        assert_eq!(pipeline.board().bucket("new").unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_stale_and_noop_moves_send_nothing() {
        let (backend, pipeline) = setup();
        pipeline.load().await.unwrap();
        let before = pipeline.board();

        let outcome = pipeline
            .move_item(StageMove::new("a", ("new", 1), ("lost", 0)))
            .await
            .unwrap();
        assert_eq!(outcome, MoveOutcome::Ignored);
        let outcome = pipeline
            .move_item(StageMove::new("a", ("new", 0), ("new", 0)))
            .await
            .unwrap();
        assert_eq!(outcome, MoveOutcome::NoOp);

        assert_eq!(pipeline.board(), before);
        assert_eq!(backend.move_requests(), 0);
    }

    #[tokio::test]
    async fn test_move_to_locates_item() {
        let (_backend, pipeline) = setup();
        pipeline.load().await.unwrap();

        pipeline.move_to("b", "lost", None).await.unwrap();
        assert_eq!(pipeline.board().find("b"), Some(("lost", 0)));

        pipeline.move_to("a", "new", None).await.unwrap();
        assert_eq!(pipeline.board().find("a"), Some(("new", 1)));

        let err = pipeline.move_to("zzz", "lost", None).await.unwrap_err();
        assert!(matches!(err, KanbanError::ItemNotFound { .. }));
    }

    #[tokio::test]
    async fn test_failed_resync_keeps_both_errors() {
        let (backend, pipeline) = setup();
        pipeline.load().await.unwrap();
        backend.fail_next_move(409, Some("Lead is locked"));
        backend.fail_next_kanban(503, None);

        let err = pipeline
            .move_item(StageMove::new("a", ("new", 0), ("lost", 0)))
            .await
            .unwrap_err();
        let KanbanError::ResyncFailed { message, .. } = &err else {
            panic!("expected resync failure, got {err:?}");
        };
        assert_eq!(message, "Lead is locked");
        assert!(err.is_retryable());
    }
}
