//! Optimistic moves against a scripted backend.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fieldreg_backend::{BackendError, KanbanView, PipelineItem, PipelineSource, Result};
use fieldreg_fields::{EntityConfiguration, EntityKey, StageDefinition};
use fieldreg_kanban::{Board, KanbanError, MoveOutcome, Pipeline, StageMove};
use tokio::sync::Notify;

/// Serves a fixed sequence of views and fails or holds moves on request.
#[derive(Default)]
struct ScriptedSource {
    views: Mutex<Vec<KanbanView>>,
    reject_moves: bool,
    hold_moves: Option<Arc<Notify>>,
    moves: Mutex<Vec<(String, String)>>,
}

impl ScriptedSource {
    fn push_view(&self, view: KanbanView) {
        self.views.lock().unwrap().push(view);
    }
}

#[async_trait]
impl PipelineSource for ScriptedSource {
    async fn kanban_view(&self, _key: &EntityKey) -> Result<KanbanView> {
        let mut views = self.views.lock().unwrap();
        if views.is_empty() {
            return Err(BackendError::api(503, "no view scripted"));
        }
        Ok(views.remove(0))
    }

    async fn move_item(&self, _key: &EntityKey, item_id: &str, stage: &str) -> Result<PipelineItem> {
        self.moves
            .lock()
            .unwrap()
            .push((item_id.to_string(), stage.to_string()));
        if let Some(gate) = &self.hold_moves {
            gate.notified().await;
        }
        if self.reject_moves {
            return Err(BackendError::Api {
                status: 500,
                detail: None,
            });
        }
        Ok(PipelineItem::new(item_id, stage))
    }
}

fn config() -> EntityConfiguration {
    EntityConfiguration {
        module: "crm".into(),
        entity: "leads".into(),
        kanban_stages: vec![
            StageDefinition::new("new", "New"),
            StageDefinition::new("qualified", "Qualified"),
            StageDefinition::new("lost", "Lost"),
        ],
        ..EntityConfiguration::default()
    }
}

fn view(groups: &[(&str, &[&str])]) -> KanbanView {
    groups
        .iter()
        .map(|(stage, ids)| {
            let items = ids.iter().map(|id| PipelineItem::new(*id, *stage)).collect();
            (stage.to_string(), items)
        })
        .collect()
}

fn ids(board: &Board, stage: &str) -> Vec<String> {
    board
        .bucket(stage)
        .unwrap_or_default()
        .iter()
        .map(|item| item.id.clone())
        .collect()
}

fn pipeline(source: &Arc<ScriptedSource>) -> Pipeline {
    let config = config();
    Pipeline::new(
        config.key(),
        Arc::new(config),
        Arc::clone(source) as Arc<dyn PipelineSource>,
    )
}

#[tokio::test]
async fn move_from_new_to_qualified() {
    let source = Arc::new(ScriptedSource::default());
    source.push_view(view(&[("new", &["x", "y"]), ("qualified", &["z"])]));
    let pipeline = pipeline(&source);
    pipeline.load().await.unwrap();

    let outcome = pipeline
        .move_item(StageMove::new("x", ("new", 0), ("qualified", 0)))
        .await
        .unwrap();
    assert!(matches!(outcome, MoveOutcome::Committed { ref stage_label, .. } if stage_label == "Qualified"));

    let board = pipeline.board();
    assert_eq!(ids(&board, "new"), vec!["y"]);
    let qualified = board.bucket("qualified").unwrap();
    assert_eq!(qualified[0].id, "x");
    assert_eq!(qualified[0].status, "qualified");
    assert_eq!(
        source.moves.lock().unwrap().as_slice(),
        &[("x".to_string(), "qualified".to_string())]
    );
}

#[tokio::test]
async fn reorder_within_stage_preserves_items() {
    let source = Arc::new(ScriptedSource::default());
    source.push_view(view(&[("new", &["a", "b", "c", "d"])]));
    let pipeline = pipeline(&source);
    pipeline.load().await.unwrap();

    pipeline
        .move_item(StageMove::new("c", ("new", 2), ("new", 0)))
        .await
        .unwrap();

    let board = pipeline.board();
    assert_eq!(ids(&board, "new"), vec!["c", "a", "b", "d"]);
    assert_eq!(board.total(), 4);
}

#[tokio::test]
async fn failed_move_resyncs_to_authoritative_state() {
    let source = Arc::new(ScriptedSource {
        reject_moves: true,
        ..ScriptedSource::default()
    });
    source.push_view(view(&[("new", &["x", "y"]), ("qualified", &["z"])]));
    // What the server says after refusing; deliberately unlike both the
    // starting board and the optimistic guess.
    source.push_view(view(&[("new", &["y"]), ("qualified", &["z", "x"])]));
    let pipeline = pipeline(&source);
    pipeline.load().await.unwrap();

    let err = pipeline
        .move_item(StageMove::new("x", ("new", 0), ("lost", 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, KanbanError::MoveRejected { .. }));
    assert_eq!(err.to_string(), "Failed to move item");

    let board = pipeline.board();
    assert_eq!(ids(&board, "new"), vec!["y"]);
    assert_eq!(ids(&board, "qualified"), vec!["z", "x"]);
    assert_eq!(board.bucket("lost"), Some(&[][..]));
}

#[tokio::test]
async fn optimistic_board_published_before_server_answers() {
    let gate = Arc::new(Notify::new());
    let source = Arc::new(ScriptedSource {
        hold_moves: Some(Arc::clone(&gate)),
        ..ScriptedSource::default()
    });
    source.push_view(view(&[("new", &["x"]), ("qualified", &[])]));
    let pipeline = pipeline(&source);
    pipeline.load().await.unwrap();
    let mut rx = pipeline.subscribe();

    let moving = pipeline.move_item(StageMove::new("x", ("new", 0), ("qualified", 0)));
    let observe = async {
        rx.changed().await.unwrap();
        let seen = rx.borrow_and_update().clone();
        gate.notify_one();
        seen
    };
    let (outcome, seen) = tokio::join!(moving, observe);

    assert!(outcome.is_ok());
    assert_eq!(ids(&seen, "qualified"), vec!["x"]);
    assert_eq!(seen.bucket("new"), Some(&[][..]));
}

#[tokio::test]
async fn concurrent_moves_of_different_items_both_land() {
    let gate = Arc::new(Notify::new());
    let source = Arc::new(ScriptedSource {
        hold_moves: Some(Arc::clone(&gate)),
        ..ScriptedSource::default()
    });
    source.push_view(view(&[("new", &["a", "b"]), ("qualified", &[]), ("lost", &[])]));
    let pipeline = pipeline(&source);
    pipeline.load().await.unwrap();

    let first = pipeline.move_item(StageMove::new("a", ("new", 0), ("qualified", 0)));
    // After the first optimistic apply, b sits at index 0.
    let second = pipeline.move_item(StageMove::new("b", ("new", 0), ("lost", 0)));
    let release = async {
        tokio::task::yield_now().await;
        gate.notify_waiters();
    };
    let (first, second, ()) = tokio::join!(first, second, release);
    assert!(first.is_ok());
    assert!(second.is_ok());

    let board = pipeline.board();
    assert!(ids(&board, "new").is_empty());
    assert_eq!(ids(&board, "qualified"), vec!["a"]);
    assert_eq!(ids(&board, "lost"), vec!["b"]);
}
