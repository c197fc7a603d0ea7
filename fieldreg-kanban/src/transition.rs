//! The pure move transition: `(board, move) -> board'`

use serde::{Deserialize, Serialize};

use crate::board::Board;

/// A drag of one item from a position to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageMove {
    pub item_id: String,
    pub from_stage: String,
    pub from_index: usize,
    pub to_stage: String,
    pub to_index: usize,
}

impl StageMove {
    pub fn new(
        item_id: impl Into<String>,
        (from_stage, from_index): (&str, usize),
        (to_stage, to_index): (&str, usize),
    ) -> Self {
        Self {
            item_id: item_id.into(),
            from_stage: from_stage.to_string(),
            from_index,
            to_stage: to_stage.to_string(),
            to_index,
        }
    }

    /// Dropped where it was picked up.
    pub fn is_noop(&self) -> bool {
        self.from_stage == self.to_stage && self.from_index == self.to_index
    }

    pub fn changes_stage(&self) -> bool {
        self.from_stage != self.to_stage
    }
}

/// Result of applying a move to a board.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Source and destination are the same slot
    NoOp,
    /// The item is not at the source slot; the move is stale
    Ignored,
    /// The board after the move
    Applied(Board),
}

/// Apply `mv` to a copy of `board`.
///
/// The item is removed from its source slot, its status set to the target
/// stage and inserted at `to_index` (clamped to the bucket length). A target
/// bucket that does not exist yet is created. The input board is never
/// modified.
pub fn apply_move(board: &Board, mv: &StageMove) -> Transition {
    if mv.is_noop() {
        return Transition::NoOp;
    }
    let at_source = board
        .buckets
        .get(&mv.from_stage)
        .and_then(|items| items.get(mv.from_index))
        .is_some_and(|item| item.id == mv.item_id);
    if !at_source {
        return Transition::Ignored;
    }

    let mut next = board.clone();
    let Some(source) = next.buckets.get_mut(&mv.from_stage) else {
        return Transition::Ignored;
    };
    let mut item = source.remove(mv.from_index);
    item.status = mv.to_stage.clone();

    let target = next.buckets.entry(mv.to_stage.clone()).or_default();
    let index = mv.to_index.min(target.len());
    target.insert(index, item);
    Transition::Applied(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldreg_backend::PipelineItem;
    use fieldreg_fields::{EntityConfiguration, StageDefinition};

    fn board() -> Board {
        let config = EntityConfiguration {
            kanban_stages: vec![
                StageDefinition::new("new", "New"),
                StageDefinition::new("qualified", "Qualified"),
                StageDefinition::new("lost", "Lost"),
            ],
            ..EntityConfiguration::default()
        };
        Board::from_items(
            vec![
                PipelineItem::new("a", "new"),
                PipelineItem::new("b", "new"),
                PipelineItem::new("c", "new"),
                PipelineItem::new("q", "qualified"),
            ],
            &config,
        )
    }

    fn ids(board: &Board, stage: &str) -> Vec<String> {
        board
            .bucket(stage)
            .unwrap()
            .iter()
            .map(|i| i.id.clone())
            .collect()
    }

    fn applied(transition: Transition) -> Board {
        match transition {
            Transition::Applied(board) => board,
            other => panic!("expected an applied move, got {other:?}"),
        }
    }

    #[test]
    fn test_move_across_stages() {
        let before = board();
        let after = applied(apply_move(&before, &StageMove::new("a", ("new", 0), ("qualified", 0))));

        assert_eq!(ids(&after, "new"), vec!["b", "c"]);
        assert_eq!(ids(&after, "qualified"), vec!["a", "q"]);
        assert_eq!(after.bucket("qualified").unwrap()[0].status, "qualified");
        assert_eq!(ids(&before, "new"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_reorder_within_stage() {
        let after = applied(apply_move(&board(), &StageMove::new("c", ("new", 2), ("new", 0))));
        assert_eq!(ids(&after, "new"), vec!["c", "a", "b"]);
        assert_eq!(after.total(), 4);

        let after = applied(apply_move(&board(), &StageMove::new("a", ("new", 0), ("new", 2))));
        assert_eq!(ids(&after, "new"), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_into_empty_column_and_emptying_a_column() {
        let after = applied(apply_move(&board(), &StageMove::new("q", ("qualified", 0), ("lost", 0))));
        assert_eq!(after.bucket("qualified"), Some(&[][..]));
        assert_eq!(ids(&after, "lost"), vec!["q"]);
    }

    #[test]
    fn test_index_past_end_is_clamped() {
        let after = applied(apply_move(&board(), &StageMove::new("q", ("qualified", 0), ("new", 99))));
        assert_eq!(ids(&after, "new"), vec!["a", "b", "c", "q"]);
    }

    #[test]
    fn test_noop_and_stale_moves() {
        let board = board();
        assert_eq!(
            apply_move(&board, &StageMove::new("b", ("new", 1), ("new", 1))),
            Transition::NoOp
        );
        // Wrong index for the item
        assert_eq!(
            apply_move(&board, &StageMove::new("b", ("new", 0), ("lost", 0))),
            Transition::Ignored
        );
        // Unknown source stage
        assert_eq!(
            apply_move(&board, &StageMove::new("b", ("won", 0), ("lost", 0))),
            Transition::Ignored
        );
        // Index out of range
        assert_eq!(
            apply_move(&board, &StageMove::new("b", ("new", 7), ("lost", 0))),
            Transition::Ignored
        );
    }

    #[test]
    fn test_missing_target_bucket_is_created() {
        let after = applied(apply_move(&board(), &StageMove::new("a", ("new", 0), ("archived", 0))));
        assert_eq!(ids(&after, "archived"), vec!["a"]);
    }
}
