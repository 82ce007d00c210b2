use ns_utils::BlockPos;

use crate::goal::Goal;
use crate::movement::Move;

/// An immutable planned route: the feet cells visited in order, the goal
/// it was planned against, and whether the final cell satisfies it.
#[derive(Clone, Debug)]
pub struct Path {
    positions: Vec<BlockPos>,
    pub goal: Goal,
    pub reaches_goal: bool,
    /// Nodes the producing search expanded, for diagnostics.
    pub nodes_considered: usize,
}

impl Path {
    /// Every consecutive pair must be a legal movement offset; a path
    /// with a teleporting edge is a construction bug.
    pub fn new(
        positions: Vec<BlockPos>,
        goal: Goal,
        reaches_goal: bool,
        nodes_considered: usize,
    ) -> Path {
        debug_assert!(!positions.is_empty());
        debug_assert!(
            positions
                .windows(2)
                .all(|w| Move::between(w[0], w[1]).is_some()),
            "discontiguous path"
        );
        Path {
            positions,
            goal,
            reaches_goal,
            nodes_considered,
        }
    }

    pub fn positions(&self) -> &[BlockPos] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn start(&self) -> BlockPos {
        self.positions[0]
    }

    pub fn end(&self) -> BlockPos {
        self.positions[self.positions.len() - 1]
    }

    /// Re-synthesizes the movement per consecutive pair. Infallible for
    /// a path built through [`Path::new`].
    pub fn movements(&self) -> Vec<Move> {
        self.positions
            .windows(2)
            .filter_map(|w| Move::between(w[0], w[1]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::MoveKind;

    #[test]
    fn movements_cover_every_edge() {
        let path = Path::new(
            vec![
                BlockPos::new(0, 65, 0),
                BlockPos::new(1, 65, 0),
                BlockPos::new(1, 66, 1),
                BlockPos::new(1, 67, 1),
            ],
            Goal::Block(BlockPos::new(1, 67, 1)),
            true,
            42,
        );
        let moves = path.movements();
        assert_eq!(moves.len(), 3);
        assert_eq!(moves[0].kind, MoveKind::Traverse);
        assert_eq!(moves[1].kind, MoveKind::Diagonal);
        assert_eq!(moves[2].kind, MoveKind::Pillar);
        assert_eq!(path.end(), BlockPos::new(1, 67, 1));
    }

    #[test]
    #[should_panic(expected = "discontiguous")]
    #[cfg(debug_assertions)]
    fn teleporting_edge_is_rejected() {
        let _ = Path::new(
            vec![BlockPos::new(0, 65, 0), BlockPos::new(7, 65, 0)],
            Goal::Block(BlockPos::new(7, 65, 0)),
            true,
            1,
        );
    }
}
