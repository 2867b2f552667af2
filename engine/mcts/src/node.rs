//! Arena node for the search tree.

use game_core::{Board, Player, Verdict};

/// Index of a node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel for "no node", used as the root's parent.
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One position in the search tree.
///
/// `score_sum` accumulates outcomes from the perspective of the player
/// who moved into this node, so a high mean score means the move that
/// produced this position is good for the player who made it.
#[derive(Debug, Clone)]
pub struct SearchNode {
    pub parent: NodeId,
    /// Move that produced this position. `None` only at the root.
    pub mv: Option<usize>,
    pub board: Board,
    pub player_to_move: Player,
    /// Set when the position is decided; terminal nodes are never
    /// expanded or rolled out.
    pub verdict: Option<Verdict>,
    /// Legal moves not yet expanded into children.
    pub untried: Vec<usize>,
    pub children: Vec<NodeId>,
    pub visit_count: u32,
    pub score_sum: f64,
}

impl SearchNode {
    pub fn new(
        parent: NodeId,
        mv: Option<usize>,
        board: Board,
        player_to_move: Player,
        verdict: Option<Verdict>,
        untried: Vec<usize>,
    ) -> Self {
        Self {
            parent,
            mv,
            board,
            player_to_move,
            verdict,
            untried,
            children: Vec::new(),
            visit_count: 0,
            score_sum: 0.0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.verdict.is_some()
    }

    pub fn is_fully_expanded(&self) -> bool {
        self.untried.is_empty()
    }

    /// Mean outcome over all visits, 0.0 before the first visit.
    pub fn mean_score(&self) -> f64 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.score_sum / f64::from(self.visit_count)
        }
    }

    /// UCB1 selection score. Unvisited nodes score infinity so every
    /// child is tried once before any is revisited.
    pub fn ucb1(&self, parent_visits: u32, exploration: f64) -> f64 {
        if self.visit_count == 0 {
            return f64::INFINITY;
        }
        let n = f64::from(self.visit_count);
        self.score_sum / n + exploration * (f64::from(parent_visits).ln() / n).sqrt()
    }

    /// Folds one simulation outcome into the running statistics.
    pub fn record(&mut self, outcome: f64) {
        self.visit_count += 1;
        self.score_sum += outcome;
    }
}
