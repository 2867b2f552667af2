//! Arena-backed search tree.

use game_core::{Board, Player};
use thiserror::Error;

use crate::node::{NodeId, SearchNode};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("move {mv} is not an untried move of node {node:?}")]
    UntriedMoveMissing { node: NodeId, mv: usize },
}

/// Aggregate statistics for a finished or in-flight search.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeStats {
    pub node_count: usize,
    pub root_visits: u32,
    pub max_depth: usize,
}

/// Search tree with all nodes owned by a single arena. Child and
/// parent links are arena indices, so positions deep in the tree are
/// reachable without any shared ownership.
#[derive(Debug)]
pub struct SearchTree {
    nodes: Vec<SearchNode>,
}

impl SearchTree {
    pub const ROOT: NodeId = NodeId(0);

    /// Builds a tree whose root holds `board` with `player_to_move` to
    /// act and `untried` as its unexpanded moves.
    pub fn new(board: Board, player_to_move: Player, untried: Vec<usize>) -> Self {
        let root = SearchNode::new(NodeId::NONE, None, board, player_to_move, None, untried);
        Self { nodes: vec![root] }
    }

    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id.index()]
    }

    pub fn root(&self) -> &SearchNode {
        self.get(Self::ROOT)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Child of `id` with the highest UCB1 score. Ties keep the
    /// first-encountered child. `None` if the node is childless.
    pub fn select_child(&self, id: NodeId, exploration: f64) -> Option<NodeId> {
        let parent = self.get(id);
        let mut best: Option<(NodeId, f64)> = None;
        for &child in &parent.children {
            let score = self.get(child).ucb1(parent.visit_count, exploration);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((child, score)),
            }
        }
        best.map(|(child, _)| child)
    }

    /// Expands `mv` out of `parent`'s untried set into a new child.
    pub fn add_child(&mut self, parent: NodeId, mv: usize, node: SearchNode) -> Result<NodeId, TreeError> {
        let parent_node = self.get_mut(parent);
        let Some(pos) = parent_node.untried.iter().position(|&m| m == mv) else {
            return Err(TreeError::UntriedMoveMissing { node: parent, mv });
        };
        parent_node.untried.swap_remove(pos);
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.get_mut(parent).children.push(id);
        Ok(id)
    }

    /// Records `outcome` at `from` and walks to the root, flipping the
    /// perspective at every level. The root is updated too.
    pub fn backpropagate(&mut self, from: NodeId, outcome: f64) {
        let mut id = from;
        let mut value = outcome;
        loop {
            let node = self.get_mut(id);
            node.record(value);
            if node.parent == NodeId::NONE {
                break;
            }
            id = node.parent;
            value = 1.0 - value;
        }
    }

    /// Root child with the most visits; ties keep the first child
    /// expanded. `None` when the root has no children.
    pub fn best_move(&self) -> Option<usize> {
        let root = self.root();
        let mut best: Option<(&SearchNode, u32)> = None;
        for &child in &root.children {
            let node = self.get(child);
            match best {
                Some((_, visits)) if node.visit_count <= visits => {}
                _ => best = Some((node, node.visit_count)),
            }
        }
        best.and_then(|(node, _)| node.mv)
    }

    /// Visit share of each root child, keyed by move, normalised by
    /// the root's own visit count.
    pub fn visit_fractions(&self) -> Vec<(usize, f64)> {
        let root = self.root();
        if root.visit_count == 0 {
            return Vec::new();
        }
        let total = f64::from(root.visit_count);
        root.children
            .iter()
            .filter_map(|&child| {
                let node = self.get(child);
                node.mv.map(|mv| (mv, f64::from(node.visit_count) / total))
            })
            .collect()
    }

    pub fn stats(&self) -> TreeStats {
        TreeStats {
            node_count: self.nodes.len(),
            root_visits: self.root().visit_count,
            max_depth: self.max_depth(),
        }
    }

    fn max_depth(&self) -> usize {
        let mut max = 0;
        for node in &self.nodes {
            let mut depth = 0;
            let mut parent = node.parent;
            while parent != NodeId::NONE {
                depth += 1;
                parent = self.get(parent).parent;
            }
            max = max.max(depth);
        }
        max
    }
}
