//! Arena node storage for the search tree.

use crate::GameState;

/// Index of a node in its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node in the Monte Carlo Search Tree.
///
/// Each node owns the state reached by applying `action` to its parent's state. Untried
/// actions are computed once when the node is created and drained by expansion.
#[derive(Debug, Clone)]
pub struct Node<S: GameState> {
    pub(crate) state: S,
    pub(crate) action: Option<S::Move>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) untried: Vec<S::Move>,
    /// Completed visits.
    pub(crate) visits: u32,
    /// Visits added by in-flight rollouts, removed again on backpropagation.
    pub(crate) virtual_visits: u32,
    /// Sum of rewards from the controlled player's perspective.
    pub(crate) total_reward: f64,
    pub(crate) terminal: bool,
}

impl<S: GameState> Node<S> {
    pub fn new(mut state: S, action: Option<S::Move>, parent: Option<NodeId>) -> Self {
        let untried = if state.is_terminal() {
            Vec::new()
        } else {
            state.get_possible_moves()
        };
        // Enumerating may itself end the game.
        let terminal = state.is_terminal();
        Self {
            state,
            action,
            parent,
            children: Vec::new(),
            untried,
            visits: 0,
            virtual_visits: 0,
            total_reward: 0.0,
            terminal,
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn action(&self) -> Option<&S::Move> {
        self.action.as_ref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn untried(&self) -> &[S::Move] {
        &self.untried
    }

    pub fn visits(&self) -> u32 {
        self.visits
    }

    pub fn total_reward(&self) -> f64 {
        self.total_reward
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Whether every legal action already has a child.
    pub fn is_fully_expanded(&self) -> bool {
        self.untried.is_empty()
    }

    /// Average reward over completed visits, or `None` before the first visit.
    pub fn exploitation(&self) -> Option<f64> {
        (self.visits > 0).then(|| self.total_reward / f64::from(self.visits))
    }

    /// Calculates the UCB1 (Upper Confidence Bound 1) score for this node.
    /// This score balances exploration and exploitation.
    ///
    /// # Arguments
    /// * `parent_visits` - The number of visits to the parent node.
    /// * `exploration_parameter` - A constant to tune the level of exploration.
    pub fn ucb1(&self, parent_visits: u32, exploration_parameter: f64) -> f64 {
        let visits = self.visits + self.virtual_visits;
        if visits == 0 {
            f64::INFINITY
        } else {
            let visits = f64::from(visits);
            // In-flight visits count as zero reward.
            self.total_reward / visits
                + exploration_parameter * (f64::from(parent_visits.max(1)).ln() / visits).sqrt()
        }
    }
}
