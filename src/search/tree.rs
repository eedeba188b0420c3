//! Arena-allocated search tree.
//!
//! Nodes live in one `Vec` and refer to each other by [`NodeId`], so there are no ownership
//! cycles between parents and children. The tree only grows during a search; advancing the
//! root copies the kept subtree into a fresh arena.

use std::collections::VecDeque;

use rand::Rng;

use super::node::{Node, NodeId};
use crate::error::SearchError;
use crate::GameState;

#[derive(Debug, Clone)]
pub struct SearchTree<S: GameState> {
    nodes: Vec<Node<S>>,
    root: NodeId,
}

impl<S: GameState> SearchTree<S> {
    pub fn new(root_state: S) -> Self {
        Self {
            nodes: vec![Node::new(root_state, None, None)],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &Node<S> {
        self.get(self.root)
    }

    pub fn get(&self, id: NodeId) -> &Node<S> {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Descends from the root by UCB1 until reaching a terminal node, a node with untried
    /// actions, or a node without children.
    pub fn select(&self, exploration: f64) -> NodeId {
        let mut current = self.root;
        loop {
            let node = self.get(current);
            if node.terminal || !node.is_fully_expanded() || node.children.is_empty() {
                return current;
            }
            let parent_visits = node.visits + node.virtual_visits;
            let best = node.children.iter().copied().max_by(|&a, &b| {
                let a_ucb = self.get(a).ucb1(parent_visits, exploration);
                let b_ucb = self.get(b).ucb1(parent_visits, exploration);
                a_ucb.partial_cmp(&b_ucb).unwrap_or(std::cmp::Ordering::Equal)
            });
            match best {
                Some(child) => current = child,
                None => return current,
            }
        }
    }

    /// Expands one untried action of `id`, chosen uniformly, and returns the new child.
    /// Returns `id` itself when there is nothing to expand.
    pub fn expand<R: Rng + ?Sized>(&mut self, id: NodeId, rng: &mut R) -> NodeId {
        let node = &mut self.nodes[id.0];
        if node.terminal || node.is_fully_expanded() {
            return id;
        }
        let pick = rng.random_range(0..node.untried.len());
        let action = node.untried.remove(pick);
        let mut state = node.state.clone();
        state.make_move(&action, rng);

        let child = NodeId(self.nodes.len());
        self.nodes.push(Node::new(state, Some(action), Some(id)));
        self.nodes[id.0].children.push(child);
        child
    }

    /// Adds in-flight visits on the path from `leaf` to the root.
    pub fn add_virtual_visits(&mut self, leaf: NodeId, amount: u32) {
        let mut current = Some(leaf);
        while let Some(id) = current {
            let node = &mut self.nodes[id.0];
            node.virtual_visits += amount;
            current = node.parent;
        }
    }

    /// Records `reward` on every node from `leaf` up to the root, inclusive, and removes the
    /// in-flight visits added for this path.
    pub fn backpropagate(&mut self, leaf: NodeId, reward: f64, virtual_loss: u32) {
        let mut current = Some(leaf);
        while let Some(id) = current {
            let node = &mut self.nodes[id.0];
            node.visits += 1;
            node.total_reward += reward;
            node.virtual_visits = node.virtual_visits.saturating_sub(virtual_loss);
            current = node.parent;
        }
    }

    /// The child of `id` reached by `action`.
    pub fn child_with_action(&self, id: NodeId, action: &S::Move) -> Result<NodeId, SearchError> {
        self.get(id)
            .children
            .iter()
            .copied()
            .find(|&c| self.get(c).action.as_ref() == Some(action))
            .ok_or_else(|| SearchError::ChildNotFound(format!("{action:?}")))
    }

    /// The visited root child with the highest average reward.
    pub fn best_child(&self) -> Option<NodeId> {
        self.root_node()
            .children
            .iter()
            .copied()
            .filter_map(|c| self.get(c).exploitation().map(|value| (c, value)))
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(c, _)| c)
    }

    /// Makes `new_root` the root, keeping only its subtree. Surviving nodes keep their
    /// statistics and are re-indexed into a fresh arena.
    pub fn reroot(&mut self, new_root: NodeId) {
        let mut old: Vec<Option<Node<S>>> = std::mem::take(&mut self.nodes)
            .into_iter()
            .map(Some)
            .collect();
        let mut queue = VecDeque::from([(new_root, None::<NodeId>)]);

        while let Some((old_id, new_parent)) = queue.pop_front() {
            let Some(mut node) = old.get_mut(old_id.0).and_then(Option::take) else {
                continue;
            };
            let new_id = NodeId(self.nodes.len());
            let children = std::mem::take(&mut node.children);
            node.parent = new_parent;
            if new_parent.is_none() {
                node.action = None;
            }
            self.nodes.push(node);
            if let Some(parent) = new_parent {
                self.nodes[parent.0].children.push(new_id);
            }
            queue.extend(children.into_iter().map(|c| (c, Some(new_id))));
        }
        self.root = NodeId(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    /// Counts up from zero; each move adds its value and the game ends at `limit` or above.
    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        total: u32,
        limit: u32,
    }

    impl GameState for Counter {
        type Move = u32;

        fn get_possible_moves(&mut self) -> Vec<u32> {
            vec![1, 2]
        }

        fn make_move<R: Rng + ?Sized>(&mut self, mv: &u32, _rng: &mut R) {
            self.total += mv;
        }

        fn is_terminal(&self) -> bool {
            self.total >= self.limit
        }

        fn reward(&self) -> f64 {
            f64::from(self.total)
        }
    }

    fn tree() -> SearchTree<Counter> {
        SearchTree::new(Counter { total: 0, limit: 10 })
    }

    #[test]
    fn test_unvisited_child_has_infinite_ucb() {
        let mut t = tree();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let child = t.expand(t.root(), &mut rng);
        assert_eq!(t.get(child).ucb1(1, 1.4), f64::INFINITY);
        t.backpropagate(child, 1.0, 0);
        assert!(t.get(child).ucb1(1, 1.4).is_finite());
    }

    #[test]
    fn test_ucb_prefers_higher_average_at_equal_visits() {
        let mut t = tree();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let a = t.expand(t.root(), &mut rng);
        let b = t.expand(t.root(), &mut rng);
        t.backpropagate(a, 3.0, 0);
        t.backpropagate(b, 1.0, 0);
        let parent = t.root_node().visits();
        assert!(t.get(a).ucb1(parent, 1.4) > t.get(b).ucb1(parent, 1.4));
        assert_eq!(t.select(1.4), a);
        assert_eq!(t.best_child(), Some(a));
    }

    #[test]
    fn test_select_stops_at_untried_actions() {
        let mut t = tree();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        assert_eq!(t.select(1.4), t.root());
        let child = t.expand(t.root(), &mut rng);
        t.backpropagate(child, 1.0, 0);
        assert_eq!(t.root_node().untried().len(), 1);
        assert_eq!(t.select(1.4), t.root());

        let other = t.expand(t.root(), &mut rng);
        t.backpropagate(other, 1.0, 0);
        assert!(t.root_node().is_fully_expanded());
        assert!(t.root_node().untried().is_empty());
        assert_ne!(t.select(1.4), t.root());
    }

    #[test]
    fn test_backpropagate_reaches_root_and_clears_virtual_visits() {
        let mut t = tree();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let child = t.expand(t.root(), &mut rng);
        let grandchild = t.expand(child, &mut rng);
        t.add_virtual_visits(grandchild, 1);
        assert_eq!(t.get(child).virtual_visits, 1);
        t.backpropagate(grandchild, 2.5, 1);
        for id in [grandchild, child, t.root()] {
            assert_eq!(t.get(id).visits(), 1);
            assert!((t.get(id).total_reward() - 2.5).abs() < 1e-12);
            assert_eq!(t.get(id).virtual_visits, 0);
        }
    }

    #[test]
    fn test_child_lookup_by_unexpanded_action_fails() {
        let mut t = tree();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let child = t.expand(t.root(), &mut rng);
        let action = *t.get(child).action().unwrap();
        assert_eq!(t.child_with_action(t.root(), &action).unwrap(), child);
        let other = if action == 1 { 2 } else { 1 };
        assert!(matches!(
            t.child_with_action(t.root(), &other),
            Err(SearchError::ChildNotFound(_))
        ));
    }

    #[test]
    fn test_reroot_keeps_statistics_and_reindexes() {
        let mut t = tree();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let a = t.expand(t.root(), &mut rng);
        let b = t.expand(t.root(), &mut rng);
        let a1 = t.expand(a, &mut rng);
        let a2 = t.expand(a, &mut rng);
        t.backpropagate(a1, 1.0, 0);
        t.backpropagate(a2, 3.0, 0);
        t.backpropagate(b, 5.0, 0);
        let kept_state = t.get(a).state().clone();

        t.reroot(a);
        let sub = t;
        assert_eq!(sub.len(), 3);
        let root = sub.root_node();
        assert!(root.parent().is_none());
        assert!(root.action().is_none());
        assert_eq!(root.visits(), 2);
        assert_eq!(*root.state(), kept_state);
        for &c in root.children() {
            assert_eq!(sub.get(c).parent(), Some(sub.root()));
        }
    }

    #[test]
    fn test_terminal_node_is_not_expanded() {
        let mut t = SearchTree::new(Counter { total: 10, limit: 10 });
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        assert!(t.root_node().is_terminal());
        assert_eq!(t.expand(t.root(), &mut rng), t.root());
        assert_eq!(t.len(), 1);
    }
}
