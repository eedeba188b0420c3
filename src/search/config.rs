//! Search configuration parameters.

use std::time::Duration;

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Number of selection/expansion/rollout/backpropagation iterations per search.
    pub iterations: u32,

    /// Exploration constant `c` of the UCB1 formula.
    pub exploration: f64,

    /// Maximum number of actions applied in one rollout. `None` plays to the end.
    pub max_rollout_depth: Option<u32>,

    /// Wall-clock budget for one search. Checked by the iteration loop and by every rollout.
    pub time_limit: Option<Duration>,

    /// Worker threads. 1 runs the search on the calling thread, deterministically.
    pub num_threads: usize,

    /// Visits added along a selected path while its rollout is in flight, so concurrent
    /// workers spread out. 0 disables virtual loss.
    pub virtual_loss: u32,

    /// Seed for searches that are not handed a random source.
    pub seed: u64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            exploration: std::f64::consts::SQRT_2,
            max_rollout_depth: Some(1000),
            time_limit: None,
            num_threads: 1,
            virtual_loss: 1,
            seed: 0,
        }
    }
}

impl MctsConfig {
    /// Create a small, fast config for tests.
    pub fn for_testing() -> Self {
        Self {
            iterations: 50,
            max_rollout_depth: Some(50),
            ..Self::default()
        }
    }

    /// Builder pattern: set the number of iterations.
    pub fn with_iterations(mut self, n: u32) -> Self {
        self.iterations = n;
        self
    }

    /// Builder pattern: set the UCB1 exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    /// Builder pattern: set the rollout depth cap.
    pub fn with_max_rollout_depth(mut self, depth: Option<u32>) -> Self {
        self.max_rollout_depth = depth;
        self
    }

    /// Builder pattern: set the wall-clock budget.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Builder pattern: set the worker thread count. 0 means one per logical CPU.
    pub fn with_threads(mut self, n: usize) -> Self {
        self.num_threads = if n == 0 { num_cpus::get() } else { n };
        self
    }

    pub fn with_virtual_loss(mut self, visits: u32) -> Self {
        self.virtual_loss = visits;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MctsConfig::default();
        assert_eq!(config.iterations, 1000);
        assert!((config.exploration - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(config.num_threads, 1);
        assert!(config.time_limit.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let config = MctsConfig::default()
            .with_iterations(10)
            .with_exploration(0.5)
            .with_max_rollout_depth(None)
            .with_seed(99);
        assert_eq!(config.iterations, 10);
        assert!((config.exploration - 0.5).abs() < 1e-12);
        assert_eq!(config.max_rollout_depth, None);
        assert_eq!(config.seed, 99);
    }

    #[test]
    fn test_zero_threads_uses_all_cpus() {
        let config = MctsConfig::default().with_threads(0);
        assert_eq!(config.num_threads, num_cpus::get());
    }
}
