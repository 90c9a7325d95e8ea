use std::collections::HashMap;
use std::ops::Index;

/// The outcome of a single environment step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition<S> {
    /// The state observed after the action was applied
    pub state: S,
    /// The reward associated with the transition
    pub reward: f64,
    /// Whether the environment has reached a terminal state
    pub done: bool,
}

/// Represents a Markov decision process, defining the dynamics of an environment
/// in which an agent can operate.
///
/// This base trait represents the common case of a discrete-time MDP with one agent
/// and a finite state space and action space.
pub trait Environment {
    /// A representation of the state of the environment to be passed to an agent
    type State;

    /// A representation of an action that an agent can take to affect the environment
    type Action;

    /// Reset the environment to an initial state
    ///
    /// **Returns** the state
    fn reset(&mut self) -> Self::State;

    /// Update the environment in response to an action taken by an agent
    ///
    /// Stepping an environment that has already reached a terminal state must be
    /// a zero-reward no-op that reports `done` again rather than panicking.
    fn step(&mut self, action: Self::Action) -> Transition<Self::State>;

    /// Dimensional metadata, e.g. `(width, height)` for a grid or
    /// `(position_bins, velocity_bins)` for a discretized continuous space
    ///
    /// Agents use this to size value tables and to validate snapshot compatibility.
    fn dimensions(&self) -> (usize, usize);
}

/// An environment with a fixed, finite action set
pub trait DiscreteActionSpace: Environment {
    /// Get the static action set
    ///
    /// The returned vec should never be empty, instead specify an action that
    /// represents doing nothing if necessary. Its ordering defines the action
    /// indices an agent records values under, so it must be stable.
    fn actions(&self) -> Vec<Self::Action>;
}

/// An environment whose full state space can be enumerated
///
/// Used for policy extraction and debugging, not by the training loop itself.
pub trait EnumerableStateSpace: Environment {
    /// Every state an agent could observe
    fn states(&self) -> Vec<Self::State>;
}

/// An environment with a notion of a goal cell, for goal-conditioned learning
pub trait GoalAware: Environment {
    /// `(Δrow, Δcol)` from the agent's current position to the active goal
    fn delta_to_goal(&self) -> (i32, i32);
}

/// Named per-episode accumulators for environment instrumentation
///
/// Environments bump entries as they step; drivers read them out between
/// episodes with [`Report::take`].
#[derive(Clone, Debug)]
pub struct Report {
    keys: Vec<&'static str>,
    data: HashMap<&'static str, f64>,
}

impl Report {
    pub fn new(keys: Vec<&'static str>) -> Self {
        let data = keys.iter().map(|&k| (k, 0.0)).collect();
        Self { keys, data }
    }

    /// Entry API over a named accumulator
    pub fn entry(&mut self, key: &'static str) -> std::collections::hash_map::Entry<'_, &'static str, f64> {
        self.data.entry(key)
    }

    /// Accumulator names, in declaration order
    pub fn keys(&self) -> &[&'static str] {
        &self.keys
    }

    /// Current values in declaration order, resetting all accumulators to zero
    pub fn take(&mut self) -> Vec<f64> {
        self.keys
            .iter()
            .map(|&k| self.data.insert(k, 0.0).unwrap_or(0.0))
            .collect()
    }
}

impl Index<&str> for Report {
    type Output = f64;

    fn index(&self, key: &str) -> &f64 {
        &self.data[key]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_accumulates_and_resets() {
        let mut report = Report::new(vec!["reward", "steps"]);
        report.entry("steps").and_modify(|x| *x += 1.0);
        report.entry("steps").and_modify(|x| *x += 1.0);
        report.entry("reward").and_modify(|x| *x -= 0.5);
        assert_eq!(report["steps"], 2.0);

        let taken = report.take();
        assert_eq!(taken, vec![-0.5, 2.0]);
        assert_eq!(report["steps"], 0.0);
    }
}
