use std::collections::HashMap;
use std::hash::Hash;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    assert_interval,
    augment::{Augment, Identity},
    decay::{self, Decay},
    env::{DiscreteActionSpace, EnumerableStateSpace, Environment},
    error::{Error, Result},
    exploration::{Choice, EpsilonGreedy},
    snapshot::Snapshot,
    table::{QInit, QTable},
    util::argmax,
};

/// Temporal difference update rule
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    /// Off-policy: bootstraps from the greedy value at the next state,
    /// regardless of which action the policy actually takes next
    QLearning,
    /// On-policy: bootstraps from the value of the action actually selected
    /// for the next step, folding exploration into the estimate
    Sarsa,
}

/// Configuration for a [`TdAgent`]
pub struct TdAgentConfig<D: Decay = decay::Exponential> {
    pub algorithm: Algorithm,
    pub alpha: f64,
    pub gamma: f64,
    pub exploration: EpsilonGreedy<D>,
    pub q_init: QInit,
    /// Safety bound against episodes that never reach a terminal state;
    /// defaults to `width * height * 2` of the bound environment
    pub max_steps_per_episode: Option<usize>,
    /// Seed for the agent's RNG; unseeded agents draw from entropy
    pub seed: Option<u64>,
}

impl Default for TdAgentConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::QLearning,
            alpha: 0.7,
            gamma: 0.99,
            exploration: EpsilonGreedy::new(decay::Exponential::new(0.1, 1.0, 0.01).unwrap()),
            q_init: QInit::Zero,
            max_steps_per_episode: None,
            seed: None,
        }
    }
}

/// Statistics for one training episode
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpisodeSummary {
    pub episode: u32,
    pub steps: usize,
    pub total_reward: f64,
    /// False when the episode was truncated by the step budget
    pub terminated: bool,
}

/// Result of one greedy evaluation episode
#[derive(Clone, Debug)]
pub struct Evaluation<S> {
    pub steps: usize,
    pub total_reward: f64,
    /// True iff the environment reached a terminal state within the step budget
    pub success: bool,
    /// Every state visited, starting with the initial state
    pub path: Vec<S>,
}

/// Hooks and bounds for a call to [`TdAgent::train`]
///
/// All hooks are observation points: they cannot steer the loop, except that
/// returning [`ControlFlow::Break`] from the episode hook or setting the stop
/// flag ends training cleanly with the value table intact.
pub struct TrainOptions<'a> {
    episodes: u32,
    progress_every: u32,
    on_progress: Option<Box<dyn FnMut(u32, u32, f64) + 'a>>,
    on_episode: Option<Box<dyn FnMut(u32, f64, &[f64]) -> ControlFlow<()> + 'a>>,
    pace: Option<Box<dyn FnMut() + 'a>>,
    stop: Option<Arc<AtomicBool>>,
}

impl<'a> TrainOptions<'a> {
    pub fn new(episodes: u32) -> Self {
        Self {
            episodes,
            progress_every: 100,
            on_progress: None,
            on_episode: None,
            pace: None,
            stop: None,
        }
    }

    /// Cadence of the progress hook, in episodes
    pub fn progress_every(mut self, episodes: u32) -> Self {
        assert!(episodes > 0, "progress cadence must be positive");
        self.progress_every = episodes;
        self
    }

    /// Invoked as `(episode, total_episodes, latest_total_reward)` at the
    /// configured cadence
    pub fn on_progress(mut self, hook: impl FnMut(u32, u32, f64) + 'a) -> Self {
        self.on_progress = Some(Box::new(hook));
        self
    }

    /// Invoked as `(episode, total_reward, rewards_so_far)` once per finished
    /// episode; `ControlFlow::Break` stops training
    pub fn on_episode(mut self, hook: impl FnMut(u32, f64, &[f64]) -> ControlFlow<()> + 'a) -> Self {
        self.on_episode = Some(Box::new(hook));
        self
    }

    /// Invoked between simulated steps; the cooperative yield point where a
    /// driver may sleep for animation pacing. Training numerics do not depend
    /// on what this hook does.
    pub fn pace(mut self, hook: impl FnMut() + 'a) -> Self {
        self.pace = Some(Box::new(hook));
        self
    }

    /// Cooperative cancellation flag, checked between episodes
    pub fn stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop = Some(flag);
        self
    }
}

/// A tabular temporal-difference agent
///
/// One engine covers Q-learning and SARSA over any environment with discrete
/// state and action spaces, keyed through a pluggable [`Augment`] strategy.
///
/// ### Generics
/// - `E` - The [`Environment`] in which the agent will learn
///     - The state and action spaces must both be discrete because a value is
///       recorded per state-action pair, and the state type must be `Copy`,
///       `Eq`, and `Hash` to serve as a table key
/// - `D` - The [`Decay`] schedule driving epsilon over episodes
/// - `X` - The [`Augment`] strategy mapping states to table keys
pub struct TdAgent<E, D = decay::Exponential, X = Identity>
where
    E: Environment + DiscreteActionSpace,
    E::Action: Copy,
    D: Decay,
    X: Augment<E>,
{
    table: QTable<X::Key>,
    augment: X,
    actions: Vec<E::Action>,
    dims: (usize, usize),
    algorithm: Algorithm,
    alpha: f64,
    gamma: f64,
    exploration: EpsilonGreedy<D>,
    max_steps: usize,
    episode: u32,
    rng: StdRng,
}

impl<E, D> TdAgent<E, D, Identity>
where
    E: Environment + DiscreteActionSpace,
    E::State: Copy + Eq + Hash,
    E::Action: Copy,
    D: Decay,
{
    /// Initialize an agent keyed by raw environment states
    ///
    /// **Panics** if `alpha` or `gamma` is not in the interval `[0,1]`
    pub fn new(env: &E, config: TdAgentConfig<D>) -> Self {
        Self::with_augment(env, config, Identity)
    }
}

impl<E, D, X> TdAgent<E, D, X>
where
    E: Environment + DiscreteActionSpace,
    E::State: Copy,
    E::Action: Copy,
    D: Decay,
    X: Augment<E>,
{
    /// Initialize an agent with an explicit augmentation strategy
    ///
    /// The environment's declared action set and dimensions are captured here;
    /// they size the value table and fingerprint snapshot compatibility.
    ///
    /// **Panics** if `alpha` or `gamma` is not in the interval `[0,1]`
    pub fn with_augment(env: &E, config: TdAgentConfig<D>, augment: X) -> Self {
        assert_interval!(config.alpha, 0.0, 1.0);
        assert_interval!(config.gamma, 0.0, 1.0);
        let actions = env.actions();
        assert!(!actions.is_empty(), "environment declared an empty action set");
        let dims = env.dimensions();
        let max_steps = config.max_steps_per_episode.unwrap_or(dims.0 * dims.1 * 2);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            table: QTable::new(actions.len(), config.q_init),
            augment,
            actions,
            dims,
            algorithm: config.algorithm,
            alpha: config.alpha,
            gamma: config.gamma,
            exploration: config.exploration,
            max_steps,
            episode: 0,
            rng,
        }
    }

    /// Epsilon-greedy selection of an action index for a table key
    ///
    /// The exploit branch materializes the key's table row if unseen and
    /// breaks ties by first index.
    pub fn act(&mut self, key: X::Key) -> usize {
        match self.exploration.choose(self.episode, &mut self.rng) {
            Choice::Explore => self.rng.gen_range(0..self.actions.len()),
            Choice::Exploit => argmax(self.table.row(key, &mut self.rng)),
        }
    }

    /// Apply one temporal-difference update
    ///
    /// When `done` is true the target is `reward` alone and no next-state value
    /// is read. Otherwise the bootstrap follows the configured [`Algorithm`]:
    /// the greedy value at `next_key` for Q-learning, or the value of
    /// `next_action` for SARSA.
    ///
    /// **Panics** if a SARSA bootstrap is requested without a next action
    pub fn learn(
        &mut self,
        key: X::Key,
        action: usize,
        reward: f64,
        next_key: X::Key,
        next_action: Option<usize>,
        done: bool,
    ) {
        let target = if done {
            reward
        } else {
            let bootstrap = match self.algorithm {
                Algorithm::QLearning => self.table.max(next_key, &mut self.rng),
                Algorithm::Sarsa => {
                    let next_action =
                        next_action.expect("SARSA bootstrap requires the next action");
                    self.table.row(next_key, &mut self.rng)[next_action]
                }
            };
            reward + self.gamma * bootstrap
        };

        let current = self.table.row(key, &mut self.rng)[action];
        let updated = current + self.alpha * (target - current);
        self.table.set(key, action, updated, &mut self.rng);
    }

    /// Run one training episode
    pub fn go(&mut self, env: &mut E) -> EpisodeSummary {
        self.run_episode(env, &mut || {})
    }

    fn run_episode(&mut self, env: &mut E, pace: &mut dyn FnMut()) -> EpisodeSummary {
        let state = env.reset();
        let mut key = self.augment.key(env, state);
        let mut action = self.act(key);
        let mut total_reward = 0.0;
        let mut steps = 0;
        let mut terminated = false;

        loop {
            let transition = env.step(self.actions[action]);
            steps += 1;
            total_reward += transition.reward;
            let next_key = self.augment.key(env, transition.state);

            if transition.done {
                self.learn(key, action, transition.reward, next_key, None, true);
                terminated = true;
                break;
            }

            // The next action is drawn here so SARSA can bootstrap from it;
            // it is the action actually taken on the next iteration.
            let next_action = self.act(next_key);
            self.learn(key, action, transition.reward, next_key, Some(next_action), false);
            key = next_key;
            action = next_action;

            if steps >= self.max_steps {
                break;
            }
            pace();
        }

        self.episode += 1;
        EpisodeSummary {
            episode: self.episode - 1,
            steps,
            total_reward,
            terminated,
        }
    }

    /// Train for a number of episodes, returning per-episode total rewards
    ///
    /// Cancellation through the stop flag or the episode hook returns the
    /// rewards accumulated so far; every update already applied is kept.
    pub fn train(&mut self, env: &mut E, options: TrainOptions) -> Vec<f64> {
        let TrainOptions {
            episodes,
            progress_every,
            mut on_progress,
            mut on_episode,
            mut pace,
            stop,
        } = options;
        let mut default_pace = || {};
        let pace: &mut dyn FnMut() = match pace.as_mut() {
            Some(hook) => &mut **hook,
            None => &mut default_pace,
        };

        let mut rewards = Vec::with_capacity(episodes as usize);
        for i in 0..episodes {
            if stop.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                info!("training cancelled after {i} episodes");
                break;
            }

            let summary = self.run_episode(env, &mut *pace);
            rewards.push(summary.total_reward);

            if (i + 1) % progress_every == 0 {
                debug!(
                    "episode {}/{episodes}: reward {:.3}, epsilon {:.3}",
                    i + 1,
                    summary.total_reward,
                    self.exploration.epsilon(self.episode),
                );
                if let Some(hook) = on_progress.as_mut() {
                    hook(i + 1, episodes, summary.total_reward);
                }
            }

            if let Some(hook) = on_episode.as_mut() {
                if hook(i, summary.total_reward, &rewards).is_break() {
                    info!("training stopped by episode hook after {} episodes", i + 1);
                    break;
                }
            }
        }

        rewards
    }

    /// Run greedy episodes without exploration or table updates
    pub fn evaluate(&self, env: &mut E, episodes: u32) -> Vec<Evaluation<E::State>> {
        (0..episodes)
            .map(|_| {
                let mut state = env.reset();
                let mut path = vec![state];
                let mut total_reward = 0.0;
                let mut steps = 0;
                let mut success = false;

                while steps < self.max_steps {
                    let key = self.augment.key(env, state);
                    let transition = env.step(self.actions[self.table.greedy(key)]);
                    steps += 1;
                    total_reward += transition.reward;
                    state = transition.state;
                    path.push(state);
                    if transition.done {
                        success = true;
                        break;
                    }
                }

                Evaluation {
                    steps,
                    total_reward,
                    success,
                    path,
                }
            })
            .collect()
    }

    /// Greedy action for a table key, first index winning ties
    pub fn best_action(&self, key: X::Key) -> E::Action {
        self.actions[self.table.greedy(key)]
    }

    /// Current value estimate for a key and action index
    ///
    /// Unseen keys read as the configured initial value without mutating the table.
    pub fn value(&self, key: X::Key, action: usize) -> f64 {
        self.table.get(key, action)
    }

    pub fn table(&self) -> &QTable<X::Key> {
        &self.table
    }

    pub fn episode(&self) -> u32 {
        self.episode
    }

    pub fn max_steps_per_episode(&self) -> usize {
        self.max_steps
    }

    /// Discard all learned values, keeping hyperparameters and episode count
    pub fn reset_table(&mut self) {
        self.table.clear();
    }

    /// Capture a deep, independent snapshot of the agent's learned state
    pub fn export(&self) -> Snapshot<X::Key> {
        Snapshot {
            alpha: self.alpha,
            gamma: self.gamma,
            epsilon: self.exploration.epsilon(self.episode),
            episode: self.episode,
            width: self.dims.0,
            height: self.dims.1,
            n_actions: self.actions.len(),
            entries: self
                .table
                .rows()
                .map(|(key, row)| (*key, row.to_vec()))
                .collect(),
        }
    }

    /// Replace the agent's learned state with a snapshot
    ///
    /// The snapshot must have been recorded against an environment of the same
    /// dimensions and action count; on any validation failure the current
    /// table and hyperparameters are left untouched.
    pub fn import(&mut self, env: &E, snapshot: Snapshot<X::Key>) -> Result<()> {
        let expected = env.dimensions();
        let found = (snapshot.width, snapshot.height);
        if expected != found {
            return Err(Error::DimensionMismatch { expected, found });
        }
        if snapshot.n_actions != self.actions.len() {
            return Err(Error::ActionCountMismatch {
                expected: self.actions.len(),
                found: snapshot.n_actions,
            });
        }
        if !(0.0..=1.0).contains(&snapshot.alpha) || !(0.0..=1.0).contains(&snapshot.gamma) {
            return Err(Error::MalformedSnapshot {
                reason: format!(
                    "hyperparameters alpha={} gamma={} outside [0,1]",
                    snapshot.alpha, snapshot.gamma
                ),
            });
        }

        let mut rows = HashMap::with_capacity(snapshot.entries.len());
        for (key, row) in snapshot.entries {
            if row.len() != self.actions.len() {
                return Err(Error::MalformedSnapshot {
                    reason: format!(
                        "row of length {} for an action set of size {}",
                        row.len(),
                        self.actions.len()
                    ),
                });
            }
            rows.insert(key, row);
        }

        self.table.replace(rows);
        self.alpha = snapshot.alpha;
        self.gamma = snapshot.gamma;
        self.episode = snapshot.episode;
        Ok(())
    }
}

impl<E, D, X> TdAgent<E, D, X>
where
    E: EnumerableStateSpace + DiscreteActionSpace,
    E::State: Copy + Eq + Hash,
    E::Action: Copy,
    D: Decay,
    X: Augment<E, Key = E::State>,
{
    /// The greedy action for every state the environment can enumerate
    ///
    /// For inspection and debugging; the training loop never calls this.
    pub fn policy(&self, env: &E) -> Vec<(E::State, E::Action)> {
        env.states()
            .into_iter()
            .map(|state| (state, self.best_action(state)))
            .collect()
    }
}
