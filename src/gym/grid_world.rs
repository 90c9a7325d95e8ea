use std::collections::HashSet;

use rand::{rngs::StdRng, Rng, SeedableRng};
use strum::{EnumIter, FromRepr, VariantArray};

use crate::env::{
    DiscreteActionSpace, EnumerableStateSpace, Environment, GoalAware, Report, Transition,
};
use crate::error::{Error, Result};

/// Position coordinates as (row, col)
pub type Pos = (usize, usize);

#[derive(EnumIter, VariantArray, FromRepr, Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Move {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Move {
    /// Resolve a zero-based action index
    pub fn from_index(index: usize) -> Result<Self> {
        Self::from_repr(index).ok_or(Error::InvalidAction {
            index,
            len: Self::VARIANTS.len(),
        })
    }
}

/// Configuration for a [`GridWorld`]
pub struct GridWorldConfig {
    pub width: usize,
    pub height: usize,
    pub start: Pos,
    pub goal: Pos,
    pub obstacles: HashSet<Pos>,
    pub step_reward: f64,
    pub goal_reward: f64,
    /// Draw a fresh goal cell on every reset, for multi-goal training
    pub randomize_goal: bool,
    pub seed: Option<u64>,
}

impl Default for GridWorldConfig {
    fn default() -> Self {
        Self {
            width: 5,
            height: 5,
            start: (0, 0),
            goal: (4, 4),
            obstacles: HashSet::new(),
            step_reward: -1.0,
            goal_reward: 1.0,
            randomize_goal: false,
            seed: None,
        }
    }
}

/// A bounded grid with an agent cell, a goal cell, and optional obstacle cells
///
/// Moves that would leave the grid or enter an obstacle leave the agent in
/// place and still cost the step reward. Entering the goal ends the episode
/// with the goal reward alone.
pub struct GridWorld {
    width: usize,
    height: usize,
    start: Pos,
    goal: Pos,
    obstacles: HashSet<Pos>,
    step_reward: f64,
    goal_reward: f64,
    randomize_goal: bool,
    pos: Pos,
    done: bool,
    rng: StdRng,
    pub report: Report,
}

impl GridWorld {
    /// **Panics** if the start or goal cell is out of bounds or an obstacle
    pub fn new(config: GridWorldConfig) -> Self {
        let GridWorldConfig {
            width,
            height,
            start,
            goal,
            obstacles,
            step_reward,
            goal_reward,
            randomize_goal,
            seed,
        } = config;
        assert!(width > 0 && height > 0, "grid must not be empty");
        let in_bounds = |pos: Pos| pos.0 < height && pos.1 < width;
        assert!(in_bounds(start) && !obstacles.contains(&start), "invalid start cell");
        assert!(in_bounds(goal) && !obstacles.contains(&goal), "invalid goal cell");

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            width,
            height,
            start,
            goal,
            obstacles,
            step_reward,
            goal_reward,
            randomize_goal,
            pos: start,
            done: false,
            rng,
            report: Report::new(vec!["reward", "steps"]),
        }
    }

    pub fn goal(&self) -> Pos {
        self.goal
    }

    /// Move the goal, e.g. between multi-goal training phases
    ///
    /// **Panics** if the cell is out of bounds or an obstacle
    pub fn set_goal(&mut self, goal: Pos) {
        assert!(
            goal.0 < self.height && goal.1 < self.width && !self.obstacles.contains(&goal),
            "invalid goal cell"
        );
        self.goal = goal;
    }

    fn draw_goal(&mut self) {
        loop {
            let cell = (
                self.rng.gen_range(0..self.height),
                self.rng.gen_range(0..self.width),
            );
            if cell != self.start && !self.obstacles.contains(&cell) {
                self.goal = cell;
                return;
            }
        }
    }
}

impl Environment for GridWorld {
    type State = Pos;
    type Action = Move;

    fn reset(&mut self) -> Self::State {
        self.pos = self.start;
        self.done = false;
        if self.randomize_goal {
            self.draw_goal();
        }
        self.pos
    }

    fn step(&mut self, action: Self::Action) -> Transition<Self::State> {
        if self.done {
            return Transition {
                state: self.pos,
                reward: 0.0,
                done: true,
            };
        }

        self.report.entry("steps").and_modify(|x| *x += 1.0);

        let (row, col) = self.pos;
        let target = match action {
            Move::Up => (row.saturating_sub(1), col),
            Move::Down => ((row + 1).min(self.height - 1), col),
            Move::Left => (row, col.saturating_sub(1)),
            Move::Right => (row, (col + 1).min(self.width - 1)),
        };
        if !self.obstacles.contains(&target) {
            self.pos = target;
        }

        let reward = if self.pos == self.goal {
            self.done = true;
            self.goal_reward
        } else {
            self.step_reward
        };
        self.report.entry("reward").and_modify(|x| *x += reward);

        Transition {
            state: self.pos,
            reward,
            done: self.done,
        }
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

impl DiscreteActionSpace for GridWorld {
    fn actions(&self) -> Vec<Self::Action> {
        Move::VARIANTS.to_vec()
    }
}

impl EnumerableStateSpace for GridWorld {
    fn states(&self) -> Vec<Self::State> {
        let mut states = Vec::with_capacity(self.width * self.height - self.obstacles.len());
        for row in 0..self.height {
            for col in 0..self.width {
                if !self.obstacles.contains(&(row, col)) {
                    states.push((row, col));
                }
            }
        }
        states
    }
}

impl GoalAware for GridWorld {
    fn delta_to_goal(&self) -> (i32, i32) {
        (
            self.goal.0 as i32 - self.pos.0 as i32,
            self.goal.1 as i32 - self.pos.1 as i32,
        )
    }
}
