use rand::{rngs::StdRng, Rng, SeedableRng};
use strum::{EnumIter, FromRepr, VariantArray};

use crate::env::{DiscreteActionSpace, EnumerableStateSpace, Environment, Report, Transition};

#[derive(Clone, Copy, PartialEq)]
pub enum Square {
    Frozen = 0,
    Hole = 1,
    Start = 2,
    Goal = 3,
}

#[derive(EnumIter, VariantArray, FromRepr, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FLAction {
    Left = 0,
    Down = 1,
    Right = 2,
    Up = 3,
}

impl FLAction {
    /// The two directions perpendicular to this one
    fn perpendicular(self) -> (Self, Self) {
        match self {
            Self::Left | Self::Right => (Self::Up, Self::Down),
            Self::Down | Self::Up => (Self::Left, Self::Right),
        }
    }
}

/// A very simple RL environment taken from Python [gymnasium](https://gymnasium.farama.org/)
///
/// A 4x4 frozen lake with holes between the start and the goal. With slippery
/// ice enabled, each move goes in the intended direction with probability 1/3
/// and slides perpendicular otherwise. Moves off the edge leave the position
/// unchanged.
pub struct FrozenLake {
    map: [Square; 16],
    pos: usize,
    slippery: bool,
    done: bool,
    rng: StdRng,
    pub report: Report,
}

impl FrozenLake {
    pub fn new() -> Self {
        let map = [
            Square::Start,
            Square::Frozen,
            Square::Frozen,
            Square::Frozen,
            Square::Frozen,
            Square::Hole,
            Square::Frozen,
            Square::Hole,
            Square::Frozen,
            Square::Frozen,
            Square::Frozen,
            Square::Hole,
            Square::Hole,
            Square::Frozen,
            Square::Frozen,
            Square::Goal,
        ];
        Self {
            map,
            pos: 0,
            slippery: false,
            done: false,
            rng: StdRng::from_entropy(),
            report: Report::new(vec!["reward", "steps"]),
        }
    }

    /// Enable slippery ice with a seeded RNG
    pub fn slippery(mut self, seed: u64) -> Self {
        self.slippery = true;
        self.rng = StdRng::seed_from_u64(seed);
        self
    }
}

impl Default for FrozenLake {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for FrozenLake {
    type State = usize;
    type Action = FLAction;

    fn reset(&mut self) -> Self::State {
        self.pos = 0;
        self.done = false;
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

        let action = if self.slippery {
            let (left, right) = action.perpendicular();
            match self.rng.gen_range(0..3) {
                0 => left,
                1 => action,
                _ => right,
            }
        } else {
            action
        };

        match action {
            FLAction::Left if self.pos % 4 != 0 => self.pos -= 1,
            FLAction::Down if self.pos < 12 => self.pos += 4,
            FLAction::Right if self.pos % 4 != 3 => self.pos += 1,
            FLAction::Up if self.pos > 3 => self.pos -= 4,
            _ => {}
        };

        let reward = match self.map[self.pos] {
            Square::Hole => {
                self.done = true;
                -1.0
            }
            Square::Goal => {
                self.done = true;
                1.0
            }
            _ => -0.1,
        };
        self.report.entry("reward").and_modify(|x| *x += reward);

        Transition {
            state: self.pos,
            reward,
            done: self.done,
        }
    }

    fn dimensions(&self) -> (usize, usize) {
        (4, 4)
    }
}

impl DiscreteActionSpace for FrozenLake {
    fn actions(&self) -> Vec<Self::Action> {
        FLAction::VARIANTS.to_vec()
    }
}

impl EnumerableStateSpace for FrozenLake {
    fn states(&self) -> Vec<Self::State> {
        (0..self.map.len()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_moves_stay_in_place() {
        let mut env = FrozenLake::new();
        env.reset();
        let t = env.step(FLAction::Up);
        assert_eq!(t.state, 0);
        let t = env.step(FLAction::Left);
        assert_eq!(t.state, 0);
        assert_eq!(t.reward, -0.1);
    }

    #[test]
    fn hole_is_terminal() {
        let mut env = FrozenLake::new();
        env.reset();
        env.step(FLAction::Down);
        let t = env.step(FLAction::Right);
        assert_eq!(t.state, 5);
        assert_eq!(t.reward, -1.0);
        assert!(t.done);

        let t = env.step(FLAction::Right);
        assert_eq!(t.reward, 0.0);
        assert!(t.done);
    }
}
