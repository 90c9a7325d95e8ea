use rand::{rngs::StdRng, Rng, SeedableRng};
use strum::{EnumIter, FromRepr, VariantArray};

use crate::env::{DiscreteActionSpace, Environment, Report, Transition};

const MIN_POSITION: f64 = -1.2;
const MAX_POSITION: f64 = 0.6;
const MAX_SPEED: f64 = 0.07;
const GOAL_POSITION: f64 = 0.5;
const FORCE: f64 = 0.001;
const GRAVITY: f64 = 0.0025;

/// Uniform bucketing of a bounded continuous value
///
/// Values outside the range are clamped into it, so every input maps to a
/// valid bucket index in `0..bins`.
#[derive(Clone, Copy, Debug)]
pub struct Discretizer {
    lo: f64,
    hi: f64,
    bins: usize,
}

impl Discretizer {
    /// **Panics** if the range is empty or `bins` is zero
    pub fn new(lo: f64, hi: f64, bins: usize) -> Self {
        assert!(hi > lo, "range must not be empty");
        assert!(bins > 0, "at least one bin is required");
        Self { lo, hi, bins }
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Bucket index for a value
    pub fn bin(&self, value: f64) -> usize {
        let clamped = value.clamp(self.lo, self.hi);
        let scaled = (clamped - self.lo) / (self.hi - self.lo) * self.bins as f64;
        (scaled as usize).min(self.bins - 1)
    }
}

#[derive(EnumIter, VariantArray, FromRepr, Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Push {
    Left = 0,
    Coast = 1,
    Right = 2,
}

/// The classic mountain car task with a discretized observation space
///
/// The car starts in the valley and must build momentum to reach the flag at
/// the top of the right hill. The continuous (position, velocity) pair is
/// bucketed into a `(position_bin, velocity_bin)` state so a tabular agent
/// can learn it.
pub struct MountainCar {
    position: f64,
    velocity: f64,
    position_bins: Discretizer,
    velocity_bins: Discretizer,
    done: bool,
    rng: StdRng,
    pub report: Report,
}

impl MountainCar {
    pub fn new(position_bins: usize, velocity_bins: usize) -> Self {
        Self {
            position: -0.5,
            velocity: 0.0,
            position_bins: Discretizer::new(MIN_POSITION, MAX_POSITION, position_bins),
            velocity_bins: Discretizer::new(-MAX_SPEED, MAX_SPEED, velocity_bins),
            done: false,
            rng: StdRng::from_entropy(),
            report: Report::new(vec!["reward", "steps"]),
        }
    }

    /// Seed the RNG that draws starting positions
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    fn observe(&self) -> (usize, usize) {
        (
            self.position_bins.bin(self.position),
            self.velocity_bins.bin(self.velocity),
        )
    }
}

impl Environment for MountainCar {
    type State = (usize, usize);
    type Action = Push;

    fn reset(&mut self) -> Self::State {
        self.position = self.rng.gen_range(-0.6..-0.4);
        self.velocity = 0.0;
        self.done = false;
        self.observe()
    }

    fn step(&mut self, action: Self::Action) -> Transition<Self::State> {
        if self.done {
            return Transition {
                state: self.observe(),
                reward: 0.0,
                done: true,
            };
        }

        self.report.entry("steps").and_modify(|x| *x += 1.0);

        let force = action as isize as f64 - 1.0;
        self.velocity += FORCE * force - GRAVITY * (3.0 * self.position).cos();
        self.velocity = self.velocity.clamp(-MAX_SPEED, MAX_SPEED);
        self.position += self.velocity;
        self.position = self.position.clamp(MIN_POSITION, MAX_POSITION);
        if self.position <= MIN_POSITION && self.velocity < 0.0 {
            self.velocity = 0.0;
        }

        self.done = self.position >= GOAL_POSITION;
        let reward = -1.0;
        self.report.entry("reward").and_modify(|x| *x += reward);

        Transition {
            state: self.observe(),
            reward,
            done: self.done,
        }
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.position_bins.bins(), self.velocity_bins.bins())
    }
}

impl DiscreteActionSpace for MountainCar {
    fn actions(&self) -> Vec<Self::Action> {
        Push::VARIANTS.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discretizer_covers_the_range() {
        let d = Discretizer::new(-1.2, 0.6, 18);
        assert_eq!(d.bin(-1.2), 0);
        assert_eq!(d.bin(-2.0), 0);
        assert_eq!(d.bin(0.6), 17);
        assert_eq!(d.bin(1.0), 17);
        assert_eq!(d.bin(-0.3), 9);
    }

    #[test]
    fn coasting_from_the_valley_floor_stays_put() {
        let mut env = MountainCar::new(18, 14).with_seed(3);
        env.reset();
        // gravity alone cannot reach the goal
        for _ in 0..200 {
            let t = env.step(Push::Coast);
            assert!(!t.done);
        }
        assert!(env.position() < GOAL_POSITION);
    }

    #[test]
    fn velocity_is_clamped() {
        let mut env = MountainCar::new(18, 14).with_seed(3);
        env.reset();
        for _ in 0..500 {
            env.step(Push::Right);
            assert!(env.velocity().abs() <= MAX_SPEED);
            if env.position() >= GOAL_POSITION {
                break;
            }
        }
    }
}
