use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::env::{Environment, GoalAware};

/// Coarse direction from a position to a goal, bucketed by the signs of
/// `(Δrow, Δcol)`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Compass {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
    Here,
}

impl Compass {
    /// Bucket a `(Δrow, Δcol)` offset, where positive Δrow points south
    /// and positive Δcol points east
    pub fn from_delta(drow: i32, dcol: i32) -> Self {
        match (drow.signum(), dcol.signum()) {
            (-1, 0) => Self::North,
            (-1, 1) => Self::NorthEast,
            (0, 1) => Self::East,
            (1, 1) => Self::SouthEast,
            (1, 0) => Self::South,
            (1, -1) => Self::SouthWest,
            (0, -1) => Self::West,
            (-1, -1) => Self::NorthWest,
            _ => Self::Here,
        }
    }
}

/// Maps raw environment states to value-table keys
///
/// The same selection and update logic runs over any key type; an augmentation
/// strategy only decides what the table is indexed by. [`Identity`] keys the
/// table by the raw state. [`GoalDirection`] appends a [`Compass`] feature so
/// one table generalizes across goals.
pub trait Augment<E: Environment> {
    type Key: Copy + Eq + Hash;

    /// Compute the table key for a state
    ///
    /// Called while the environment is observing `state`, so strategies may
    /// read contextual features (like the goal offset) from the environment.
    fn key(&self, env: &E, state: E::State) -> Self::Key;
}

/// The trivial augmentation: table keys are raw states
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl<E: Environment> Augment<E> for Identity
where
    E::State: Copy + Eq + Hash,
{
    type Key = E::State;

    fn key(&self, _env: &E, state: E::State) -> Self::Key {
        state
    }
}

/// Goal-conditioned augmentation: table keys carry the coarse direction to
/// the active goal, so a single table serves many goals
#[derive(Clone, Copy, Debug, Default)]
pub struct GoalDirection;

impl<E: GoalAware> Augment<E> for GoalDirection
where
    E::State: Copy + Eq + Hash,
{
    type Key = (E::State, Compass);

    fn key(&self, env: &E, state: E::State) -> Self::Key {
        let (drow, dcol) = env.delta_to_goal();
        (state, Compass::from_delta(drow, dcol))
    }
}
