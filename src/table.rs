use std::collections::HashMap;
use std::hash::Hash;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::util::argmax;

/// Initial value given to table entries when a state is first touched
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum QInit {
    /// All entries start at zero
    Zero,
    /// All entries start at a fixed value; a small positive constant gives
    /// optimistic initialization
    Constant(f64),
    /// Entries start at `base` plus a uniform random offset in `[0, spread)`,
    /// drawn once when the row is materialized
    Jitter { base: f64, spread: f64 },
}

impl Default for QInit {
    fn default() -> Self {
        Self::Zero
    }
}

impl QInit {
    /// The value an unmaterialized entry reads as
    fn nominal(&self) -> f64 {
        match *self {
            Self::Zero => 0.0,
            Self::Constant(v) => v,
            Self::Jitter { base, .. } => base,
        }
    }

    fn materialize<R: Rng + ?Sized>(&self, n_actions: usize, rng: &mut R) -> Vec<f64> {
        match *self {
            Self::Zero => vec![0.0; n_actions],
            Self::Constant(v) => vec![v; n_actions],
            Self::Jitter { base, spread } => {
                (0..n_actions).map(|_| base + rng.gen::<f64>() * spread).collect()
            }
        }
    }
}

/// A sparse value table mapping state keys to dense per-state rows of action values
///
/// Rows are materialized lazily, at most once per state, the first time a state
/// is touched by action selection or an update. Reads of states that were never
/// touched observe the nominal initial value and do not mutate the table.
#[derive(Clone, Debug)]
pub struct QTable<K> {
    rows: HashMap<K, Vec<f64>>,
    n_actions: usize,
    init: QInit,
}

impl<K: Copy + Eq + Hash> QTable<K> {
    pub fn new(n_actions: usize, init: QInit) -> Self {
        assert!(n_actions > 0, "action set must not be empty");
        Self {
            rows: HashMap::new(),
            n_actions,
            init,
        }
    }

    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    /// Number of materialized states
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row of action values for a state, materializing it if unseen
    pub fn row<R: Rng + ?Sized>(&mut self, key: K, rng: &mut R) -> &[f64] {
        let Self {
            rows,
            n_actions,
            init,
        } = self;
        rows.entry(key).or_insert_with(|| init.materialize(*n_actions, rng))
    }

    /// Read a single entry without materializing the row
    pub fn get(&self, key: K, action: usize) -> f64 {
        self.rows
            .get(&key)
            .map(|row| row[action])
            .unwrap_or_else(|| self.init.nominal())
    }

    /// Write a single entry, materializing the row if unseen
    pub fn set<R: Rng + ?Sized>(&mut self, key: K, action: usize, value: f64, rng: &mut R) {
        let Self {
            rows,
            n_actions,
            init,
        } = self;
        rows.entry(key).or_insert_with(|| init.materialize(*n_actions, rng))[action] = value;
    }

    /// Maximum action value for a state, materializing the row if unseen
    pub fn max<R: Rng + ?Sized>(&mut self, key: K, rng: &mut R) -> f64 {
        let row = self.row(key, rng);
        row.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Greedy action index for a state, first index winning ties
    ///
    /// Read-only: an unseen state yields action 0 without materializing.
    pub fn greedy(&self, key: K) -> usize {
        self.rows.get(&key).map(|row| argmax(row)).unwrap_or(0)
    }

    /// Iterate materialized rows
    pub fn rows(&self) -> impl Iterator<Item = (&K, &[f64])> {
        self.rows.iter().map(|(k, row)| (k, row.as_slice()))
    }

    /// Discard all materialized rows, returning the table to its initial state
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Replace contents wholesale; callers must have validated row shapes
    pub(crate) fn replace(&mut self, rows: HashMap<K, Vec<f64>>) {
        self.rows = rows;
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn unseen_state_reads_nominal_value() {
        let table: QTable<(i32, i32)> = QTable::new(4, QInit::Constant(0.5));
        assert_eq!(table.get((3, 3), 2), 0.5);
        assert!(table.is_empty());
    }

    #[test]
    fn materialization_is_idempotent() {
        let mut table: QTable<u32> = QTable::new(3, QInit::Jitter { base: 0.0, spread: 0.01 });
        let mut rng = StdRng::seed_from_u64(7);
        let first = table.row(5, &mut rng).to_vec();
        let second = table.row(5, &mut rng).to_vec();
        assert_eq!(first, second);
        assert_eq!(table.len(), 1);
        for &v in &first {
            assert!((0.0..0.01).contains(&v));
        }
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut table: QTable<u32> = QTable::new(2, QInit::Zero);
        let mut rng = StdRng::seed_from_u64(0);
        table.set(1, 0, -3.5, &mut rng);
        assert_eq!(table.get(1, 0), -3.5);
        assert_eq!(table.get(1, 1), 0.0);
    }

    #[test]
    fn greedy_breaks_ties_by_first_index() {
        let mut table: QTable<u32> = QTable::new(3, QInit::Zero);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(table.greedy(9), 0);
        table.set(9, 1, 1.0, &mut rng);
        table.set(9, 2, 1.0, &mut rng);
        assert_eq!(table.greedy(9), 1);
    }

    #[test]
    fn max_over_materialized_row() {
        let mut table: QTable<u32> = QTable::new(2, QInit::Zero);
        let mut rng = StdRng::seed_from_u64(0);
        table.set(0, 1, 2.0, &mut rng);
        assert_eq!(table.max(0, &mut rng), 2.0);
    }
}
