use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::Result;

/// A deep, self-contained snapshot of a trained agent
///
/// Produced by [`TdAgent::export`](crate::algo::TdAgent::export) and consumed
/// by [`TdAgent::import`](crate::algo::TdAgent::import). The `width`/`height`
/// and `n_actions` fields fingerprint the environment the snapshot was
/// recorded against; import refuses records whose fingerprint does not match.
/// `episode` lets a decaying epsilon schedule resume where it left off, and
/// `epsilon` records the evaluated threshold at export time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<K> {
    pub alpha: f64,
    pub gamma: f64,
    pub epsilon: f64,
    pub episode: u32,
    pub width: usize,
    pub height: usize,
    pub n_actions: usize,
    /// Materialized table rows, as pairs so composite keys survive JSON
    pub entries: Vec<(K, Vec<f64>)>,
}

impl<K: Serialize> Snapshot<K> {
    /// Serialize to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

impl<K: DeserializeOwned> Snapshot<K> {
    /// Deserialize from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let snapshot: Self = serde_json::from_reader(BufReader::new(file))?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_keys_survive_json() {
        let snapshot = Snapshot {
            alpha: 0.5,
            gamma: 0.9,
            epsilon: 0.1,
            episode: 42,
            width: 5,
            height: 5,
            n_actions: 4,
            entries: vec![((3usize, 4usize), vec![0.0, -1.0, 0.25, 0.0])],
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: Snapshot<(usize, usize)> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
