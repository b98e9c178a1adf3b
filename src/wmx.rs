use std::fs;
use std::path::Path;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};
use simple_error::{try_with, SimpleError};

/// Learned synaptic weight matrix, row-major. On disk the matrix is a JSON
/// nested array; entries are scaled on load (the learning pipeline stores
/// Siemens, the analysis works in nanosiemens).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightMatrix {
    weights: Vec<Vec<f64>>,
}

impl WeightMatrix {
    pub fn from_file(path: &Path, scale: f64) -> Result<Self, SimpleError> {
        let contents = try_with!(
            fs::read_to_string(path),
            "failed to read weight matrix file {}",
            path.display()
        );
        Self::from_json_str(&contents, scale)
    }

    pub fn from_json_str(json: &str, scale: f64) -> Result<Self, SimpleError> {
        let mut matrix: WeightMatrix =
            try_with!(serde_json::from_str(json), "malformed weight matrix");

        if let Some(first_row) = matrix.weights.first() {
            let row_len = first_row.len();
            if matrix.weights.iter().any(|row| row.len() != row_len) {
                return Err(SimpleError::new(
                    "weight matrix rows must have equal length",
                ));
            }
        }

        for row in &mut matrix.weights {
            for weight in row.iter_mut() {
                *weight *= scale;
            }
        }

        Ok(matrix)
    }

    pub fn num_rows(&self) -> usize {
        self.weights.len()
    }

    pub fn num_cols(&self) -> usize {
        self.weights.first().map_or(0, Vec::len)
    }

    /// All nonzero entries, flattened row-major.
    pub fn nonzero_weights(&self) -> Vec<f64> {
        self.weights
            .iter()
            .flatten()
            .copied()
            .filter(|weight| *weight != 0.0)
            .collect()
    }
}

pub fn mean_weight(weights: &[f64]) -> f64 {
    weights.iter().sum::<f64>() / weights.len() as f64
}

/// Draws `n` weights without replacement with a seeded generator, so repeated
/// runs analyse the same connections.
pub fn sample_weights(weights: &[f64], n: usize, seed: u64) -> Result<Vec<f64>, SimpleError> {
    if n > weights.len() {
        return Err(SimpleError::new(format!(
            "cannot sample {} weights from {} nonzero entries",
            n,
            weights.len()
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    Ok(weights.choose_multiple(&mut rng, n).copied().collect())
}
