//! Full tap-to-tap correlation matrix.
//!
//! The compensation path only looks at adjacent taps. For offline inspection
//! this module builds the complete `N × N` matrix with the same proximity
//! kernel, `exp(-|delay_i - delay_j|)`.

use serde::Serialize;
use tapdensity_core::TapLayout;

/// Symmetric tap correlation matrix with a unit diagonal.
///
/// # Example
///
/// ```rust
/// use tapdensity_analysis::CorrelationMatrix;
/// use tapdensity_core::TapLayout;
///
/// let layout = TapLayout::from_delay_samples(&[0.0, 1.0, 5.0]);
/// let matrix = CorrelationMatrix::from_layout(&layout);
///
/// assert_eq!(matrix.size(), 3);
/// assert_eq!(matrix.get(1, 1), 1.0);
/// assert!((matrix.get(0, 1) - (-1.0f32).exp()).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    size: usize,
    values: Vec<f32>,
}

impl CorrelationMatrix {
    /// Build the matrix for every tap pair of `layout`.
    pub fn from_layout(layout: &TapLayout) -> Self {
        let delays = layout.delays();
        let size = delays.len();
        let mut values = vec![0.0; size * size];
        for (i, a) in delays.iter().enumerate() {
            for (j, b) in delays.iter().enumerate() {
                values[i * size + j] = (-(a.samples - b.samples).abs()).exp();
            }
        }
        Self { size, values }
    }

    /// Number of taps.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Correlation between taps `i` and `j`.
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.values[i * self.size + j]
    }

    /// Row `i` (correlation of tap `i` with every tap).
    pub fn row(&self, i: usize) -> &[f32] {
        &self.values[i * self.size..(i + 1) * self.size]
    }

    /// Iterate the rows.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.values.chunks(self.size.max(1))
    }

    /// Mean correlation over distinct tap pairs (0 for fewer than two taps).
    pub fn mean_pairwise(&self) -> f32 {
        if self.size < 2 {
            return 0.0;
        }
        let total: f32 = self.values.iter().sum();
        let off_diagonal = total - self.size as f32;
        off_diagonal / (self.size * (self.size - 1)) as f32
    }

    /// For each tap, the number of other taps correlated above `threshold`.
    pub fn neighbours_above(&self, threshold: f32) -> Vec<usize> {
        (0..self.size)
            .map(|i| {
                self.row(i)
                    .iter()
                    .enumerate()
                    .filter(|&(j, &c)| j != i && c > threshold)
                    .count()
            })
            .collect()
    }
}
