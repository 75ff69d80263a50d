//! Convergence acceleration for fixed-point iterations
//!
//! A mixer receives the current trial vector, the plain fixed-point update
//! ("direction") and the residual ("error") of every iteration and returns
//! the next trial vector.
//!
//! - [`AlphaMixer`] returns `direction` unchanged.
//! - [`DIIS`] extrapolates over a bounded history of iterates, choosing the
//!   combination `sum c_i x_i` with `sum c_i = 1` that minimizes
//!   `|sum c_i e_i|^2`.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut mixer = MixerKind::Diis { max_vectors: 8 }.build();
//! mixer.clear_vectors();
//! let next = mixer.compute_new_vector(&trial, &direction, &error);
//! ```

mod alpha;
mod diis;
#[cfg(test)]
mod tests;

pub use alpha::AlphaMixer;
pub use diis::DIIS;

use ndarray::Array1;
use num_complex::Complex64;

/// Accelerates a fixed-point iteration from its history
pub trait ConvergenceMixer {
    fn compute_new_vector(
        &mut self,
        trial: &Array1<Complex64>,
        direction: &Array1<Complex64>,
        error: &Array1<Complex64>,
    ) -> Array1<Complex64>;

    /// Reset the history; called at the start of every solve
    fn clear_vectors(&mut self);

    /// Number of stored vectors
    fn size(&self) -> usize {
        0
    }
}

/// Mixer selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixerKind {
    Alpha,
    Diis { max_vectors: usize },
}

impl Default for MixerKind {
    fn default() -> Self {
        MixerKind::Diis { max_vectors: 8 }
    }
}

impl MixerKind {
    pub fn build(&self) -> Box<dyn ConvergenceMixer + Send> {
        match *self {
            MixerKind::Alpha => Box::new(AlphaMixer),
            MixerKind::Diis { max_vectors } => Box::new(DIIS::new(max_vectors)),
        }
    }
}
