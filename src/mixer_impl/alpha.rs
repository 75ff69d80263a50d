use super::ConvergenceMixer;
use ndarray::Array1;
use num_complex::Complex64;

/// Plain substitution: the next trial is the proposed direction
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphaMixer;

impl ConvergenceMixer for AlphaMixer {
    fn compute_new_vector(
        &mut self,
        _trial: &Array1<Complex64>,
        direction: &Array1<Complex64>,
        _error: &Array1<Complex64>,
    ) -> Array1<Complex64> {
        direction.clone()
    }

    fn clear_vectors(&mut self) {}
}
