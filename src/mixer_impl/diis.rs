use super::ConvergenceMixer;
use crate::linalg::inner_product;
use nalgebra::{DMatrix, DVector};
use ndarray::Array1;
use num_complex::Complex64;
use tracing::debug;

/// DIIS (Direct Inversion in the Iterative Subspace) convergence accelerator
///
/// # Algorithm
///
/// Each iteration stores the proposed iterate `x_i` and its error `e_i`. The
/// coefficients minimize `|sum c_i e_i|^2` subject to `sum c_i = 1`, i.e. they
/// solve the bordered system
///
/// ```text
/// | B   -1 | | c      |   |  0 |
/// | -1   0 | | lambda | = | -1 |
/// ```
///
/// with `B_ij = <e_i|e_j>`. The extrapolated vector is `sum c_i x_i`.
///
/// When `B` is rank deficient (smallest singular value below
/// `relative_floor` times the largest) or the LU solve fails, the mixer falls
/// back to returning `direction`.
#[derive(Debug, Clone)]
pub struct DIIS {
    error_vectors: Vec<Array1<Complex64>>,
    iterate_vectors: Vec<Array1<Complex64>>,
    max_subspace_size: usize,
    relative_floor: f64,
    fallbacks: usize,
}

impl DIIS {
    /// Create a new DIIS accelerator keeping at most `max_subspace_size` vectors
    pub fn new(max_subspace_size: usize) -> Self {
        DIIS {
            error_vectors: Vec::new(),
            iterate_vectors: Vec::new(),
            max_subspace_size: max_subspace_size.max(1),
            relative_floor: 1e-12,
            fallbacks: 0,
        }
    }

    pub fn with_relative_floor(mut self, relative_floor: f64) -> Self {
        self.relative_floor = relative_floor;
        self
    }

    /// Number of times the unaccelerated update was returned
    pub fn fallback_count(&self) -> usize {
        self.fallbacks
    }

    fn update(&mut self, iterate: Array1<Complex64>, error: Array1<Complex64>) {
        if self.error_vectors.len() >= self.max_subspace_size {
            self.error_vectors.remove(0);
            self.iterate_vectors.remove(0);
        }
        self.error_vectors.push(error);
        self.iterate_vectors.push(iterate);
    }

    fn extrapolate(&self) -> Option<Array1<Complex64>> {
        let n = self.error_vectors.len();
        if n == 0 {
            return None;
        }

        // B_ij = <e_i|e_j>
        let gram = DMatrix::from_fn(n, n, |i, j| {
            inner_product(self.error_vectors[i].iter(), self.error_vectors[j].iter())
        });
        let singular_values = gram.clone().svd(false, false).singular_values;
        let sigma_max = singular_values.iter().cloned().fold(0.0, f64::max);
        let sigma_min = singular_values.iter().cloned().fold(f64::INFINITY, f64::min);
        if sigma_max == 0.0 || sigma_min <= self.relative_floor * sigma_max {
            debug!(
                "DIIS Gram matrix rank deficient (sigma_min = {:.3e}, sigma_max = {:.3e})",
                sigma_min, sigma_max
            );
            return None;
        }

        let minus_one = Complex64::new(-1.0, 0.0);
        let mut b = DMatrix::zeros(n + 1, n + 1);
        b.view_mut((0, 0), (n, n)).copy_from(&gram);
        for i in 0..n {
            b[(i, n)] = minus_one;
            b[(n, i)] = minus_one;
        }

        let mut rhs = DVector::zeros(n + 1);
        rhs[n] = minus_one;

        let coeffs = match b.lu().solve(&rhs) {
            Some(x) => x,
            None => {
                debug!("DIIS extrapolation failed: singular B matrix");
                return None;
            }
        };
        if coeffs.iter().any(|c| !c.is_finite()) {
            debug!("DIIS coefficients are not finite");
            return None;
        }

        let mut extrapolated = Array1::<Complex64>::zeros(self.iterate_vectors[0].len());
        for (i, iterate) in self.iterate_vectors.iter().enumerate() {
            extrapolated.scaled_add(coeffs[i], iterate);
        }
        Some(extrapolated)
    }
}

impl ConvergenceMixer for DIIS {
    fn compute_new_vector(
        &mut self,
        _trial: &Array1<Complex64>,
        direction: &Array1<Complex64>,
        error: &Array1<Complex64>,
    ) -> Array1<Complex64> {
        self.update(direction.clone(), error.clone());
        match self.extrapolate() {
            Some(extrapolated) => extrapolated,
            None => {
                self.fallbacks += 1;
                direction.clone()
            }
        }
    }

    fn clear_vectors(&mut self) {
        self.error_vectors.clear();
        self.iterate_vectors.clear();
    }

    fn size(&self) -> usize {
        self.error_vectors.len()
    }
}
