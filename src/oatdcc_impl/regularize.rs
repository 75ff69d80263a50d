use crate::error::{CoupledClusterError, Result};
use crate::linalg::{from_dmatrix, singular_value_bounds, to_dmatrix};
use nalgebra::DMatrix;
use ndarray::Array2;
use num_complex::Complex64;
use tracing::warn;

/// Thresholds for inverting the one-body density matrix
///
/// `rho` counts as singular when its smallest singular value is below
/// `singular_value_floor` or its condition number exceeds
/// `max_condition_number`. A singular `rho` is replaced by `rho + epsilon I`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regularization {
    pub singular_value_floor: f64,
    pub max_condition_number: f64,
    pub epsilon: f64,
}

impl Default for Regularization {
    fn default() -> Self {
        Regularization {
            singular_value_floor: 1e-8,
            max_condition_number: 1e12,
            epsilon: 1e-6,
        }
    }
}

impl Regularization {
    fn is_singular(&self, sigma_max: f64, sigma_min: f64) -> bool {
        sigma_min < self.singular_value_floor || sigma_max > self.max_condition_number * sigma_min
    }
}

/// Inverse of `rho`, Tikhonov-shifted when `rho` is singular
pub fn regularized_inverse(
    rho: &Array2<Complex64>,
    regularization: &Regularization,
    time: f64,
) -> Result<Array2<Complex64>> {
    let mut matrix = to_dmatrix(rho.view());
    let (sigma_max, sigma_min) = singular_value_bounds(&matrix);

    if regularization.is_singular(sigma_max, sigma_min) {
        warn!(
            "One-body density is singular at t = {:.6} (sigma_min = {:.3e}, condition number = {:.3e}), shifting by {:.1e}",
            time,
            sigma_min,
            sigma_max / sigma_min,
            regularization.epsilon
        );
        matrix += DMatrix::<Complex64>::identity(matrix.nrows(), matrix.ncols())
            * Complex64::new(regularization.epsilon, 0.0);

        let (sigma_max, sigma_min) = singular_value_bounds(&matrix);
        if regularization.is_singular(sigma_max, sigma_min) {
            return Err(CoupledClusterError::NumericalIllConditioning {
                time,
                sigma_min,
                condition_number: sigma_max / sigma_min,
                epsilon: regularization.epsilon,
            });
        }
    }

    match matrix.clone().try_inverse() {
        Some(inverse) => Ok(from_dmatrix(&inverse)),
        None => {
            let (sigma_max, sigma_min) = singular_value_bounds(&matrix);
            Err(CoupledClusterError::NumericalIllConditioning {
                time,
                sigma_min,
                condition_number: sigma_max / sigma_min,
                epsilon: regularization.epsilon,
            })
        }
    }
}
