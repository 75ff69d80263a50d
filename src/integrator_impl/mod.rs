//! Time integrators for flattened amplitude vectors
//!
//! An [`Integrator`] advances a state `y(t)` by one step of size `dt` given a
//! [`RightHandSide`] `dy/dt = rhs(t, y)`. Integrators hold no time state; the
//! trajectory driver [`evolve`] owns the clock.
//!
//! - [`RungeKutta4`]: classical explicit fourth-order method.
//! - [`GaussIntegrator`]: implicit `s`-stage Gauss-Legendre collocation
//!   (order `2s`), solved by fixed-point iteration on the stage derivatives.
//!
//! # Sign convention
//!
//! Excitation amplitudes evolve as `dt/dt = EXCITATION_PHASE * R_t` and
//! de-excitation amplitudes as `dl/dt = DEEXCITATION_PHASE * R_l`. The phase
//! amplitude follows `dt_0/dt = EXCITATION_PHASE * E_corr`.

mod gauss;
mod propagate;
mod rk4;

pub use gauss::GaussIntegrator;
pub use propagate::{evolve, StepEvent, Trajectory};
pub use rk4::RungeKutta4;

use crate::error::{CoupledClusterError, Result};
use ndarray::Array1;
use num_complex::Complex64;

/// `-i`, applied to the excitation residuals and the correlation energy
pub const EXCITATION_PHASE: Complex64 = Complex64::new(0.0, -1.0);

/// `+i`, applied to the de-excitation residuals
pub const DEEXCITATION_PHASE: Complex64 = Complex64::new(0.0, 1.0);

/// Time derivative of a flat state vector
pub trait RightHandSide {
    fn evaluate(&mut self, time: f64, y: &Array1<Complex64>) -> Result<Array1<Complex64>>;
}

impl<F> RightHandSide for F
where
    F: FnMut(f64, &Array1<Complex64>) -> Result<Array1<Complex64>>,
{
    fn evaluate(&mut self, time: f64, y: &Array1<Complex64>) -> Result<Array1<Complex64>> {
        self(time, y)
    }
}

pub trait Integrator {
    /// Advance `y` from `time` to `time + dt`
    fn step(
        &self,
        rhs: &mut dyn RightHandSide,
        y: &Array1<Complex64>,
        time: f64,
        dt: f64,
    ) -> Result<Array1<Complex64>>;

    fn name(&self) -> &'static str;
}

/// Integrator selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntegratorKind {
    RungeKutta4,
    Gauss {
        stages: usize,
        tolerance: f64,
        max_iterations: usize,
    },
}

impl Default for IntegratorKind {
    fn default() -> Self {
        IntegratorKind::RungeKutta4
    }
}

impl IntegratorKind {
    pub fn build(&self) -> Result<Box<dyn Integrator + Send + Sync>> {
        match *self {
            IntegratorKind::RungeKutta4 => Ok(Box::new(RungeKutta4)),
            IntegratorKind::Gauss {
                stages,
                tolerance,
                max_iterations,
            } => {
                if tolerance <= 0.0 || max_iterations == 0 {
                    return Err(CoupledClusterError::InvalidConfig(format!(
                        "Gauss integrator needs a positive tolerance and iteration cap, got {tolerance} and {max_iterations}"
                    )));
                }
                Ok(Box::new(
                    GaussIntegrator::new(stages)?
                        .with_tolerance(tolerance)
                        .with_max_iterations(max_iterations),
                ))
            }
        }
    }
}
