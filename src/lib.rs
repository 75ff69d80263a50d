//! Coupled-cluster amplitude solver and time-propagation engine
//!
//! The crate is organised leaves first:
//!
//! - [`amplitudes_impl`]: flat packing of excitation, de-excitation and orbital tensors
//! - [`mixer_impl`]: convergence acceleration for fixed-point iterations
//! - [`ground_state_impl`]: ground-state T and Lambda solves
//! - [`integrator_impl`]: Runge-Kutta and Gauss-Legendre steppers and the trajectory driver
//! - [`tdcc_impl`]: fixed-basis time-dependent equations of motion
//! - [`oatdcc_impl`]: orbital-adaptive equations of motion
//! - [`config`] and [`io`]: YAML parameters and logging setup for applications
//!
//! The amplitude equations themselves come from a [`ResidualEvaluator`]; the
//! crate ships the coupled-cluster doubles flavor in [`ccd_impl`]. Operator
//! tensors come from a [`QuantumSystem`], see [`system_impl`].

pub mod amplitudes_impl;
pub mod ccd_impl;
pub mod config;
pub mod error;
pub mod ground_state_impl;
pub mod integrator_impl;
pub mod io;
mod linalg;
pub mod mixer_impl;
pub mod oatdcc_impl;
pub mod observe;
pub mod residual;
pub mod system_impl;
pub mod tdcc_impl;

pub use amplitudes_impl::{AmplitudeSet, AmplitudeTemplate};
pub use error::{CoupledClusterError, Result};
pub use residual::{OrbitalAdaptiveEvaluator, ResidualEvaluator};
pub use system_impl::{GeneralSystem, OrbitalPartition, QuantumSystem};
