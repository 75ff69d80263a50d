//! Error types for the coupled-cluster engine
//!
//! Non-convergence of a ground-state or Lambda solve is not an error: it is
//! reported through [`crate::ground_state_impl::SolveOutcome`] so the caller
//! can decide what to do with the best estimate.

use thiserror::Error;

/// Errors raised by the solver, integrators and orbital-adaptive stepper
#[derive(Debug, Error)]
pub enum CoupledClusterError {
    #[error("mixing parameter theta must be in [0, 1], got {theta}")]
    InvalidMixingParameter { theta: f64 },

    #[error("shape mismatch in {context}: expected {expected} elements, found {found}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid orbital partition: {n_occupied} occupied orbitals in a basis of {n_basis}")]
    InvalidPartition { n_occupied: usize, n_basis: usize },

    #[error("working space of {n_working} orbitals exceeds the basis of {n_basis}")]
    InvalidWorkingSpace { n_working: usize, n_basis: usize },

    #[error("orbital matrices do not match: C is {c:?} but C_tilde is {c_tilde:?}, not its transposed shape")]
    OrbitalShapeMismatch {
        c: (usize, usize),
        c_tilde: (usize, usize),
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("tensor shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error(
        "density matrix is singular at t = {time} after regularization \
         (sigma_min = {sigma_min:.3e}, condition number = {condition_number:.3e}, epsilon = {epsilon:.1e})"
    )]
    NumericalIllConditioning {
        time: f64,
        sigma_min: f64,
        condition_number: f64,
        epsilon: f64,
    },

    #[error("linear system for {context} is singular")]
    SingularSystem { context: &'static str },
}

pub type Result<T> = std::result::Result<T, CoupledClusterError>;
