//! Ground-state coupled-cluster solves
//!
//! The T amplitudes are iterated to the fixed point `R_t(t) = 0` with the
//! quasi-Newton update `t <- t + R_t / d_t`, accelerated by a
//! [`ConvergenceMixer`] and damped by `theta`:
//!
//! ```text
//! new = (1 - theta) * mixer(t, t + R_t / d_t, R_t) + theta * t
//! ```
//!
//! The Lambda amplitudes follow the same scheme on `R_l(t, l)` once `t` is
//! converged. Hitting the iteration cap is not an error; the returned
//! [`SolveOutcome`] says how the solve ended.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut solver = GroundStateSolver::new(&system, CCD::new(), MixerKind::default())?;
//! let outcome = solver.compute_ground_state_energy(1e-6, 100, 0.1)?;
//! solver.compute_lambda_amplitudes(1e-6, 100, 0.1)?;
//! let initial = solver.into_amplitudes();
//! ```
//!
//! [`ConvergenceMixer`]: crate::mixer_impl::ConvergenceMixer

mod solver;
#[cfg(test)]
mod tests;

pub use solver::{GroundStateSolver, IterationEvent, SolveOutcome, SolverState};
