//! Coupled-cluster doubles (CCD) amplitude equations
//!
//! This module provides the reference [`ResidualEvaluator`] flavor: the T2 and
//! Lambda-2 residuals, energies, density matrices, the time-dependent overlap
//! and the P-space orbital-rotation equations.
//!
//! # Theory
//!
//! The right state is `|Psi> = exp(t_0) exp(T_2) |Phi>` and the left state
//! `<Psi_tilde| = exp(-t_0) <Phi| (1 + L_2) exp(-T_2)`, with
//!
//! ```text
//! T_2 = 1/4 t_ij^ab c_a^dagger c_b^dagger c_j c_i
//! L_2 = 1/4 l_ab^ij c_i^dagger c_j^dagger c_b c_a
//! ```
//!
//! The energy functional is
//!
//! ```text
//! E = E_ref + 1/4 <ij||ab> t_ij^ab + 1/4 l_ab^ij R_ij^ab(t)
//! ```
//!
//! and the Lambda residual is its derivative with respect to `t`. The
//! density matrices are its derivatives with respect to `h` and `u`.
//!
//! # Usage
//!
//! ```rust,ignore
//! let ccd = CCD::new();
//! let f = system.construct_fock_matrix(system.h(), system.u());
//! let guess = ccd.initial_guess(&f, system.u(), &system.partition())?;
//! ```
//!
//! [`ResidualEvaluator`]: crate::residual::ResidualEvaluator

mod ccd;
mod density_matrices;
mod energies;
mod overlap;
mod p_space;
mod rhs_l;
mod rhs_t;
#[cfg(test)]
mod tests;

pub use ccd::CCD;
