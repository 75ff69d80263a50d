//! Orbital-adaptive time-dependent coupled cluster
//!
//! Both the amplitudes and the bi-orthonormal orbitals `C`, `C_tilde` are
//! propagated. Every right-hand-side evaluation
//!
//! 1. rotates the operators, `h' = C_tilde h C`, `u' = C_tilde C_tilde u C C`,
//!    and builds `f'` from them;
//! 2. evaluates the amplitude derivatives with the rotated operators;
//! 3. builds the one- and two-body densities;
//! 4. solves the P-space equations for the rotation generator `eta`;
//! 5. inverts `rho`, regularized when singular (see [`Regularization`]);
//! 6. evaluates the Q-space equations for `dC/dt` and `dC_tilde/dt`.
//!
//! A working space smaller than the basis (`l' < l`) is supported; the
//! Q-space terms then couple the working orbitals to the rest of the basis.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut stepper = OrbitalAdaptiveStepper::new(&system, CCD::new(), system.l())?;
//! let (c, c_tilde) = (Array2::eye(l), Array2::eye(l));
//! let initial = ground_state.with_orbitals(c, c_tilde)?;
//! let trajectory = stepper.evolve(&initial, 0.0, 1e-2, 100, &RungeKutta4, &mut ())?;
//! ```

mod oatdcc;
mod q_space;
mod regularize;

pub use oatdcc::OrbitalAdaptiveStepper;
pub use regularize::{regularized_inverse, Regularization};
