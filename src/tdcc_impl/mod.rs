//! Fixed-basis time-dependent coupled cluster
//!
//! The amplitudes of a [`ResidualEvaluator`] flavor are propagated in the
//! basis of the [`QuantumSystem`]:
//!
//! ```text
//! dt_0/dt = -i E_corr(t)
//! dt/dt   = -i R_t(t)
//! dl/dt   = +i R_l(t, l)
//! ```
//!
//! with the Fock matrix rebuilt from `h(t)` whenever the system carries an
//! external field. The state is the flat vector of an
//! [`AmplitudeSet`](crate::amplitudes_impl::AmplitudeSet).
//!
//! [`ResidualEvaluator`]: crate::residual::ResidualEvaluator
//! [`QuantumSystem`]: crate::system_impl::QuantumSystem

mod tdcc;

pub(crate) use tdcc::{amplitude_derivatives, check_trace};
pub use tdcc::TimeDependentCoupledCluster;
