//! Quantum-system collaborator
//!
//! Supplies the one- and two-body operator tensors in the spin-orbital basis,
//! the occupied/virtual partition, Fock construction and basis transformations.
//!
//! # Conventions
//!
//! - `h[p, q]` is the one-body operator, `u[p, q, r, s] = <pq||rs>` the
//!   antisymmetrized two-body operator.
//! - The Fock operator is `f[p, q] = h[p, q] + sum_i u[p, i, q, i]` over the
//!   occupied orbitals `i`.
//! - A rotated basis is given by `C` (`l x l'`) and its bi-orthogonal partner
//!   `C_tilde` (`l' x l`): `h' = C_tilde h C`, `u' = C_tilde C_tilde u C C`.
//!
//! # Usage
//!
//! ```rust,ignore
//! let system = RandomSystemBuilder::new(2, 6).seed(7).build()?;
//! let f = system.construct_fock_matrix(system.h(), system.u());
//! ```

mod laser;
mod random;
mod system;
#[cfg(test)]
mod tests;

pub use laser::{LaserPulse, TimeDependentField};
pub use random::RandomSystemBuilder;
pub use system::{
    construct_fock_matrix, transform_one_body_elements, transform_two_body_elements, GeneralSystem,
    OrbitalPartition, QuantumSystem,
};
