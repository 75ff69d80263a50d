//! Operator tensors, orbital partition and basis transformations

use super::laser::TimeDependentField;
use crate::error::{CoupledClusterError, Result};
use crate::linalg::contract_axis;
use ndarray::{s, Array2, Array4};
use num_complex::Complex64;
use std::ops::Range;
use tracing::info;

/// Occupied/virtual split of a spin-orbital basis
///
/// Occupied orbitals are `0..n`, virtual orbitals `n..l`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrbitalPartition {
    n: usize,
    l: usize,
}

impl OrbitalPartition {
    pub fn new(n_occupied: usize, n_basis: usize) -> Result<Self> {
        if n_occupied > n_basis {
            return Err(CoupledClusterError::InvalidPartition {
                n_occupied,
                n_basis,
            });
        }
        Ok(OrbitalPartition {
            n: n_occupied,
            l: n_basis,
        })
    }

    /// Number of occupied orbitals (particles)
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of virtual orbitals
    pub fn m(&self) -> usize {
        self.l - self.n
    }

    /// Basis size
    pub fn l(&self) -> usize {
        self.l
    }

    pub fn occupied(&self) -> Range<usize> {
        0..self.n
    }

    pub fn virtuals(&self) -> Range<usize> {
        self.n..self.l
    }
}

/// Source of operator tensors for the coupled-cluster engine
pub trait QuantumSystem {
    fn partition(&self) -> OrbitalPartition;

    /// Time-independent one-body operator
    fn h(&self) -> &Array2<Complex64>;

    /// Antisymmetrized two-body operator
    fn u(&self) -> &Array4<Complex64>;

    /// One-body operator at `time` when an external field is present
    fn h_t(&self, _time: f64) -> Option<Array2<Complex64>> {
        None
    }

    /// Two-body operator at `time` when it is time dependent
    fn u_t(&self, _time: f64) -> Option<Array4<Complex64>> {
        None
    }

    fn n(&self) -> usize {
        self.partition().n()
    }

    fn m(&self) -> usize {
        self.partition().m()
    }

    fn l(&self) -> usize {
        self.partition().l()
    }

    fn construct_fock_matrix(&self, h: &Array2<Complex64>, u: &Array4<Complex64>) -> Array2<Complex64> {
        construct_fock_matrix(h, u, &self.partition())
    }

    fn transform_one_body_elements(
        &self,
        h: &Array2<Complex64>,
        c: &Array2<Complex64>,
        c_tilde: &Array2<Complex64>,
    ) -> Array2<Complex64> {
        transform_one_body_elements(h, c, c_tilde)
    }

    fn transform_two_body_elements(
        &self,
        u: &Array4<Complex64>,
        c: &Array2<Complex64>,
        c_tilde: &Array2<Complex64>,
    ) -> Array4<Complex64> {
        transform_two_body_elements(u, c, c_tilde)
    }
}

/// `f[p, q] = h[p, q] + sum_i u[p, i, q, i]`
pub fn construct_fock_matrix(
    h: &Array2<Complex64>,
    u: &Array4<Complex64>,
    partition: &OrbitalPartition,
) -> Array2<Complex64> {
    let mut f = h.clone();
    for i in partition.occupied() {
        f += &u.slice(s![.., i, .., i]);
    }
    f
}

/// `h' = C_tilde h C`
pub fn transform_one_body_elements(
    h: &Array2<Complex64>,
    c: &Array2<Complex64>,
    c_tilde: &Array2<Complex64>,
) -> Array2<Complex64> {
    c_tilde.dot(h).dot(c)
}

/// `u'[p, q, r, s] = sum C_tilde[p, a] C_tilde[q, b] u[a, b, g, d] C[g, r] C[d, s]`
pub fn transform_two_body_elements(
    u: &Array4<Complex64>,
    c: &Array2<Complex64>,
    c_tilde: &Array2<Complex64>,
) -> Array4<Complex64> {
    let c_tilde_t = c_tilde.t().to_owned();
    let mut out = contract_axis(u, 3, c);
    out = contract_axis(&out, 2, c);
    out = contract_axis(&out, 1, &c_tilde_t);
    contract_axis(&out, 0, &c_tilde_t)
}

/// General spin-orbital system with an optional dipole coupling to a laser field
///
/// With a field `E(t)` and dipole operator `d`, the one-body operator becomes
/// `h(t) = h + E(t) d`.
pub struct GeneralSystem {
    partition: OrbitalPartition,
    h: Array2<Complex64>,
    u: Array4<Complex64>,
    dipole: Option<Array2<Complex64>>,
    field: Option<Box<dyn TimeDependentField + Send + Sync>>,
}

impl GeneralSystem {
    pub fn new(n: usize, h: Array2<Complex64>, u: Array4<Complex64>) -> Result<Self> {
        let l = h.nrows();
        let partition = OrbitalPartition::new(n, l)?;

        if h.ncols() != l {
            return Err(CoupledClusterError::ShapeMismatch {
                context: "one-body operator",
                expected: l * l,
                found: h.len(),
            });
        }
        if u.dim() != (l, l, l, l) {
            return Err(CoupledClusterError::ShapeMismatch {
                context: "two-body operator",
                expected: l * l * l * l,
                found: u.len(),
            });
        }

        info!(
            "System initialized: {} particles in {} spin-orbitals ({} virtual)",
            partition.n(),
            partition.l(),
            partition.m()
        );

        Ok(GeneralSystem {
            partition,
            h,
            u,
            dipole: None,
            field: None,
        })
    }

    /// Couple the dipole operator `dipole` to the time-dependent field `field`
    pub fn with_dipole_field(
        mut self,
        dipole: Array2<Complex64>,
        field: Box<dyn TimeDependentField + Send + Sync>,
    ) -> Result<Self> {
        if dipole.dim() != self.h.dim() {
            return Err(CoupledClusterError::ShapeMismatch {
                context: "dipole operator",
                expected: self.h.len(),
                found: dipole.len(),
            });
        }
        self.dipole = Some(dipole);
        self.field = Some(field);
        Ok(self)
    }

    pub fn dipole(&self) -> Option<&Array2<Complex64>> {
        self.dipole.as_ref()
    }
}

impl QuantumSystem for GeneralSystem {
    fn partition(&self) -> OrbitalPartition {
        self.partition
    }

    fn h(&self) -> &Array2<Complex64> {
        &self.h
    }

    fn u(&self) -> &Array4<Complex64> {
        &self.u
    }

    fn h_t(&self, time: f64) -> Option<Array2<Complex64>> {
        match (&self.dipole, &self.field) {
            (Some(dipole), Some(field)) => {
                let strength = Complex64::new(field.amplitude(time), 0.0);
                Some(&self.h + &dipole.mapv(|d| d * strength))
            }
            _ => None,
        }
    }
}
