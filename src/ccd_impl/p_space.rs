//! P-space orbital-rotation equations for doubles
//!
//! With `eta_oo = eta_vv = 0` the remaining blocks follow from the stationarity
//! of the energy functional under orbital rotations:
//!
//! ```text
//! rho_oo X - X rho_vv = R_ov,   eta_ov = -i X
//! rho_vv Y - Y rho_oo = R_vo,   eta_vo = -i Y
//! R = rho h - h rho + W
//! W_qp = 1/2 rho2[q,s,r,t] u[r,t,p,s] - 1/2 u[q,s,t,w] rho2[t,w,p,s]
//! ```

use crate::error::{CoupledClusterError, Result};
use crate::linalg::par_matrix;
use crate::system_impl::OrbitalPartition;
use nalgebra::{DMatrix, DVector};
use ndarray::{Array2, Array4};
use num_complex::Complex64;

pub(crate) fn compute_eta(
    h: &Array2<Complex64>,
    u: &Array4<Complex64>,
    rho: &Array2<Complex64>,
    rho2: &Array4<Complex64>,
    partition: &OrbitalPartition,
) -> Result<Array2<Complex64>> {
    let n = partition.n();
    let m = partition.m();
    let size = n + m;

    let w = par_matrix((size, size), |(q, p)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for s in 0..size {
            for r in 0..size {
                for t in 0..size {
                    sum += rho2[[q, s, r, t]] * u[[r, t, p, s]];
                    sum -= u[[q, s, r, t]] * rho2[[r, t, p, s]];
                }
            }
        }
        0.5 * sum
    });
    let rhs = rho.dot(h) - h.dot(rho) + w;

    let minus_i = Complex64::new(0.0, -1.0);
    let mut eta = Array2::<Complex64>::zeros((size, size));

    // ov block, unknowns X[i, a] at i * m + a
    let a_ov = DMatrix::from_fn(n * m, n * m, |row, col| {
        let (i, a) = (row / m, row % m);
        let (j, b) = (col / m, col % m);
        let mut value = Complex64::new(0.0, 0.0);
        if a == b {
            value += rho[[i, j]];
        }
        if i == j {
            value -= rho[[n + b, n + a]];
        }
        value
    });
    let b_ov = DVector::from_fn(n * m, |row, _| rhs[[row / m, n + row % m]]);
    let x = a_ov
        .lu()
        .solve(&b_ov)
        .ok_or(CoupledClusterError::SingularSystem {
            context: "P-space occupied-virtual block",
        })?;

    // vo block, unknowns Y[a, i] at a * n + i
    let a_vo = DMatrix::from_fn(m * n, m * n, |row, col| {
        let (a, i) = (row / n, row % n);
        let (b, j) = (col / n, col % n);
        let mut value = Complex64::new(0.0, 0.0);
        if i == j {
            value += rho[[n + a, n + b]];
        }
        if a == b {
            value -= rho[[j, i]];
        }
        value
    });
    let b_vo = DVector::from_fn(m * n, |row, _| rhs[[n + row / n, row % n]]);
    let y = a_vo
        .lu()
        .solve(&b_vo)
        .ok_or(CoupledClusterError::SingularSystem {
            context: "P-space virtual-occupied block",
        })?;

    for i in 0..n {
        for a in 0..m {
            eta[[i, n + a]] = minus_i * x[i * m + a];
            eta[[n + a, i]] = minus_i * y[a * n + i];
        }
    }

    Ok(eta)
}
