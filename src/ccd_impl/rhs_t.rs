//! Doubles amplitude residual
//!
//! ```text
//! R_ij^ab = <ab||ij> + P(ab) f_bc t_ij^ac - P(ij) f_kj t_ik^ab
//!         + 1/2 <ab||cd> t_ij^cd + 1/2 <kl||ij> t_kl^ab
//!         + P(ab) P(ij) <kb||cj> t_ik^ac
//!         + 1/4 <kl||cd> t_ij^cd t_kl^ab
//!         + P(ij) <kl||cd> t_ik^ac t_jl^bd
//!         - 1/2 P(ij) <kl||cd> t_ik^dc t_lj^ab
//!         - 1/2 P(ab) <kl||cd> t_lk^ac t_ij^db
//! ```

use crate::linalg::{antisymmetrize, antisymmetrize_both, par_matrix, par_tensor4};
use crate::system_impl::OrbitalPartition;
use ndarray::{s, Array2, Array4, ArrayView4};
use num_complex::Complex64;

/// Residual `R[a, b, i, j]` for `t[a, b, i, j]`
pub(crate) fn compute_t_2_residual(
    f: &Array2<Complex64>,
    u: &Array4<Complex64>,
    t: ArrayView4<Complex64>,
    partition: &OrbitalPartition,
) -> Array4<Complex64> {
    let n = partition.n();
    let m = partition.m();
    let shape = (m, m, n, n);

    let f_oo = f.slice(s![..n, ..n]);
    let f_vv = f.slice(s![n.., n..]);
    let u_oooo = u.slice(s![..n, ..n, ..n, ..n]);
    let u_vvvv = u.slice(s![n.., n.., n.., n..]);
    let u_ovvo = u.slice(s![..n, n.., n.., ..n]);
    let u_oovv = u.slice(s![..n, ..n, n.., n..]);

    let mut residual = u.slice(s![n.., n.., ..n, ..n]).to_owned();

    let fock_vv = par_tensor4(shape, |(a, b, i, j)| {
        (0..m).map(|c| f_vv[[b, c]] * t[[a, c, i, j]]).sum()
    });
    residual += &antisymmetrize(&fock_vv, 0, 1);

    let fock_oo = par_tensor4(shape, |(a, b, i, j)| {
        (0..n).map(|k| f_oo[[k, j]] * t[[a, b, i, k]]).sum()
    });
    residual -= &antisymmetrize(&fock_oo, 2, 3);

    // particle-particle and hole-hole ladders
    residual += &par_tensor4(shape, |(a, b, i, j)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for c in 0..m {
            for d in 0..m {
                sum += u_vvvv[[a, b, c, d]] * t[[c, d, i, j]];
            }
        }
        for k in 0..n {
            for l in 0..n {
                sum += u_oooo[[k, l, i, j]] * t[[a, b, k, l]];
            }
        }
        0.5 * sum
    });

    let ring = par_tensor4(shape, |(a, b, i, j)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for k in 0..n {
            for c in 0..m {
                sum += u_ovvo[[k, b, c, j]] * t[[a, c, i, k]];
            }
        }
        sum
    });
    residual += &antisymmetrize_both(&ring, (0, 1), (2, 3));

    // W_klij = 1/2 <kl||cd> t_ij^cd
    let w_oooo = par_tensor4((n, n, n, n), |(k, l, i, j)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for c in 0..m {
            for d in 0..m {
                sum += u_oovv[[k, l, c, d]] * t[[c, d, i, j]];
            }
        }
        0.5 * sum
    });
    residual += &par_tensor4(shape, |(a, b, i, j)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for k in 0..n {
            for l in 0..n {
                sum += t[[a, b, k, l]] * w_oooo[[k, l, i, j]];
            }
        }
        0.5 * sum
    });

    // G_kcbj = <kl||cd> t_jl^bd
    let g_ovvo = par_tensor4((n, m, m, n), |(k, c, b, j)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for l in 0..n {
            for d in 0..m {
                sum += u_oovv[[k, l, c, d]] * t[[b, d, j, l]];
            }
        }
        sum
    });
    let quadratic_ring = par_tensor4(shape, |(a, b, i, j)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for k in 0..n {
            for c in 0..m {
                sum += t[[a, c, i, k]] * g_ovvo[[k, c, b, j]];
            }
        }
        sum
    });
    residual += &antisymmetrize(&quadratic_ring, 2, 3);

    // H_li = <kl||cd> t_ik^dc
    let h_oo = par_matrix((n, n), |(l, i)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for k in 0..n {
            for c in 0..m {
                for d in 0..m {
                    sum += u_oovv[[k, l, c, d]] * t[[d, c, i, k]];
                }
            }
        }
        sum
    });
    let hole_dressing = par_tensor4(shape, |(a, b, i, j)| {
        (0..n).map(|l| h_oo[[l, i]] * t[[a, b, l, j]]).sum::<Complex64>() * 0.5
    });
    residual -= &antisymmetrize(&hole_dressing, 2, 3);

    // H_ad = <kl||cd> t_lk^ac
    let h_vv = par_matrix((m, m), |(a, d)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for k in 0..n {
            for l in 0..n {
                for c in 0..m {
                    sum += u_oovv[[k, l, c, d]] * t[[a, c, l, k]];
                }
            }
        }
        sum
    });
    let particle_dressing = par_tensor4(shape, |(a, b, i, j)| {
        (0..m).map(|d| h_vv[[a, d]] * t[[d, b, i, j]]).sum::<Complex64>() * 0.5
    });
    residual -= &antisymmetrize(&particle_dressing, 0, 1);

    residual
}
