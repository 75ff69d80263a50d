//! Doubles de-excitation residual
//!
//! The residual is four times the derivative of the energy functional
//! `E_ref + E_corr + 1/4 l_ij^ab R_ab^ij` with respect to `t_ab^ij`.

use crate::linalg::{antisymmetrize, antisymmetrize_both, par_matrix, par_tensor4};
use crate::system_impl::OrbitalPartition;
use ndarray::{s, Array2, Array4, ArrayView4};
use num_complex::Complex64;

/// Residual `R[i, j, a, b]` for `l[i, j, a, b]`
pub(crate) fn compute_l_2_residual(
    f: &Array2<Complex64>,
    u: &Array4<Complex64>,
    t: ArrayView4<Complex64>,
    l: ArrayView4<Complex64>,
    partition: &OrbitalPartition,
) -> Array4<Complex64> {
    let n = partition.n();
    let m = partition.m();
    let shape = (n, n, m, m);

    let f_oo = f.slice(s![..n, ..n]);
    let f_vv = f.slice(s![n.., n..]);
    let u_oooo = u.slice(s![..n, ..n, ..n, ..n]);
    let u_vvvv = u.slice(s![n.., n.., n.., n..]);
    let u_ovvo = u.slice(s![..n, n.., n.., ..n]);
    let u_oovv = u.slice(s![..n, ..n, n.., n..]);

    let mut residual = u_oovv.to_owned();

    let fock_vv = par_tensor4(shape, |(i, j, a, b)| {
        (0..m).map(|e| l[[i, j, a, e]] * f_vv[[e, b]]).sum()
    });
    residual += &antisymmetrize(&fock_vv, 2, 3);

    let fock_oo = par_tensor4(shape, |(i, j, a, b)| {
        (0..n).map(|k| l[[i, k, a, b]] * f_oo[[j, k]]).sum()
    });
    residual -= &antisymmetrize(&fock_oo, 0, 1);

    residual += &par_tensor4(shape, |(i, j, a, b)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for c in 0..m {
            for d in 0..m {
                sum += l[[i, j, c, d]] * u_vvvv[[c, d, a, b]];
            }
        }
        for k in 0..n {
            for q in 0..n {
                sum += u_oooo[[i, j, k, q]] * l[[k, q, a, b]];
            }
        }
        0.5 * sum
    });

    let ring = par_tensor4(shape, |(i, j, a, b)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for k in 0..n {
            for e in 0..m {
                sum += l[[i, k, a, e]] * u_ovvo[[j, e, b, k]];
            }
        }
        sum
    });
    residual += &antisymmetrize_both(&ring, (0, 1), (2, 3));

    // l_ij^cd t_cd^kl and <ij||cd> t_cd^kl
    let w_l = par_tensor4((n, n, n, n), |(i, j, k, q)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for c in 0..m {
            for d in 0..m {
                sum += l[[i, j, c, d]] * t[[c, d, k, q]];
            }
        }
        sum
    });
    let w_u = par_tensor4((n, n, n, n), |(i, j, k, q)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for c in 0..m {
            for d in 0..m {
                sum += u_oovv[[i, j, c, d]] * t[[c, d, k, q]];
            }
        }
        sum
    });
    residual += &par_tensor4(shape, |(i, j, a, b)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for k in 0..n {
            for q in 0..n {
                sum += w_l[[i, j, k, q]] * u_oovv[[k, q, a, b]];
                sum += w_u[[i, j, k, q]] * l[[k, q, a, b]];
            }
        }
        0.25 * sum
    });

    // Y_mejb = t_mn^ef <jn||bf>
    let y_ovov = par_tensor4((n, m, n, m), |(k, e, j, b)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for q in 0..n {
            for g in 0..m {
                sum += t[[e, g, k, q]] * u_oovv[[j, q, b, g]];
            }
        }
        sum
    });
    let quadratic_ring = par_tensor4(shape, |(i, j, a, b)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for k in 0..n {
            for e in 0..m {
                sum += l[[i, k, a, e]] * y_ovov[[k, e, j, b]];
            }
        }
        sum
    });
    residual += &antisymmetrize_both(&quadratic_ring, (0, 1), (2, 3));

    // occupied dressings: l_im^ef t_ef^mn and <in||cd> t_cd^mn
    let w_oo = par_matrix((n, n), |(i, q)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for k in 0..n {
            for e in 0..m {
                for g in 0..m {
                    sum += l[[i, k, e, g]] * t[[e, g, k, q]];
                }
            }
        }
        sum
    });
    let g_oo = par_matrix((n, n), |(i, k)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for q in 0..n {
            for c in 0..m {
                for d in 0..m {
                    sum += u_oovv[[i, q, c, d]] * t[[c, d, k, q]];
                }
            }
        }
        sum
    });
    let hole_dressing = par_tensor4(shape, |(i, j, a, b)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for k in 0..n {
            sum -= w_oo[[i, k]] * u_oovv[[j, k, a, b]];
            sum += g_oo[[i, k]] * l[[j, k, a, b]];
        }
        0.5 * sum
    });
    residual += &antisymmetrize(&hole_dressing, 0, 1);

    // virtual dressings: l_mn^ae t_de^mn and <kl||ac> t_ec^kl
    let m_vv = par_matrix((m, m), |(a, d)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for k in 0..n {
            for q in 0..n {
                for e in 0..m {
                    sum += l[[k, q, a, e]] * t[[d, e, k, q]];
                }
            }
        }
        sum
    });
    let n_vv = par_matrix((m, m), |(e, a)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for k in 0..n {
            for q in 0..n {
                for c in 0..m {
                    sum += u_oovv[[k, q, a, c]] * t[[e, c, k, q]];
                }
            }
        }
        sum
    });
    let particle_dressing = par_tensor4(shape, |(i, j, a, b)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for d in 0..m {
            sum += m_vv[[a, d]] * u_oovv[[i, j, b, d]];
            sum -= l[[i, j, d, b]] * n_vv[[d, a]];
        }
        0.5 * sum
    });
    residual += &antisymmetrize(&particle_dressing, 2, 3);

    residual
}
