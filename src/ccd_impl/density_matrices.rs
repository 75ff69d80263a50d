//! Doubles one- and two-body density matrices
//!
//! Both are derivatives of the energy functional with respect to the
//! operator elements, so that `tr(h rho) + 1/4 sum u[p,r,q,s] rho2[q,s,p,r]`
//! reproduces the time-dependent energy.

use crate::linalg::{par_matrix, par_tensor4};
use crate::system_impl::OrbitalPartition;
use ndarray::{s, Array2, Array4, ArrayView4};
use num_complex::Complex64;

/// `rho[q, p] = <c_p^dagger c_q>`
pub(crate) fn compute_one_body_density_matrix(
    t: ArrayView4<Complex64>,
    l: ArrayView4<Complex64>,
    partition: &OrbitalPartition,
) -> Array2<Complex64> {
    let n = partition.n();
    let m = partition.m();
    let mut rho = Array2::<Complex64>::zeros((n + m, n + m));

    // rho[i, j] = delta_ij - 1/2 l_ik^cd t_cd^jk
    for i in 0..n {
        for j in 0..n {
            let mut sum = Complex64::new(0.0, 0.0);
            for k in 0..n {
                for c in 0..m {
                    for d in 0..m {
                        sum += l[[i, k, c, d]] * t[[c, d, j, k]];
                    }
                }
            }
            rho[[i, j]] = -0.5 * sum;
        }
        rho[[i, i]] += Complex64::new(1.0, 0.0);
    }

    // rho[a, b] = 1/2 t_ac^kl l_kl^bc
    for a in 0..m {
        for b in 0..m {
            let mut sum = Complex64::new(0.0, 0.0);
            for k in 0..n {
                for q in 0..n {
                    for c in 0..m {
                        sum += t[[a, c, k, q]] * l[[k, q, b, c]];
                    }
                }
            }
            rho[[n + a, n + b]] = 0.5 * sum;
        }
    }

    rho
}

/// `rho2[q, s, p, r] = <c_p^dagger c_r^dagger c_s c_q>`
pub(crate) fn compute_two_body_density_matrix(
    t: ArrayView4<Complex64>,
    l: ArrayView4<Complex64>,
    partition: &OrbitalPartition,
) -> Array4<Complex64> {
    let n = partition.n();
    let m = partition.m();
    let size = n + m;

    // g[p, r, q, s] = <c_p^dagger c_r^dagger c_s c_q>, the layout of u
    let mut g = Array4::<Complex64>::zeros((size, size, size, size));
    let one = Complex64::new(1.0, 0.0);

    for i in 0..n {
        for j in 0..n {
            g[[i, j, i, j]] += one;
            g[[i, j, j, i]] -= one;
        }
    }

    // mean-field part built from the correlated one-body density
    let rho = compute_one_body_density_matrix(t, l, partition);
    let mut x = rho.t().to_owned();
    for i in 0..n {
        x[[i, i]] -= one;
    }
    for k in 0..n {
        for p in 0..size {
            for q in 0..size {
                let value = x[[p, q]];
                if value.norm() == 0.0 {
                    continue;
                }
                g[[p, k, q, k]] += value;
                g[[p, k, k, q]] -= value;
                g[[k, p, q, k]] -= value;
                g[[k, p, k, q]] += value;
            }
        }
    }

    {
        let mut g_oovv = g.slice_mut(s![..n, ..n, n.., n..]);
        g_oovv += &t.permuted_axes([2, 3, 0, 1]);
    }
    {
        let mut g_vvoo = g.slice_mut(s![n.., n.., ..n, ..n]);
        g_vvoo += &l.permuted_axes([2, 3, 0, 1]);
    }

    let g_vvvv = par_tensor4((m, m, m, m), |(a, b, c, d)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for i in 0..n {
            for j in 0..n {
                sum += l[[i, j, a, b]] * t[[c, d, i, j]];
            }
        }
        0.5 * sum
    });
    {
        let mut block = g.slice_mut(s![n.., n.., n.., n..]);
        block += &g_vvvv;
    }

    // W_ijkl = l_ij^ab t_ab^kl
    let w_oooo = par_tensor4((n, n, n, n), |(i, j, k, q)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for a in 0..m {
            for b in 0..m {
                sum += l[[i, j, a, b]] * t[[a, b, k, q]];
            }
        }
        sum
    });
    {
        let mut block = g.slice_mut(s![..n, ..n, ..n, ..n]);
        block.scaled_add(
            Complex64::new(0.5, 0.0),
            &w_oooo.view().permuted_axes([2, 3, 0, 1]),
        );
    }

    // Y_kbcj = l_ij^ab t_ac^ik
    let y_ovvo = par_tensor4((n, m, m, n), |(k, b, c, j)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for i in 0..n {
            for a in 0..m {
                sum += l[[i, j, a, b]] * t[[a, c, i, k]];
            }
        }
        sum
    });
    for k in 0..n {
        for b in 0..m {
            for c in 0..m {
                for j in 0..n {
                    let value = y_ovvo[[k, b, c, j]];
                    g[[k, n + b, n + c, j]] += value;
                    g[[n + b, k, n + c, j]] -= value;
                    g[[k, n + b, j, n + c]] -= value;
                    g[[n + b, k, j, n + c]] += value;
                }
            }
        }
    }

    // quadratic terms, all in the oovv block
    let ladder = par_tensor4((n, n, m, m), |(k, q, c, d)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for i in 0..n {
            for j in 0..n {
                sum += t[[c, d, i, j]] * w_oooo[[i, j, k, q]];
            }
        }
        0.25 * sum
    });

    // Z_klcd = l_ij^ab t_ac^ik t_bd^jl
    let z = par_tensor4((n, n, m, m), |(k, q, c, d)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for j in 0..n {
            for b in 0..m {
                sum += y_ovvo[[k, b, c, j]] * t[[b, d, j, q]];
            }
        }
        sum
    });

    // W_il = l_ij^ab t_ab^lj, V_klcd = W_il t_dc^ik
    let w_oo = par_matrix((n, n), |(i, q)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for j in 0..n {
            for a in 0..m {
                for b in 0..m {
                    sum += l[[i, j, a, b]] * t[[a, b, q, j]];
                }
            }
        }
        sum
    });
    let v = par_tensor4((n, n, m, m), |(k, q, c, d)| {
        (0..n).map(|i| w_oo[[i, q]] * t[[d, c, i, k]]).sum()
    });

    // M_da = l_ij^ab t_db^ij, S_klcd = M_da t_ac^lk
    let m_vv = par_matrix((m, m), |(d, a)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for i in 0..n {
            for j in 0..n {
                for b in 0..m {
                    sum += l[[i, j, a, b]] * t[[d, b, i, j]];
                }
            }
        }
        sum
    });
    let s_oovv = par_tensor4((n, n, m, m), |(k, q, c, d)| {
        (0..m).map(|a| m_vv[[d, a]] * t[[a, c, q, k]]).sum()
    });

    let quadratic = par_tensor4((n, n, m, m), |(k, q, c, d)| {
        ladder[[k, q, c, d]] + z[[k, q, c, d]] - z[[q, k, c, d]]
            - 0.5 * (v[[k, q, c, d]] - v[[q, k, c, d]])
            - 0.5 * (s_oovv[[k, q, c, d]] - s_oovv[[k, q, d, c]])
    });
    {
        let mut block = g.slice_mut(s![..n, ..n, n.., n..]);
        block += &quadratic;
    }

    g.permuted_axes([2, 3, 0, 1]).as_standard_layout().into_owned()
}
