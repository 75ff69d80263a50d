//! Q-space orbital equations
//!
//! With `Q = 1 - C C_tilde` projecting out the working space,
//!
//! ```text
//! dC/dt       = C eta - i [(h C - C h') rho + U] rho^{-1}
//! dC_tilde/dt = -eta C_tilde + i rho^{-1} [rho (C_tilde h - h' C_tilde) + V]
//!
//! U[a, p] = 1/2 sum_rqs u_q[a, r, q, s] rho2[q, s, p, r]
//! u_q[a, r, q, s] = sum_bgd C_tilde[r, b] u[a, b, g, d] C[g, q] C[d, s] - sum_t C[a, t] u'[t, r, q, s]
//!
//! V[q, b] = 1/2 sum_spr rho2[q, s, p, r] u_b[p, r, b, s]
//! u_b[p, r, b, s] = sum_agd C_tilde[p, a] C_tilde[r, g] u[a, g, b, d] C[d, s] - sum_t u'[p, r, t, s] C_tilde[t, b]
//! ```
//!
//! The `h C - C h'` and `u_q` terms equal `Q h C` and the Q-projected
//! half-transformed integrals, so `C_tilde dC/dt + dC_tilde/dt C = 0` and
//! bi-orthonormality is conserved.

use crate::linalg::{contract_axis, par_matrix};
use ndarray::{Array2, Array4};
use num_complex::Complex64;

/// Operators and densities entering the Q-space equations
pub(crate) struct QSpaceInput<'a> {
    pub c: &'a Array2<Complex64>,
    pub c_tilde: &'a Array2<Complex64>,
    pub eta: &'a Array2<Complex64>,
    pub h: &'a Array2<Complex64>,
    pub h_prime: &'a Array2<Complex64>,
    pub u: &'a Array4<Complex64>,
    pub u_prime: &'a Array4<Complex64>,
    pub rho: &'a Array2<Complex64>,
    pub rho_inv: &'a Array2<Complex64>,
    pub rho2: &'a Array4<Complex64>,
}

const MINUS_I: Complex64 = Complex64::new(0.0, -1.0);
const PLUS_I: Complex64 = Complex64::new(0.0, 1.0);

pub(crate) fn compute_q_space_ket_equations(input: &QSpaceInput) -> Array2<Complex64> {
    let QSpaceInput {
        c,
        c_tilde,
        eta,
        h,
        h_prime,
        u,
        u_prime,
        rho,
        rho_inv,
        rho2,
    } = *input;

    let c_tilde_t = c_tilde.t().to_owned();
    let c_t = c.t().to_owned();
    let mut u_q = contract_axis(&contract_axis(&contract_axis(u, 3, c), 2, c), 1, &c_tilde_t);
    u_q -= &contract_axis(u_prime, 0, &c_t);

    let (l, l_prime) = c.dim();
    let u_term = par_matrix((l, l_prime), |(a, p)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for r in 0..l_prime {
            for q in 0..l_prime {
                for s in 0..l_prime {
                    sum += u_q[[a, r, q, s]] * rho2[[q, s, p, r]];
                }
            }
        }
        0.5 * sum
    });

    let one_body = h.dot(c) - c.dot(h_prime);
    let bracket = one_body.dot(rho) + u_term;
    c.dot(eta) + bracket.dot(rho_inv) * MINUS_I
}

pub(crate) fn compute_q_space_bra_equations(input: &QSpaceInput) -> Array2<Complex64> {
    let QSpaceInput {
        c,
        c_tilde,
        eta,
        h,
        h_prime,
        u,
        u_prime,
        rho,
        rho_inv,
        rho2,
    } = *input;

    let c_tilde_t = c_tilde.t().to_owned();
    let mut u_b = contract_axis(&contract_axis(&contract_axis(u, 3, c), 1, &c_tilde_t), 0, &c_tilde_t);
    u_b -= &contract_axis(u_prime, 2, c_tilde);

    let (l_prime, l) = c_tilde.dim();
    let v_term = par_matrix((l_prime, l), |(q, b)| {
        let mut sum = Complex64::new(0.0, 0.0);
        for s in 0..l_prime {
            for p in 0..l_prime {
                for r in 0..l_prime {
                    sum += rho2[[q, s, p, r]] * u_b[[p, r, b, s]];
                }
            }
        }
        0.5 * sum
    });

    let one_body = c_tilde.dot(h) - h_prime.dot(c_tilde);
    let bracket = rho.dot(&one_body) + v_term;
    -eta.dot(c_tilde) + rho_inv.dot(&bracket) * PLUS_I
}
