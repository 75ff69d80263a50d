use super::energies::pair_contraction;
use ndarray::ArrayView4;
use num_complex::Complex64;

/// `<Psi_tilde(a)|Psi(b)> = exp(t_0^b - t_0^a) (1 + 1/4 l^a (t^b - t^a))`
pub(crate) fn compute_ccd_overlap(
    t_0_a: Complex64,
    t_a: ArrayView4<Complex64>,
    l_a: ArrayView4<Complex64>,
    t_0_b: Complex64,
    t_b: ArrayView4<Complex64>,
) -> Complex64 {
    let delta = &t_b - &t_a;
    let one = Complex64::new(1.0, 0.0);
    (t_0_b - t_0_a).exp() * (one + 0.25 * pair_contraction(l_a, delta.view()))
}

/// `1 - 1/4 l_ij^ab t_ab^ij`
pub(crate) fn compute_left_reference_overlap(
    t: ArrayView4<Complex64>,
    l: ArrayView4<Complex64>,
) -> Complex64 {
    Complex64::new(1.0, 0.0) - 0.25 * pair_contraction(l, t)
}
