use crate::system_impl::OrbitalPartition;
use ndarray::{s, Array4, ArrayView4, Zip};
use num_complex::Complex64;

/// `E_corr = 1/4 <ij||ab> t_ij^ab`
pub(crate) fn compute_ccd_correlation_energy(
    u: &Array4<Complex64>,
    t: ArrayView4<Complex64>,
    partition: &OrbitalPartition,
) -> Complex64 {
    let n = partition.n();
    let u_oovv = u.slice(s![..n, ..n, n.., n..]);
    0.25 * pair_contraction(u_oovv, t)
}

/// `sum x[i, j, a, b] y[a, b, i, j]`
pub(crate) fn pair_contraction(x: ArrayView4<Complex64>, y: ArrayView4<Complex64>) -> Complex64 {
    let y = y.permuted_axes([2, 3, 0, 1]);
    let mut sum = Complex64::new(0.0, 0.0);
    Zip::from(&x).and(&y).for_each(|&a, &b| sum += a * b);
    sum
}
