use super::density_matrices::{compute_one_body_density_matrix, compute_two_body_density_matrix};
use super::energies::{compute_ccd_correlation_energy, pair_contraction};
use super::overlap::{compute_ccd_overlap, compute_left_reference_overlap};
use super::p_space::compute_eta;
use super::rhs_l::compute_l_2_residual;
use super::rhs_t::compute_t_2_residual;
use crate::amplitudes_impl::{AmplitudeSet, AmplitudeTemplate};
use crate::error::{CoupledClusterError, Result};
use crate::residual::{OrbitalAdaptiveEvaluator, ResidualEvaluator};
use crate::system_impl::OrbitalPartition;
use ndarray::{Array2, Array4, ArrayD, ArrayView4, Ix4};
use num_complex::Complex64;

/// Coupled-cluster doubles
///
/// Amplitude layout: `t = [t_0 (1), t_2 (m, m, n, n)]`, `l = [l_2 (n, n, m, m)]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CCD;

impl CCD {
    pub fn new() -> Self {
        CCD
    }
}

/// The single doubles tensor of `tensors`, checked against `shape`
fn doubles<'a>(
    tensors: &'a [ArrayD<Complex64>],
    shape: [usize; 4],
    context: &'static str,
) -> Result<ArrayView4<'a, Complex64>> {
    let expected = shape.iter().product();
    let tensor = tensors.first().ok_or(CoupledClusterError::ShapeMismatch {
        context,
        expected,
        found: 0,
    })?;
    if tensor.shape() != shape {
        return Err(CoupledClusterError::ShapeMismatch {
            context,
            expected,
            found: tensor.len(),
        });
    }
    Ok(tensor.view().into_dimensionality::<Ix4>()?)
}

fn t_shape(partition: &OrbitalPartition) -> [usize; 4] {
    let (n, m) = (partition.n(), partition.m());
    [m, m, n, n]
}

fn l_shape(partition: &OrbitalPartition) -> [usize; 4] {
    let (n, m) = (partition.n(), partition.m());
    [n, n, m, m]
}

impl ResidualEvaluator for CCD {
    fn amplitude_template(&self, partition: &OrbitalPartition) -> AmplitudeTemplate {
        AmplitudeTemplate::new(
            vec![vec![1], t_shape(partition).to_vec()],
            vec![l_shape(partition).to_vec()],
        )
    }

    fn compute_t_residual(
        &self,
        f: &Array2<Complex64>,
        u: &Array4<Complex64>,
        t: &[ArrayD<Complex64>],
        partition: &OrbitalPartition,
    ) -> Result<Vec<ArrayD<Complex64>>> {
        let t_2 = doubles(t, t_shape(partition), "t2 amplitudes")?;
        let residual = compute_t_2_residual(f, u, t_2, partition);
        Ok(vec![residual.into_dyn()])
    }

    fn compute_l_residual(
        &self,
        f: &Array2<Complex64>,
        u: &Array4<Complex64>,
        t: &[ArrayD<Complex64>],
        l: &[ArrayD<Complex64>],
        partition: &OrbitalPartition,
    ) -> Result<Vec<ArrayD<Complex64>>> {
        let t_2 = doubles(t, t_shape(partition), "t2 amplitudes")?;
        let l_2 = doubles(l, l_shape(partition), "l2 amplitudes")?;
        let residual = compute_l_2_residual(f, u, t_2, l_2, partition);
        Ok(vec![residual.into_dyn()])
    }

    fn compute_correlation_energy(
        &self,
        _f: &Array2<Complex64>,
        u: &Array4<Complex64>,
        t: &[ArrayD<Complex64>],
        partition: &OrbitalPartition,
    ) -> Result<Complex64> {
        let t_2 = doubles(t, t_shape(partition), "t2 amplitudes")?;
        Ok(compute_ccd_correlation_energy(u, t_2, partition))
    }

    fn compute_lagrangian_energy(
        &self,
        f: &Array2<Complex64>,
        u: &Array4<Complex64>,
        t: &[ArrayD<Complex64>],
        l: &[ArrayD<Complex64>],
        partition: &OrbitalPartition,
    ) -> Result<Complex64> {
        let t_2 = doubles(t, t_shape(partition), "t2 amplitudes")?;
        let l_2 = doubles(l, l_shape(partition), "l2 amplitudes")?;
        let residual = compute_t_2_residual(f, u, t_2, partition);

        Ok(self.compute_reference_energy(f, u, partition)
            + compute_ccd_correlation_energy(u, t_2, partition)
            + 0.25 * pair_contraction(l_2, residual.view()))
    }

    fn energy_denominators(
        &self,
        f: &Array2<Complex64>,
        partition: &OrbitalPartition,
    ) -> (Vec<ArrayD<Complex64>>, Vec<ArrayD<Complex64>>) {
        let n = partition.n();
        let diagonal = f.diag();
        let d_t = Array4::from_shape_fn(
            (partition.m(), partition.m(), n, n),
            |(a, b, i, j)| {
                diagonal[i] + diagonal[j] - diagonal[n + a] - diagonal[n + b]
            },
        );
        let d_l = d_t.view().permuted_axes([2, 3, 0, 1]).to_owned();
        (vec![d_t.into_dyn()], vec![d_l.into_dyn()])
    }

    fn one_body_density(
        &self,
        t: &[ArrayD<Complex64>],
        l: &[ArrayD<Complex64>],
        partition: &OrbitalPartition,
    ) -> Result<Array2<Complex64>> {
        let t_2 = doubles(t, t_shape(partition), "t2 amplitudes")?;
        let l_2 = doubles(l, l_shape(partition), "l2 amplitudes")?;
        Ok(compute_one_body_density_matrix(t_2, l_2, partition))
    }

    fn two_body_density(
        &self,
        t: &[ArrayD<Complex64>],
        l: &[ArrayD<Complex64>],
        partition: &OrbitalPartition,
    ) -> Result<Array4<Complex64>> {
        let t_2 = doubles(t, t_shape(partition), "t2 amplitudes")?;
        let l_2 = doubles(l, l_shape(partition), "l2 amplitudes")?;
        Ok(compute_two_body_density_matrix(t_2, l_2, partition))
    }

    fn compute_overlap(&self, a: &AmplitudeSet, b: &AmplitudeSet) -> Result<Complex64> {
        let t_a = single_doubles(a.t_amplitudes(), "t2 amplitudes of the left state")?;
        let l_a = single_doubles(a.l(), "l2 amplitudes of the left state")?;
        let t_b = single_doubles(b.t_amplitudes(), "t2 amplitudes of the right state")?;
        let (m, _, n, _) = t_a.dim();
        if t_a.shape() != t_b.shape() || l_a.dim() != (n, n, m, m) {
            return Err(CoupledClusterError::ShapeMismatch {
                context: "overlap states",
                expected: t_a.len(),
                found: t_b.len(),
            });
        }
        Ok(compute_ccd_overlap(a.t_0(), t_a, l_a, b.t_0(), t_b))
    }

    fn left_reference_overlap(&self, amplitudes: &AmplitudeSet) -> Result<Complex64> {
        let t_2 = single_doubles(amplitudes.t_amplitudes(), "t2 amplitudes")?;
        let l_2 = single_doubles(amplitudes.l(), "l2 amplitudes")?;
        let (m, _, n, _) = t_2.dim();
        if l_2.dim() != (n, n, m, m) {
            return Err(CoupledClusterError::ShapeMismatch {
                context: "l2 amplitudes",
                expected: t_2.len(),
                found: l_2.len(),
            });
        }
        Ok(compute_left_reference_overlap(t_2, l_2))
    }
}

impl OrbitalAdaptiveEvaluator for CCD {
    fn compute_p_space_equations(
        &self,
        h: &Array2<Complex64>,
        u: &Array4<Complex64>,
        rho: &Array2<Complex64>,
        rho2: &Array4<Complex64>,
        partition: &OrbitalPartition,
    ) -> Result<Array2<Complex64>> {
        compute_eta(h, u, rho, rho2, partition)
    }
}

/// Doubles tensor of an amplitude set whose partition is not at hand
fn single_doubles<'a>(
    tensors: &'a [ArrayD<Complex64>],
    context: &'static str,
) -> Result<ArrayView4<'a, Complex64>> {
    let tensor = tensors.first().ok_or(CoupledClusterError::ShapeMismatch {
        context,
        expected: 1,
        found: 0,
    })?;
    Ok(tensor.view().into_dimensionality::<Ix4>()?)
}
