//! Amplitude-equation capability consumed by the solvers
//!
//! A coupled-cluster flavor (a truncation level such as doubles) implements
//! [`ResidualEvaluator`]; the ground-state solver, the fixed-basis propagator
//! and the orbital-adaptive propagator are generic over it. Tensors are passed
//! in the layouts of the flavor's [`AmplitudeTemplate`], without the phase
//! amplitude `t_0`.

use crate::amplitudes_impl::{AmplitudeSet, AmplitudeTemplate};
use crate::error::Result;
use crate::system_impl::OrbitalPartition;
use ndarray::{Array2, Array4, ArrayD, Zip};
use num_complex::Complex64;

pub trait ResidualEvaluator {
    /// Tensor shapes of this truncation level
    fn amplitude_template(&self, partition: &OrbitalPartition) -> AmplitudeTemplate;

    /// Excitation residuals `R_t(t)`
    fn compute_t_residual(
        &self,
        f: &Array2<Complex64>,
        u: &Array4<Complex64>,
        t: &[ArrayD<Complex64>],
        partition: &OrbitalPartition,
    ) -> Result<Vec<ArrayD<Complex64>>>;

    /// De-excitation residuals `R_l(t, l)`
    fn compute_l_residual(
        &self,
        f: &Array2<Complex64>,
        u: &Array4<Complex64>,
        t: &[ArrayD<Complex64>],
        l: &[ArrayD<Complex64>],
        partition: &OrbitalPartition,
    ) -> Result<Vec<ArrayD<Complex64>>>;

    /// Correlation energy; also the derivative of the phase amplitude
    fn compute_correlation_energy(
        &self,
        f: &Array2<Complex64>,
        u: &Array4<Complex64>,
        t: &[ArrayD<Complex64>],
        partition: &OrbitalPartition,
    ) -> Result<Complex64>;

    /// Time-dependent energy functional `E_ref + E_corr + <l|R_t>`
    fn compute_lagrangian_energy(
        &self,
        f: &Array2<Complex64>,
        u: &Array4<Complex64>,
        t: &[ArrayD<Complex64>],
        l: &[ArrayD<Complex64>],
        partition: &OrbitalPartition,
    ) -> Result<Complex64>;

    /// Per-rank denominators for the excitation and de-excitation tensors
    fn energy_denominators(
        &self,
        f: &Array2<Complex64>,
        partition: &OrbitalPartition,
    ) -> (Vec<ArrayD<Complex64>>, Vec<ArrayD<Complex64>>);

    /// `<c_p^dagger c_q>` stored as `rho[q, p]`
    fn one_body_density(
        &self,
        t: &[ArrayD<Complex64>],
        l: &[ArrayD<Complex64>],
        partition: &OrbitalPartition,
    ) -> Result<Array2<Complex64>>;

    /// `<c_p^dagger c_r^dagger c_s c_q>` stored as `rho2[q, s, p, r]`
    fn two_body_density(
        &self,
        t: &[ArrayD<Complex64>],
        l: &[ArrayD<Complex64>],
        partition: &OrbitalPartition,
    ) -> Result<Array4<Complex64>>;

    /// One-sided overlap `<Psi_tilde(a)|Psi(b)>`
    fn compute_overlap(&self, a: &AmplitudeSet, b: &AmplitudeSet) -> Result<Complex64>;

    /// Overlap of the left state with the reference determinant
    fn left_reference_overlap(&self, amplitudes: &AmplitudeSet) -> Result<Complex64>;

    /// `sum_i f_ii - 1/2 sum_ij u_ijij`
    fn compute_reference_energy(
        &self,
        f: &Array2<Complex64>,
        u: &Array4<Complex64>,
        partition: &OrbitalPartition,
    ) -> Complex64 {
        let mut energy = Complex64::new(0.0, 0.0);
        for i in partition.occupied() {
            energy += f[[i, i]];
            for j in partition.occupied() {
                energy -= 0.5 * u[[i, j, i, j]];
            }
        }
        energy
    }

    fn compute_energy(
        &self,
        f: &Array2<Complex64>,
        u: &Array4<Complex64>,
        t: &[ArrayD<Complex64>],
        partition: &OrbitalPartition,
    ) -> Result<Complex64> {
        let correlation = self.compute_correlation_energy(f, u, t, partition)?;
        Ok(self.compute_reference_energy(f, u, partition) + correlation)
    }

    /// First-order estimate: residuals at zero amplitudes over the denominators
    fn initial_guess(
        &self,
        f: &Array2<Complex64>,
        u: &Array4<Complex64>,
        partition: &OrbitalPartition,
    ) -> Result<AmplitudeSet> {
        let mut amplitudes = self.amplitude_template(partition).zeros();
        let (t_denominators, l_denominators) = self.energy_denominators(f, partition);

        let t_residual = self.compute_t_residual(f, u, amplitudes.t_amplitudes(), partition)?;
        let l_residual =
            self.compute_l_residual(f, u, amplitudes.t_amplitudes(), amplitudes.l(), partition)?;

        for ((target, residual), d) in amplitudes
            .t_amplitudes_mut()
            .iter_mut()
            .zip(&t_residual)
            .zip(&t_denominators)
        {
            divide_into(target, residual, d);
        }
        for ((target, residual), d) in amplitudes
            .l_mut()
            .iter_mut()
            .zip(&l_residual)
            .zip(&l_denominators)
        {
            divide_into(target, residual, d);
        }
        Ok(amplitudes)
    }
}

/// Flavors that also supply the P-space orbital-rotation equations
pub trait OrbitalAdaptiveEvaluator: ResidualEvaluator {
    /// Orbital-rotation generator `eta` in the rotated basis, with the
    /// gauge blocks `eta_oo` and `eta_vv` set to zero
    fn compute_p_space_equations(
        &self,
        h: &Array2<Complex64>,
        u: &Array4<Complex64>,
        rho: &Array2<Complex64>,
        rho2: &Array4<Complex64>,
        partition: &OrbitalPartition,
    ) -> Result<Array2<Complex64>>;
}

/// `target = residual / d`, zero where the denominator vanishes
pub(crate) fn divide_into(
    target: &mut ArrayD<Complex64>,
    residual: &ArrayD<Complex64>,
    d: &ArrayD<Complex64>,
) {
    Zip::from(target)
        .and(residual)
        .and(d)
        .for_each(|x, &r, &denominator| {
            *x = if denominator.norm() > 0.0 {
                r / denominator
            } else {
                Complex64::new(0.0, 0.0)
            };
        });
}
