use crate::amplitudes_impl::{AmplitudeSet, AmplitudeTemplate};
use crate::error::Result;
use crate::integrator_impl::{
    evolve, Integrator, RightHandSide, StepEvent, Trajectory, DEEXCITATION_PHASE, EXCITATION_PHASE,
};
use crate::observe::Observer;
use crate::residual::ResidualEvaluator;
use crate::system_impl::{OrbitalPartition, QuantumSystem};
use ndarray::{Array1, Array2, Array4, ArrayD, IxDyn};
use num_complex::Complex64;
use tracing::warn;

/// Time derivatives of the `t` (phase first) and `l` tensors
pub(crate) fn amplitude_derivatives<E: ResidualEvaluator + ?Sized>(
    evaluator: &E,
    f: &Array2<Complex64>,
    u: &Array4<Complex64>,
    amplitudes: &AmplitudeSet,
    partition: &OrbitalPartition,
) -> Result<(Vec<ArrayD<Complex64>>, Vec<ArrayD<Complex64>>)> {
    let t = amplitudes.t_amplitudes();
    let l = amplitudes.l();

    let correlation = evaluator.compute_correlation_energy(f, u, t, partition)?;
    let mut dt = vec![ArrayD::from_elem(IxDyn(&[1]), EXCITATION_PHASE * correlation)];
    for residual in evaluator.compute_t_residual(f, u, t, partition)? {
        dt.push(residual * EXCITATION_PHASE);
    }

    let dl = evaluator
        .compute_l_residual(f, u, t, l, partition)?
        .into_iter()
        .map(|residual| residual * DEEXCITATION_PHASE)
        .collect();

    Ok((dt, dl))
}

/// Logs a warning when `|tr rho - n|` exceeds `tolerance`
pub(crate) fn check_trace(rho: &Array2<Complex64>, n: usize, tolerance: f64, time: f64) {
    let trace: Complex64 = rho.diag().iter().sum();
    if (trace - n as f64).norm() > tolerance {
        warn!(
            "Trace of the one-body density at t = {:.6} is {:.8} (expected {})",
            time, trace, n
        );
    }
}

/// Equations of motion of a coupled-cluster flavor in a fixed basis
pub struct TimeDependentCoupledCluster<'a, S: QuantumSystem, E: ResidualEvaluator> {
    system: &'a S,
    evaluator: E,
    partition: OrbitalPartition,
    template: AmplitudeTemplate,
    trace_tolerance: f64,
}

impl<'a, S: QuantumSystem, E: ResidualEvaluator> TimeDependentCoupledCluster<'a, S, E> {
    pub fn new(system: &'a S, evaluator: E) -> Self {
        let partition = system.partition();
        let template = evaluator.amplitude_template(&partition);
        TimeDependentCoupledCluster {
            system,
            evaluator,
            partition,
            template,
            trace_tolerance: 1e-6,
        }
    }

    pub fn with_trace_tolerance(mut self, tolerance: f64) -> Self {
        self.trace_tolerance = tolerance;
        self
    }

    pub fn template(&self) -> &AmplitudeTemplate {
        &self.template
    }

    fn unpack(&self, y: &Array1<Complex64>) -> Result<AmplitudeSet> {
        AmplitudeSet::delinearize(y.view(), &self.template)
    }

    /// `h(t)` and `u(t)` when time dependent, the static operators otherwise
    fn operators(&self, time: f64) -> (Option<Array2<Complex64>>, Option<Array4<Complex64>>) {
        (self.system.h_t(time), self.system.u_t(time))
    }

    /// Time-dependent energy functional at `time`
    pub fn compute_energy(&self, time: f64, y: &Array1<Complex64>) -> Result<Complex64> {
        let amplitudes = self.unpack(y)?;
        let (h_t, u_t) = self.operators(time);
        let h = h_t.as_ref().unwrap_or(self.system.h());
        let u = u_t.as_ref().unwrap_or(self.system.u());
        let f = self.system.construct_fock_matrix(h, u);
        self.evaluator.compute_lagrangian_energy(
            &f,
            u,
            amplitudes.t_amplitudes(),
            amplitudes.l(),
            &self.partition,
        )
    }

    /// `rho[q, p] = <c_p^dagger c_q>`, warning when its trace drifts from `n`
    pub fn compute_one_body_density_matrix(
        &self,
        time: f64,
        y: &Array1<Complex64>,
    ) -> Result<Array2<Complex64>> {
        let amplitudes = self.unpack(y)?;
        let rho = self.evaluator.one_body_density(
            amplitudes.t_amplitudes(),
            amplitudes.l(),
            &self.partition,
        )?;
        check_trace(&rho, self.partition.n(), self.trace_tolerance, time);
        Ok(rho)
    }

    pub fn compute_two_body_density_matrix(&self, y: &Array1<Complex64>) -> Result<Array4<Complex64>> {
        let amplitudes = self.unpack(y)?;
        self.evaluator
            .two_body_density(amplitudes.t_amplitudes(), amplitudes.l(), &self.partition)
    }

    /// `sum_pq A[p, q] rho[q, p]`
    pub fn compute_one_body_expectation_value(
        &self,
        y: &Array1<Complex64>,
        operator: &Array2<Complex64>,
    ) -> Result<Complex64> {
        let amplitudes = self.unpack(y)?;
        let rho = self.evaluator.one_body_density(
            amplitudes.t_amplitudes(),
            amplitudes.l(),
            &self.partition,
        )?;
        Ok(operator.dot(&rho).diag().iter().sum())
    }

    /// `<Psi_tilde(a)|Psi(b)>`
    pub fn compute_overlap(&self, y_a: &Array1<Complex64>, y_b: &Array1<Complex64>) -> Result<Complex64> {
        let a = self.unpack(y_a)?;
        let b = self.unpack(y_b)?;
        self.evaluator.compute_overlap(&a, &b)
    }

    /// `Re(<Psi_tilde(0)|Psi(t)> <Psi_tilde(t)|Psi(0)>)`
    pub fn compute_time_evolution_probability(
        &self,
        y: &Array1<Complex64>,
        y_0: &Array1<Complex64>,
    ) -> Result<f64> {
        let forward = self.compute_overlap(y_0, y)?;
        let backward = self.compute_overlap(y, y_0)?;
        Ok((forward * backward).re)
    }

    pub fn left_reference_overlap(&self, y: &Array1<Complex64>) -> Result<Complex64> {
        let amplitudes = self.unpack(y)?;
        self.evaluator.left_reference_overlap(&amplitudes)
    }

    /// Propagate `initial` by `steps` steps of size `dt`
    pub fn evolve(
        &mut self,
        initial: &AmplitudeSet,
        t_start: f64,
        dt: f64,
        steps: usize,
        integrator: &dyn Integrator,
        observer: &mut impl Observer<StepEvent>,
    ) -> Result<Trajectory> {
        let y_0 = initial.linearize();
        self.unpack(&y_0)?;
        evolve(self, integrator, y_0, t_start, dt, steps, observer)
    }
}

impl<'a, S: QuantumSystem, E: ResidualEvaluator> RightHandSide for TimeDependentCoupledCluster<'a, S, E> {
    fn evaluate(&mut self, time: f64, y: &Array1<Complex64>) -> Result<Array1<Complex64>> {
        let amplitudes = self.unpack(y)?;
        let (h_t, u_t) = self.operators(time);
        let h = h_t.as_ref().unwrap_or(self.system.h());
        let u = u_t.as_ref().unwrap_or(self.system.u());
        let f = self.system.construct_fock_matrix(h, u);

        let (dt, dl) = amplitude_derivatives(&self.evaluator, &f, u, &amplitudes, &self.partition)?;
        Ok(AmplitudeSet::new(dt, dl)?.linearize())
    }
}
