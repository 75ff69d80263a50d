use super::q_space::{compute_q_space_bra_equations, compute_q_space_ket_equations, QSpaceInput};
use super::regularize::{regularized_inverse, Regularization};
use crate::amplitudes_impl::{AmplitudeSet, AmplitudeTemplate};
use crate::error::{CoupledClusterError, Result};
use crate::integrator_impl::{evolve, Integrator, RightHandSide, StepEvent, Trajectory};
use crate::observe::Observer;
use crate::residual::OrbitalAdaptiveEvaluator;
use crate::system_impl::{OrbitalPartition, QuantumSystem};
use crate::tdcc_impl::{amplitude_derivatives, check_trace};
use ndarray::{Array1, Array2, Array4};
use num_complex::Complex64;
use std::borrow::Cow;

/// Operators of the current step in the rotated basis
///
/// `h` and `u` borrow the system's tensors unless a field makes them time
/// dependent.
struct RotatedOperators<'s> {
    h: Cow<'s, Array2<Complex64>>,
    u: Cow<'s, Array4<Complex64>>,
    h_prime: Array2<Complex64>,
    u_prime: Array4<Complex64>,
    f_prime: Array2<Complex64>,
}

/// Orbital-adaptive equations of motion
///
/// The state carries the amplitudes together with the orbital matrices `C`
/// (`l x l'`) and `C_tilde` (`l' x l`) spanning a working space of `l'`
/// orbitals, of which the first `n` are occupied.
pub struct OrbitalAdaptiveStepper<'a, S: QuantumSystem, E: OrbitalAdaptiveEvaluator> {
    system: &'a S,
    evaluator: E,
    partition: OrbitalPartition,
    template: AmplitudeTemplate,
    regularization: Regularization,
    trace_tolerance: f64,
}

impl<'a, S: QuantumSystem, E: OrbitalAdaptiveEvaluator> OrbitalAdaptiveStepper<'a, S, E> {
    /// Stepper for a working space of `n_working` orbitals
    pub fn new(system: &'a S, evaluator: E, n_working: usize) -> Result<Self> {
        let n_basis = system.l();
        if n_working > n_basis {
            return Err(CoupledClusterError::InvalidWorkingSpace { n_working, n_basis });
        }
        let partition = OrbitalPartition::new(system.n(), n_working)?;
        let template = evaluator
            .amplitude_template(&partition)
            .with_orbitals(n_basis, n_working);

        Ok(OrbitalAdaptiveStepper {
            system,
            evaluator,
            partition,
            template,
            regularization: Regularization::default(),
            trace_tolerance: 1e-6,
        })
    }

    pub fn with_regularization(mut self, regularization: Regularization) -> Self {
        self.regularization = regularization;
        self
    }

    pub fn with_trace_tolerance(mut self, tolerance: f64) -> Self {
        self.trace_tolerance = tolerance;
        self
    }

    pub fn template(&self) -> &AmplitudeTemplate {
        &self.template
    }

    /// Working-space partition
    pub fn partition(&self) -> OrbitalPartition {
        self.partition
    }

    fn unpack(&self, y: &Array1<Complex64>) -> Result<AmplitudeSet> {
        AmplitudeSet::delinearize(y.view(), &self.template)
    }

    /// The occupied orbitals are the first `n` in both the full and the
    /// working basis, so the system's Fock construction applies to `h'`, `u'`.
    fn rotate(&self, time: f64, c: &Array2<Complex64>, c_tilde: &Array2<Complex64>) -> RotatedOperators<'a> {
        let h = match self.system.h_t(time) {
            Some(h) => Cow::Owned(h),
            None => Cow::Borrowed(self.system.h()),
        };
        let u = match self.system.u_t(time) {
            Some(u) => Cow::Owned(u),
            None => Cow::Borrowed(self.system.u()),
        };
        let h_prime = self.system.transform_one_body_elements(&h, c, c_tilde);
        let u_prime = self.system.transform_two_body_elements(&u, c, c_tilde);
        let f_prime = self.system.construct_fock_matrix(&h_prime, &u_prime);
        RotatedOperators {
            h,
            u,
            h_prime,
            u_prime,
            f_prime,
        }
    }

    /// Time-dependent energy functional in the rotated basis
    pub fn compute_energy(&self, time: f64, y: &Array1<Complex64>) -> Result<Complex64> {
        let state = self.unpack(y)?;
        let (c, c_tilde) = orbitals(&state)?;
        let operators = self.rotate(time, c, c_tilde);
        self.evaluator.compute_lagrangian_energy(
            &operators.f_prime,
            &operators.u_prime,
            state.t_amplitudes(),
            state.l(),
            &self.partition,
        )
    }

    /// One-body density in the working basis
    pub fn compute_one_body_density_matrix(&self, y: &Array1<Complex64>) -> Result<Array2<Complex64>> {
        let state = self.unpack(y)?;
        self.evaluator
            .one_body_density(state.t_amplitudes(), state.l(), &self.partition)
    }

    pub fn compute_two_body_density_matrix(&self, y: &Array1<Complex64>) -> Result<Array4<Complex64>> {
        let state = self.unpack(y)?;
        self.evaluator
            .two_body_density(state.t_amplitudes(), state.l(), &self.partition)
    }

    /// Propagate `initial`, which must carry orbital matrices of the working size
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

fn orbitals(state: &AmplitudeSet) -> Result<(&Array2<Complex64>, &Array2<Complex64>)> {
    state.orbitals().ok_or(CoupledClusterError::ShapeMismatch {
        context: "orbital matrices",
        expected: 1,
        found: 0,
    })
}

impl<'a, S: QuantumSystem, E: OrbitalAdaptiveEvaluator> RightHandSide for OrbitalAdaptiveStepper<'a, S, E> {
    fn evaluate(&mut self, time: f64, y: &Array1<Complex64>) -> Result<Array1<Complex64>> {
        let state = self.unpack(y)?;
        let (c, c_tilde) = orbitals(&state)?;
        let operators = self.rotate(time, c, c_tilde);

        let (dt, dl) = amplitude_derivatives(
            &self.evaluator,
            &operators.f_prime,
            &operators.u_prime,
            &state,
            &self.partition,
        )?;

        let rho = self
            .evaluator
            .one_body_density(state.t_amplitudes(), state.l(), &self.partition)?;
        check_trace(&rho, self.partition.n(), self.trace_tolerance, time);
        let rho2 = self
            .evaluator
            .two_body_density(state.t_amplitudes(), state.l(), &self.partition)?;

        let eta = self.evaluator.compute_p_space_equations(
            &operators.h_prime,
            &operators.u_prime,
            &rho,
            &rho2,
            &self.partition,
        )?;
        let rho_inv = regularized_inverse(&rho, &self.regularization, time)?;

        let input = QSpaceInput {
            c,
            c_tilde,
            eta: &eta,
            h: &operators.h,
            h_prime: &operators.h_prime,
            u: &operators.u,
            u_prime: &operators.u_prime,
            rho: &rho,
            rho_inv: &rho_inv,
            rho2: &rho2,
        };
        let (dc, dc_tilde) = rayon::join(
            || compute_q_space_ket_equations(&input),
            || compute_q_space_bra_equations(&input),
        );

        Ok(AmplitudeSet::new(dt, dl)?
            .with_orbitals(dc, dc_tilde)?
            .linearize())
    }
}
