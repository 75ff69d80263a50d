use crate::amplitudes_impl::{concatenate, split, AmplitudeSet};
use crate::error::{CoupledClusterError, Result};
use crate::mixer_impl::{ConvergenceMixer, MixerKind};
use crate::observe::{Action, Observer};
use crate::residual::{divide_into, ResidualEvaluator};
use crate::system_impl::{OrbitalPartition, QuantumSystem};
use ndarray::{Array1, Array2, Array4, ArrayD};
use num_complex::Complex64;
use tracing::{info, warn};

/// Progress of a fixed-point solve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverState {
    Init,
    Iterating,
    Converged,
    MaxIterExceeded,
}

/// Result of a T or Lambda solve
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    pub status: SolverState,
    /// An observer ended the solve; `status` is then `Iterating`
    pub stopped_early: bool,
    /// Ground-state energy for T, Lagrangian energy for Lambda
    pub energy: Complex64,
    pub iterations: usize,
    /// `|dE|` for T, maximum `|dl|` for Lambda
    pub last_change: f64,
    pub residual_norm: f64,
    pub theta: f64,
}

impl SolveOutcome {
    pub fn converged(&self) -> bool {
        self.status == SolverState::Converged
    }
}

/// Reported to an observer after every iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationEvent {
    pub iteration: usize,
    pub energy: Complex64,
    pub change: f64,
    pub residual_norm: f64,
}

/// Fixed-point solver for the ground-state T and Lambda amplitudes
pub struct GroundStateSolver<'a, S: QuantumSystem, E: ResidualEvaluator> {
    system: &'a S,
    evaluator: E,
    partition: OrbitalPartition,
    f: Array2<Complex64>,
    amplitudes: AmplitudeSet,
    d_t: Vec<ArrayD<Complex64>>,
    d_l: Vec<ArrayD<Complex64>>,
    t_step: Vec<ArrayD<Complex64>>,
    l_step: Vec<ArrayD<Complex64>>,
    t_mixer: Box<dyn ConvergenceMixer + Send>,
    l_mixer: Box<dyn ConvergenceMixer + Send>,
    trace_tolerance: f64,
}

impl<'a, S: QuantumSystem, E: ResidualEvaluator> GroundStateSolver<'a, S, E> {
    /// Build the Fock matrix, denominators and first-order initial guess
    pub fn new(system: &'a S, evaluator: E, mixer: MixerKind) -> Result<Self> {
        let partition = system.partition();
        let f = system.construct_fock_matrix(system.h(), system.u());
        let (d_t, d_l) = evaluator.energy_denominators(&f, &partition);
        let amplitudes = evaluator.initial_guess(&f, system.u(), &partition)?;
        let t_step = amplitudes.t_amplitudes().to_vec();
        let l_step = amplitudes.l().to_vec();

        Ok(GroundStateSolver {
            system,
            evaluator,
            partition,
            f,
            amplitudes,
            d_t,
            d_l,
            t_step,
            l_step,
            t_mixer: mixer.build(),
            l_mixer: mixer.build(),
            trace_tolerance: 1e-6,
        })
    }

    pub fn with_trace_tolerance(mut self, tolerance: f64) -> Self {
        self.trace_tolerance = tolerance;
        self
    }

    pub fn partition(&self) -> OrbitalPartition {
        self.partition
    }

    pub fn fock(&self) -> &Array2<Complex64> {
        &self.f
    }

    pub fn amplitudes(&self) -> &AmplitudeSet {
        &self.amplitudes
    }

    /// Hand the amplitudes over, e.g. as the initial state of a propagation
    pub fn into_amplitudes(self) -> AmplitudeSet {
        self.amplitudes
    }

    /// Solve `R_t(t) = 0` until `|dE| < tol`
    pub fn compute_ground_state_energy(
        &mut self,
        tol: f64,
        max_iterations: usize,
        theta: f64,
    ) -> Result<SolveOutcome> {
        self.compute_ground_state_energy_with(tol, max_iterations, theta, &mut ())
    }

    pub fn compute_ground_state_energy_with(
        &mut self,
        tol: f64,
        max_iterations: usize,
        theta: f64,
        observer: &mut impl Observer<IterationEvent>,
    ) -> Result<SolveOutcome> {
        validate_theta(theta)?;
        self.t_mixer.clear_vectors();

        info!("===========================================");
        info!("     Ground-State Amplitude Iterations");
        info!("===========================================");
        info!("Occupied orbitals: {}", self.partition.n());
        info!("Virtual orbitals: {}", self.partition.m());
        info!("Tolerance: {:.2e}, theta: {:.3}", tol, theta);
        log_header("|dE|");

        let mut energy = self.compute_energy()?;
        log_row(0, energy, f64::NAN);

        let mut outcome = SolveOutcome {
            status: SolverState::Init,
            stopped_early: false,
            energy,
            iterations: 0,
            last_change: f64::INFINITY,
            residual_norm: f64::INFINITY,
            theta,
        };

        for iteration in 1..=max_iterations {
            outcome.status = SolverState::Iterating;

            let u = self.system.u();
            let residual =
                self.evaluator
                    .compute_t_residual(&self.f, u, self.amplitudes.t_amplitudes(), &self.partition)?;
            for ((step, r), d) in self.t_step.iter_mut().zip(&residual).zip(&self.d_t) {
                divide_into(step, r, d);
            }

            let old = concatenate(self.amplitudes.t_amplitudes());
            let error = concatenate(&residual);
            let direction = &old + &concatenate(&self.t_step);
            let proposed = self.t_mixer.compute_new_vector(&old, &direction, &error);
            let new = damp(&proposed, &old, theta);

            let tensors = split(&new, self.amplitudes.t_amplitudes())?;
            for (target, tensor) in self.amplitudes.t_amplitudes_mut().iter_mut().zip(tensors) {
                *target = tensor;
            }

            let new_energy = self.compute_energy()?;
            let change = (new_energy - energy).norm();
            energy = new_energy;

            outcome.energy = energy;
            outcome.iterations = iteration;
            outcome.last_change = change;
            outcome.residual_norm = norm(&error);
            log_row(iteration, energy, change);

            let event = IterationEvent {
                iteration,
                energy,
                change,
                residual_norm: outcome.residual_norm,
            };
            let action = observer.observe(&event);

            if change < tol {
                outcome.status = SolverState::Converged;
                break;
            }
            if let Some(Action::StopEarly) = action {
                outcome.stopped_early = true;
                break;
            }
        }

        finish(&mut outcome, "Ground-state");
        Ok(outcome)
    }

    /// Solve `R_l(t, l) = 0` at fixed `t` until the largest `|dl|` is below `tol`
    pub fn compute_lambda_amplitudes(
        &mut self,
        tol: f64,
        max_iterations: usize,
        theta: f64,
    ) -> Result<SolveOutcome> {
        self.compute_lambda_amplitudes_with(tol, max_iterations, theta, &mut ())
    }

    pub fn compute_lambda_amplitudes_with(
        &mut self,
        tol: f64,
        max_iterations: usize,
        theta: f64,
        observer: &mut impl Observer<IterationEvent>,
    ) -> Result<SolveOutcome> {
        validate_theta(theta)?;
        self.l_mixer.clear_vectors();

        info!("===========================================");
        info!("     Lambda Amplitude Iterations");
        info!("===========================================");
        info!("Tolerance: {:.2e}, theta: {:.3}", tol, theta);
        log_header("max |dl|");

        let mut outcome = SolveOutcome {
            status: SolverState::Init,
            stopped_early: false,
            energy: self.compute_lagrangian_energy()?,
            iterations: 0,
            last_change: f64::INFINITY,
            residual_norm: f64::INFINITY,
            theta,
        };
        log_row(0, outcome.energy, f64::NAN);

        for iteration in 1..=max_iterations {
            outcome.status = SolverState::Iterating;

            let u = self.system.u();
            let residual = self.evaluator.compute_l_residual(
                &self.f,
                u,
                self.amplitudes.t_amplitudes(),
                self.amplitudes.l(),
                &self.partition,
            )?;
            for ((step, r), d) in self.l_step.iter_mut().zip(&residual).zip(&self.d_l) {
                divide_into(step, r, d);
            }

            let old = concatenate(self.amplitudes.l());
            let error = concatenate(&residual);
            let direction = &old + &concatenate(&self.l_step);
            let proposed = self.l_mixer.compute_new_vector(&old, &direction, &error);
            let new = damp(&proposed, &old, theta);

            let change = new
                .iter()
                .zip(old.iter())
                .map(|(x, y)| (x - y).norm())
                .fold(0.0, f64::max);

            let tensors = split(&new, self.amplitudes.l())?;
            for (target, tensor) in self.amplitudes.l_mut().iter_mut().zip(tensors) {
                *target = tensor;
            }

            outcome.energy = self.compute_lagrangian_energy()?;
            outcome.iterations = iteration;
            outcome.last_change = change;
            outcome.residual_norm = norm(&error);
            log_row(iteration, outcome.energy, change);

            let event = IterationEvent {
                iteration,
                energy: outcome.energy,
                change,
                residual_norm: outcome.residual_norm,
            };
            let action = observer.observe(&event);

            if change < tol {
                outcome.status = SolverState::Converged;
                break;
            }
            if let Some(Action::StopEarly) = action {
                outcome.stopped_early = true;
                break;
            }
        }

        finish(&mut outcome, "Lambda");
        Ok(outcome)
    }

    /// `sum_i h_ii + 1/2 sum_ij u_ijij`
    pub fn compute_reference_energy(&self) -> Complex64 {
        self.evaluator
            .compute_reference_energy(&self.f, self.system.u(), &self.partition)
    }

    /// Reference plus correlation energy
    pub fn compute_energy(&self) -> Result<Complex64> {
        self.evaluator.compute_energy(
            &self.f,
            self.system.u(),
            self.amplitudes.t_amplitudes(),
            &self.partition,
        )
    }

    pub fn compute_lagrangian_energy(&self) -> Result<Complex64> {
        self.evaluator.compute_lagrangian_energy(
            &self.f,
            self.system.u(),
            self.amplitudes.t_amplitudes(),
            self.amplitudes.l(),
            &self.partition,
        )
    }

    pub fn compute_one_body_density(&self) -> Result<Array2<Complex64>> {
        let rho = self.evaluator.one_body_density(
            self.amplitudes.t_amplitudes(),
            self.amplitudes.l(),
            &self.partition,
        )?;
        let trace: Complex64 = rho.diag().iter().sum();
        let n = self.partition.n() as f64;
        if (trace - n).norm() > self.trace_tolerance {
            warn!(
                "Trace of the one-body density is {:.8} (expected {})",
                trace, n
            );
        }
        Ok(rho)
    }

    pub fn compute_two_body_density(&self) -> Result<Array4<Complex64>> {
        self.evaluator.two_body_density(
            self.amplitudes.t_amplitudes(),
            self.amplitudes.l(),
            &self.partition,
        )
    }
}

fn validate_theta(theta: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&theta) {
        return Err(CoupledClusterError::InvalidMixingParameter { theta });
    }
    Ok(())
}

/// `(1 - theta) * proposed + theta * old`
fn damp(proposed: &Array1<Complex64>, old: &Array1<Complex64>, theta: f64) -> Array1<Complex64> {
    proposed * Complex64::new(1.0 - theta, 0.0) + old * Complex64::new(theta, 0.0)
}

fn norm(x: &Array1<Complex64>) -> f64 {
    x.iter().map(|v| v.norm_sqr()).sum::<f64>().sqrt()
}

fn log_header(change: &str) {
    info!(
        "{:>5} {:>18} {:>18} {:>15}",
        "Iter", "Re(E)", "Im(E)", change
    );
}

fn log_row(iteration: usize, energy: Complex64, change: f64) {
    info!(
        "{:>5} {:>18.10} {:>18.10} {:>15.6e}",
        iteration, energy.re, energy.im, change
    );
}

fn finish(outcome: &mut SolveOutcome, label: &str) {
    match outcome.status {
        SolverState::Converged => {
            info!("{} iterations converged after {} iterations", label, outcome.iterations);
        }
        _ if outcome.stopped_early => {
            info!("{} iterations stopped by observer after {} iterations", label, outcome.iterations);
        }
        _ => {
            outcome.status = SolverState::MaxIterExceeded;
            warn!(
                "{} iterations reached the maximum of {} without converging (last change {:.3e})",
                label, outcome.iterations, outcome.last_change
            );
        }
    }
    info!("Final energy: {:.10} {:+.10}i", outcome.energy.re, outcome.energy.im);
    info!("-------------------------------------------");
}
