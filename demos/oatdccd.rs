//! Ground-state CCD followed by orbital-adaptive propagation in a laser pulse
//!
//! ```text
//! cargo run --release --example oatdccd
//! ```
//!
//! Parameters are read from `demos/oatdccd.yaml`.

use color_eyre::eyre::{Result, WrapErr};
use coupled_cluster::ccd_impl::CCD;
use coupled_cluster::config::{load_config, Config};
use coupled_cluster::ground_state_impl::{GroundStateSolver, IterationEvent};
use coupled_cluster::integrator_impl::{StepEvent, Trajectory};
use coupled_cluster::io::setup_output;
use coupled_cluster::oatdcc_impl::OrbitalAdaptiveStepper;
use coupled_cluster::observe::Action;
use coupled_cluster::system_impl::{transform_one_body_elements, GeneralSystem, QuantumSystem};
use coupled_cluster::tdcc_impl::TimeDependentCoupledCluster;
use coupled_cluster::AmplitudeSet;
use ndarray::{s, Array2};
use num_complex::Complex64;
use std::path::PathBuf;
use tracing::{info, warn};

/// Number of time points between two rows of the observable table
const REPORT_EVERY: usize = 10;

fn main() -> Result<()> {
    color_eyre::install()?;

    setup_output(None);

    let config_file = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join("oatdccd.yaml");
    info!("Reading configuration from: {}", config_file.display());
    let config = load_config(&config_file)?;
    info!("Configuration loaded:\n{:?}", config);

    let system = build_system(&config)?;
    let n_working = config
        .orbital_adaptive()
        .n_working
        .unwrap_or_else(|| system.l());

    // ground state in the working space spanned by the first n_working orbitals
    let working = working_space_system(&system, n_working)?;
    let initial = solve_ground_state(&config, &working)?;

    let propagation = config.propagation();
    let integrator = config.integrator_kind()?.build()?;
    let mut progress = |event: &StepEvent| -> Option<Action> {
        if event.step % (REPORT_EVERY * 10) == 0 {
            info!("Reached step {} (t = {:.4})", event.step, event.time);
        }
        None
    };

    if config.is_orbital_adaptive_enabled() {
        let orbital_adaptive = config.orbital_adaptive();
        let mut stepper = OrbitalAdaptiveStepper::new(&system, CCD::new(), n_working)?
            .with_regularization(orbital_adaptive.regularization())
            .with_trace_tolerance(orbital_adaptive.trace_tolerance());

        let identity = Array2::<Complex64>::eye(system.l());
        let c = identity.slice(s![.., ..n_working]).to_owned();
        let c_tilde = c.t().to_owned();
        let initial = initial.with_orbitals(c, c_tilde)?;

        let trajectory = stepper.evolve(
            &initial,
            propagation.t_start(),
            propagation.time_step(),
            propagation.num_steps(),
            integrator.as_ref(),
            &mut progress,
        )?;
        report_orbital_adaptive(&system, &stepper, &trajectory)?;
    } else {
        if n_working < system.l() {
            return Err(color_eyre::eyre::eyre!(
                "A truncated working space ({} of {} orbitals) requires orbital-adaptive propagation",
                n_working,
                system.l()
            ));
        }
        let mut tdcc = TimeDependentCoupledCluster::new(&system, CCD::new())
            .with_trace_tolerance(config.orbital_adaptive().trace_tolerance());
        let trajectory = tdcc.evolve(
            &initial,
            propagation.t_start(),
            propagation.time_step(),
            propagation.num_steps(),
            integrator.as_ref(),
            &mut progress,
        )?;
        report_fixed_basis(&system, &tdcc, &trajectory)?;
    }

    info!("Propagation finished with {}", integrator.name());
    Ok(())
}

/// Synthetic system, coupled to the configured laser pulse through a chain dipole
fn build_system(config: &Config) -> Result<GeneralSystem> {
    let system = config
        .system()
        .builder()
        .build()
        .wrap_err("Failed to build the model system")?;

    match config.laser_pulse()? {
        Some(pulse) => {
            info!(
                "Laser pulse: E0 = {}, omega = {}, duration = {}, start = {}",
                pulse.strength, pulse.omega, pulse.td, pulse.t0
            );
            let dipole = chain_dipole(system.l());
            Ok(system.with_dipole_field(dipole, Box::new(pulse))?)
        }
        None => Ok(system),
    }
}

/// Nearest-neighbour position-like operator
fn chain_dipole(l: usize) -> Array2<Complex64> {
    Array2::from_shape_fn((l, l), |(p, q)| {
        if p.abs_diff(q) == 1 {
            Complex64::new(0.5 * ((p + q + 1) as f64).sqrt(), 0.0)
        } else {
            Complex64::new(0.0, 0.0)
        }
    })
}

/// The system restricted to its first `n_working` orbitals
fn working_space_system(system: &GeneralSystem, n_working: usize) -> Result<GeneralSystem> {
    let h = system.h().slice(s![..n_working, ..n_working]).to_owned();
    let u = system
        .u()
        .slice(s![..n_working, ..n_working, ..n_working, ..n_working])
        .to_owned();
    GeneralSystem::new(system.n(), h, u).wrap_err("Working space does not fit the system")
}

fn solve_ground_state(config: &Config, system: &GeneralSystem) -> Result<AmplitudeSet> {
    let mut solver = GroundStateSolver::new(system, CCD::new(), config.mixer_kind()?)?;
    info!("Reference energy: {:.10}", solver.compute_reference_energy().re);

    let ground_state = config.ground_state();
    let mut trace = |event: &IterationEvent| -> Option<Action> {
        if event.residual_norm.is_nan() {
            warn!("Residual diverged at iteration {}", event.iteration);
        }
        None
    };
    let outcome = solver.compute_ground_state_energy_with(
        ground_state.tolerance(),
        ground_state.max_iterations(),
        ground_state.theta(),
        &mut trace,
    )?;
    if !outcome.converged() {
        warn!(
            "Continuing from an unconverged ground state (change {:.3e})",
            outcome.last_change
        );
    }

    let lambda = config.lambda();
    let outcome = solver.compute_lambda_amplitudes(
        lambda.tolerance(),
        lambda.max_iterations(),
        lambda.theta(),
    )?;
    if !outcome.converged() {
        warn!(
            "Continuing from unconverged Lambda amplitudes (change {:.3e})",
            outcome.last_change
        );
    }

    info!("Ground-state energy: {:.10}", solver.compute_energy()?.re);
    info!("Lagrangian energy:   {:.10}", solver.compute_lagrangian_energy()?.re);
    Ok(solver.into_amplitudes())
}

fn report_orbital_adaptive<E: coupled_cluster::OrbitalAdaptiveEvaluator>(
    system: &GeneralSystem,
    stepper: &OrbitalAdaptiveStepper<'_, GeneralSystem, E>,
    trajectory: &Trajectory,
) -> Result<()> {
    info!("{:>10} {:>18} {:>18} {:>18}", "Time", "Re(E)", "Im(E)", "<d>");
    for (time, y) in trajectory
        .times
        .iter()
        .zip(&trajectory.states)
        .step_by(REPORT_EVERY)
    {
        let energy = stepper.compute_energy(*time, y)?;
        let dipole = match system.dipole() {
            Some(d) => {
                let state = AmplitudeSet::delinearize(y.view(), stepper.template())?;
                let rho = stepper.compute_one_body_density_matrix(y)?;
                match state.orbitals() {
                    Some((c, c_tilde)) => {
                        let d_prime = transform_one_body_elements(d, c, c_tilde);
                        d_prime.dot(&rho).diag().iter().sum::<Complex64>().re
                    }
                    None => 0.0,
                }
            }
            None => 0.0,
        };
        info!(
            "{:>10.4} {:>18.10} {:>18.3e} {:>18.10}",
            time, energy.re, energy.im, dipole
        );
    }
    Ok(())
}

fn report_fixed_basis<E: coupled_cluster::ResidualEvaluator>(
    system: &GeneralSystem,
    tdcc: &TimeDependentCoupledCluster<'_, GeneralSystem, E>,
    trajectory: &Trajectory,
) -> Result<()> {
    let y_0 = &trajectory.states[0];
    info!(
        "{:>10} {:>18} {:>18} {:>18}",
        "Time", "Re(E)", "<d>", "P(t)"
    );
    for (time, y) in trajectory
        .times
        .iter()
        .zip(&trajectory.states)
        .step_by(REPORT_EVERY)
    {
        let energy = tdcc.compute_energy(*time, y)?;
        let dipole = match system.dipole() {
            Some(d) => tdcc.compute_one_body_expectation_value(y, d)?.re,
            None => 0.0,
        };
        let probability = tdcc.compute_time_evolution_probability(y, y_0)?;
        info!(
            "{:>10.4} {:>18.10} {:>18.10} {:>18.10}",
            time, energy.re, dipole, probability
        );
    }
    Ok(())
}
