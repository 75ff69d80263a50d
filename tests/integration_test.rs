//! End-to-end tests of the ground-state solve followed by time propagation
//!
//! All systems are seeded synthetic systems from `RandomSystemBuilder`.

use coupled_cluster::ccd_impl::CCD;
use coupled_cluster::config::load_config;
use coupled_cluster::ground_state_impl::{GroundStateSolver, SolverState};
use coupled_cluster::integrator_impl::{IntegratorKind, RungeKutta4, StepEvent};
use coupled_cluster::mixer_impl::MixerKind;
use coupled_cluster::oatdcc_impl::OrbitalAdaptiveStepper;
use coupled_cluster::observe::{Action, Status};
use coupled_cluster::system_impl::{GeneralSystem, LaserPulse, QuantumSystem, RandomSystemBuilder};
use coupled_cluster::tdcc_impl::TimeDependentCoupledCluster;
use coupled_cluster::AmplitudeSet;
use ndarray::Array2;
use num_complex::Complex64;
use std::path::PathBuf;

#[cfg(test)]
mod integration_tests {
    use super::*;

    /// Converged T and Lambda amplitudes
    fn ground_state(system: &GeneralSystem, tolerance: f64) -> AmplitudeSet {
        let mut solver = GroundStateSolver::new(system, CCD::new(), MixerKind::default()).unwrap();
        let outcome = solver
            .compute_ground_state_energy(tolerance, 200, 0.0)
            .unwrap();
        assert!(outcome.converged());
        let outcome = solver.compute_lambda_amplitudes(tolerance, 200, 0.0).unwrap();
        assert!(outcome.converged());
        solver.into_amplitudes()
    }

    /// Nearest-neighbour dipole coupling
    fn chain_dipole(l: usize) -> Array2<Complex64> {
        Array2::from_shape_fn((l, l), |(p, q)| {
            if p.abs_diff(q) == 1 {
                Complex64::new(0.1 * (p + q + 1) as f64, 0.0)
            } else {
                Complex64::new(0.0, 0.0)
            }
        })
    }

    #[test]
    fn test_ground_state_ten_virtuals() {
        let system = RandomSystemBuilder::new(2, 12).seed(42).build().unwrap();
        let mut solver =
            GroundStateSolver::new(&system, CCD::new(), MixerKind::default()).unwrap();
        let outcome = solver.compute_ground_state_energy(1e-4, 100, 0.1).unwrap();

        assert_eq!(outcome.status, SolverState::Converged);
        assert!(outcome.iterations <= 100);
        assert!(outcome.energy.re < solver.compute_reference_energy().re);
    }

    #[test]
    fn test_ground_state_four_virtuals_undamped() {
        let system = RandomSystemBuilder::new(2, 6)
            .seed(11)
            .coupling(0.08)
            .build()
            .unwrap();
        let mut solver =
            GroundStateSolver::new(&system, CCD::new(), MixerKind::default()).unwrap();
        let outcome = solver.compute_ground_state_energy(1e-6, 200, 0.0).unwrap();

        assert!(outcome.converged());
        assert!(outcome.iterations < 200);
        assert!(outcome.last_change < 1e-6);
    }

    #[test]
    fn test_phase_after_ground_state_solve() {
        let system = RandomSystemBuilder::new(2, 8).seed(5).build().unwrap();
        let amplitudes = ground_state(&system, 1e-8);
        assert!((amplitudes.t_0().exp().norm_sqr() - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_energy_conservation_from_ground_state() {
        let system = RandomSystemBuilder::new(2, 6).seed(13).build().unwrap();
        let initial = ground_state(&system, 1e-8);

        let mut tdcc = TimeDependentCoupledCluster::new(&system, CCD::new());
        let trajectory = tdcc
            .evolve(&initial, 0.0, 1e-2, 100, &RungeKutta4, &mut ())
            .unwrap();
        assert_eq!(trajectory.status, Status::Complete);
        assert_eq!(trajectory.states.len(), 101);

        let e_0 = tdcc.compute_energy(0.0, &trajectory.states[0]).unwrap();
        for (time, state) in trajectory.times.iter().zip(&trajectory.states) {
            let energy = tdcc.compute_energy(*time, state).unwrap();
            assert!((energy - e_0).norm() < 1e-8);
        }
    }

    #[test]
    fn test_orbital_adaptive_propagation_in_a_field() {
        let system = RandomSystemBuilder::new(2, 6)
            .seed(23)
            .build()
            .unwrap()
            .with_dipole_field(
                chain_dipole(6),
                Box::new(LaserPulse::new(0.0, 0.5, 2.0, 0.05)),
            )
            .unwrap();
        let amplitudes = ground_state(&system, 1e-8);
        let identity = Array2::<Complex64>::eye(system.l());
        let initial = amplitudes.with_orbitals(identity.clone(), identity).unwrap();

        let integrator = IntegratorKind::Gauss {
            stages: 2,
            tolerance: 1e-10,
            max_iterations: 100,
        }
        .build()
        .unwrap();
        let mut stepper = OrbitalAdaptiveStepper::new(&system, CCD::new(), system.l()).unwrap();
        let trajectory = stepper
            .evolve(&initial, 0.0, 1e-2, 20, integrator.as_ref(), &mut ())
            .unwrap();
        assert_eq!(trajectory.steps, 20);

        let n = Complex64::new(system.n() as f64, 0.0);
        for state in &trajectory.states {
            let rho = stepper.compute_one_body_density_matrix(state).unwrap();
            let trace: Complex64 = rho.diag().iter().sum();
            assert!((trace - n).norm() < 1e-6);
        }

        // the field has done work on the system
        let last = trajectory.last().unwrap();
        let e_0 = stepper.compute_energy(0.0, &trajectory.states[0]).unwrap();
        let e_end = stepper.compute_energy(0.2, last).unwrap();
        assert!((e_end - e_0).norm() > 1e-8);
    }

    #[test]
    fn test_observer_stops_propagation() {
        let system = RandomSystemBuilder::new(2, 6).seed(3).build().unwrap();
        let initial = ground_state(&system, 1e-8);
        let mut tdcc = TimeDependentCoupledCluster::new(&system, CCD::new());

        let mut seen = Vec::new();
        let mut observer = |event: &StepEvent| {
            seen.push(event.step);
            if event.step == 3 {
                Some(Action::StopEarly)
            } else {
                None
            }
        };
        let trajectory = tdcc
            .evolve(&initial, 0.0, 1e-2, 50, &RungeKutta4, &mut observer)
            .unwrap();

        assert_eq!(trajectory.status, Status::StoppedByObserver);
        assert_eq!(trajectory.steps, 3);
        assert_eq!(trajectory.states.len(), 4);
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn test_demo_configuration_loads() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("demos")
            .join("oatdccd.yaml");
        let config = load_config(&path).unwrap();
        assert!(config.mixer_kind().is_ok());
        assert!(config.integrator_kind().unwrap().build().is_ok());
        assert!(config.laser_pulse().unwrap().is_some());
        assert!(config.system().builder().build().is_ok());

        assert!(load_config(path.with_file_name("missing.yaml")).is_err());
    }
}
