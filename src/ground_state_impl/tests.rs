//! Tests for the ground-state solver

#[cfg(test)]
mod tests {
    use super::super::{GroundStateSolver, IterationEvent, SolverState};
    use crate::ccd_impl::CCD;
    use crate::error::CoupledClusterError;
    use crate::mixer_impl::MixerKind;
    use crate::observe::Action;
    use crate::residual::ResidualEvaluator;
    use crate::system_impl::{GeneralSystem, QuantumSystem, RandomSystemBuilder};
    use num_complex::Complex64;

    fn small_system() -> GeneralSystem {
        RandomSystemBuilder::new(2, 6).seed(7).build().unwrap()
    }

    fn max_abs(tensors: &[ndarray::ArrayD<Complex64>]) -> f64 {
        tensors
            .iter()
            .flat_map(|x| x.iter())
            .map(|x| x.norm())
            .fold(0.0, f64::max)
    }

    #[test]
    fn test_theta_outside_unit_interval_fails() {
        let system = small_system();
        let mut solver = GroundStateSolver::new(&system, CCD::new(), MixerKind::default()).unwrap();
        for theta in [-0.1, 1.5, f64::NAN] {
            let result = solver.compute_ground_state_energy(1e-6, 10, theta);
            assert!(matches!(
                result,
                Err(CoupledClusterError::InvalidMixingParameter { .. })
            ));
        }
        let result = solver.compute_lambda_amplitudes(1e-6, 10, 2.0);
        assert!(result.is_err());
    }

    #[test]
    fn test_ground_state_converges_with_diis() {
        let system = small_system();
        let mut solver = GroundStateSolver::new(&system, CCD::new(), MixerKind::default()).unwrap();
        let outcome = solver.compute_ground_state_energy(1e-6, 200, 0.0).unwrap();

        assert_eq!(outcome.status, SolverState::Converged);
        assert!(outcome.iterations < 200);
        assert!(outcome.last_change < 1e-6);
        assert_eq!(outcome.theta, 0.0);

        let residual = CCD
            .compute_t_residual(
                solver.fock(),
                system.u(),
                solver.amplitudes().t_amplitudes(),
                &system.partition(),
            )
            .unwrap();
        assert!(max_abs(&residual) < 1e-4);

        let energy = solver.compute_energy().unwrap();
        assert!((energy - outcome.energy).norm() < 1e-12);
        assert!(energy.re < solver.compute_reference_energy().re);
    }

    #[test]
    fn test_alpha_and_diis_agree() {
        let system = small_system();
        let mut plain = GroundStateSolver::new(&system, CCD::new(), MixerKind::Alpha).unwrap();
        let mut accelerated =
            GroundStateSolver::new(&system, CCD::new(), MixerKind::default()).unwrap();
        let a = plain.compute_ground_state_energy(1e-10, 200, 0.1).unwrap();
        let b = accelerated.compute_ground_state_energy(1e-10, 200, 0.1).unwrap();
        assert!(a.converged() && b.converged());
        assert!((a.energy - b.energy).norm() < 1e-8);
    }

    #[test]
    fn test_lambda_converges_and_keeps_phase() {
        let system = small_system();
        let mut solver = GroundStateSolver::new(&system, CCD::new(), MixerKind::default()).unwrap();
        solver.compute_ground_state_energy(1e-10, 200, 0.0).unwrap();
        let outcome = solver.compute_lambda_amplitudes(1e-10, 200, 0.0).unwrap();
        assert!(outcome.converged());

        let residual = CCD
            .compute_l_residual(
                solver.fock(),
                system.u(),
                solver.amplitudes().t_amplitudes(),
                solver.amplitudes().l(),
                &system.partition(),
            )
            .unwrap();
        assert!(max_abs(&residual) < 1e-8);

        // At R_t = 0 the Lagrangian reduces to the ground-state energy
        let lagrangian = solver.compute_lagrangian_energy().unwrap();
        let energy = solver.compute_energy().unwrap();
        assert!((lagrangian - energy).norm() < 1e-8);

        let phase = solver.amplitudes().t_0().exp();
        assert!((phase.norm_sqr() - 1.0).abs() < 1e-14);

        let rho = solver.compute_one_body_density().unwrap();
        let trace: Complex64 = rho.diag().iter().sum();
        assert!((trace - Complex64::new(2.0, 0.0)).norm() < 1e-10);
    }

    #[test]
    fn test_iteration_cap_is_not_an_error() {
        let system = small_system();
        let mut solver = GroundStateSolver::new(&system, CCD::new(), MixerKind::default()).unwrap();
        let outcome = solver.compute_ground_state_energy(0.0, 2, 0.0).unwrap();
        assert_eq!(outcome.status, SolverState::MaxIterExceeded);
        assert_eq!(outcome.iterations, 2);
        assert!(!outcome.stopped_early);
        assert!(outcome.residual_norm.is_finite());
    }

    #[test]
    fn test_observer_stops_solve() {
        let system = small_system();
        let mut solver = GroundStateSolver::new(&system, CCD::new(), MixerKind::default()).unwrap();
        let mut seen = Vec::new();
        let mut observer = |event: &IterationEvent| {
            seen.push(event.iteration);
            if event.iteration == 2 {
                Some(Action::StopEarly)
            } else {
                None
            }
        };
        let outcome = solver
            .compute_ground_state_energy_with(0.0, 50, 0.0, &mut observer)
            .unwrap();
        assert!(outcome.stopped_early);
        assert_eq!(outcome.status, SolverState::Iterating);
        assert_eq!(outcome.iterations, 2);
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn test_observer_sees_converging_iteration() {
        let system = small_system();
        let mut solver = GroundStateSolver::new(&system, CCD::new(), MixerKind::default()).unwrap();
        let mut seen = Vec::new();
        let mut observer = |event: &IterationEvent| -> Option<Action> {
            seen.push((event.iteration, event.change));
            None
        };
        let outcome = solver
            .compute_ground_state_energy_with(1e-6, 200, 0.0, &mut observer)
            .unwrap();
        assert!(outcome.converged());
        assert_eq!(seen.len(), outcome.iterations);
        let (last_iteration, last_change) = seen[seen.len() - 1];
        assert_eq!(last_iteration, outcome.iterations);
        assert!(last_change < 1e-6);

        let mut lambda_seen = 0;
        let mut lambda_observer = |_: &IterationEvent| -> Option<Action> {
            lambda_seen += 1;
            None
        };
        let outcome = solver
            .compute_lambda_amplitudes_with(1e-6, 200, 0.0, &mut lambda_observer)
            .unwrap();
        assert!(outcome.converged());
        assert_eq!(lambda_seen, outcome.iterations);
    }

    #[test]
    fn test_into_amplitudes_transfers_solution() {
        let system = small_system();
        let mut solver = GroundStateSolver::new(&system, CCD::new(), MixerKind::default()).unwrap();
        solver.compute_ground_state_energy(1e-8, 100, 0.0).unwrap();
        let expected = solver.amplitudes().clone();
        let amplitudes = solver.into_amplitudes();
        assert_eq!(amplitudes, expected);
    }
}
