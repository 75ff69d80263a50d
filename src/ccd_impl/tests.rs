//! Tests for the doubles flavor

#[cfg(test)]
mod tests {
    use super::super::CCD;
    use crate::amplitudes_impl::AmplitudeSet;
    use crate::error::CoupledClusterError;
    use crate::linalg::antisymmetrize_both;
    use crate::residual::{OrbitalAdaptiveEvaluator, ResidualEvaluator};
    use crate::system_impl::{GeneralSystem, QuantumSystem, RandomSystemBuilder};
    use ndarray::{Array2, Array4, ArrayD, Ix4};
    use num_complex::Complex64;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};

    fn random_doubles(shape: (usize, usize, usize, usize), seed: u64, scale: f64) -> Array4<Complex64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let dist = Normal::new(0.0, scale).unwrap();
        let x = Array4::from_shape_fn(shape, |_| {
            Complex64::new(dist.sample(&mut rng), dist.sample(&mut rng))
        });
        antisymmetrize_both(&x, (0, 1), (2, 3))
    }

    struct Fixture {
        system: GeneralSystem,
        f: Array2<Complex64>,
        t: Vec<ArrayD<Complex64>>,
        l: Vec<ArrayD<Complex64>>,
    }

    fn fixture(n: usize, l_basis: usize) -> Fixture {
        let system = RandomSystemBuilder::new(n, l_basis).seed(17).build().unwrap();
        let f = system.construct_fock_matrix(system.h(), system.u());
        let m = l_basis - n;
        let t = vec![random_doubles((m, m, n, n), 1, 0.05).into_dyn()];
        let l = vec![random_doubles((n, n, m, m), 2, 0.05).into_dyn()];
        Fixture { system, f, t, l }
    }

    fn contract_ijab_abij(x: &ArrayD<Complex64>, y: &ArrayD<Complex64>) -> Complex64 {
        let x = x.view().into_dimensionality::<Ix4>().unwrap();
        let y = y.view().into_dimensionality::<Ix4>().unwrap();
        let mut sum = Complex64::new(0.0, 0.0);
        for ((i, j, a, b), value) in x.indexed_iter() {
            sum += value * y[[a, b, i, j]];
        }
        sum
    }

    #[test]
    fn test_residual_at_zero_amplitudes_is_two_body_block() {
        let fx = fixture(2, 5);
        let partition = fx.system.partition();
        let zeros = CCD.amplitude_template(&partition).zeros();
        let residual = CCD
            .compute_t_residual(&fx.f, fx.system.u(), zeros.t_amplitudes(), &partition)
            .unwrap();
        let r = residual[0].view().into_dimensionality::<Ix4>().unwrap();
        for ((a, b, i, j), value) in r.indexed_iter() {
            assert_eq!(*value, fx.system.u()[[2 + a, 2 + b, i, j]]);
        }
    }

    #[test]
    fn test_t_residual_is_antisymmetric() {
        let fx = fixture(3, 7);
        let partition = fx.system.partition();
        let residual = CCD
            .compute_t_residual(&fx.f, fx.system.u(), &fx.t, &partition)
            .unwrap();
        let r = residual[0].view().into_dimensionality::<Ix4>().unwrap();
        for ((a, b, i, j), value) in r.indexed_iter() {
            assert!((value + r[[b, a, i, j]]).norm() < 1e-13);
            assert!((value + r[[a, b, j, i]]).norm() < 1e-13);
        }
    }

    #[test]
    fn test_initial_guess_energy_is_second_order() {
        let fx = fixture(2, 6);
        let partition = fx.system.partition();
        let u = fx.system.u();
        let guess = CCD.initial_guess(&fx.f, u, &partition).unwrap();
        let correlation = CCD
            .compute_correlation_energy(&fx.f, u, guess.t_amplitudes(), &partition)
            .unwrap();

        let n = 2;
        let mut expected = Complex64::new(0.0, 0.0);
        for i in 0..n {
            for j in 0..n {
                for a in n..6 {
                    for b in n..6 {
                        let d = fx.f[[i, i]] + fx.f[[j, j]] - fx.f[[a, a]] - fx.f[[b, b]];
                        expected += 0.25 * u[[i, j, a, b]] * u[[a, b, i, j]] / d;
                    }
                }
            }
        }
        assert!((correlation - expected).norm() < 1e-12);
        assert_eq!(guess.t_0(), Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_lambda_residual_is_energy_derivative() {
        let fx = fixture(2, 6);
        let partition = fx.system.partition();
        let u = fx.system.u();
        let m = partition.m();
        let direction = random_doubles((m, m, 2, 2), 3, 1.0).into_dyn();

        let lagrangian = |t: &ArrayD<Complex64>| {
            CCD.compute_lagrangian_energy(&fx.f, u, &[t.clone()], &fx.l, &partition)
                .unwrap()
        };
        let step = 1e-3;
        let plus = &fx.t[0] + &(&direction * Complex64::new(step, 0.0));
        let minus = &fx.t[0] - &(&direction * Complex64::new(step, 0.0));
        let numerical = (lagrangian(&plus) - lagrangian(&minus)) / (2.0 * step);

        let residual = CCD
            .compute_l_residual(&fx.f, u, &fx.t, &fx.l, &partition)
            .unwrap();
        let analytical = 0.25 * contract_ijab_abij(&residual[0], &direction);

        assert!(
            (numerical - analytical).norm() < 1e-8,
            "numerical {} analytical {}",
            numerical,
            analytical
        );
    }

    #[test]
    fn test_one_body_density_trace() {
        let fx = fixture(3, 7);
        let partition = fx.system.partition();
        let rho = CCD.one_body_density(&fx.t, &fx.l, &partition).unwrap();
        let trace: Complex64 = rho.diag().iter().sum();
        assert!((trace - Complex64::new(3.0, 0.0)).norm() < 1e-12);

        for i in 0..3 {
            for a in 3..7 {
                assert_eq!(rho[[i, a]], Complex64::new(0.0, 0.0));
                assert_eq!(rho[[a, i]], Complex64::new(0.0, 0.0));
            }
        }
    }

    #[test]
    fn test_densities_reproduce_energy() {
        let fx = fixture(2, 6);
        let partition = fx.system.partition();
        let h = fx.system.h();
        let u = fx.system.u();

        let rho = CCD.one_body_density(&fx.t, &fx.l, &partition).unwrap();
        let rho2 = CCD.two_body_density(&fx.t, &fx.l, &partition).unwrap();

        let one_body: Complex64 = h.dot(&rho).diag().iter().sum();
        let mut two_body = Complex64::new(0.0, 0.0);
        for ((p, r, q, s), value) in u.indexed_iter() {
            two_body += value * rho2[[q, s, p, r]];
        }
        let from_densities = one_body + 0.25 * two_body;

        let lagrangian = CCD
            .compute_lagrangian_energy(&fx.f, u, &fx.t, &fx.l, &partition)
            .unwrap();
        assert!(
            (from_densities - lagrangian).norm() < 1e-10,
            "densities {} functional {}",
            from_densities,
            lagrangian
        );
    }

    #[test]
    fn test_two_body_density_is_antisymmetric() {
        let fx = fixture(2, 5);
        let partition = fx.system.partition();
        let rho2 = CCD.two_body_density(&fx.t, &fx.l, &partition).unwrap();
        for ((q, s, p, r), value) in rho2.indexed_iter() {
            assert!((value + rho2[[s, q, p, r]]).norm() < 1e-13);
            assert!((value + rho2[[q, s, r, p]]).norm() < 1e-13);
        }
    }

    #[test]
    fn test_overlap_with_itself_is_one() {
        let fx = fixture(2, 5);
        let state = AmplitudeSet::new(
            vec![
                ArrayD::from_elem(ndarray::IxDyn(&[1]), Complex64::new(0.1, -0.4)),
                fx.t[0].clone(),
            ],
            fx.l.clone(),
        )
        .unwrap();
        let overlap = CCD.compute_overlap(&state, &state).unwrap();
        assert!((overlap - Complex64::new(1.0, 0.0)).norm() < 1e-14);

        let reference = CCD.left_reference_overlap(&state).unwrap();
        let expected = Complex64::new(1.0, 0.0) - 0.25 * contract_ijab_abij(&fx.l[0], &fx.t[0]);
        assert!((reference - expected).norm() < 1e-14);
    }

    #[test]
    fn test_p_space_reduces_to_mean_field_limit() {
        let fx = fixture(2, 6);
        let partition = fx.system.partition();
        let zeros = CCD.amplitude_template(&partition).zeros();
        let rho = CCD
            .one_body_density(zeros.t_amplitudes(), zeros.l(), &partition)
            .unwrap();
        let rho2 = CCD
            .two_body_density(zeros.t_amplitudes(), zeros.l(), &partition)
            .unwrap();
        let eta = CCD
            .compute_p_space_equations(fx.system.h(), fx.system.u(), &rho, &rho2, &partition)
            .unwrap();

        let minus_i = Complex64::new(0.0, -1.0);
        for i in 0..2 {
            for a in 2..6 {
                assert!((eta[[i, a]] - minus_i * fx.f[[i, a]]).norm() < 1e-12);
                assert!((eta[[a, i]] - minus_i * fx.f[[a, i]]).norm() < 1e-12);
            }
        }
    }

    #[test]
    fn test_p_space_gauge_blocks_vanish() {
        let fx = fixture(2, 6);
        let partition = fx.system.partition();
        let rho = CCD.one_body_density(&fx.t, &fx.l, &partition).unwrap();
        let rho2 = CCD.two_body_density(&fx.t, &fx.l, &partition).unwrap();
        let eta = CCD
            .compute_p_space_equations(fx.system.h(), fx.system.u(), &rho, &rho2, &partition)
            .unwrap();
        for p in 0..6 {
            for q in 0..6 {
                if (p < 2) == (q < 2) {
                    assert_eq!(eta[[p, q]], Complex64::new(0.0, 0.0));
                }
            }
        }
    }

    #[test]
    fn test_wrong_tensor_shape_is_rejected() {
        let fx = fixture(2, 5);
        let partition = fx.system.partition();
        let wrong = vec![ArrayD::<Complex64>::zeros(ndarray::IxDyn(&[3, 3, 2, 1]))];
        let result = CCD.compute_t_residual(&fx.f, fx.system.u(), &wrong, &partition);
        assert!(matches!(result, Err(CoupledClusterError::ShapeMismatch { .. })));
    }
}
