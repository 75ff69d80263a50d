//! Tests for the system collaborator

#[cfg(test)]
mod tests {
    use super::super::{
        GeneralSystem, LaserPulse, OrbitalPartition, QuantumSystem, RandomSystemBuilder,
        TimeDependentField,
    };
    use crate::error::CoupledClusterError;
    use ndarray::{Array2, Array4};
    use num_complex::Complex64;

    fn max_abs_diff2(a: &Array2<Complex64>, b: &Array2<Complex64>) -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).norm())
            .fold(0.0, f64::max)
    }

    fn max_abs_diff4(a: &Array4<Complex64>, b: &Array4<Complex64>) -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).norm())
            .fold(0.0, f64::max)
    }

    #[test]
    fn test_partition_ranges() {
        let partition = OrbitalPartition::new(2, 6).unwrap();
        assert_eq!(partition.occupied(), 0..2);
        assert_eq!(partition.virtuals(), 2..6);
        assert_eq!(partition.m(), 4);
        assert_eq!(partition.occupied().len() + partition.virtuals().len(), 6);
    }

    #[test]
    fn test_partition_rejects_too_many_particles() {
        let result = OrbitalPartition::new(7, 6);
        assert!(matches!(
            result,
            Err(CoupledClusterError::InvalidPartition {
                n_occupied: 7,
                n_basis: 6
            })
        ));
    }

    #[test]
    fn test_general_system_rejects_wrong_two_body_shape() {
        let h = Array2::<Complex64>::zeros((4, 4));
        let u = Array4::<Complex64>::zeros((4, 4, 4, 3));
        assert!(matches!(
            GeneralSystem::new(2, h, u),
            Err(CoupledClusterError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_random_two_body_symmetries() {
        let system = RandomSystemBuilder::new(2, 5).seed(3).build().unwrap();
        let u = system.u();
        let l = system.l();
        let mut max_violation: f64 = 0.0;
        for p in 0..l {
            for q in 0..l {
                for r in 0..l {
                    for s in 0..l {
                        let value = u[[p, q, r, s]];
                        max_violation = max_violation
                            .max((value + u[[q, p, r, s]]).norm())
                            .max((value + u[[p, q, s, r]]).norm())
                            .max((value - u[[r, s, p, q]].conj()).norm());
                    }
                }
            }
        }
        assert!(max_violation < 1e-14, "violation {}", max_violation);
    }

    #[test]
    fn test_random_system_is_reproducible() {
        let a = RandomSystemBuilder::new(2, 4).seed(11).build().unwrap();
        let b = RandomSystemBuilder::new(2, 4).seed(11).build().unwrap();
        assert_eq!(a.h(), b.h());
        assert_eq!(a.u(), b.u());
    }

    #[test]
    fn test_fock_matrix_matches_reference_energy() {
        let system = RandomSystemBuilder::new(3, 6).seed(5).build().unwrap();
        let f = system.construct_fock_matrix(system.h(), system.u());

        // sum_i f_ii - 1/2 sum_ij u_ijij = sum_i h_ii + 1/2 sum_ij u_ijij
        let mut from_fock = Complex64::new(0.0, 0.0);
        let mut from_operators = Complex64::new(0.0, 0.0);
        for i in 0..3 {
            from_fock += f[[i, i]];
            from_operators += system.h()[[i, i]];
            for j in 0..3 {
                from_fock -= 0.5 * system.u()[[i, j, i, j]];
                from_operators += 0.5 * system.u()[[i, j, i, j]];
            }
        }
        assert!((from_fock - from_operators).norm() < 1e-12);
    }

    #[test]
    fn test_identity_transform_is_noop() {
        let system = RandomSystemBuilder::new(2, 4).seed(1).build().unwrap();
        let identity = Array2::<Complex64>::eye(4);
        let h = system.transform_one_body_elements(system.h(), &identity, &identity);
        let u = system.transform_two_body_elements(system.u(), &identity, &identity);
        assert!(max_abs_diff2(&h, system.h()) < 1e-14);
        assert!(max_abs_diff4(&u, system.u()) < 1e-14);
    }

    #[test]
    fn test_two_body_transform_matches_explicit_sum() {
        let system = RandomSystemBuilder::new(1, 3).seed(9).build().unwrap();
        let c = Array2::from_shape_fn((3, 3), |(p, q)| {
            Complex64::new(0.1 * (p + 2 * q) as f64, 0.05 * p as f64 - 0.02 * q as f64)
        }) + Array2::<Complex64>::eye(3);
        let c_tilde = Array2::from_shape_fn((3, 3), |(p, q)| {
            Complex64::new(0.03 * (p * q) as f64, 0.01 * (p + q) as f64)
        }) + Array2::<Complex64>::eye(3);

        let transformed = system.transform_two_body_elements(system.u(), &c, &c_tilde);
        let u = system.u();
        let (p, q, r, s) = (0, 2, 1, 2);
        let mut expected = Complex64::new(0.0, 0.0);
        for a in 0..3 {
            for b in 0..3 {
                for g in 0..3 {
                    for d in 0..3 {
                        expected += c_tilde[[p, a]] * c_tilde[[q, b]] * u[[a, b, g, d]]
                            * c[[g, r]]
                            * c[[d, s]];
                    }
                }
            }
        }
        assert!((transformed[[p, q, r, s]] - expected).norm() < 1e-12);
    }

    #[test]
    fn test_laser_pulse_window() {
        let pulse = LaserPulse::new(1.0, 2.0, 0.5, 0.1);
        assert_eq!(pulse.amplitude(0.5), 0.0);
        assert_eq!(pulse.amplitude(3.5), 0.0);
        // peak of the envelope at t0 + td / 2
        let expected = -(0.5_f64 * 1.0).cos() * 0.1;
        assert!((pulse.amplitude(2.0) - expected).abs() < 1e-14);
    }

    #[test]
    fn test_dipole_field_enters_one_body_operator() {
        let system = RandomSystemBuilder::new(1, 3).seed(2).build().unwrap();
        assert!(system.h_t(0.3).is_none());

        let dipole = Array2::from_shape_fn((3, 3), |(p, q)| {
            Complex64::new(if p != q { 1.0 } else { 0.0 }, 0.0)
        });
        let system = system
            .with_dipole_field(dipole.clone(), Box::new(|t: f64| 2.0 * t))
            .unwrap();
        let h_t = system.h_t(0.25).unwrap();
        let expected = system.h() + &dipole.mapv(|d| d * 0.5);
        assert!(max_abs_diff2(&h_t, &expected) < 1e-14);
    }
}
