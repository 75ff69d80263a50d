//! Tests for the convergence mixers

#[cfg(test)]
mod tests {
    use super::super::{AlphaMixer, ConvergenceMixer, MixerKind, DIIS};
    use ndarray::{array, Array1};
    use num_complex::Complex64;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn max_abs_diff(a: &Array1<Complex64>, b: &Array1<Complex64>) -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).norm())
            .fold(0.0, f64::max)
    }

    #[test]
    fn test_alpha_mixer_passes_direction_through() {
        let mut mixer = AlphaMixer;
        let trial = array![c(1.0, 0.0), c(2.0, 0.0)];
        let direction = array![c(0.5, 0.5), c(-1.0, 0.0)];
        let error = array![c(0.1, 0.0), c(0.2, 0.0)];
        assert_eq!(mixer.compute_new_vector(&trial, &direction, &error), direction);
        assert_eq!(mixer.size(), 0);
    }

    #[test]
    fn test_single_vector_returns_direction() {
        let mut mixer = DIIS::new(4);
        let trial = array![c(0.0, 0.0), c(0.0, 0.0)];
        let direction = array![c(1.0, 2.0), c(3.0, -1.0)];
        let error = array![c(0.3, 0.0), c(0.0, 0.1)];
        let next = mixer.compute_new_vector(&trial, &direction, &error);
        assert!(max_abs_diff(&next, &direction) < 1e-14);
        assert_eq!(mixer.fallback_count(), 0);
    }

    #[test]
    fn test_weights_minimize_error_norm() {
        // |c1 e1 + c2 e2|^2 = c1^2 + 4 c2^2 with c1 + c2 = 1 gives c = (4/5, 1/5)
        let mut mixer = DIIS::new(4);
        let zero = array![c(0.0, 0.0), c(0.0, 0.0)];
        let x1 = array![c(1.0, 0.0), c(0.0, 1.0)];
        let x2 = array![c(6.0, 0.0), c(-4.0, 1.0)];
        mixer.compute_new_vector(&zero, &x1, &array![c(1.0, 0.0), c(0.0, 0.0)]);
        let next = mixer.compute_new_vector(&x1, &x2, &array![c(0.0, 0.0), c(0.0, 2.0)]);

        let expected = array![c(2.0, 0.0), c(-0.8, 1.0)];
        assert!(max_abs_diff(&next, &expected) < 1e-12);
    }

    #[test]
    fn test_rank_deficient_history_falls_back() {
        let mut mixer = DIIS::new(4);
        let trial = array![c(0.0, 0.0), c(0.0, 0.0)];
        let error = array![c(1.0, 0.0), c(1.0, 0.0)];
        mixer.compute_new_vector(&trial, &array![c(1.0, 0.0), c(1.0, 0.0)], &error);

        // second error is i times the first: the Hermitian Gram matrix has rank one
        let direction = array![c(7.0, 1.0), c(-2.0, 0.5)];
        let parallel = error.mapv(|e| e * c(0.0, 1.0));
        let next = mixer.compute_new_vector(&trial, &direction, &parallel);
        assert_eq!(next, direction);
        assert_eq!(mixer.fallback_count(), 1);
    }

    #[test]
    fn test_zero_error_falls_back() {
        let mut mixer = DIIS::new(3);
        let trial = array![c(1.0, 0.0)];
        let direction = array![c(2.0, 0.0)];
        let zero = array![c(0.0, 0.0)];
        assert_eq!(mixer.compute_new_vector(&trial, &direction, &zero), direction);
        assert_eq!(mixer.fallback_count(), 1);
    }

    #[test]
    fn test_history_is_bounded_and_cleared() {
        let mut mixer = DIIS::new(3);
        let trial = array![c(0.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(0.0, 0.0)];
        for k in 0..5 {
            let mut error = Array1::<Complex64>::zeros(5);
            error[k] = c(1.0 + k as f64, 0.0);
            let direction = error.mapv(|e| e * 2.0);
            mixer.compute_new_vector(&trial, &direction, &error);
            assert_eq!(mixer.size(), (k + 1).min(3));
        }
        mixer.clear_vectors();
        assert_eq!(mixer.size(), 0);
    }

    #[test]
    fn test_mixer_kind_build() {
        let mut alpha = MixerKind::Alpha.build();
        let mut diis = MixerKind::default().build();
        let trial = array![c(0.0, 0.0), c(0.0, 0.0)];
        let direction = array![c(1.0, 0.0), c(0.0, 0.0)];
        let error = array![c(0.0, 0.0), c(1.0, 0.0)];
        alpha.compute_new_vector(&trial, &direction, &error);
        diis.compute_new_vector(&trial, &direction, &error);
        assert_eq!(alpha.size(), 0);
        assert_eq!(diis.size(), 1);
    }
}
