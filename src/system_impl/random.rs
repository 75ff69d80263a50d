use super::system::GeneralSystem;
use crate::error::{CoupledClusterError, Result};
use ndarray::{Array2, Array4};
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Builds a seeded synthetic system with a diagonally dominant one-body
/// operator and a random antisymmetric, Hermitian two-body operator
///
/// Occupied orbital energies are `-1.0 + 0.1 * i`, virtual ones `1.0 + 0.25 * a`.
#[derive(Debug, Clone)]
pub struct RandomSystemBuilder {
    n: usize,
    l: usize,
    seed: u64,
    coupling: f64,
    perturbation: f64,
}

impl RandomSystemBuilder {
    pub fn new(n_occupied: usize, n_basis: usize) -> Self {
        RandomSystemBuilder {
            n: n_occupied,
            l: n_basis,
            seed: 42,
            coupling: 0.05,
            perturbation: 0.01,
        }
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Standard deviation of the raw two-body elements
    pub fn coupling(mut self, coupling: f64) -> Self {
        self.coupling = coupling;
        self
    }

    /// Standard deviation of the off-diagonal one-body elements
    pub fn perturbation(mut self, perturbation: f64) -> Self {
        self.perturbation = perturbation;
        self
    }

    pub fn build(&self) -> Result<GeneralSystem> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let h = self.one_body(&mut rng)?;
        let u = self.two_body(&mut rng)?;
        GeneralSystem::new(self.n, h, u)
    }

    fn one_body(&self, rng: &mut StdRng) -> Result<Array2<Complex64>> {
        let dist = normal(self.perturbation)?;
        let l = self.l;
        let x = Array2::from_shape_fn((l, l), |_| {
            Complex64::new(dist.sample(rng), dist.sample(rng))
        });
        let mut h = (&x + &x.t().mapv(|z| z.conj())) * Complex64::new(0.5, 0.0);

        for p in 0..l {
            let energy = if p < self.n {
                -1.0 + 0.1 * p as f64
            } else {
                1.0 + 0.25 * (p - self.n) as f64
            };
            h[[p, p]] = Complex64::new(energy, 0.0);
        }
        Ok(h)
    }

    fn two_body(&self, rng: &mut StdRng) -> Result<Array4<Complex64>> {
        let dist = normal(self.coupling)?;
        let l = self.l;
        let x = Array4::from_shape_fn((l, l, l, l), |_| {
            Complex64::new(dist.sample(rng), dist.sample(rng))
        });

        // pair exchange, hermiticity, then antisymmetry in the ket pair
        let u = &x + &x.view().permuted_axes([1, 0, 3, 2]);
        let u = &u + &u.view().permuted_axes([2, 3, 0, 1]).mapv(|z| z.conj());
        let u = &u - &u.view().permuted_axes([0, 1, 3, 2]);
        Ok(u)
    }
}

fn normal(std_dev: f64) -> Result<Normal<f64>> {
    Normal::new(0.0, std_dev)
        .map_err(|e| CoupledClusterError::InvalidConfig(format!("invalid standard deviation: {e}")))
}
