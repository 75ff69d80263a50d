use super::{Integrator, RightHandSide};
use crate::error::Result;
use itertools::izip;
use ndarray::Array1;
use num_complex::Complex64;

/// Classical fourth-order Runge-Kutta
#[derive(Debug, Clone, Copy, Default)]
pub struct RungeKutta4;

impl Integrator for RungeKutta4 {
    fn step(
        &self,
        rhs: &mut dyn RightHandSide,
        y: &Array1<Complex64>,
        time: f64,
        dt: f64,
    ) -> Result<Array1<Complex64>> {
        let half = Complex64::new(0.5 * dt, 0.0);
        let full = Complex64::new(dt, 0.0);

        let k1 = rhs.evaluate(time, y)?;
        let k2 = rhs.evaluate(time + 0.5 * dt, &(y + &(&k1 * half)))?;
        let k3 = rhs.evaluate(time + 0.5 * dt, &(y + &(&k2 * half)))?;
        let k4 = rhs.evaluate(time + dt, &(y + &(&k3 * full)))?;

        let sixth = dt / 6.0;
        let mut next = y.clone();
        for (x, &a, &b, &c, &d) in izip!(next.iter_mut(), &k1, &k2, &k3, &k4) {
            *x += (a + 2.0 * b + 2.0 * c + d) * sixth;
        }
        Ok(next)
    }

    fn name(&self) -> &'static str {
        "Runge-Kutta 4"
    }
}
