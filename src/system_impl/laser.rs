use std::f64::consts::PI;

/// Scalar external field `E(t)` coupling to a one-body operator
pub trait TimeDependentField {
    fn amplitude(&self, time: f64) -> f64;
}

impl<F> TimeDependentField for F
where
    F: Fn(f64) -> f64,
{
    fn amplitude(&self, time: f64) -> f64 {
        self(time)
    }
}

/// Sine-squared enveloped laser pulse
///
/// `E(t) = -sin^2(pi (t - t0) / td) cos(omega (t - t0)) E0` for
/// `t0 <= t <= t0 + td`, zero outside the pulse window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaserPulse {
    /// Pulse start time
    pub t0: f64,
    /// Pulse duration
    pub td: f64,
    /// Carrier frequency
    pub omega: f64,
    /// Peak field strength
    pub strength: f64,
}

impl LaserPulse {
    pub fn new(t0: f64, td: f64, omega: f64, strength: f64) -> Self {
        LaserPulse {
            t0,
            td,
            omega,
            strength,
        }
    }

    fn envelope(&self, delta_t: f64) -> f64 {
        if delta_t < 0.0 || delta_t > self.td {
            return 0.0;
        }
        (PI * delta_t / self.td).sin().powi(2)
    }
}

impl TimeDependentField for LaserPulse {
    fn amplitude(&self, time: f64) -> f64 {
        let delta_t = time - self.t0;
        -self.envelope(delta_t) * (self.omega * delta_t).cos() * self.strength
    }
}
