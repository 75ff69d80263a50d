use super::{Integrator, RightHandSide};
use crate::error::Result;
use crate::observe::{Action, Observer, Status};
use ndarray::Array1;
use num_complex::Complex64;
use tracing::{debug, info};

/// Reported to an observer after every completed step
#[derive(Debug, Clone)]
pub struct StepEvent {
    pub step: usize,
    pub time: f64,
    pub state: Array1<Complex64>,
}

/// Time points and states of a propagation, starting with the initial state
#[derive(Debug, Clone)]
pub struct Trajectory {
    pub status: Status,
    pub times: Vec<f64>,
    pub states: Vec<Array1<Complex64>>,
    /// Number of steps taken
    pub steps: usize,
}

impl Trajectory {
    /// State at the last time point
    pub fn last(&self) -> Option<&Array1<Complex64>> {
        self.states.last()
    }
}

/// Propagate `initial` by `steps` steps of size `dt` from `t_start`
pub fn evolve(
    rhs: &mut dyn RightHandSide,
    integrator: &dyn Integrator,
    initial: Array1<Complex64>,
    t_start: f64,
    dt: f64,
    steps: usize,
    observer: &mut impl Observer<StepEvent>,
) -> Result<Trajectory> {
    info!("===========================================");
    info!("     Time Propagation");
    info!("===========================================");
    info!("Integrator: {}", integrator.name());
    info!("Time step: {:.3e}, steps: {}, start: {:.3}", dt, steps, t_start);

    let mut trajectory = Trajectory {
        status: Status::Complete,
        times: Vec::with_capacity(steps + 1),
        states: Vec::with_capacity(steps + 1),
        steps: 0,
    };
    trajectory.times.push(t_start);
    trajectory.states.push(initial.clone());

    let mut y = initial;
    for step in 1..=steps {
        let time = t_start + (step - 1) as f64 * dt;
        y = integrator.step(rhs, &y, time, dt)?;
        let time = t_start + step as f64 * dt;

        trajectory.times.push(time);
        trajectory.states.push(y.clone());
        trajectory.steps = step;
        debug!("Step {:>6} t = {:.6}", step, time);

        let event = StepEvent {
            step,
            time,
            state: y.clone(),
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            info!("Propagation stopped by observer at t = {:.6}", time);
            trajectory.status = Status::StoppedByObserver;
            return Ok(trajectory);
        }
    }

    info!("Propagation complete after {} steps", trajectory.steps);
    info!("-------------------------------------------");
    Ok(trajectory)
}
