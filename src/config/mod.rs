//! YAML configuration for the ground-state and propagation pipeline
//!
//! Every section is optional. Missing sections and fields take the values of
//! the corresponding `Default` impl, either through [`Config::with_defaults`]
//! or lazily through the accessor methods.


use crate::error::{CoupledClusterError, Result};
use crate::integrator_impl::IntegratorKind;
use crate::mixer_impl::MixerKind;
use crate::oatdcc_impl::Regularization;
use crate::system_impl::{LaserPulse, RandomSystemBuilder};
use color_eyre::eyre::{self, WrapErr};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const MAX_ITERATIONS: usize = 100;
const TOLERANCE: f64 = 1e-4;
const THETA: f64 = 0.1;
const MIXER: &str = "diis";
const MAX_VECTORS: usize = 8;
const INTEGRATOR: &str = "rk4";
const GAUSS_STAGES: usize = 2;
const GAUSS_TOLERANCE: f64 = 1e-10;
const GAUSS_MAX_ITERATIONS: usize = 100;
const TIME_STEP: f64 = 1e-2;
const NUM_STEPS: usize = 100;
const T_START: f64 = 0.0;
const TRACE_TOLERANCE: f64 = 1e-6;
const ORBITAL_ADAPTIVE: bool = true;
const LASER_ENABLED: bool = false;
const N_OCCUPIED: usize = 2;
const N_BASIS: usize = 6;
const SEED: u64 = 42;
const COUPLING: f64 = 0.05;
const LASER_STRENGTH: f64 = 0.01;
const LASER_OMEGA: f64 = 2.0;
const LASER_DURATION: f64 = 1.0;

/// Iteration controls for a ground-state or Lambda solve
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolverParams {
    pub max_iterations: Option<usize>,
    pub tolerance: Option<f64>,
    /// Damping weight of the previous iterate
    pub theta: Option<f64>,
}

impl Default for SolverParams {
    fn default() -> Self {
        SolverParams {
            max_iterations: Some(MAX_ITERATIONS),
            tolerance: Some(TOLERANCE),
            theta: Some(THETA),
        }
    }
}

impl SolverParams {
    pub fn with_defaults(self) -> Self {
        let defaults = SolverParams::default();
        SolverParams {
            max_iterations: self.max_iterations.or(defaults.max_iterations),
            tolerance: self.tolerance.or(defaults.tolerance),
            theta: self.theta.or(defaults.theta),
        }
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations.unwrap_or(MAX_ITERATIONS)
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance.unwrap_or(TOLERANCE)
    }

    pub fn theta(&self) -> f64 {
        self.theta.unwrap_or(THETA)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MixerParams {
    /// `diis` or `alpha`
    pub kind: Option<String>,
    pub max_vectors: Option<usize>,
}

impl Default for MixerParams {
    fn default() -> Self {
        MixerParams {
            kind: Some(MIXER.to_string()),
            max_vectors: Some(MAX_VECTORS),
        }
    }
}

impl MixerParams {
    pub fn with_defaults(self) -> Self {
        let defaults = MixerParams::default();
        MixerParams {
            kind: self.kind.or(defaults.kind),
            max_vectors: self.max_vectors.or(defaults.max_vectors),
        }
    }

    pub fn mixer_kind(&self) -> Result<MixerKind> {
        let kind = self.kind.as_deref().unwrap_or(MIXER);
        match kind.to_lowercase().as_str() {
            "alpha" => Ok(MixerKind::Alpha),
            "diis" => {
                let max_vectors = self.max_vectors.unwrap_or(MAX_VECTORS);
                if max_vectors == 0 {
                    return Err(CoupledClusterError::InvalidConfig(
                        "DIIS needs at least one stored vector".to_string(),
                    ));
                }
                Ok(MixerKind::Diis { max_vectors })
            }
            other => Err(CoupledClusterError::InvalidConfig(format!(
                "unknown mixer '{}', expected 'diis' or 'alpha'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropagationParams {
    /// `rk4` or `gauss`
    pub integrator: Option<String>,
    pub gauss_stages: Option<usize>,
    pub gauss_tolerance: Option<f64>,
    pub gauss_max_iterations: Option<usize>,
    pub time_step: Option<f64>,
    pub num_steps: Option<usize>,
    pub t_start: Option<f64>,
}

impl Default for PropagationParams {
    fn default() -> Self {
        PropagationParams {
            integrator: Some(INTEGRATOR.to_string()),
            gauss_stages: Some(GAUSS_STAGES),
            gauss_tolerance: Some(GAUSS_TOLERANCE),
            gauss_max_iterations: Some(GAUSS_MAX_ITERATIONS),
            time_step: Some(TIME_STEP),
            num_steps: Some(NUM_STEPS),
            t_start: Some(T_START),
        }
    }
}

impl PropagationParams {
    pub fn with_defaults(self) -> Self {
        let defaults = PropagationParams::default();
        PropagationParams {
            integrator: self.integrator.or(defaults.integrator),
            gauss_stages: self.gauss_stages.or(defaults.gauss_stages),
            gauss_tolerance: self.gauss_tolerance.or(defaults.gauss_tolerance),
            gauss_max_iterations: self.gauss_max_iterations.or(defaults.gauss_max_iterations),
            time_step: self.time_step.or(defaults.time_step),
            num_steps: self.num_steps.or(defaults.num_steps),
            t_start: self.t_start.or(defaults.t_start),
        }
    }

    pub fn integrator_kind(&self) -> Result<IntegratorKind> {
        let name = self.integrator.as_deref().unwrap_or(INTEGRATOR);
        match name.to_lowercase().as_str() {
            "rk4" => Ok(IntegratorKind::RungeKutta4),
            "gauss" => Ok(IntegratorKind::Gauss {
                stages: self.gauss_stages.unwrap_or(GAUSS_STAGES),
                tolerance: self.gauss_tolerance.unwrap_or(GAUSS_TOLERANCE),
                max_iterations: self.gauss_max_iterations.unwrap_or(GAUSS_MAX_ITERATIONS),
            }),
            other => Err(CoupledClusterError::InvalidConfig(format!(
                "unknown integrator '{}', expected 'rk4' or 'gauss'",
                other
            ))),
        }
    }

    pub fn time_step(&self) -> f64 {
        self.time_step.unwrap_or(TIME_STEP)
    }

    pub fn num_steps(&self) -> usize {
        self.num_steps.unwrap_or(NUM_STEPS)
    }

    pub fn t_start(&self) -> f64 {
        self.t_start.unwrap_or(T_START)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrbitalAdaptiveParams {
    pub enabled: Option<bool>,
    pub singular_value_floor: Option<f64>,
    pub max_condition_number: Option<f64>,
    pub regularization_epsilon: Option<f64>,
    pub trace_tolerance: Option<f64>,
    /// Size of the working space; the full basis when absent
    pub n_working: Option<usize>,
}

impl Default for OrbitalAdaptiveParams {
    fn default() -> Self {
        let regularization = Regularization::default();
        OrbitalAdaptiveParams {
            enabled: Some(ORBITAL_ADAPTIVE),
            singular_value_floor: Some(regularization.singular_value_floor),
            max_condition_number: Some(regularization.max_condition_number),
            regularization_epsilon: Some(regularization.epsilon),
            trace_tolerance: Some(TRACE_TOLERANCE),
            n_working: None,
        }
    }
}

impl OrbitalAdaptiveParams {
    pub fn with_defaults(self) -> Self {
        let defaults = OrbitalAdaptiveParams::default();
        OrbitalAdaptiveParams {
            enabled: self.enabled.or(defaults.enabled),
            singular_value_floor: self.singular_value_floor.or(defaults.singular_value_floor),
            max_condition_number: self.max_condition_number.or(defaults.max_condition_number),
            regularization_epsilon: self
                .regularization_epsilon
                .or(defaults.regularization_epsilon),
            trace_tolerance: self.trace_tolerance.or(defaults.trace_tolerance),
            n_working: self.n_working,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(ORBITAL_ADAPTIVE)
    }

    pub fn regularization(&self) -> Regularization {
        let defaults = Regularization::default();
        Regularization {
            singular_value_floor: self
                .singular_value_floor
                .unwrap_or(defaults.singular_value_floor),
            max_condition_number: self
                .max_condition_number
                .unwrap_or(defaults.max_condition_number),
            epsilon: self.regularization_epsilon.unwrap_or(defaults.epsilon),
        }
    }

    pub fn trace_tolerance(&self) -> f64 {
        self.trace_tolerance.unwrap_or(TRACE_TOLERANCE)
    }
}

/// Parameters of the synthetic test system
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemParams {
    pub n_occupied: Option<usize>,
    pub n_basis: Option<usize>,
    pub seed: Option<u64>,
    pub coupling: Option<f64>,
}

impl Default for SystemParams {
    fn default() -> Self {
        SystemParams {
            n_occupied: Some(N_OCCUPIED),
            n_basis: Some(N_BASIS),
            seed: Some(SEED),
            coupling: Some(COUPLING),
        }
    }
}

impl SystemParams {
    pub fn with_defaults(self) -> Self {
        let defaults = SystemParams::default();
        SystemParams {
            n_occupied: self.n_occupied.or(defaults.n_occupied),
            n_basis: self.n_basis.or(defaults.n_basis),
            seed: self.seed.or(defaults.seed),
            coupling: self.coupling.or(defaults.coupling),
        }
    }

    pub fn builder(&self) -> RandomSystemBuilder {
        RandomSystemBuilder::new(
            self.n_occupied.unwrap_or(N_OCCUPIED),
            self.n_basis.unwrap_or(N_BASIS),
        )
        .seed(self.seed.unwrap_or(SEED))
        .coupling(self.coupling.unwrap_or(COUPLING))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LaserParams {
    pub enabled: Option<bool>,
    pub strength: Option<f64>,
    pub omega: Option<f64>,
    pub duration: Option<f64>,
    pub t_start: Option<f64>,
}

impl Default for LaserParams {
    fn default() -> Self {
        LaserParams {
            enabled: Some(LASER_ENABLED),
            strength: Some(LASER_STRENGTH),
            omega: Some(LASER_OMEGA),
            duration: Some(LASER_DURATION),
            t_start: Some(T_START),
        }
    }
}

impl LaserParams {
    pub fn with_defaults(self) -> Self {
        let defaults = LaserParams::default();
        LaserParams {
            enabled: self.enabled.or(defaults.enabled),
            strength: self.strength.or(defaults.strength),
            omega: self.omega.or(defaults.omega),
            duration: self.duration.or(defaults.duration),
            t_start: self.t_start.or(defaults.t_start),
        }
    }

    /// The configured pulse, `None` when the field is switched off
    pub fn pulse(&self) -> Result<Option<LaserPulse>> {
        if !self.enabled.unwrap_or(LASER_ENABLED) {
            return Ok(None);
        }
        let duration = self.duration.unwrap_or(LASER_DURATION);
        if duration <= 0.0 {
            return Err(CoupledClusterError::InvalidConfig(format!(
                "laser duration must be positive, got {}",
                duration
            )));
        }
        Ok(Some(LaserPulse::new(
            self.t_start.unwrap_or(T_START),
            duration,
            self.omega.unwrap_or(LASER_OMEGA),
            self.strength.unwrap_or(LASER_STRENGTH),
        )))
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub ground_state: Option<SolverParams>,
    pub lambda: Option<SolverParams>,
    pub mixer: Option<MixerParams>,
    pub propagation: Option<PropagationParams>,
    pub orbital_adaptive: Option<OrbitalAdaptiveParams>,
    pub system: Option<SystemParams>,
    pub laser: Option<LaserParams>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ground_state: Some(SolverParams::default()),
            lambda: Some(SolverParams::default()),
            mixer: Some(MixerParams::default()),
            propagation: Some(PropagationParams::default()),
            orbital_adaptive: Some(OrbitalAdaptiveParams::default()),
            system: Some(SystemParams::default()),
            laser: Some(LaserParams::default()),
        }
    }
}

impl Config {
    /// Fill every missing section and field with its default
    pub fn with_defaults(self) -> Self {
        Config {
            ground_state: Some(self.ground_state.unwrap_or_default().with_defaults()),
            lambda: Some(self.lambda.unwrap_or_default().with_defaults()),
            mixer: Some(self.mixer.unwrap_or_default().with_defaults()),
            propagation: Some(self.propagation.unwrap_or_default().with_defaults()),
            orbital_adaptive: Some(self.orbital_adaptive.unwrap_or_default().with_defaults()),
            system: Some(self.system.unwrap_or_default().with_defaults()),
            laser: Some(self.laser.unwrap_or_default().with_defaults()),
        }
    }

    pub fn ground_state(&self) -> SolverParams {
        self.ground_state.clone().unwrap_or_default()
    }

    pub fn lambda(&self) -> SolverParams {
        self.lambda.clone().unwrap_or_default()
    }

    pub fn mixer_kind(&self) -> Result<MixerKind> {
        self.mixer.clone().unwrap_or_default().mixer_kind()
    }

    pub fn propagation(&self) -> PropagationParams {
        self.propagation.clone().unwrap_or_default()
    }

    pub fn integrator_kind(&self) -> Result<IntegratorKind> {
        self.propagation().integrator_kind()
    }

    pub fn orbital_adaptive(&self) -> OrbitalAdaptiveParams {
        self.orbital_adaptive.clone().unwrap_or_default()
    }

    pub fn is_orbital_adaptive_enabled(&self) -> bool {
        self.orbital_adaptive().is_enabled()
    }

    pub fn system(&self) -> SystemParams {
        self.system.clone().unwrap_or_default()
    }

    pub fn laser_pulse(&self) -> Result<Option<LaserPulse>> {
        self.laser.clone().unwrap_or_default().pulse()
    }
}

/// Read and parse a YAML configuration, filling in defaults
pub fn load_config<P: AsRef<Path>>(path: P) -> eyre::Result<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", path.display()))?;
    parse_config(&content)
        .wrap_err_with(|| format!("Failed to parse configuration file: {}", path.display()))
}

/// Parse a YAML configuration string, filling in defaults
pub fn parse_config(yaml: &str) -> eyre::Result<Config> {
    let config: Config = serde_yml::from_str(yaml).wrap_err("Invalid YAML configuration")?;
    Ok(config.with_defaults())
}
