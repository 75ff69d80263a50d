//! Amplitude containers
//!
//! An [`AmplitudeSet`] bundles the excitation amplitudes `t = (t_0, t_1, ...)`,
//! the de-excitation amplitudes `l = (l_1, ...)` and, under orbital adaptation,
//! the orbital matrices `C` and `C_tilde`. Integrators see it as one flat
//! complex vector; the [`AmplitudeTemplate`] stored alongside a set recovers
//! the tensor shapes exactly.
//!
//! # Usage
//!
//! ```rust,ignore
//! let template = AmplitudeTemplate::new(vec![vec![1], vec![m, m, n, n]], vec![vec![n, n, m, m]]);
//! let amplitudes = template.zeros();
//! let flat = amplitudes.linearize();
//! let back = AmplitudeSet::delinearize(flat.view(), &template)?;
//! assert_eq!(back, amplitudes);
//! ```

mod amplitudes;

pub use amplitudes::{AmplitudeSet, AmplitudeTemplate};
pub(crate) use amplitudes::{concatenate, split};
