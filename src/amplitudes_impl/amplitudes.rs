use crate::error::{CoupledClusterError, Result};
use ndarray::{Array1, Array2, ArrayD, ArrayView1, IxDyn};
use num_complex::Complex64;

/// Ordered tensor shapes of an amplitude set
///
/// `t_shapes[0]` is the phase amplitude `[1]`. `orbital_shape` is `(l, l')`
/// for `C` (`l x l'`) and `C_tilde` (`l' x l`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmplitudeTemplate {
    pub t_shapes: Vec<Vec<usize>>,
    pub l_shapes: Vec<Vec<usize>>,
    pub orbital_shape: Option<(usize, usize)>,
}

impl AmplitudeTemplate {
    pub fn new(t_shapes: Vec<Vec<usize>>, l_shapes: Vec<Vec<usize>>) -> Self {
        AmplitudeTemplate {
            t_shapes,
            l_shapes,
            orbital_shape: None,
        }
    }

    pub fn with_orbitals(mut self, n_basis: usize, n_working: usize) -> Self {
        self.orbital_shape = Some((n_basis, n_working));
        self
    }

    /// Length of the flat vector
    pub fn len(&self) -> usize {
        let tensors: usize = self
            .t_shapes
            .iter()
            .chain(self.l_shapes.iter())
            .map(|shape| shape.iter().product::<usize>())
            .sum();
        let orbitals = self.orbital_shape.map_or(0, |(l, lp)| 2 * l * lp);
        tensors + orbitals
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Amplitude set of zeros with this template
    ///
    /// Orbital matrices, when present, start as the identity embedding.
    pub fn zeros(&self) -> AmplitudeSet {
        let zeros = |shapes: &[Vec<usize>]| -> Vec<ArrayD<Complex64>> {
            shapes
                .iter()
                .map(|shape| ArrayD::zeros(IxDyn(shape)))
                .collect()
        };
        let orbitals = self.orbital_shape.map(|(l, lp)| {
            let c = Array2::<Complex64>::eye(l.max(lp))
                .slice_move(ndarray::s![..l, ..lp]);
            let c_tilde = c.t().to_owned();
            (c, c_tilde)
        });
        AmplitudeSet {
            t: zeros(&self.t_shapes),
            l: zeros(&self.l_shapes),
            orbitals,
        }
    }
}

/// Excitation, de-excitation and orbital parameters of one state
#[derive(Debug, Clone, PartialEq)]
pub struct AmplitudeSet {
    t: Vec<ArrayD<Complex64>>,
    l: Vec<ArrayD<Complex64>>,
    orbitals: Option<(Array2<Complex64>, Array2<Complex64>)>,
}

impl AmplitudeSet {
    /// `t[0]` must hold the single phase amplitude
    pub fn new(t: Vec<ArrayD<Complex64>>, l: Vec<ArrayD<Complex64>>) -> Result<Self> {
        check_phase_slot(t.first().map_or(0, |t_0| t_0.len()))?;
        Ok(AmplitudeSet {
            t,
            l,
            orbitals: None,
        })
    }

    /// Attach `C` (`l x l'`) and `C_tilde` (`l' x l`)
    pub fn with_orbitals(
        mut self,
        c: Array2<Complex64>,
        c_tilde: Array2<Complex64>,
    ) -> Result<Self> {
        if c.dim() != (c_tilde.ncols(), c_tilde.nrows()) {
            return Err(CoupledClusterError::OrbitalShapeMismatch {
                c: c.dim(),
                c_tilde: c_tilde.dim(),
            });
        }
        self.orbitals = Some((c, c_tilde));
        Ok(self)
    }

    pub fn t_0(&self) -> Complex64 {
        self.t[0].iter().next().copied().unwrap_or_default()
    }

    pub fn set_t_0(&mut self, value: Complex64) {
        self.t[0].fill(value);
    }

    /// All excitation tensors, phase included
    pub fn t(&self) -> &[ArrayD<Complex64>] {
        &self.t
    }

    /// Excitation tensors without the phase
    pub fn t_amplitudes(&self) -> &[ArrayD<Complex64>] {
        &self.t[1..]
    }

    pub fn t_amplitudes_mut(&mut self) -> &mut [ArrayD<Complex64>] {
        &mut self.t[1..]
    }

    pub fn l(&self) -> &[ArrayD<Complex64>] {
        &self.l
    }

    pub fn l_mut(&mut self) -> &mut [ArrayD<Complex64>] {
        &mut self.l
    }

    pub fn orbitals(&self) -> Option<(&Array2<Complex64>, &Array2<Complex64>)> {
        self.orbitals.as_ref().map(|(c, c_tilde)| (c, c_tilde))
    }

    pub fn template(&self) -> AmplitudeTemplate {
        let shapes = |tensors: &[ArrayD<Complex64>]| -> Vec<Vec<usize>> {
            tensors.iter().map(|x| x.shape().to_vec()).collect()
        };
        AmplitudeTemplate {
            t_shapes: shapes(&self.t),
            l_shapes: shapes(&self.l),
            orbital_shape: self.orbitals.as_ref().map(|(c, _)| c.dim()),
        }
    }

    pub fn len(&self) -> usize {
        self.template().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten `t`, then `l`, then `C` and `C_tilde` in row-major order
    pub fn linearize(&self) -> Array1<Complex64> {
        let mut flat = Vec::with_capacity(self.len());
        for tensor in self.t.iter().chain(self.l.iter()) {
            flat.extend(tensor.iter().copied());
        }
        if let Some((c, c_tilde)) = &self.orbitals {
            flat.extend(c.iter().copied());
            flat.extend(c_tilde.iter().copied());
        }
        Array1::from(flat)
    }

    /// Inverse of [`AmplitudeSet::linearize`]
    pub fn delinearize(flat: ArrayView1<Complex64>, template: &AmplitudeTemplate) -> Result<Self> {
        check_phase_slot(
            template
                .t_shapes
                .first()
                .map_or(0, |shape| shape.iter().product()),
        )?;
        let expected = template.len();
        if flat.len() != expected {
            return Err(CoupledClusterError::ShapeMismatch {
                context: "amplitude vector",
                expected,
                found: flat.len(),
            });
        }

        let mut offset = 0;
        let mut take = |size: usize| {
            let chunk = flat.slice(ndarray::s![offset..offset + size]).to_vec();
            offset += size;
            chunk
        };

        let mut t = Vec::with_capacity(template.t_shapes.len());
        for shape in &template.t_shapes {
            let size = shape.iter().product();
            t.push(ArrayD::from_shape_vec(IxDyn(shape), take(size))?);
        }
        let mut l = Vec::with_capacity(template.l_shapes.len());
        for shape in &template.l_shapes {
            let size = shape.iter().product();
            l.push(ArrayD::from_shape_vec(IxDyn(shape), take(size))?);
        }
        let orbitals = match template.orbital_shape {
            Some((n_basis, n_working)) => {
                let size = n_basis * n_working;
                let c = Array2::from_shape_vec((n_basis, n_working), take(size))?;
                let c_tilde = Array2::from_shape_vec((n_working, n_basis), take(size))?;
                Some((c, c_tilde))
            }
            None => None,
        };

        Ok(AmplitudeSet { t, l, orbitals })
    }
}

/// `t[0]` holds exactly one element
fn check_phase_slot(phase_len: usize) -> Result<()> {
    if phase_len != 1 {
        return Err(CoupledClusterError::ShapeMismatch {
            context: "phase amplitude",
            expected: 1,
            found: phase_len,
        });
    }
    Ok(())
}

/// Concatenate tensors into one vector for the mixer
pub(crate) fn concatenate(tensors: &[ArrayD<Complex64>]) -> Array1<Complex64> {
    tensors
        .iter()
        .flat_map(|tensor| tensor.iter().copied())
        .collect()
}

/// Split a mixer vector back into tensors shaped like `like`
pub(crate) fn split(
    flat: &Array1<Complex64>,
    like: &[ArrayD<Complex64>],
) -> Result<Vec<ArrayD<Complex64>>> {
    let expected: usize = like.iter().map(|x| x.len()).sum();
    if flat.len() != expected {
        return Err(CoupledClusterError::ShapeMismatch {
            context: "mixer vector",
            expected,
            found: flat.len(),
        });
    }

    let mut offset = 0;
    let mut out = Vec::with_capacity(like.len());
    for tensor in like {
        let size = tensor.len();
        let chunk = flat.slice(ndarray::s![offset..offset + size]).to_vec();
        out.push(ArrayD::from_shape_vec(tensor.raw_dim(), chunk)?);
        offset += size;
    }
    Ok(out)
}
