// Dense tensor helpers shared by the flavor, system and orbital-adaptive code

use nalgebra::DMatrix;
use ndarray::{Array2, Array4, ArrayView2, Zip};
use num_complex::Complex64;

/// Contract one axis of a rank-4 tensor with a matrix: `out[.., p, ..] = sum_a t[.., a, ..] mat[a, p]`
pub(crate) fn contract_axis(
    t: &Array4<Complex64>,
    axis: usize,
    mat: &Array2<Complex64>,
) -> Array4<Complex64> {
    let mut order: Vec<usize> = (0..4).filter(|&k| k != axis).collect();
    order.push(axis);

    let moved = t
        .view()
        .permuted_axes([order[0], order[1], order[2], order[3]]);
    let (d0, d1, d2, d3) = moved.dim();
    let flat = Array2::from_shape_fn((d0 * d1 * d2, d3), |(row, col)| {
        moved[[row / (d1 * d2), (row / d2) % d1, row % d2, col]]
    });
    let product = flat.dot(mat);
    let new_dim = mat.ncols();
    let stacked = Array4::from_shape_fn((d0, d1, d2, new_dim), |(a, b, c, d)| {
        product[[(a * d1 + b) * d2 + c, d]]
    });

    let mut inverse = [0usize; 4];
    for (position, &original) in order.iter().enumerate() {
        inverse[original] = position;
    }
    stacked
        .permuted_axes(inverse)
        .as_standard_layout()
        .into_owned()
}

/// Rank-4 tensor with every element computed by one rayon task
pub(crate) fn par_tensor4<F>(shape: (usize, usize, usize, usize), element: F) -> Array4<Complex64>
where
    F: Fn((usize, usize, usize, usize)) -> Complex64 + Sync + Send,
{
    let mut out = Array4::zeros(shape);
    Zip::indexed(&mut out).par_for_each(|index, x| *x = element(index));
    out
}

/// Matrix counterpart of [`par_tensor4`]
pub(crate) fn par_matrix<F>(shape: (usize, usize), element: F) -> Array2<Complex64>
where
    F: Fn((usize, usize)) -> Complex64 + Sync + Send,
{
    let mut out = Array2::zeros(shape);
    Zip::indexed(&mut out).par_for_each(|index, x| *x = element(index));
    out
}

/// Copy of `t` with two axes exchanged
pub(crate) fn swapped(t: &Array4<Complex64>, a: usize, b: usize) -> Array4<Complex64> {
    let mut view = t.view();
    view.swap_axes(a, b);
    view.as_standard_layout().into_owned()
}

/// `x - x(a<->b)`
pub(crate) fn antisymmetrize(t: &Array4<Complex64>, a: usize, b: usize) -> Array4<Complex64> {
    t - &swapped(t, a, b)
}

/// `x - x(a<->b) - x(c<->d) + x(a<->b, c<->d)`
pub(crate) fn antisymmetrize_both(
    t: &Array4<Complex64>,
    pair_one: (usize, usize),
    pair_two: (usize, usize),
) -> Array4<Complex64> {
    let first = antisymmetrize(t, pair_one.0, pair_one.1);
    antisymmetrize(&first, pair_two.0, pair_two.1)
}

/// Hermitian inner product `<x|y> = sum conj(x) * y`
pub(crate) fn inner_product<'a, I>(x: I, y: I) -> Complex64
where
    I: IntoIterator<Item = &'a Complex64>,
{
    x.into_iter()
        .zip(y)
        .map(|(a, b)| a.conj() * b)
        .sum()
}

pub(crate) fn to_dmatrix(a: ArrayView2<Complex64>) -> DMatrix<Complex64> {
    let (rows, cols) = a.dim();
    DMatrix::from_fn(rows, cols, |i, j| a[[i, j]])
}

pub(crate) fn from_dmatrix(m: &DMatrix<Complex64>) -> Array2<Complex64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

/// Largest and smallest singular values
pub(crate) fn singular_value_bounds(m: &DMatrix<Complex64>) -> (f64, f64) {
    let singular_values = m.clone().svd(false, false).singular_values;
    let max = singular_values.iter().cloned().fold(0.0, f64::max);
    let min = singular_values.iter().cloned().fold(f64::INFINITY, f64::min);
    (max, min)
}
