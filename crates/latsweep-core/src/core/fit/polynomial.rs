use nalgebra::{DMatrix, DVector};
use thiserror::Error;

const SVD_EPSILON: f64 = 1e-14;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum FitError {
    #[error("Mismatched data lengths: {x} abscissae but {y} ordinates")]
    LengthMismatch { x: usize, y: usize },
    #[error("A degree-{degree} fit needs at least {required} points, got {available}")]
    InsufficientPoints {
        degree: usize,
        required: usize,
        available: usize,
    },
    #[error("Data contains a non-finite value at index {0}")]
    NonFinite(usize),
    #[error("Least-squares solve failed: {0}")]
    Solver(&'static str),
    #[error("No minimum found: {0}")]
    NoMinimum(String),
}

/// Returns `n` evenly spaced samples over `[start, end]`, both endpoints included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut values: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            values[n - 1] = end;
            values
        }
    }
}

/// A real polynomial stored with ascending coefficients: `c[0] + c[1] x + c[2] x^2 + ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    /// Least-squares fit of a polynomial of the given degree.
    ///
    /// The Vandermonde system is solved through its singular value decomposition, so
    /// repeated abscissae or mildly ill-conditioned data still produce a minimum-norm
    /// solution.
    ///
    /// # Errors
    ///
    /// Returns [`FitError`] if the inputs differ in length, contain NaN or infinity, or
    /// hold fewer than `degree + 1` points.
    pub fn fit(xs: &[f64], ys: &[f64], degree: usize) -> Result<Self, FitError> {
        if xs.len() != ys.len() {
            return Err(FitError::LengthMismatch {
                x: xs.len(),
                y: ys.len(),
            });
        }
        if xs.len() < degree + 1 {
            return Err(FitError::InsufficientPoints {
                degree,
                required: degree + 1,
                available: xs.len(),
            });
        }
        if let Some(i) = xs
            .iter()
            .zip(ys)
            .position(|(x, y)| !x.is_finite() || !y.is_finite())
        {
            return Err(FitError::NonFinite(i));
        }

        // Scale the abscissae into [-1, 1] to keep the Vandermonde matrix well conditioned.
        let (lo, hi) = xs
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
                (lo.min(x), hi.max(x))
            });
        let center = 0.5 * (lo + hi);
        let half_width = if hi > lo { 0.5 * (hi - lo) } else { 1.0 };

        let vandermonde = DMatrix::from_fn(xs.len(), degree + 1, |i, j| {
            ((xs[i] - center) / half_width).powi(j as i32)
        });
        let rhs = DVector::from_column_slice(ys);
        let solution = vandermonde
            .svd(true, true)
            .solve(&rhs, SVD_EPSILON)
            .map_err(FitError::Solver)?;

        let scaled = Polynomial::new(solution.iter().copied().collect());
        Ok(scaled.unscale(center, half_width))
    }

    /// Rewrites `p((x - center) / scale)` as a polynomial in `x`.
    fn unscale(&self, center: f64, scale: f64) -> Self {
        // Horner in polynomial arithmetic: result = result * t + c, t = (x - center) / scale.
        let mut result = vec![0.0; self.coefficients.len()];
        let t = [-center / scale, 1.0 / scale];
        for &c in self.coefficients.iter().rev() {
            let mut next = vec![0.0; result.len()];
            for (i, &r) in result.iter().enumerate() {
                if r == 0.0 {
                    continue;
                }
                next[i] += r * t[0];
                if i + 1 < next.len() {
                    next[i + 1] += r * t[1];
                }
            }
            next[0] += c;
            result = next;
        }
        Polynomial::new(result)
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    #[inline]
    pub fn eval(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * x + c)
    }

    pub fn derivative(&self) -> Self {
        let coefficients = self
            .coefficients
            .iter()
            .enumerate()
            .skip(1)
            .map(|(power, &c)| c * power as f64)
            .collect();
        Polynomial::new(coefficients)
    }
}

/// Evaluates `poly` on an `n`-point inclusive grid over `[lo, hi]` and returns the first
/// grid point with the lowest value.
pub fn grid_minimum(poly: &Polynomial, lo: f64, hi: f64, n: usize) -> Option<(f64, f64)> {
    linspace(lo, hi, n)
        .into_iter()
        .map(|x| (x, poly.eval(x)))
        .fold(None, |best: Option<(f64, f64)>, (x, y)| match best {
            Some((_, best_y)) if best_y <= y => best,
            _ => Some((x, y)),
        })
}
