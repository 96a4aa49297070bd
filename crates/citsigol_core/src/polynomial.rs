//! Dense real polynomials, just enough to compose the logistic map symbolically
//! and find the roots of the result.

use nalgebra::DMatrix;
use num_complex::Complex;
use num_traits::{Num, Zero};
use std::ops::{Mul, Sub};

/// Newton steps applied to every eigenvalue of the companion matrix.
const POLISH_STEPS: usize = 4;

/// Real polynomial stored as ascending coefficients: `coeffs[i]` multiplies `x^i`.
/// Trailing zeros are trimmed, so the last coefficient is the leading one
/// (except for the zero polynomial, stored as `[0.0]`).
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coeffs: Vec<f64>,
}

impl Polynomial {
    pub fn new(mut coeffs: Vec<f64>) -> Self {
        while coeffs.len() > 1 && coeffs.last() == Some(&0.0) {
            coeffs.pop();
        }
        if coeffs.is_empty() {
            coeffs.push(0.0);
        }
        Self { coeffs }
    }

    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// The polynomial `x`.
    pub fn identity() -> Self {
        Self::new(vec![0.0, 1.0])
    }

    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.len() == 1 && self.coeffs[0] == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.coeffs.iter().all(|c| c.is_finite())
    }

    /// Horner evaluation at a real or complex point.
    pub fn eval<T>(&self, x: T) -> T
    where
        T: Num + Copy + From<f64>,
    {
        self.coeffs
            .iter()
            .rev()
            .fold(T::zero(), |acc, &c| acc * x + T::from(c))
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self::new(self.coeffs.iter().map(|c| c * factor).collect())
    }

    pub fn derivative(&self) -> Self {
        if self.coeffs.len() < 2 {
            return Self::constant(0.0);
        }
        Self::new(
            self.coeffs
                .iter()
                .enumerate()
                .skip(1)
                .map(|(power, c)| c * power as f64)
                .collect(),
        )
    }

    /// `r * p * (1 - p)`: one more application of the logistic map to `p`.
    pub fn logistic_step(&self, r: f64) -> Self {
        let one_minus = &Self::constant(1.0) - self;
        (self * &one_minus).scale(r)
    }

    /// All complex roots, with multiplicity.
    ///
    /// Exact zero roots are factored out first; the rest are the eigenvalues of
    /// the companion matrix, refined with a few Newton steps.
    pub fn roots(&self) -> Vec<Complex<f64>> {
        let zeros = self.coeffs.iter().take_while(|c| **c == 0.0).count();
        if zeros == self.coeffs.len() {
            return Vec::new();
        }
        let mut roots = vec![Complex::zero(); zeros];
        let deflated = Self::new(self.coeffs[zeros..].to_vec());
        let n = deflated.degree();
        if n == 0 {
            return roots;
        }

        let lead = deflated.coeffs[n];
        let mut companion = DMatrix::<f64>::zeros(n, n);
        for i in 1..n {
            companion[(i, i - 1)] = 1.0;
        }
        for i in 0..n {
            companion[(i, n - 1)] = -deflated.coeffs[i] / lead;
        }

        let slope = deflated.derivative();
        roots.extend(
            companion
                .complex_eigenvalues()
                .iter()
                .map(|&z| deflated.polish(&slope, z)),
        );
        roots
    }

    fn polish(&self, slope: &Polynomial, mut z: Complex<f64>) -> Complex<f64> {
        let mut residual = self.eval(z).norm();
        for _ in 0..POLISH_STEPS {
            let d = slope.eval(z);
            if d.norm() == 0.0 {
                break;
            }
            let candidate = z - self.eval(z) / d;
            let candidate_residual = self.eval(candidate).norm();
            if !(candidate_residual < residual) {
                break;
            }
            z = candidate;
            residual = candidate_residual;
        }
        z
    }
}

impl<'a> Mul<&'a Polynomial> for &'a Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: &'a Polynomial) -> Polynomial {
        let mut out = vec![0.0; self.coeffs.len() + rhs.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            if *a == 0.0 {
                continue;
            }
            for (j, b) in rhs.coeffs.iter().enumerate() {
                out[i + j] += a * b;
            }
        }
        Polynomial::new(out)
    }
}

impl<'a> Sub<&'a Polynomial> for &'a Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: &'a Polynomial) -> Polynomial {
        let len = self.coeffs.len().max(rhs.coeffs.len());
        let coeff = |p: &Polynomial, i: usize| p.coeffs.get(i).copied().unwrap_or(0.0);
        let out = (0..len).map(|i| coeff(self, i) - coeff(rhs, i)).collect();
        Polynomial::new(out)
    }
}
