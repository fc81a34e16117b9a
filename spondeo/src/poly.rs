//! Secret polynomials, public commitments and Lagrange recovery.
//!
//! Shares are evaluations at `x = i + 1` so that the secret, sitting at
//! `x = 0`, is never handed out as a share.

use crate::{Error, Result, Rng};
use ark_ec::{AffineCurve, ProjectiveCurve};
use ark_ff::{Field, One, PrimeField, Zero};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A share of a secret polynomial, evaluated for the participant at `i`.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq)]
#[serde(bound = "")]
pub struct PriShare<F: PrimeField> {
    pub i: u32,
    #[serde(with = "crate::ark_serde")]
    pub v: F,
}

/// A private polynomial of degree `t - 1`. The constant coefficient is the
/// secret; the rest are sampled uniformly. Dropped as soon as its shares
/// and commitments have been derived.
#[derive(Clone, Debug, PartialEq)]
pub struct Private<F: PrimeField> {
    coeffs: Vec<F>,
}

impl<F: PrimeField> Private<F> {
    /// A random polynomial with `t` coefficients, secret included.
    pub fn random<R: Rng>(t: usize, rng: &mut R) -> Self {
        use ark_std::UniformRand;
        Self {
            coeffs: (0..t).map(|_| F::rand(rng)).collect(),
        }
    }

    /// A random polynomial whose constant coefficient is `secret`.
    pub fn with_secret<R: Rng>(t: usize, secret: F, rng: &mut R) -> Self {
        let mut poly = Self::random(t, rng);
        poly.coeffs[0] = secret;
        poly
    }

    pub fn threshold(&self) -> usize {
        self.coeffs.len()
    }

    pub fn secret(&self) -> F {
        self.coeffs[0]
    }

    /// The share for participant `i`, i.e. the evaluation at `x = i + 1`.
    pub fn eval(&self, i: u32) -> F {
        self.eval_at(F::from(u64::from(i) + 1))
    }

    fn eval_at(&self, x: F) -> F {
        let mut acc = F::zero();
        for coeff in self.coeffs.iter().rev() {
            acc = acc * x + coeff;
        }
        acc
    }

    /// All `n` shares of this polynomial.
    pub fn split(&self, n: usize) -> Vec<F> {
        (0..n).map(|i| self.eval(i as u32)).collect()
    }

    /// Commit every coefficient against `base`.
    pub fn commit<A: AffineCurve<ScalarField = F>>(&self, base: &A) -> Public<A> {
        Public {
            base: *base,
            commits: self
                .coeffs
                .iter()
                .map(|coeff| base.mul(*coeff).into_affine())
                .collect(),
        }
    }
}

/// Public commitments to the coefficients of a private polynomial, taken
/// against a fixed base. Lives for the whole protocol session.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(bound = "")]
pub struct Public<A: AffineCurve> {
    #[serde(with = "crate::ark_serde")]
    base: A,
    #[serde(with = "crate::ark_serde")]
    commits: Vec<A>,
}

impl<A: AffineCurve> Public<A> {
    pub(crate) fn from_commitments(base: A, commits: Vec<A>) -> Self {
        Self { base, commits }
    }

    pub fn threshold(&self) -> usize {
        self.commits.len()
    }

    pub fn commitments(&self) -> &[A] {
        &self.commits
    }

    /// The commitment to the constant coefficient, `secret · base`.
    pub fn secret_commit(&self) -> A {
        self.commits[0]
    }

    /// The committed evaluation for participant `i`.
    pub fn eval(&self, i: u32) -> A {
        eval_commits(&self.commits, i)
    }

    /// Whether `share` is consistent with the commitments for slot `i`.
    pub fn check(&self, i: u32, share: &A::ScalarField) -> bool {
        self.base.mul(*share) == self.eval(i).into_projective()
    }
}

/// Horner evaluation of a committed polynomial in the group, at `x = i + 1`.
pub fn eval_commits<A: AffineCurve>(commits: &[A], i: u32) -> A {
    let x = A::ScalarField::from(u64::from(i) + 1);
    let mut acc = A::Projective::zero();
    for commit in commits.iter().rev() {
        acc = acc.mul(x.into_repr());
        acc.add_assign_mixed(commit);
    }
    acc.into_affine()
}

/// Recover the secret by Lagrange interpolation at zero. At least `t`
/// shares with distinct indices are required; any such subset recovers the
/// same value.
pub fn recover<F: PrimeField>(shares: &[(u32, F)], t: usize) -> Result<F> {
    let mut unique: BTreeMap<u32, F> = BTreeMap::new();
    for (i, v) in shares {
        unique.entry(*i).or_insert(*v);
    }
    if unique.len() < t {
        return Err(Error::InvalidParameters);
    }
    let xs: Vec<F> = unique.keys().map(|i| F::from(u64::from(*i) + 1)).collect();

    let mut acc = F::zero();
    for (j, v) in unique.values().enumerate() {
        let mut num = F::one();
        let mut den = F::one();
        for (m, x_m) in xs.iter().enumerate() {
            if m == j {
                continue;
            }
            num *= *x_m;
            den *= *x_m - xs[j];
        }
        // den is a product of differences of distinct evaluation points
        acc += *v * num * den.inverse().ok_or(Error::InvalidParameters)?;
    }
    Ok(acc)
}
