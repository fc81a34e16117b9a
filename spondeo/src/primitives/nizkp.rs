use crate::{hash_to_scalar, Rng};
use ark_ec::{AffineCurve, ProjectiveCurve};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, Read, SerializationError, Write};
use serde::{Deserialize, Serialize};

/// Non-interactive proof of discrete-log equality: knowledge of `alpha`
/// such that `y_1 = alpha · x_1` and `y_2 = alpha · x_2`, Fiat-Shamir
/// transformed under a caller-supplied transcript tag.
#[derive(
    Serialize,
    Deserialize,
    CanonicalSerialize,
    CanonicalDeserialize,
    Copy,
    Clone,
    Debug,
    PartialEq,
)]
#[serde(bound = "")]
pub struct NIZKP<A: AffineCurve> {
    #[serde(with = "crate::ark_serde")]
    pub c: A::ScalarField,
    #[serde(with = "crate::ark_serde")]
    pub r: A::ScalarField,
}

impl<A: AffineCurve> NIZKP<A> {
    pub fn dleq<R: Rng>(
        tag: &[u8],
        x_1: &A,
        y_1: &A,
        x_2: &A,
        y_2: &A,
        alpha: &A::ScalarField,
        rng: &mut R,
    ) -> Self {
        use ark_std::UniformRand;
        let w = A::ScalarField::rand(rng);
        let t_1 = x_1.mul(w).into_affine();
        let t_2 = x_2.mul(w).into_affine();
        let c = Self::challenge(tag, x_1, y_1, x_2, y_2, &t_1, &t_2);
        let r = w - *alpha * c;
        Self { c, r }
    }

    pub fn dleq_verify(&self, tag: &[u8], x_1: &A, y_1: &A, x_2: &A, y_2: &A) -> bool {
        let t_1 = (x_1.mul(self.r) + y_1.mul(self.c)).into_affine();
        let t_2 = (x_2.mul(self.r) + y_2.mul(self.c)).into_affine();
        self.c == Self::challenge(tag, x_1, y_1, x_2, y_2, &t_1, &t_2)
    }

    fn challenge(
        tag: &[u8],
        x_1: &A,
        y_1: &A,
        x_2: &A,
        y_2: &A,
        t_1: &A,
        t_2: &A,
    ) -> A::ScalarField {
        let mut buf = vec![];
        for p in &[x_1, y_1, x_2, y_2, t_1, t_2] {
            p.serialize(&mut buf).unwrap();
        }
        hash_to_scalar(tag, &buf)
    }
}
