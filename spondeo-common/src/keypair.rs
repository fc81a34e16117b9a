use ark_ec::{AffineCurve, ProjectiveCurve};
use serde::{Deserialize, Serialize};

/// A long-term identity on the protocol group: a secret scalar together
/// with the public point `secret · B`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Keypair<A: AffineCurve> {
    #[serde(with = "crate::ark_serde")]
    pub secret: A::ScalarField,
    #[serde(with = "crate::ark_serde")]
    pub public: A,
}

impl<A: AffineCurve> Keypair<A> {
    /// The generator every public key is taken against.
    pub fn base() -> A {
        A::prime_subgroup_generator()
    }

    pub fn new<R: crate::Rng>(rng: &mut R) -> Self {
        use ark_std::UniformRand;
        Self::from_secret(A::ScalarField::rand(rng))
    }

    pub fn from_secret(secret: A::ScalarField) -> Self {
        Self {
            secret,
            public: Self::base().mul(secret).into_affine(),
        }
    }

    /// The Diffie-Hellman point shared with the holder of `other`.
    pub fn shared_secret(&self, other: &A) -> A {
        other.mul(self.secret).into_affine()
    }
}
