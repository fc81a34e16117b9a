//! Schnorr signatures over the protocol group. The signature is the
//! concatenation `R ‖ s` with `R = k·B` and `s = k + c·x` for the challenge
//! `c = H(R ‖ pub ‖ msg)`.

use crate::{hash_to_scalar, wire, Error, Result, Rng};
use ark_ec::{AffineCurve, ProjectiveCurve};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

const CHALLENGE_DOMAIN: &[u8] = b"schnorr signature challenge";

pub fn sign<A: AffineCurve, R: Rng>(
    private: &A::ScalarField,
    msg: &[u8],
    rng: &mut R,
) -> Vec<u8> {
    use ark_std::UniformRand;
    let k = A::ScalarField::rand(rng);
    let r = A::prime_subgroup_generator().mul(k).into_affine();
    let public = A::prime_subgroup_generator().mul(*private).into_affine();
    let c = challenge::<A>(&r, &public, msg);
    let s = k + c * *private;
    let mut sig = vec![];
    r.serialize(&mut sig).unwrap();
    s.serialize(&mut sig).unwrap();
    sig
}

pub fn verify<A: AffineCurve>(public: &A, msg: &[u8], sig: &[u8]) -> Result<()> {
    let point_len = wire::point_len::<A>();
    let scalar_len = wire::scalar_len::<A::ScalarField>();
    if sig.len() != point_len + scalar_len {
        return Err(Error::BadSignature);
    }
    let r = A::deserialize(&sig[..point_len]).map_err(|_| Error::BadSignature)?;
    let s =
        A::ScalarField::deserialize(&sig[point_len..]).map_err(|_| Error::BadSignature)?;
    let c = challenge::<A>(&r, public, msg);
    if A::prime_subgroup_generator().mul(s) == r.into_projective() + public.mul(c) {
        Ok(())
    } else {
        Err(Error::BadSignature)
    }
}

fn challenge<A: AffineCurve>(r: &A, public: &A, msg: &[u8]) -> A::ScalarField {
    let mut buf = vec![];
    r.serialize(&mut buf).unwrap();
    public.serialize(&mut buf).unwrap();
    buf.extend_from_slice(msg);
    hash_to_scalar(CHALLENGE_DOMAIN, &buf)
}
