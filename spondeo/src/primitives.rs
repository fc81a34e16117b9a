pub mod nizkp;
pub mod schnorr;

pub use nizkp::NIZKP;

use ark_ec::AffineCurve;
use ark_ff::PrimeField;

/// Hash arbitrary bytes into a scalar, separated by a domain tag.
pub fn hash_to_scalar<F: PrimeField>(domain: &[u8], bytes: &[u8]) -> F {
    let mut params = blake2b_simd::Params::new();
    params.hash_length(64);
    let mut hasher = params.to_state();
    hasher.update(domain);
    hasher.update(bytes);
    F::from_le_bytes_mod_order(hasher.finalize().as_bytes())
}

/// Hash arbitrary bytes into a point of unknown discrete log, separated by
/// a domain tag. Try-and-increment over a counter until the digest decodes
/// to a non-identity point of the prime-order subgroup.
pub fn hash_to_point<A: AffineCurve>(domain: &[u8], bytes: &[u8]) -> A {
    use ark_ff::Zero;
    let mut params = blake2b_simd::Params::new();
    params.hash_length(crate::wire::point_len::<A>());
    let mut ctr = 0u32;
    loop {
        let mut hasher = params.to_state();
        hasher.update(domain);
        hasher.update(bytes);
        hasher.update(&ctr.to_le_bytes());
        if let Some(p) = A::from_random_bytes(hasher.finalize().as_bytes()) {
            let p = p.mul_by_cofactor();
            if !p.is_zero() {
                return p;
            }
        }
        ctr += 1;
    }
}
