//! The Promise protocol: a dealer escrows a secret scalar with `n`
//! insurers so that any `t` of them can reconstruct it, and `r` insurer
//! approvals certify the escrow.
//!
//! Each share is masked with a hash of the Diffie-Hellman point between the
//! promiser's long-term key and the insurer's, so the whole [`Promise`] can
//! be published: only insurer `i` can strip the mask from `secrets[i]`, yet
//! everyone can check a revealed share against the public polynomial. An
//! insurer holding a malformed share proves it with a [`BlameProof`]; one
//! valid blame makes the promise permanently uncertifiable.

use crate::nizkp::NIZKP;
use crate::{hash_to_scalar, poly, schnorr, wire, Error, Keypair, Result, Rng};
use ark_ec::AffineCurve;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use itertools::Itertools;
use measure_time::print_time;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fiat-Shamir transcript tag for the Diffie-Hellman key proof in blames.
pub const PROTOCOL_NAME: &[u8] = b"Promise Protocol";

/// The fixed message insurers sign to approve a promise.
const SIG_MSG: &[u8] = b"Promise Signature";

/// The fixed message insurers sign to authenticate a blame proof.
const SIG_BLAME_MSG: &[u8] = b"Promise Blame Signature";

/// Domain tag of the hash turning a Diffie-Hellman point into a share mask.
const DH_DOMAIN: &[u8] = b"promise dh share mask";

/// Hash a Diffie-Hellman point into the scalar masking a share.
fn dh_secret<A: AffineCurve>(diffie_key: &A) -> A::ScalarField {
    let mut buf = vec![];
    diffie_key.serialize(&mut buf).unwrap();
    hash_to_scalar(DH_DOMAIN, &buf)
}

/// A promise to keep a secret recoverable: the public commitments to the
/// sharing polynomial together with one encrypted share per insurer.
/// Immutable once constructed.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(bound = "")]
pub struct Promise<A: AffineCurve> {
    /// Reconstruction threshold
    t: usize,
    /// Certification threshold, `t <= r <= n`
    r: usize,
    /// Number of insurers
    n: usize,
    /// Long-term public key of the promiser
    #[serde(with = "crate::ark_serde")]
    pub_key: A,
    /// Commitments to the sharing polynomial, against the group base
    pub_poly: poly::Public<A>,
    /// Long-term public keys of the insurers
    #[serde(with = "crate::ark_serde")]
    insurers: Vec<A>,
    /// The shares, each masked by the Diffie-Hellman scalar between the
    /// promiser and the insurer at the same index
    #[serde(with = "crate::ark_serde")]
    secrets: Vec<A::ScalarField>,
}

impl<A: AffineCurve> Promise<A> {
    /// Escrow `secret_pair.secret` with the given insurers. Requires
    /// `1 <= t <= r <= n`.
    pub fn new<R: Rng>(
        secret_pair: &Keypair<A>,
        long_pair: &Keypair<A>,
        t: usize,
        r: usize,
        insurers: Vec<A>,
        rng: &mut R,
    ) -> Result<Self> {
        print_time!("promise construction");
        let n = insurers.len();
        if t < 1 || t > r || r > n {
            return Err(Error::InvalidParameters);
        }
        let pripoly = poly::Private::with_secret(t, secret_pair.secret, rng);
        let pub_poly = pripoly.commit(&Keypair::<A>::base());
        let secrets = pripoly
            .split(n)
            .into_iter()
            .zip_eq(insurers.iter())
            .map(|(share, insurer)| share + dh_secret(&long_pair.shared_secret(insurer)))
            .collect();
        // the private polynomial is dropped here; only the commitments and
        // the masked shares survive
        Ok(Self {
            t,
            r,
            n,
            pub_key: long_pair.public,
            pub_poly,
            insurers,
            secrets,
        })
    }

    /// The promise identifier: the short-term public key of the promised
    /// secret, which is exactly the constant commitment of the public
    /// polynomial.
    pub fn id(&self) -> A {
        self.pub_poly.secret_commit()
    }

    pub fn threshold(&self) -> usize {
        self.t
    }

    pub fn certification_threshold(&self) -> usize {
        self.r
    }

    pub fn insurers(&self) -> &[A] {
        &self.insurers
    }

    pub fn public_key(&self) -> &A {
        &self.pub_key
    }

    pub fn pub_poly(&self) -> &poly::Public<A> {
        &self.pub_poly
    }

    fn decrypt_share(&self, i: usize, diffie_key: &A) -> A::ScalarField {
        self.secrets[i] - dh_secret(diffie_key)
    }

    /// Verify that the share at `i` decrypts to a value matching the public
    /// polynomial. Called by insurer `i` with its long-term keypair.
    pub fn verify_share(&self, i: usize, keypair: &Keypair<A>) -> Result<()> {
        if i >= self.n {
            return Err(Error::IndexOutOfRange);
        }
        if self.insurers[i] != keypair.public {
            return Err(Error::InvalidParameters);
        }
        let share = self.decrypt_share(i, &keypair.shared_secret(&self.pub_key));
        if !self.pub_poly.check(i as u32, &share) {
            return Err(Error::BadShare);
        }
        Ok(())
    }

    /// Strip the Diffie-Hellman mask from the share at `i`, typically after
    /// the promiser went silent and a client asked for reconstruction.
    pub fn reveal_share(&self, i: usize, keypair: &Keypair<A>) -> Result<A::ScalarField> {
        if i >= self.n {
            return Err(Error::IndexOutOfRange);
        }
        Ok(self.decrypt_share(i, &keypair.shared_secret(&self.pub_key)))
    }

    /// Check a share revealed by insurer `i` against the public polynomial.
    pub fn verify_revealed_share(&self, i: usize, share: &A::ScalarField) -> Result<()> {
        if i >= self.n {
            return Err(Error::IndexOutOfRange);
        }
        if !self.pub_poly.check(i as u32, share) {
            return Err(Error::BadShare);
        }
        Ok(())
    }

    /// Produce the approval signature for slot `i`. Call [`verify_share`]
    /// first.
    ///
    /// The signature covers a fixed message and is bound to the insurer's
    /// key only, not to this promise; replay across promises must be
    /// prevented by the transport envelope carrying it.
    ///
    /// [`verify_share`]: Promise::verify_share
    pub fn sign<R: Rng>(
        &self,
        i: usize,
        keypair: &Keypair<A>,
        rng: &mut R,
    ) -> Result<PromiseSignature> {
        if i >= self.n {
            return Err(Error::IndexOutOfRange);
        }
        Ok(PromiseSignature {
            signature: schnorr::sign::<A, _>(&keypair.secret, SIG_MSG, rng),
        })
    }

    /// Verify an approval signature against insurer `i`.
    pub fn verify_signature(&self, i: usize, sig: &PromiseSignature) -> Result<()> {
        self.verify_signature_msg(i, sig, SIG_MSG)
    }

    fn verify_signature_msg(&self, i: usize, sig: &PromiseSignature, msg: &[u8]) -> Result<()> {
        if i >= self.n {
            return Err(Error::IndexOutOfRange);
        }
        schnorr::verify(&self.insurers[i], msg, &sig.signature)
    }

    /// Build the proof that the share at `i` was maliciously constructed.
    /// Only worth calling after [`verify_share`] failed the polynomial
    /// check.
    ///
    /// [`verify_share`]: Promise::verify_share
    pub fn blame<R: Rng>(
        &self,
        i: usize,
        keypair: &Keypair<A>,
        rng: &mut R,
    ) -> Result<BlameProof<A>> {
        if i >= self.n {
            return Err(Error::IndexOutOfRange);
        }
        let diffie_key = keypair.shared_secret(&self.pub_key);
        let proof = NIZKP::dleq(
            PROTOCOL_NAME,
            &self.pub_key,
            &diffie_key,
            &Keypair::<A>::base(),
            &keypair.public,
            &keypair.secret,
            rng,
        );
        let mut diffie_key_proof = vec![];
        CanonicalSerialize::serialize(&proof, &mut diffie_key_proof).unwrap();
        Ok(BlameProof {
            diffie_key,
            diffie_key_proof,
            signature: PromiseSignature {
                signature: schnorr::sign::<A, _>(&keypair.secret, SIG_BLAME_MSG, rng),
            },
        })
    }

    /// Check whether a blame proof really convicts the promiser: the
    /// accuser's signature must verify, the Diffie-Hellman key must be
    /// proven legitimate, and the share it unlocks must *fail* the
    /// polynomial check. Returns `UnjustifiedBlame` when the share is fine.
    pub fn verify_blame(&self, i: usize, blame: &BlameProof<A>) -> Result<()> {
        if i >= self.n {
            return Err(Error::IndexOutOfRange);
        }
        self.verify_signature_msg(i, &blame.signature, SIG_BLAME_MSG)?;
        let proof: NIZKP<A> =
            CanonicalDeserialize::deserialize(&blame.diffie_key_proof[..]).map_err(|_| Error::BadProof)?;
        if !proof.dleq_verify(
            PROTOCOL_NAME,
            &self.pub_key,
            &blame.diffie_key,
            &Keypair::<A>::base(),
            &self.insurers[i],
        ) {
            return Err(Error::BadProof);
        }
        let share = self.decrypt_share(i, &blame.diffie_key);
        if self.pub_poly.check(i as u32, &share) {
            return Err(Error::UnjustifiedBlame);
        }
        Ok(())
    }

    /// Structural invariants, re-checked after decoding.
    fn verify_params(&self) -> Result<()> {
        if self.t < 1 || self.t > self.r || self.r > self.n {
            return Err(Error::InvalidParameters);
        }
        if self.insurers.len() != self.n
            || self.secrets.len() != self.n
            || self.pub_poly.threshold() != self.t
        {
            return Err(Error::InvalidParameters);
        }
        Ok(())
    }

    /// Encode as `n ‖ t ‖ r ‖ pubKey ‖ pubPoly ‖ insurers ‖ secrets`, all
    /// integers little-endian u32.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![];
        wire::put_u32(&mut buf, self.n as u32);
        wire::put_u32(&mut buf, self.t as u32);
        wire::put_u32(&mut buf, self.r as u32);
        wire::put(&mut buf, &self.pub_key);
        for commit in self.pub_poly.commitments() {
            wire::put(&mut buf, commit);
        }
        for insurer in &self.insurers {
            wire::put(&mut buf, insurer);
        }
        for secret in &self.secrets {
            wire::put(&mut buf, secret);
        }
        buf
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        let mut cur = wire::Cursor::new(buf);
        let n = cur.u32()? as usize;
        let t = cur.u32()? as usize;
        let r = cur.u32()? as usize;
        let pub_key = cur.point::<A>()?;
        let commits = (0..t).map(|_| cur.point::<A>()).collect::<Result<Vec<_>>>()?;
        let insurers = (0..n).map(|_| cur.point::<A>()).collect::<Result<Vec<_>>>()?;
        let secrets = (0..n)
            .map(|_| cur.scalar::<A::ScalarField>())
            .collect::<Result<Vec<_>>>()?;
        cur.finish()?;
        let promise = Self {
            t,
            r,
            n,
            pub_key,
            pub_poly: poly::Public::from_commitments(Keypair::<A>::base(), commits),
            insurers,
            secrets,
        };
        promise.verify_params()?;
        Ok(promise)
    }
}

/// An opaque approval or blame-authorship signature from an insurer.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PromiseSignature {
    signature: Vec<u8>,
}

impl PromiseSignature {
    /// Encode as `sigLen ‖ signature`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![];
        wire::put_u32(&mut buf, self.signature.len() as u32);
        buf.extend_from_slice(&self.signature);
        buf
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        let mut cur = wire::Cursor::new(buf);
        let len = cur.u32()? as usize;
        let signature = cur.take(len)?.to_vec();
        cur.finish()?;
        Ok(Self { signature })
    }
}

/// Evidence that the promiser handed insurer `i` a malformed share: the
/// Diffie-Hellman key unlocking `secrets[i]`, a proof that this key is the
/// legitimate one, and a signature by the accuser.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(bound = "")]
pub struct BlameProof<A: AffineCurve> {
    #[serde(with = "crate::ark_serde")]
    diffie_key: A,
    diffie_key_proof: Vec<u8>,
    signature: PromiseSignature,
}

impl<A: AffineCurve> BlameProof<A> {
    /// Encode as `proofLen ‖ sigMarshalLen ‖ diffieKey ‖ proof ‖ signature`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let sig = self.signature.to_bytes();
        let mut buf = vec![];
        wire::put_u32(&mut buf, self.diffie_key_proof.len() as u32);
        wire::put_u32(&mut buf, sig.len() as u32);
        wire::put(&mut buf, &self.diffie_key);
        buf.extend_from_slice(&self.diffie_key_proof);
        buf.extend_from_slice(&sig);
        buf
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        let mut cur = wire::Cursor::new(buf);
        let proof_len = cur.u32()? as usize;
        let sig_len = cur.u32()? as usize;
        let diffie_key = cur.point::<A>()?;
        let diffie_key_proof = cur.take(proof_len)?.to_vec();
        let signature = PromiseSignature::from_bytes(cur.take(sig_len)?)?;
        cur.finish()?;
        Ok(Self {
            diffie_key,
            diffie_key_proof,
            signature,
        })
    }
}

/// Per-observer mutable state for one promise: the recovered shares plus
/// the approval signatures and blame proofs collected so far.
#[derive(Clone, Debug)]
pub struct PromiseState<A: AffineCurve> {
    pub promise: Promise<A>,
    /// Clear shares revealed by insurers, keyed by insurer index
    shares: BTreeMap<u32, A::ScalarField>,
    signatures: Vec<Option<PromiseSignature>>,
    blames: Vec<Option<BlameProof<A>>>,
}

impl<A: AffineCurve> PromiseState<A> {
    pub fn new(promise: Promise<A>) -> Self {
        let n = promise.insurers.len();
        Self {
            promise,
            shares: BTreeMap::new(),
            signatures: vec![None; n],
            blames: vec![None; n],
        }
    }

    /// Record an approval signature for slot `i`. Verify it first with
    /// [`Promise::verify_signature`]; [`certified`] re-checks regardless.
    ///
    /// [`certified`]: PromiseState::certified
    pub fn add_signature(&mut self, i: usize, sig: PromiseSignature) -> Result<()> {
        if i >= self.promise.n {
            return Err(Error::IndexOutOfRange);
        }
        self.signatures[i] = Some(sig);
        Ok(())
    }

    /// Record a blame proof for slot `i`.
    pub fn add_blame(&mut self, i: usize, blame: BlameProof<A>) -> Result<()> {
        if i >= self.promise.n {
            return Err(Error::IndexOutOfRange);
        }
        self.blames[i] = Some(blame);
        Ok(())
    }

    /// Record a clear share revealed by insurer `i`. Check it first with
    /// [`Promise::verify_revealed_share`].
    pub fn add_share(&mut self, i: usize, share: A::ScalarField) -> Result<()> {
        if i >= self.promise.n {
            return Err(Error::IndexOutOfRange);
        }
        self.shares.insert(i as u32, share);
        Ok(())
    }

    /// Reconstruct the promised secret once at least `t` distinct shares
    /// have been revealed.
    pub fn reconstruct(&self) -> Result<A::ScalarField> {
        let shares: Vec<(u32, A::ScalarField)> =
            self.shares.iter().map(|(i, v)| (*i, *v)).collect();
        poly::recover(&shares, self.promise.t)
    }

    /// The certification predicate. A single verifying blame proof revokes
    /// the promise for good; otherwise at least `r` verifying approval
    /// signatures are required.
    pub fn certified(&self) -> Result<()> {
        print_time!("promise certification");
        self.promise.verify_params()?;
        let mut valid = 0;
        for i in 0..self.promise.n {
            if let Some(sig) = &self.signatures[i] {
                if self.promise.verify_signature(i, sig).is_ok() {
                    valid += 1;
                }
            }
            if let Some(blame) = &self.blames[i] {
                if self.promise.verify_blame(i, blame).is_ok() {
                    return Err(Error::CertificationRevoked);
                }
            }
        }
        if valid < self.promise.r {
            return Err(Error::NotEnoughApprovals);
        }
        Ok(())
    }
}

/// Factory functions for testing
#[cfg(test)]
mod test_common {
    pub use super::*;
    pub use crate::{Error, Keypair};
    pub use ark_std::UniformRand;

    pub type TestCurve = ark_pallas::Affine;
    pub type Scalar = ark_pallas::Fr;

    pub struct Setup {
        pub promise: Promise<TestCurve>,
        pub secret_pair: Keypair<TestCurve>,
        pub long_pair: Keypair<TestCurve>,
        pub insurers: Vec<Keypair<TestCurve>>,
    }

    /// An honest promise over fresh keys
    pub fn setup(t: usize, r: usize, n: usize) -> Setup {
        let rng = &mut ark_std::test_rng();
        let secret_pair = Keypair::<TestCurve>::new(rng);
        let long_pair = Keypair::<TestCurve>::new(rng);
        let insurers: Vec<Keypair<TestCurve>> =
            (0..n).map(|_| Keypair::new(rng)).collect();
        let promise = Promise::new(
            &secret_pair,
            &long_pair,
            t,
            r,
            insurers.iter().map(|k| k.public).collect(),
            rng,
        )
        .expect("Setup failed");
        Setup {
            promise,
            secret_pair,
            long_pair,
            insurers,
        }
    }
}




/// Test the wire codecs of the promise message types
#[cfg(test)]
mod test_wire {
    use super::test_common::*;

    /// Promises survive the binary round trip
    #[test]
    fn test_promise_round_trip() {
        let s = setup(3, 4, 5);
        let buf = s.promise.to_bytes();
        let decoded = Promise::<TestCurve>::from_bytes(&buf).expect("Test failed");
        assert_eq!(decoded, s.promise);
        // decoding still lets every insurer verify its share
        decoded.verify_share(0, &s.insurers[0]).expect("Test failed");
    }

    /// Truncated promise buffers are refused
    #[test]
    fn test_promise_truncated() {
        let s = setup(3, 4, 5);
        let buf = s.promise.to_bytes();
        assert_eq!(
            Promise::<TestCurve>::from_bytes(&buf[..buf.len() - 1]),
            Err(Error::DecodeError)
        );
        assert_eq!(Promise::<TestCurve>::from_bytes(&[]), Err(Error::DecodeError));
    }

    /// Decoded parameters are re-validated
    #[test]
    fn test_promise_decode_revalidates() {
        let s = setup(3, 4, 5);
        let buf = s.promise.to_bytes();
        // zero out the threshold field
        let mut tampered = buf.clone();
        tampered[4] = 0;
        // the pubPoly length changes with t, so either the structure or the
        // parameter check must refuse the buffer
        assert!(Promise::<TestCurve>::from_bytes(&tampered).is_err());
    }

    /// Signatures and blame proofs survive the binary round trip
    #[test]
    fn test_signature_and_blame_round_trip() {
        let rng = &mut ark_std::test_rng();
        let mut s = setup(3, 4, 5);
        let sig = s.promise.sign(0, &s.insurers[0], rng).expect("Test failed");
        let decoded =
            PromiseSignature::from_bytes(&sig.to_bytes()).expect("Test failed");
        assert_eq!(decoded, sig);
        s.promise.verify_signature(0, &decoded).expect("Test failed");

        s.promise.secrets[2] += Scalar::from(1u64);
        let blame = s.promise.blame(2, &s.insurers[2], rng).expect("Test failed");
        let decoded =
            BlameProof::<TestCurve>::from_bytes(&blame.to_bytes()).expect("Test failed");
        assert_eq!(decoded, blame);
        s.promise.verify_blame(2, &decoded).expect("Test failed");

        assert_eq!(
            BlameProof::<TestCurve>::from_bytes(&blame.to_bytes()[..8]),
            Err(Error::DecodeError)
        );
    }

    /// The serde representation round trips through bincode
    #[test]
    fn test_promise_serde() {
        let s = setup(3, 4, 5);
        let bytes = bincode::serialize(&s.promise).expect("Test failed");
        let decoded: Promise<TestCurve> =
            bincode::deserialize(&bytes).expect("Test failed");
        assert_eq!(decoded, s.promise);
    }
}
