//! Pedersen verifiable secret sharing as a message-passing protocol.
//!
//! The dealer sends one [`Deal`] to each verifier; each verifier answers
//! with a broadcast [`Response`] approving or complaining about its deal;
//! the dealer answers complaints with a [`Justification`] revealing the
//! disputed deal in clear. Every message is bound to a session id hashing
//! the dealer key, verifier set, commitments and threshold, so deals from
//! one session cannot be confused with another. The protocol tolerates up
//! to `t - 1` malicious parties: the deal is certified once at least `t`
//! verifiers approved, fewer than `t` complaints stand and no
//! justification failed.

use crate::poly::{self, PriShare};
use crate::{hash_to_point, schnorr, wire, Error, Keypair, Result, Rng};
use ark_ec::{AffineCurve, ProjectiveCurve};
use ark_serialize::CanonicalSerialize;
use measure_time::print_time;
use num::integer::div_ceil;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Domain tag for deriving the Pedersen base `H` from the verifier set.
const H_DOMAIN: &[u8] = b"vss pedersen base";

/// Verdict a verifier reaches about its deal.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Complaint,
    Approval,
}

impl Status {
    fn as_byte(self) -> u8 {
        match self {
            Status::Complaint => 0,
            Status::Approval => 1,
        }
    }

    fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(Status::Complaint),
            1 => Ok(Status::Approval),
            _ => Err(Error::DecodeError),
        }
    }
}

/// The verifiable share of the secret sent privately to one verifier,
/// with the session-wide commitments and a dealer signature.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(bound = "")]
pub struct Deal<A: AffineCurve> {
    pub session_id: Vec<u8>,
    /// Share of the secret polynomial `f`
    pub sec_share: PriShare<A::ScalarField>,
    /// Share of the blinding polynomial `g`
    pub rnd_share: PriShare<A::ScalarField>,
    /// Threshold of this protocol run
    pub t: u32,
    /// Pedersen commitments `f_k · B + g_k · H`
    #[serde(with = "crate::ark_serde")]
    pub commitments: Vec<A>,
    /// Dealer Schnorr signature over the canonical deal body
    pub signature: Vec<u8>,
}

/// A verifier's broadcast verdict about the deal it received.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub session_id: Vec<u8>,
    /// Index of the verifier issuing the response
    pub index: u32,
    pub status: Status,
    /// Verifier Schnorr signature over the canonical response body
    pub signature: Vec<u8>,
}

/// The dealer's answer to a complaint, revealing the disputed deal.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(bound = "")]
pub struct Justification<A: AffineCurve> {
    pub session_id: Vec<u8>,
    /// Index of the complaining verifier
    pub index: u32,
    /// The deal originally sent to that verifier, in clear
    pub deal: Deal<A>,
    /// Dealer Schnorr signature over the canonical justification body
    pub signature: Vec<u8>,
}

/// The canonical byte string a dealer signs for a deal.
pub fn msg_deal<A: AffineCurve>(d: &Deal<A>) -> Vec<u8> {
    let mut buf = b"deal".to_vec();
    buf.extend_from_slice(&d.session_id);
    wire::put_u32(&mut buf, d.sec_share.i);
    wire::put(&mut buf, &d.sec_share.v);
    wire::put_u32(&mut buf, d.rnd_share.i);
    wire::put(&mut buf, &d.rnd_share.v);
    buf
}

/// The canonical byte string a verifier signs for a response.
pub fn msg_response(r: &Response) -> Vec<u8> {
    let mut buf = b"response".to_vec();
    buf.extend_from_slice(&r.session_id);
    wire::put_u32(&mut buf, r.index);
    buf.push(r.status.as_byte());
    buf
}

/// The canonical byte string a dealer signs for a justification.
pub fn msg_justification<A: AffineCurve>(j: &Justification<A>) -> Vec<u8> {
    let mut buf = b"justification".to_vec();
    buf.extend_from_slice(&j.session_id);
    wire::put_u32(&mut buf, j.index);
    buf.extend_from_slice(&msg_deal(&j.deal));
    buf
}

/// The session identifier binding a dealer, a verifier set, a commitment
/// vector and a threshold.
pub fn session_id<A: AffineCurve>(
    dealer: &A,
    verifiers: &[A],
    commitments: &[A],
    t: usize,
) -> Vec<u8> {
    let mut buf = vec![];
    dealer.serialize(&mut buf).unwrap();
    for v in verifiers {
        v.serialize(&mut buf).unwrap();
    }
    for c in commitments {
        c.serialize(&mut buf).unwrap();
    }
    wire::put_u32(&mut buf, t as u32);
    let mut params = blake2b_simd::Params::new();
    params.hash_length(32);
    let mut hasher = params.to_state();
    hasher.update(&buf);
    hasher.finalize().as_bytes().to_vec()
}

/// The Pedersen base `H`, derived from the concatenated verifier keys so
/// that its discrete log relative to `B` is unknown to every participant.
pub fn derive_h<A: AffineCurve>(verifiers: &[A]) -> A {
    let mut buf = vec![];
    for v in verifiers {
        v.serialize(&mut buf).unwrap();
    }
    hash_to_point(H_DOMAIN, &buf)
}

fn valid_t(t: usize, n: usize) -> bool {
    t >= 2 && t <= n
}

/// The smallest threshold proven secure for `n` verifiers. A lower `t`
/// voids the security of the scheme; a higher one only makes the secret
/// harder to reconstruct.
pub fn minimum_t(n: usize) -> usize {
    div_ceil(n + 1, 2)
}

/// Collects the deal, responses and justifications of one protocol run.
/// Embedded by both [`Dealer`] and [`Verifier`]; once the session id,
/// commitments and deal are bound they never change.
#[derive(Clone, Debug)]
pub struct Aggregator<A: AffineCurve> {
    dealer: A,
    verifiers: Vec<A>,
    commits: Vec<A>,
    responses: BTreeMap<u32, Response>,
    /// Indices whose complaint the dealer has justified
    justified: BTreeSet<u32>,
    sid: Vec<u8>,
    deal: Option<Deal<A>>,
    t: usize,
    bad_dealer: bool,
}

impl<A: AffineCurve> Aggregator<A> {
    fn new(dealer: A, verifiers: Vec<A>, commits: Vec<A>, t: usize, sid: Vec<u8>) -> Self {
        Self {
            dealer,
            verifiers,
            commits,
            responses: BTreeMap::new(),
            justified: BTreeSet::new(),
            sid,
            deal: None,
            t,
            bad_dealer: false,
        }
    }

    /// Verify a deal against this session. With `inclusion`, the deal is
    /// also bound as *the* deal of the session, and a second one is
    /// refused.
    pub fn verify_deal(&mut self, d: &Deal<A>, inclusion: bool) -> Result<()> {
        if self.deal.is_some() && inclusion {
            return Err(Error::DealAlreadyProcessed);
        }
        if self.deal.is_none() {
            self.commits = d.commitments.clone();
            self.sid = d.session_id.clone();
            self.deal = Some(d.clone());
        }

        if !valid_t(d.t as usize, self.verifiers.len()) {
            return Err(Error::InvalidParameters);
        }
        if self.sid != d.session_id {
            return Err(Error::BadSessionID);
        }
        schnorr::verify(&self.dealer, &msg_deal(d), &d.signature)?;

        let fi = &d.sec_share;
        let gi = &d.rnd_share;
        if fi.i != gi.i {
            return Err(Error::IndexOutOfRange);
        }
        if fi.i as usize >= self.verifiers.len() {
            return Err(Error::IndexOutOfRange);
        }
        // fi·B + gi·H must equal the bound commitments evaluated at i
        let h = derive_h(&self.verifiers);
        let ci = Keypair::<A>::base().mul(fi.v) + h.mul(gi.v);
        if ci != poly::eval_commits(&self.commits, fi.i).into_projective() {
            return Err(Error::BadShare);
        }
        Ok(())
    }

    fn verify_response(&mut self, r: &Response) -> Result<()> {
        if self.sid != r.session_id {
            return Err(Error::BadSessionID);
        }
        let public = self
            .verifiers
            .get(r.index as usize)
            .ok_or(Error::IndexOutOfRange)?;
        schnorr::verify(public, &msg_response(r), &r.signature)?;
        self.add_response(r)
    }

    fn verify_justification(&mut self, j: &Justification<A>) -> Result<()> {
        if j.index as usize >= self.verifiers.len() {
            return Err(Error::IndexOutOfRange);
        }
        match self.responses.get(&j.index) {
            Some(r) if r.status == Status::Complaint && !self.justified.contains(&j.index) => {}
            _ => return Err(Error::UnexpectedJustification),
        }
        schnorr::verify(&self.dealer, &msg_justification(j), &j.signature)?;
        if let Err(err) = self.verify_deal(&j.deal, false) {
            // a complaint the dealer cannot justify convicts the dealer
            self.bad_dealer = true;
            return Err(err);
        }
        self.justified.insert(j.index);
        Ok(())
    }

    fn add_response(&mut self, r: &Response) -> Result<()> {
        if r.index as usize >= self.verifiers.len() {
            return Err(Error::IndexOutOfRange);
        }
        if self.responses.contains_key(&r.index) {
            return Err(Error::DuplicateResponse);
        }
        self.responses.insert(r.index, r.clone());
        Ok(())
    }

    /// At least `t` verifiers approved their deal. Justified complaints do
    /// not count as approvals.
    pub fn enough_approvals(&self) -> bool {
        let approvals = self
            .responses
            .values()
            .filter(|r| r.status == Status::Approval)
            .count();
        approvals >= self.t
    }

    /// Certified: enough approvals, fewer than `t` standing complaints and
    /// no failed justification.
    pub fn deal_certified(&self) -> bool {
        let complaints = self
            .responses
            .values()
            .filter(|r| r.status == Status::Complaint && !self.justified.contains(&r.index))
            .count();
        self.enough_approvals() && !(complaints >= self.t || self.bad_dealer)
    }

    pub fn responses(&self) -> &BTreeMap<u32, Response> {
        &self.responses
    }

    pub fn session_id(&self) -> &[u8] {
        &self.sid
    }

    /// Sticky flag set by a failed justification; the session cannot
    /// recover from it.
    pub fn bad_dealer(&self) -> bool {
        self.bad_dealer
    }
}

/// Dealer side of the protocol: builds the deals and answers complaints.
#[derive(Debug)]
pub struct Dealer<A: AffineCurve> {
    long: A::ScalarField,
    public: A,
    secret: A::ScalarField,
    /// Commitments `f_k · B` to the secret polynomial alone
    secret_commits: Vec<A>,
    session_id: Vec<u8>,
    deals: Vec<Deal<A>>,
    aggregator: Aggregator<A>,
}

impl<A: AffineCurve> Dealer<A> {
    /// Share `secret` among `verifiers` so that any `t` of them can
    /// reconstruct it. Use a threshold of at least [`minimum_t`].
    pub fn new<R: Rng>(
        long: A::ScalarField,
        secret: A::ScalarField,
        verifiers: Vec<A>,
        t: usize,
        rng: &mut R,
    ) -> Result<Self> {
        print_time!("vss dealing");
        if !valid_t(t, verifiers.len()) {
            return Err(Error::InvalidParameters);
        }
        let h = derive_h(&verifiers);
        let f = poly::Private::with_secret(t, secret, rng);
        let g = poly::Private::random(t, rng);
        let public = Keypair::<A>::base().mul(long).into_affine();

        let f_commits = f.commit(&Keypair::<A>::base());
        let g_commits = g.commit(&h);
        let commitments: Vec<A> = f_commits
            .commitments()
            .iter()
            .zip(g_commits.commitments())
            .map(|(fc, gc)| (fc.into_projective() + gc.into_projective()).into_affine())
            .collect();
        let secret_commits = f_commits.commitments().to_vec();

        let sid = session_id(&public, &verifiers, &commitments, t);
        let deals = (0..verifiers.len())
            .map(|i| {
                let mut deal = Deal {
                    session_id: sid.clone(),
                    sec_share: PriShare {
                        i: i as u32,
                        v: f.eval(i as u32),
                    },
                    rnd_share: PriShare {
                        i: i as u32,
                        v: g.eval(i as u32),
                    },
                    t: t as u32,
                    commitments: commitments.clone(),
                    signature: vec![],
                };
                deal.signature = schnorr::sign::<A, _>(&long, &msg_deal(&deal), rng);
                deal
            })
            .collect();
        // f and g are dropped here
        let aggregator = Aggregator::new(public, verifiers, commitments, t, sid.clone());
        Ok(Self {
            long,
            public,
            secret,
            secret_commits,
            session_id: sid,
            deals,
            aggregator,
        })
    }

    /// The deals, one per verifier; each must be sent privately to the
    /// verifier at its index.
    pub fn deals(&self) -> &[Deal<A>] {
        &self.deals
    }

    /// Process a broadcast response. A valid complaint yields the
    /// justification to broadcast in return.
    pub fn process_response<R: Rng>(
        &mut self,
        r: &Response,
        rng: &mut R,
    ) -> Result<Option<Justification<A>>> {
        self.aggregator.verify_response(r)?;
        if r.status == Status::Approval {
            return Ok(None);
        }
        let mut justification = Justification {
            session_id: self.session_id.clone(),
            // the index was range-checked while verifying the response
            index: r.index,
            deal: self.deals[r.index as usize].clone(),
            signature: vec![],
        };
        justification.signature =
            schnorr::sign::<A, _>(&self.long, &msg_justification(&justification), rng);
        Ok(Some(justification))
    }

    /// The commitment `secret · B`, available once the deal is certified.
    pub fn secret_commit(&self) -> Option<A> {
        if !self.aggregator.enough_approvals() || !self.aggregator.deal_certified() {
            return None;
        }
        Some(Keypair::<A>::base().mul(self.secret).into_affine())
    }

    /// The commitments to the coefficients of the secret polynomial,
    /// available once the deal is certified.
    pub fn commits(&self) -> Option<&[A]> {
        if !self.aggregator.enough_approvals() || !self.aggregator.deal_certified() {
            return None;
        }
        Some(&self.secret_commits)
    }

    pub fn public_key(&self) -> &A {
        &self.public
    }

    pub fn session_id(&self) -> &[u8] {
        &self.session_id
    }

    pub fn enough_approvals(&self) -> bool {
        self.aggregator.enough_approvals()
    }

    pub fn deal_certified(&self) -> bool {
        self.aggregator.deal_certified()
    }

    pub fn responses(&self) -> &BTreeMap<u32, Response> {
        self.aggregator.responses()
    }
}

/// Verifier side of the protocol: checks its deal and votes approval or
/// complaint.
#[derive(Debug)]
pub struct Verifier<A: AffineCurve> {
    long: A::ScalarField,
    public: A,
    dealer: A,
    index: usize,
    verifiers: Vec<A>,
    aggregator: Option<Aggregator<A>>,
}

impl<A: AffineCurve> Verifier<A> {
    /// Fails with `NotAVerifier` when `long`'s public key is absent from
    /// the verifier set.
    pub fn new(long: A::ScalarField, dealer: A, verifiers: Vec<A>) -> Result<Self> {
        let public = Keypair::<A>::base().mul(long).into_affine();
        let index = verifiers
            .iter()
            .position(|v| *v == public)
            .ok_or(Error::NotAVerifier)?;
        Ok(Self {
            long,
            public,
            dealer,
            index,
            verifiers,
            aggregator: None,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn public_key(&self) -> &A {
        &self.public
    }

    /// The session id, once a deal has been seen.
    pub fn session_id(&self) -> Option<&[u8]> {
        self.aggregator.as_ref().map(|a| a.session_id())
    }

    /// Process the deal addressed to this verifier, producing the signed
    /// response to broadcast. The session id is recomputed from the deal's
    /// own commitments and must match; a second deal is refused.
    pub fn process_deal<R: Rng>(&mut self, d: &Deal<A>, rng: &mut R) -> Result<Response> {
        if d.sec_share.i as usize != self.index {
            return Err(Error::IndexOutOfRange);
        }
        let sid = session_id(&self.dealer, &self.verifiers, &d.commitments, d.t as usize);
        if sid != d.session_id {
            return Err(Error::BadSessionID);
        }
        if self.aggregator.is_none() {
            self.aggregator = Some(Aggregator::new(
                self.dealer,
                self.verifiers.clone(),
                d.commitments.clone(),
                d.t as usize,
                d.session_id.clone(),
            ));
        }
        let aggregator = match &mut self.aggregator {
            Some(aggregator) => aggregator,
            None => return Err(Error::BadSessionID),
        };
        let status = match aggregator.verify_deal(d, true) {
            Ok(()) => Status::Approval,
            Err(Error::DealAlreadyProcessed) => return Err(Error::DealAlreadyProcessed),
            Err(_) => Status::Complaint,
        };
        let mut response = Response {
            session_id: sid,
            index: self.index as u32,
            status,
            signature: vec![],
        };
        response.signature = schnorr::sign::<A, _>(&self.long, &msg_response(&response), rng);
        aggregator.add_response(&response)?;
        Ok(response)
    }

    /// Process a broadcast response from another verifier.
    pub fn process_response(&mut self, r: &Response) -> Result<()> {
        match &mut self.aggregator {
            Some(aggregator) => aggregator.verify_response(r),
            None => Err(Error::BadSessionID),
        }
    }

    /// Process a dealer justification answering a stored complaint. A
    /// failing justification permanently flags the dealer.
    pub fn process_justification(&mut self, j: &Justification<A>) -> Result<()> {
        match &mut self.aggregator {
            Some(aggregator) => aggregator.verify_justification(j),
            None => Err(Error::BadSessionID),
        }
    }

    /// The deal this verifier received, once the session is certified.
    pub fn deal(&self) -> Option<&Deal<A>> {
        let aggregator = self.aggregator.as_ref()?;
        if !aggregator.enough_approvals() || !aggregator.deal_certified() {
            return None;
        }
        aggregator.deal.as_ref()
    }

    pub fn enough_approvals(&self) -> bool {
        self.aggregator
            .as_ref()
            .map(Aggregator::enough_approvals)
            .unwrap_or(false)
    }

    pub fn deal_certified(&self) -> bool {
        self.aggregator
            .as_ref()
            .map(Aggregator::deal_certified)
            .unwrap_or(false)
    }

    pub fn responses(&self) -> Option<&BTreeMap<u32, Response>> {
        self.aggregator.as_ref().map(Aggregator::responses)
    }
}

/// Reconstruct the shared secret from at least `t` deals revealed by the
/// verifiers. All deals must carry the same session id.
pub fn recover_secret<A: AffineCurve>(deals: &[Deal<A>], t: usize) -> Result<A::ScalarField> {
    let first = deals.first().ok_or(Error::InvalidParameters)?;
    let mut shares = Vec::with_capacity(deals.len());
    for d in deals {
        if d.session_id != first.session_id {
            return Err(Error::BadSessionID);
        }
        shares.push((d.sec_share.i, d.sec_share.v));
    }
    poly::recover(&shares, t)
}

impl<A: AffineCurve> Deal<A> {
    /// Encode with the session id, commitment vector and signature length
    /// prefixed, integers little-endian u32.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![];
        wire::put_u32(&mut buf, self.session_id.len() as u32);
        buf.extend_from_slice(&self.session_id);
        wire::put_u32(&mut buf, self.sec_share.i);
        wire::put(&mut buf, &self.sec_share.v);
        wire::put_u32(&mut buf, self.rnd_share.i);
        wire::put(&mut buf, &self.rnd_share.v);
        wire::put_u32(&mut buf, self.t);
        wire::put_u32(&mut buf, self.commitments.len() as u32);
        for c in &self.commitments {
            wire::put(&mut buf, c);
        }
        wire::put_u32(&mut buf, self.signature.len() as u32);
        buf.extend_from_slice(&self.signature);
        buf
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        let mut cur = wire::Cursor::new(buf);
        let deal = Self::decode(&mut cur)?;
        cur.finish()?;
        Ok(deal)
    }

    fn decode(cur: &mut wire::Cursor) -> Result<Self> {
        let sid_len = cur.u32()? as usize;
        let session_id = cur.take(sid_len)?.to_vec();
        let sec_share = PriShare {
            i: cur.u32()?,
            v: cur.scalar::<A::ScalarField>()?,
        };
        let rnd_share = PriShare {
            i: cur.u32()?,
            v: cur.scalar::<A::ScalarField>()?,
        };
        let t = cur.u32()?;
        let commit_len = cur.u32()? as usize;
        let commitments = (0..commit_len)
            .map(|_| cur.point::<A>())
            .collect::<Result<Vec<_>>>()?;
        let sig_len = cur.u32()? as usize;
        let signature = cur.take(sig_len)?.to_vec();
        Ok(Self {
            session_id,
            sec_share,
            rnd_share,
            t,
            commitments,
            signature,
        })
    }
}

impl Response {
    /// Encode as `sidLen ‖ sid ‖ index ‖ status ‖ sigLen ‖ signature`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![];
        wire::put_u32(&mut buf, self.session_id.len() as u32);
        buf.extend_from_slice(&self.session_id);
        wire::put_u32(&mut buf, self.index);
        buf.push(self.status.as_byte());
        wire::put_u32(&mut buf, self.signature.len() as u32);
        buf.extend_from_slice(&self.signature);
        buf
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        let mut cur = wire::Cursor::new(buf);
        let sid_len = cur.u32()? as usize;
        let session_id = cur.take(sid_len)?.to_vec();
        let index = cur.u32()?;
        let status = Status::from_byte(cur.u8()?)?;
        let sig_len = cur.u32()? as usize;
        let signature = cur.take(sig_len)?.to_vec();
        cur.finish()?;
        Ok(Self {
            session_id,
            index,
            status,
            signature,
        })
    }
}

impl<A: AffineCurve> Justification<A> {
    /// Encode as `sidLen ‖ sid ‖ index ‖ deal ‖ sigLen ‖ signature`, with
    /// the nested deal in its own wire encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![];
        wire::put_u32(&mut buf, self.session_id.len() as u32);
        buf.extend_from_slice(&self.session_id);
        wire::put_u32(&mut buf, self.index);
        buf.extend_from_slice(&self.deal.to_bytes());
        wire::put_u32(&mut buf, self.signature.len() as u32);
        buf.extend_from_slice(&self.signature);
        buf
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        let mut cur = wire::Cursor::new(buf);
        let sid_len = cur.u32()? as usize;
        let session_id = cur.take(sid_len)?.to_vec();
        let index = cur.u32()?;
        let deal = Deal::decode(&mut cur)?;
        let sig_len = cur.u32()? as usize;
        let signature = cur.take(sig_len)?.to_vec();
        cur.finish()?;
        Ok(Self {
            session_id,
            index,
            deal,
            signature,
        })
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
        pub dealer: Dealer<TestCurve>,
        pub verifiers: Vec<Verifier<TestCurve>>,
        pub dealer_key: Keypair<TestCurve>,
        pub keypairs: Vec<Keypair<TestCurve>>,
        pub secret: Scalar,
    }

    /// A dealer and its verifiers over fresh keys
    pub fn setup(n: usize, t: usize) -> Setup {
        let rng = &mut ark_std::test_rng();
        let keypairs: Vec<Keypair<TestCurve>> =
            (0..n).map(|_| Keypair::new(rng)).collect();
        let points: Vec<TestCurve> = keypairs.iter().map(|k| k.public).collect();
        let dealer_key = Keypair::<TestCurve>::new(rng);
        let secret = Scalar::rand(rng);
        let dealer = Dealer::new(dealer_key.secret, secret, points.clone(), t, rng)
            .expect("Setup failed");
        let verifiers = keypairs
            .iter()
            .map(|k| {
                Verifier::new(k.secret, dealer_key.public, points.clone())
                    .expect("Setup failed")
            })
            .collect();
        Setup {
            dealer,
            verifiers,
            dealer_key,
            keypairs,
            secret,
        }
    }

    /// A copy of the deal for `i` whose secret share was corrupted, re-signed
    /// by the dealer so that only the commitment check can catch it
    pub fn corrupt_deal(s: &Setup, i: usize) -> Deal<TestCurve> {
        let rng = &mut ark_std::test_rng();
        let mut deal = s.dealer.deals()[i].clone();
        deal.sec_share.v += Scalar::from(1u64);
        deal.signature =
            schnorr::sign::<TestCurve, _>(&s.dealer_key.secret, &msg_deal(&deal), rng);
        deal
    }
}

/// Test dealing and deal verification
#[cfg(test)]
mod test_dealing {
    use super::test_common::*;

    /// The dealer refuses thresholds outside `2 <= t <= n`
    #[test]
    fn test_invalid_t() {
        let rng = &mut ark_std::test_rng();
        let keypairs: Vec<Keypair<TestCurve>> =
            (0..4).map(|_| Keypair::new(rng)).collect();
        let points: Vec<TestCurve> = keypairs.iter().map(|k| k.public).collect();
        let dealer_key = Keypair::<TestCurve>::new(rng);
        let secret = Scalar::rand(rng);
        for t in &[0usize, 1, 5] {
            assert_eq!(
                Dealer::new(dealer_key.secret, secret, points.clone(), *t, rng)
                    .expect_err("Test failed"),
                Error::InvalidParameters
            );
        }
    }

    /// The recommended minimum threshold is a strict majority
    #[test]
    fn test_minimum_t() {
        assert_eq!(minimum_t(4), 3);
        assert_eq!(minimum_t(5), 3);
        assert_eq!(minimum_t(7), 4);
    }

    /// A verifier must appear in the verifier set
    #[test]
    fn test_not_a_verifier() {
        let s = setup(4, 3);
        let rng = &mut ark_std::test_rng();
        let stranger = Keypair::<TestCurve>::new(rng);
        let points: Vec<TestCurve> = s.keypairs.iter().map(|k| k.public).collect();
        assert_eq!(
            Verifier::new(stranger.secret, s.dealer_key.public, points)
                .expect_err("Test failed"),
            Error::NotAVerifier
        );
    }

    /// Honest deals are approved and recorded
    #[test]
    fn test_honest_deal_approved() {
        let rng = &mut ark_std::test_rng();
        let mut s = setup(5, 3);
        for (i, verifier) in s.verifiers.iter_mut().enumerate() {
            let response = verifier
                .process_deal(&s.dealer.deals()[i], rng)
                .expect("Test failed");
            assert_eq!(response.status, Status::Approval);
            assert_eq!(response.index, i as u32);
            assert_eq!(verifier.session_id().expect("Test failed"), s.dealer.session_id());
        }
    }

    /// A deal addressed to another index is refused outright
    #[test]
    fn test_wrong_index_deal() {
        let rng = &mut ark_std::test_rng();
        let mut s = setup(5, 3);
        let deal = s.dealer.deals()[1].clone();
        assert_eq!(
            s.verifiers[0].process_deal(&deal, rng),
            Err(Error::IndexOutOfRange)
        );
    }

    /// A second deal for the same session is refused
    #[test]
    fn test_deal_already_processed() {
        let rng = &mut ark_std::test_rng();
        let mut s = setup(5, 3);
        let deal = s.dealer.deals()[0].clone();
        s.verifiers[0].process_deal(&deal, rng).expect("Test failed");
        assert_eq!(
            s.verifiers[0].process_deal(&deal, rng),
            Err(Error::DealAlreadyProcessed)
        );
    }

    /// A corrupted share draws a complaint
    #[test]
    fn test_corrupt_deal_complaint() {
        let rng = &mut ark_std::test_rng();
        let mut s = setup(5, 3);
        let deal = corrupt_deal(&s, 0);
        let response = s.verifiers[0].process_deal(&deal, rng).expect("Test failed");
        assert_eq!(response.status, Status::Complaint);
    }

    /// A deal whose dealer signature is invalid draws a complaint
    #[test]
    fn test_bad_signature_complaint() {
        let rng = &mut ark_std::test_rng();
        let mut s = setup(5, 3);
        let mut deal = s.dealer.deals()[0].clone();
        let last = deal.signature.len() - 1;
        deal.signature[last] ^= 1;
        let response = s.verifiers[0].process_deal(&deal, rng).expect("Test failed");
        assert_eq!(response.status, Status::Complaint);
    }
}
