//! End-to-end flows of the promise protocol, exercised through the public
//! API only and over two curve suites.

use ark_ec::AffineCurve;
use spondeo::{Error, Keypair, Promise, PromiseState};

/// Escrow a secret with five insurers, certify the promise, then simulate
/// the promiser going silent and reconstruct from any three shares.
fn full_escrow_flow<A: AffineCurve>() {
    let rng = &mut ark_std::test_rng();
    let secret_pair = Keypair::<A>::new(rng);
    let long_pair = Keypair::<A>::new(rng);
    let insurers: Vec<Keypair<A>> = (0..5).map(|_| Keypair::new(rng)).collect();

    let promise = Promise::new(
        &secret_pair,
        &long_pair,
        3,
        4,
        insurers.iter().map(|k| k.public).collect(),
        rng,
    )
    .expect("Test failed");
    assert_eq!(promise.id(), secret_pair.public);

    // every insurer checks its share and sends back an approval
    let mut state = PromiseState::new(promise.clone());
    for (i, keypair) in insurers.iter().enumerate() {
        promise.verify_share(i, keypair).expect("Test failed");
        let sig = promise.sign(i, keypair, rng).expect("Test failed");
        promise.verify_signature(i, &sig).expect("Test failed");
        state.add_signature(i, sig).expect("Test failed");
    }
    state.certified().expect("Test failed");

    // the promiser goes silent, three insurers reveal their shares
    for (i, keypair) in insurers.iter().enumerate().skip(2) {
        let share = promise.reveal_share(i, keypair).expect("Test failed");
        promise.verify_revealed_share(i, &share).expect("Test failed");
        state.add_share(i, share).expect("Test failed");
    }
    assert_eq!(state.reconstruct().expect("Test failed"), secret_pair.secret);
}

#[test]
fn escrow_flow_pallas() {
    full_escrow_flow::<ark_pallas::Affine>();
}

#[test]
fn escrow_flow_bls12_381() {
    full_escrow_flow::<ark_bls12_381::G1Affine>();
}

/// A promise that crossed a transport as bytes still verifies and certifies.
#[test]
fn escrow_flow_over_the_wire() {
    type A = ark_pallas::Affine;
    let rng = &mut ark_std::test_rng();
    let secret_pair = Keypair::<A>::new(rng);
    let long_pair = Keypair::<A>::new(rng);
    let insurers: Vec<Keypair<A>> = (0..4).map(|_| Keypair::new(rng)).collect();

    let promise = Promise::new(
        &secret_pair,
        &long_pair,
        2,
        3,
        insurers.iter().map(|k| k.public).collect(),
        rng,
    )
    .expect("Test failed");

    let received = Promise::<A>::from_bytes(&promise.to_bytes()).expect("Test failed");
    assert_eq!(received, promise);

    let mut state = PromiseState::new(received.clone());
    for (i, keypair) in insurers.iter().enumerate().take(3) {
        received.verify_share(i, keypair).expect("Test failed");
        let sig = received.sign(i, keypair, rng).expect("Test failed");
        let sig = spondeo::PromiseSignature::from_bytes(&sig.to_bytes()).expect("Test failed");
        state.add_signature(i, sig).expect("Test failed");
    }
    state.certified().expect("Test failed");
}

/// Blaming an honest promise only exposes the accuser.
#[test]
fn blame_against_honest_promise_fails() {
    type A = ark_pallas::Affine;
    let rng = &mut ark_std::test_rng();
    let secret_pair = Keypair::<A>::new(rng);
    let long_pair = Keypair::<A>::new(rng);
    let insurers: Vec<Keypair<A>> = (0..3).map(|_| Keypair::new(rng)).collect();

    let promise = Promise::new(
        &secret_pair,
        &long_pair,
        2,
        2,
        insurers.iter().map(|k| k.public).collect(),
        rng,
    )
    .expect("Test failed");

    let blame = promise.blame(1, &insurers[1], rng).expect("Test failed");
    let blame = spondeo::BlameProof::<A>::from_bytes(&blame.to_bytes()).expect("Test failed");
    assert_eq!(promise.verify_blame(1, &blame), Err(Error::UnjustifiedBlame));

    // the unjustified blame does not block certification
    let mut state = PromiseState::new(promise.clone());
    state.add_blame(1, blame).expect("Test failed");
    for (i, keypair) in insurers.iter().enumerate() {
        let sig = promise.sign(i, keypair, rng).expect("Test failed");
        state.add_signature(i, sig).expect("Test failed");
    }
    state.certified().expect("Test failed");
}
