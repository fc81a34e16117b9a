//! Escrow of a secret scalar across a quorum of mutually suspicious
//! participants.
//!
//! Two protocols are provided over the same algebra. The [`promise`] module
//! implements publicly verifiable secret sharing with Diffie-Hellman
//! encrypted shares, insurer approvals and blame proofs. The [`vss`] module
//! implements Pedersen verifiable secret sharing as a message-passing
//! state machine with session ids, complaints and dealer justifications.

pub mod error;
pub mod poly;
pub mod primitives;
pub mod promise;
pub mod vss;

pub(crate) mod wire;

pub use error::{Error, Result};
pub use primitives::*;
pub use promise::*;
pub use vss::*;

pub use spondeo_common::{ark_serde, Keypair, Rng};
