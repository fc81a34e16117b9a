pub mod keypair;
pub use keypair::*;

/// Capability bound for every random source the protocols accept.
pub trait Rng: ark_std::rand::CryptoRng + ark_std::rand::RngCore {}

impl<R: ark_std::rand::CryptoRng + ark_std::rand::RngCore> Rng for R {}

/// Glue for `#[serde(with = "ark_serde")]` fields: an arkworks value
/// travels through serde as its canonical compressed byte string.
pub mod ark_serde {
    use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

    pub fn serialize<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
        T: CanonicalSerialize + std::fmt::Debug,
    {
        use serde::ser::Error;
        use serde_bytes::Serialize;
        let mut buf = vec![];
        value.serialize(&mut buf).map_err(S::Error::custom)?;
        serde_bytes::Bytes::new(&buf).serialize(serializer)
    }

    pub fn deserialize<'d, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: serde::Deserializer<'d>,
        T: CanonicalDeserialize,
    {
        use serde::de::Error;
        use serde_bytes::Deserialize;
        let buf = <serde_bytes::ByteBuf>::deserialize(deserializer)?;
        T::deserialize(buf.as_slice()).map_err(D::Error::custom)
    }
}
