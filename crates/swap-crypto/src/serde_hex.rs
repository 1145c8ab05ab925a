//! Hex serialization for fixed-size byte arrays.

use serde::{de::Error, Deserialize, Deserializer, Serializer};

pub(crate) fn serialize<S, const N: usize>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&hex::encode(bytes))
}

pub(crate) fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let bytes = hex::decode(s.trim_start_matches("0x")).map_err(D::Error::custom)?;
    bytes
        .try_into()
        .map_err(|_| D::Error::custom(format!("expected {} bytes", N)))
}
