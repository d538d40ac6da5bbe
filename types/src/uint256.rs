use core::fmt::{Formatter, Result as FmtResult};

use derive_more::{Debug, Display, From, Into, LowerHex};
use ethereum_types::U256 as RawUint256;
use serde::{
    de::{Error, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};

pub const UINT256_SIZE: usize = 32;

// The Beacon Node API represents 256-bit integers as decimal strings, unlike the execution layer
// JSON-RPC API which uses `0x`-prefixed hex. `ethereum_types::U256` only supports the latter.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    From,
    Into,
    Debug,
    Display,
    LowerHex,
)]
#[debug("{_0}")]
pub struct Uint256(RawUint256);

impl From<u64> for Uint256 {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl Uint256 {
    pub const ZERO: Self = Self(RawUint256::zero());
    pub const MAX: Self = Self(RawUint256::MAX);

    #[must_use]
    pub const fn from_u64(value: u64) -> Self {
        Self(RawUint256([value, 0, 0, 0]))
    }

    #[must_use]
    pub const fn into_raw(self) -> RawUint256 {
        self.0
    }

    #[must_use]
    pub fn to_le_bytes(self) -> [u8; UINT256_SIZE] {
        let mut bytes = [0; UINT256_SIZE];
        self.0.to_little_endian(&mut bytes);
        bytes
    }

    /// Returns [`None`] if `bytes` has more significant bytes than fit in 256 bits.
    #[must_use]
    pub fn from_le_bytes(bytes: &[u8]) -> Option<Self> {
        let (low, high) = bytes.split_at(bytes.len().min(UINT256_SIZE));

        if high.iter().any(|byte| *byte != 0) {
            return None;
        }

        Some(Self(RawUint256::from_little_endian(low)))
    }
}

impl<'de> Deserialize<'de> for Uint256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Uint256Visitor;

        impl Visitor<'_> for Uint256Visitor {
            type Value = Uint256;

            fn expecting(&self, formatter: &mut Formatter) -> FmtResult {
                formatter.write_str("a 256-bit unsigned integer as a decimal string")
            }

            fn visit_str<E: Error>(self, string: &str) -> Result<Self::Value, E> {
                RawUint256::from_dec_str(string)
                    .map(Uint256)
                    .map_err(E::custom)
            }

            fn visit_u64<E: Error>(self, value: u64) -> Result<Self::Value, E> {
                Ok(Uint256::from_u64(value))
            }
        }

        deserializer.deserialize_any(Uint256Visitor)
    }
}

impl Serialize for Uint256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
