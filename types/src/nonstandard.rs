use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, DisplayFromStr, SerializeDisplay};
use strum::{AsRefStr, Display, EnumString, VariantArray};

use crate::primitives::{PublicKeyBytes, Root, Slot, ValidatorIndex};

/// Consensus forks in activation order.
///
/// The Beacon Node API uses the lowercase names as the `version` of versioned responses.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    VariantArray,
    AsRefStr,
    Display,
    EnumString,
    DeserializeFromStr,
    SerializeDisplay,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Phase {
    Phase0,
    Altair,
    Bellatrix,
    Capella,
    Deneb,
    Electra,
    Fulu,
}

impl Phase {
    /// Blocks of phases before the Merge carry no execution payload.
    #[must_use]
    pub const fn has_execution_payload(self) -> bool {
        !matches!(self, Self::Phase0 | Self::Altair)
    }
}

/// A head observation as published by the head event stream.
#[serde_with::serde_as]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct Coordinate {
    #[serde_as(as = "DisplayFromStr")]
    pub slot: Slot,
    #[serde(rename = "block")]
    pub root: Root,
}

/// The validator assigned to propose in a slot.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ValidatorInfo {
    pub public_key: PublicKeyBytes,
    pub validator_index: ValidatorIndex,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ValidatorLifecycle {
    Active,
    Pending,
    Unknown,
}
