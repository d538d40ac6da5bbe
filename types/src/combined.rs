use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    containers::{ExecutionPayload, PostMergeSignedBeaconBlock, PreMergeSignedBeaconBlock},
    nonstandard::Phase,
    primitives::{Slot, ValidatorIndex},
};

/// A signed block of any phase.
///
/// Serialized in the shape of versioned Beacon Node API responses (`{"version": …, "data": …}`).
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(tag = "version", content = "data", rename_all = "lowercase")]
pub enum SignedBeaconBlock {
    Phase0(PreMergeSignedBeaconBlock),
    Altair(PreMergeSignedBeaconBlock),
    Bellatrix(PostMergeSignedBeaconBlock),
    Capella(PostMergeSignedBeaconBlock),
    Deneb(PostMergeSignedBeaconBlock),
    Electra(PostMergeSignedBeaconBlock),
    Fulu(PostMergeSignedBeaconBlock),
}

impl SignedBeaconBlock {
    /// Deserializes the `data` of a versioned response whose `version` has already been parsed.
    pub fn deserialize_for_phase<'de, D: Deserializer<'de>>(
        phase: Phase,
        deserializer: D,
    ) -> Result<Self, D::Error> {
        let block = match phase {
            Phase::Phase0 => Self::Phase0(Deserialize::deserialize(deserializer)?),
            Phase::Altair => Self::Altair(Deserialize::deserialize(deserializer)?),
            Phase::Bellatrix => Self::Bellatrix(Deserialize::deserialize(deserializer)?),
            Phase::Capella => Self::Capella(Deserialize::deserialize(deserializer)?),
            Phase::Deneb => Self::Deneb(Deserialize::deserialize(deserializer)?),
            Phase::Electra => Self::Electra(Deserialize::deserialize(deserializer)?),
            Phase::Fulu => Self::Fulu(Deserialize::deserialize(deserializer)?),
        };

        Ok(block)
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self {
            Self::Phase0(_) => Phase::Phase0,
            Self::Altair(_) => Phase::Altair,
            Self::Bellatrix(_) => Phase::Bellatrix,
            Self::Capella(_) => Phase::Capella,
            Self::Deneb(_) => Phase::Deneb,
            Self::Electra(_) => Phase::Electra,
            Self::Fulu(_) => Phase::Fulu,
        }
    }

    #[must_use]
    pub const fn slot(&self) -> Slot {
        match self {
            Self::Phase0(block) | Self::Altair(block) => block.message.slot,
            Self::Bellatrix(block)
            | Self::Capella(block)
            | Self::Deneb(block)
            | Self::Electra(block)
            | Self::Fulu(block) => block.message.slot,
        }
    }

    #[must_use]
    pub const fn proposer_index(&self) -> ValidatorIndex {
        match self {
            Self::Phase0(block) | Self::Altair(block) => block.message.proposer_index,
            Self::Bellatrix(block)
            | Self::Capella(block)
            | Self::Deneb(block)
            | Self::Electra(block)
            | Self::Fulu(block) => block.message.proposer_index,
        }
    }

    #[must_use]
    pub const fn execution_payload(&self) -> Option<&ExecutionPayload> {
        match self {
            Self::Phase0(_) | Self::Altair(_) => None,
            Self::Bellatrix(block)
            | Self::Capella(block)
            | Self::Deneb(block)
            | Self::Electra(block)
            | Self::Fulu(block) => Some(&block.message.body.execution_payload),
        }
    }
}
