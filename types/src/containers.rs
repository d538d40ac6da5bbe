//! Subsets of the Beacon Node API block containers.
//!
//! Only the fields read by the consensus client are modeled. Unknown fields are ignored so that
//! a single definition covers every post-Merge fork.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::primitives::{
    ExecutionAddress, ExecutionBlockHash, ExecutionBlockNumber, Gas, Root, SignatureBytes, Slot,
    UnixSeconds, ValidatorIndex, Wei, H256,
};

#[serde_as]
#[derive(Clone, PartialEq, Eq, Default, Debug, Deserialize, Serialize)]
pub struct ExecutionPayload {
    pub parent_hash: ExecutionBlockHash,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_recipient: Option<ExecutionAddress>,
    pub prev_randao: H256,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub block_number: ExecutionBlockNumber,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub gas_limit: Gas,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub gas_used: Gas,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub timestamp: UnixSeconds,
    pub base_fee_per_gas: Wei,
    pub block_hash: ExecutionBlockHash,
}

#[derive(Clone, PartialEq, Eq, Default, Debug, Deserialize, Serialize)]
pub struct PreMergeBeaconBlockBody {
    pub randao_reveal: SignatureBytes,
}

#[derive(Clone, PartialEq, Eq, Default, Debug, Deserialize, Serialize)]
pub struct BeaconBlockBody {
    pub randao_reveal: SignatureBytes,
    pub execution_payload: ExecutionPayload,
}

#[serde_as]
#[derive(Clone, PartialEq, Eq, Default, Debug, Deserialize, Serialize)]
pub struct BeaconBlock<B> {
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub slot: Slot,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub proposer_index: ValidatorIndex,
    pub parent_root: Root,
    pub state_root: Root,
    pub body: B,
}

#[derive(Clone, PartialEq, Eq, Default, Debug, Deserialize, Serialize)]
pub struct SignedBeaconBlock<B> {
    pub message: BeaconBlock<B>,
    pub signature: SignatureBytes,
}

pub type PreMergeSignedBeaconBlock = SignedBeaconBlock<PreMergeBeaconBlockBody>;
pub type PostMergeSignedBeaconBlock = SignedBeaconBlock<BeaconBlockBody>;
