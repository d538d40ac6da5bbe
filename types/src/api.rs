//! Beacon Node API response payloads.

use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DeserializeFromStr, DisplayFromStr, PickFirst, SerializeDisplay};

use crate::{
    nonstandard::ValidatorLifecycle,
    primitives::{Epoch, Gwei, PublicKeyBytes, Slot, ValidatorIndex, H256},
};

#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct ProposerDuty {
    pub pubkey: PublicKeyBytes,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub validator_index: ValidatorIndex,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub slot: Slot,
}

#[serde_as]
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct ValidatorRecord {
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub index: ValidatorIndex,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub balance: Gwei,
    pub status: ValidatorStatus,
    pub validator: Validator,
}

#[serde_as]
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct Validator {
    pub pubkey: PublicKeyBytes,
    pub withdrawal_credentials: H256,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub effective_balance: Gwei,
    pub slashed: bool,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub activation_eligibility_epoch: Epoch,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub activation_epoch: Epoch,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub exit_epoch: Epoch,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub withdrawable_epoch: Epoch,
}

#[derive(
    Clone, Copy, PartialEq, Eq, Debug, Display, FromStr, DeserializeFromStr, SerializeDisplay,
)]
#[display(style = "snake_case")]
pub enum ValidatorStatus {
    Active,
    ActiveExiting,
    ActiveOngoing,
    ActiveSlashed,
    Exited,
    ExitedUnslashed,
    ExitedSlashed,
    Pending,
    PendingInitialized,
    PendingQueued,
    Withdrawal,
    WithdrawalDone,
    WithdrawalPossible,
}

impl ValidatorStatus {
    #[must_use]
    pub fn lifecycle(self) -> ValidatorLifecycle {
        let status = self.to_string();

        if status.contains("active") {
            ValidatorLifecycle::Active
        } else if status.contains("pending") {
            ValidatorLifecycle::Pending
        } else {
            ValidatorLifecycle::Unknown
        }
    }
}
