//! An in-memory [`RemoteChainSource`] for tests.

use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt as _};
use parking_lot::Mutex;
use types::{
    api::{ProposerDuty, Validator, ValidatorRecord, ValidatorStatus},
    combined::SignedBeaconBlock,
    containers::{
        BeaconBlock, BeaconBlockBody, ExecutionPayload, PreMergeBeaconBlockBody,
        SignedBeaconBlock as SignedBlock,
    },
    primitives::{Epoch, ExecutionBlockNumber, Gas, PublicKeyBytes, Slot, H256},
    uint256::Uint256,
};

use crate::{
    error::{Error, Missing, Result},
    remote::RemoteChainSource,
    sse::ServerSentEvent,
};

#[derive(Default)]
pub struct MockChainSource {
    blocks: Mutex<HashMap<Slot, SignedBeaconBlock>>,
    duties: Mutex<HashMap<Epoch, Vec<ProposerDuty>>>,
    syncing_epochs: Mutex<HashSet<Epoch>>,
    validators: Mutex<Option<Vec<ValidatorRecord>>>,
    randao: Mutex<HashMap<Slot, H256>>,
    head_events: Mutex<Option<BoxStream<'static, Result<ServerSentEvent>>>>,
    stalled: AtomicBool,
    block_calls: AtomicUsize,
    duty_calls: AtomicUsize,
}

impl MockChainSource {
    pub fn insert_block(&self, block: SignedBeaconBlock) {
        self.blocks.lock().insert(block.slot(), block);
    }

    pub fn insert_duties(&self, epoch: Epoch, duties: Vec<ProposerDuty>) {
        self.duties.lock().insert(epoch, duties);
    }

    pub fn set_syncing(&self, epoch: Epoch) {
        self.syncing_epochs.lock().insert(epoch);
    }

    pub fn set_validators(&self, validators: Vec<ValidatorRecord>) {
        *self.validators.lock() = Some(validators);
    }

    pub fn insert_randao(&self, slot: Slot, randao: H256) {
        self.randao.lock().insert(slot, randao);
    }

    pub fn set_head_events(
        &self,
        events: impl futures::Stream<Item = Result<ServerSentEvent>> + Send + 'static,
    ) {
        *self.head_events.lock() = Some(events.boxed());
    }

    /// Makes every subsequent call wait forever.
    pub fn stall(&self) {
        self.stalled.store(true, Ordering::SeqCst);
    }

    pub fn block_calls(&self) -> usize {
        self.block_calls.load(Ordering::SeqCst)
    }

    pub fn duty_calls(&self) -> usize {
        self.duty_calls.load(Ordering::SeqCst)
    }

    async fn wait_if_stalled(&self) {
        if self.stalled.load(Ordering::SeqCst) {
            futures::future::pending::<()>().await;
        }
    }
}

#[async_trait]
impl RemoteChainSource for MockChainSource {
    async fn proposer_duties(&self, epoch: Epoch) -> Result<Vec<ProposerDuty>> {
        self.duty_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_if_stalled().await;

        if self.syncing_epochs.lock().contains(&epoch) {
            return Err(Error::Syncing { epoch });
        }

        Ok(self.duties.lock().get(&epoch).cloned().unwrap_or_default())
    }

    async fn block(&self, slot: Slot) -> Result<Option<SignedBeaconBlock>> {
        self.block_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_if_stalled().await;
        Ok(self.blocks.lock().get(&slot).cloned())
    }

    async fn validators(&self) -> Result<Vec<ValidatorRecord>> {
        self.wait_if_stalled().await;

        self.validators
            .lock()
            .clone()
            .ok_or(Error::NotFound {
                what: Missing::Validators,
            })
    }

    async fn randao(&self, slot: Slot) -> Result<H256> {
        self.wait_if_stalled().await;

        self.randao
            .lock()
            .get(&slot)
            .copied()
            .ok_or(Error::NotFound {
                what: Missing::Block(slot),
            })
    }

    async fn head_events(&self) -> Result<BoxStream<'static, Result<ServerSentEvent>>> {
        self.wait_if_stalled().await;
        Ok(self.head_events.lock().take().unwrap_or_else(|| stream::empty().boxed()))
    }
}

pub struct PayloadFields {
    pub block_number: ExecutionBlockNumber,
    pub gas_limit: Gas,
    pub gas_used: Gas,
    pub base_fee_per_gas: u64,
}

impl Default for PayloadFields {
    fn default() -> Self {
        Self {
            block_number: 1_000,
            gas_limit: 30_000_000,
            gas_used: 15_000_000,
            base_fee_per_gas: 1_000,
        }
    }
}

/// The block hash of the block built by [`post_merge_block`] for `slot`.
pub fn block_hash(slot: Slot) -> H256 {
    H256::from_low_u64_be(slot + 1)
}

pub fn prev_randao(slot: Slot) -> H256 {
    H256::from_low_u64_le(slot + 1)
}

pub fn post_merge_block(slot: Slot, fields: PayloadFields) -> SignedBeaconBlock {
    let PayloadFields {
        block_number,
        gas_limit,
        gas_used,
        base_fee_per_gas,
    } = fields;

    SignedBeaconBlock::Capella(SignedBlock {
        message: BeaconBlock {
            slot,
            proposer_index: slot,
            body: BeaconBlockBody {
                execution_payload: ExecutionPayload {
                    parent_hash: block_hash(slot.saturating_sub(1)),
                    prev_randao: prev_randao(slot),
                    block_number,
                    gas_limit,
                    gas_used,
                    base_fee_per_gas: Uint256::from_u64(base_fee_per_gas),
                    block_hash: block_hash(slot),
                    ..ExecutionPayload::default()
                },
                ..BeaconBlockBody::default()
            },
            ..BeaconBlock::default()
        },
        ..SignedBlock::default()
    })
}

pub fn pre_merge_block(slot: Slot) -> SignedBeaconBlock {
    SignedBeaconBlock::Altair(SignedBlock {
        message: BeaconBlock {
            slot,
            body: PreMergeBeaconBlockBody::default(),
            ..BeaconBlock::default()
        },
        ..SignedBlock::default()
    })
}

pub fn duty(slot: Slot, pubkey_byte: u8) -> ProposerDuty {
    ProposerDuty {
        pubkey: PublicKeyBytes::repeat_byte(pubkey_byte),
        validator_index: slot,
        slot,
    }
}

pub fn validator(index: u64, pubkey_byte: u8, status: ValidatorStatus) -> ValidatorRecord {
    ValidatorRecord {
        index,
        balance: 32_000_000_000,
        status,
        validator: Validator {
            pubkey: PublicKeyBytes::repeat_byte(pubkey_byte),
            withdrawal_credentials: H256::zero(),
            effective_balance: 32_000_000_000,
            slashed: false,
            activation_eligibility_epoch: 0,
            activation_epoch: 0,
            exit_epoch: u64::MAX,
            withdrawable_epoch: u64::MAX,
        },
    }
}
