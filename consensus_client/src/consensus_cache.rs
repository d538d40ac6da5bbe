use std::sync::Arc;

use logging::{debug_with_head, info_with_head, warn_with_head};
use tokio_util::sync::CancellationToken;
use types::{
    api::ValidatorRecord,
    combined::SignedBeaconBlock,
    containers::ExecutionPayload,
    nonstandard::{ValidatorInfo, ValidatorLifecycle},
    primitives::{Epoch, ExecutionBlockHash, ExecutionBlockNumber, PublicKeyBytes, Slot},
};

use crate::{
    bootstrap::{self, BootstrapReport},
    cache_index::CacheIndex as _,
    config::{Config, ParentHashPolicy},
    error::{Error, Missing, ParseError, Result},
    execution_hash_index::ExecutionHashIndex,
    remote::{cancellable, RemoteChainSource},
    slot_indexed_cache::SlotIndexedCache,
    validator_registry::ValidatorRegistry,
};

/// A local view of recent consensus data, populated lazily from a [`RemoteChainSource`].
///
/// Entries are never invalidated. After a reorg the cache may keep serving blocks and duties
/// from the abandoned branch until they are evicted or fetched again.
pub struct ConsensusCache<S> {
    source: Arc<S>,
    config: Config,
    proposers: SlotIndexedCache<Slot, ValidatorInfo>,
    blocks: SlotIndexedCache<Slot, Arc<SignedBeaconBlock>>,
    // May point at blocks that have already been evicted from `blocks`.
    block_numbers: SlotIndexedCache<ExecutionBlockNumber, Slot>,
    execution_hashes: ExecutionHashIndex,
    validators: ValidatorRegistry,
}

impl<S: RemoteChainSource> ConsensusCache<S> {
    #[must_use]
    pub fn new(source: Arc<S>, config: Config) -> Self {
        Self {
            source,
            config,
            proposers: SlotIndexedCache::new(config.cache_size),
            blocks: SlotIndexedCache::new(config.cache_size),
            block_numbers: SlotIndexedCache::new(config.cache_size),
            execution_hashes: ExecutionHashIndex::new(config.cache_size),
            validators: ValidatorRegistry::default(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub fn get_proposer(&self, slot: Slot) -> Result<ValidatorInfo> {
        self.proposers
            .get(&slot)
            .ok_or_else(|| Error::not_found(Missing::Proposer(slot)))
    }

    /// Returns the block at `slot`, fetching it if it is not cached.
    ///
    /// Empty slots are not remembered. Every lookup of an empty slot goes to the remote source.
    pub async fn get_block(
        &self,
        slot: Slot,
        token: &CancellationToken,
    ) -> Result<Arc<SignedBeaconBlock>> {
        if let Some(block) = self.blocks.get(&slot) {
            return Ok(block);
        }

        self.fetch_block(slot, token).await?;

        self.blocks
            .get(&slot)
            .ok_or_else(|| Error::not_found(Missing::Block(slot)))
    }

    pub fn get_validator(&self, public_key: PublicKeyBytes) -> Result<Arc<ValidatorRecord>> {
        self.validators
            .get(&public_key)
            .ok_or_else(|| Error::not_found(Missing::Validator(public_key)))
    }

    pub async fn fetch_proposers(&self, epoch: Epoch, token: &CancellationToken) -> Result<()> {
        let duties = cancellable(token, self.source.proposer_duties(epoch)).await?;

        let slots_per_epoch = self.config.slots_per_epoch.get();
        let mut inserted = 0_usize;

        for duty in duties {
            if duty.slot / slots_per_epoch != epoch {
                warn_with_head!(
                    "ignoring proposer duty for slot {} outside of requested epoch {epoch}",
                    duty.slot,
                );
                continue;
            }

            self.proposers.put(
                duty.slot,
                ValidatorInfo {
                    public_key: duty.pubkey,
                    validator_index: duty.validator_index,
                },
            );

            inserted += 1;
        }

        debug_with_head!("cached {inserted} proposer duties for epoch {epoch}");

        Ok(())
    }

    /// Fetches the block at `slot` and records it in every block index.
    ///
    /// Succeeds without changes if no block was proposed at `slot`.
    pub async fn fetch_block(&self, slot: Slot, token: &CancellationToken) -> Result<()> {
        let Some(block) = cancellable(token, self.source.block(slot)).await? else {
            debug_with_head!("slot {slot} is empty");
            return Ok(());
        };

        let payload = self.validate_block(slot, &block)?;
        let block_number = payload.block_number;
        let block_hash = payload.block_hash;

        self.blocks.put(slot, Arc::new(block));
        self.block_numbers.put(block_number, slot);
        self.execution_hashes.put(slot, block_hash);

        debug_with_head!(
            "cached block at slot {slot} (block number: {block_number}, block hash: {block_hash:?})",
        );

        Ok(())
    }

    /// Replaces the whole validator set with the one at the head of the remote source.
    pub async fn fetch_validators(&self, token: &CancellationToken) -> Result<()> {
        let validators = cancellable(token, self.source.validators()).await?;
        let count = validators.len();

        self.validators.replace(validators);

        info_with_head!("loaded {count} validators");

        Ok(())
    }

    /// Returns the execution block hash as of `slot`, inheriting it from earlier slots if needed.
    pub fn resolve_execution_hash(&self, slot: Slot) -> Result<ExecutionBlockHash> {
        self.execution_hashes.resolve(slot)
    }

    /// Returns the execution block hash a block proposed at `slot` would build on.
    pub async fn get_parent_hash(
        &self,
        slot: Slot,
        token: &CancellationToken,
    ) -> Result<ExecutionBlockHash> {
        let parent_slot = parent_slot(slot)?;

        match self.config.parent_hash_policy {
            ParentHashPolicy::Direct => {
                let block = self.get_block(parent_slot, token).await?;
                Ok(payload_of(&block)?.block_hash)
            }
            ParentHashPolicy::Backfill => self.resolve_execution_hash(parent_slot),
        }
    }

    pub fn get_proposer_public_key(&self, slot: Slot) -> Result<PublicKeyBytes> {
        self.get_proposer(slot).map(|proposer| proposer.public_key)
    }

    pub fn get_validator_lifecycle(
        &self,
        public_key: PublicKeyBytes,
    ) -> Result<ValidatorLifecycle> {
        self.get_validator(public_key)
            .map(|record| record.status.lifecycle())
    }

    /// Populates the cache around `current_slot` on a best-effort basis.
    ///
    /// Never fails. Failed steps are logged and listed in the returned report.
    pub async fn load_current_context(
        &self,
        current_slot: Slot,
        current_epoch: Epoch,
        token: &CancellationToken,
    ) -> BootstrapReport {
        bootstrap::load_current_context(self, current_slot, current_epoch, token).await
    }

    #[must_use]
    pub fn cached_block_count(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn cached_proposer_count(&self) -> usize {
        self.proposers.len()
    }

    #[must_use]
    pub fn validator_count(&self) -> usize {
        self.validators.len()
    }

    pub(crate) fn slot_of_block_number(&self, block_number: ExecutionBlockNumber) -> Result<Slot> {
        self.block_numbers
            .get(&block_number)
            .ok_or(Error::UnknownBlockNumber { block_number })
    }

    fn validate_block<'block>(
        &self,
        slot: Slot,
        block: &'block SignedBeaconBlock,
    ) -> Result<&'block ExecutionPayload> {
        let phase = block.phase();
        let min_phase = self.config.min_block_phase;

        if phase < min_phase {
            return Err(ParseError::UnexpectedPhase {
                phase,
                min_phase,
                slot,
            }
            .into());
        }

        payload_of(block)
    }
}

pub(crate) fn parent_slot(slot: Slot) -> Result<Slot> {
    slot.checked_sub(1)
        .ok_or_else(|| Error::not_found(Missing::Parent(slot)))
}

pub(crate) fn payload_of(block: &SignedBeaconBlock) -> Result<&ExecutionPayload> {
    block.execution_payload().ok_or_else(|| {
        ParseError::MissingExecutionPayload {
            phase: block.phase(),
            slot: block.slot(),
        }
        .into()
    })
}
