use core::{num::NonZeroUsize, ops::Bound};
use std::collections::BTreeMap;

use parking_lot::RwLock;
use types::primitives::{ExecutionBlockHash, Slot};

use crate::{
    cache_index::{CacheIndex, EvictionPolicy},
    error::{Error, Result},
};

#[derive(Clone, Copy, Debug)]
enum Entry {
    Observed(ExecutionBlockHash),
    // Copied from the closest earlier `Observed` entry.
    Inherited(ExecutionBlockHash),
}

impl Entry {
    const fn hash(self) -> ExecutionBlockHash {
        match self {
            Self::Observed(hash) | Self::Inherited(hash) => hash,
        }
    }
}

/// Execution block hashes by slot, with gaps filled from the closest earlier slot on demand.
///
/// Holds at most `capacity` slots. When full, the lowest slots are evicted first.
pub struct ExecutionHashIndex {
    entries: RwLock<BTreeMap<Slot, Entry>>,
    capacity: NonZeroUsize,
}

impl ExecutionHashIndex {
    #[must_use]
    pub const fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            capacity,
        }
    }

    /// Returns the hash recorded for `slot`, filling it in if needed.
    ///
    /// If `slot` has no entry, the closest earlier entry is written into every slot after it up
    /// to and including `slot`. Only the highest `capacity` of those slots are written.
    ///
    /// Filled slots are replaced when a block is later recorded for an earlier slot in the gap.
    pub fn resolve(&self, slot: Slot) -> Result<ExecutionBlockHash> {
        if let Some(entry) = self.entries.read().get(&slot).copied() {
            return Ok(entry.hash());
        }

        let mut entries = self.entries.write();

        // Another caller may have filled the gap between the two lock acquisitions.
        if let Some(entry) = entries.get(&slot).copied() {
            return Ok(entry.hash());
        }

        let (found, hash) = entries
            .range(..slot)
            .next_back()
            .map(|(found, entry)| (*found, entry.hash()))
            .ok_or(Error::MissingExecutionHash { slot })?;

        let capacity = u64::try_from(self.capacity.get()).unwrap_or(u64::MAX);
        let lowest_written = (found + 1).max(slot.saturating_sub(capacity - 1));

        for gap in lowest_written..=slot {
            entries.insert(gap, Entry::Inherited(hash));
        }

        self.prune(&mut entries);

        Ok(hash)
    }

    fn prune(&self, entries: &mut BTreeMap<Slot, Entry>) {
        while entries.len() > self.capacity.get() {
            entries.pop_first();
        }
    }
}

impl CacheIndex<Slot, ExecutionBlockHash> for ExecutionHashIndex {
    fn get(&self, slot: &Slot) -> Option<ExecutionBlockHash> {
        self.entries.read().get(slot).copied().map(Entry::hash)
    }

    /// Records an observed hash and passes it on to the filled slots that follow it.
    fn put(&self, slot: Slot, hash: ExecutionBlockHash) {
        let mut entries = self.entries.write();

        entries.insert(slot, Entry::Observed(hash));

        for (_, entry) in entries.range_mut((Bound::Excluded(slot), Bound::Unbounded)) {
            match entry {
                Entry::Observed(_) => break,
                Entry::Inherited(inherited) => *inherited = hash,
            }
        }

        self.prune(&mut entries);
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }

    fn eviction_policy(&self) -> EvictionPolicy {
        EvictionPolicy::LowestKey {
            capacity: self.capacity,
        }
    }
}
