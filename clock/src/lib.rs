//! Slot and epoch arithmetic anchored at genesis time.
//!
//! Times before genesis map to [`GENESIS_SLOT`]. The number of the first slot after genesis is 0,
//! so a block can be proposed at genesis time itself.

use core::{error::Error, num::NonZeroU64, time::Duration};
use std::time::{SystemTime, SystemTimeError};

use anyhow::Result;
use types::primitives::{Epoch, Slot, UnixSeconds, GENESIS_SLOT};

#[cfg(test)]
mod fake_time;

pub trait SystemTimeLike: Copy {
    type Error: Error + Send + Sync + 'static;

    const UNIX_EPOCH: Self;

    fn duration_since(self, earlier: Self) -> Result<Duration, Self::Error>;
}

impl SystemTimeLike for SystemTime {
    type Error = SystemTimeError;

    const UNIX_EPOCH: Self = Self::UNIX_EPOCH;

    fn duration_since(self, earlier: Self) -> Result<Duration, Self::Error> {
        Self::duration_since(&self, earlier)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SlotClock {
    genesis_time: UnixSeconds,
    seconds_per_slot: NonZeroU64,
    slots_per_epoch: NonZeroU64,
}

impl SlotClock {
    #[must_use]
    pub const fn new(
        genesis_time: UnixSeconds,
        seconds_per_slot: NonZeroU64,
        slots_per_epoch: NonZeroU64,
    ) -> Self {
        Self {
            genesis_time,
            seconds_per_slot,
            slots_per_epoch,
        }
    }

    pub fn current_slot(&self) -> Result<Slot> {
        self.slot_at_time(SystemTime::now())
    }

    pub fn slot_at_time<S: SystemTimeLike>(&self, now: S) -> Result<Slot> {
        let unix_epoch_to_now = now.duration_since(S::UNIX_EPOCH)?;
        Ok(self.slot_at_unix_time(unix_epoch_to_now.as_secs()))
    }

    #[must_use]
    pub const fn slot_at_unix_time(&self, time: UnixSeconds) -> Slot {
        match time.checked_sub(self.genesis_time) {
            Some(genesis_to_now) => GENESIS_SLOT + genesis_to_now / self.seconds_per_slot.get(),
            None => GENESIS_SLOT,
        }
    }

    #[must_use]
    pub const fn epoch_at_slot(&self, slot: Slot) -> Epoch {
        slot / self.slots_per_epoch.get()
    }
}
