use core::{
    num::{NonZeroU64, NonZeroUsize},
    time::Duration,
};

use nonzero_ext::nonzero;
use strum::{AsRefStr, Display, EnumString, VariantNames};
use types::nonstandard::Phase;

pub const DEFAULT_CACHE_SIZE: NonZeroUsize = nonzero!(1024_usize);
pub const DEFAULT_HEAD_EVENT_CAPACITY: NonZeroUsize = nonzero!(1_usize);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_SLOTS_PER_EPOCH: NonZeroU64 = nonzero!(32_u64);

pub const BASE_FEE_CHANGE_DENOMINATOR: NonZeroU64 = nonzero!(8_u64);
pub const GAS_ELASTICITY_MULTIPLIER: NonZeroU64 = nonzero!(2_u64);

pub const MAX_IDLE_CONNECTIONS_PER_HOST: usize = 128;

/// How the execution block hash a proposal builds on is resolved.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, AsRefStr, Display, EnumString, VariantNames)]
#[strum(serialize_all = "kebab-case")]
pub enum ParentHashPolicy {
    /// Use the block hash of the block in the previous slot. Fails if that slot is empty.
    #[default]
    Direct,
    /// Use the execution hash index, inheriting the hash of the closest earlier block.
    Backfill,
}

/// What the head event stream does when its queue is full.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, AsRefStr, Display, EnumString, VariantNames)]
#[strum(serialize_all = "kebab-case")]
pub enum HeadEventOverflow {
    /// Wait for the consumer, which stops reading the event feed in the meantime.
    #[default]
    Block,
    DropOldest,
}

#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub cache_size: NonZeroUsize,
    pub request_timeout: Duration,
    pub slots_per_epoch: NonZeroU64,
    pub elasticity_multiplier: NonZeroU64,
    pub base_fee_change_denominator: NonZeroU64,
    pub parent_hash_policy: ParentHashPolicy,
    pub min_block_phase: Phase,
    pub head_event_capacity: NonZeroUsize,
    pub head_event_overflow: HeadEventOverflow,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_size: DEFAULT_CACHE_SIZE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            slots_per_epoch: DEFAULT_SLOTS_PER_EPOCH,
            elasticity_multiplier: GAS_ELASTICITY_MULTIPLIER,
            base_fee_change_denominator: BASE_FEE_CHANGE_DENOMINATOR,
            parent_hash_policy: ParentHashPolicy::default(),
            min_block_phase: Phase::Bellatrix,
            head_event_capacity: DEFAULT_HEAD_EVENT_CAPACITY,
            head_event_overflow: HeadEventOverflow::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("direct" => ParentHashPolicy::Direct)]
    #[test_case("backfill" => ParentHashPolicy::Backfill)]
    fn parent_hash_policy_from_str(string: &str) -> ParentHashPolicy {
        string.parse().expect("string should name a policy")
    }

    #[test_case(HeadEventOverflow::Block => "block")]
    #[test_case(HeadEventOverflow::DropOldest => "drop-oldest")]
    fn head_event_overflow_display(overflow: HeadEventOverflow) -> String {
        overflow.to_string()
    }
}
