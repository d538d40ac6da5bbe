use core::{
    num::{NonZeroU64, NonZeroUsize},
    time::Duration,
};

use clap::Parser;
use clock::SlotClock;
use consensus_client::{
    config::{
        BASE_FEE_CHANGE_DENOMINATOR, DEFAULT_CACHE_SIZE, DEFAULT_HEAD_EVENT_CAPACITY,
        DEFAULT_REQUEST_TIMEOUT, DEFAULT_SLOTS_PER_EPOCH, GAS_ELASTICITY_MULTIPLIER,
    },
    Config, HeadEventOverflow, ParentHashPolicy,
};
use nonzero_ext::nonzero;
use types::{nonstandard::Phase, primitives::UnixSeconds};
use url::Url;

const DEFAULT_BEACON_NODE_URL: &str = "http://localhost:5052";

// Mainnet.
const DEFAULT_GENESIS_TIME: UnixSeconds = 1_606_824_023;
const DEFAULT_SECONDS_PER_SLOT: NonZeroU64 = nonzero!(12_u64);

/// Follows a beacon node and reports the context of upcoming block proposals
#[derive(Debug, Parser)]
#[clap(verbatim_doc_comment)]
pub struct ChainMonitorArgs {
    /// Beacon Node API endpoint to follow
    #[clap(long, default_value = DEFAULT_BEACON_NODE_URL)]
    pub beacon_node_url: Url,

    /// Unix time of the genesis of the followed network
    #[clap(long, default_value_t = DEFAULT_GENESIS_TIME)]
    pub genesis_time: UnixSeconds,

    #[clap(long, default_value_t = DEFAULT_SECONDS_PER_SLOT)]
    pub seconds_per_slot: NonZeroU64,

    #[clap(long, default_value_t = DEFAULT_SLOTS_PER_EPOCH)]
    pub slots_per_epoch: NonZeroU64,

    /// Number of blocks and proposer duties to keep in memory
    #[clap(long, default_value_t = DEFAULT_CACHE_SIZE)]
    pub cache_size: NonZeroUsize,

    /// Timeout for Beacon Node API requests
    #[clap(long, value_name = "MILLISECONDS", default_value_t = default_request_timeout_millis())]
    pub request_timeout: u64,

    #[clap(long, default_value_t = GAS_ELASTICITY_MULTIPLIER)]
    pub elasticity_multiplier: NonZeroU64,

    #[clap(long, default_value_t = BASE_FEE_CHANGE_DENOMINATOR)]
    pub base_fee_change_denominator: NonZeroU64,

    /// How to find the execution block a proposal builds on when the previous slot is empty
    #[clap(long, default_value_t = ParentHashPolicy::default())]
    pub parent_hash_policy: ParentHashPolicy,

    /// Earliest phase of blocks accepted from the beacon node
    #[clap(long, default_value_t = Phase::Bellatrix)]
    pub min_block_phase: Phase,

    /// Number of head events buffered for the consumer
    #[clap(long, default_value_t = DEFAULT_HEAD_EVENT_CAPACITY)]
    pub head_event_capacity: NonZeroUsize,

    /// What to do with new head events when the buffer is full
    #[clap(long, default_value_t = HeadEventOverflow::default())]
    pub head_event_overflow: HeadEventOverflow,

    /// Write log lines with ANSI colors even when stdout is not a terminal
    #[clap(long)]
    pub always_write_style: bool,
}

impl ChainMonitorArgs {
    #[must_use]
    pub const fn slot_clock(&self) -> SlotClock {
        SlotClock::new(
            self.genesis_time,
            self.seconds_per_slot,
            self.slots_per_epoch,
        )
    }

    #[must_use]
    pub const fn client_config(&self) -> Config {
        Config {
            cache_size: self.cache_size,
            request_timeout: Duration::from_millis(self.request_timeout),
            slots_per_epoch: self.slots_per_epoch,
            elasticity_multiplier: self.elasticity_multiplier,
            base_fee_change_denominator: self.base_fee_change_denominator,
            parent_hash_policy: self.parent_hash_policy,
            min_block_phase: self.min_block_phase,
            head_event_capacity: self.head_event_capacity,
            head_event_overflow: self.head_event_overflow,
        }
    }
}

#[expect(clippy::cast_possible_truncation)]
const fn default_request_timeout_millis() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_millis() as u64
}
