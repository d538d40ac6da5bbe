pub use crate::{
    beacon_node_api::{build_http_client, BeaconNodeApi},
    bootstrap::{BootstrapFailure, BootstrapReport, BootstrapStep},
    cache_index::{CacheIndex, EvictionPolicy},
    client::ConsensusClient,
    config::{Config, HeadEventOverflow, ParentHashPolicy},
    consensus_cache::ConsensusCache,
    error::{Error, Missing, ParseError, Result},
    execution_hash_index::ExecutionHashIndex,
    head_events::{spawn_head_event_stream, HeadEvents},
    proposal_context::{compute_base_fee, ProposalContext},
    remote::RemoteChainSource,
    slot_indexed_cache::SlotIndexedCache,
    sse::{ServerSentEvent, SseDecoder, MAX_EVENT_LINE_LENGTH},
    validator_registry::ValidatorRegistry,
};

pub mod config;

mod beacon_node_api;
mod bootstrap;
mod cache_index;
mod client;
mod consensus_cache;
mod error;
mod execution_hash_index;
mod head_events;
mod proposal_context;
mod remote;
mod slot_indexed_cache;
mod sse;
mod validator_registry;

#[cfg(test)]
mod mock_source;
