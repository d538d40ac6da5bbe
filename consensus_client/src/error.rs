use parse_display::Display;
use reqwest::StatusCode;
use thiserror::Error;
use types::{
    nonstandard::Phase,
    primitives::{Epoch, ExecutionBlockNumber, PublicKeyBytes, Slot},
};

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Things that can be absent from the cache or the remote source.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Display)]
pub enum Missing {
    #[display("proposer for slot {0}")]
    Proposer(Slot),
    #[display("block at slot {0}")]
    Block(Slot),
    #[display("validator {0:?}")]
    Validator(PublicKeyBytes),
    #[display("validators")]
    Validators,
    #[display("parent of slot {0}")]
    Parent(Slot),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported block version: {version}")]
    UnsupportedVersion { version: String },
    #[error("{phase} block at slot {slot} has no execution payload")]
    MissingExecutionPayload { phase: Phase, slot: Slot },
    #[error("block at slot {slot} is from phase {phase}, which is older than {min_phase}")]
    UnexpectedPhase {
        phase: Phase,
        min_phase: Phase,
        slot: Slot,
    },
    #[error("failed to decode {phase} block: {source}")]
    Json {
        phase: Phase,
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{what} not found")]
    NotFound { what: Missing },
    #[error("beacon node is syncing and cannot serve proposer duties for epoch {epoch}")]
    Syncing { epoch: Epoch },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("beacon node responded with {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },
    #[error("event stream line exceeds {limit} bytes")]
    EventLineTooLong { limit: usize },
    #[error("invalid beacon node URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("{what} overflowed")]
    Overflow { what: &'static str },
    #[error("no block with number {block_number} is cached")]
    UnknownBlockNumber { block_number: ExecutionBlockNumber },
    #[error("no execution block hash is known at or before slot {slot}")]
    MissingExecutionHash { slot: Slot },
    #[error("parent gas target is zero but gas used is {gas_used}")]
    InvalidGasTarget { gas_used: u64 },
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub const fn is_syncing(&self) -> bool {
        matches!(self, Self::Syncing { .. })
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub(crate) const fn not_found(what: Missing) -> Self {
        Self::NotFound { what }
    }
}
