use core::future::Future;

use itertools::Itertools as _;
use logging::{info_with_head, warn_with_head};
use parse_display::Display;
use tokio_util::sync::CancellationToken;
use types::primitives::{Epoch, Slot};

use crate::{consensus_cache::ConsensusCache, error::Result, remote::RemoteChainSource};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Display)]
pub enum BootstrapStep {
    #[display("block at slot {0}")]
    Block(Slot),
    #[display("proposer duties for epoch {0}")]
    Proposers(Epoch),
    #[display("validators")]
    Validators,
}

#[derive(Clone, PartialEq, Eq, Debug, Display)]
#[display("{step}: {error}")]
pub struct BootstrapFailure {
    pub step: BootstrapStep,
    pub error: String,
}

#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct BootstrapReport {
    pub failures: Vec<BootstrapFailure>,
}

impl BootstrapReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub fn failed(&self, step: BootstrapStep) -> bool {
        self.failures.iter().any(|failure| failure.step == step)
    }

    async fn run(
        &mut self,
        step: BootstrapStep,
        future: impl Future<Output = Result<()>> + Send,
    ) {
        if let Err(error) = future.await {
            warn_with_head!("bootstrap step failed ({step}): {error}");

            self.failures.push(BootstrapFailure {
                step,
                error: error.to_string(),
            });
        }
    }
}

pub async fn load_current_context<S: RemoteChainSource>(
    cache: &ConsensusCache<S>,
    current_slot: Slot,
    current_epoch: Epoch,
    token: &CancellationToken,
) -> BootstrapReport {
    let mut report = BootstrapReport::default();
    let slots_per_epoch = cache.config().slots_per_epoch.get();

    for slot in (0..slots_per_epoch).map_while(|offset| current_slot.checked_sub(offset)) {
        report
            .run(BootstrapStep::Block(slot), cache.fetch_block(slot, token))
            .await;
    }

    for epoch in [current_epoch, current_epoch.saturating_add(1)] {
        report
            .run(BootstrapStep::Proposers(epoch), cache.fetch_proposers(epoch, token))
            .await;
    }

    report
        .run(BootstrapStep::Validators, cache.fetch_validators(token))
        .await;

    if report.is_complete() {
        info_with_head!(
            "loaded consensus context at slot {current_slot} (blocks: {}, proposers: {}, validators: {})",
            cache.cached_block_count(),
            cache.cached_proposer_count(),
            cache.validator_count(),
        );
    } else {
        warn_with_head!(
            "loaded consensus context at slot {current_slot} with {} failed steps: {}",
            report.failures.len(),
            report.failures.iter().format("; "),
        );
    }

    report
}
