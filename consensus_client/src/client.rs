use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use types::primitives::{Epoch, Slot};

use crate::{
    bootstrap::BootstrapReport,
    config::Config,
    consensus_cache::ConsensusCache,
    head_events::{self, HeadEvents},
    proposal_context::ProposalContext,
    remote::RemoteChainSource,
};

pub struct ConsensusClient<S> {
    cache: Arc<ConsensusCache<S>>,
    proposal_context: ProposalContext<S>,
    bootstrap_report: BootstrapReport,
}

impl<S: RemoteChainSource + 'static> ConsensusClient<S> {
    /// Creates a client and loads the context around `current_slot`.
    ///
    /// Loading is best-effort. See [`Self::bootstrap_report`] for what could not be loaded.
    pub async fn new(
        source: Arc<S>,
        config: Config,
        current_slot: Slot,
        current_epoch: Epoch,
        token: &CancellationToken,
    ) -> Self {
        let cache = Arc::new(ConsensusCache::new(source, config));

        let bootstrap_report = cache
            .load_current_context(current_slot, current_epoch, token)
            .await;

        Self {
            proposal_context: ProposalContext::new(Arc::clone(&cache)),
            cache,
            bootstrap_report,
        }
    }

    #[must_use]
    pub const fn cache(&self) -> &Arc<ConsensusCache<S>> {
        &self.cache
    }

    #[must_use]
    pub const fn proposal_context(&self) -> &ProposalContext<S> {
        &self.proposal_context
    }

    #[must_use]
    pub const fn bootstrap_report(&self) -> &BootstrapReport {
        &self.bootstrap_report
    }

    /// Starts a head event subscription that runs until `token` is cancelled or the feed ends.
    #[must_use]
    pub fn stream_heads(&self, token: CancellationToken) -> HeadEvents {
        head_events::spawn_head_event_stream(
            Arc::clone(self.cache.source()),
            self.cache.config(),
            token,
        )
    }
}
