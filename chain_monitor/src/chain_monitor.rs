use clock::SlotClock;
use consensus_client::{ConsensusClient, Error, RemoteChainSource};
use logging::{info_with_head, warn_with_head};
use tokio_util::sync::CancellationToken;
use types::{
    nonstandard::Coordinate,
    primitives::{Epoch, Slot},
};

pub struct ChainMonitor<S> {
    client: ConsensusClient<S>,
    clock: SlotClock,
    last_epoch: Option<Epoch>,
}

impl<S: RemoteChainSource + 'static> ChainMonitor<S> {
    #[must_use]
    pub const fn new(client: ConsensusClient<S>, clock: SlotClock) -> Self {
        Self {
            client,
            clock,
            last_epoch: None,
        }
    }

    pub async fn run(mut self, token: CancellationToken) {
        let report = self.client.bootstrap_report();

        if report.is_complete() {
            info_with_head!("bootstrap complete");
        } else {
            warn_with_head!(
                "bootstrap incomplete ({} steps failed), missing data will be fetched on demand",
                report.failures.len(),
            );
        }

        let heads = self.client.stream_heads(token.clone());

        while let Ok(head) = heads.recv().await {
            self.handle_head(head, &token).await;
        }

        info_with_head!("head event stream closed");
    }

    async fn handle_head(&mut self, head: Coordinate, token: &CancellationToken) {
        let Coordinate { slot, root } = head;
        let epoch = self.clock.epoch_at_slot(slot);

        info_with_head!("new head (slot: {slot}, root: {root:?})");

        if self.last_epoch.replace(epoch) != Some(epoch) {
            self.refresh_epoch(epoch, token).await;
        }

        if let Err(error) = self.client.cache().fetch_block(slot, token).await {
            report_failure("head block", &error);
        }

        match slot.checked_add(1) {
            Some(next_slot) => self.report_proposal(next_slot, token).await,
            None => warn_with_head!("head slot {slot} has no successor"),
        }
    }

    async fn refresh_epoch(&self, epoch: Epoch, token: &CancellationToken) {
        let cache = self.client.cache();

        for epoch in [Some(epoch), epoch.checked_add(1)].into_iter().flatten() {
            if let Err(error) = cache.fetch_proposers(epoch, token).await {
                report_failure("proposer duties", &error);
            }
        }

        if let Err(error) = cache.fetch_validators(token).await {
            report_failure("validators", &error);
        }
    }

    async fn report_proposal(&self, slot: Slot, token: &CancellationToken) {
        let cache = self.client.cache();
        let context = self.client.proposal_context();

        let proposer = match cache.get_proposer(slot) {
            Ok(proposer) => proposer,
            Err(error) => return report_failure("proposer", &error),
        };

        let lifecycle = cache
            .get_validator_lifecycle(proposer.public_key)
            .map(|lifecycle| lifecycle.to_string())
            .unwrap_or_else(|error| error.to_string());

        let parent_hash = match cache.get_parent_hash(slot, token).await {
            Ok(parent_hash) => parent_hash,
            Err(error) => return report_failure("parent hash", &error),
        };

        let block_number = match context.next_block_number(slot, token).await {
            Ok(block_number) => block_number,
            Err(error) => return report_failure("block number", &error),
        };

        let base_fee = match context.next_base_fee(slot, token).await {
            Ok(base_fee) => base_fee,
            Err(error) => return report_failure("base fee", &error),
        };

        info_with_head!(
            "next proposal (slot: {slot}, proposer: {}, public key: {:?}, status: {lifecycle}, \
             block number: {block_number}, parent hash: {parent_hash:?}, base fee: {base_fee})",
            proposer.validator_index,
            proposer.public_key,
        );
    }
}

fn report_failure(what: &str, error: &Error) {
    if !error.is_cancelled() {
        warn_with_head!("failed to determine {what}: {error}");
    }
}
