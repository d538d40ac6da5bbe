use core::future::Future;

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;
use types::{
    api::{ProposerDuty, ValidatorRecord},
    combined::SignedBeaconBlock,
    primitives::{Epoch, Slot, H256},
};

use crate::{
    error::{Error, Result},
    sse::ServerSentEvent,
};

/// Point queries and the head subscription of a beacon node.
///
/// Implementations do not retry. Cancellation is applied by callers.
#[async_trait]
pub trait RemoteChainSource: Send + Sync {
    /// Fails with [`Error::Syncing`] if the node cannot serve duties yet.
    async fn proposer_duties(&self, epoch: Epoch) -> Result<Vec<ProposerDuty>>;

    /// Returns [`None`] if no block was proposed at `slot`.
    async fn block(&self, slot: Slot) -> Result<Option<SignedBeaconBlock>>;

    async fn validators(&self) -> Result<Vec<ValidatorRecord>>;

    async fn randao(&self, slot: Slot) -> Result<H256>;

    async fn head_events(&self) -> Result<BoxStream<'static, Result<ServerSentEvent>>>;
}

pub async fn cancellable<T>(
    token: &CancellationToken,
    future: impl Future<Output = Result<T>> + Send,
) -> Result<T> {
    tokio::select! {
        biased;

        () = token.cancelled() => Err(Error::Cancelled),
        result = future => result,
    }
}
