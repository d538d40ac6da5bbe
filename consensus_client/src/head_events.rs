use std::sync::Arc;

use async_channel::{Receiver, Sender, TrySendError};
use futures::stream::{BoxStream, StreamExt as _};
use logging::{debug_with_head, error_with_head, trace_with_head, warn_with_head, HEAD_LOG_METRICS};
use tokio_util::sync::CancellationToken;
use types::nonstandard::Coordinate;

use crate::{
    config::{Config, HeadEventOverflow},
    error::{Error, Result},
    remote::{cancellable, RemoteChainSource},
    sse::ServerSentEvent,
};

const HEAD_EVENT_TYPE: &str = "head";

/// The receiving end of a head event subscription.
///
/// Closed once the subscription ends for any reason.
pub type HeadEvents = Receiver<Coordinate>;

/// Subscribes to head events in a background task and republishes them as [`Coordinate`]s.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_head_event_stream<S: RemoteChainSource + 'static>(
    source: Arc<S>,
    config: &Config,
    token: CancellationToken,
) -> HeadEvents {
    let (sender, receiver) = async_channel::bounded(config.head_event_capacity.get());

    let publisher = match config.head_event_overflow {
        HeadEventOverflow::Block => Publisher::Blocking { sender },
        HeadEventOverflow::DropOldest => Publisher::DropOldest {
            sender,
            receiver: receiver.clone(),
        },
    };

    tokio::spawn(async move {
        let events = match cancellable(&token, source.head_events()).await {
            Ok(events) => events,
            Err(Error::Cancelled) => return,
            Err(error) => {
                error_with_head!("could not subscribe to head events: {error}");
                return;
            }
        };

        run_head_event_stream(events, publisher, &token).await;
    });

    receiver
}

async fn run_head_event_stream(
    mut events: BoxStream<'static, Result<ServerSentEvent>>,
    publisher: Publisher,
    token: &CancellationToken,
) {
    loop {
        let event = tokio::select! {
            () = token.cancelled() => {
                debug_with_head!("head event stream cancelled");
                return;
            }
            event = events.next() => event,
        };

        let event = match event {
            Some(Ok(event)) => event,
            Some(Err(error)) => {
                error_with_head!("head event stream failed: {error}");
                return;
            }
            None => {
                warn_with_head!("head event stream ended");
                return;
            }
        };

        if event.event != HEAD_EVENT_TYPE {
            trace_with_head!("ignoring {} event", event.event);
            continue;
        }

        let coordinate = match parse_head_event(&event.data) {
            Ok(coordinate) => coordinate,
            Err(error) => {
                warn_with_head!("dropping malformed head event ({error}): {}", event.data);
                continue;
            }
        };

        HEAD_LOG_METRICS.set_head_slot(coordinate.slot);

        if !publisher.publish(coordinate, token).await {
            debug_with_head!("head event consumer is gone");
            return;
        }
    }
}

fn parse_head_event(data: &str) -> serde_json::Result<Coordinate> {
    serde_json::from_str(data)
}

enum Publisher {
    Blocking {
        sender: Sender<Coordinate>,
    },
    DropOldest {
        sender: Sender<Coordinate>,
        // Used to evict the oldest pending event. Keeps the channel open on its own.
        receiver: Receiver<Coordinate>,
    },
}

impl Publisher {
    /// Returns `false` if publishing should stop.
    async fn publish(&self, mut coordinate: Coordinate, token: &CancellationToken) -> bool {
        match self {
            Self::Blocking { sender } => tokio::select! {
                () = token.cancelled() => false,
                result = sender.send(coordinate) => result.is_ok(),
            },
            Self::DropOldest { sender, receiver } => loop {
                if sender.receiver_count() <= 1 {
                    return false;
                }

                match sender.try_send(coordinate) {
                    Ok(()) => return true,
                    Err(TrySendError::Full(rejected)) => {
                        if let Ok(dropped) = receiver.try_recv() {
                            debug_with_head!("dropping unconsumed head event: {dropped:?}");
                        }

                        coordinate = rejected;
                    }
                    Err(TrySendError::Closed(_)) => return false,
                }
            },
        }
    }
}
