use std::{process::ExitCode, sync::Arc};

use anyhow::Result;
use clap::{Error as ClapError, Parser as _};
use consensus_client::{build_http_client, BeaconNodeApi, ConsensusClient};
use logging::{error_with_head, info_with_head, warn_with_head};
use tokio::{runtime::Builder, signal};
use tokio_util::sync::CancellationToken;

use crate::{chain_monitor::ChainMonitor, chain_monitor_args::ChainMonitorArgs};

mod chain_monitor;
mod chain_monitor_args;

fn main() -> ExitCode {
    if let Err(error) = try_main() {
        error.downcast_ref().map(ClapError::exit);
        error_with_head!("{error:?}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main() -> Result<()> {
    let args = ChainMonitorArgs::try_parse()?;

    binary_utils::initialize_tracing_logger(module_path!(), args.always_write_style)?;

    Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(args))
}

async fn run(args: ChainMonitorArgs) -> Result<()> {
    let clock = args.slot_clock();
    let config = args.client_config();
    let token = CancellationToken::new();

    tokio::spawn({
        let token = token.clone();

        async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info_with_head!("received interrupt, shutting down");
                    token.cancel();
                }
                Err(error) => warn_with_head!("failed to listen for interrupts: {error}"),
            }
        }
    });

    let api = BeaconNodeApi::new(
        args.beacon_node_url,
        build_http_client()?,
        config.request_timeout,
    );

    let current_slot = clock.current_slot()?;
    let current_epoch = clock.epoch_at_slot(current_slot);

    info_with_head!(
        "following {} (current slot: {current_slot}, current epoch: {current_epoch})",
        api.url(),
    );

    let client =
        ConsensusClient::new(Arc::new(api), config, current_slot, current_epoch, &token).await;

    ChainMonitor::new(client, clock).run(token).await;

    Ok(())
}
