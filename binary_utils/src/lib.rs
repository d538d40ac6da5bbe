use std::io::{self, IsTerminal as _};

use anyhow::Result;
use chrono::{Local, SecondsFormat};
use logging::debug_with_head;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, format::Writer, time::FormatTime},
    prelude::*,
    EnvFilter,
};

pub const LOG_FILTER_ENV_VAR: &str = "CHAIN_MONITOR_LOG";

const WORKSPACE_CRATES: &[&str] = &["binary_utils", "clock", "consensus_client", "logging", "types"];

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> core::fmt::Result {
        write!(
            w,
            "[{}]",
            Local::now().to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }
}

pub fn initialize_tracing_logger(module_path: &str, always_write_style: bool) -> Result<()> {
    let overrides = std::env::var(LOG_FILTER_ENV_VAR).ok();
    let filter = build_filter(module_path, overrides.as_deref())?;

    let enable_ansi = always_write_style || io::stdout().is_terminal();

    let stdout_layer = fmt::layer()
        .compact()
        .with_thread_ids(false)
        .with_target(true)
        .with_file(false)
        .with_line_number(true)
        .with_timer(LocalTimer)
        .with_ansi(enable_ansi);

    tracing_subscriber::registry()
        .with(stdout_layer.with_filter(filter))
        .try_init()?;

    debug_with_head!("tracing started!");

    Ok(())
}

/// Logs workspace crates and `module_path` at `info`, then applies comma-separated `overrides`.
fn build_filter(module_path: &str, overrides: Option<&str>) -> Result<EnvFilter> {
    let mut filter = EnvFilter::default().add_directive(LevelFilter::OFF.into());

    for krate in WORKSPACE_CRATES.iter().copied().chain([module_path]) {
        filter = filter.add_directive(format!("{krate}=info").parse()?);
    }

    for directive in overrides
        .into_iter()
        .flat_map(|overrides| overrides.split(','))
        .map(str::trim)
        .filter(|directive| !directive.is_empty())
    {
        filter = filter.add_directive(directive.parse()?);
    }

    Ok(filter)
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(None, "consensus_client=info")]
    #[test_case(None, "chain_monitor=info")]
    #[test_case(Some("consensus_client=debug"), "consensus_client=debug")]
    #[test_case(Some("clock=trace, logging=warn"), "logging=warn")]
    fn build_filter_contains_directive(overrides: Option<&str>, expected: &str) -> Result<()> {
        let filter = build_filter("chain_monitor", overrides)?.to_string();

        assert!(
            filter.split(',').any(|directive| directive == expected),
            "{expected} not found in {filter}",
        );

        Ok(())
    }

    #[test]
    fn build_filter_rejects_invalid_overrides() {
        build_filter("chain_monitor", Some("consensus_client=loud"))
            .expect_err("loud is not a log level");
    }
}
