use core::{
    fmt::{Display, Formatter, Result as FmtResult},
    sync::atomic::{AtomicU64, Ordering},
};

// `u64::MAX` is not a reachable slot in any network, so it doubles as "no head observed yet".
const UNKNOWN_HEAD: u64 = u64::MAX;

pub static HEAD_LOG_METRICS: HeadLogMetrics = HeadLogMetrics::new();

#[derive(Debug)]
pub struct HeadLogMetrics {
    head_slot: AtomicU64,
}

impl Display for HeadLogMetrics {
    fn fmt(&self, formatter: &mut Formatter) -> FmtResult {
        match self.head_slot() {
            Some(slot) => write!(formatter, "head: {slot}"),
            None => formatter.write_str("head: unknown"),
        }
    }
}

impl Default for HeadLogMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadLogMetrics {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            head_slot: AtomicU64::new(UNKNOWN_HEAD),
        }
    }

    pub fn set_head_slot(&self, slot: u64) {
        self.head_slot.store(slot, Ordering::Relaxed)
    }

    #[must_use]
    pub fn head_slot(&self) -> Option<u64> {
        let slot = self.head_slot.load(Ordering::Relaxed);
        (slot != UNKNOWN_HEAD).then_some(slot)
    }
}

#[macro_export]
macro_rules! info_with_head {
    ($($arg:tt)*) => {
        ::tracing::info!("[{}] {}", $crate::HEAD_LOG_METRICS, format_args!($($arg)*));
    };
}

#[macro_export]
macro_rules! debug_with_head {
    ($($arg:tt)*) => {
        ::tracing::debug!("[{}] {}", $crate::HEAD_LOG_METRICS, format_args!($($arg)*));
    };
}

#[macro_export]
macro_rules! warn_with_head {
    ($($arg:tt)*) => {
        ::tracing::warn!("[{}] {}", $crate::HEAD_LOG_METRICS, format_args!($($arg)*));
    };
}

#[macro_export]
macro_rules! error_with_head {
    ($($arg:tt)*) => {
        ::tracing::error!("[{}] {}", $crate::HEAD_LOG_METRICS, format_args!($($arg)*));
    };
}

#[macro_export]
macro_rules! trace_with_head {
    ($($arg:tt)*) => {
        ::tracing::trace!("[{}] {}", $crate::HEAD_LOG_METRICS, format_args!($($arg)*));
    };
}
