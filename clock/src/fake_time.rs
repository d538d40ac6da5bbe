//! A [`SystemTimeLike`] implementation for tests that need a fixed wall clock.

use core::time::Duration;

use thiserror::Error;

use crate::SystemTimeLike;

#[derive(Clone, Copy)]
pub struct FakeSystemTime(pub Duration);

impl FakeSystemTime {
    pub const fn from_secs(seconds: u64) -> Self {
        Self(Duration::from_secs(seconds))
    }
}

#[derive(Debug, Error)]
#[error("second time provided was later by {0:?}")]
pub struct FakeSystemTimeError(pub Duration);

impl SystemTimeLike for FakeSystemTime {
    type Error = FakeSystemTimeError;

    const UNIX_EPOCH: Self = Self(Duration::ZERO);

    fn duration_since(self, earlier: Self) -> Result<Duration, Self::Error> {
        let later = self.0;
        let earlier = earlier.0;
        later
            .checked_sub(earlier)
            .ok_or_else(|| FakeSystemTimeError(earlier - later))
    }
}
