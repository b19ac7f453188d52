//! Wall-clock timestamps for job bookkeeping.

use std::fmt::{Display, Formatter};
use std::time::{Duration, SystemTime};

use serde::Serialize;

/// Milliseconds since the Unix epoch (1970-01-01T00:00:00Z).
///
/// Serialized as a plain JSON number, the shape browser clients get from
/// `Date.now()`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Ord, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UnixMillis(u64);

impl Display for UnixMillis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl UnixMillis {
    /// Creates a timestamp from a raw millisecond value.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns the current system time.
    ///
    /// A clock set before the epoch reads as `0`.
    #[must_use]
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        Self(millis)
    }

    /// Returns the raw millisecond value.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Time elapsed from `self` until `later`, saturating at zero.
    #[must_use]
    pub const fn elapsed_until(&self, later: Self) -> Duration {
        Duration::from_millis(later.0.saturating_sub(self.0))
    }
}
