use std::num::NonZeroUsize;
use std::time::Duration;

/// Slot each ramp level gets when no explicit level count is configured. The run's duration is
/// divided into this many slots and every level waits out the rest of its slot after its batch.
pub const DEFAULT_LEVEL_INTERVAL: Duration = Duration::from_secs(6);

/// Shortest pause between two consecutive concurrency levels, even when a batch overran its slot.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(1);

/// Number of equal-width latency buckets in a [`BatchSummary`](crate::BatchSummary).
pub const DEFAULT_HISTOGRAM_BINS: NonZeroUsize = unsafe { NonZeroUsize::new_unchecked(10) };

/// Per-request timeout used by the HTTP transport.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const P50_PERCENTILE: u32 = 50;
pub const P95_PERCENTILE: u32 = 95;
