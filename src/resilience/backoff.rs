//! Linear backoff between retry attempts.

use std::time::Duration;

/// Delay before retrying after the given attempt (1-indexed).
///
/// Grows linearly: `base * attempt`. Attempt 0 yields no delay.
pub fn linear_backoff(attempt: u32, base: Duration) -> Duration {
    base.saturating_mul(attempt)
}
