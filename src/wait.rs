//! Bounded polling
//!
//! Every wait in the crate (ready, response, event) is a probe re-run on a
//! fixed interval until it yields a value or the deadline passes. The elapsed
//! deadline is the only cancellation signal.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep};

use crate::error::Result;

/// Run `probe` every `interval` until it yields `Some` or `timeout` elapses
///
/// The probe always runs at least once, and once more at the deadline, so a
/// value that appears during the last sleep is still seen. Returns `Ok(None)`
/// on timeout; probe errors end the wait immediately.
///
/// # Errors
/// Returns the first error produced by `probe`
pub async fn poll_until<T, F, Fut>(interval: Duration, timeout: Duration, mut probe: F) -> Result<Option<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(value) = probe().await? {
            return Ok(Some(value));
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        sleep(interval.min(deadline - now)).await;
    }
}
