use log::debug;
use std::thread;
use std::time::{Duration, Instant};

/// Time source for polling loops. The only place the requestor blocks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Upper bound on a polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollLimit {
    /// Check at most this many times.
    Attempts(u32),
    /// Keep checking while less than this much time has elapsed.
    Deadline(Duration),
}

#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub limit: PollLimit,
}

impl PollPolicy {
    pub fn attempts(max_attempts: u32, interval: Duration) -> Self {
        Self {
            interval,
            limit: PollLimit::Attempts(max_attempts),
        }
    }

    pub fn deadline(timeout: Duration, interval: Duration) -> Self {
        Self {
            interval,
            limit: PollLimit::Deadline(timeout),
        }
    }
}

/// What a single check observed.
#[derive(Debug)]
pub enum Poll<T> {
    Ready(T),
    Pending,
}

/// Bookkeeping returned when a loop runs out of budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exhausted {
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Checks on a fixed interval until the check is ready, fails, or the limit is hit.
///
/// The check returns:
/// - `Ok(Poll::Ready(_))` to stop with a value
/// - `Ok(Poll::Pending)` to sleep and check again
/// - `Err(_)` to stop immediately without retrying
///
/// The outer `Ok(Err(Exhausted))` reports that the budget ran out.
pub fn poll_until<T, E, F>(
    clock: &dyn Clock,
    label: &str,
    policy: PollPolicy,
    mut check: F,
) -> Result<Result<T, Exhausted>, E>
where
    F: FnMut(u32) -> Result<Poll<T>, E>,
{
    let started = clock.now();
    let mut attempt = 0;

    loop {
        let elapsed = clock.now().saturating_duration_since(started);
        let budget_left = match policy.limit {
            PollLimit::Attempts(max) => attempt < max,
            PollLimit::Deadline(timeout) => elapsed < timeout,
        };
        if !budget_left {
            debug!(
                "[poll] {} gave up after {} attempt(s) and {}s",
                label,
                attempt,
                elapsed.as_secs()
            );
            return Ok(Err(Exhausted {
                attempts: attempt,
                elapsed,
            }));
        }

        attempt += 1;
        match check(attempt)? {
            Poll::Ready(value) => {
                debug!(
                    "[poll] {} ready after {}ms (attempt {})",
                    label,
                    clock.now().saturating_duration_since(started).as_millis(),
                    attempt
                );
                return Ok(Ok(value));
            }
            Poll::Pending => {
                if let PollLimit::Attempts(max) = policy.limit
                    && attempt >= max
                {
                    continue;
                }
                debug!(
                    "[poll] {} not ready (attempt {}), sleeping {}s",
                    label,
                    attempt,
                    policy.interval.as_secs()
                );
                clock.sleep(policy.interval);
            }
        }
    }
}
