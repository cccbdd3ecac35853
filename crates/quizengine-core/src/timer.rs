//! Countdown timer for timed quizzes.
//!
//! The timer runs as its own tokio task. Remaining time is always derived
//! from the elapsed clock time since start, so late wakeups never make the
//! countdown drift; the task only wakes on whole-second boundaries to publish
//! the new value. When the countdown reaches zero the expiry callback is
//! spawned exactly once and the task ends.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

pub struct CountdownTimer {
    limit_seconds: u32,
    started_at: Instant,
    stopped_remaining: Option<u32>,
    remaining_rx: watch::Receiver<u32>,
    handle: JoinHandle<()>,
}

impl CountdownTimer {
    /// Starts counting down from `limit_seconds`.
    ///
    /// Returns `None` for a zero limit: untimed sessions never own a timer.
    /// Must be called from within a tokio runtime.
    pub fn start<F, Fut>(limit_seconds: u32, on_expiry: F) -> Option<Self>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if limit_seconds == 0 {
            return None;
        }

        let started_at = Instant::now();
        let (remaining_tx, remaining_rx) = watch::channel(limit_seconds);
        let handle = tokio::spawn(run_countdown(
            limit_seconds,
            started_at,
            remaining_tx,
            on_expiry,
        ));

        Some(Self {
            limit_seconds,
            started_at,
            stopped_remaining: None,
            remaining_rx,
            handle,
        })
    }

    pub fn limit_seconds(&self) -> u32 {
        self.limit_seconds
    }

    /// Seconds left, computed from the clock (frozen once stopped).
    pub fn remaining_seconds(&self) -> u32 {
        match self.stopped_remaining {
            Some(frozen) => frozen,
            None => remaining_after(self.limit_seconds, self.started_at.elapsed()),
        }
    }

    /// Seconds consumed so far.
    pub fn elapsed_seconds(&self) -> u32 {
        self.limit_seconds - self.remaining_seconds()
    }

    pub fn is_running(&self) -> bool {
        self.stopped_remaining.is_none() && !self.handle.is_finished()
    }

    /// Receives the remaining seconds after every whole-second tick.
    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.remaining_rx.clone()
    }

    /// Stops the countdown without firing expiry and returns the seconds left.
    ///
    /// Stopping twice returns the value frozen by the first call.
    pub fn stop(&mut self) -> u32 {
        if let Some(frozen) = self.stopped_remaining {
            return frozen;
        }
        let remaining = self.remaining_seconds();
        self.handle.abort();
        self.stopped_remaining = Some(remaining);
        tracing::debug!(remaining, "countdown stopped");
        remaining
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl std::fmt::Debug for CountdownTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownTimer")
            .field("limit_seconds", &self.limit_seconds)
            .field("remaining_seconds", &self.remaining_seconds())
            .field("running", &self.is_running())
            .finish()
    }
}

fn remaining_after(limit_seconds: u32, elapsed: Duration) -> u32 {
    let elapsed = u32::try_from(elapsed.as_secs()).unwrap_or(u32::MAX);
    limit_seconds.saturating_sub(elapsed)
}

async fn run_countdown<F, Fut>(
    limit_seconds: u32,
    started_at: Instant,
    remaining_tx: watch::Sender<u32>,
    on_expiry: F,
) where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let mut remaining = limit_seconds;
    while remaining > 0 {
        let next_boundary = u64::from(limit_seconds - remaining + 1);
        tokio::time::sleep_until(started_at + Duration::from_secs(next_boundary)).await;
        remaining = remaining_after(limit_seconds, started_at.elapsed());
        remaining_tx.send_replace(remaining);
        tracing::trace!(remaining, "countdown tick");
    }

    tracing::debug!(limit_seconds, "countdown expired");
    // Spawned so that the callback may stop or drop this timer without
    // aborting itself.
    tokio::spawn(on_expiry());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn counting_timer(limit: u32) -> (Option<CountdownTimer>, Arc<AtomicU32>) {
        let fired = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&fired);
        let timer = CountdownTimer::start(limit, move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (timer, fired)
    }

    #[tokio::test(start_paused = true)]
    async fn zero_limit_creates_no_timer() {
        let (timer, fired) = counting_timer(0);
        assert!(timer.is_none());
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn expires_exactly_once() {
        let (timer, fired) = counting_timer(3);
        let timer = timer.unwrap();

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(timer.remaining_seconds(), 1);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(timer.remaining_seconds(), 0);
        assert_eq!(timer.elapsed_seconds(), 3);
        assert!(!timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_expiry_and_freezes_remaining() {
        let (timer, fired) = counting_timer(3);
        let mut timer = timer.unwrap();

        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(timer.stop(), 2);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(timer.remaining_seconds(), 2);
        assert_eq!(timer.stop(), 2);
        assert!(!timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_timer_cancels_expiry() {
        let (timer, fired) = counting_timer(2);
        drop(timer);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn remaining_follows_the_clock_not_the_tick_count() {
        let (timer, _fired) = counting_timer(10);
        let timer = timer.unwrap();

        // Jump the clock without letting the timer task run in between.
        tokio::time::advance(Duration::from_millis(4_200)).await;
        assert_eq!(timer.remaining_seconds(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_each_second() {
        let (timer, _fired) = counting_timer(3);
        let timer = timer.unwrap();
        let mut rx = timer.subscribe();
        assert_eq!(*rx.borrow(), 3);

        let mut seen = Vec::new();
        while rx.changed().await.is_ok() {
            seen.push(*rx.borrow_and_update());
        }
        assert_eq!(seen, vec![2, 1, 0]);
    }
}
