//! Quiet-period debouncing for rapidly changing input.

use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Holds the latest scheduled value until `delay` has passed without a
/// newer one.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replaces any pending value and restarts the timer.
    pub fn schedule(&mut self, value: T) {
        self.pending = Some((value, Instant::now() + self.delay));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Takes the pending value once its deadline has passed.
    pub fn take_ready(&mut self) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= Instant::now() => {
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

/// Completes at `deadline`, or never when there is none.
pub async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_quiet_period() {
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        debouncer.schedule(1);
        assert!(debouncer.take_ready().is_none());

        advance(Duration::from_millis(500)).await;
        assert_eq!(debouncer.take_ready(), Some(1));
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_schedule_restarts_timer() {
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        debouncer.schedule("1");
        advance(Duration::from_millis(300)).await;
        debouncer.schedule("12");
        advance(Duration::from_millis(300)).await;
        assert!(debouncer.take_ready().is_none());

        advance(Duration::from_millis(200)).await;
        assert_eq!(debouncer.take_ready(), Some("12"));
        assert!(debouncer.take_ready().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_deadline() {
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        debouncer.schedule(7);
        let start = Instant::now();
        wait_for(debouncer.deadline()).await;
        assert!(Instant::now() - start >= Duration::from_millis(500));
        assert_eq!(debouncer.take_ready(), Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_and_no_deadline() {
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        debouncer.schedule(1);
        debouncer.cancel();
        assert!(debouncer.deadline().is_none());

        let waited =
            tokio::time::timeout(Duration::from_secs(5), wait_for(debouncer.deadline())).await;
        assert!(waited.is_err());
    }
}
