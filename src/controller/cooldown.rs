use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

/// Seconds left before another submission is accepted. Zero means inactive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cooldown {
    remaining: u32,
}

impl Cooldown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, secs: u32) {
        self.remaining = secs;
    }

    /// One elapsed second. Never goes below zero.
    pub fn tick(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }
}

/// Recurring tick source for a running cooldown.
///
/// Sends `tick` into the owner's event channel once per `period`, starting one
/// period after creation. The task is aborted when the timer is dropped and
/// exits on its own once the receiver is gone, so it cannot outlive the view
/// that owns it.
pub struct CooldownTimer {
    handle: JoinHandle<()>,
}

impl CooldownTimer {
    pub fn start<T>(period: Duration, sender: UnboundedSender<T>, tick: T) -> Self
    where
        T: Clone + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if sender.send(tick.clone()).is_err() {
                    log::debug!("Cooldown receiver gone, stopping timer");
                    break;
                }
            }
        });

        Self { handle }
    }

    /// Stops the timer now. Equivalent to dropping it.
    pub fn cancel(self) {}

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for CooldownTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_counts_down_to_zero_and_stays() {
        let mut cooldown = Cooldown::new();
        assert!(!cooldown.is_active());

        cooldown.start(2);
        assert!(cooldown.is_active());
        assert_eq!(cooldown.tick(), 1);
        assert_eq!(cooldown.tick(), 0);
        assert!(!cooldown.is_active());
        assert_eq!(cooldown.tick(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_ticks_once_per_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let started = Instant::now();
        let _timer = CooldownTimer::start(Duration::from_secs(1), tx, ());

        rx.recv().await.unwrap();
        let first = started.elapsed();
        assert!(first >= Duration::from_secs(1) && first < Duration::from_secs(2));
        rx.recv().await.unwrap();
        let second = started.elapsed();
        assert!(second >= Duration::from_secs(2) && second < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_timer_stops_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        let timer = CooldownTimer::start(Duration::from_secs(1), tx, ());

        timer.cancel();

        // The aborted task drops the only sender, closing the channel.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_exits_when_receiver_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        let timer = CooldownTimer::start(Duration::from_secs(1), tx, ());
        drop(rx);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        tokio::task::yield_now().await;
        assert!(timer.is_finished());
    }
}
