use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::debug;

use crate::config::SessionConfig;

/// Events emitted by a running `SessionClock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// One period elapsed; `remaining_secs` is the budget left after it.
    Tick { remaining_secs: u32 },
    /// The budget reached zero. Sent once, after the final tick.
    Expired,
}

/// Countdown over a fixed budget of seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClock {
    budget_secs: u32,
    period: Duration,
}

impl SessionClock {
    #[must_use]
    pub fn new(budget_secs: u32, period: Duration) -> Self {
        let period = if period.is_zero() {
            Duration::from_millis(1)
        } else {
            period
        };
        Self {
            budget_secs,
            period,
        }
    }

    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.time_budget_secs, config.tick_interval)
    }

    /// Spawn the countdown. Events stop when the budget is exhausted, the
    /// receiver is dropped, or the returned handle is cancelled or dropped.
    #[must_use]
    pub fn start(self, events: UnboundedSender<ClockEvent>) -> ClockHandle {
        let task = tokio::spawn(async move {
            let mut remaining = self.budget_secs;
            if remaining > 0 {
                let mut ticker = interval_at(Instant::now() + self.period, self.period);
                while remaining > 0 {
                    ticker.tick().await;
                    remaining -= 1;
                    if events
                        .send(ClockEvent::Tick {
                            remaining_secs: remaining,
                        })
                        .is_err()
                    {
                        return;
                    }
                }
            }
            debug!("session clock expired");
            let _ = events.send(ClockEvent::Expired);
        });
        ClockHandle { task: Some(task) }
    }
}

/// Owning handle to a running clock. Dropping it stops the clock.
#[derive(Debug)]
pub struct ClockHandle {
    task: Option<JoinHandle<()>>,
}

impl ClockHandle {
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ClockHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn counts_down_then_expires_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _clock = SessionClock::new(3, Duration::from_secs(1)).start(tx);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        assert_eq!(
            events,
            vec![
                ClockEvent::Tick { remaining_secs: 2 },
                ClockEvent::Tick { remaining_secs: 1 },
                ClockEvent::Tick { remaining_secs: 0 },
                ClockEvent::Expired,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn zero_budget_expires_immediately() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _clock = SessionClock::new(0, Duration::from_secs(1)).start(tx);
        assert_eq!(rx.recv().await, Some(ClockEvent::Expired));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_clock_goes_quiet() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut clock = SessionClock::new(600, Duration::from_secs(1)).start(tx);

        assert_eq!(
            rx.recv().await,
            Some(ClockEvent::Tick {
                remaining_secs: 599
            })
        );
        clock.cancel();
        assert_eq!(rx.recv().await, None);
    }
}
