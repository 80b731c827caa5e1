//! Tick scheduler for the reveal animation

use crate::state_machine::Event;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_REVEAL_INTERVAL: Duration = Duration::from_millis(30);

/// Sends `Event::RevealTick` at a fixed cadence until stopped.
///
/// Runs on tokio time, so a paused test clock drives it deterministically.
pub struct RevealAnimator {
    interval: Duration,
    events: mpsc::Sender<Event>,
    active: Option<CancellationToken>,
}

impl RevealAnimator {
    pub fn new(interval: Duration, events: mpsc::Sender<Event>) -> Self {
        Self {
            interval,
            events,
            active: None,
        }
    }

    /// Start ticking for `request_id`. Any previous animation is stopped first
    /// and its remaining ticks never fire.
    pub fn start(&mut self, request_id: u64) {
        self.stop();

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let events = self.events.clone();
        let period = self.interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately; the first unit should wait one period
            ticker.tick().await;
            loop {
                tokio::select! {
                    () = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        if events.send(Event::RevealTick { request_id }).await.is_err() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!(request_id, "Reveal ticker stopped");
        });

        self.active = Some(token);
    }

    pub fn stop(&mut self) {
        if let Some(token) = self.active.take() {
            token.cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.as_ref().is_some_and(|t| !t.is_cancelled())
    }
}

impl Drop for RevealAnimator {
    fn drop(&mut self) {
        self.stop();
    }
}
