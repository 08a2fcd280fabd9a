//! Per-id countdown timers driving the live display.
//!
//! Each timer is an independent tokio task ticking once per second and
//! publishing frames on a `watch` channel. Starting a timer for an id that is
//! already running cancels the old task first, so there is at most one active
//! countdown per id; a fresh server snapshot re-anchors the countdown simply
//! by starting it again.

use std::time::Duration;

use dashmap::DashMap;
use tokio::{sync::watch, task::JoinHandle, time::interval};

/// Default wall-clock tick of one second.
const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// One renderable countdown sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountdownFrame {
    /// Seconds left; clamps at zero.
    pub remaining: u64,
    /// Full duration the fraction is computed against.
    pub total: u64,
    /// Proportion of time left, for circular progress rendering.
    pub fraction: f64,
}

impl CountdownFrame {
    fn new(remaining: u64, total: u64) -> Self {
        Self {
            remaining,
            total,
            fraction: fraction(remaining, total),
        }
    }
}

/// Proportion of time left.
///
/// The denominator is the largest of `total`, `remaining`, and 1, which
/// avoids dividing by zero and falls back to `remaining` itself when the
/// total is unknown.
pub fn fraction(remaining: u64, total: u64) -> f64 {
    remaining as f64 / total.max(remaining).max(1) as f64
}

/// An owned countdown: the ticking task plus the frame channel.
struct CountdownHandle {
    task: JoinHandle<()>,
    frames: watch::Receiver<CountdownFrame>,
}

/// Registry of countdown timers keyed by display id.
pub struct TimerEngine {
    timers: DashMap<String, CountdownHandle>,
    tick: Duration,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::with_tick(DEFAULT_TICK)
    }
}

impl TimerEngine {
    /// Engine with a custom tick, used by tests to compress time.
    pub fn with_tick(tick: Duration) -> Self {
        Self {
            timers: DashMap::new(),
            tick,
        }
    }

    /// Start a countdown for `id`, cancelling any countdown already running
    /// under that id.
    ///
    /// The returned receiver yields one frame per tick until the countdown
    /// reaches zero and self-cancels.
    pub fn start_or_replace(
        &self,
        id: &str,
        remaining: u64,
        total: u64,
    ) -> watch::Receiver<CountdownFrame> {
        // Cancel first so the replacement never overlaps its predecessor.
        if let Some((_, previous)) = self.timers.remove(id) {
            previous.task.abort();
        }

        let (tx, rx) = watch::channel(CountdownFrame::new(remaining, total));
        let tick = self.tick;

        let task = tokio::spawn(async move {
            let mut ticker = interval(tick);
            // The first interval tick completes immediately; the initial frame
            // was already published above.
            ticker.tick().await;

            let mut remaining = remaining;
            while remaining > 0 {
                ticker.tick().await;
                remaining -= 1;
                if tx.send(CountdownFrame::new(remaining, total)).is_err() {
                    break;
                }
            }
            // Expired: the task returns and no further ticks are produced.
        });

        let handle = CountdownHandle {
            task,
            frames: rx.clone(),
        };
        self.timers.insert(id.to_string(), handle);

        rx
    }

    /// Latest frame of a timer, if one exists for `id`.
    pub fn frame(&self, id: &str) -> Option<CountdownFrame> {
        self.timers.get(id).map(|handle| *handle.frames.borrow())
    }

    /// Whether the countdown for `id` is still ticking.
    pub fn is_running(&self, id: &str) -> bool {
        self.timers
            .get(id)
            .map(|handle| !handle.task.is_finished())
            .unwrap_or(false)
    }

    /// Ids with a registered countdown, expired ones included.
    pub fn registered_ids(&self) -> Vec<String> {
        self.timers.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Cancel and forget the countdown for `id`.
    pub fn stop(&self, id: &str) {
        if let Some((_, handle)) = self.timers.remove(id) {
            handle.task.abort();
        }
    }

    /// Cancel every countdown unconditionally (view teardown, session end).
    pub fn stop_all(&self) {
        self.timers.retain(|_, handle| {
            handle.task.abort();
            false
        });
    }
}

impl Drop for TimerEngine {
    fn drop(&mut self) {
        self.stop_all();
    }
}
