/// Gravity scheduler.
///
/// A repeating deadline polled by the game loop. The next firing is
/// scheduled from the moment the previous step *completed*, so steps never
/// overlap and a stalled frame does not cause a catch-up burst.
/// Once stopped it never fires again.
///
/// `run_due` ties it to the board: a step that leaves the board halted
/// stops the scheduler for good.

use std::time::{Duration, Instant};

use tracing::info;

use super::board::Board;
use super::event::BoardEvent;

#[derive(Clone, Debug)]
pub struct Scheduler {
    interval: Duration,
    next_due: Instant,
    stopped: bool,
}

impl Scheduler {
    /// First firing is due immediately at `now`.
    pub fn new(interval: Duration, now: Instant) -> Self {
        Scheduler {
            interval,
            next_due: now,
            stopped: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_due(&self, now: Instant) -> bool {
        !self.stopped && now >= self.next_due
    }

    /// Time left until the next firing; `None` once stopped.
    pub fn until_due(&self, now: Instant) -> Option<Duration> {
        if self.stopped {
            None
        } else {
            Some(self.next_due.saturating_duration_since(now))
        }
    }

    /// Record that a step finished at `now` and arm the next one.
    pub fn complete(&mut self, now: Instant) {
        self.next_due = now + self.interval;
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

/// Step `board` once if a tick is due at `now`. The next tick is armed
/// from the moment the step finished.
pub fn run_due(board: &mut Board, scheduler: &mut Scheduler, now: Instant) -> Vec<BoardEvent> {
    if !scheduler.is_due(now) {
        return vec![];
    }
    let started = Instant::now();
    let events = board.step();
    if board.is_halted() && !scheduler.is_stopped() {
        scheduler.stop();
        info!(ticks = board.ticks(), "board halted, gravity stopped");
    }
    scheduler.complete(now + started.elapsed());
    events
}
