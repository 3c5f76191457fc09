//! Round countdown timer
//!
//! Driven by elapsed time rather than a wall clock so the game loop (and the
//! tests) decide how fast time passes. Every run gets a fresh [`TimerId`];
//! starting a run cancels the previous one, so at most one run is ever live.

use std::time::Duration;

const TICK: Duration = Duration::from_secs(1);

/// Identifies one run of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Something the countdown reports back to its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    /// Seconds left after a tick (also fired once when a run starts)
    Tick { id: TimerId, remaining: u32 },
    /// The run reached zero. Fired exactly once per run.
    Expired { id: TimerId },
}

/// A cancellable one-tick-per-second countdown
#[derive(Debug)]
pub struct Countdown {
    remaining: u32,
    running: bool,
    paused: bool,
    /// Time accumulated towards the next tick
    elapsed: Duration,
    current: TimerId,
}

impl Default for Countdown {
    fn default() -> Self {
        Self {
            remaining: 0,
            running: false,
            paused: false,
            elapsed: Duration::ZERO,
            current: TimerId(0),
        }
    }
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new run of `budget` seconds, cancelling any active run.
    ///
    /// Returns the immediate tick (and the expiry too, for a zero budget).
    pub fn start(&mut self, budget: u32) -> Vec<CountdownEvent> {
        self.cancel();
        self.current = TimerId(self.current.0 + 1);
        self.remaining = budget;
        self.running = true;

        let id = self.current;
        let mut events = vec![CountdownEvent::Tick {
            id,
            remaining: budget,
        }];
        if budget == 0 {
            self.running = false;
            events.push(CountdownEvent::Expired { id });
        }
        events
    }

    /// Stop ticking. Safe to call when nothing is running.
    pub fn cancel(&mut self) {
        self.running = false;
        self.paused = false;
        self.elapsed = Duration::ZERO;
    }

    /// Hold the current run without losing the seconds left
    pub fn pause(&mut self) {
        if self.running {
            self.paused = true;
        }
    }

    /// Continue a paused run where it left off
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Let `dt` pass and collect the ticks (and expiry) it produced.
    pub fn advance(&mut self, dt: Duration) -> Vec<CountdownEvent> {
        let mut events = Vec::new();
        if !self.running || self.paused {
            return events;
        }

        self.elapsed += dt;
        while self.running && self.elapsed >= TICK {
            self.elapsed -= TICK;
            self.remaining = self.remaining.saturating_sub(1);
            events.push(CountdownEvent::Tick {
                id: self.current,
                remaining: self.remaining,
            });
            if self.remaining == 0 {
                self.running = false;
                self.elapsed = Duration::ZERO;
                events.push(CountdownEvent::Expired { id: self.current });
            }
        }
        events
    }

    #[cfg(test)]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.running && self.paused
    }

    /// Id of the most recent run
    pub fn id(&self) -> TimerId {
        self.current
    }
}
