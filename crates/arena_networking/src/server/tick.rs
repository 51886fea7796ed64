//! # Server Tick Driver
//!
//! Turns a periodic wake-up into the `dt` handed to the ECS.
//!
//! ## Design
//!
//! - dt is the wall-clock gap since the previous tick, not a fixed step
//! - A tick arriving more than twice the period late is counted, not
//!   compensated
//! - The driver lives inside the game; dropping the game cancels it

use std::time::Duration;

use arena_shared::Millis;

/// Tick timing statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickStats {
    /// Shortest gap between ticks, in seconds.
    pub min_dt: f32,
    /// Longest gap between ticks, in seconds.
    pub max_dt: f32,
    /// Ticks whose gap exceeded twice the period.
    pub late_ticks: u64,
}

/// Measures wall-clock dt between ticks.
#[derive(Clone, Debug)]
pub struct TickDriver {
    period: Duration,
    last_tick: Millis,
    tick_count: u64,
    stats: TickStats,
}

impl TickDriver {
    /// Starts measuring from `now`.
    #[must_use]
    pub fn new(period: Duration, now: Millis) -> Self {
        Self {
            period,
            last_tick: now,
            tick_count: 0,
            stats: TickStats {
                min_dt: f32::MAX,
                ..TickStats::default()
            },
        }
    }

    /// Marks a tick at `now`, returning seconds since the previous one.
    ///
    /// A clock that went backwards yields zero.
    pub fn begin_tick(&mut self, now: Millis) -> f32 {
        let dt = now.saturating_sub(self.last_tick) as f32 / 1000.0;
        self.last_tick = now.max(self.last_tick);
        self.tick_count += 1;

        self.stats.min_dt = self.stats.min_dt.min(dt);
        self.stats.max_dt = self.stats.max_dt.max(dt);
        if dt > 2.0 * self.period.as_secs_f32() {
            self.stats.late_ticks += 1;
        }

        dt
    }

    /// Target period.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Ticks executed so far.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Timing statistics.
    #[must_use]
    pub const fn stats(&self) -> &TickStats {
        &self.stats
    }
}
