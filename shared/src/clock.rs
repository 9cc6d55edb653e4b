use std::time::Duration;

use crate::{backends::Instant, types::Tick};

/// Replica-side time keeping: the replica's own tick, the authority tick of
/// the last read, and the wall-clock instants of the two latest reads
#[derive(Clone, Debug, Default)]
pub struct Clock {
    own_tick: Tick,
    other_tick: Tick,
    previous_read: Option<Instant>,
    current_read: Option<Instant>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advanced once per replica update
    pub fn own_tick(&self) -> Tick {
        self.own_tick
    }

    /// Authority tick carried by the last frame read
    pub fn other_tick(&self) -> Tick {
        self.other_tick
    }

    pub fn advance(&mut self) {
        self.own_tick = self.own_tick.wrapping_add(1);
    }

    pub fn record_read(&mut self, now: Instant) {
        self.previous_read = self.current_read.replace(now);
    }

    pub fn set_other_tick(&mut self, tick: Tick) {
        self.other_tick = tick;
    }

    pub fn last_read(&self) -> Option<Instant> {
        self.current_read
    }

    /// Wall time between the two latest reads, zero until two reads happened
    pub fn update_rate(&self) -> Duration {
        match (self.previous_read, self.current_read) {
            (Some(previous), Some(current)) => current.saturating_duration_since(previous),
            _ => Duration::ZERO,
        }
    }

    pub fn elapsed_since_read(&self, now: Instant) -> Duration {
        self.current_read
            .map(|read| now.saturating_duration_since(read))
            .unwrap_or(Duration::ZERO)
    }

    /// Progress through the current read interval, within `[0, 1]`. Always
    /// complete while the update rate is unknown.
    pub fn interpolation_factor(&self, now: Instant) -> f32 {
        let rate = self.update_rate();
        if rate.is_zero() {
            return 1.0;
        }
        let factor = self.elapsed_since_read(now).as_secs_f32() / rate.as_secs_f32();
        factor.clamp(0.0, 1.0)
    }
}
