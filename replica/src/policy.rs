use std::time::Duration;

use log::{trace, warn};

use synchrony_shared::{BoxedValue, Instant, SyncPolicy, Tick};

/// Whether an incoming member value is written, blended towards, or dropped
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Decision {
    Discard,
    Assign,
    Interpolate,
}

/// An in-flight blend from the value displayed when an update arrived to the
/// value the update carried
#[derive(Clone, Debug)]
pub(crate) struct Interpolation {
    pub source: BoxedValue,
    pub target: BoxedValue,
    pub started_at: Instant,
}

impl Interpolation {
    /// Elapsed share of `update_rate` since the blend started, within `[0, 1]`
    pub fn factor(&self, now: Instant, update_rate: Duration) -> f32 {
        if update_rate.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f32() / update_rate.as_secs_f32()).clamp(0.0, 1.0)
    }
}

/// Synchronization state of one member of one replicated object
#[derive(Clone, Debug, Default)]
pub(crate) struct MemberState {
    set: bool,
    last_tick: Option<Tick>,
    interpolation: Option<Interpolation>,
}

impl MemberState {
    pub fn is_set(&self) -> bool {
        self.set
    }

    pub fn last_tick(&self) -> Option<Tick> {
        self.last_tick
    }

    /// Records a value supplied outside the policy engine, e.g. through the
    /// constructor
    pub fn mark_set(&mut self, tick: Tick) {
        self.set = true;
        self.last_tick = Some(tick);
    }

    /// Treats the member as locally written at `tick`, so `HighestTick`
    /// rejects older incoming values
    pub fn stamp(&mut self, tick: Tick) {
        self.last_tick = Some(tick);
    }

    /// Runs `policy` against a value arriving at `tick`. `smoothing` tells
    /// whether an `Interpolated` member can blend at all right now.
    pub fn decide(&mut self, policy: SyncPolicy, tick: Tick, smoothing: bool) -> Decision {
        let decision = match policy {
            SyncPolicy::Ignore => {
                if self.set {
                    Decision::Discard
                } else {
                    Decision::Assign
                }
            }
            SyncPolicy::TakeSynchronized => Decision::Assign,
            SyncPolicy::HighestTick => match self.last_tick {
                Some(last_tick) if tick < last_tick => {
                    trace!("Discarded value from tick {} older than {}", tick, last_tick);
                    Decision::Discard
                }
                _ => Decision::Assign,
            },
            SyncPolicy::Interpolated => {
                if self.set && smoothing {
                    Decision::Interpolate
                } else {
                    Decision::Assign
                }
            }
            SyncPolicy::Construction => {
                if self.set {
                    warn!("Discarded update at tick {} to a construction-only member", tick);
                    Decision::Discard
                } else {
                    Decision::Assign
                }
            }
        };

        if decision != Decision::Discard {
            self.set = true;
            self.last_tick = Some(tick);
        }
        if decision == Decision::Assign {
            self.interpolation = None;
        }
        decision
    }

    pub fn begin_interpolation(&mut self, source: BoxedValue, target: BoxedValue, now: Instant) {
        self.interpolation = Some(Interpolation {
            source,
            target,
            started_at: now,
        });
    }

    pub fn interpolation(&self) -> Option<&Interpolation> {
        self.interpolation.as_ref()
    }

    pub fn finish_interpolation(&mut self) {
        self.interpolation = None;
    }
}
