/// Rule deciding how an incoming member value reconciles with the value a
/// replica currently holds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SyncPolicy {
    /// Captured once, never updated afterwards
    Ignore,
    /// Every incoming value replaces the current one
    #[default]
    TakeSynchronized,
    /// Incoming values older than the last applied tick are discarded
    HighestTick,
    /// Incoming values are blended toward over the interval between reads
    Interpolated,
    /// Supplied once while the object is constructed. Implied for members
    /// without a setter.
    Construction,
}

impl SyncPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            SyncPolicy::Ignore => "Ignore",
            SyncPolicy::TakeSynchronized => "TakeSynchronized",
            SyncPolicy::HighestTick => "HighestTick",
            SyncPolicy::Interpolated => "Interpolated",
            SyncPolicy::Construction => "Construction",
        }
    }
}
