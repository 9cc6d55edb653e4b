use synchrony_shared::{ReferenceId, Tick};

/// Notifications queued by a [`TargetRoot`](crate::TargetRoot), drained with
/// [`take_events`](crate::TargetRoot::take_events)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetEvent {
    /// A frame is about to be applied
    BeginRead,
    /// A reference was added by the frame being read
    Constructed(ReferenceId),
    /// An existing reference had members or entries applied
    Changed(ReferenceId),
    /// A reference stopped being tracked
    Removed(ReferenceId),
    /// A frame stamped with the authority tick was applied
    EndRead(Tick),
    /// Interpolated members were advanced
    Updated,
}
