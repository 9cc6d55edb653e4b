use std::default::Default;

/// Contains Config properties which will be used by a TargetRoot
#[derive(Clone, Debug)]
pub struct TargetConfig {
    /// Whether members with the `Interpolated` policy blend towards incoming
    /// values across updates. When false they snap to each incoming value.
    pub interpolate: bool,
    /// Frames announcing more entries than this are rejected before any of
    /// their entries are decoded
    pub max_frame_entries: usize,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            interpolate: true,
            max_frame_entries: 1 << 16,
        }
    }
}
