//! Parameter descriptors.
//!
//! Every parameter is addressed by a stable numeric id and carries a
//! normalized value in [0, 1]. How that value maps to native units is up to
//! the node that owns it. Enumeration indices exist only to walk the list and
//! are not stable across topology edits.

/// Display metadata for one node parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamInfo {
    /// Stable id used by `get_parameter` / `set_parameter`.
    pub id: u32,
    /// Human-readable name.
    pub name: String,
    /// Unit label for display, e.g. "dB". May be empty.
    pub unit: String,
}

impl ParamInfo {
    /// Creates a descriptor.
    pub fn new(id: u32, name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            unit: unit.into(),
        }
    }
}

/// Clamp a normalized parameter value into [0, 1]. NaN maps to 0.
#[inline]
pub fn clamp_normalized(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
