//! Single-parameter gain stage.
//!
//! The one parameter, "Output Gain", maps normalized [0, 1] linearly onto
//! [-60 dB, 0 dB]: `dB = v * 60 - 60`. Reading it back applies the exact
//! inverse, `v = (dB + 60) / 60`, so a set/get round trip is exact up to
//! float rounding. The linear factor `10^(dB/20)` is cached on every set.

use super::{AudioNode, NodeKind, PortInputs};
use crate::buffer::StereoBuffer;
use crate::error::ProcessError;
use crate::math::{GAIN_FLOOR_DB, db_to_linear, db_to_normalized, normalized_to_db};
use crate::param::{ParamInfo, clamp_normalized};

/// Parameter id of the gain node's "Output Gain".
pub const GAIN_PARAM_ID: u32 = 0;

/// Multiplies every sample by a dB-controlled factor.
#[derive(Debug, Clone, Copy)]
pub struct GainNode {
    db: f32,
    linear: f32,
}

impl GainNode {
    /// Create a gain stage at `initial_db`, clamped to [-60, 0].
    pub fn new(initial_db: f32) -> Self {
        let db = if initial_db.is_nan() {
            0.0
        } else {
            initial_db.clamp(GAIN_FLOOR_DB, 0.0)
        };
        Self {
            db,
            linear: db_to_linear(db),
        }
    }

    /// Current gain in dB.
    pub fn db(&self) -> f32 {
        self.db
    }

    /// Current linear factor.
    pub fn linear(&self) -> f32 {
        self.linear
    }
}

impl AudioNode for GainNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Gain
    }

    fn input_ports(&self) -> usize {
        1
    }

    fn render(
        &mut self,
        inputs: &PortInputs<'_>,
        output: &mut StereoBuffer,
        frames: usize,
    ) -> Result<(), ProcessError> {
        let Some(input) = inputs.port(0) else {
            output.silence(frames);
            return Ok(());
        };
        output.scale_from(input, frames, self.linear);
        Ok(())
    }

    fn parameter_count(&self) -> usize {
        1
    }

    fn parameter_info(&self, index: usize) -> Option<ParamInfo> {
        (index == 0).then(|| ParamInfo::new(GAIN_PARAM_ID, "Output Gain", "dB"))
    }

    fn get_parameter(&self, id: u32) -> Option<f32> {
        (id == GAIN_PARAM_ID).then(|| db_to_normalized(self.db))
    }

    fn set_parameter(&mut self, id: u32, value: f32) -> bool {
        if id != GAIN_PARAM_ID {
            return false;
        }
        self.db = normalized_to_db(clamp_normalized(value));
        self.linear = db_to_linear(self.db);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::StereoRef;

    fn render_unit(gain: &mut GainNode) -> StereoBuffer {
        let ones = [1.0f32; 8];
        let ports = [Some(StereoRef::new(&ones, &ones))];
        let mut out = StereoBuffer::new(8);
        gain.render(&PortInputs::direct(&ports), &mut out, 8).unwrap();
        out
    }

    #[test]
    fn test_gain_half_is_minus_30_db() {
        let mut gain = GainNode::new(0.0);
        assert!(gain.set_parameter(GAIN_PARAM_ID, 0.5));
        assert!((gain.db() - (-30.0)).abs() < 1e-5);

        let out = render_unit(&mut gain);
        for &s in out.left.iter().chain(&out.right) {
            assert!((s - 0.031_622_8).abs() < 1e-6, "expected -30 dB, got {s}");
        }
    }

    #[test]
    fn test_gain_minus_6_db() {
        let mut gain = GainNode::new(-6.0);
        let out = render_unit(&mut gain);
        assert!((out.left[0] - 0.501_187).abs() < 1e-5);
        assert!((gain.get_parameter(GAIN_PARAM_ID).unwrap() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_initial_db_clamped() {
        assert_eq!(GainNode::new(12.0).db(), 0.0);
        assert_eq!(GainNode::new(-90.0).db(), -60.0);
        assert_eq!(GainNode::new(f32::NAN).db(), 0.0);
    }

    #[test]
    fn test_set_clamps_and_rejects_unknown_id() {
        let mut gain = GainNode::new(0.0);
        assert!(gain.set_parameter(GAIN_PARAM_ID, 2.0));
        assert_eq!(gain.db(), 0.0);
        assert!(gain.set_parameter(GAIN_PARAM_ID, -1.0));
        assert_eq!(gain.db(), -60.0);

        assert!(!gain.set_parameter(1, 0.5));
        assert!(gain.get_parameter(1).is_none());
    }

    #[test]
    fn test_parameter_info() {
        let gain = GainNode::new(0.0);
        let info = gain.parameter_info(0).unwrap();
        assert_eq!(info.id, GAIN_PARAM_ID);
        assert_eq!(info.name, "Output Gain");
        assert_eq!(info.unit, "dB");
        assert!(gain.parameter_info(1).is_none());
    }

    #[test]
    fn test_unconnected_is_silent() {
        let mut gain = GainNode::new(0.0);
        let mut out = StereoBuffer::new(4);
        out.left.fill(1.0);
        gain.render(&PortInputs::none(), &mut out, 4).unwrap();
        assert!(out.left.iter().all(|&s| s == 0.0));
    }
}
