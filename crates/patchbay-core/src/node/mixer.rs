//! Weighted summing node.

use super::{AudioNode, NodeKind, PortInputs};
use crate::buffer::StereoBuffer;
use crate::error::ProcessError;

/// Sums N input ports, each scaled by its own linear gain (default 1.0).
///
/// The port count is fixed at construction. Unconnected ports contribute
/// silence. Port gains are not automatable parameters.
#[derive(Debug, Clone)]
pub struct MixerNode {
    gains: Vec<f32>,
}

impl MixerNode {
    /// Create a mixer with `ports` inputs at unity gain.
    pub fn new(ports: usize) -> Self {
        Self {
            gains: vec![1.0; ports],
        }
    }

    /// Linear gain applied to `port`.
    pub fn input_gain(&self, port: usize) -> Option<f32> {
        self.gains.get(port).copied()
    }

    /// Set the linear gain applied to `port`. Returns false if out of range.
    pub fn set_input_gain(&mut self, port: usize, gain: f32) -> bool {
        match self.gains.get_mut(port) {
            Some(g) => {
                *g = gain;
                true
            }
            None => false,
        }
    }
}

impl AudioNode for MixerNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Mixer
    }

    fn input_ports(&self) -> usize {
        self.gains.len()
    }

    fn render(
        &mut self,
        inputs: &PortInputs<'_>,
        output: &mut StereoBuffer,
        frames: usize,
    ) -> Result<(), ProcessError> {
        output.silence(frames);
        for (port, &gain) in self.gains.iter().enumerate() {
            if let Some(input) = inputs.port(port) {
                output.accumulate_from(input, frames, gain);
            }
        }
        Ok(())
    }
}
