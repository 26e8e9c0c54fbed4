//! Identity passthrough node.

use super::{AudioNode, NodeKind, PortInputs};
use crate::buffer::StereoBuffer;
use crate::error::ProcessError;

/// Copies its single input to its output. Silent when unconnected.
///
/// Useful as a fixed entry point for external audio: designate a split as the
/// graph input and fan it out to as many consumers as needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct SplitNode;

impl SplitNode {
    /// Create a split node.
    pub fn new() -> Self {
        Self
    }
}

impl AudioNode for SplitNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Split
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
        match inputs.port(0) {
            Some(input) => output.copy_from(input, frames),
            None => output.silence(frames),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::StereoRef;

    #[test]
    fn test_split_copies_input() {
        let left = [0.1, -0.2, 0.3, -0.4];
        let right = [1.0, 0.5, 0.25, 0.125];
        let ports = [Some(StereoRef::new(&left, &right))];
        let mut out = StereoBuffer::new(4);

        SplitNode::new()
            .render(&PortInputs::direct(&ports), &mut out, 4)
            .unwrap();
        assert_eq!(out.left, left);
        assert_eq!(out.right, right);
    }

    #[test]
    fn test_split_silent_when_unconnected() {
        let mut out = StereoBuffer::new(4);
        out.left.fill(9.0);
        out.right.fill(9.0);

        SplitNode::new()
            .render(&PortInputs::none(), &mut out, 4)
            .unwrap();
        assert!(out.left.iter().chain(&out.right).all(|&s| s == 0.0));
    }

    #[test]
    fn test_split_has_no_parameters() {
        let mut split = SplitNode::new();
        assert_eq!(split.parameter_count(), 0);
        assert!(split.parameter_info(0).is_none());
        assert!(!split.set_parameter(0, 0.5));
        assert!(split.note_off(0, 60, 0.0));
    }
}
