//! Adapter from the node contract onto a hosted plugin instance.

use std::sync::Arc;

use super::{AudioNode, NodeKind, PortInputs};
use crate::buffer::StereoBuffer;
use crate::error::{HostError, ProcessError};
use crate::host::{AUTOMATION_CAPACITY, ParameterChange, PluginHost, PluginInstance};
use crate::param::{ParamInfo, clamp_normalized};

/// A graph node that owns one loaded and activated plugin instance.
///
/// Construction loads and activates; dropping deactivates and hands the
/// instance back to its host for unloading. A `PluginNode` therefore always
/// wraps a fully usable instance.
///
/// Parameter sets update the instance's live value and queue one automation
/// point per parameter id for the next block. If more than
/// [`AUTOMATION_CAPACITY`] distinct ids change within one block, the extra
/// points are dropped; the live values still apply.
pub struct PluginNode {
    identifier: String,
    host: Arc<dyn PluginHost>,
    instance: Option<Box<dyn PluginInstance>>,
    param_ids: Vec<u32>,
    automation: Vec<ParameterChange>,
    silence: StereoBuffer,
    latency: usize,
}

impl PluginNode {
    /// Load `identifier` from `host` and activate it.
    ///
    /// On activation failure the instance is unloaded before the error is
    /// returned.
    pub fn load(
        host: Arc<dyn PluginHost>,
        identifier: &str,
        variant: Option<&str>,
        sample_rate: f64,
        max_block_frames: usize,
    ) -> Result<Self, HostError> {
        let mut instance = host.load(identifier, variant)?;
        if let Err(err) = instance.activate(sample_rate, max_block_frames) {
            host.unload(instance);
            return Err(err);
        }

        let param_ids = (0..instance.parameter_count())
            .filter_map(|i| instance.parameter_info(i).map(|info| info.id))
            .collect();
        let latency = instance.latency();

        Ok(Self {
            identifier: identifier.to_owned(),
            host,
            instance: Some(instance),
            param_ids,
            automation: Vec::with_capacity(AUTOMATION_CAPACITY),
            silence: StereoBuffer::new(max_block_frames),
            latency,
        })
    }

    /// Identifier the plugin was loaded under.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Automation points waiting for the next block.
    pub fn pending_automation(&self) -> &[ParameterChange] {
        &self.automation
    }

    fn queue_automation(&mut self, id: u32, value: f32) {
        if let Some(change) = self.automation.iter_mut().find(|c| c.id == id) {
            change.value = value;
        } else if self.automation.len() < AUTOMATION_CAPACITY {
            self.automation.push(ParameterChange { id, value });
        }
    }
}

impl Drop for PluginNode {
    fn drop(&mut self) {
        if let Some(mut instance) = self.instance.take() {
            instance.deactivate();
            self.host.unload(instance);
        }
    }
}

impl AudioNode for PluginNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Plugin
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
        let Some(instance) = self.instance.as_mut() else {
            return Err(ProcessError::new("plugin instance released"));
        };
        if frames > self.silence.len() {
            return Err(ProcessError::new("block exceeds activated size"));
        }
        let input = inputs.port(0).unwrap_or_else(|| self.silence.view());
        let result = instance.render_block(
            &input.left[..frames],
            &input.right[..frames],
            &mut output.left[..frames],
            &mut output.right[..frames],
            frames,
            &self.automation,
        );
        self.automation.clear();
        result
    }

    fn note_on(&mut self, channel: u8, pitch: u8, velocity: f32) -> bool {
        self.instance
            .as_mut()
            .is_some_and(|i| i.enqueue_note_on(channel, pitch, velocity))
    }

    fn note_off(&mut self, channel: u8, pitch: u8, velocity: f32) -> bool {
        self.instance
            .as_mut()
            .is_some_and(|i| i.enqueue_note_off(channel, pitch, velocity))
    }

    fn parameter_count(&self) -> usize {
        self.instance.as_ref().map_or(0, |i| i.parameter_count())
    }

    fn parameter_info(&self, index: usize) -> Option<ParamInfo> {
        self.instance.as_ref()?.parameter_info(index)
    }

    fn get_parameter(&self, id: u32) -> Option<f32> {
        if !self.param_ids.contains(&id) {
            return None;
        }
        self.instance
            .as_ref()
            .map(|i| i.get_parameter_normalized(id))
    }

    fn set_parameter(&mut self, id: u32, value: f32) -> bool {
        if !self.param_ids.contains(&id) {
            return false;
        }
        let value = clamp_normalized(value);
        let accepted = self
            .instance
            .as_mut()
            .is_some_and(|i| i.set_parameter_normalized(id, value));
        if accepted {
            self.queue_automation(id, value);
        }
        accepted
    }

    fn latency(&self) -> usize {
        self.latency
    }
}
