//! The plugin hosting collaborator.
//!
//! A [`PluginHost`] turns an identifier into a live [`PluginInstance`]; the
//! graph wraps each instance in a [`PluginNode`](crate::node::PluginNode) that
//! owns it for the rest of its life. How the instance is produced (a native
//! module, an in-process factory) is the host's business.
//!
//! Lifecycle calls (`load`, `activate`, `deactivate`, `unload`) happen on the
//! control actor. Everything else is called on the render actor, one call at a
//! time, so instances need to be `Send` but not `Sync`.

#[cfg(test)]
pub(crate) mod mock;
mod registry;

pub use registry::{PluginFactory, PluginRegistry};

pub use crate::error::{HostError, ProcessError};
use crate::param::ParamInfo;

/// Maximum automation points a plugin node hands to one block call.
pub const AUTOMATION_CAPACITY: usize = 64;

/// One parameter value to apply at the start of a block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterChange {
    /// Parameter id.
    pub id: u32,
    /// Normalized value in [0, 1].
    pub value: f32,
}

/// Loads and releases plugin instances.
pub trait PluginHost: Send + Sync {
    /// Instantiate the plugin named by `identifier`.
    ///
    /// `variant` selects one class out of a module that exposes several.
    fn load(
        &self,
        identifier: &str,
        variant: Option<&str>,
    ) -> Result<Box<dyn PluginInstance>, HostError>;

    /// Release an instance previously returned by [`load`](Self::load).
    ///
    /// The instance has already been deactivated.
    fn unload(&self, instance: Box<dyn PluginInstance>) {
        drop(instance);
    }
}

/// A single loaded plugin, driven through a fixed stereo in / stereo out bus.
pub trait PluginInstance: Send {
    /// Prepare for processing. Must reject bus arrangements other than stereo
    /// with [`HostError::UnsupportedBusArrangement`].
    fn activate(&mut self, sample_rate: f64, max_block_frames: usize) -> Result<(), HostError>;

    /// Stop processing. Called once before the instance is unloaded.
    fn deactivate(&mut self);

    /// Process one block.
    ///
    /// `automation` holds at most one change per parameter id; every change
    /// applies from the first frame. Queued notes are consumed by this call.
    fn render_block(
        &mut self,
        in_left: &[f32],
        in_right: &[f32],
        out_left: &mut [f32],
        out_right: &mut [f32],
        frames: usize,
        automation: &[ParameterChange],
    ) -> Result<(), ProcessError>;

    /// Queue a note-on for the next block. Returns false if the instance
    /// does not take note events or its event queue is full.
    fn enqueue_note_on(&mut self, channel: u8, pitch: u8, velocity: f32) -> bool;

    /// Queue a note-off for the next block.
    fn enqueue_note_off(&mut self, channel: u8, pitch: u8, velocity: f32) -> bool;

    /// Number of parameters the instance exposes.
    fn parameter_count(&self) -> usize;

    /// Descriptor of the parameter at enumeration `index`.
    fn parameter_info(&self, index: usize) -> Option<ParamInfo>;

    /// Current normalized value of parameter `id`.
    fn get_parameter_normalized(&self, id: u32) -> f32;

    /// Set the live normalized value of parameter `id`.
    fn set_parameter_normalized(&mut self, id: u32, value: f32) -> bool;

    /// Processing delay in samples.
    fn latency(&self) -> usize {
        0
    }
}
