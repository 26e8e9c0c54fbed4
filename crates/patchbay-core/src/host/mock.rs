//! Scriptable plugin instance for unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::{ParameterChange, PluginInstance};
use crate::error::{HostError, ProcessError};
use crate::param::ParamInfo;

/// Observable side effects of a [`MockPlugin`].
#[derive(Default)]
pub struct MockStats {
    pub activations: AtomicUsize,
    pub deactivations: AtomicUsize,
    pub drops: AtomicUsize,
    pub blocks: AtomicUsize,
    pub notes_on: AtomicUsize,
    pub notes_off: AtomicUsize,
    pub fail_render: AtomicBool,
    pub automation: Mutex<Vec<Vec<ParameterChange>>>,
}

/// Scales its input by the "Level" parameter (id 10). Parameter 11 is inert.
pub struct MockPlugin {
    pub stats: Arc<MockStats>,
    level: f32,
    tone: f32,
    latency: usize,
    reject_bus: bool,
    fail_activate: bool,
}

impl MockPlugin {
    pub fn new() -> Self {
        Self::with_stats(Arc::new(MockStats::default()))
    }

    pub fn with_stats(stats: Arc<MockStats>) -> Self {
        Self {
            stats,
            level: 1.0,
            tone: 0.5,
            latency: 0,
            reject_bus: false,
            fail_activate: false,
        }
    }

    pub fn with_latency(mut self, latency: usize) -> Self {
        self.latency = latency;
        self
    }

    pub fn rejecting_bus(mut self) -> Self {
        self.reject_bus = true;
        self
    }

    pub fn failing_activation(mut self) -> Self {
        self.fail_activate = true;
        self
    }
}

impl Drop for MockPlugin {
    fn drop(&mut self) {
        self.stats.drops.fetch_add(1, Ordering::SeqCst);
    }
}

impl PluginInstance for MockPlugin {
    fn activate(&mut self, _sample_rate: f64, _max_block_frames: usize) -> Result<(), HostError> {
        if self.reject_bus {
            return Err(HostError::UnsupportedBusArrangement("mono only".into()));
        }
        if self.fail_activate {
            return Err(HostError::ActivationFailure("setup rejected".into()));
        }
        self.stats.activations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn deactivate(&mut self) {
        self.stats.deactivations.fetch_add(1, Ordering::SeqCst);
    }

    fn render_block(
        &mut self,
        in_left: &[f32],
        in_right: &[f32],
        out_left: &mut [f32],
        out_right: &mut [f32],
        frames: usize,
        automation: &[ParameterChange],
    ) -> Result<(), ProcessError> {
        if self.stats.fail_render.load(Ordering::SeqCst) {
            return Err(ProcessError::new("mock failure"));
        }
        if !automation.is_empty() {
            self.stats.automation.lock().push(automation.to_vec());
        }
        self.stats.blocks.fetch_add(1, Ordering::SeqCst);
        for i in 0..frames {
            out_left[i] = in_left[i] * self.level;
            out_right[i] = in_right[i] * self.level;
        }
        Ok(())
    }

    fn enqueue_note_on(&mut self, _channel: u8, _pitch: u8, _velocity: f32) -> bool {
        self.stats.notes_on.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn enqueue_note_off(&mut self, _channel: u8, _pitch: u8, _velocity: f32) -> bool {
        self.stats.notes_off.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn parameter_count(&self) -> usize {
        2
    }

    fn parameter_info(&self, index: usize) -> Option<ParamInfo> {
        match index {
            0 => Some(ParamInfo::new(10, "Level", "")),
            1 => Some(ParamInfo::new(11, "Tone", "")),
            _ => None,
        }
    }

    fn get_parameter_normalized(&self, id: u32) -> f32 {
        match id {
            10 => self.level,
            11 => self.tone,
            _ => 0.0,
        }
    }

    fn set_parameter_normalized(&mut self, id: u32, value: f32) -> bool {
        match id {
            10 => self.level = value,
            11 => self.tone = value,
            _ => return false,
        }
        true
    }

    fn latency(&self) -> usize {
        self.latency
    }
}
