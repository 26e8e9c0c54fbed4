//! Built-in sine instrument, hosted through the plugin registry.
//!
//! Monophonic: the most recent note-on wins, a matching note-off silences it.
//! Input audio passes through untouched so the instrument can sit inline.

use patchbay_core::ParamInfo;
use patchbay_core::host::{
    HostError, ParameterChange, PluginInstance, PluginRegistry, ProcessError,
};
use std::f32::consts::TAU;

/// Registry identifier of the sine instrument.
pub const SINE_ID: &str = "patchbay.sine";

/// Parameter id of the output level.
pub const LEVEL_PARAM_ID: u32 = 0;

const EVENT_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy)]
enum Event {
    On { pitch: u8, velocity: f32 },
    Off { pitch: u8 },
}

/// Sine oscillator driven by note events.
pub struct SineInstrument {
    sample_rate: f32,
    max_block_frames: usize,
    active: bool,
    phase: f32,
    phase_inc: f32,
    amplitude: f32,
    pitch: Option<u8>,
    level: f32,
    events: [Option<Event>; EVENT_CAPACITY],
    pending: usize,
}

impl Default for SineInstrument {
    fn default() -> Self {
        Self::new()
    }
}

impl SineInstrument {
    /// Create an inactive instrument at level 0.5.
    pub fn new() -> Self {
        Self {
            sample_rate: 48000.0,
            max_block_frames: 0,
            active: false,
            phase: 0.0,
            phase_inc: 0.0,
            amplitude: 0.0,
            pitch: None,
            level: 0.5,
            events: [None; EVENT_CAPACITY],
            pending: 0,
        }
    }

    fn push(&mut self, event: Event) -> bool {
        if self.pending == EVENT_CAPACITY {
            return false;
        }
        self.events[self.pending] = Some(event);
        self.pending += 1;
        true
    }

    fn consume_events(&mut self) {
        for slot in &mut self.events[..self.pending] {
            match slot.take() {
                Some(Event::On { pitch, velocity }) => {
                    self.pitch = Some(pitch);
                    self.amplitude = velocity;
                    self.phase_inc = pitch_to_hz(pitch) / self.sample_rate;
                }
                Some(Event::Off { pitch }) if self.pitch == Some(pitch) => {
                    self.pitch = None;
                    self.amplitude = 0.0;
                }
                _ => {}
            }
        }
        self.pending = 0;
    }
}

/// Equal-tempered frequency of a MIDI pitch, A4 = 440 Hz.
fn pitch_to_hz(pitch: u8) -> f32 {
    440.0 * 2f32.powf((f32::from(pitch) - 69.0) / 12.0)
}

impl PluginInstance for SineInstrument {
    fn activate(&mut self, sample_rate: f64, max_block_frames: usize) -> Result<(), HostError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(HostError::ActivationFailure(format!(
                "sample rate {sample_rate} out of range"
            )));
        }
        self.sample_rate = sample_rate as f32;
        self.max_block_frames = max_block_frames;
        self.active = true;
        Ok(())
    }

    fn deactivate(&mut self) {
        self.active = false;
        self.amplitude = 0.0;
        self.pitch = None;
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
        if !self.active {
            return Err(ProcessError::new("not activated"));
        }
        if frames > self.max_block_frames {
            return Err(ProcessError::new("block larger than activated size"));
        }
        for change in automation {
            if change.id == LEVEL_PARAM_ID {
                self.level = change.value;
            }
        }
        self.consume_events();

        let gain = self.amplitude * self.level;
        for i in 0..frames {
            let tone = (self.phase * TAU).sin() * gain;
            self.phase += self.phase_inc;
            if self.phase >= 1.0 {
                self.phase -= 1.0;
            }
            out_left[i] = in_left[i] + tone;
            out_right[i] = in_right[i] + tone;
        }
        Ok(())
    }

    fn enqueue_note_on(&mut self, _channel: u8, pitch: u8, velocity: f32) -> bool {
        self.push(Event::On { pitch, velocity })
    }

    fn enqueue_note_off(&mut self, _channel: u8, pitch: u8, _velocity: f32) -> bool {
        self.push(Event::Off { pitch })
    }

    fn parameter_count(&self) -> usize {
        1
    }

    fn parameter_info(&self, index: usize) -> Option<ParamInfo> {
        (index == 0).then(|| ParamInfo::new(LEVEL_PARAM_ID, "Level", ""))
    }

    fn get_parameter_normalized(&self, id: u32) -> f32 {
        if id == LEVEL_PARAM_ID { self.level } else { 0.0 }
    }

    fn set_parameter_normalized(&mut self, id: u32, value: f32) -> bool {
        if id != LEVEL_PARAM_ID {
            return false;
        }
        self.level = value.clamp(0.0, 1.0);
        true
    }
}

/// Register the built-in instruments.
pub fn register_builtins(registry: &PluginRegistry) {
    registry.register(SINE_ID, "Sine Instrument", |_variant| {
        Ok(Box::new(SineInstrument::new()) as Box<dyn PluginInstance>)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(synth: &mut SineInstrument, frames: usize) -> Vec<f32> {
        let silence = vec![0.0; frames];
        let mut left = vec![0.0; frames];
        let mut right = vec![0.0; frames];
        synth
            .render_block(&silence, &silence, &mut left, &mut right, frames, &[])
            .unwrap();
        left
    }

    #[test]
    fn silent_until_note_on() {
        let mut synth = SineInstrument::new();
        synth.activate(48000.0, 256).unwrap();
        assert!(render(&mut synth, 256).iter().all(|&s| s == 0.0));

        assert!(synth.enqueue_note_on(0, 69, 1.0));
        let out = render(&mut synth, 256);
        let peak = out.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak > 0.4 && peak <= 0.5, "peak {peak}");
    }

    #[test]
    fn note_off_only_matches_held_pitch() {
        let mut synth = SineInstrument::new();
        synth.activate(48000.0, 64).unwrap();
        synth.enqueue_note_on(0, 60, 1.0);
        synth.enqueue_note_off(0, 61, 0.0);
        assert!(render(&mut synth, 64).iter().any(|&s| s != 0.0));

        synth.enqueue_note_off(0, 60, 0.0);
        assert!(render(&mut synth, 64).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn automation_sets_level() {
        let mut synth = SineInstrument::new();
        synth.activate(48000.0, 64).unwrap();
        let change = ParameterChange { id: LEVEL_PARAM_ID, value: 0.25 };
        let (mut l, mut r) = (vec![0.0; 64], vec![0.0; 64]);
        synth
            .render_block(&[0.0; 64], &[0.0; 64], &mut l, &mut r, 64, &[change])
            .unwrap();
        assert_eq!(synth.get_parameter_normalized(LEVEL_PARAM_ID), 0.25);
    }

    #[test]
    fn rejects_render_before_activation() {
        let mut synth = SineInstrument::new();
        let (mut l, mut r) = (vec![0.0; 8], vec![0.0; 8]);
        assert!(
            synth
                .render_block(&[0.0; 8], &[0.0; 8], &mut l, &mut r, 8, &[])
                .is_err()
        );
    }

    #[test]
    fn event_queue_is_bounded() {
        let mut synth = SineInstrument::new();
        for _ in 0..EVENT_CAPACITY {
            assert!(synth.enqueue_note_on(0, 60, 1.0));
        }
        assert!(!synth.enqueue_note_on(0, 60, 1.0));
    }

    #[test]
    fn a4_is_440() {
        assert!((pitch_to_hz(69) - 440.0).abs() < 1e-3);
        assert!((pitch_to_hz(81) - 880.0).abs() < 1e-2);
    }
}
