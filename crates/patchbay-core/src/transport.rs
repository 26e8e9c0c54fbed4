//! Transport snapshot stored on the graph.
//!
//! The graph keeps the most recent snapshot for introspection only. No node
//! reads it yet; it is the hook for tempo-synchronized nodes.

/// Whether the host transport is running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransportState {
    /// Transport halted.
    #[default]
    Stopped,
    /// Transport rolling.
    Playing,
}

/// Musical position and tempo as reported by the surrounding host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transport {
    /// Tempo in beats per minute.
    pub tempo: f64,
    /// Time signature numerator.
    pub time_sig_num: u32,
    /// Time signature denominator.
    pub time_sig_den: u32,
    /// Play position in quarter notes.
    pub ppq_position: f64,
    /// Transport state.
    pub state: TransportState,
}

impl Default for Transport {
    fn default() -> Self {
        Self {
            tempo: 120.0,
            time_sig_num: 4,
            time_sig_den: 4,
            ppq_position: 0.0,
            state: TransportState::Stopped,
        }
    }
}

impl Transport {
    /// Returns true while the transport is rolling.
    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }
}
