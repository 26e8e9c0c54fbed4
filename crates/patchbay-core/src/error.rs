//! Error types for graph, host and configuration operations.
//!
//! Control-path failures are reported synchronously as [`GraphError`]. Render
//! failures use the heap-free [`ProcessError`] so they can cross the render
//! boundary without allocating; the control actor turns them into
//! [`GraphError::RenderFailure`] when it observes them.

use std::path::PathBuf;

use thiserror::Error;

use crate::node::NodeId;

/// Errors returned by [`Graph`](crate::Graph) and [`Renderer`](crate::Renderer)
/// operations.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The handle does not name a live node.
    #[error("invalid node handle {0:?}")]
    InvalidHandle(NodeId),

    /// The port index is out of range for the node's declared ports.
    #[error("port {port} out of range for node {node:?} ({ports} ports)")]
    InvalidPort {
        /// Node the port was addressed on.
        node: NodeId,
        /// Requested port index.
        port: usize,
        /// Number of ports the node declares.
        ports: usize,
    },

    /// The source node was not created before the destination node.
    #[error("connection {src:?} -> {dst:?} would read from a later node")]
    NonCausalConnection {
        /// Source node.
        src: NodeId,
        /// Destination node.
        dst: NodeId,
    },

    /// A plugin rejected the fixed stereo bus configuration.
    #[error("unsupported bus arrangement: {0}")]
    UnsupportedBusArrangement(String),

    /// A plugin could not be instantiated.
    #[error("plugin load failed: {0}")]
    LoadFailure(String),

    /// A plugin rejected activation.
    #[error("plugin activation failed: {0}")]
    ActivationFailure(String),

    /// A node failed to render a block. The block output was silence.
    #[error("node {node:?} failed to render: {source}")]
    RenderFailure {
        /// The node whose render call failed.
        node: NodeId,
        /// The failure reported by the node.
        #[source]
        source: ProcessError,
    },

    /// The node has no parameter with this id.
    #[error("node {node:?} has no parameter with id {id}")]
    InvalidParameter {
        /// Node that was addressed.
        node: NodeId,
        /// Requested parameter id.
        id: u32,
    },

    /// The node has no parameter at this enumeration index.
    #[error("node {node:?} has no parameter at index {index}")]
    InvalidParameterIndex {
        /// Node that was addressed.
        node: NodeId,
        /// Requested enumeration index.
        index: usize,
    },

    /// A mixer-only operation addressed a node of another kind.
    #[error("node {0:?} is not a mixer")]
    NotMixer(NodeId),

    /// A mixer input gain was NaN or infinite.
    #[error("invalid mixer gain {0}")]
    InvalidGain(f32),

    /// A mixer was requested with zero input ports.
    #[error("invalid port count {0}")]
    InvalidPortCount(usize),

    /// The note channel or pitch is outside the MIDI range.
    #[error("invalid note: channel {channel}, pitch {pitch}")]
    InvalidNote {
        /// MIDI channel (0..16).
        channel: u8,
        /// MIDI pitch (0..128).
        pitch: u8,
    },

    /// The graph already holds the configured maximum number of nodes.
    #[error("node capacity exceeded (max {0})")]
    CapacityExceeded(usize),

    /// The control-to-render command queue is full.
    #[error("command queue full")]
    QueueFull,

    /// The render call was given a frame count or buffer sizes it cannot serve.
    #[error("invalid block size: {frames} frames (max {max})")]
    InvalidBlockSize {
        /// Requested frame count.
        frames: usize,
        /// Configured maximum block size.
        max: usize,
    },

    /// A plugin node was requested on a graph created without a host.
    #[error("graph has no plugin host")]
    NoPluginHost,

    /// The graph configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors reported by a [`PluginHost`](crate::host::PluginHost) collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// No plugin is known under the identifier.
    #[error("plugin not found: {0}")]
    NotFound(String),

    /// The plugin exists but could not be instantiated.
    #[error("load failed: {0}")]
    LoadFailure(String),

    /// The plugin rejected the stereo in / stereo out bus arrangement.
    #[error("unsupported bus arrangement: {0}")]
    UnsupportedBusArrangement(String),

    /// Setup or processing start was rejected.
    #[error("activation failed: {0}")]
    ActivationFailure(String),
}

impl From<HostError> for GraphError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::NotFound(id) => GraphError::LoadFailure(format!("plugin not found: {id}")),
            HostError::LoadFailure(msg) => GraphError::LoadFailure(msg),
            HostError::UnsupportedBusArrangement(msg) => {
                GraphError::UnsupportedBusArrangement(msg)
            }
            HostError::ActivationFailure(msg) => GraphError::ActivationFailure(msg),
        }
    }
}

/// A block-processing failure. Carries no heap data so it can be produced on
/// the render thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct ProcessError {
    /// Static description of the failure.
    pub reason: &'static str,
}

impl ProcessError {
    /// Creates a process error with a static reason.
    pub const fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Errors that can occur while loading or validating a [`GraphConfig`](crate::GraphConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A field holds a value the graph cannot run with.
    #[error("invalid config field '{field}': {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

/// Result type for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
