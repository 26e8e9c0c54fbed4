//! Patchbay Core - a real-time audio node graph
//!
//! Hosts built-in DSP nodes and externally loaded plugin instances behind one
//! runtime-editable topology, rendered block by block into a stereo output.
//!
//! # Actors
//!
//! [`Graph::new`] returns a [`Graph`] and a [`Renderer`]:
//!
//! - The **graph** is the control actor. It validates and applies topology
//!   edits, mirrors parameter values, queues notes, and publishes an
//!   immutable [`Topology`] snapshot after every edit.
//! - The **renderer** is the render actor. Each [`Renderer::render_block`]
//!   drains queued commands, loads the newest snapshot, and runs every node
//!   once in creation order without allocating, locking, or logging.
//!
//! # Nodes
//!
//! - [`SplitNode`] - identity passthrough
//! - [`GainNode`] - one "Output Gain" parameter mapping [0, 1] onto [-60, 0] dB
//! - [`MixerNode`] - weighted sum of N independently wireable ports
//! - [`PluginNode`] - adapter over a [`PluginInstance`](host::PluginInstance)
//!   loaded through a [`PluginHost`](host::PluginHost)
//!
//! # Example
//!
//! ```rust
//! use patchbay_core::{Graph, GraphConfig, NoteTarget};
//!
//! let (mut graph, mut renderer) = Graph::new(GraphConfig::default()).unwrap();
//! let input = graph.add_split().unwrap();
//! let mixer = graph.add_mixer(2).unwrap();
//! let quiet = graph.add_gain(-12.0).unwrap();
//!
//! graph.connect(input, 0, mixer, 0).unwrap();
//! graph.connect(input, 0, quiet, 0).unwrap();
//! graph.set_io_nodes(Some(input), Some(mixer)).unwrap();
//! graph.note_on(NoteTarget::Broadcast, 0, 60, 1.0).unwrap();
//!
//! let block = vec![0.5f32; 512];
//! let (mut left, mut right) = (vec![0.0; 512], vec![0.0; 512]);
//! renderer.render_block(&block, &block, &mut left, &mut right, 512).unwrap();
//! assert_eq!(left[0], 0.5);
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod graph;
pub mod host;
pub mod math;
pub mod node;
pub mod param;
pub mod transport;

pub use buffer::{BufferPool, StereoBuffer, StereoRef};
pub use config::GraphConfig;
pub use error::{ConfigError, GraphError, HostError, ProcessError, Result};
pub use graph::{Graph, NoteTarget, RenderStatus, Renderer, Topology};
pub use math::{db_to_linear, linear_to_db};
pub use node::{
    AudioNode, GAIN_PARAM_ID, GainNode, MixerNode, Node, NodeId, NodeKind, PluginNode, PortInputs,
    SplitNode,
};
pub use param::ParamInfo;
pub use transport::{Transport, TransportState};
