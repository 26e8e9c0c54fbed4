//! Graph nodes.
//!
//! Every node implements [`AudioNode`]. The graph stores nodes as the closed
//! [`Node`] enum so render-time dispatch is a `match`, not a vtable call:
//!
//! | Variant | Ports | Parameters | Notes |
//! |---------|-------|------------|-------|
//! | [`SplitNode`] | 1 | none | accepted, ignored |
//! | [`GainNode`] | 1 | "Output Gain" (dB) | accepted, ignored |
//! | [`MixerNode`] | N | none | accepted, ignored |
//! | [`PluginNode`] | 1 | from the plugin | forwarded |
//!
//! Each node has a single stereo output. Inputs reach it through
//! [`PortInputs`], which resolves a port to whatever feeds it without
//! allocating.

mod gain;
mod mixer;
mod plugin;
mod split;

pub use gain::{GAIN_PARAM_ID, GainNode};
pub use mixer::MixerNode;
pub use plugin::PluginNode;
pub use split::SplitNode;

use crate::buffer::{StereoBuffer, StereoRef};
use crate::error::ProcessError;
use crate::param::ParamInfo;

/// Handle of a node in a graph.
///
/// Handles are assigned densely in creation order starting at zero and are
/// never reused until the graph is cleared. A lower handle therefore always
/// means an earlier node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the raw numeric handle.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn slot(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The variant tag of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Hosted plugin instance.
    Plugin,
    /// Weighted sum of N input ports.
    Mixer,
    /// Identity passthrough.
    Split,
    /// Single-parameter gain stage.
    Gain,
}

impl NodeKind {
    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            NodeKind::Plugin => "Plugin",
            NodeKind::Mixer => "Mixer",
            NodeKind::Split => "Split",
            NodeKind::Gain => "Gain",
        }
    }
}

enum Sources<'a> {
    Graph {
        sources: &'a [Option<NodeId>],
        upstream: &'a [StereoBuffer],
    },
    Direct(&'a [Option<StereoRef<'a>>]),
}

/// The signals feeding one node's input ports for the current block.
pub struct PortInputs<'a> {
    sources: Sources<'a>,
    injected: Option<(NodeId, StereoRef<'a>)>,
}

impl<'a> PortInputs<'a> {
    /// Resolve ports through a connection row against the buffers of earlier
    /// nodes. A port wired to the `injected` node reads the injected signal
    /// instead of that node's own output.
    pub(crate) fn from_graph(
        sources: &'a [Option<NodeId>],
        upstream: &'a [StereoBuffer],
        injected: Option<(NodeId, StereoRef<'a>)>,
    ) -> Self {
        Self {
            sources: Sources::Graph { sources, upstream },
            injected,
        }
    }

    /// Feed ports directly from borrowed signals, one entry per port.
    pub fn direct(ports: &'a [Option<StereoRef<'a>>]) -> Self {
        Self {
            sources: Sources::Direct(ports),
            injected: None,
        }
    }

    /// An input set with every port unconnected.
    pub fn none() -> Self {
        Self::direct(&[])
    }

    /// The signal on `port`, or `None` if the port is unconnected.
    #[inline]
    pub fn port(&self, port: usize) -> Option<StereoRef<'a>> {
        match self.sources {
            Sources::Graph { sources, upstream } => {
                let src = sources.get(port).copied().flatten()?;
                match self.injected {
                    Some((node, signal)) if node == src => Some(signal),
                    _ => upstream.get(src.slot()).map(StereoBuffer::view),
                }
            }
            Sources::Direct(ports) => ports.get(port).copied().flatten(),
        }
    }
}

/// The capability contract every graph participant implements.
///
/// `render` runs on the render actor and must not allocate, block, or take
/// unbounded time. The parameter surface uses normalized values in [0, 1].
pub trait AudioNode {
    /// Variant tag.
    fn kind(&self) -> NodeKind;

    /// Number of addressable input ports.
    fn input_ports(&self) -> usize;

    /// Produce `frames` samples into `output` from the signals in `inputs`.
    ///
    /// Unconnected ports contribute silence.
    fn render(
        &mut self,
        inputs: &PortInputs<'_>,
        output: &mut StereoBuffer,
        frames: usize,
    ) -> Result<(), ProcessError>;

    /// Deliver a note-on. Nodes without note semantics accept and ignore it.
    fn note_on(&mut self, _channel: u8, _pitch: u8, _velocity: f32) -> bool {
        true
    }

    /// Deliver a note-off. Nodes without note semantics accept and ignore it.
    fn note_off(&mut self, _channel: u8, _pitch: u8, _velocity: f32) -> bool {
        true
    }

    /// Number of parameters.
    fn parameter_count(&self) -> usize {
        0
    }

    /// Descriptor at enumeration `index`.
    fn parameter_info(&self, _index: usize) -> Option<ParamInfo> {
        None
    }

    /// Normalized value of parameter `id`, if it exists.
    fn get_parameter(&self, _id: u32) -> Option<f32> {
        None
    }

    /// Set parameter `id` to a normalized value. Returns false for unknown ids.
    fn set_parameter(&mut self, _id: u32, _value: f32) -> bool {
        false
    }

    /// Processing delay in samples.
    fn latency(&self) -> usize {
        0
    }
}

/// A graph node of any built-in or hosted kind.
pub enum Node {
    /// Identity passthrough.
    Split(SplitNode),
    /// Gain stage.
    Gain(GainNode),
    /// N-input mixer.
    Mixer(MixerNode),
    /// Hosted plugin.
    Plugin(Box<PluginNode>),
}

macro_rules! dispatch {
    ($self:expr, $node:ident => $body:expr) => {
        match $self {
            Node::Split($node) => $body,
            Node::Gain($node) => $body,
            Node::Mixer($node) => $body,
            Node::Plugin($node) => $body,
        }
    };
}

impl Node {
    /// Returns the mixer, if this is one.
    pub fn as_mixer_mut(&mut self) -> Option<&mut MixerNode> {
        match self {
            Node::Mixer(mixer) => Some(mixer),
            _ => None,
        }
    }
}

impl AudioNode for Node {
    fn kind(&self) -> NodeKind {
        dispatch!(self, n => n.kind())
    }

    fn input_ports(&self) -> usize {
        dispatch!(self, n => n.input_ports())
    }

    #[inline]
    fn render(
        &mut self,
        inputs: &PortInputs<'_>,
        output: &mut StereoBuffer,
        frames: usize,
    ) -> Result<(), ProcessError> {
        dispatch!(self, n => n.render(inputs, output, frames))
    }

    fn note_on(&mut self, channel: u8, pitch: u8, velocity: f32) -> bool {
        dispatch!(self, n => n.note_on(channel, pitch, velocity))
    }

    fn note_off(&mut self, channel: u8, pitch: u8, velocity: f32) -> bool {
        dispatch!(self, n => n.note_off(channel, pitch, velocity))
    }

    fn parameter_count(&self) -> usize {
        dispatch!(self, n => n.parameter_count())
    }

    fn parameter_info(&self, index: usize) -> Option<ParamInfo> {
        dispatch!(self, n => n.parameter_info(index))
    }

    fn get_parameter(&self, id: u32) -> Option<f32> {
        dispatch!(self, n => n.get_parameter(id))
    }

    fn set_parameter(&mut self, id: u32, value: f32) -> bool {
        dispatch!(self, n => n.set_parameter(id, value))
    }

    fn latency(&self) -> usize {
        dispatch!(self, n => n.latency())
    }
}

impl From<SplitNode> for Node {
    fn from(node: SplitNode) -> Self {
        Node::Split(node)
    }
}

impl From<GainNode> for Node {
    fn from(node: GainNode) -> Self {
        Node::Gain(node)
    }
}

impl From<MixerNode> for Node {
    fn from(node: MixerNode) -> Self {
        Node::Mixer(node)
    }
}

impl From<PluginNode> for Node {
    fn from(node: PluginNode) -> Self {
        Node::Plugin(Box::new(node))
    }
}
