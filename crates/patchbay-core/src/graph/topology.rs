//! Immutable topology snapshots.
//!
//! The control actor builds a fresh [`Topology`] after every edit and
//! publishes it through an `ArcSwap`. The render actor loads the latest one
//! at the start of each block and renders the whole block against it, so a
//! block never sees half an edit.

use crate::node::NodeId;

/// One published view of the graph's wiring.
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    /// Clear generation this snapshot belongs to.
    pub(crate) epoch: u64,
    /// Per node, per input port: the node feeding that port.
    pub(crate) connections: Vec<Vec<Option<NodeId>>>,
    /// Node whose output is replaced by the injected external audio.
    pub(crate) input: Option<NodeId>,
    /// Node whose output is copied out. `None` means the last-created node.
    pub(crate) output: Option<NodeId>,
    /// Aggregate latency of the signal path into the output node.
    pub(crate) latency: usize,
}

impl Topology {
    /// The empty snapshot of generation `epoch`.
    pub(crate) fn empty(epoch: u64) -> Self {
        Self {
            epoch,
            connections: Vec::new(),
            input: None,
            output: None,
            latency: 0,
        }
    }

    /// Number of nodes the snapshot covers.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.connections.len()
    }

    /// Clear generation.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Designated input node.
    pub fn input(&self) -> Option<NodeId> {
        self.input
    }

    /// Node whose output leaves the graph: the designated output, else the
    /// most recently created node.
    #[inline]
    pub fn effective_output(&self) -> Option<NodeId> {
        self.output.or_else(|| {
            self.node_count()
                .checked_sub(1)
                .map(|last| NodeId(last as u32))
        })
    }

    /// Source feeding `port` of `node`.
    pub fn source_of(&self, node: NodeId, port: usize) -> Option<NodeId> {
        self.connections.get(node.slot())?.get(port).copied().flatten()
    }

    /// Aggregate latency in samples.
    pub fn latency(&self) -> usize {
        self.latency
    }
}

/// Longest cumulative latency over connected paths ending at `output`.
///
/// With a designated `input`, only paths starting at it count: the injected
/// signal replaces the input node's own output, so its latency is excluded,
/// and an output the input never reaches reports 0. Without one, every
/// connected path into the output counts.
///
/// Relies on every connection pointing from a lower handle to a higher one,
/// so one forward pass in creation order sees each source before its
/// consumers.
pub(crate) fn path_latency(
    connections: &[Vec<Option<NodeId>>],
    node_latency: &[usize],
    input: Option<NodeId>,
    output: Option<NodeId>,
) -> usize {
    let Some(output) = output else {
        return 0;
    };
    // `None` marks a node the input signal does not reach.
    let mut cumulative: Vec<Option<usize>> = vec![None; connections.len()];
    for (i, ports) in connections.iter().enumerate() {
        if input.is_some_and(|node| node.slot() == i) {
            cumulative[i] = Some(0);
            continue;
        }
        let sources = ports.iter().flatten().map(|src| cumulative[src.slot()]);
        let upstream = if input.is_some() {
            sources.flatten().max()
        } else {
            Some(sources.map(|c| c.unwrap_or(0)).max().unwrap_or(0))
        };
        cumulative[i] = upstream.map(|lat| lat + node_latency[i]);
    }
    cumulative.get(output.slot()).copied().flatten().unwrap_or(0)
}
