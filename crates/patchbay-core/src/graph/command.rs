//! Messages between the control and render actors.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use super::topology::Topology;
use crate::buffer::StereoBuffer;
use crate::node::{Node, NodeId};

/// Where a note event goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteTarget {
    /// A single node.
    Node(NodeId),
    /// Every node, once each, in creation order.
    Broadcast,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum NoteEvent {
    On { channel: u8, pitch: u8, velocity: f32 },
    Off { channel: u8, pitch: u8, velocity: f32 },
}

/// Control → render. Every command carries the clear generation it was
/// issued in; the renderer discards commands from an older generation.
pub(crate) enum Command {
    Insert {
        epoch: u64,
        id: NodeId,
        node: Node,
        buffer: StereoBuffer,
    },
    Clear {
        epoch: u64,
    },
    SetParameter {
        epoch: u64,
        node: NodeId,
        id: u32,
        value: f32,
    },
    SetMixerGain {
        epoch: u64,
        node: NodeId,
        port: usize,
        gain: f32,
    },
    Note {
        epoch: u64,
        target: NoteTarget,
        event: NoteEvent,
    },
}

/// Render → control. Anything the renderer stops using is shipped back so it
/// is freed off the audio thread.
pub(crate) enum Garbage {
    Node(Node),
    Buffer(StereoBuffer),
    Topology(Arc<Topology>),
}

const NO_NODE: u32 = u32::MAX;

/// Counters the render actor bumps and the control actor reads.
pub(crate) struct StatusCounters {
    failures: AtomicU64,
    last_failed: AtomicU32,
    blocks: AtomicU64,
    garbage_dropped: AtomicU64,
    commands_discarded: AtomicU64,
}

impl Default for StatusCounters {
    fn default() -> Self {
        Self {
            failures: AtomicU64::new(0),
            last_failed: AtomicU32::new(NO_NODE),
            blocks: AtomicU64::new(0),
            garbage_dropped: AtomicU64::new(0),
            commands_discarded: AtomicU64::new(0),
        }
    }
}

impl StatusCounters {
    pub(crate) fn record_failure(&self, node: NodeId) {
        self.last_failed.store(node.0, Ordering::Relaxed);
        self.failures.fetch_add(1, Ordering::Release);
    }

    pub(crate) fn record_block(&self) {
        self.blocks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_garbage_dropped(&self) {
        self.garbage_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_discarded(&self) {
        self.commands_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn blocks(&self) -> u64 {
        self.blocks.load(Ordering::Relaxed)
    }

    pub(crate) fn failures(&self) -> u64 {
        self.failures.load(Ordering::Acquire)
    }

    pub(crate) fn snapshot(&self) -> RenderStatus {
        let failures = self.failures.load(Ordering::Acquire);
        let last = self.last_failed.load(Ordering::Relaxed);
        RenderStatus {
            failures,
            last_failed_node: (last != NO_NODE).then_some(NodeId(last)),
            blocks_rendered: self.blocks.load(Ordering::Relaxed),
            garbage_dropped: self.garbage_dropped.load(Ordering::Relaxed),
            commands_discarded: self.commands_discarded.load(Ordering::Relaxed),
        }
    }
}

/// Out-of-band report of what the render actor has been doing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStatus {
    /// Blocks that ended in a node failure and were silenced.
    pub failures: u64,
    /// Node behind the most recent failure.
    pub last_failed_node: Option<NodeId>,
    /// Render calls completed, successful or not.
    pub blocks_rendered: u64,
    /// Retired items freed on the render thread because the return queue was full.
    pub garbage_dropped: u64,
    /// Commands ignored because they belonged to an older generation or named
    /// a node the renderer does not hold.
    pub commands_discarded: u64,
}
