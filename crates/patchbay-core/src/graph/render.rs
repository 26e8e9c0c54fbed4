//! The render actor.

use std::sync::Arc;

use arc_swap::Guard;
use crossbeam_channel::{Receiver, Sender};

use super::Shared;
use super::command::{Command, Garbage, NoteEvent, NoteTarget};
use super::topology::Topology;
use crate::buffer::{BufferPool, StereoRef};
use crate::config::GraphConfig;
use crate::error::{GraphError, Result};
use crate::node::{AudioNode, Node, NodeId, PortInputs};

/// The render half of a graph. Move it into the audio callback and call
/// [`render_block`](Self::render_block) once per block.
///
/// A render call drains queued commands, picks up the newest topology
/// snapshot, and runs every node once in creation order. It does not
/// allocate, free, lock, or log.
pub struct Renderer {
    shared: Arc<Shared>,
    commands: Receiver<Command>,
    garbage: Sender<Garbage>,
    current: Arc<Topology>,
    nodes: Vec<Node>,
    pool: BufferPool,
    epoch: u64,
    max_nodes: usize,
    max_block_frames: usize,
}

impl Renderer {
    pub(crate) fn new(
        shared: Arc<Shared>,
        commands: Receiver<Command>,
        garbage: Sender<Garbage>,
        config: &GraphConfig,
    ) -> Self {
        let current = shared.topology.load_full();
        Self {
            shared,
            commands,
            garbage,
            current,
            nodes: Vec::with_capacity(config.max_nodes),
            pool: BufferPool::with_capacity(config.max_nodes),
            epoch: 0,
            max_nodes: config.max_nodes,
            max_block_frames: config.max_block_frames,
        }
    }

    /// Render one block of `frames` samples.
    ///
    /// `in_left`/`in_right` stand in for the output of the designated input
    /// node, if any: every port wired to that node reads them, and they pass
    /// straight through when the input node is also the output. The input
    /// node itself still renders from its own connections. The output
    /// node's result is written to `out_left`/`out_right`; samples past
    /// `frames` are left untouched.
    ///
    /// Every outcome leaves defined audio in the output:
    /// - no nodes, or an edit still in flight: silence, `Ok`
    /// - a node fails: remaining nodes are skipped, silence,
    ///   [`GraphError::RenderFailure`]
    /// - `frames` above the configured maximum or a slice shorter than
    ///   `frames`: silence, [`GraphError::InvalidBlockSize`]
    pub fn render_block(
        &mut self,
        in_left: &[f32],
        in_right: &[f32],
        out_left: &mut [f32],
        out_right: &mut [f32],
        frames: usize,
    ) -> Result<()> {
        self.drain_commands();
        self.sync_topology();
        self.shared.status.record_block();

        let valid = frames <= self.max_block_frames
            && in_left.len() >= frames
            && in_right.len() >= frames
            && out_left.len() >= frames
            && out_right.len() >= frames;
        if !valid {
            out_left.fill(0.0);
            out_right.fill(0.0);
            return Err(GraphError::InvalidBlockSize {
                frames,
                max: self.max_block_frames,
            });
        }

        let out_left = &mut out_left[..frames];
        let out_right = &mut out_right[..frames];

        if !self.is_ready() {
            // Insert commands for this snapshot were queued before it was
            // published, so one more drain catches them up.
            self.drain_commands();
            if !self.is_ready() {
                out_left.fill(0.0);
                out_right.fill(0.0);
                return Ok(());
            }
        }

        let topology = &*self.current;
        let Some(output) = topology.effective_output() else {
            out_left.fill(0.0);
            out_right.fill(0.0);
            return Ok(());
        };

        let external = StereoRef::new(&in_left[..frames], &in_right[..frames]);
        let injected = topology.input.map(|node| (node, external));
        for (i, sources) in topology.connections.iter().enumerate() {
            let (upstream, buffer) = self.pool.split_at_mut(i);
            let id = NodeId(i as u32);
            let inputs = PortInputs::from_graph(sources, upstream, injected);
            if let Err(source) = self.nodes[i].render(&inputs, buffer, frames) {
                self.shared.status.record_failure(id);
                out_left.fill(0.0);
                out_right.fill(0.0);
                return Err(GraphError::RenderFailure { node: id, source });
            }
        }

        if topology.input == Some(output) {
            out_left.copy_from_slice(external.left);
            out_right.copy_from_slice(external.right);
            return Ok(());
        }
        match self.pool.get(output.slot()) {
            Some(buffer) => {
                out_left.copy_from_slice(&buffer.left[..frames]);
                out_right.copy_from_slice(&buffer.right[..frames]);
            }
            None => {
                out_left.fill(0.0);
                out_right.fill(0.0);
            }
        }
        Ok(())
    }

    /// Total render calls made on this renderer.
    pub fn blocks_rendered(&self) -> u64 {
        self.shared.status.blocks()
    }

    /// Number of nodes the renderer currently holds.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Largest block [`render_block`](Self::render_block) accepts.
    pub fn max_block_frames(&self) -> usize {
        self.max_block_frames
    }

    fn is_ready(&self) -> bool {
        self.current.epoch == self.epoch && self.nodes.len() >= self.current.node_count()
    }

    fn sync_topology(&mut self) {
        let latest = self.shared.topology.load();
        if Arc::ptr_eq(&latest, &self.current) {
            return;
        }
        let previous = std::mem::replace(&mut self.current, Guard::into_inner(latest));
        self.retire(Garbage::Topology(previous));
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            self.apply(command);
        }
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Clear { epoch } => {
                while let Some(node) = self.nodes.pop() {
                    self.retire(Garbage::Node(node));
                }
                while let Some(buffer) = self.pool.pop() {
                    self.retire(Garbage::Buffer(buffer));
                }
                self.epoch = epoch;
            }
            Command::Insert {
                epoch,
                id,
                node,
                buffer,
            } => {
                let in_sequence = epoch == self.epoch
                    && id.slot() == self.nodes.len()
                    && self.nodes.len() < self.max_nodes;
                if !in_sequence {
                    self.shared.status.record_discarded();
                    self.retire(Garbage::Node(node));
                    self.retire(Garbage::Buffer(buffer));
                    return;
                }
                if let Err(buffer) = self.pool.push(buffer) {
                    self.shared.status.record_discarded();
                    self.retire(Garbage::Node(node));
                    self.retire(Garbage::Buffer(buffer));
                    return;
                }
                self.nodes.push(node);
            }
            Command::SetParameter {
                epoch,
                node,
                id,
                value,
            } => {
                let applied = epoch == self.epoch
                    && self
                        .nodes
                        .get_mut(node.slot())
                        .is_some_and(|n| n.set_parameter(id, value));
                if !applied {
                    self.shared.status.record_discarded();
                }
            }
            Command::SetMixerGain {
                epoch,
                node,
                port,
                gain,
            } => {
                let applied = epoch == self.epoch
                    && self
                        .nodes
                        .get_mut(node.slot())
                        .and_then(Node::as_mixer_mut)
                        .is_some_and(|m| m.set_input_gain(port, gain));
                if !applied {
                    self.shared.status.record_discarded();
                }
            }
            Command::Note {
                epoch,
                target,
                event,
            } => {
                if epoch != self.epoch {
                    self.shared.status.record_discarded();
                    return;
                }
                match target {
                    NoteTarget::Node(id) => match self.nodes.get_mut(id.slot()) {
                        Some(node) => {
                            deliver(node, event);
                        }
                        None => self.shared.status.record_discarded(),
                    },
                    NoteTarget::Broadcast => {
                        for node in &mut self.nodes {
                            deliver(node, event);
                        }
                    }
                }
            }
        }
    }

    /// Hand an item back to the control actor. If the return queue is full
    /// it is freed here instead.
    fn retire(&self, item: Garbage) {
        if self.garbage.try_send(item).is_err() {
            self.shared.status.record_garbage_dropped();
        }
    }
}

fn deliver(node: &mut Node, event: NoteEvent) -> bool {
    match event {
        NoteEvent::On {
            channel,
            pitch,
            velocity,
        } => node.note_on(channel, pitch, velocity),
        NoteEvent::Off {
            channel,
            pitch,
            velocity,
        } => node.note_off(channel, pitch, velocity),
    }
}
