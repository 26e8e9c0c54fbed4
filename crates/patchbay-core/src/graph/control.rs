//! The control actor.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TrySendError};

use super::Shared;
use super::command::{Command, Garbage, NoteEvent, NoteTarget, RenderStatus};
use super::render::Renderer;
use super::topology::{Topology, path_latency};
use crate::buffer::StereoBuffer;
use crate::config::GraphConfig;
use crate::error::{GraphError, Result};
use crate::host::PluginHost;
use crate::node::{AudioNode, GainNode, MixerNode, Node, NodeId, NodeKind, PluginNode, SplitNode};
use crate::param::{ParamInfo, clamp_normalized};
use crate::transport::Transport;

/// Control-side record of a node: what it looks like from outside, without
/// touching the node itself (which lives on the render actor).
struct NodeEntry {
    kind: NodeKind,
    ports: usize,
    params: Vec<ParamInfo>,
    /// Last value set per parameter, parallel to `params`.
    values: Vec<f32>,
    /// Per-port linear gains; empty for non-mixers.
    mixer_gains: Vec<f32>,
    latency: usize,
    label: Option<String>,
}

impl NodeEntry {
    fn capture(node: &Node, label: Option<String>) -> Self {
        let params: Vec<ParamInfo> = (0..node.parameter_count())
            .filter_map(|i| node.parameter_info(i))
            .collect();
        let values = params
            .iter()
            .map(|p| node.get_parameter(p.id).unwrap_or(0.0))
            .collect();
        let ports = node.input_ports();
        let mixer_gains = match node {
            Node::Mixer(mixer) => (0..ports)
                .map(|p| mixer.input_gain(p).unwrap_or(1.0))
                .collect(),
            _ => Vec::new(),
        };
        Self {
            kind: node.kind(),
            ports,
            params,
            values,
            mixer_gains,
            latency: node.latency(),
            label,
        }
    }

    fn param_slot(&self, id: u32) -> Option<usize> {
        self.params.iter().position(|p| p.id == id)
    }
}

/// The control half of a graph: topology edits, parameters, notes, and
/// introspection.
///
/// Every edit is validated and applied here synchronously, then published
/// to the [`Renderer`] as a new snapshot. Parameter and note changes are
/// queued and take effect at the renderer's next block boundary.
///
/// Dropping the renderer does not invalidate the graph; edits keep working
/// and queued commands are discarded.
pub struct Graph {
    config: GraphConfig,
    host: Option<Arc<dyn PluginHost>>,
    entries: Vec<NodeEntry>,
    connections: Vec<Vec<Option<NodeId>>>,
    input: Option<NodeId>,
    output: Option<NodeId>,
    epoch: u64,
    latency: usize,
    transport: Transport,
    shared: Arc<Shared>,
    commands: Sender<Command>,
    garbage: Receiver<Garbage>,
    reported_failures: u64,
}

impl Graph {
    /// Create a graph that hosts built-in nodes only.
    pub fn new(config: GraphConfig) -> Result<(Self, Renderer)> {
        Self::build(config, None)
    }

    /// Create a graph that can also host plugins loaded through `host`.
    pub fn with_host(config: GraphConfig, host: Arc<dyn PluginHost>) -> Result<(Self, Renderer)> {
        Self::build(config, Some(host))
    }

    fn build(config: GraphConfig, host: Option<Arc<dyn PluginHost>>) -> Result<(Self, Renderer)> {
        config.validate()?;

        let shared = Arc::new(Shared::new());
        let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(config.command_capacity);
        // Room for a full clear (every node and its buffer) plus retired
        // snapshots and a queue's worth of rejected inserts.
        let garbage_capacity = config.max_nodes * 2 + config.command_capacity + 16;
        let (gc_tx, gc_rx) = crossbeam_channel::bounded(garbage_capacity);
        let renderer = Renderer::new(Arc::clone(&shared), cmd_rx, gc_tx, &config);

        tracing::debug!(
            sample_rate = config.sample_rate,
            max_block_frames = config.max_block_frames,
            max_nodes = config.max_nodes,
            "graph_create"
        );

        let graph = Self {
            config,
            host,
            entries: Vec::new(),
            connections: Vec::new(),
            input: None,
            output: None,
            epoch: 0,
            latency: 0,
            transport: Transport::default(),
            shared,
            commands: cmd_tx,
            garbage: gc_rx,
            reported_failures: 0,
        };
        Ok((graph, renderer))
    }

    // --- Node creation ---

    /// Add a passthrough node.
    pub fn add_split(&mut self) -> Result<NodeId> {
        self.collect_garbage();
        self.insert(SplitNode::new().into(), None)
    }

    /// Add a gain node at `initial_db` (clamped to [-60, 0]).
    pub fn add_gain(&mut self, initial_db: f32) -> Result<NodeId> {
        self.collect_garbage();
        self.insert(GainNode::new(initial_db).into(), None)
    }

    /// Add a mixer with `ports` independently wireable inputs.
    pub fn add_mixer(&mut self, ports: usize) -> Result<NodeId> {
        self.collect_garbage();
        if ports == 0 {
            return Err(GraphError::InvalidPortCount(ports));
        }
        self.insert(MixerNode::new(ports).into(), None)
    }

    /// Load, activate and add a hosted plugin.
    ///
    /// Fails without adding anything if the host cannot load the plugin or
    /// the plugin rejects activation.
    pub fn add_plugin(&mut self, identifier: &str, variant: Option<&str>) -> Result<NodeId> {
        self.collect_garbage();
        let host = self.host.clone().ok_or(GraphError::NoPluginHost)?;
        self.check_capacity()?;

        let node = PluginNode::load(
            host,
            identifier,
            variant,
            self.config.sample_rate,
            self.config.max_block_frames,
        )
        .map_err(|err| {
            tracing::warn!(identifier, ?variant, error = %err, "plugin load failed");
            GraphError::from(err)
        })?;
        self.insert(node.into(), Some(identifier.to_owned()))
    }

    fn check_capacity(&self) -> Result<()> {
        if self.entries.len() >= self.config.max_nodes {
            return Err(GraphError::CapacityExceeded(self.config.max_nodes));
        }
        Ok(())
    }

    fn insert(&mut self, node: Node, label: Option<String>) -> Result<NodeId> {
        self.check_capacity()?;
        let id = NodeId(self.entries.len() as u32);
        let entry = NodeEntry::capture(&node, label);
        let ports = entry.ports;
        let kind = entry.kind;

        self.send(Command::Insert {
            epoch: self.epoch,
            id,
            node,
            buffer: StereoBuffer::new(self.config.max_block_frames),
        })?;

        self.entries.push(entry);
        self.connections.push(vec![None; ports]);
        tracing::debug!(node = id.index(), kind = kind.name(), ports, "graph_add");
        self.publish();
        Ok(id)
    }

    // --- Topology ---

    /// Wire `src`'s output into `dst`'s input port `dst_port`.
    ///
    /// Replaces whatever previously fed that port. `src` must have been
    /// created before `dst`; every node has a single output, port 0.
    pub fn connect(
        &mut self,
        src: NodeId,
        src_port: usize,
        dst: NodeId,
        dst_port: usize,
    ) -> Result<()> {
        self.collect_garbage();
        self.check_route(src, src_port, dst, dst_port)?;
        if src >= dst {
            return Err(GraphError::NonCausalConnection { src, dst });
        }

        let previous = self.connections[dst.slot()][dst_port].replace(src);
        tracing::debug!(
            src = src.index(),
            dst = dst.index(),
            port = dst_port,
            replaced = ?previous,
            "graph_connect"
        );
        if previous != Some(src) {
            self.publish();
        }
        Ok(())
    }

    /// Remove the `src` → (`dst`, `dst_port`) wire.
    ///
    /// Succeeds without change if the port is not fed by `src`.
    pub fn disconnect(
        &mut self,
        src: NodeId,
        src_port: usize,
        dst: NodeId,
        dst_port: usize,
    ) -> Result<()> {
        self.collect_garbage();
        self.check_route(src, src_port, dst, dst_port)?;

        let slot = &mut self.connections[dst.slot()][dst_port];
        if *slot == Some(src) {
            *slot = None;
            tracing::debug!(
                src = src.index(),
                dst = dst.index(),
                port = dst_port,
                "graph_disconnect"
            );
            self.publish();
        }
        Ok(())
    }

    fn check_route(
        &self,
        src: NodeId,
        src_port: usize,
        dst: NodeId,
        dst_port: usize,
    ) -> Result<()> {
        self.entry(src)?;
        let ports = self.entry(dst)?.ports;
        if src_port != 0 {
            return Err(GraphError::InvalidPort {
                node: src,
                port: src_port,
                ports: 1,
            });
        }
        if dst_port >= ports {
            return Err(GraphError::InvalidPort {
                node: dst,
                port: dst_port,
                ports,
            });
        }
        Ok(())
    }

    /// Designate the node fed by external audio and the node copied to the
    /// external output.
    ///
    /// Every port wired to the input node reads the external audio in place
    /// of that node's own output, and an input node that is also the output
    /// passes the external audio straight through. With no output node, the
    /// most recently created node is the output.
    pub fn set_io_nodes(&mut self, input: Option<NodeId>, output: Option<NodeId>) -> Result<()> {
        self.collect_garbage();
        if let Some(id) = input {
            self.entry(id)?;
        }
        if let Some(id) = output {
            self.entry(id)?;
        }
        self.input = input;
        self.output = output;
        tracing::debug!(input = ?input, output = ?output, "graph_set_io");
        self.publish();
        Ok(())
    }

    /// Discard every node and connection and reset the io designation.
    ///
    /// Handles restart from zero. Nodes are released once the renderer hands
    /// them back.
    pub fn clear(&mut self) -> Result<()> {
        self.collect_garbage();
        let epoch = self.epoch + 1;
        self.send(Command::Clear { epoch })?;

        self.epoch = epoch;
        self.entries.clear();
        self.connections.clear();
        self.input = None;
        self.output = None;
        tracing::debug!(epoch, "graph_clear");
        self.publish();
        Ok(())
    }

    fn publish(&mut self) {
        let mut topology = Topology {
            epoch: self.epoch,
            connections: self.connections.clone(),
            input: self.input,
            output: self.output,
            latency: 0,
        };
        let node_latency: Vec<usize> = self.entries.iter().map(|e| e.latency).collect();
        topology.latency = path_latency(
            &topology.connections,
            &node_latency,
            topology.input,
            topology.effective_output(),
        );
        self.latency = topology.latency;

        tracing::debug!(
            epoch = self.epoch,
            nodes = topology.node_count(),
            latency = self.latency,
            "graph_publish"
        );
        self.shared.topology.store(Arc::new(topology));
    }

    // --- Parameters ---

    /// Number of parameters `node` exposes.
    pub fn parameter_count(&self, node: NodeId) -> Result<usize> {
        Ok(self.entry(node)?.params.len())
    }

    /// Descriptor of the parameter at enumeration `index`.
    pub fn parameter_info(&self, node: NodeId, index: usize) -> Result<&ParamInfo> {
        self.entry(node)?
            .params
            .get(index)
            .ok_or(GraphError::InvalidParameterIndex { node, index })
    }

    /// Last normalized value set on parameter `id`.
    pub fn get_parameter(&self, node: NodeId, id: u32) -> Result<f32> {
        let entry = self.entry(node)?;
        let slot = entry
            .param_slot(id)
            .ok_or(GraphError::InvalidParameter { node, id })?;
        Ok(entry.values[slot])
    }

    /// Set parameter `id` to `value`, clamped to [0, 1].
    ///
    /// The change reaches the node at the start of the next rendered block.
    pub fn set_parameter(&mut self, node: NodeId, id: u32, value: f32) -> Result<()> {
        self.collect_garbage();
        let slot = self
            .entry(node)?
            .param_slot(id)
            .ok_or(GraphError::InvalidParameter { node, id })?;
        let value = clamp_normalized(value);

        self.send(Command::SetParameter {
            epoch: self.epoch,
            node,
            id,
            value,
        })?;
        self.entries[node.slot()].values[slot] = value;
        Ok(())
    }

    /// Linear gain applied to `port` of a mixer.
    pub fn mixer_gain(&self, node: NodeId, port: usize) -> Result<f32> {
        let entry = self.mixer_entry(node)?;
        entry
            .mixer_gains
            .get(port)
            .copied()
            .ok_or(GraphError::InvalidPort {
                node,
                port,
                ports: entry.ports,
            })
    }

    /// Set the linear gain a mixer applies to `port`.
    pub fn set_mixer_gain(&mut self, node: NodeId, port: usize, gain: f32) -> Result<()> {
        self.collect_garbage();
        let ports = self.mixer_entry(node)?.ports;
        if port >= ports {
            return Err(GraphError::InvalidPort { node, port, ports });
        }
        if !gain.is_finite() {
            return Err(GraphError::InvalidGain(gain));
        }

        self.send(Command::SetMixerGain {
            epoch: self.epoch,
            node,
            port,
            gain,
        })?;
        self.entries[node.slot()].mixer_gains[port] = gain;
        tracing::debug!(node = node.index(), port, gain, "graph_mixer_gain");
        Ok(())
    }

    fn mixer_entry(&self, node: NodeId) -> Result<&NodeEntry> {
        let entry = self.entry(node)?;
        if entry.kind != NodeKind::Mixer {
            return Err(GraphError::NotMixer(node));
        }
        Ok(entry)
    }

    // --- Notes ---

    /// Queue a note-on for `target`.
    ///
    /// A broadcast reaches every node once, in creation order; nodes that
    /// refuse it are skipped.
    pub fn note_on(
        &mut self,
        target: NoteTarget,
        channel: u8,
        pitch: u8,
        velocity: f32,
    ) -> Result<()> {
        self.note(
            target,
            NoteEvent::On {
                channel,
                pitch,
                velocity: clamp_normalized(velocity),
            },
        )
    }

    /// Queue a note-off for `target`.
    pub fn note_off(
        &mut self,
        target: NoteTarget,
        channel: u8,
        pitch: u8,
        velocity: f32,
    ) -> Result<()> {
        self.note(
            target,
            NoteEvent::Off {
                channel,
                pitch,
                velocity: clamp_normalized(velocity),
            },
        )
    }

    fn note(&mut self, target: NoteTarget, event: NoteEvent) -> Result<()> {
        self.collect_garbage();
        let (NoteEvent::On { channel, pitch, .. } | NoteEvent::Off { channel, pitch, .. }) = event;
        if channel >= 16 || pitch >= 128 {
            return Err(GraphError::InvalidNote { channel, pitch });
        }
        if let NoteTarget::Node(id) = target {
            self.entry(id)?;
        }
        self.send(Command::Note {
            epoch: self.epoch,
            target,
            event,
        })
    }

    // --- Transport ---

    /// Store the host transport snapshot.
    pub fn set_transport(&mut self, transport: Transport) {
        self.collect_garbage();
        tracing::debug!(
            tempo = transport.tempo,
            playing = transport.is_playing(),
            "graph_set_transport"
        );
        self.transport = transport;
    }

    /// Most recently stored transport snapshot.
    pub fn transport(&self) -> Transport {
        self.transport
    }

    // --- Introspection ---

    /// Aggregate latency of the path into the output node, in samples.
    pub fn latency(&self) -> usize {
        self.latency
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.entries.len()
    }

    /// Handles of all live nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.entries.len()).map(|i| NodeId(i as u32))
    }

    /// Variant of `node`.
    pub fn node_kind(&self, node: NodeId) -> Result<NodeKind> {
        Ok(self.entry(node)?.kind)
    }

    /// Plugin identifier for plugin nodes.
    pub fn node_label(&self, node: NodeId) -> Result<Option<&str>> {
        Ok(self.entry(node)?.label.as_deref())
    }

    /// Number of input ports on `node`.
    pub fn input_ports(&self, node: NodeId) -> Result<usize> {
        Ok(self.entry(node)?.ports)
    }

    /// Node feeding `port` of `node`.
    pub fn source_of(&self, node: NodeId, port: usize) -> Result<Option<NodeId>> {
        let ports = self.entry(node)?.ports;
        self.connections[node.slot()]
            .get(port)
            .copied()
            .ok_or(GraphError::InvalidPort { node, port, ports })
    }

    /// Designated (input, output) nodes.
    pub fn io_nodes(&self) -> (Option<NodeId>, Option<NodeId>) {
        (self.input, self.output)
    }

    /// The configuration the graph was created with.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Clear generation; bumps on every [`clear`](Self::clear).
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The snapshot currently published to the renderer.
    pub fn topology(&self) -> Arc<Topology> {
        self.shared.topology.load_full()
    }

    // --- Render status ---

    /// Total blocks that ended in a node failure.
    pub fn render_failures(&self) -> u64 {
        self.shared.status.failures()
    }

    /// Full render status report.
    pub fn render_status(&self) -> RenderStatus {
        self.shared.status.snapshot()
    }

    /// Free everything the renderer has retired and report new render
    /// failures. Returns the number of items freed.
    ///
    /// Called at the start of every editing operation; call it directly when
    /// the graph sits idle for long stretches.
    pub fn collect_garbage(&mut self) -> usize {
        let mut freed = 0;
        for item in self.garbage.try_iter() {
            drop(item);
            freed += 1;
        }

        let failures = self.shared.status.failures();
        if failures > self.reported_failures {
            let status = self.shared.status.snapshot();
            tracing::warn!(
                new_failures = failures - self.reported_failures,
                node = ?status.last_failed_node,
                "render blocks silenced by node failure"
            );
            self.reported_failures = failures;
        }
        freed
    }

    fn entry(&self, node: NodeId) -> Result<&NodeEntry> {
        self.entries
            .get(node.slot())
            .ok_or(GraphError::InvalidHandle(node))
    }

    fn send(&self, command: Command) -> Result<()> {
        match self.commands.try_send(command) {
            Ok(()) => Ok(()),
            Err(TrySendError::Disconnected(_)) => {
                self.shared.status.record_discarded();
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(GraphError::QueueFull),
        }
    }
}
