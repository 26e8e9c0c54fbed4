//! The demonstration graph shared by the `render` and `info` commands.
//!
//! ```text
//! input ─► Split ─► Gain ─────────► Mixer[0] ─► output
//!                   Sine (opt) ───► Mixer[1]
//! ```

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use patchbay_core::host::PluginRegistry;
use patchbay_core::{Graph, GraphConfig, NodeId, Renderer};

use crate::synth::{SINE_ID, register_builtins};

/// Options that shape the demo graph.
#[derive(Debug, Clone)]
pub struct DemoOptions {
    /// Level of the gain stage in dB.
    pub gain_db: f32,
    /// Host the sine instrument on the mixer's second port.
    pub instrument: bool,
}

/// A built demo graph and the handles worth reporting.
pub struct Demo {
    pub graph: Graph,
    pub renderer: Renderer,
    pub registry: Arc<PluginRegistry>,
    pub instrument: Option<NodeId>,
}

/// Resolve the graph configuration from an optional TOML file plus overrides.
pub fn load_config(
    path: Option<&Path>,
    sample_rate: Option<f64>,
    block_size: Option<usize>,
) -> anyhow::Result<GraphConfig> {
    let mut config = match path {
        Some(path) => GraphConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GraphConfig::default(),
    };
    if let Some(rate) = sample_rate {
        config.sample_rate = rate;
    }
    if let Some(block) = block_size {
        config.max_block_frames = block;
    }
    config.validate()?;
    Ok(config)
}

/// Build the demo graph.
pub fn build(config: GraphConfig, options: &DemoOptions) -> anyhow::Result<Demo> {
    let registry = Arc::new(PluginRegistry::new());
    register_builtins(&registry);

    let (mut graph, renderer) = Graph::with_host(config, registry.clone())?;

    let input = graph.add_split()?;
    let gain = graph.add_gain(options.gain_db)?;
    let instrument = if options.instrument {
        Some(
            graph
                .add_plugin(SINE_ID, None)
                .context("loading sine instrument")?,
        )
    } else {
        None
    };
    let mixer = graph.add_mixer(2)?;

    graph.connect(input, 0, gain, 0)?;
    graph.connect(gain, 0, mixer, 0)?;
    if let Some(synth) = instrument {
        graph.connect(synth, 0, mixer, 1)?;
    }
    graph.set_io_nodes(Some(input), Some(mixer))?;

    tracing::info!(
        nodes = graph.node_count(),
        latency = graph.latency(),
        "demo graph built"
    );

    Ok(Demo {
        graph,
        renderer,
        registry,
        instrument,
    })
}
