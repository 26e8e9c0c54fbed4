//! Print the demo graph's nodes, wiring and parameters.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Args;
use patchbay_core::{Graph, NodeKind};

use crate::demo::{self, DemoOptions};

/// Describe the demo graph.
#[derive(Args, Debug, Clone)]
pub struct InfoArgs {
    /// Graph configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Gain stage level in dB
    #[arg(long, default_value = "-6", allow_hyphen_values = true)]
    gain_db: f32,

    /// Include the built-in sine instrument
    #[arg(long)]
    instrument: bool,
}

/// Run the info command.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let config = demo::load_config(args.config.as_deref(), None, None)?;
    let options = DemoOptions {
        gain_db: args.gain_db,
        instrument: args.instrument,
    };
    let demo = demo::build(config, &options)?;

    println!("Plugins:");
    for id in demo.registry.identifiers() {
        let name = demo.registry.name(&id).unwrap_or_default();
        println!("  {id:<16} {name}");
    }
    println!();
    print!("{}", describe(&demo.graph)?);
    Ok(())
}

/// Render a text listing of every node in creation order.
pub fn describe(graph: &Graph) -> anyhow::Result<String> {
    let config = graph.config();
    let (input, output) = graph.io_nodes();
    let effective_output = graph.topology().effective_output();
    let mut out = String::new();

    writeln!(
        out,
        "Graph: {} node(s), {} Hz, {} frames/block, latency {} samples",
        graph.node_count(),
        config.sample_rate,
        config.max_block_frames,
        graph.latency()
    )?;

    for node in graph.nodes() {
        let kind = graph.node_kind(node)?;
        let handle = node.to_string();
        let mut role = String::new();
        if input == Some(node) {
            role.push_str(" [input]");
        }
        if output == Some(node) || (output.is_none() && effective_output == Some(node)) {
            role.push_str(" [output]");
        }
        match graph.node_label(node)? {
            Some(label) => writeln!(out, "{handle:<4} {:<6} {label}{role}", kind.name())?,
            None => writeln!(out, "{handle:<4} {:<6}{role}", kind.name())?,
        }

        for port in 0..graph.input_ports(node)? {
            match graph.source_of(node, port)? {
                Some(src) => writeln!(out, "       in[{port}] <- {src}")?,
                None => writeln!(out, "       in[{port}] <- (none)")?,
            }
        }
        if kind == NodeKind::Mixer {
            for port in 0..graph.input_ports(node)? {
                writeln!(out, "       gain[{port}] = {:.3}", graph.mixer_gain(node, port)?)?;
            }
        }
        for index in 0..graph.parameter_count(node)? {
            let info = graph.parameter_info(node, index)?;
            let value = graph.get_parameter(node, info.id)?;
            writeln!(
                out,
                "       param {} {:<12} {value:.3} {}",
                info.id, info.name, info.unit
            )?;
        }
    }
    Ok(out)
}
