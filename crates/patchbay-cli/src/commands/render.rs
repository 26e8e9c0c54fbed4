//! Offline rendering of the demo graph to a WAV file.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use hound::{SampleFormat, WavSpec, WavWriter};
use indicatif::{ProgressBar, ProgressStyle};
use patchbay_core::{NoteTarget, linear_to_db};

use crate::demo::{self, DemoOptions};

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Graph configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sample rate in Hz (overrides the config file)
    #[arg(long)]
    sample_rate: Option<f64>,

    /// Frames per block (overrides the config file)
    #[arg(long)]
    block_size: Option<usize>,

    /// Number of blocks to render
    #[arg(long, default_value = "375")]
    blocks: usize,

    /// Gain stage level in dB, clamped to [-60, 0]
    #[arg(long, default_value = "-6", allow_hyphen_values = true)]
    gain_db: f32,

    /// Test tone frequency in Hz fed to the graph input (0 for silence)
    #[arg(long, default_value = "440")]
    tone: f32,

    /// Host the built-in sine instrument and play one note on it
    #[arg(long)]
    instrument: bool,

    /// MIDI pitch the instrument plays
    #[arg(long, default_value = "60")]
    note: u8,

    /// Output bit depth (16 or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

/// Summary of a finished render.
#[derive(Debug, Clone, Copy)]
pub struct RenderReport {
    /// Frames written per channel.
    pub frames: usize,
    /// Peak absolute sample across both channels.
    pub peak: f32,
    /// RMS across both channels.
    pub rms: f32,
    /// Blocks that failed and were written as silence.
    pub failures: u64,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let report = render(&args)?;

    println!("\nStats:");
    println!(
        "  Output: RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(report.rms),
        linear_to_db(report.peak)
    );
    if report.failures > 0 {
        println!("  {} block(s) failed and were silenced", report.failures);
    }
    println!("Done!");
    Ok(())
}

fn wav_spec(sample_rate: f64, bit_depth: u16) -> anyhow::Result<WavSpec> {
    let sample_format = match bit_depth {
        16 => SampleFormat::Int,
        32 => SampleFormat::Float,
        other => anyhow::bail!("unsupported bit depth {other} (expected 16 or 32)"),
    };
    Ok(WavSpec {
        channels: 2,
        sample_rate: sample_rate.round() as u32,
        bits_per_sample: bit_depth,
        sample_format,
    })
}

/// Render `args.blocks` blocks through the render actor and write them out.
pub fn render(args: &RenderArgs) -> anyhow::Result<RenderReport> {
    let config = demo::load_config(args.config.as_deref(), args.sample_rate, args.block_size)?;
    let spec = wav_spec(config.sample_rate, args.bit_depth)?;
    let sample_rate = config.sample_rate;
    let block = config.max_block_frames;

    let options = DemoOptions {
        gain_db: args.gain_db,
        instrument: args.instrument,
    };
    let mut demo = demo::build(config, &options)?;
    if demo.instrument.is_some() {
        demo.graph.note_on(NoteTarget::Broadcast, 0, args.note, 0.8)?;
    }

    println!(
        "Rendering {} block(s) of {} frames at {} Hz...",
        args.blocks, block, sample_rate
    );

    let mut writer = WavWriter::create(&args.output, spec)
        .with_context(|| format!("creating {}", args.output.display()))?;

    let pb = ProgressBar::new(args.blocks as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let mut tone = ToneGenerator::new(args.tone, sample_rate);
    let mut input = vec![0.0f32; block];
    let mut left = vec![0.0f32; block];
    let mut right = vec![0.0f32; block];
    let mut peak = 0.0f32;
    let mut sum_sq = 0.0f64;

    for _ in 0..args.blocks {
        tone.fill(&mut input);
        if let Err(err) = demo
            .renderer
            .render_block(&input, &input, &mut left, &mut right, block)
        {
            // Output is already silenced; keep going like a live callback would.
            tracing::warn!(error = %err, "block failed");
        }
        demo.graph.collect_garbage();

        for (&l, &r) in left.iter().zip(right.iter()) {
            write_sample(&mut writer, l, args.bit_depth)?;
            write_sample(&mut writer, r, args.bit_depth)?;
            peak = peak.max(l.abs()).max(r.abs());
            sum_sq += f64::from(l * l) + f64::from(r * r);
        }
        pb.inc(1);
    }
    pb.finish_with_message("done");

    if demo.instrument.is_some() {
        demo.graph.note_off(NoteTarget::Broadcast, 0, args.note, 0.0)?;
    }
    writer.finalize()?;

    let frames = args.blocks * block;
    let rms = if frames == 0 {
        0.0
    } else {
        (sum_sq / (frames * 2) as f64).sqrt() as f32
    };
    Ok(RenderReport {
        frames,
        peak,
        rms,
        failures: demo.graph.render_failures(),
    })
}

fn write_sample<W>(writer: &mut WavWriter<W>, sample: f32, bit_depth: u16) -> anyhow::Result<()>
where
    W: std::io::Write + std::io::Seek,
{
    if bit_depth == 16 {
        let scaled = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        writer.write_sample(scaled)?;
    } else {
        writer.write_sample(sample)?;
    }
    Ok(())
}

/// Sine test tone at half scale.
struct ToneGenerator {
    phase: f32,
    phase_inc: f32,
}

impl ToneGenerator {
    fn new(freq: f32, sample_rate: f64) -> Self {
        Self {
            phase: 0.0,
            phase_inc: (f64::from(freq.max(0.0)) / sample_rate) as f32,
        }
    }

    fn fill(&mut self, out: &mut [f32]) {
        for sample in out {
            *sample = 0.5 * (self.phase * std::f32::consts::TAU).sin();
            self.phase = (self.phase + self.phase_inc).fract();
        }
    }
}
