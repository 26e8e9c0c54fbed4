//! Criterion benchmarks for the render path.
//!
//! Two axes:
//!
//! - **Render**: `render_block()` for linear gain chains and mixer fan-in at
//!   several block sizes
//! - **Control**: a parameter change or topology edit plus the block that
//!   picks it up
//!
//! Run with: `cargo bench -p patchbay-core -- graph/`
#![allow(missing_docs)]

use criterion::measurement::WallTime;
use criterion::{
    BenchmarkGroup, BenchmarkId, Criterion, black_box, criterion_group, criterion_main,
};
use patchbay_core::{GAIN_PARAM_ID, Graph, GraphConfig, Renderer};

const SAMPLE_RATE: f64 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

/// Split followed by `n` gain stages in series.
fn make_linear(n: usize, block: usize) -> (Graph, Renderer) {
    let (mut graph, renderer) = Graph::new(GraphConfig::new(SAMPLE_RATE, block)).unwrap();
    let input = graph.add_split().unwrap();
    let mut prev = input;
    for _ in 0..n {
        let node = graph.add_gain(-0.5).unwrap();
        graph.connect(prev, 0, node, 0).unwrap();
        prev = node;
    }
    graph.set_io_nodes(Some(input), Some(prev)).unwrap();
    (graph, renderer)
}

/// Split fanned out to `n` gains, all summed by one mixer.
fn make_fan_in(n: usize, block: usize) -> (Graph, Renderer) {
    let (mut graph, renderer) = Graph::new(GraphConfig::new(SAMPLE_RATE, block)).unwrap();
    let input = graph.add_split().unwrap();
    let gains: Vec<_> = (0..n).map(|_| graph.add_gain(-12.0).unwrap()).collect();
    let mixer = graph.add_mixer(n).unwrap();
    for (port, &g) in gains.iter().enumerate() {
        graph.connect(input, 0, g, 0).unwrap();
        graph.connect(g, 0, mixer, port).unwrap();
    }
    graph.set_io_nodes(Some(input), Some(mixer)).unwrap();
    (graph, renderer)
}

fn run(
    group: &mut BenchmarkGroup<'_, WallTime>,
    name: &str,
    renderer: &mut Renderer,
    block: usize,
) {
    let left_in = vec![0.5f32; block];
    let right_in = vec![0.5f32; block];
    let mut left_out = vec![0.0f32; block];
    let mut right_out = vec![0.0f32; block];
    group.bench_with_input(BenchmarkId::new(name, block), &block, |b, &frames| {
        b.iter(|| {
            renderer
                .render_block(
                    black_box(&left_in),
                    black_box(&right_in),
                    &mut left_out,
                    &mut right_out,
                    frames,
                )
                .unwrap();
            black_box((&left_out, &right_out));
        });
    });
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/render");

    for &block in BLOCK_SIZES {
        let (_graph, mut renderer) = make_linear(5, block);
        run(&mut group, "linear_5", &mut renderer, block);

        let (_graph, mut renderer) = make_linear(20, block);
        run(&mut group, "linear_20", &mut renderer, block);

        let (_graph, mut renderer) = make_fan_in(8, block);
        run(&mut group, "fan_in_8", &mut renderer, block);
    }

    group.finish();
}

fn bench_control(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/control");

    // Parameter change plus the block that applies it.
    group.bench_function("set_parameter_then_render", |b| {
        let (mut graph, mut renderer) = make_linear(5, 256);
        let target = graph.nodes().nth(3).unwrap();
        let input = vec![0.5f32; 256];
        let mut left = vec![0.0f32; 256];
        let mut right = vec![0.0f32; 256];
        let mut v = 0.0f32;
        b.iter(|| {
            v = (v + 0.01) % 1.0;
            graph.set_parameter(target, GAIN_PARAM_ID, v).unwrap();
            renderer
                .render_block(&input, &input, &mut left, &mut right, 256)
                .unwrap();
        });
    });

    // Connect/disconnect republishes the snapshot each time.
    group.bench_function("connect_publish_20", |b| {
        let (mut graph, mut renderer) = make_fan_in(20, 256);
        let nodes: Vec<_> = graph.nodes().collect();
        let (src, mixer) = (nodes[1], nodes[nodes.len() - 1]);
        let input = vec![0.5f32; 256];
        let mut left = vec![0.0f32; 256];
        let mut right = vec![0.0f32; 256];
        b.iter(|| {
            graph.disconnect(src, 0, mixer, 0).unwrap();
            graph.connect(src, 0, mixer, 0).unwrap();
            renderer
                .render_block(&input, &input, &mut left, &mut right, 256)
                .unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_render, bench_control);
criterion_main!(benches);
