//! Property-based tests for the graph's numeric and wiring laws.

use patchbay_core::{
    AudioNode, GAIN_PARAM_ID, GainNode, Graph, GraphConfig, MixerNode, PortInputs, Renderer,
    StereoBuffer, StereoRef, db_to_linear,
};
use proptest::prelude::*;

const FRAMES: usize = 32;

fn render_graph(renderer: &mut Renderer, left: &[f32], right: &[f32]) -> StereoBuffer {
    let mut out = StereoBuffer::new(FRAMES);
    renderer
        .render_block(left, right, &mut out.left, &mut out.right, FRAMES)
        .unwrap();
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// get(set(v)) returns v for every normalized value.
    #[test]
    fn gain_round_trip(v in 0.0f32..=1.0f32) {
        let mut gain = GainNode::new(0.0);
        prop_assert!(gain.set_parameter(GAIN_PARAM_ID, v));
        let got = gain.get_parameter(GAIN_PARAM_ID).unwrap();
        prop_assert!((got - v).abs() < 1e-6, "set {} got {}", v, got);
    }

    /// Output equals input times 10^((v*60-60)/20).
    #[test]
    fn gain_numeric_law(
        v in 0.0f32..=1.0f32,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut gain = GainNode::new(0.0);
        gain.set_parameter(GAIN_PARAM_ID, v);
        let expected = db_to_linear(v * 60.0 - 60.0);

        let ports = [Some(StereoRef::new(&input, &input))];
        let mut out = StereoBuffer::new(FRAMES);
        gain.render(&PortInputs::direct(&ports), &mut out, FRAMES).unwrap();

        for (o, i) in out.left.iter().zip(input.iter()) {
            prop_assert!((o - i * expected).abs() < 1e-6);
        }
    }

    /// Mixer output is the gain-weighted sum of its connected ports.
    #[test]
    fn mixer_sums_connected_ports(
        a in prop::array::uniform32(-1.0f32..=1.0f32),
        b in prop::array::uniform32(-1.0f32..=1.0f32),
        gain_a in 0.0f32..2.0f32,
        gain_b in 0.0f32..2.0f32,
        connect_b in any::<bool>(),
    ) {
        let mut mixer = MixerNode::new(3);
        mixer.set_input_gain(0, gain_a);
        mixer.set_input_gain(2, gain_b);
        let ports = [
            Some(StereoRef::new(&a, &a)),
            None,
            connect_b.then(|| StereoRef::new(&b, &b)),
        ];
        let mut out = StereoBuffer::new(FRAMES);
        mixer.render(&PortInputs::direct(&ports), &mut out, FRAMES).unwrap();

        for i in 0..FRAMES {
            let expected = a[i] * gain_a + if connect_b { b[i] * gain_b } else { 0.0 };
            prop_assert!((out.left[i] - expected).abs() < 1e-5);
            prop_assert!((out.right[i] - expected).abs() < 1e-5);
        }
    }

    /// Connecting any sequence of sources to one mixer port leaves exactly
    /// the last one audible.
    #[test]
    fn last_connect_wins(order in prop::collection::vec(0usize..3, 1..8)) {
        let (mut graph, mut renderer) = Graph::new(GraphConfig::new(48000.0, FRAMES)).unwrap();
        let input = graph.add_split().unwrap();
        let levels = [0.0f32, -20.0, -40.0];
        let gains: Vec<_> = levels
            .iter()
            .map(|&db| graph.add_gain(db).unwrap())
            .collect();
        let mixer = graph.add_mixer(1).unwrap();
        for &g in &gains {
            graph.connect(input, 0, g, 0).unwrap();
        }
        for &pick in &order {
            graph.connect(gains[pick], 0, mixer, 0).unwrap();
        }
        graph.set_io_nodes(Some(input), Some(mixer)).unwrap();

        let ones = [1.0f32; FRAMES];
        let out = render_graph(&mut renderer, &ones, &ones);
        let last = *order.last().unwrap();
        let expected = db_to_linear(levels[last]);
        prop_assert!((out.left[0] - expected).abs() < 1e-6);
    }

    /// With no intervening edits, identical input gives bit-identical output.
    #[test]
    fn render_is_deterministic(
        left in prop::array::uniform32(-1.0f32..=1.0f32),
        right in prop::array::uniform32(-1.0f32..=1.0f32),
        db in -60.0f32..=0.0f32,
    ) {
        let (mut graph, mut renderer) = Graph::new(GraphConfig::new(48000.0, FRAMES)).unwrap();
        let a = graph.add_split().unwrap();
        let b = graph.add_gain(db).unwrap();
        let m = graph.add_mixer(2).unwrap();
        graph.connect(a, 0, b, 0).unwrap();
        graph.connect(a, 0, m, 0).unwrap();
        graph.connect(b, 0, m, 1).unwrap();
        graph.set_io_nodes(Some(a), None).unwrap();

        let first = render_graph(&mut renderer, &left, &right);
        let second = render_graph(&mut renderer, &left, &right);
        prop_assert_eq!(first, second);
    }
}
