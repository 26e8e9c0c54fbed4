//! The node graph: a control actor that edits it and a render actor that
//! plays it.
//!
//! [`Graph::new`] returns both halves. The [`Graph`] stays on whatever thread
//! edits the patch; the [`Renderer`] moves into the audio callback.
//!
//! ```text
//!  Graph (control)                          Renderer (audio)
//!  ───────────────                          ────────────────
//!  add_* ── Insert{node, buffer} ──┐
//!  set_parameter ── SetParameter ──┼─ bounded queue ─▶ drained each block
//!  note_on/off ── Note ────────────┘
//!  every edit ── ArcSwap<Topology> ──────────────────▶ loaded each block
//!  collect_garbage ◀── retired nodes, buffers, snapshots ──┘
//! ```
//!
//! The renderer never allocates, frees, locks, or logs. Nodes and buffers are
//! allocated by the control actor and shipped over; anything the renderer
//! retires is shipped back and freed by [`Graph::collect_garbage`], which
//! every control operation calls first.
//!
//! # Ordering
//!
//! Rendering is one pass in creation order. [`Graph::connect`] only accepts
//! a source created before its destination, so every node's inputs are
//! already computed when it runs, and cycles cannot be expressed.
//!
//! # Example
//!
//! ```rust
//! use patchbay_core::{Graph, GraphConfig};
//!
//! let (mut graph, mut renderer) = Graph::new(GraphConfig::new(48000.0, 64)).unwrap();
//! let split = graph.add_split().unwrap();
//! let gain = graph.add_gain(-6.0).unwrap();
//! graph.connect(split, 0, gain, 0).unwrap();
//! graph.set_io_nodes(Some(split), Some(gain)).unwrap();
//!
//! let input = [1.0f32; 64];
//! let mut left = [0.0f32; 64];
//! let mut right = [0.0f32; 64];
//! renderer
//!     .render_block(&input, &input, &mut left, &mut right, 64)
//!     .unwrap();
//! assert!((left[0] - 0.501187).abs() < 1e-5);
//! ```

mod command;
mod control;
mod render;
mod topology;

pub use command::{NoteTarget, RenderStatus};
pub use control::Graph;
pub use render::Renderer;
pub use topology::Topology;

use arc_swap::ArcSwap;

use command::StatusCounters;

/// State both actors can see.
pub(crate) struct Shared {
    pub(crate) topology: ArcSwap<Topology>,
    pub(crate) status: StatusCounters,
}

impl Shared {
    fn new() -> Self {
        Self {
            topology: ArcSwap::from_pointee(Topology::empty(0)),
            status: StatusCounters::default(),
        }
    }
}
