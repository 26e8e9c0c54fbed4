//! Per-node render storage.
//!
//! Every node owns one [`StereoBuffer`] sized to the graph's maximum block.
//! Buffers are allocated on the control actor when a node is added and moved
//! into the render actor's [`BufferPool`], which was itself created with room
//! for every node the graph can hold. Rendering only ever writes into storage
//! that already exists.

/// A stereo audio buffer with separate left/right channels.
#[derive(Debug, Clone, PartialEq)]
pub struct StereoBuffer {
    /// Left channel samples.
    pub left: Vec<f32>,
    /// Right channel samples.
    pub right: Vec<f32>,
}

impl StereoBuffer {
    /// Creates a zeroed stereo buffer holding `frames` samples per channel.
    pub fn new(frames: usize) -> Self {
        Self {
            left: vec![0.0; frames],
            right: vec![0.0; frames],
        }
    }

    /// Number of samples per channel.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Returns true if the buffer has zero length.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Zeroes the first `frames` samples of both channels.
    #[inline]
    pub fn silence(&mut self, frames: usize) {
        self.left[..frames].fill(0.0);
        self.right[..frames].fill(0.0);
    }

    /// Copies the first `frames` samples of `src`.
    #[inline]
    pub fn copy_from(&mut self, src: StereoRef<'_>, frames: usize) {
        self.left[..frames].copy_from_slice(&src.left[..frames]);
        self.right[..frames].copy_from_slice(&src.right[..frames]);
    }

    /// Overwrites the first `frames` samples with `src` scaled by `gain`.
    #[inline]
    pub fn scale_from(&mut self, src: StereoRef<'_>, frames: usize, gain: f32) {
        for (dst, s) in self.left[..frames].iter_mut().zip(&src.left[..frames]) {
            *dst = *s * gain;
        }
        for (dst, s) in self.right[..frames].iter_mut().zip(&src.right[..frames]) {
            *dst = *s * gain;
        }
    }

    /// Adds the first `frames` samples of `src`, scaled by `gain`.
    #[inline]
    pub fn accumulate_from(&mut self, src: StereoRef<'_>, frames: usize, gain: f32) {
        for (dst, s) in self.left[..frames].iter_mut().zip(&src.left[..frames]) {
            *dst += *s * gain;
        }
        for (dst, s) in self.right[..frames].iter_mut().zip(&src.right[..frames]) {
            *dst += *s * gain;
        }
    }

    /// Borrow the buffer as a [`StereoRef`].
    #[inline]
    pub fn view(&self) -> StereoRef<'_> {
        StereoRef {
            left: &self.left,
            right: &self.right,
        }
    }
}

/// A borrowed stereo signal: either a node's buffer or externally injected audio.
#[derive(Debug, Clone, Copy)]
pub struct StereoRef<'a> {
    /// Left channel samples.
    pub left: &'a [f32],
    /// Right channel samples.
    pub right: &'a [f32],
}

impl<'a> StereoRef<'a> {
    /// Wraps a pair of channel slices.
    pub fn new(left: &'a [f32], right: &'a [f32]) -> Self {
        Self { left, right }
    }
}

/// Render-side storage: one buffer per node, indexed by node handle.
///
/// Created with capacity for the configured maximum node count so that
/// [`push`](Self::push) never reallocates.
#[derive(Debug)]
pub struct BufferPool {
    buffers: Vec<StereoBuffer>,
    limit: usize,
}

impl BufferPool {
    /// Creates an empty pool with room for `capacity` node buffers.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffers: Vec::with_capacity(capacity),
            limit: capacity,
        }
    }

    /// Number of buffers currently held.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Returns true if the pool holds no buffers.
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Number of buffers the pool can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.limit
    }

    /// Appends a buffer, handing it back if the pool is full.
    pub fn push(&mut self, buffer: StereoBuffer) -> Result<(), StereoBuffer> {
        if self.buffers.len() >= self.limit {
            return Err(buffer);
        }
        self.buffers.push(buffer);
        Ok(())
    }

    /// Removes and returns the most recently added buffer.
    pub fn pop(&mut self) -> Option<StereoBuffer> {
        self.buffers.pop()
    }

    /// Returns the buffer at `idx`.
    #[inline]
    pub fn get(&self, idx: usize) -> Option<&StereoBuffer> {
        self.buffers.get(idx)
    }

    /// Splits the pool into the buffers of nodes created before `idx` and the
    /// buffer of node `idx` itself.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= len()`.
    #[inline]
    pub fn split_at_mut(&mut self, idx: usize) -> (&[StereoBuffer], &mut StereoBuffer) {
        let (upstream, rest) = self.buffers.split_at_mut(idx);
        (upstream, &mut rest[0])
    }
}
