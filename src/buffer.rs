//! Byte buffer with high/low watermark tracking.
//!
//! A [`WatermarkBuffer`] owns a [`BytesMut`] and compares its length against
//! configured thresholds. Crossing detection is latched: the owner learns of
//! each transition exactly once by polling [`WatermarkBuffer::poll_crossing`]
//! after a batch of mutations, no matter how the length oscillates in
//! between. This is the explicit-state rendering of an owner-callback
//! watermark buffer and is what lets filters mutate the underlying bytes
//! directly without holding a back-reference to the owner.

use bytes::{Buf, BytesMut};

/// A watermark transition observed by the buffer's owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatermarkCrossing {
    /// The length reached or passed the high watermark.
    AboveHigh,
    /// The length fell strictly below the low watermark after having been
    /// above the high one.
    BelowLow,
}

/// Byte buffer that tracks its size against high/low watermarks.
#[derive(Debug, Default)]
pub struct WatermarkBuffer {
    data: BytesMut,
    high_watermark: usize,
    low_watermark: usize,
    above_high: bool,
}

impl WatermarkBuffer {
    /// Create an empty buffer with watermarking disabled.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Create an empty buffer with the given thresholds.
    ///
    /// A `high` of zero disables watermarking.
    ///
    /// # Panics
    ///
    /// Panics if `low` exceeds `high`; that ordering is a programming error.
    #[must_use]
    pub fn with_watermarks(high: usize, low: usize) -> Self {
        let mut buffer = Self::new();
        buffer.set_watermarks(high, low);
        buffer
    }

    /// Replace the thresholds. The latch is re-evaluated on the next poll.
    ///
    /// # Panics
    ///
    /// Panics if `low` exceeds `high`.
    pub fn set_watermarks(&mut self, high: usize, low: usize) {
        assert!(low <= high, "low watermark {low} exceeds high watermark {high}");
        self.high_watermark = high;
        self.low_watermark = low;
    }

    /// The configured high watermark (zero when disabled).
    #[must_use]
    pub fn high_watermark(&self) -> usize { self.high_watermark }

    /// Append `bytes` to the buffer.
    pub fn add(&mut self, bytes: &[u8]) { self.data.extend_from_slice(bytes); }

    /// Move the entire contents of `other` into the buffer.
    pub fn move_from(&mut self, other: &mut BytesMut) { self.data.unsplit(other.split()); }

    /// Discard up to `n` bytes from the front of the buffer.
    pub fn drain(&mut self, n: usize) {
        let n = n.min(self.data.len());
        self.data.advance(n);
    }

    /// Current length in bytes.
    #[must_use]
    pub fn len(&self) -> usize { self.data.len() }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// View of the buffered bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] { &self.data }

    /// Direct access to the underlying storage for filters and transports.
    ///
    /// Length changes made through this reference are picked up by the next
    /// [`poll_crossing`](Self::poll_crossing) call.
    pub fn bytes_mut(&mut self) -> &mut BytesMut { &mut self.data }

    /// Whether the latch currently sits above the high watermark.
    #[must_use]
    pub fn above_high_watermark(&self) -> bool { self.above_high }

    /// Report the next watermark transition since the last poll, if any.
    ///
    /// Yields `AboveHigh` once when the length first reaches the high
    /// watermark and `BelowLow` once when it then falls strictly below the
    /// low one. Oscillation that stays inside one zone yields nothing.
    #[must_use]
    pub fn poll_crossing(&mut self) -> Option<WatermarkCrossing> {
        if self.high_watermark == 0 {
            return None;
        }
        if !self.above_high && self.data.len() >= self.high_watermark {
            self.above_high = true;
            return Some(WatermarkCrossing::AboveHigh);
        }
        if self.above_high && self.data.len() < self.low_watermark {
            self.above_high = false;
            return Some(WatermarkCrossing::BelowLow);
        }
        None
    }
}
