//! Metric helpers for `floodgate`.
//!
//! This module defines metric names and the connection stat pair wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Totals are monotonic counters;
//! buffered bytes are live gauges shared across every buffer feeding the same
//! pair, which is why updates are delta-based.

use metrics::{Counter, Gauge, counter, gauge};

/// Name of the counter tracking total bytes read from transports.
pub const RX_BYTES_TOTAL: &str = "floodgate_connection_rx_bytes_total";
/// Name of the gauge tracking bytes currently held in read buffers.
pub const RX_BYTES_BUFFERED: &str = "floodgate_connection_rx_bytes_buffered";
/// Name of the counter tracking total bytes written to transports.
pub const TX_BYTES_TOTAL: &str = "floodgate_connection_tx_bytes_total";
/// Name of the gauge tracking bytes currently held in write buffers.
pub const TX_BYTES_BUFFERED: &str = "floodgate_connection_tx_bytes_buffered";

/// Counter/gauge pairs tracking the bytes crossing one connection.
pub struct ConnectionStats {
    /// Total bytes read from the transport.
    pub read_total: Counter,
    /// Bytes currently buffered on the read side.
    pub read_current: Gauge,
    /// Total bytes written to the transport.
    pub write_total: Counter,
    /// Bytes currently buffered on the write side.
    pub write_current: Gauge,
}

impl ConnectionStats {
    /// Resolve the stat pair against the installed metrics recorder.
    #[must_use]
    pub fn register() -> Self {
        Self {
            read_total: counter!(RX_BYTES_TOTAL),
            read_current: gauge!(RX_BYTES_BUFFERED),
            write_total: counter!(TX_BYTES_TOTAL),
            write_current: gauge!(TX_BYTES_BUFFERED),
        }
    }
}

/// Apply one buffer's activity to a shared stat pair.
///
/// `delta` is added to the monotonic counter. The gauge moves by the
/// difference between `new_total` and the caller's `previous_total`, which is
/// updated in place; tracking the delta rather than the absolute size keeps
/// the gauge correct when several buffers share one pair.
#[allow(clippy::cast_precision_loss)]
pub fn update_buffer_stats(
    delta: usize,
    new_total: usize,
    previous_total: &mut usize,
    total: &Counter,
    current: &Gauge,
) {
    total.increment(delta as u64);
    if new_total > *previous_total {
        current.increment((new_total - *previous_total) as f64);
    } else if new_total < *previous_total {
        current.decrement((*previous_total - new_total) as f64);
    }
    *previous_total = new_total;
}
