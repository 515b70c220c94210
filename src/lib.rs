//! Public API for the `floodgate` library.
//!
//! This crate provides the per-connection I/O engine of a network proxy: a
//! connection state machine over an abstract transport, ordered read/write
//! filter chains, and watermark-buffer backpressure. The event loop, the
//! concrete transport, and individual filter logic are external
//! collaborators specified only by the traits in [`event`], [`transport`],
//! and [`filter`].

pub mod buffer;
pub mod client;
pub mod connection;
pub mod error;
pub mod event;
pub mod filter;
pub mod metrics;
pub mod transport;

pub use buffer::{WatermarkBuffer, WatermarkCrossing};
pub use client::ClientConnection;
pub use connection::{
    BytesSentCallback,
    CloseReason,
    Connection,
    ConnectionCallbacks,
    ConnectionCloseType,
    ConnectionEvent,
    ConnectionId,
    ConnectionState,
};
pub use error::TransportError;
pub use event::{EventLoop, FileEvent, Ready};
pub use filter::{
    Filter,
    FilterContext,
    FilterManager,
    FilterStatus,
    ReadFilter,
    SharedReadFilter,
    SharedWriteFilter,
    WriteFilter,
};
pub use metrics::ConnectionStats;
pub use transport::{ConnectResult, IoResult, TransportResult, TransportSocket};
