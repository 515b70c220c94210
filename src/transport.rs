//! The transport abstraction beneath a connection.
//!
//! A [`TransportSocket`] hides whether bytes cross a raw socket or an
//! encrypted stream. The connection hands it the watermark buffers and the
//! transport moves bytes between them and the wire, reporting how far it got.
//! Would-block is an expected outcome and is carried in [`IoResult`]; only
//! fatal conditions surface as [`TransportError`].

use std::os::fd::RawFd;

use crate::{buffer::WatermarkBuffer, error::TransportError};

/// Outcome of a single read or write pass over the transport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IoResult {
    /// Bytes moved between the buffer and the wire during this pass.
    pub bytes_processed: usize,
    /// The socket reported it would block; the caller should re-arm and
    /// retry on the next readiness event.
    pub would_block: bool,
    /// The remote peer has shut down its write side (reads only).
    pub end_stream: bool,
}

/// Outcome of initiating or progressing an outbound connect.
#[derive(Debug)]
pub enum ConnectResult {
    /// The socket is connected.
    Connected,
    /// The connect is in flight; completion is signalled by write readiness.
    InProgress,
    /// The connect failed.
    Error(TransportError),
}

/// Result alias for transport I/O passes.
pub type TransportResult = Result<IoResult, TransportError>;

/// A duplex byte transport owned by exactly one connection.
pub trait TransportSocket {
    /// The file descriptor to register with the event loop.
    fn fd(&self) -> RawFd;

    /// Read available bytes from the wire into `buffer`.
    ///
    /// Implementations append in transport-sized chunks and stop once the
    /// buffer holds at least `limit` bytes, the socket would block, or the
    /// peer closed its write side. The last chunk may overshoot `limit`;
    /// the connection yields afterwards to let the buffer drain.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] on fatal socket failure.
    fn do_read(&mut self, buffer: &mut WatermarkBuffer, limit: usize) -> TransportResult;

    /// Write bytes from `buffer` to the wire, draining what was accepted.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] on fatal socket failure.
    fn do_write(&mut self, buffer: &mut WatermarkBuffer) -> TransportResult;

    /// Begin or progress the outbound connect.
    ///
    /// Called again from the write-ready path while a connect is in flight,
    /// so implementations must be prepared to report completion on a
    /// subsequent call.
    fn connect(&mut self) -> ConnectResult;

    /// Negotiated application protocol, if the transport knows one.
    fn protocol(&self) -> Option<&str> { None }
}
