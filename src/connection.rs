//! The per-connection state machine.
//!
//! A [`Connection`] owns one duplex transport, the read and write watermark
//! buffers, and the filter chains, and converts event-loop readiness into
//! filter invocations and buffer mutations. It is single-threaded by
//! contract: every mutation happens synchronously inside a readiness
//! delivery or a direct API call on the owning thread, so no locking exists
//! anywhere in this module.
//!
//! Backpressure flows in two directions. Inbound, the read buffer crossing
//! its high watermark pauses reads until a filter drains it back below the
//! low one. Outbound, the write buffer crossing its high watermark raises
//! the above-high-watermark flag and notifies every registered callback so
//! upstream producers can throttle themselves.

use std::{
    cell::RefCell,
    net::SocketAddr,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use bytes::BytesMut;
use log::error;
use tracing::{debug, trace};

use crate::{
    buffer::{WatermarkBuffer, WatermarkCrossing},
    event::{EventLoop, FileEvent, Ready},
    filter::{Filter, FilterContext, FilterManager, FilterStatus, SharedReadFilter, SharedWriteFilter},
    metrics::{ConnectionStats, update_buffer_stats},
    transport::{ConnectResult, TransportSocket},
};

/// Source of process-unique connection identifiers.
///
/// This is the single piece of process-wide state in the crate; it is only
/// reachable through [`Connection`] construction.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(0);

/// Identifier assigned to a connection at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self { Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed)) }

    /// Return the inner `u64` representation.
    #[must_use]
    pub fn as_u64(self) -> u64 { self.0 }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// Fully open in both directions.
    Open,
    /// A flush-then-close is in progress; reads are off, pending output
    /// still drains.
    LocalCloseInitiated,
    /// The remote peer stopped sending; the local write side remains usable.
    RemoteHalfClosed,
    /// Terminal. All resources have been released.
    Closed,
}

/// How `close` should treat pending output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionCloseType {
    /// Flush pending write data before closing the socket.
    FlushWrite,
    /// Discard pending output and close immediately.
    NoFlush,
    /// Flush pending data, then defer the final teardown by one event-loop
    /// round-trip so in-flight callbacks observe final state.
    FlushWriteAndDelay,
}

/// Why a connection reached `Closed` (or half-closed).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CloseReason {
    /// A local `close` call requested it.
    LocalRequested,
    /// The remote peer closed or half-closed the stream.
    RemoteClosed,
    /// A fatal transport failure.
    TransportError(String),
    /// A filter reported a protocol violation.
    ProtocolViolation(String),
}

/// Event raised to registered connection callbacks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// An outbound connect completed.
    Connected,
    /// The remote end closed (or half-closed) the connection.
    RemoteClose {
        /// Why the remote side is considered gone.
        reason: CloseReason,
    },
    /// The local end closed the connection.
    LocalClose {
        /// Why the local side closed.
        reason: CloseReason,
    },
}

/// Observer of connection lifecycle and write-buffer watermark changes.
///
/// Callbacks are invoked synchronously on the owning thread. A callback must
/// not re-enter the connection it is registered on; acting on *other*
/// connections (the usual cross-connection backpressure pattern) is fine.
pub trait ConnectionCallbacks {
    /// A lifecycle event occurred.
    fn on_event(&mut self, event: &ConnectionEvent);

    /// The write buffer crossed its high watermark; producers should slow
    /// down.
    fn on_above_write_buffer_high_watermark(&mut self) {}

    /// The write buffer drained below its low watermark; producers may
    /// resume.
    fn on_below_write_buffer_low_watermark(&mut self) {}
}

/// Callback invoked after each successful flush with the byte count sent.
pub type BytesSentCallback = Box<dyn FnMut(usize)>;

/// A single duplex connection driven by an external event loop.
pub struct Connection {
    id: ConnectionId,
    state: ConnectionState,
    remote_addr: SocketAddr,
    local_addr: SocketAddr,
    filter_manager: FilterManager,
    read_buffer: WatermarkBuffer,
    write_buffer: WatermarkBuffer,
    /// Read buffer limit in bytes; zero means unlimited.
    buffer_limit: usize,
    transport: Option<Box<dyn TransportSocket>>,
    file_event: Option<Box<dyn FileEvent>>,
    interest: Ready,
    callbacks: Vec<Box<dyn ConnectionCallbacks>>,
    bytes_sent_callbacks: Vec<BytesSentCallback>,
    /// Number of outstanding read-disable requests; reads resume at zero.
    read_disable_count: u32,
    connecting: bool,
    close_with_flush: bool,
    delayed_close: bool,
    half_close_enabled: bool,
    above_high_watermark: bool,
    stats: Option<ConnectionStats>,
    last_read_buffer_size: usize,
    last_write_buffer_size: usize,
}

impl Connection {
    /// Create a connection over a bound socket.
    ///
    /// Registers the transport's descriptor with `event_loop` for read and
    /// write readiness. Pass `connected = true` for an accepted socket;
    /// client sockets pass `false` and raise [`ConnectionEvent::Connected`]
    /// once their connect completes.
    pub fn new(
        event_loop: &mut dyn EventLoop,
        transport: Box<dyn TransportSocket>,
        remote_addr: SocketAddr,
        local_addr: SocketAddr,
        connected: bool,
    ) -> Self {
        let id = ConnectionId::next();
        let file_event = event_loop.register_file_readiness(transport.fd(), Ready::READ_WRITE);
        debug!(id = %id, %remote_addr, %local_addr, connected, "new connection");
        Self {
            id,
            state: ConnectionState::Open,
            remote_addr,
            local_addr,
            filter_manager: FilterManager::new(),
            read_buffer: WatermarkBuffer::new(),
            write_buffer: WatermarkBuffer::new(),
            buffer_limit: 0,
            transport: Some(transport),
            file_event: Some(file_event),
            interest: Ready::READ_WRITE,
            callbacks: Vec::new(),
            bytes_sent_callbacks: Vec::new(),
            read_disable_count: 0,
            connecting: !connected,
            close_with_flush: false,
            delayed_close: false,
            half_close_enabled: false,
            above_high_watermark: false,
            stats: None,
            last_read_buffer_size: 0,
            last_write_buffer_size: 0,
        }
    }

    /// The process-unique identifier of this connection.
    #[must_use]
    pub fn id(&self) -> ConnectionId { self.id }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState { self.state }

    /// Address of the remote peer.
    #[must_use]
    pub fn remote_addr(&self) -> SocketAddr { self.remote_addr }

    /// Local address of the socket.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr { self.local_addr }

    /// Whether reads are currently enabled.
    #[must_use]
    pub fn read_enabled(&self) -> bool { self.read_disable_count == 0 }

    /// Whether the write buffer currently sits above its high watermark.
    #[must_use]
    pub fn above_high_watermark(&self) -> bool { self.above_high_watermark }

    /// The configured read buffer limit; zero means unlimited.
    #[must_use]
    pub fn buffer_limit(&self) -> usize { self.buffer_limit }

    /// Bytes currently held in the read buffer.
    #[must_use]
    pub fn buffered_read_bytes(&self) -> usize { self.read_buffer.len() }

    /// Bytes currently held in the write buffer.
    #[must_use]
    pub fn buffered_write_bytes(&self) -> usize { self.write_buffer.len() }

    /// The application protocol negotiated by the transport, if any.
    #[must_use]
    pub fn next_protocol(&self) -> Option<String> {
        self.transport
            .as_deref()
            .and_then(|transport| transport.protocol().map(str::to_owned))
    }

    /// Whether remote half-close is handled gracefully.
    #[must_use]
    pub fn half_close_enabled(&self) -> bool { self.half_close_enabled }

    /// Control half-close handling. When enabled, a zero-byte read moves the
    /// connection to [`ConnectionState::RemoteHalfClosed`] and the write
    /// side stays usable; when disabled, it closes the connection.
    pub fn set_half_close(&mut self, enabled: bool) { self.half_close_enabled = enabled; }

    /// Set the read buffer limit and derive watermarks for both buffers
    /// (high = `limit`, low = `limit / 2`). Zero removes the limit and
    /// disables watermarking.
    pub fn set_buffer_limits(&mut self, limit: usize) {
        self.buffer_limit = limit;
        self.read_buffer.set_watermarks(limit, limit / 2);
        self.write_buffer.set_watermarks(limit, limit / 2);
    }

    /// Attach a stat pair updated on every transport read and write.
    ///
    /// # Panics
    ///
    /// Panics if stats were already attached; replacing a live stat pair
    /// would corrupt the buffered-bytes gauges.
    pub fn set_connection_stats(&mut self, stats: ConnectionStats) {
        assert!(self.stats.is_none(), "connection stats set twice");
        self.stats = Some(stats);
    }

    /// Register a lifecycle/watermark observer.
    pub fn add_connection_callbacks(&mut self, callbacks: Box<dyn ConnectionCallbacks>) {
        self.callbacks.push(callbacks);
    }

    /// Register a callback invoked after each successful flush with the
    /// number of bytes sent.
    pub fn add_bytes_sent_callback(&mut self, callback: BytesSentCallback) {
        self.bytes_sent_callbacks.push(callback);
    }

    /// Append a read filter. See [`FilterManager::add_read_filter`].
    pub fn add_read_filter(&mut self, filter: SharedReadFilter) {
        self.filter_manager.add_read_filter(filter);
    }

    /// Append a write filter. See [`FilterManager::add_write_filter`].
    pub fn add_write_filter(&mut self, filter: SharedWriteFilter) {
        self.filter_manager.add_write_filter(filter);
    }

    /// Add a bidirectional filter to both chains.
    pub fn add_filter<F: Filter + 'static>(&mut self, filter: Rc<RefCell<F>>) {
        self.filter_manager.add_filter(filter);
    }

    /// Mark the read chain ready and report whether any read filter exists.
    ///
    /// # Panics
    ///
    /// Panics if called twice.
    pub fn initialize_read_filters(&mut self) -> bool {
        self.filter_manager.initialize_read_filters()
    }

    /// Disable or re-enable reads.
    ///
    /// Disabling is counted: N disables require N enables before read
    /// interest is re-armed. Re-enabling with bytes already buffered queues
    /// a synthetic read event so the filter chain resumes without waiting
    /// for new wire data.
    pub fn read_disable(&mut self, disable: bool) {
        if self.state == ConnectionState::Closed {
            return;
        }
        if disable {
            self.read_disable_count += 1;
            if self.read_disable_count == 1 {
                trace!(id = %self.id, "reads disabled");
                self.refresh_interest();
            }
        } else {
            if self.read_disable_count == 0 {
                error!("connection {}: read_disable(false) without matching disable", self.id);
                return;
            }
            self.read_disable_count -= 1;
            if self.read_disable_count == 0 {
                trace!(id = %self.id, "reads enabled");
                self.refresh_interest();
                if !self.read_buffer.is_empty() {
                    if let Some(event) = &mut self.file_event {
                        event.activate(Ready::READ);
                    }
                }
            }
        }
    }

    /// Queue `data` for transmission.
    ///
    /// The write-filter chain runs over the caller's buffer first; if a
    /// filter halts the pass the bytes stay in `data` for the caller to
    /// re-offer. Otherwise the bytes move into the write buffer and a flush
    /// is attempted immediately, arming write readiness if the transport
    /// cannot take everything. Writing on a closed connection discards the
    /// data.
    pub fn write(&mut self, data: &mut BytesMut) {
        if self.state == ConnectionState::Closed {
            debug!(id = %self.id, bytes = data.len(), "write on closed connection discarded");
            data.clear();
            return;
        }
        let mut ctx = FilterContext::default();
        let status = self.filter_manager.on_write(data, &mut ctx);
        self.apply_filter_context(ctx);
        if self.state == ConnectionState::Closed || status == FilterStatus::StopIteration {
            return;
        }
        trace!(id = %self.id, bytes = data.len(), "queueing data for write");
        self.write_buffer.move_from(data);
        self.process_write_watermarks();
        if self.connecting {
            self.refresh_interest();
        } else {
            self.flush_write();
        }
    }

    /// Close the connection.
    ///
    /// `FlushWrite` defers the socket teardown until pending output drains;
    /// `NoFlush` discards pending output and closes immediately;
    /// `FlushWriteAndDelay` additionally defers the final teardown by one
    /// event-loop round-trip. Closing an already-closed connection is a
    /// no-op.
    pub fn close(&mut self, close_type: ConnectionCloseType) {
        if self.state == ConnectionState::Closed {
            return;
        }
        debug!(id = %self.id, ?close_type, "closing connection");
        match close_type {
            ConnectionCloseType::NoFlush => {
                let discarded = self.write_buffer.len();
                if discarded > 0 {
                    debug!(id = %self.id, discarded, "discarding pending write data");
                    self.write_buffer.drain(discarded);
                }
                self.close_socket(ConnectionEvent::LocalClose {
                    reason: CloseReason::LocalRequested,
                });
            }
            ConnectionCloseType::FlushWrite | ConnectionCloseType::FlushWriteAndDelay => {
                self.close_with_flush = true;
                self.delayed_close = close_type == ConnectionCloseType::FlushWriteAndDelay;
                if self.write_buffer.is_empty() && !self.connecting {
                    if self.delayed_close {
                        self.state = ConnectionState::LocalCloseInitiated;
                        if let Some(event) = &mut self.file_event {
                            event.activate(Ready::WRITE);
                        }
                    } else {
                        self.close_socket(ConnectionEvent::LocalClose {
                            reason: CloseReason::LocalRequested,
                        });
                    }
                } else {
                    self.state = ConnectionState::LocalCloseInitiated;
                    self.refresh_interest();
                    if !self.connecting {
                        self.flush_write();
                    }
                }
            }
        }
    }

    /// Deliver socket readiness. This is the single entry point the event
    /// loop drives; write readiness is serviced before read readiness.
    pub fn on_file_event(&mut self, events: Ready) {
        trace!(id = %self.id, ?events, "file event");
        if self.state == ConnectionState::Closed {
            return;
        }
        if events.writable() {
            self.on_write_ready();
        }
        if self.state != ConnectionState::Closed && events.readable() {
            self.on_read_ready();
        }
    }

    /// Begin the outbound connect. Exposed through
    /// [`crate::ClientConnection::connect`].
    pub(crate) fn do_connect(&mut self) {
        debug!(id = %self.id, remote = %self.remote_addr, "connecting");
        let result = match self.transport.as_mut() {
            Some(transport) => transport.connect(),
            None => return,
        };
        match result {
            ConnectResult::Connected => {
                self.connecting = false;
                debug!(id = %self.id, "connected");
                self.raise_event(&ConnectionEvent::Connected);
            }
            ConnectResult::InProgress => {
                self.connecting = true;
                self.refresh_interest();
            }
            ConnectResult::Error(error) => {
                debug!(id = %self.id, %error, "connect failed");
                self.close_socket(ConnectionEvent::RemoteClose {
                    reason: CloseReason::TransportError(error.to_string()),
                });
            }
        }
    }

    fn on_read_ready(&mut self) {
        if self.connecting || self.state != ConnectionState::Open {
            return;
        }
        if self.buffer_limit > 0 && self.read_buffer.len() >= self.buffer_limit {
            // Drain before reading more: give the chain a pass over what is
            // already buffered instead of touching the transport, then yield.
            self.dispatch_read_filters();
            if self.state == ConnectionState::Closed {
                return;
            }
            self.update_read_buffer_stats(0, self.read_buffer.len());
            self.process_read_watermarks();
            if self.state == ConnectionState::Closed {
                return;
            }
            if self.read_buffer.len() >= self.buffer_limit && self.read_disable_count == 0 {
                if let Some(event) = &mut self.file_event {
                    event.activate(Ready::READ);
                }
            }
            return;
        }
        let limit = if self.buffer_limit == 0 { usize::MAX } else { self.buffer_limit };
        let io = {
            let Some(transport) = self.transport.as_mut() else {
                return;
            };
            transport.do_read(&mut self.read_buffer, limit)
        };
        match io {
            Err(error) => {
                debug!(id = %self.id, %error, "transport read error");
                self.close_socket(ConnectionEvent::RemoteClose {
                    reason: CloseReason::TransportError(error.to_string()),
                });
            }
            Ok(result) => {
                trace!(
                    id = %self.id,
                    bytes = result.bytes_processed,
                    end_stream = result.end_stream,
                    "transport read"
                );
                if result.bytes_processed > 0
                    || (result.end_stream && !self.read_buffer.is_empty())
                {
                    self.dispatch_read_filters();
                }
                if self.state == ConnectionState::Closed {
                    return;
                }
                self.update_read_buffer_stats(result.bytes_processed, self.read_buffer.len());
                if result.end_stream {
                    self.on_remote_close();
                    return;
                }
                self.process_read_watermarks();
                if self.state == ConnectionState::Closed {
                    return;
                }
                if self.buffer_limit > 0
                    && self.read_buffer.len() >= self.buffer_limit
                    && self.read_disable_count == 0
                {
                    if let Some(event) = &mut self.file_event {
                        event.activate(Ready::READ);
                    }
                }
            }
        }
    }

    fn on_write_ready(&mut self) {
        if self.connecting {
            let result = match self.transport.as_mut() {
                Some(transport) => transport.connect(),
                None => return,
            };
            match result {
                ConnectResult::Connected => {
                    self.connecting = false;
                    debug!(id = %self.id, "connected");
                    self.raise_event(&ConnectionEvent::Connected);
                }
                ConnectResult::InProgress => return,
                ConnectResult::Error(error) => {
                    debug!(id = %self.id, %error, "connect failed");
                    self.close_socket(ConnectionEvent::RemoteClose {
                        reason: CloseReason::TransportError(error.to_string()),
                    });
                    return;
                }
            }
        }
        if self.close_with_flush && self.delayed_close && self.write_buffer.is_empty() {
            self.close_socket(ConnectionEvent::LocalClose {
                reason: CloseReason::LocalRequested,
            });
            return;
        }
        self.flush_write();
    }

    fn flush_write(&mut self) {
        if self.state == ConnectionState::Closed {
            return;
        }
        if self.write_buffer.is_empty() {
            if self.close_with_flush {
                if self.delayed_close {
                    if let Some(event) = &mut self.file_event {
                        event.activate(Ready::WRITE);
                    }
                } else {
                    self.close_socket(ConnectionEvent::LocalClose {
                        reason: CloseReason::LocalRequested,
                    });
                    return;
                }
            }
            self.refresh_interest();
            return;
        }
        let io = {
            let Some(transport) = self.transport.as_mut() else {
                return;
            };
            transport.do_write(&mut self.write_buffer)
        };
        match io {
            Err(error) => {
                debug!(id = %self.id, %error, "transport write error");
                self.close_socket(ConnectionEvent::RemoteClose {
                    reason: CloseReason::TransportError(error.to_string()),
                });
            }
            Ok(result) => {
                trace!(
                    id = %self.id,
                    bytes = result.bytes_processed,
                    would_block = result.would_block,
                    "transport write"
                );
                self.update_write_buffer_stats(result.bytes_processed, self.write_buffer.len());
                if result.bytes_processed > 0 {
                    for callback in &mut self.bytes_sent_callbacks {
                        callback(result.bytes_processed);
                    }
                }
                self.process_write_watermarks();
                if self.write_buffer.is_empty() && self.close_with_flush {
                    if self.delayed_close {
                        if let Some(event) = &mut self.file_event {
                            event.activate(Ready::WRITE);
                        }
                    } else {
                        self.close_socket(ConnectionEvent::LocalClose {
                            reason: CloseReason::LocalRequested,
                        });
                        return;
                    }
                }
                self.refresh_interest();
            }
        }
    }

    fn dispatch_read_filters(&mut self) {
        let mut ctx = FilterContext::default();
        let _ = self.filter_manager.on_read(self.read_buffer.bytes_mut(), &mut ctx);
        self.apply_filter_context(ctx);
    }

    fn apply_filter_context(&mut self, mut ctx: FilterContext) {
        let mut injected = ctx.take_injected_writes();
        let close = ctx.take_close_request();
        if !injected.is_empty() && self.state != ConnectionState::Closed {
            trace!(id = %self.id, bytes = injected.len(), "filter injected write data");
            self.write_buffer.move_from(&mut injected);
            self.process_write_watermarks();
            if self.connecting {
                self.refresh_interest();
            } else {
                self.flush_write();
            }
        }
        if let Some(reason) = close {
            debug!(id = %self.id, ?reason, "filter requested close");
            self.close_socket(ConnectionEvent::LocalClose { reason });
        }
    }

    fn on_remote_close(&mut self) {
        if self.half_close_enabled && self.state == ConnectionState::Open {
            debug!(id = %self.id, "remote half-closed");
            self.state = ConnectionState::RemoteHalfClosed;
            self.refresh_interest();
            self.raise_event(&ConnectionEvent::RemoteClose {
                reason: CloseReason::RemoteClosed,
            });
        } else {
            self.close_socket(ConnectionEvent::RemoteClose {
                reason: CloseReason::RemoteClosed,
            });
        }
    }

    /// Release all resources and raise the close event. Runs exactly once;
    /// later calls observe `Closed` and return.
    fn close_socket(&mut self, event: ConnectionEvent) {
        if self.state == ConnectionState::Closed {
            return;
        }
        debug!(id = %self.id, ?event, "closing socket");
        self.state = ConnectionState::Closed;
        // The readiness registration must go before the transport handle so
        // no callback can fire against a released socket.
        self.file_event = None;
        self.transport = None;
        self.raise_event(&event);
    }

    fn raise_event(&mut self, event: &ConnectionEvent) {
        for callbacks in &mut self.callbacks {
            callbacks.on_event(event);
        }
    }

    fn process_read_watermarks(&mut self) {
        while let Some(crossing) = self.read_buffer.poll_crossing() {
            match crossing {
                WatermarkCrossing::AboveHigh => {
                    debug!(id = %self.id, "read buffer above high watermark; pausing reads");
                    self.read_disable(true);
                }
                WatermarkCrossing::BelowLow => {
                    debug!(id = %self.id, "read buffer below low watermark; resuming reads");
                    self.read_disable(false);
                }
            }
        }
    }

    fn process_write_watermarks(&mut self) {
        while let Some(crossing) = self.write_buffer.poll_crossing() {
            match crossing {
                WatermarkCrossing::AboveHigh => {
                    debug!(id = %self.id, "write buffer above high watermark");
                    self.above_high_watermark = true;
                    for callbacks in &mut self.callbacks {
                        callbacks.on_above_write_buffer_high_watermark();
                    }
                }
                WatermarkCrossing::BelowLow => {
                    debug!(id = %self.id, "write buffer below low watermark");
                    self.above_high_watermark = false;
                    for callbacks in &mut self.callbacks {
                        callbacks.on_below_write_buffer_low_watermark();
                    }
                }
            }
        }
    }

    fn desired_interest(&self) -> Ready {
        if self.state == ConnectionState::Closed {
            return Ready::NONE;
        }
        let mut interest = Ready::NONE;
        if self.state == ConnectionState::Open && self.read_disable_count == 0 {
            interest = interest.union(Ready::READ);
        }
        if self.connecting || !self.write_buffer.is_empty() {
            interest = interest.union(Ready::WRITE);
        }
        interest
    }

    fn refresh_interest(&mut self) {
        let wanted = self.desired_interest();
        if wanted != self.interest {
            self.interest = wanted;
            if let Some(event) = &mut self.file_event {
                event.set_enabled(wanted);
            }
        }
    }

    fn update_read_buffer_stats(&mut self, num_read: usize, new_size: usize) {
        if let Some(stats) = &self.stats {
            update_buffer_stats(
                num_read,
                new_size,
                &mut self.last_read_buffer_size,
                &stats.read_total,
                &stats.read_current,
            );
        }
    }

    fn update_write_buffer_stats(&mut self, num_written: usize, new_size: usize) {
        if let Some(stats) = &self.stats {
            update_buffer_stats(
                num_written,
                new_size,
                &mut self.last_write_buffer_size,
                &stats.write_total,
                &stats.write_current,
            );
        }
    }
}
