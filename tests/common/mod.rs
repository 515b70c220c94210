//! Shared mock transports, event loops, and callbacks for integration tests.
#![allow(dead_code)] // each test binary uses a subset of the helpers

use std::{cell::RefCell, collections::VecDeque, net::SocketAddr, os::fd::RawFd, rc::Rc};

use floodgate::{
    ClientConnection,
    CloseReason,
    ConnectResult,
    Connection,
    ConnectionCallbacks,
    ConnectionEvent,
    EventLoop,
    FileEvent,
    IoResult,
    Ready,
    TransportError,
    TransportResult,
    TransportSocket,
    WatermarkBuffer,
};

/// One scripted outcome for a `do_read` pass.
#[derive(Debug)]
pub enum ReadStep {
    /// Append these bytes as one transport chunk.
    Data(Vec<u8>),
    /// Report would-block.
    WouldBlock,
    /// Report the peer closed its write side.
    EndStream,
    /// Fail fatally with this message.
    Fail(&'static str),
}

/// One scripted outcome for a `do_write` pass.
#[derive(Debug)]
pub enum WriteStep {
    /// Drain everything offered.
    AcceptAll,
    /// Drain at most this many bytes, then report would-block.
    Accept(usize),
    /// Drain nothing and report would-block.
    WouldBlock,
    /// Fail fatally with this message.
    Fail(&'static str),
}

/// Scripted state shared between a [`MockTransport`] and its test.
#[derive(Default)]
pub struct TransportState {
    pub reads: VecDeque<ReadStep>,
    pub writes: VecDeque<WriteStep>,
    pub connects: VecDeque<ConnectResult>,
    /// Everything the transport accepted, in order.
    pub written: Vec<u8>,
    pub read_calls: usize,
    pub write_calls: usize,
    pub connect_calls: usize,
}

/// Transport socket driven by a script.
pub struct MockTransport {
    state: Rc<RefCell<TransportState>>,
    teardown_log: Option<Rc<RefCell<EventLog>>>,
}

impl MockTransport {
    pub fn new() -> (Self, Rc<RefCell<TransportState>>) {
        let state = Rc::new(RefCell::new(TransportState::default()));
        (
            Self {
                state: Rc::clone(&state),
                teardown_log: None,
            },
            state,
        )
    }

    /// Record the transport's drop into `log` so tests can assert teardown
    /// ordering against the readiness registration.
    pub fn with_teardown_log(mut self, log: &Rc<RefCell<EventLog>>) -> Self {
        self.teardown_log = Some(Rc::clone(log));
        self
    }
}

impl Drop for MockTransport {
    fn drop(&mut self) {
        if let Some(log) = &self.teardown_log {
            log.borrow_mut().actions.push(EventAction::TransportDropped);
        }
    }
}

impl TransportSocket for MockTransport {
    fn fd(&self) -> RawFd { 0 }

    fn do_read(&mut self, buffer: &mut WatermarkBuffer, limit: usize) -> TransportResult {
        let mut state = self.state.borrow_mut();
        state.read_calls += 1;
        let mut result = IoResult::default();
        while buffer.len() < limit {
            match state.reads.pop_front() {
                None | Some(ReadStep::WouldBlock) => {
                    result.would_block = true;
                    break;
                }
                Some(ReadStep::Data(bytes)) => {
                    buffer.add(&bytes);
                    result.bytes_processed += bytes.len();
                }
                Some(ReadStep::EndStream) => {
                    result.end_stream = true;
                    break;
                }
                Some(ReadStep::Fail(message)) => {
                    return Err(TransportError::Io(std::io::Error::other(message)));
                }
            }
        }
        Ok(result)
    }

    fn do_write(&mut self, buffer: &mut WatermarkBuffer) -> TransportResult {
        let mut state = self.state.borrow_mut();
        state.write_calls += 1;
        let step = state.writes.pop_front().unwrap_or(WriteStep::AcceptAll);
        match step {
            WriteStep::AcceptAll => {
                let n = buffer.len();
                state.written.extend_from_slice(buffer.as_slice());
                buffer.drain(n);
                Ok(IoResult {
                    bytes_processed: n,
                    ..IoResult::default()
                })
            }
            WriteStep::Accept(max) => {
                let n = max.min(buffer.len());
                state.written.extend_from_slice(&buffer.as_slice()[..n]);
                buffer.drain(n);
                Ok(IoResult {
                    bytes_processed: n,
                    would_block: true,
                    ..IoResult::default()
                })
            }
            WriteStep::WouldBlock => Ok(IoResult {
                would_block: true,
                ..IoResult::default()
            }),
            WriteStep::Fail(message) => Err(TransportError::Io(std::io::Error::other(message))),
        }
    }

    fn connect(&mut self) -> ConnectResult {
        let mut state = self.state.borrow_mut();
        state.connect_calls += 1;
        state.connects.pop_front().unwrap_or(ConnectResult::Connected)
    }
}

/// One observable interaction with the mock event loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventAction {
    Registered(Ready),
    SetEnabled(Ready),
    Activated(Ready),
    Deregistered,
    TransportDropped,
}

/// Record of every registration, interest change, and activation.
#[derive(Default)]
pub struct EventLog {
    pub actions: Vec<EventAction>,
}

impl EventLog {
    /// The interest set as of the last registration or `set_enabled`.
    pub fn current_interest(&self) -> Ready {
        self.actions
            .iter()
            .rev()
            .find_map(|action| match action {
                EventAction::Registered(interest) | EventAction::SetEnabled(interest) => {
                    Some(*interest)
                }
                _ => None,
            })
            .unwrap_or(Ready::NONE)
    }

    pub fn read_armed(&self) -> bool { self.current_interest().readable() }

    pub fn write_armed(&self) -> bool { self.current_interest().writable() }

    pub fn activations(&self) -> Vec<Ready> {
        self.actions
            .iter()
            .filter_map(|action| match action {
                EventAction::Activated(events) => Some(*events),
                _ => None,
            })
            .collect()
    }

    pub fn deregistered(&self) -> bool {
        self.actions.contains(&EventAction::Deregistered)
    }
}

/// Event loop that records interactions instead of polling anything.
pub struct RecordingEventLoop {
    pub log: Rc<RefCell<EventLog>>,
}

impl RecordingEventLoop {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(EventLog::default())),
        }
    }
}

impl EventLoop for RecordingEventLoop {
    fn register_file_readiness(&mut self, _fd: RawFd, interest: Ready) -> Box<dyn FileEvent> {
        self.log
            .borrow_mut()
            .actions
            .push(EventAction::Registered(interest));
        Box::new(RecordingFileEvent {
            log: Rc::clone(&self.log),
        })
    }
}

struct RecordingFileEvent {
    log: Rc<RefCell<EventLog>>,
}

impl FileEvent for RecordingFileEvent {
    fn activate(&mut self, events: Ready) {
        self.log.borrow_mut().actions.push(EventAction::Activated(events));
    }

    fn set_enabled(&mut self, interest: Ready) {
        self.log
            .borrow_mut()
            .actions
            .push(EventAction::SetEnabled(interest));
    }
}

impl Drop for RecordingFileEvent {
    fn drop(&mut self) {
        self.log.borrow_mut().actions.push(EventAction::Deregistered);
    }
}

/// Record of everything a [`CapturingCallbacks`] observed.
#[derive(Default)]
pub struct CallbackLog {
    pub events: Vec<ConnectionEvent>,
    pub above_high: usize,
    pub below_low: usize,
}

impl CallbackLog {
    pub fn close_reasons(&self) -> Vec<CloseReason> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ConnectionEvent::RemoteClose { reason } | ConnectionEvent::LocalClose { reason } => {
                    Some(reason.clone())
                }
                ConnectionEvent::Connected => None,
            })
            .collect()
    }
}

/// Connection callbacks that capture everything into a shared log.
pub struct CapturingCallbacks {
    pub log: Rc<RefCell<CallbackLog>>,
}

impl CapturingCallbacks {
    pub fn new() -> (Self, Rc<RefCell<CallbackLog>>) {
        let log = Rc::new(RefCell::new(CallbackLog::default()));
        (Self { log: Rc::clone(&log) }, log)
    }
}

impl ConnectionCallbacks for CapturingCallbacks {
    fn on_event(&mut self, event: &ConnectionEvent) {
        self.log.borrow_mut().events.push(event.clone());
    }

    fn on_above_write_buffer_high_watermark(&mut self) {
        self.log.borrow_mut().above_high += 1;
    }

    fn on_below_write_buffer_low_watermark(&mut self) {
        self.log.borrow_mut().below_low += 1;
    }
}

pub fn addr(text: &str) -> SocketAddr {
    text.parse().expect("literal socket address")
}

/// A fully wired server-side connection plus handles to every mock.
pub struct Harness {
    pub connection: Connection,
    pub transport: Rc<RefCell<TransportState>>,
    pub events: Rc<RefCell<EventLog>>,
    pub callbacks: Rc<RefCell<CallbackLog>>,
}

/// A not-yet-connected client connection plus handles to every mock.
pub struct ClientHarness {
    pub connection: ClientConnection,
    pub transport: Rc<RefCell<TransportState>>,
    pub events: Rc<RefCell<EventLog>>,
    pub callbacks: Rc<RefCell<CallbackLog>>,
}

/// Build a client connection over scripted mocks; `connect` is not yet
/// called.
pub fn client_harness(connects: Vec<ConnectResult>) -> ClientHarness {
    let (transport, transport_state) = MockTransport::new();
    transport_state.borrow_mut().connects = connects.into();
    let mut event_loop = RecordingEventLoop::new();
    let events = Rc::clone(&event_loop.log);
    let transport = transport.with_teardown_log(&events);
    let mut connection = ClientConnection::new(
        &mut event_loop,
        Box::new(transport),
        addr("10.0.0.1:9000"),
        addr("10.0.0.2:41000"),
    );
    let (callbacks, callback_log) = CapturingCallbacks::new();
    connection.add_connection_callbacks(Box::new(callbacks));
    ClientHarness {
        connection,
        transport: transport_state,
        events,
        callbacks: callback_log,
    }
}

/// Build an accepted (already connected) connection over scripted mocks.
pub fn connected_harness() -> Harness {
    let (transport, transport_state) = MockTransport::new();
    let mut event_loop = RecordingEventLoop::new();
    let events = Rc::clone(&event_loop.log);
    let transport = transport.with_teardown_log(&events);
    let mut connection = Connection::new(
        &mut event_loop,
        Box::new(transport),
        addr("10.0.0.1:9000"),
        addr("10.0.0.2:41000"),
        true,
    );
    let (callbacks, callback_log) = CapturingCallbacks::new();
    connection.add_connection_callbacks(Box::new(callbacks));
    Harness {
        connection,
        transport: transport_state,
        events,
        callbacks: callback_log,
    }
}
