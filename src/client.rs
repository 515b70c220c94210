//! Client-side connection with an explicit outbound connect step.

use std::{
    net::SocketAddr,
    ops::{Deref, DerefMut},
};

use crate::{connection::Connection, event::EventLoop, transport::TransportSocket};

/// A [`Connection`] that initiates the transport-level connect itself.
///
/// Dereferences to the base connection for everything else: filters,
/// writes, close, and readiness delivery all behave identically.
pub struct ClientConnection {
    inner: Connection,
}

impl ClientConnection {
    /// Create a client connection over a bound but not yet connected socket.
    pub fn new(
        event_loop: &mut dyn EventLoop,
        transport: Box<dyn TransportSocket>,
        remote_addr: SocketAddr,
        local_addr: SocketAddr,
    ) -> Self {
        Self {
            inner: Connection::new(event_loop, transport, remote_addr, local_addr, false),
        }
    }

    /// Issue the outbound connect.
    ///
    /// On synchronous completion the `Connected` event is raised at once; an
    /// in-flight connect completes from the write-ready path. Failure tears
    /// the connection down with a remote-close event carrying the error.
    pub fn connect(&mut self) { self.inner.do_connect(); }
}

impl Deref for ClientConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection { &self.inner }
}

impl DerefMut for ClientConnection {
    fn deref_mut(&mut self) -> &mut Connection { &mut self.inner }
}
