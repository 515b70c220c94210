//! Filter chains applied to bytes crossing a connection.
//!
//! The [`FilterManager`] holds ordered read and write chains. Read filters
//! run in insertion order over newly arrived bytes; write filters run in
//! reverse insertion order over outgoing bytes, so the filter closest to the
//! application sits at the logical start of both chains. A filter halts its
//! chain for the current pass by returning [`FilterStatus::StopIteration`];
//! the read chain keeps a cursor and resumes from the stopped filter on the
//! next pass instead of restarting.
//!
//! Filters raise out-of-band requests (write data back, close the
//! connection) through the [`FilterContext`] handed to every callback. The
//! connection applies those requests after the pass completes, so no filter
//! ever runs against a half-torn-down connection.

use std::{cell::RefCell, rc::Rc};

use bytes::BytesMut;
use tracing::trace;

use crate::connection::CloseReason;

/// Verdict a filter returns for the current chain pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterStatus {
    /// Hand the data to the next filter in the chain.
    Continue,
    /// Halt the chain for this pass. The read chain resumes from this filter
    /// on the next pass.
    StopIteration,
}

/// A filter observing bytes arriving from the wire.
pub trait ReadFilter {
    /// Called once, before any data reaches this filter.
    fn on_new_connection(&mut self, _ctx: &mut FilterContext) -> FilterStatus {
        FilterStatus::Continue
    }

    /// Called with the connection's read buffer when new bytes arrive.
    ///
    /// The filter may drain bytes it has consumed or append decoded bytes in
    /// place; whatever remains in `data` flows to the next filter.
    fn on_data(&mut self, data: &mut BytesMut, ctx: &mut FilterContext) -> FilterStatus;
}

/// A filter observing bytes on their way to the wire.
pub trait WriteFilter {
    /// Called with outgoing data before it reaches the transport.
    fn on_write(&mut self, data: &mut BytesMut, ctx: &mut FilterContext) -> FilterStatus;
}

/// A bidirectional filter occupying both chains.
pub trait Filter: ReadFilter + WriteFilter {}

/// Shared handle to a read filter.
pub type SharedReadFilter = Rc<RefCell<dyn ReadFilter>>;
/// Shared handle to a write filter.
pub type SharedWriteFilter = Rc<RefCell<dyn WriteFilter>>;

/// Out-of-band requests raised by filters during a chain pass.
///
/// The owning connection drains the context once the pass ends: injected
/// bytes are queued for transmission and a close request tears the
/// connection down with the given reason.
#[derive(Debug, Default)]
pub struct FilterContext {
    injected_writes: BytesMut,
    close_requested: Option<CloseReason>,
}

impl FilterContext {
    /// Queue `data` for transmission toward the wire.
    ///
    /// The bytes go straight to the connection's write buffer after the
    /// pass; they do not re-enter the write-filter chain.
    pub fn inject_write(&mut self, data: &[u8]) {
        self.injected_writes.extend_from_slice(data);
    }

    /// Request that the connection close with `reason` once the pass ends.
    ///
    /// No later filter in the same pass runs. The first reason recorded
    /// wins.
    pub fn request_close(&mut self, reason: CloseReason) {
        if self.close_requested.is_none() {
            self.close_requested = Some(reason);
        }
    }

    /// The close reason recorded so far, if any.
    #[must_use]
    pub fn close_requested(&self) -> Option<&CloseReason> { self.close_requested.as_ref() }

    /// Take the bytes queued for transmission.
    pub fn take_injected_writes(&mut self) -> BytesMut { self.injected_writes.split() }

    /// Take the recorded close request.
    pub fn take_close_request(&mut self) -> Option<CloseReason> { self.close_requested.take() }
}

/// Ordered read and write filter chains for one connection.
#[derive(Default)]
pub struct FilterManager {
    read_filters: Vec<SharedReadFilter>,
    write_filters: Vec<SharedWriteFilter>,
    /// Index of the read filter the next pass starts from.
    read_cursor: usize,
    /// Count of read filters whose `on_new_connection` has run.
    greeted: usize,
    initialized: bool,
}

impl FilterManager {
    /// Create an empty manager.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Append a read filter to the chain.
    ///
    /// # Panics
    ///
    /// Panics if the read chain has already been initialized; adding read
    /// filters to a running chain is a programming error.
    pub fn add_read_filter(&mut self, filter: SharedReadFilter) {
        assert!(!self.initialized, "read filter added after chain initialization");
        self.read_filters.push(filter);
    }

    /// Append a write filter to the chain. Write filters may be added at any
    /// time.
    pub fn add_write_filter(&mut self, filter: SharedWriteFilter) {
        self.write_filters.push(filter);
    }

    /// Add a bidirectional filter to both chains.
    ///
    /// # Panics
    ///
    /// Panics if the read chain has already been initialized.
    pub fn add_filter<F: Filter + 'static>(&mut self, filter: Rc<RefCell<F>>) {
        self.add_read_filter(filter.clone());
        self.add_write_filter(filter);
    }

    /// Mark the read chain ready to run and report whether it has any
    /// filters.
    ///
    /// # Panics
    ///
    /// Panics if called twice; double initialization is a programming error.
    pub fn initialize_read_filters(&mut self) -> bool {
        assert!(!self.initialized, "read filters initialized twice");
        self.initialized = true;
        !self.read_filters.is_empty()
    }

    /// Drive the read chain over `data`, resuming from the cursor.
    ///
    /// Returns [`FilterStatus::StopIteration`] when a filter halted the pass
    /// or requested a close; the cursor then stays on that filter.
    pub fn on_read(&mut self, data: &mut BytesMut, ctx: &mut FilterContext) -> FilterStatus {
        while self.read_cursor < self.read_filters.len() {
            let entry = Rc::clone(&self.read_filters[self.read_cursor]);
            let mut filter = entry.borrow_mut();
            if self.greeted <= self.read_cursor {
                self.greeted = self.read_cursor + 1;
                let status = filter.on_new_connection(ctx);
                if ctx.close_requested().is_some() || status == FilterStatus::StopIteration {
                    trace!(index = self.read_cursor, "read chain stopped in on_new_connection");
                    return FilterStatus::StopIteration;
                }
            }
            let status = filter.on_data(data, ctx);
            if ctx.close_requested().is_some() || status == FilterStatus::StopIteration {
                trace!(index = self.read_cursor, "read chain stopped");
                return FilterStatus::StopIteration;
            }
            self.read_cursor += 1;
        }
        self.read_cursor = 0;
        FilterStatus::Continue
    }

    /// Drive the write chain over `data` in reverse insertion order.
    ///
    /// Unlike the read chain, a stopped write pass restarts from the chain
    /// end on the next call; the un-consumed bytes stay with the caller.
    pub fn on_write(&mut self, data: &mut BytesMut, ctx: &mut FilterContext) -> FilterStatus {
        for entry in self.write_filters.iter().rev() {
            let status = entry.borrow_mut().on_write(data, ctx);
            if ctx.close_requested().is_some() || status == FilterStatus::StopIteration {
                return FilterStatus::StopIteration;
            }
        }
        FilterStatus::Continue
    }
}
