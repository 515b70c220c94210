//! Interfaces consumed from the owning event loop.
//!
//! The connection never blocks and never schedules work itself. It registers
//! interest in socket readiness through [`EventLoop::register_file_readiness`]
//! and is driven entirely by the owner delivering readiness back through
//! [`crate::Connection::on_file_event`]. Dropping the returned [`FileEvent`]
//! handle deregisters the socket, which is how teardown guarantees no
//! callback outlives the connection.

use std::os::fd::RawFd;

/// Set of I/O readiness kinds.
///
/// Used both as an interest mask when arming a registration and as the event
/// mask delivered back by the loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ready {
    read: bool,
    write: bool,
}

impl Ready {
    /// Empty set: neither readable nor writable.
    pub const NONE: Self = Self { read: false, write: false };
    /// Read readiness only.
    pub const READ: Self = Self { read: true, write: false };
    /// Write readiness only.
    pub const WRITE: Self = Self { read: false, write: true };
    /// Both read and write readiness.
    pub const READ_WRITE: Self = Self { read: true, write: true };

    /// Whether the set includes read readiness.
    #[must_use]
    pub const fn readable(self) -> bool { self.read }

    /// Whether the set includes write readiness.
    #[must_use]
    pub const fn writable(self) -> bool { self.write }

    /// Whether the set is empty.
    #[must_use]
    pub const fn is_none(self) -> bool { !self.read && !self.write }

    /// Combine two readiness sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            read: self.read || other.read,
            write: self.write || other.write,
        }
    }
}

/// Handle to one socket's readiness registration.
///
/// The registration stays active for the lifetime of the handle; dropping it
/// deregisters the socket from the loop.
pub trait FileEvent {
    /// Queue a synthetic readiness delivery for `events` on the next loop
    /// iteration, regardless of the armed interest set.
    ///
    /// This is how a connection yields mid-cycle and asks to be revisited
    /// once the event loop round-trips.
    fn activate(&mut self, events: Ready);

    /// Replace the armed interest set.
    fn set_enabled(&mut self, interest: Ready);
}

/// The readiness-registration facility of the owning event loop.
pub trait EventLoop {
    /// Register `fd` for readiness notification with the given initial
    /// interest and return the owning handle.
    fn register_file_readiness(&mut self, fd: RawFd, interest: Ready) -> Box<dyn FileEvent>;
}
