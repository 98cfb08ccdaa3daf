//! Transport layer beneath the MQTT session.
//!
//! A transport is a byte-stream endpoint with five capabilities: connect,
//! read with a deadline, write with a deadline, disconnect, and a liveness
//! probe. Each capability is its own trait and [`Transport`] ties them
//! together, so protocol code can be written against the whole set while
//! tests and alternative stacks implement exactly what they need.
//!
//! The deadline contract is shared by every implementation:
//!
//! - `Ok(n)` means `n` bytes (`0 <= n <= buf.len()`) were moved into or out of
//!   the front of the buffer before the deadline. `Ok(0)` is a legitimate
//!   "nothing happened yet" outcome.
//! - `Err(_)` is reserved for hard failures; the caller should treat the
//!   connection as broken and reconnect.
//!
//! [`Network`] is the generic implementation that turns the non-blocking
//! primitives of a [`Stack`] into this contract. The `std` feature adds
//! [`StdStack`](std_stack::StdStack), a BSD-socket stack for hosted targets.

#![deny(unsafe_code)]

/// Common error types for network operations
pub mod error;

/// Non-blocking socket primitives supplied by a network stack
pub mod stack;

/// Deadline-bounded transport built on a [`Stack`]
pub mod transport;

/// BSD-socket stack for hosted targets
#[cfg(feature = "std")]
pub mod std_stack;

pub use error::Error;
pub use stack::Stack;
pub use transport::Network;

/// Re-exports of common traits
pub mod prelude {
    pub use super::{Connect, Disconnect, Read, Transport, Write};
}

/// Establishes the connection of a transport.
pub trait Connect {
    /// Resolve `host`, open a stream socket and connect it to `port`.
    ///
    /// On failure the transport is left disconnected and no socket is leaked.
    fn connect(&mut self, host: &str, port: u16) -> Result<(), Error>;
}

/// Deadline-bounded reads.
pub trait Read {
    /// Read up to `buf.len()` bytes into `buf`, giving up after `timeout_ms`.
    fn read(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, Error>;
}

/// Deadline-bounded writes.
pub trait Write {
    /// Write up to `buf.len()` bytes from `buf`, giving up after `timeout_ms`.
    fn write(&mut self, buf: &[u8], timeout_ms: u32) -> Result<usize, Error>;
}

/// Teardown and liveness.
pub trait Disconnect {
    /// Close the connection if there is one. Calling it again is a no-op.
    fn disconnect(&mut self);

    /// Probe the socket's error state without reading from it.
    ///
    /// This answers "is the connection alive", not "is data waiting".
    fn is_connected(&mut self) -> bool;
}

/// A byte-stream endpoint with the full capability set.
pub trait Transport: Connect + Read + Write + Disconnect {}
