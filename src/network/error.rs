//! Common error types for network operations

/// A common error type for network operations.
///
/// Every variant is a *hard* failure. Running out of time with nothing (or only
/// part of a buffer) transferred is not an error: the timed `read`/`write`
/// calls report it as `Ok(n)` with `n` smaller than requested.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// An operation was attempted on a transport that is not connected.
    NotOpen,
    /// The host name could not be resolved to an address.
    ResolutionFailed,
    /// The socket could not be opened or the connection could not be established.
    ConnectFailed,
    /// A connection attempt was refused by the peer.
    ConnectionRefused,
    /// An error occurred during a read operation.
    ReadError,
    /// An error occurred during a write operation.
    WriteError,
    /// The socket never became writable before the deadline.
    Timeout,
    /// The peer closed the connection.
    ConnectionClosed,
    /// A protocol-specific error occurred.
    ProtocolError,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let text = match self {
            Error::NotOpen => "transport is not connected",
            Error::ResolutionFailed => "host name resolution failed",
            Error::ConnectFailed => "connection could not be established",
            Error::ConnectionRefused => "connection refused",
            Error::ReadError => "read failed",
            Error::WriteError => "write failed",
            Error::Timeout => "socket did not become writable in time",
            Error::ConnectionClosed => "connection closed by peer",
            Error::ProtocolError => "protocol error",
        };
        f.write_str(text)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::NotOpen => defmt::write!(f, "NotOpen"),
            Error::ResolutionFailed => defmt::write!(f, "ResolutionFailed"),
            Error::ConnectFailed => defmt::write!(f, "ConnectFailed"),
            Error::ConnectionRefused => defmt::write!(f, "ConnectionRefused"),
            Error::ReadError => defmt::write!(f, "ReadError"),
            Error::WriteError => defmt::write!(f, "WriteError"),
            Error::Timeout => defmt::write!(f, "Timeout"),
            Error::ConnectionClosed => defmt::write!(f, "ConnectionClosed"),
            Error::ProtocolError => defmt::write!(f, "ProtocolError"),
        }
    }
}
