//! Error types for the session layer

use crate::network::Error as NetworkError;

/// A problem with the parameters a session is created from.
///
/// These are the only errors that are fatal: they are reported once, at
/// construction, and never retried.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ConfigError {
    /// The broker host name is empty.
    EmptyHost,
    /// The broker host name does not fit the fixed-size host buffer.
    HostTooLong,
    /// A QoS value outside 0..=2.
    InvalidQoS,
    /// A configuration document could not be parsed.
    Parse,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::EmptyHost => f.write_str("broker host is empty"),
            ConfigError::HostTooLong => f.write_str("broker host is too long"),
            ConfigError::InvalidQoS => f.write_str("QoS must be 0, 1 or 2"),
            ConfigError::Parse => f.write_str("malformed configuration"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ConfigError::EmptyHost => defmt::write!(f, "EmptyHost"),
            ConfigError::HostTooLong => defmt::write!(f, "HostTooLong"),
            ConfigError::InvalidQoS => defmt::write!(f, "InvalidQoS"),
            ConfigError::Parse => defmt::write!(f, "Parse"),
        }
    }
}

/// Why a poll cycle did not end with a serviced session.
///
/// All of these are recoverable: by the time `poll` returns one, the
/// supervisor has already torn down whatever was half-built, and the next
/// poll starts over.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// The transport or the protocol connect failed.
    Connect(NetworkError),
    /// The subscription at `index` failed; later subscriptions were not attempted.
    Subscribe {
        /// Position of the failing entry in the subscription list.
        index: usize,
        /// What the protocol client reported.
        error: NetworkError,
    },
    /// The transport dropped while the protocol client still believed it was connected.
    LinkLost,
    /// Servicing the established session failed.
    Service(NetworkError),
    /// The retry policy skipped this cycle.
    BackingOff,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Connect(e) => write!(f, "connect failed: {}", e),
            Error::Subscribe { index, error } => {
                write!(f, "subscription #{} failed: {}", index, error)
            }
            Error::LinkLost => f.write_str("transport dropped beneath the session"),
            Error::Service(e) => write!(f, "service failed: {}", e),
            Error::BackingOff => f.write_str("backing off before the next connect"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Connect(e) => defmt::write!(f, "Connect({})", e),
            Error::Subscribe { index, error } => {
                defmt::write!(f, "Subscribe(#{}, {})", index, error)
            }
            Error::LinkLost => defmt::write!(f, "LinkLost"),
            Error::Service(e) => defmt::write!(f, "Service({})", e),
            Error::BackingOff => defmt::write!(f, "BackingOff"),
        }
    }
}
