//! The seam between the supervisor and the MQTT protocol engine.
//!
//! The supervisor never looks inside packets. It drives whatever implements
//! [`ProtocolClient`] through five calls and judges the result only by
//! `Ok`/`Err` and [`ProtocolClient::is_connected`].

use crate::network::{Error, Transport};

use super::config::{ConnectOptions, QoS};

/// An application message delivered by the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message<'m> {
    /// Topic the message was published on.
    pub topic: &'m str,
    /// Raw payload.
    pub payload: &'m [u8],
    /// QoS the message was delivered with.
    pub qos: QoS,
    /// Whether the broker replayed a retained message.
    pub retained: bool,
}

/// Callback for messages on a subscribed filter.
pub type MessageHandler = fn(&Message<'_>);

/// Everything a protocol call may touch: the transport and the fixed
/// send/receive buffers, all owned by the supervisor.
///
/// A link is built fresh for every call, so the protocol client never holds
/// on to the transport between calls.
#[derive(Debug)]
pub struct Link<'l, T> {
    /// The connected (or connecting) transport.
    pub transport: &'l mut T,
    /// Scratch space for outgoing packets.
    pub send_buf: &'l mut [u8],
    /// Scratch space for incoming packets.
    pub read_buf: &'l mut [u8],
}

impl<'l, T> Link<'l, T> {
    /// Bundles a transport with its buffers.
    pub fn new(transport: &'l mut T, send_buf: &'l mut [u8], read_buf: &'l mut [u8]) -> Self {
        Self {
            transport,
            send_buf,
            read_buf,
        }
    }
}

/// An MQTT protocol engine the supervisor can drive.
///
/// Every method must return within the timeouts the engine was configured
/// with; none may panic. After [`disconnect`](ProtocolClient::disconnect)
/// returns, successfully or not, [`is_connected`](ProtocolClient::is_connected)
/// must report `false`.
pub trait ProtocolClient<T: Transport> {
    /// Whether the engine believes its session is up.
    fn is_connected(&self) -> bool;

    /// Perform the protocol handshake over an already connected transport.
    fn connect(&mut self, link: Link<'_, T>, options: &ConnectOptions<'_>) -> Result<(), Error>;

    /// Subscribe to `topic_filter` and route its messages to `handler`.
    fn subscribe(
        &mut self,
        link: Link<'_, T>,
        topic_filter: &str,
        qos: QoS,
        handler: MessageHandler,
    ) -> Result<(), Error>;

    /// Process pending traffic for at most `timeout_ms`.
    ///
    /// Returns how many packets were handled; `Ok(0)` means the session was idle.
    fn service_once(&mut self, link: Link<'_, T>, timeout_ms: u32) -> Result<usize, Error>;

    /// Close the protocol session.
    fn disconnect(&mut self, link: Link<'_, T>) -> Result<(), Error>;
}
