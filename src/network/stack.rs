use super::error::Error;

/// The non-blocking primitives a network stack must provide.
///
/// Implementations wrap one concrete IP stack (BSD sockets, lwIP, smoltcp,
/// a test double). None of these calls may block beyond the timeout it is
/// given; [`Network`](super::Network) builds the deadline loops on top.
pub trait Stack {
    /// An open, connected socket. Dropping it must release the resource.
    type Socket;
    /// A resolved remote endpoint.
    type Address;

    /// Resolve `host` and `port` into an address. The first result wins.
    fn resolve(&mut self, host: &str, port: u16) -> Result<Self::Address, Error>;

    /// Open a stream socket and connect it to `address`.
    ///
    /// If the socket was opened but the connect step fails, it must be closed
    /// before returning the error.
    fn connect(&mut self, address: &Self::Address) -> Result<Self::Socket, Error>;

    /// Close a socket.
    fn close(&mut self, socket: Self::Socket);

    /// Wait at most `timeout_ms` for the socket to become readable.
    fn wait_readable(&mut self, socket: &mut Self::Socket, timeout_ms: u32) -> Result<bool, Error>;

    /// Wait at most `timeout_ms` for the socket to become writable.
    fn wait_writable(&mut self, socket: &mut Self::Socket, timeout_ms: u32) -> Result<bool, Error>;

    /// Receive without blocking. `Ok(0)` means nothing is queued right now.
    fn receive(&mut self, socket: &mut Self::Socket, buf: &mut [u8]) -> Result<usize, Error>;

    /// Send without blocking. `Ok(0)` means the send buffer is full right now.
    fn send(&mut self, socket: &mut Self::Socket, buf: &[u8]) -> Result<usize, Error>;

    /// Query the socket's pending error (`SO_ERROR`).
    ///
    /// Returns `Err` if an error is pending or the query itself fails.
    fn probe(&mut self, socket: &mut Self::Socket) -> Result<(), Error>;
}
