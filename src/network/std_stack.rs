use std::io::{ErrorKind, Read as _, Write as _};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use rustix::event::{PollFd, PollFlags, poll};
use rustix::io::Errno;

use super::error::Error;
use super::stack::Stack;

/// BSD-socket [`Stack`] built on [`std::net::TcpStream`].
///
/// Connected streams are switched to non-blocking mode; readiness is polled
/// with `poll(2)` so that waits honour millisecond deadlines.
///
/// # Examples
///
/// ```rust,no_run
/// use mqttcloud::network::prelude::*;
/// use mqttcloud::network::{Network, std_stack::StdStack};
/// use mqttcloud::time::StdClock;
///
/// let mut transport = Network::new(StdStack::new(), StdClock::new());
/// transport.connect("broker.example", 1883)?;
/// transport.write(b"\xc0\x00", 1_000)?;
/// # Ok::<(), mqttcloud::network::Error>(())
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct StdStack {
    connect_timeout: Option<Duration>,
}

impl StdStack {
    /// Creates a stack whose connects block until the OS gives up.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds every connect attempt to `timeout`.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }
}

fn wait(stream: &TcpStream, flags: PollFlags, timeout_ms: u32, failure: Error) -> Result<bool, Error> {
    let timeout = i32::try_from(timeout_ms).unwrap_or(i32::MAX);
    let mut fds = [PollFd::new(stream, flags)];
    match poll(&mut fds, timeout) {
        Ok(0) => Ok(false),
        Ok(_) => Ok(!fds[0].revents().is_empty()),
        Err(errno) if errno == Errno::INTR => Ok(false),
        Err(_) => Err(failure),
    }
}

impl Stack for StdStack {
    type Socket = TcpStream;
    type Address = SocketAddr;

    fn resolve(&mut self, host: &str, port: u16) -> Result<SocketAddr, Error> {
        (host, port)
            .to_socket_addrs()
            .map_err(|_| Error::ResolutionFailed)?
            .next()
            .ok_or(Error::ResolutionFailed)
    }

    fn connect(&mut self, address: &SocketAddr) -> Result<TcpStream, Error> {
        let stream = match self.connect_timeout {
            Some(timeout) => TcpStream::connect_timeout(address, timeout),
            None => TcpStream::connect(address),
        }
        .map_err(|e| match e.kind() {
            ErrorKind::ConnectionRefused => Error::ConnectionRefused,
            _ => Error::ConnectFailed,
        })?;

        // Dropping `stream` on either error closes the descriptor.
        stream.set_nonblocking(true).map_err(|_| Error::ConnectFailed)?;
        stream.set_nodelay(true).map_err(|_| Error::ConnectFailed)?;
        Ok(stream)
    }

    fn close(&mut self, socket: TcpStream) {
        let _ = socket.shutdown(std::net::Shutdown::Both);
    }

    fn wait_readable(&mut self, socket: &mut TcpStream, timeout_ms: u32) -> Result<bool, Error> {
        wait(socket, PollFlags::IN, timeout_ms, Error::ReadError)
    }

    fn wait_writable(&mut self, socket: &mut TcpStream, timeout_ms: u32) -> Result<bool, Error> {
        wait(socket, PollFlags::OUT, timeout_ms, Error::WriteError)
    }

    fn receive(&mut self, socket: &mut TcpStream, buf: &mut [u8]) -> Result<usize, Error> {
        match socket.read(buf) {
            Ok(0) if !buf.is_empty() => Err(Error::ConnectionClosed),
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => Ok(0),
            Err(e) if e.kind() == ErrorKind::ConnectionReset => Err(Error::ConnectionClosed),
            Err(_) => Err(Error::ReadError),
        }
    }

    fn send(&mut self, socket: &mut TcpStream, buf: &[u8]) -> Result<usize, Error> {
        match socket.write(buf) {
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => Ok(0),
            Err(e) if e.kind() == ErrorKind::BrokenPipe => Err(Error::ConnectionClosed),
            Err(_) => Err(Error::WriteError),
        }
    }

    fn probe(&mut self, socket: &mut TcpStream) -> Result<(), Error> {
        match socket.take_error() {
            Ok(None) => {}
            Ok(Some(_)) => return Err(Error::ConnectionClosed),
            Err(_) => return Err(Error::ReadError),
        }

        // Hang-up and error conditions are always reported, even with no
        // requested events, and polling them consumes nothing.
        let mut fds = [PollFd::new(&*socket, PollFlags::empty())];
        match poll(&mut fds, 0) {
            Ok(0) => Ok(()),
            Ok(_) if fds[0].revents().intersects(PollFlags::HUP | PollFlags::ERR) => {
                Err(Error::ConnectionClosed)
            }
            Ok(_) => Ok(()),
            Err(errno) if errno == Errno::INTR => Ok(()),
            Err(_) => Err(Error::ReadError),
        }
    }
}
