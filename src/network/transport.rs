use super::error::Error;
use super::stack::Stack;
use super::{Connect, Disconnect, Read, Transport, Write};
use crate::time::{Clock, Timer};

/// A [`Transport`] over any [`Stack`], with millisecond deadlines.
///
/// The socket is `None` until [`connect`](Connect::connect) succeeds and goes
/// back to `None` on [`disconnect`](Disconnect::disconnect) or a failed
/// reconnect, so a closed descriptor is never reused.
///
/// Reads wait once for readability and report `Ok(0)` if nothing shows up in
/// time. Writes keep waiting for writability until the deadline and report
/// [`Error::Timeout`] if the socket never accepts data. Once data is moving,
/// both sides accumulate until the buffer is done, the deadline passes (the
/// partial count is returned) or the stack reports a hard error (the partial
/// count is discarded).
pub struct Network<S: Stack, C: Clock> {
    stack: S,
    clock: C,
    socket: Option<S::Socket>,
}

impl<S: Stack, C: Clock> Network<S, C> {
    /// Creates an unconnected transport.
    pub fn new(stack: S, clock: C) -> Self {
        Self {
            stack,
            clock,
            socket: None,
        }
    }

    /// The underlying stack.
    pub fn stack(&self) -> &S {
        &self.stack
    }

    /// The underlying stack, mutably.
    pub fn stack_mut(&mut self) -> &mut S {
        &mut self.stack
    }

    /// The clock deadlines are measured against.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Whether a socket handle is currently held.
    pub fn has_socket(&self) -> bool {
        self.socket.is_some()
    }
}

impl<S: Stack, C: Clock> Connect for Network<S, C> {
    fn connect(&mut self, host: &str, port: u16) -> Result<(), Error> {
        self.disconnect();

        let address = self.stack.resolve(host, port).map_err(|_e| {
            warn!("network: cannot resolve {}: {:?}", host, _e);
            Error::ResolutionFailed
        })?;

        let socket = self.stack.connect(&address).map_err(|e| {
            warn!("network: connect to {}:{} failed: {:?}", host, port, e);
            match e {
                Error::ConnectionRefused => e,
                _ => Error::ConnectFailed,
            }
        })?;

        debug!("network: connected to {}:{}", host, port);
        self.socket = Some(socket);
        Ok(())
    }
}

impl<S: Stack, C: Clock> Read for Network<S, C> {
    fn read(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, Error> {
        let Self {
            stack,
            clock,
            socket,
        } = self;
        let socket = socket.as_mut().ok_or(Error::NotOpen)?;
        if buf.is_empty() {
            return Ok(0);
        }

        let mut timer = Timer::new(&*clock);
        timer.start(timeout_ms);

        if !stack.wait_readable(socket, timeout_ms)? {
            return Ok(0);
        }

        let mut received = 0;
        loop {
            let n = stack
                .receive(socket, &mut buf[received..])
                .map_err(|e| {
                    trace!("network: receive failed after {} bytes: {:?}", received, e);
                    e
                })?
                .min(buf.len() - received);
            received += n;

            if received == buf.len() || timer.expired() {
                break;
            }
            if n == 0 && !stack.wait_readable(socket, timer.remaining_ms())? {
                break;
            }
        }

        trace!("network: read {}/{} bytes", received, buf.len());
        Ok(received)
    }
}

impl<S: Stack, C: Clock> Write for Network<S, C> {
    fn write(&mut self, buf: &[u8], timeout_ms: u32) -> Result<usize, Error> {
        let Self {
            stack,
            clock,
            socket,
        } = self;
        let socket = socket.as_mut().ok_or(Error::NotOpen)?;
        if buf.is_empty() {
            return Ok(0);
        }

        let mut timer = Timer::new(&*clock);
        timer.start(timeout_ms);

        while !stack.wait_writable(socket, timer.remaining_ms())? {
            if timer.expired() {
                warn!("network: socket not writable within {} ms", timeout_ms);
                return Err(Error::Timeout);
            }
        }

        let mut sent = 0;
        loop {
            let n = stack
                .send(socket, &buf[sent..])
                .map_err(|e| {
                    trace!("network: send failed after {} bytes: {:?}", sent, e);
                    e
                })?
                .min(buf.len() - sent);
            sent += n;

            if sent == buf.len() || timer.expired() {
                break;
            }
            if n == 0 && !stack.wait_writable(socket, timer.remaining_ms())? {
                break;
            }
        }

        trace!("network: wrote {}/{} bytes", sent, buf.len());
        Ok(sent)
    }
}

impl<S: Stack, C: Clock> Disconnect for Network<S, C> {
    fn disconnect(&mut self) {
        if let Some(socket) = self.socket.take() {
            debug!("network: closing socket");
            self.stack.close(socket);
        }
    }

    fn is_connected(&mut self) -> bool {
        match self.socket.as_mut() {
            Some(socket) => self.stack.probe(socket).is_ok(),
            None => false,
        }
    }
}

impl<S: Stack, C: Clock> Transport for Network<S, C> {}

impl<S: Stack, C: Clock> Drop for Network<S, C> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl<S: Stack, C: Clock> core::fmt::Debug for Network<S, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Network")
            .field("connected", &self.socket.is_some())
            .finish()
    }
}
