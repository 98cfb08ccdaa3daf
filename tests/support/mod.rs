#![allow(dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use mqttcloud::network::{Connect, Disconnect, Error, Read, Stack, Transport, Write};
use mqttcloud::session::{ConnectOptions, Link, Message, MessageHandler, ProtocolClient, QoS};
use mqttcloud::time::Clock;

// ---------------------------------------------------------------------------
// Scripted socket stack with a manual clock
// ---------------------------------------------------------------------------

/// Millisecond clock advanced only by the scripted stack's waits.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(pub Rc<Cell<u64>>);

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

#[derive(Debug, Clone)]
pub enum Arrival {
    Bytes(Vec<u8>),
    Fail(Error),
}

#[derive(Debug, Clone)]
pub enum Outlet {
    Accept(usize),
    Fail(Error),
}

/// A socket stack whose traffic is scripted against time.
///
/// Inbound data and outbound send capacity become available at fixed
/// instants; waiting on the socket advances the shared clock either to the
/// next event or by the full timeout, whichever comes first.
#[derive(Debug, Default)]
pub struct ScriptedStack {
    pub now: Rc<Cell<u64>>,
    pub resolve_error: Option<Error>,
    pub connect_error: Option<Error>,
    pub probe_error: Option<Error>,
    pub inbound: VecDeque<(u64, Arrival)>,
    pub outbound: VecDeque<(u64, Outlet)>,
    pub sent: Vec<u8>,
    pub opened: usize,
    pub closed: usize,
    next_socket: u32,
}

impl ScriptedStack {
    pub fn new() -> (Self, ManualClock) {
        let stack = Self::default();
        let clock = ManualClock(stack.now.clone());
        (stack, clock)
    }

    pub fn arrive(&mut self, at: u64, bytes: &[u8]) {
        self.inbound.push_back((at, Arrival::Bytes(bytes.to_vec())));
    }

    pub fn arrive_error(&mut self, at: u64, error: Error) {
        self.inbound.push_back((at, Arrival::Fail(error)));
    }

    pub fn accept(&mut self, at: u64, bytes: usize) {
        self.outbound.push_back((at, Outlet::Accept(bytes)));
    }

    pub fn accept_error(&mut self, at: u64, error: Error) {
        self.outbound.push_back((at, Outlet::Fail(error)));
    }

    fn advance(&self, timeout_ms: u32, next_event: Option<u64>) -> bool {
        let now = self.now.get();
        let deadline = now + u64::from(timeout_ms);
        match next_event {
            Some(at) if at <= now => true,
            Some(at) if at <= deadline => {
                self.now.set(at);
                true
            }
            _ => {
                self.now.set(deadline);
                false
            }
        }
    }
}

impl Stack for ScriptedStack {
    type Socket = u32;
    type Address = (String, u16);

    fn resolve(&mut self, host: &str, port: u16) -> Result<Self::Address, Error> {
        match self.resolve_error {
            Some(e) => Err(e),
            None => Ok((host.to_string(), port)),
        }
    }

    fn connect(&mut self, _address: &Self::Address) -> Result<u32, Error> {
        if let Some(e) = self.connect_error {
            return Err(e);
        }
        self.opened += 1;
        self.next_socket += 1;
        Ok(self.next_socket)
    }

    fn close(&mut self, _socket: u32) {
        self.closed += 1;
    }

    fn wait_readable(&mut self, _socket: &mut u32, timeout_ms: u32) -> Result<bool, Error> {
        let next = self.inbound.front().map(|(at, _)| *at);
        Ok(self.advance(timeout_ms, next))
    }

    fn wait_writable(&mut self, _socket: &mut u32, timeout_ms: u32) -> Result<bool, Error> {
        let next = self.outbound.front().map(|(at, _)| *at);
        Ok(self.advance(timeout_ms, next))
    }

    fn receive(&mut self, _socket: &mut u32, buf: &mut [u8]) -> Result<usize, Error> {
        let now = self.now.get();
        let Some((at, arrival)) = self.inbound.front_mut() else {
            return Ok(0);
        };
        if *at > now {
            return Ok(0);
        }
        match arrival {
            Arrival::Fail(e) => {
                let e = *e;
                self.inbound.pop_front();
                Err(e)
            }
            Arrival::Bytes(bytes) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                bytes.drain(..n);
                if bytes.is_empty() {
                    self.inbound.pop_front();
                }
                Ok(n)
            }
        }
    }

    fn send(&mut self, _socket: &mut u32, buf: &[u8]) -> Result<usize, Error> {
        let now = self.now.get();
        let Some((at, outlet)) = self.outbound.front_mut() else {
            return Ok(0);
        };
        if *at > now {
            return Ok(0);
        }
        match outlet {
            Outlet::Fail(e) => {
                let e = *e;
                self.outbound.pop_front();
                Err(e)
            }
            Outlet::Accept(capacity) => {
                let n = (*capacity).min(buf.len());
                self.sent.extend_from_slice(&buf[..n]);
                *capacity -= n;
                if *capacity == 0 {
                    self.outbound.pop_front();
                }
                Ok(n)
            }
        }
    }

    fn probe(&mut self, _socket: &mut u32) -> Result<(), Error> {
        match self.probe_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Mock transport and protocol client sharing one journal
// ---------------------------------------------------------------------------

/// Shared state of the mock transport and mock protocol client.
#[derive(Debug)]
pub struct World {
    pub events: Vec<String>,
    pub transport_up: bool,
    pub transport_connect_error: Option<Error>,
    pub protocol_up: bool,
    pub protocol_connect_error: Option<Error>,
    pub failing_topic: Option<&'static str>,
    pub service_result: Result<usize, Error>,
    pub buffer_sizes: (usize, usize),
}

impl Default for World {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            transport_up: false,
            transport_connect_error: None,
            protocol_up: false,
            protocol_connect_error: None,
            failing_topic: None,
            service_result: Ok(0),
            buffer_sizes: (0, 0),
        }
    }
}

pub type Shared = Arc<Mutex<World>>;

pub fn world() -> Shared {
    Arc::new(Mutex::new(World::default()))
}

pub fn events(world: &Shared) -> Vec<String> {
    world.lock().unwrap().events.clone()
}

pub fn take_events(world: &Shared) -> Vec<String> {
    std::mem::take(&mut world.lock().unwrap().events)
}

#[derive(Debug, Clone)]
pub struct MockTransport(pub Shared);

impl Connect for MockTransport {
    fn connect(&mut self, host: &str, port: u16) -> Result<(), Error> {
        let mut world = self.0.lock().unwrap();
        world.events.push(format!("transport.connect {host}:{port}"));
        if let Some(e) = world.transport_connect_error {
            world.transport_up = false;
            return Err(e);
        }
        world.transport_up = true;
        Ok(())
    }
}

impl Read for MockTransport {
    fn read(&mut self, _buf: &mut [u8], _timeout_ms: u32) -> Result<usize, Error> {
        Ok(0)
    }
}

impl Write for MockTransport {
    fn write(&mut self, buf: &[u8], _timeout_ms: u32) -> Result<usize, Error> {
        Ok(buf.len())
    }
}

impl Disconnect for MockTransport {
    fn disconnect(&mut self) {
        let mut world = self.0.lock().unwrap();
        world.events.push("transport.disconnect".to_string());
        world.transport_up = false;
    }

    fn is_connected(&mut self) -> bool {
        self.0.lock().unwrap().transport_up
    }
}

impl Transport for MockTransport {}

#[derive(Debug, Clone)]
pub struct MockClient(pub Shared);

impl<T: Transport> ProtocolClient<T> for MockClient {
    fn is_connected(&self) -> bool {
        self.0.lock().unwrap().protocol_up
    }

    fn connect(&mut self, link: Link<'_, T>, options: &ConnectOptions<'_>) -> Result<(), Error> {
        let mut world = self.0.lock().unwrap();
        world.events.push(format!("client.connect {}", options.client_id));
        world.buffer_sizes = (link.send_buf.len(), link.read_buf.len());
        if !world.transport_up {
            return Err(Error::NotOpen);
        }
        if let Some(e) = world.protocol_connect_error {
            return Err(e);
        }
        world.protocol_up = true;
        Ok(())
    }

    fn subscribe(
        &mut self,
        _link: Link<'_, T>,
        topic_filter: &str,
        qos: QoS,
        _handler: MessageHandler,
    ) -> Result<(), Error> {
        let mut world = self.0.lock().unwrap();
        world
            .events
            .push(format!("subscribe {topic_filter} qos{}", qos as u8));
        if world.failing_topic == Some(topic_filter) {
            return Err(Error::ProtocolError);
        }
        Ok(())
    }

    fn service_once(&mut self, _link: Link<'_, T>, timeout_ms: u32) -> Result<usize, Error> {
        let mut world = self.0.lock().unwrap();
        world.events.push(format!("service {timeout_ms}"));
        let result = world.service_result;
        if result.is_err() {
            world.protocol_up = false;
        }
        result
    }

    fn disconnect(&mut self, _link: Link<'_, T>) -> Result<(), Error> {
        let mut world = self.0.lock().unwrap();
        world.events.push("client.disconnect".to_string());
        world.protocol_up = false;
        Ok(())
    }
}

pub fn ignore(_message: &Message<'_>) {}
