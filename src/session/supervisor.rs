//! Reconnect/resubscribe supervision of a single MQTT session.

use crate::network::Transport;

use super::client::{Link, ProtocolClient};
use super::config::{SessionConfig, Settings};
use super::error::{ConfigError, Error};

/// Default size of the outgoing packet buffer.
pub const DEFAULT_SEND_BUF_SIZE: usize = 128;
/// Default size of the incoming packet buffer.
pub const DEFAULT_READ_BUF_SIZE: usize = 128;

/// Session state as seen from the two liveness flags.
///
/// Nothing is stored: the state is recomputed from the transport probe and
/// the protocol client's own flag whenever it is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Neither the transport nor the protocol session is up.
    Down,
    /// Exactly one of the two layers is up. The next poll tears it down.
    Degraded,
    /// Both layers are up and traffic is being serviced.
    Up,
}

#[cfg(feature = "defmt")]
impl defmt::Format for State {
    fn format(&self, f: defmt::Formatter) {
        match self {
            State::Down => defmt::write!(f, "Down"),
            State::Degraded => defmt::write!(f, "Degraded"),
            State::Up => defmt::write!(f, "Up"),
        }
    }
}

struct Buffers<const TX: usize, const RX: usize> {
    send: [u8; TX],
    read: [u8; RX],
}

impl<const TX: usize, const RX: usize> Buffers<TX, RX> {
    fn link<'l, T>(&'l mut self, transport: &'l mut T) -> Link<'l, T> {
        Link::new(transport, &mut self.send, &mut self.read)
    }
}

/// Keeps one protocol client attached to its broker.
///
/// The supervisor owns the transport, the protocol client and the packet
/// buffers for its whole life. An external driver calls [`poll`](Self::poll)
/// at whatever cadence it likes; each call performs at most one
/// connect-and-subscribe attempt and then hands the session to the protocol
/// client for one bounded service call.
///
/// # Examples
///
/// ```rust,no_run
/// # use mqttcloud::network::{prelude::*, Error};
/// # use mqttcloud::session::{Link, MessageHandler};
/// # struct Tcp;
/// # impl Connect for Tcp { fn connect(&mut self, _: &str, _: u16) -> Result<(), Error> { Ok(()) } }
/// # impl Read for Tcp { fn read(&mut self, _: &mut [u8], _: u32) -> Result<usize, Error> { Ok(0) } }
/// # impl Write for Tcp { fn write(&mut self, b: &[u8], _: u32) -> Result<usize, Error> { Ok(b.len()) } }
/// # impl Disconnect for Tcp { fn disconnect(&mut self) {} fn is_connected(&mut self) -> bool { true } }
/// # impl Transport for Tcp {}
/// # struct Mqtt;
/// # impl ProtocolClient<Tcp> for Mqtt {
/// #     fn is_connected(&self) -> bool { true }
/// #     fn connect(&mut self, _: Link<'_, Tcp>, _: &ConnectOptions<'_>) -> Result<(), Error> { Ok(()) }
/// #     fn subscribe(&mut self, _: Link<'_, Tcp>, _: &str, _: QoS, _: MessageHandler) -> Result<(), Error> { Ok(()) }
/// #     fn service_once(&mut self, _: Link<'_, Tcp>, _: u32) -> Result<usize, Error> { Ok(0) }
/// #     fn disconnect(&mut self, _: Link<'_, Tcp>) -> Result<(), Error> { Ok(()) }
/// # }
/// use mqttcloud::session::{
///     ConnectOptions, Message, ProtocolClient, QoS, SessionConfig, Subscription, Supervisor,
/// };
///
/// fn on_sensor(message: &Message<'_>) {
///     let _ = message.payload;
/// }
///
/// static OPTIONS: ConnectOptions<'static> = ConnectOptions::new("node-1");
/// static TOPICS: [Subscription<'static>; 1] = [Subscription {
///     topic_filter: "sensors/#",
///     qos: QoS::AtMostOnce,
///     handler: on_sensor,
/// }];
/// static CONFIG: SessionConfig<'static> = SessionConfig {
///     subscriptions: &TOPICS,
///     options: &OPTIONS,
/// };
///
/// let mut supervisor: Supervisor<'_, _, _> =
///     Supervisor::init("broker.example", 1883, 1_000, &CONFIG, Tcp, Mqtt)?;
/// loop {
///     if let Err(_e) = supervisor.poll() {
///         // the next poll retries
///     }
/// }
/// # Ok::<(), mqttcloud::session::ConfigError>(())
/// ```
pub struct Supervisor<
    'a,
    T: Transport,
    P: ProtocolClient<T>,
    const TX: usize = DEFAULT_SEND_BUF_SIZE,
    const RX: usize = DEFAULT_READ_BUF_SIZE,
> {
    settings: Settings,
    config: &'a SessionConfig<'a>,
    transport: T,
    client: P,
    buffers: Buffers<TX, RX>,
    service_enabled: bool,
    failures: u32,
    skip_remaining: u32,
}

impl<'a, T, P, const TX: usize, const RX: usize> Supervisor<'a, T, P, TX, RX>
where
    T: Transport,
    P: ProtocolClient<T>,
{
    /// Wires a transport and a protocol client together. Does not connect.
    pub fn new(settings: Settings, config: &'a SessionConfig<'a>, transport: T, client: P) -> Self {
        info!(
            "session: broker {}:{}, {} subscription(s)",
            settings.host(),
            settings.port(),
            config.subscriptions.len()
        );
        Self {
            settings,
            config,
            transport,
            client,
            buffers: Buffers {
                send: [0; TX],
                read: [0; RX],
            },
            service_enabled: true,
            failures: 0,
            skip_remaining: 0,
        }
    }

    /// Validates the broker endpoint and wires the session together.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `host` is empty or longer than
    /// [`MAX_HOST_LEN`](super::MAX_HOST_LEN).
    pub fn init(
        host: &str,
        port: u16,
        command_timeout_ms: u32,
        config: &'a SessionConfig<'a>,
        transport: T,
        client: P,
    ) -> Result<Self, ConfigError> {
        let settings = Settings::new(host, port, command_timeout_ms).map_err(|e| {
            error!("session: rejected broker settings: {:?}", e);
            e
        })?;
        Ok(Self::new(settings, config, transport, client))
    }

    /// Chooses whether `poll` services traffic once the session is up.
    ///
    /// Disable this when the protocol client is serviced by a task of its
    /// own; `poll` then only maintains the connection.
    pub fn set_service_enabled(&mut self, enabled: bool) {
        self.service_enabled = enabled;
    }

    /// Runs one supervision cycle.
    ///
    /// 1. If the protocol session is down, connect the transport (if needed),
    ///    connect the protocol and subscribe to every configured filter in
    ///    order. Any failure tears down what was built and ends the cycle.
    /// 2. If the transport has dropped beneath a live protocol session, close
    ///    the protocol session so both layers agree, and end the cycle.
    /// 3. Otherwise let the protocol client service traffic for up to the
    ///    command timeout and return how many packets it handled.
    ///
    /// # Errors
    ///
    /// Every error is recoverable; the next call starts from whatever state
    /// this one left behind. See [`Error`] for the cases.
    pub fn poll(&mut self) -> Result<usize, Error> {
        if !self.client.is_connected() {
            if self.skip_remaining > 0 {
                self.skip_remaining -= 1;
                debug!("session: backing off, {} cycle(s) left", self.skip_remaining);
                return Err(Error::BackingOff);
            }

            info!("session: disconnected, reconnecting");
            match self.establish() {
                Ok(()) => {
                    self.failures = 0;
                    info!("session: connected");
                }
                Err(e) => {
                    self.failures = self.failures.saturating_add(1);
                    self.skip_remaining = self.settings.retry().cycles_to_skip(self.failures);
                    return Err(e);
                }
            }
        }

        if !self.transport.is_connected() && self.client.is_connected() {
            warn!("session: transport dropped beneath the session");
            let _ = self
                .client
                .disconnect(self.buffers.link(&mut self.transport));
            return Err(Error::LinkLost);
        }

        if !self.service_enabled {
            return Ok(0);
        }

        let timeout_ms = self.settings.command_timeout_ms();
        match self
            .client
            .service_once(self.buffers.link(&mut self.transport), timeout_ms)
        {
            Ok(handled) => Ok(handled),
            Err(e) => {
                warn!("session: service failed: {:?}", e);
                if self.client.is_connected() {
                    let _ = self
                        .client
                        .disconnect(self.buffers.link(&mut self.transport));
                }
                self.transport.disconnect();
                Err(Error::Service(e))
            }
        }
    }

    fn establish(&mut self) -> Result<(), Error> {
        if let Err(e) = self.connect() {
            warn!("session: connect failed: {:?}", e);
            if self.transport.is_connected() {
                self.transport.disconnect();
            }
            return Err(Error::Connect(e));
        }
        self.subscribe_all()
    }

    fn connect(&mut self) -> Result<(), crate::network::Error> {
        if !self.transport.is_connected() {
            let (host, port) = (self.settings.host(), self.settings.port());
            debug!("session: opening transport to {}:{}", host, port);
            self.transport.connect(host, port)?;
        }
        self.client
            .connect(self.buffers.link(&mut self.transport), self.config.options)
    }

    fn subscribe_all(&mut self) -> Result<(), Error> {
        let config = self.config;
        for (index, subscription) in config.subscriptions.iter().enumerate() {
            info!("session: subscribing to \"{}\"", subscription.topic_filter);
            let result = self.client.subscribe(
                self.buffers.link(&mut self.transport),
                subscription.topic_filter,
                subscription.qos,
                subscription.handler,
            );
            if let Err(error) = result {
                error!(
                    "session: subscribe to \"{}\" failed: {:?}",
                    subscription.topic_filter, error
                );
                let _ = self
                    .client
                    .disconnect(self.buffers.link(&mut self.transport));
                return Err(Error::Subscribe { index, error });
            }
        }
        Ok(())
    }

    /// Current state derived from both liveness flags.
    pub fn state(&mut self) -> State {
        match (self.transport.is_connected(), self.client.is_connected()) {
            (true, true) => State::Up,
            (false, false) => State::Down,
            _ => State::Degraded,
        }
    }

    /// Consecutive failed connect cycles since the last success.
    pub fn consecutive_failures(&self) -> u32 {
        self.failures
    }

    /// Validated endpoint settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The session description this supervisor restores.
    pub fn config(&self) -> &'a SessionConfig<'a> {
        self.config
    }

    /// The protocol client.
    pub fn client(&self) -> &P {
        &self.client
    }

    /// The protocol client, mutably. Only use it between polls.
    pub fn client_mut(&mut self) -> &mut P {
        &mut self.client
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[cfg(feature = "std")]
impl<T, P, const TX: usize, const RX: usize> Supervisor<'static, T, P, TX, RX>
where
    T: Transport + Send + 'static,
    P: ProtocolClient<T> + Send + 'static,
{
    /// Moves the supervisor onto a background thread that polls until
    /// `running` is cleared, sleeping `pause` between cycles.
    ///
    /// The thread owns the transport and the protocol client; nothing else
    /// may use them while it runs. Joining the handle gives the supervisor back.
    pub fn spawn(
        mut self,
        pause: std::time::Duration,
        running: std::sync::Arc<core::sync::atomic::AtomicBool>,
    ) -> std::io::Result<std::thread::JoinHandle<Self>> {
        use core::sync::atomic::Ordering;

        std::thread::Builder::new()
            .name("mqttcloud-session".into())
            .spawn(move || {
                while running.load(Ordering::Acquire) {
                    let _ = self.poll();
                    std::thread::sleep(pause);
                }
                self
            })
    }
}

impl<T, P, const TX: usize, const RX: usize> core::fmt::Debug for Supervisor<'_, T, P, TX, RX>
where
    T: Transport,
    P: ProtocolClient<T>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Supervisor")
            .field("settings", &self.settings)
            .field("client_connected", &self.client.is_connected())
            .field("failures", &self.failures)
            .finish()
    }
}
