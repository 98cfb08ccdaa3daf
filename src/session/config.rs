//! Session configuration.
//!
//! Two kinds of configuration feed a [`Supervisor`](super::Supervisor):
//!
//! - [`Settings`]: where the broker lives and how long each protocol command
//!   may take. Validated once; a bad host is the only error a supervisor can
//!   ever report as fatal.
//! - [`SessionConfig`]: what the session should look like once it is up, i.e.
//!   the connect options and the ordered list of subscriptions. It is borrowed
//!   for the lifetime of the supervisor and never mutated.
//!
//! [`BrokerConfig`] is the JSON form of both, as stored in a provisioning
//! blob on the device.

use heapless::String;
use serde::Deserialize;

use super::client::MessageHandler;
use super::error::ConfigError;

/// Maximum length of a broker host name, in bytes.
pub const MAX_HOST_LEN: usize = 63;

/// Default MQTT port.
pub const DEFAULT_PORT: u16 = 1883;

/// Default budget for a single protocol command, in milliseconds.
pub const DEFAULT_COMMAND_TIMEOUT_MS: u32 = 1_000;

/// Quality of Service levels for MQTT messages.
///
/// # Examples
///
/// ```rust
/// use mqttcloud::session::QoS;
///
/// assert_eq!(QoS::AtMostOnce as u8, 0);
/// assert_eq!(QoS::try_from(2), Ok(QoS::ExactlyOnce));
/// assert!(QoS::try_from(3).is_err());
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum QoS {
    /// **QoS 0**: At most once delivery.
    AtMostOnce = 0,
    /// **QoS 1**: At least once delivery.
    AtLeastOnce = 1,
    /// **QoS 2**: Exactly once delivery.
    ExactlyOnce = 2,
}

impl TryFrom<u8> for QoS {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            _ => Err(ConfigError::InvalidQoS),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for QoS {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "QoS{}", *self as u8)
    }
}

/// Options for the protocol-level connect.
///
/// The supervisor hands these to the protocol client untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions<'a> {
    /// The client identifier, must be unique within the broker.
    pub client_id: &'a str,
    /// Optional user name.
    pub username: Option<&'a str>,
    /// Optional password.
    pub password: Option<&'a str>,
    /// The keep-alive time interval in seconds. Zero disables keep-alive.
    pub keep_alive_seconds: u16,
    /// Whether the broker should discard any previous session state.
    pub clean_session: bool,
}

impl<'a> ConnectOptions<'a> {
    /// Options with a 60 s keep-alive, a clean session and no credentials.
    pub const fn new(client_id: &'a str) -> Self {
        Self {
            client_id,
            username: None,
            password: None,
            keep_alive_seconds: 60,
            clean_session: true,
        }
    }
}

/// One entry of the subscription list.
#[derive(Debug, Clone, Copy)]
pub struct Subscription<'a> {
    /// Topic filter, wildcards allowed.
    pub topic_filter: &'a str,
    /// Maximum QoS requested for the filter.
    pub qos: QoS,
    /// Called for every message delivered on the filter.
    pub handler: MessageHandler,
}

/// Declarative description of the session to keep alive.
///
/// Subscriptions are made in slice order after every (re)connect.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig<'a> {
    /// Subscriptions to restore after each connect.
    pub subscriptions: &'a [Subscription<'a>],
    /// Protocol connect options.
    pub options: &'a ConnectOptions<'a>,
}

/// How fast the supervisor retries after failing to establish a session.
///
/// Retries are counted in poll cycles: the driver's poll cadence is the
/// retry cadence, and a policy only decides how many of those cycles to sit
/// out.
///
/// # Examples
///
/// ```rust
/// use mqttcloud::session::RetryPolicy;
///
/// let policy = RetryPolicy::Exponential { max_skip: 8 };
/// assert_eq!(policy.cycles_to_skip(1), 1);
/// assert_eq!(policy.cycles_to_skip(3), 4);
/// assert_eq!(policy.cycles_to_skip(10), 8);
/// assert_eq!(RetryPolicy::Immediate.cycles_to_skip(10), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    /// Retry on every poll.
    #[default]
    Immediate,
    /// Skip `2^(failures - 1)` polls after consecutive failures, capped at `max_skip`.
    Exponential {
        /// Upper bound on the number of skipped polls.
        max_skip: u32,
    },
}

impl RetryPolicy {
    /// Number of polls to skip after `failures` consecutive failed attempts.
    pub fn cycles_to_skip(&self, failures: u32) -> u32 {
        match *self {
            RetryPolicy::Immediate => 0,
            RetryPolicy::Exponential { .. } if failures == 0 => 0,
            RetryPolicy::Exponential { max_skip } => 1u32
                .checked_shl(failures - 1)
                .unwrap_or(u32::MAX)
                .min(max_skip),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RetryPolicy {
    fn format(&self, f: defmt::Formatter) {
        match self {
            RetryPolicy::Immediate => defmt::write!(f, "Immediate"),
            RetryPolicy::Exponential { max_skip } => {
                defmt::write!(f, "Exponential(max_skip={})", max_skip)
            }
        }
    }
}

/// Validated broker endpoint and timing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    host: String<{ MAX_HOST_LEN + 1 }>,
    port: u16,
    command_timeout_ms: u32,
    retry: RetryPolicy,
}

impl Settings {
    /// Validates and stores the broker endpoint.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::EmptyHost`] - `host` is empty
    /// * [`ConfigError::HostTooLong`] - `host` is longer than [`MAX_HOST_LEN`] bytes
    pub fn new(host: &str, port: u16, command_timeout_ms: u32) -> Result<Self, ConfigError> {
        if host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if host.len() > MAX_HOST_LEN {
            return Err(ConfigError::HostTooLong);
        }
        let host = String::try_from(host).map_err(|_| ConfigError::HostTooLong)?;
        Ok(Self {
            host,
            port,
            command_timeout_ms,
            retry: RetryPolicy::Immediate,
        })
    }

    /// Replaces the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Broker host name or address.
    pub fn host(&self) -> &str {
        self.host.as_str()
    }

    /// Broker port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Budget for each protocol command and for each service call.
    pub fn command_timeout_ms(&self) -> u32 {
        self.command_timeout_ms
    }

    /// Retry policy applied after failed connect cycles.
    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_command_timeout_ms() -> u32 {
    DEFAULT_COMMAND_TIMEOUT_MS
}

fn default_keep_alive_seconds() -> u16 {
    60
}

fn default_clean_session() -> bool {
    true
}

/// Broker provisioning record, deserialized from JSON.
///
/// Strings are borrowed from the input buffer, so the buffer must outlive
/// the record and must not use escape sequences inside strings.
///
/// # Examples
///
/// ```rust
/// use mqttcloud::session::BrokerConfig;
///
/// let json = br#"{"host":"broker.example","client_id":"node-7","retry_max_skip":16}"#;
/// let config = BrokerConfig::from_json(json).unwrap();
///
/// let settings = config.settings().unwrap();
/// assert_eq!(settings.host(), "broker.example");
/// assert_eq!(settings.port(), 1883);
/// assert_eq!(config.connect_options().client_id, "node-7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BrokerConfig<'a> {
    /// Broker host name or address.
    #[serde(borrow)]
    pub host: &'a str,
    /// Broker port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Budget for each protocol command, in milliseconds.
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u32,
    /// MQTT client identifier.
    #[serde(borrow)]
    pub client_id: &'a str,
    /// Optional user name.
    #[serde(borrow, default)]
    pub username: Option<&'a str>,
    /// Optional password.
    #[serde(borrow, default)]
    pub password: Option<&'a str>,
    /// Keep-alive interval in seconds.
    #[serde(default = "default_keep_alive_seconds")]
    pub keep_alive_seconds: u16,
    /// Clean-session flag.
    #[serde(default = "default_clean_session")]
    pub clean_session: bool,
    /// Cap for exponential retry backoff, in poll cycles. Zero retries on every poll.
    #[serde(default)]
    pub retry_max_skip: u32,
}

impl<'a> BrokerConfig<'a> {
    /// Parses a record from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document is malformed or a
    /// required field is missing.
    pub fn from_json(json: &'a [u8]) -> Result<Self, ConfigError> {
        serde_json_core::from_slice(json)
            .map(|(config, _)| config)
            .map_err(|_| {
                warn!("config: cannot parse broker config");
                ConfigError::Parse
            })
    }

    /// Validated endpoint settings.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let retry = match self.retry_max_skip {
            0 => RetryPolicy::Immediate,
            max_skip => RetryPolicy::Exponential { max_skip },
        };
        Ok(Settings::new(self.host, self.port, self.command_timeout_ms)?.with_retry(retry))
    }

    /// Protocol connect options.
    pub fn connect_options(&self) -> ConnectOptions<'a> {
        ConnectOptions {
            client_id: self.client_id,
            username: self.username,
            password: self.password,
            keep_alive_seconds: self.keep_alive_seconds,
            clean_session: self.clean_session,
        }
    }
}
