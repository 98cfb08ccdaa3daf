//! MQTT session supervision.
//!
//! A [`Supervisor`] keeps a single protocol client attached to its broker
//! over an unreliable transport. It is driven by repeated calls to
//! [`Supervisor::poll`]; each call looks at two liveness flags and decides
//! whether to connect, resubscribe, resynchronise or service traffic.
//!
//! ```text
//!            poll: connect + subscribe ok
//!   Down  ─────────────────────────────────▶  Up
//!    ▲                                         │
//!    │  connect/subscribe failure              │ transport dropped,
//!    │  (half-built session torn down)         │ service error
//!    └────────────── Degraded ◀────────────────┘
//! ```
//!
//! There is no retry loop inside a poll: the driver's poll cadence is the
//! retry cadence, optionally thinned out by a [`RetryPolicy`].

mod client;
mod config;
mod error;
mod supervisor;

pub use client::{Link, Message, MessageHandler, ProtocolClient};
pub use config::{
    BrokerConfig, ConnectOptions, DEFAULT_COMMAND_TIMEOUT_MS, DEFAULT_PORT, MAX_HOST_LEN,
    QoS, RetryPolicy, SessionConfig, Settings, Subscription,
};
pub use error::{ConfigError, Error};
pub use supervisor::{DEFAULT_READ_BUF_SIZE, DEFAULT_SEND_BUF_SIZE, State, Supervisor};
