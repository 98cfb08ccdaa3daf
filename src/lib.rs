//! # mqttcloud - keep an embedded device on its MQTT broker
//!
//! A small, `no_std` friendly library that keeps one MQTT client continuously
//! attached to its broker over an unreliable network. It reconnects and
//! resubscribes after any drop, and it provides the deadline-bounded,
//! partial-transfer-tolerant socket I/O the protocol engine needs to behave
//! like blocking code on top of non-blocking sockets.
//!
//! ## Layers
//!
//! - **[`time`]**: millisecond countdown timers over a platform [`Clock`](time::Clock)
//! - **[`network`]**: the transport capability set (connect, timed read, timed
//!   write, disconnect, liveness) and [`Network`](network::Network), its
//!   generic implementation over any socket [`Stack`](network::Stack)
//! - **[`session`]**: the [`Supervisor`](session::Supervisor) state machine
//!   and its configuration
//!
//! The MQTT wire protocol itself is not implemented here. The supervisor
//! drives any engine that implements
//! [`ProtocolClient`](session::ProtocolClient).
//!
//! ## Usage
//!
//! ```rust,no_run
//! # #[cfg(feature = "std")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use mqttcloud::network::{Network, std_stack::StdStack};
//! use mqttcloud::session::{BrokerConfig, SessionConfig, Supervisor};
//! use mqttcloud::time::StdClock;
//! # use mqttcloud::network::{Error, Transport};
//! # use mqttcloud::session::{ConnectOptions, Link, MessageHandler, ProtocolClient, QoS};
//! # struct Engine;
//! # impl<T: Transport> ProtocolClient<T> for Engine {
//! #     fn is_connected(&self) -> bool { false }
//! #     fn connect(&mut self, _: Link<'_, T>, _: &ConnectOptions<'_>) -> Result<(), Error> { Ok(()) }
//! #     fn subscribe(&mut self, _: Link<'_, T>, _: &str, _: QoS, _: MessageHandler) -> Result<(), Error> { Ok(()) }
//! #     fn service_once(&mut self, _: Link<'_, T>, _: u32) -> Result<usize, Error> { Ok(0) }
//! #     fn disconnect(&mut self, _: Link<'_, T>) -> Result<(), Error> { Ok(()) }
//! # }
//!
//! let json = br#"{"host":"broker.example","client_id":"node-1"}"#;
//! let broker = BrokerConfig::from_json(json)?;
//! let options = broker.connect_options();
//! let config = SessionConfig { subscriptions: &[], options: &options };
//!
//! let transport = Network::new(StdStack::new(), StdClock::new());
//! let mut supervisor: Supervisor<'_, _, _> =
//!     Supervisor::new(broker.settings()?, &config, transport, Engine);
//!
//! loop {
//!     let _ = supervisor.poll();
//!     std::thread::sleep(std::time::Duration::from_millis(100));
//! }
//! # }
//! # #[cfg(not(feature = "std"))]
//! # fn main() {}
//! ```
//!
//! ## Optional Features
//!
//! - `std`: BSD-socket stack, `Instant` clock and background polling thread
//! - `defmt`: log through `defmt` on embedded targets
//! - `log`: log through the `log` facade on hosted targets

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

#[macro_use]
mod fmt;

/// Millisecond timers and clocks.
pub mod time;

/// Transport abstraction with deadline-bounded, partial-progress I/O.
///
/// Contains the capability traits, the generic [`Network`](network::Network)
/// transport and, with the `std` feature, a BSD-socket stack.
pub mod network;

/// Session supervision: reconnect, resubscribe and service.
pub mod session;
