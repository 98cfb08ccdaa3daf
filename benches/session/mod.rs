use criterion::{Criterion, Throughput};
use mqttcloud::network::{prelude::*, Error};
use mqttcloud::session::{
    ConnectOptions, Link, Message, MessageHandler, ProtocolClient, QoS, SessionConfig,
    Subscription, Supervisor,
};
use std::hint::black_box;

struct IdleTransport;

impl Connect for IdleTransport {
    fn connect(&mut self, _host: &str, _port: u16) -> Result<(), Error> {
        Ok(())
    }
}

impl Read for IdleTransport {
    fn read(&mut self, _buf: &mut [u8], _timeout_ms: u32) -> Result<usize, Error> {
        Ok(0)
    }
}

impl Write for IdleTransport {
    fn write(&mut self, buf: &[u8], _timeout_ms: u32) -> Result<usize, Error> {
        Ok(buf.len())
    }
}

impl Disconnect for IdleTransport {
    fn disconnect(&mut self) {}

    fn is_connected(&mut self) -> bool {
        true
    }
}

impl Transport for IdleTransport {}

/// Protocol client that stays connected and reports one packet per service call.
struct EchoClient {
    connected: bool,
}

impl ProtocolClient<IdleTransport> for EchoClient {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn connect(
        &mut self,
        _link: Link<'_, IdleTransport>,
        _options: &ConnectOptions<'_>,
    ) -> Result<(), Error> {
        self.connected = true;
        Ok(())
    }

    fn subscribe(
        &mut self,
        _link: Link<'_, IdleTransport>,
        _topic_filter: &str,
        _qos: QoS,
        _handler: MessageHandler,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn service_once(
        &mut self,
        link: Link<'_, IdleTransport>,
        timeout_ms: u32,
    ) -> Result<usize, Error> {
        link.transport.read(link.read_buf, timeout_ms)?;
        Ok(1)
    }

    fn disconnect(&mut self, _link: Link<'_, IdleTransport>) -> Result<(), Error> {
        self.connected = false;
        Ok(())
    }
}

fn discard(_message: &Message<'_>) {}

static OPTIONS: ConnectOptions<'static> = ConnectOptions::new("bench");
static TOPICS: [Subscription<'static>; 1] = [Subscription {
    topic_filter: "bench/#",
    qos: QoS::AtMostOnce,
    handler: discard,
}];
static CONFIG: SessionConfig<'static> = SessionConfig {
    subscriptions: &TOPICS,
    options: &OPTIONS,
};

pub fn bench_poll(c: &mut Criterion) {
    let mut supervisor: Supervisor<'_, _, _> = Supervisor::init(
        "bench.local",
        1883,
        100,
        &CONFIG,
        IdleTransport,
        EchoClient { connected: false },
    )
    .expect("valid settings");
    supervisor.poll().expect("establish session");

    let mut group = c.benchmark_group("supervisor");
    group.throughput(Throughput::Elements(1));
    group.bench_function("steady_state_poll", |b| {
        b.iter(|| black_box(supervisor.poll()))
    });
    group.finish();
}
