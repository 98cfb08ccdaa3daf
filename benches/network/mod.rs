use criterion::{BenchmarkId, Criterion, Throughput};
use mqttcloud::network::{prelude::*, Error, Network, Stack};
use mqttcloud::time::Clock;
use std::hint::black_box;

/// Clock that never moves; every transfer completes on buffer length.
struct FrozenClock;

impl Clock for FrozenClock {
    fn now_ms(&self) -> u64 {
        0
    }
}

/// Always-ready socket that moves at most `segment` bytes per call.
struct SegmentedStack {
    segment: usize,
}

impl Stack for SegmentedStack {
    type Socket = ();
    type Address = ();

    fn resolve(&mut self, _host: &str, _port: u16) -> Result<(), Error> {
        Ok(())
    }

    fn connect(&mut self, _address: &()) -> Result<(), Error> {
        Ok(())
    }

    fn close(&mut self, _socket: ()) {}

    fn wait_readable(&mut self, _socket: &mut (), _timeout_ms: u32) -> Result<bool, Error> {
        Ok(true)
    }

    fn wait_writable(&mut self, _socket: &mut (), _timeout_ms: u32) -> Result<bool, Error> {
        Ok(true)
    }

    fn receive(&mut self, _socket: &mut (), buf: &mut [u8]) -> Result<usize, Error> {
        let n = buf.len().min(self.segment);
        buf[..n].fill(0xa5);
        Ok(n)
    }

    fn send(&mut self, _socket: &mut (), buf: &[u8]) -> Result<usize, Error> {
        Ok(buf.len().min(self.segment))
    }

    fn probe(&mut self, _socket: &mut ()) -> Result<(), Error> {
        Ok(())
    }
}

fn transport(segment: usize) -> Network<SegmentedStack, FrozenClock> {
    let mut net = Network::new(SegmentedStack { segment }, FrozenClock);
    net.connect("bench", 1883).expect("in-memory connect");
    net
}

pub fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("timed_read");
    let mut buf = [0u8; 1024];
    group.throughput(Throughput::Bytes(buf.len() as u64));

    for segment in [16, 128, 1024] {
        let mut net = transport(segment);
        group.bench_with_input(BenchmarkId::from_parameter(segment), &segment, |b, _| {
            b.iter(|| net.read(black_box(&mut buf), 1_000))
        });
    }
    group.finish();
}

pub fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("timed_write");
    let payload = [0x30u8; 1024];
    group.throughput(Throughput::Bytes(payload.len() as u64));

    for segment in [16, 128, 1024] {
        let mut net = transport(segment);
        group.bench_with_input(BenchmarkId::from_parameter(segment), &segment, |b, _| {
            b.iter(|| net.write(black_box(&payload), 1_000))
        });
    }
    group.finish();
}
