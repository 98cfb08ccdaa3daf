use criterion::{criterion_group, criterion_main};

mod network;
mod session;

criterion_group!(
    benches,
    network::bench_read,
    network::bench_write,
    session::bench_poll
);
criterion_main!(benches);
