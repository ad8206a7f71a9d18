use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::HashSet;

use codecs::{BUILTIN_CODECS, DEFAULT_CODEC};
use engine::{run_lanes, LaneConfig, PluginManager};
use loader::{Discover, StaticLoader};

const TCP_FRAME: &[u8] = &[
    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0x08, 0x00, // eth
    0x45, 0x00, 0x00, 0x28, 0x00, 0x01, 0x40, 0x00, 0x40, 0x06, 0x00, 0x00, 0x0a, 0x00, 0x00,
    0x01, 0x0a, 0x00, 0x00, 0x02, // ipv4
    0x30, 0x39, 0x00, 0x50, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x50, 0x02, 0x20,
    0x00, 0x00, 0x00, 0x00, 0x00, // tcp
];

fn manager() -> PluginManager {
    let mut builtins = StaticLoader::new(vec![BUILTIN_CODECS]);
    let mut manager = PluginManager::new(DEFAULT_CODEC);
    manager
        .load(&mut [&mut builtins as &mut dyn Discover], &HashSet::new())
        .expect("load builtins");
    manager.instantiate().expect("instantiate builtins");
    manager
}

fn bench_lookup(c: &mut Criterion) {
    let manager = manager();
    let codecs = manager.codecs();
    c.bench_function("lookup_protocol_id", |b| {
        b.iter(|| {
            for id in [0x0800u16, 0x86dd, 6, 17, 1, 0x9999] {
                black_box(codecs.lookup(black_box(id)));
            }
        })
    });
    c.bench_function("lookup_by_name", |b| {
        b.iter(|| black_box(codecs.lookup_by_name(black_box("ipv4_options"))))
    });
}

fn bench_decode(c: &mut Criterion) {
    let manager = manager();
    let codecs = manager.codecs();
    let mut thread = codecs.thread_init(1, 40).expect("thread init");
    c.bench_function("decode_eth_ipv4_tcp", |b| {
        b.iter(|| black_box(thread.decode(black_box(TCP_FRAME))))
    });
    codecs.thread_term(thread);

    let frames: Vec<&[u8]> = std::iter::repeat(TCP_FRAME).take(1024).collect();
    let config = LaneConfig {
        lanes: 4,
        link_type: 1,
        num_layers: 40,
    };
    c.bench_function("run_lanes_1024_frames", |b| {
        b.iter(|| run_lanes(&manager, &config, black_box(&frames[..])).expect("run lanes"))
    });
}

criterion_group!(benches, bench_lookup, bench_decode);
criterion_main!(benches);
