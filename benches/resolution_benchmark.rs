use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use injector_core::api::*;
use std::sync::Arc;
use std::time::Duration;

struct Settings {
    retries: u32,
}

impl Injectable for Settings {
    fn blueprint() -> Blueprint {
        Blueprint::new(
            vec![ParamSpec::declared::<u32>("retries").with_default(3u32)],
            |args, _ctx| {
                Ok(Instance::new(Settings {
                    retries: args.value::<u32>("retries")?,
                }))
            },
        )
    }
}

struct Client {
    settings: Arc<Settings>,
}

impl Injectable for Client {
    fn blueprint() -> Blueprint {
        Blueprint::new(vec![ParamSpec::of::<Settings>("settings")], |args, _ctx| {
            Ok(Instance::new(Client {
                settings: args.arc::<Settings>("settings")?,
            }))
        })
    }
}

struct Service {
    client: Arc<Client>,
}

impl Injectable for Service {
    fn blueprint() -> Blueprint {
        Blueprint::new(vec![ParamSpec::of::<Client>("client")], |args, _ctx| {
            Ok(Instance::new(Service {
                client: args.arc::<Client>("client")?,
            }))
        })
    }
}

fn benchmark_key_normalization(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_normalization");

    group.bench_function("class_key", |b| {
        b.iter(|| black_box(TypeKey::of::<Service>()));
    });

    group.bench_function("union_canonicalization", |b| {
        b.iter(|| {
            black_box(TypeKey::union(vec![
                TypeKey::of::<Service>(),
                TypeKey::of::<Client>(),
                TypeKey::of::<Settings>(),
            ]))
        });
    });

    group.finish();
}

fn benchmark_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");
    group.measurement_time(Duration::from_secs(10));

    // Cached resolution: everything after the first request hits the
    // singleton cache.
    let injector = Injector::new(Configuration::new());
    injector.get::<Service>().unwrap();
    group.bench_function("resolve_cached_chain", |b| {
        b.iter(|| {
            let service = injector.get::<Service>();
            black_box(service)
        });
    });

    // Cold resolution: a fresh engine per iteration pays rule lookup,
    // introspection and construction for the full chain.
    group.bench_function("resolve_cold_chain", |b| {
        b.iter(|| {
            let injector = Injector::new(Configuration::new());
            let service = injector.get::<Service>();
            black_box(service)
        });
    });

    group.finish();
}

fn benchmark_binding_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("binding_lookup");

    for rule_count in [1usize, 16, 256].iter() {
        let mut config = Configuration::new();
        for i in 0..*rule_count {
            let key = TypeKey::alias(format!("service_{}", i), TypeKey::of::<Settings>());
            config.register::<Settings>();
            let _ = config.bind_key(key).map(|scope| scope.globally());
        }
        config
            .bind::<Settings>()
            .unwrap()
            .globally()
            .with_value("retries", 9u32);

        let injector = Injector::new(config);
        injector.get::<Settings>().unwrap();

        group.bench_with_input(
            BenchmarkId::new("resolve_among_rules", rule_count),
            &injector,
            |b, injector| {
                b.iter(|| {
                    let settings = injector.get::<Settings>();
                    black_box(settings)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_key_normalization,
    benchmark_resolution,
    benchmark_binding_lookup
);
criterion_main!(benches);
