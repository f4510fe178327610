#[macro_use]
extern crate criterion;

use kvbench::bench::{find, Session};
use kvbench::payload::RandomStream;
use kvbench::sled::SledKvsEngine;
use kvbench::{KvStore, KvsEngine, OpenMode};
use tempfile::TempDir;

use criterion::Criterion;

fn writeseq<E: KvsEngine>(temp_dir: &TempDir, rng: &mut RandomStream) -> u64 {
    let workload = find::<E>("writeseq").unwrap();
    let mut session = Session {
        path: temp_dir.path(),
        mode: OpenMode::Create,
        num_records: 1000,
        rng,
    };
    (workload.run)(&mut session).unwrap()
}

fn writeseq_benchmark(c: &mut Criterion) {
    c.bench_function("KvStore writeseq", |b| {
        let mut rng = RandomStream::seeded(1);
        b.iter_batched_ref(
            || TempDir::new().expect("unable to create temporary working directory"),
            |temp_dir| writeseq::<KvStore>(temp_dir, &mut rng),
            criterion::BatchSize::SmallInput,
        )
    });

    c.bench_function("SledKvsEngine writeseq", |b| {
        let mut rng = RandomStream::seeded(1);
        b.iter_batched_ref(
            || TempDir::new().expect("unable to create temporary working directory"),
            |temp_dir| writeseq::<SledKvsEngine>(temp_dir, &mut rng),
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, writeseq_benchmark);
criterion_main!(benches);
