use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use frammenti::cache::memory::MemoryCache;
use frammenti::counter::growth::GrowthWorker;
use frammenti::counter::Counters;
use frammenti::queue::memory::MemoryScheduler;
use frammenti::store::memory::MemoryStore;

const NUM_TASKS: usize = 8;
const ITERATIONS_PER_TASK: usize = 500;

fn bench_sharded_increments(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("counter_increment");

    for shards in [1u32, 4, 16] {
        group.bench_function(
            BenchmarkId::new(
                "increment",
                format!("{shards}shards x {NUM_TASKS}tasks x {ITERATIONS_PER_TASK}iter"),
            ),
            |b| {
                b.iter(|| {
                    rt.block_on(async {
                        let store = Arc::new(MemoryStore::new());
                        let cache = Arc::new(MemoryCache::new());
                        let worker = Arc::new(GrowthWorker::new(store.clone(), cache.clone()));
                        let scheduler = Arc::new(MemoryScheduler::new(worker));
                        let counters = Counters::new(store, cache, scheduler);

                        let counter = counters.get_or_create("bench", shards).await.unwrap();
                        let mut handles = Vec::with_capacity(NUM_TASKS);
                        for _ in 0..NUM_TASKS {
                            let counter = counter.clone();
                            handles.push(tokio::spawn(async move {
                                for _ in 0..ITERATIONS_PER_TASK {
                                    counter.increment().await;
                                }
                            }));
                        }
                        for handle in handles {
                            handle.await.unwrap();
                        }

                        black_box(counter.count().await.unwrap())
                    })
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_sharded_increments);
criterion_main!(benches);
