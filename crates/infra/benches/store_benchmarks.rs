use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use stockpos_infra::{InMemoryCollection, InventoryStore, InventoryStoreClient};
use stockpos_inventory::{InventoryDraft, total_value};
use tokio::runtime::{Builder, Runtime};

fn runtime() -> Runtime {
    Builder::new_current_thread()
        .build()
        .expect("failed to build runtime")
}

fn seeded(rt: &Runtime, count: usize) -> InventoryStoreClient<InMemoryCollection> {
    let store = InventoryStoreClient::new(InMemoryCollection::default());
    rt.block_on(async {
        for i in 0..count {
            let draft = InventoryDraft::new(format!("Item {i}"), format!("SKU-{i}"), i as i64, 1.25);
            store.create(&draft).await.expect("seed create failed");
        }
    });
    store
}

fn bench_create(c: &mut Criterion) {
    let rt = runtime();
    let store = InventoryStoreClient::new(InMemoryCollection::default());
    let draft = InventoryDraft::new("Widget", "W1", 5, 2.5);

    c.bench_function("create", |b| {
        b.iter(|| rt.block_on(store.create(black_box(&draft))).expect("create failed"));
    });
}

fn bench_list(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("list_ordered_by_updated_at");

    for count in [10usize, 100, 1_000] {
        let store = seeded(&rt, count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| rt.block_on(store.list()).expect("list failed"));
        });
    }

    group.finish();
}

fn bench_edit_cycle(c: &mut Criterion) {
    let rt = runtime();
    let store = seeded(&rt, 100);

    // One screen round trip: update a record, then reload and total the list.
    c.bench_function("update_then_reload_100", |b| {
        b.iter(|| {
            rt.block_on(async {
                let items = store.list().await.expect("list failed");
                let first = &items[0];
                let mut draft = first.draft();
                draft.quantity += 1;
                store.update(&first.id, &draft).await.expect("update failed");
                let items = store.list().await.expect("list failed");
                black_box(total_value(&items))
            })
        });
    });
}

criterion_group!(benches, bench_create, bench_list, bench_edit_cycle);
criterion_main!(benches);
