//! Concurrent readers against a republished snapshot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use roster_model::Table;
use roster_search::{SearchOptions, SearchSnapshot, SnapshotStore};

/// Every row of generation `g` carries `g` in its name column.
fn generation(g: usize, rows: usize) -> SearchSnapshot {
    let data: Vec<[String; 2]> = (0..rows)
        .map(|r| [format!("{}", 1000 + r), format!("gen{g} row{r}")])
        .collect();
    let table = Table::from_text_rows(["id", "name"], data);
    SearchSnapshot::build(table, SearchOptions::default()).expect("build snapshot")
}

#[test]
fn readers_never_observe_a_mixed_snapshot() {
    let store = SnapshotStore::new();
    store.publish(generation(0, 50));
    let done = AtomicBool::new(false);

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                while !done.load(Ordering::Acquire) {
                    let snap = store.current().expect("snapshot loaded");
                    let first = snap.search_by_id("1000");
                    let marker = first[0].field("name").expect("name field");
                    let generation_tag = marker.split(' ').next().expect("tag");
                    for result in snap.search_by_id("10") {
                        let name = result.field("name").expect("name field");
                        assert!(name.starts_with(generation_tag), "{name} vs {generation_tag}");
                    }
                    assert_eq!(snap.total_records(), snap.table().len());
                }
            });
        }

        for g in 1..20 {
            store.publish(generation(g, 50 + g));
        }
        done.store(true, Ordering::Release);
    });

    assert_eq!(store.current().expect("snapshot").total_records(), 69);
}

#[test]
fn cancelled_load_leaves_store_unchanged() {
    let store = SnapshotStore::new();
    store.publish(generation(0, 3));

    let cancel = AtomicBool::new(true);
    let table = Table::from_text_rows(["id", "name"], [["1", "a"], ["2", "b"]]);
    let result = store.load_with(|| {
        SearchSnapshot::build_cancellable(table, SearchOptions::default(), &cancel)
    });
    assert!(result.is_err());
    assert_eq!(store.current().expect("snapshot").total_records(), 3);
}
