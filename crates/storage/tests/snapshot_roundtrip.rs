use practice_core::model::Surface;
use storage::{KeySpace, KeyValueStore, MemoryStore, export_snapshot, import_snapshot};

#[test]
fn exported_bundle_restores_onto_an_empty_store() {
    let space = KeySpace::new(Surface::new("daily-practice"));

    let source = MemoryStore::new();
    source
        .set(&space.quota(), "{\"dateKey\":\"2024-01-01\",\"used\":3}")
        .unwrap();
    source
        .set(
            &space.streak(),
            "{\"current\":4,\"lastActiveDateKey\":\"2024-01-01\"}",
        )
        .unwrap();
    source.set(&space.paid_hint(), "false").unwrap();

    let bundle = export_snapshot(&source, &space).unwrap();

    let target = MemoryStore::new();
    import_snapshot(&target, &bundle).unwrap();

    for key in [space.quota(), space.streak(), space.paid_hint()] {
        let original: serde_json::Value =
            serde_json::from_str(&source.get(&key).unwrap().unwrap()).unwrap();
        let restored: serde_json::Value =
            serde_json::from_str(&target.get(&key).unwrap().unwrap()).unwrap();
        assert_eq!(original, restored, "{key}");
    }
}

#[test]
fn import_over_existing_state_prefers_incoming_fields() {
    let space = KeySpace::new(Surface::new("daily-practice"));

    let local = MemoryStore::new();
    local
        .set(
            &space.streak(),
            "{\"current\":2,\"lastActiveDateKey\":\"2024-01-01\"}",
        )
        .unwrap();

    let remote = MemoryStore::new();
    remote.set(&space.streak(), "{\"current\":9}").unwrap();

    let bundle = export_snapshot(&remote, &space).unwrap();
    import_snapshot(&local, &bundle).unwrap();

    let merged: serde_json::Value =
        serde_json::from_str(&local.get(&space.streak()).unwrap().unwrap()).unwrap();
    assert_eq!(merged["current"], 9);
    assert_eq!(merged["lastActiveDateKey"], "2024-01-01");
}
