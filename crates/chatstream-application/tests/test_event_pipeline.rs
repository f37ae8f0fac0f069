use chatstream_application::EventIngestionService;
use chatstream_application::sync::{SyncHub, SyncMessage};
use chatstream_core::event::{EventType, SchemaVersion};
use chatstream_infrastructure::migration::{
    EventMigrator, MigrationChain, MigrationEdge, build_migration_registry,
};
use chatstream_infrastructure::{FaultPolicy, MigrationSettings};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn envelope_json(event_type: &str, version: &str, payload: Value) -> String {
    json!({
        "schema_version": version,
        "event_id": "evt-100",
        "event_type": event_type,
        "timestamp": "2024-05-01T12:00:00Z",
        "source": "agent",
        "correlation_id": "run-7",
        "payload": payload
    })
    .to_string()
}

#[test]
fn test_settings_file_drives_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("events.toml");
    std::fs::write(
        &path,
        "fault_policy = \"original\"\n\n[current_versions]\nthought = \"1.1\"\n",
    )
    .unwrap();

    let settings = MigrationSettings::load(&path).expect("Should load settings");
    let service = EventIngestionService::from_settings(&settings).expect("Should build service");

    let envelope = service
        .ingest_json(&envelope_json("thought", "1.0", json!({"content": "hi"})))
        .unwrap();

    assert_eq!(envelope.schema_version, "1.1");
    assert_eq!(envelope.payload, json!({"content": "hi", "level": "work"}));
    assert_eq!(envelope.correlation_id.as_deref(), Some("run-7"));
    assert_eq!(service.migrator().fault_policy(), FaultPolicy::Original);
}

#[test]
fn test_custom_graph_registered_before_freezing() {
    // work_plan: 1.0 -> 1.1 -> 2.0 plus a shortcut 1.0 -> 2.0
    let mut registry = build_migration_registry();
    registry.register_batch(
        EventType::WorkPlan,
        vec![
            MigrationEdge::new("1.0", "1.1", |mut v: Value| {
                v["via"] = json!("chain");
                Ok(v)
            }),
            MigrationEdge::new("1.1", "2.0", Ok),
            MigrationEdge::new("1.0", "2.0", |mut v: Value| {
                v["via"] = json!("shortcut");
                Ok(v)
            }),
        ],
    );
    registry.set_current_version(EventType::WorkPlan, "2.0");

    let path = registry
        .available_path(
            EventType::WorkPlan,
            &SchemaVersion::new("1.0"),
            &SchemaVersion::new("2.0"),
        )
        .unwrap();
    assert_eq!(path.len(), 2);

    let service = EventIngestionService::new(EventMigrator::new(Arc::new(registry)));
    let envelope = service
        .ingest_json(&envelope_json("work_plan", "1.0", json!({"steps": []})))
        .unwrap();

    assert_eq!(envelope.schema_version, "2.0");
    assert_eq!(envelope.payload["via"], "shortcut");
}

#[test]
fn test_unknown_event_types_pass_through() {
    let service = EventIngestionService::from_settings(&MigrationSettings::default()).unwrap();
    let payload = json!({"whatever": true});

    let envelope = service
        .ingest_json(&envelope_json("future_event", "7.0", payload.clone()))
        .unwrap();

    assert_eq!(envelope.event_type, "future_event");
    assert_eq!(envelope.schema_version, "7.0");
    assert_eq!(envelope.payload, payload);
    assert!(
        !service
            .migrator()
            .can_migrate("future_event", "7.0", Some("8.0"))
    );
}

#[tokio::test]
async fn test_sse_stream_is_migrated_and_shared_across_tabs() {
    let hub = SyncHub::new("agent-chat");
    let streaming_tab = hub.open_tab();
    let passive_tab = hub.open_tab();

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    passive_tab.subscribe(move |message| {
        if let SyncMessage::AgentEvent { envelope } = message {
            let _ = tx.send(envelope.clone());
        }
    });
    let listener = passive_tab.clone();
    let listen_handle = tokio::spawn(async move { listener.listen().await });

    let service = EventIngestionService::from_settings(&MigrationSettings::default())
        .unwrap()
        .with_relay(streaming_tab.clone());

    let stream = format!(
        ": connected\n\nevent: thought\ndata: {}\n\n",
        envelope_json("thought", "1.0", json!({"content": "hi"}))
    );

    let mut ingested = Vec::new();
    for frame in stream.split("\n\n") {
        if let Some(envelope) = service.ingest_sse_frame(frame).unwrap() {
            ingested.push(envelope);
        }
    }
    assert_eq!(ingested.len(), 1);

    let relayed = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("event should reach the passive tab")
        .expect("channel open");

    assert_eq!(relayed, ingested[0]);
    assert_eq!(
        relayed.payload,
        json!({
            "content": "hi",
            "level": "work",
            "thinking_chain": [],
            "metadata": {"migrated_from": "1.1"}
        })
    );
    assert_eq!(relayed.kind(), Some(EventType::Thought));

    passive_tab.close();
    listen_handle.await.unwrap().unwrap();
}
