use credit_statusline::store::ConfigStore;
use models::{ConfigDocument, CreditsCache, CreditsPayload};
use serde_json::{json, Value};

#[test]
fn missing_file_loads_empty_document() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("nope.json"));
    assert_eq!(store.load(), ConfigDocument::default());
    assert!(store.try_load().is_ok());
}

#[test]
fn corrupt_file_loads_empty_document_but_reports_reason() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{\"cookies\": ").unwrap();
    let store = ConfigStore::new(&path);

    assert_eq!(store.load(), ConfigDocument::default());
    let err = store.try_load().unwrap_err();
    assert!(format!("{err:#}").contains("parse config json"));
}

#[test]
fn save_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a").join("b").join("config.json");
    let store = ConfigStore::new(&path);

    let doc = ConfigDocument {
        cookies: Some("session=abc".to_string()),
        ..Default::default()
    };
    assert!(store.save(&doc));
    assert!(path.exists());
    assert_eq!(store.load(), doc);
}

#[test]
fn save_uses_two_space_pretty_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let store = ConfigStore::new(&path);
    let doc = ConfigDocument {
        cookies: Some("c".to_string()),
        ..Default::default()
    };
    assert!(store.save(&doc));
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "{\n  \"cookies\": \"c\"\n}"
    );
}

#[test]
fn save_of_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let original = json!({
        "cookies": "session=abc; theme=dark",
        "creditThreshold": 500,
        "autoResetEnabled": false,
        "credits_cache": {
            "data": {"credits": 321, "plan": "ULTRA", "resetAt": null},
            "timestamp": 1760000000.25
        },
        "customKey": [1, 2, 3]
    });
    std::fs::write(&path, serde_json::to_string(&original).unwrap()).unwrap();
    let store = ConfigStore::new(&path);

    assert!(store.save(&store.load()));

    let reread: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(reread, original);
}

#[test]
fn save_failure_returns_false() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "i am a file").unwrap();
    let store = ConfigStore::new(blocker.join("config.json"));

    assert!(!store.save(&ConfigDocument::default()));
    assert!(store.try_save(&ConfigDocument::default()).is_err());
}

#[test]
fn cache_entry_is_stored_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("config.json"));
    let body = json!({"credits": 77, "plan": "MAX", "unexpected": {"x": 1}});
    let doc = ConfigDocument {
        credits_cache: Some(CreditsCache::new(CreditsPayload::new(body.clone()), 10.0)),
        ..Default::default()
    };
    assert!(store.save(&doc));

    let cache = store.load().credits_cache.unwrap();
    assert_eq!(cache.data.as_value(), &body);
    assert_eq!(cache.timestamp, 10.0);
}

#[test]
fn ill_typed_key_keeps_the_rest_of_the_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"cookies":"session=abc","creditThreshold":"high","credits_cache":{"data":{"credits":9},"timestamp":null},"theme":"dark"}"#,
    )
    .unwrap();
    let store = ConfigStore::new(&path);

    let doc = store.try_load().unwrap();
    assert_eq!(doc.cookie(), Some("session=abc"));
    assert_eq!(doc.credit_threshold, None);
    assert_eq!(doc.credits_cache.as_ref().unwrap().timestamp, 0.0);

    assert!(store.save(&doc));
    let reread: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(reread["cookies"], "session=abc");
    assert_eq!(reread["theme"], "dark");
}

#[test]
fn fractional_threshold_does_not_drop_cookie() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"cookies":"session=abc","creditThreshold":500.5}"#).unwrap();

    let doc = ConfigStore::new(&path).load();
    assert_eq!(doc.cookie(), Some("session=abc"));
    assert_eq!(doc.effective_threshold(), 501);
}

#[test]
fn non_object_json_loads_empty_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "[\"session=abc\"]").unwrap();
    let store = ConfigStore::new(&path);

    assert_eq!(store.load(), ConfigDocument::default());
    assert!(store.try_load().is_err());
}
