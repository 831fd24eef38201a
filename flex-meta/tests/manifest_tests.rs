use flex_meta::{
    ComponentEntry, ExtensionKind, ExtensionMeta, KeyboardLayoutConfig, MutableExtension,
    SchemaError, ThemeConfig,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn full_manifest() -> Value {
    json!({
        "id": "org.example.layout.qwerty",
        "version": "1.2.0",
        "title": "QWERTY",
        "description": "Classic QWERTY layouts",
        "keywords": ["latin", "qwerty"],
        "homepage": "https://example.com/qwerty",
        "issueTracker": "https://example.com/qwerty/issues",
        "authors": [
            "Jane Doe <jane@example.com> (example.com)",
            "Max Mustermann"
        ],
        "license": "Apache-2.0 OR MIT",
        "dependsOn": ["org.example.layout.base"],
        "config": {
            "layouts": [
                { "id": "qwerty", "label": "QWERTY", "file": "layouts/qwerty.json" }
            ]
        }
    })
}

// ── Parsing ─────────────────────────────────────────────────────
#[test]
fn parse_full_manifest() {
    let text = full_manifest().to_string();
    let meta = ExtensionMeta::<KeyboardLayoutConfig>::parse(&text).unwrap();

    assert_eq!(meta.id(), "org.example.layout.qwerty");
    assert_eq!(meta.description(), Some("Classic QWERTY layouts"));
    assert_eq!(meta.keywords().unwrap(), ["latin".to_string(), "qwerty".to_string()]);
    assert_eq!(meta.homepage(), Some("https://example.com/qwerty"));
    assert_eq!(meta.issue_tracker(), Some("https://example.com/qwerty/issues"));
    assert_eq!(meta.license(), "Apache-2.0 OR MIT");
    assert_eq!(meta.authors()[1].name(), "Max Mustermann");
    assert_eq!(meta.dependencies(), ["org.example.layout.base".to_string()]);
    assert_eq!(
        meta.config().layouts,
        vec![ComponentEntry {
            id: "qwerty".into(),
            label: "QWERTY".into(),
            authors: vec![],
            file: Some("layouts/qwerty.json".into()),
        }]
    );
    assert_eq!(meta.kind(), ExtensionKind::KeyboardLayout);
}

#[test]
fn parse_from_bytes() {
    let bytes = serde_json::to_vec(&full_manifest()).unwrap();
    let meta = ExtensionMeta::<Value>::parse_slice(&bytes).unwrap();
    assert_eq!(meta.version(), "1.2.0");
}

#[test]
fn unknown_fields_are_ignored() {
    let mut manifest = full_manifest();
    manifest["$schema"] = json!("https://example.com/extension.schema.json");
    manifest["maintainers"] = json!(["someone"]);
    assert!(ExtensionMeta::<Value>::parse(&manifest.to_string()).is_ok());
}

// ── Mandatory fields ────────────────────────────────────────────
#[test]
fn each_missing_mandatory_field_is_named() {
    for field in ["id", "version", "title", "license", "authors", "config"] {
        let mut manifest = full_manifest();
        manifest.as_object_mut().unwrap().remove(field);

        let err = ExtensionMeta::<Value>::parse(&manifest.to_string()).unwrap_err();
        match err {
            SchemaError::MissingField(name) => assert_eq!(name, field),
            other => panic!("expected MissingField({field}), got {other:?}"),
        }
    }
}

#[test]
fn empty_authors_is_missing() {
    let mut manifest = full_manifest();
    manifest["authors"] = json!([]);
    let err = ExtensionMeta::<Value>::parse(&manifest.to_string()).unwrap_err();
    assert!(matches!(err, SchemaError::MissingField("authors")));
}

#[test]
fn one_malformed_author_rejects_manifest() {
    let mut manifest = full_manifest();
    manifest["authors"] = json!(["Jane Doe", "Max (max.dev) <max@example.org>"]);
    let err = ExtensionMeta::<Value>::parse(&manifest.to_string()).unwrap_err();
    match err {
        SchemaError::MalformedAuthor(entry) => assert_eq!(entry, "Max (max.dev) <max@example.org>"),
        other => panic!("expected MalformedAuthor, got {other:?}"),
    }
}

#[test]
fn id_escaping_cache_root_is_rejected() {
    for id in ["../../etc", "org/example", "org..example", ""] {
        let mut manifest = full_manifest();
        manifest["id"] = json!(id);
        let err = ExtensionMeta::<Value>::parse(&manifest.to_string()).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidId(_)), "id {id:?} gave {err:?}");
    }
}

// ── Serialization ───────────────────────────────────────────────
#[test]
fn serialize_is_field_for_field_equivalent() {
    let original = full_manifest();
    let meta = ExtensionMeta::<Value>::parse(&original.to_string()).unwrap();
    let reserialized: Value = serde_json::from_str(&meta.to_json_pretty().unwrap()).unwrap();
    assert_eq!(reserialized, original);
}

#[test]
fn serialize_omits_absent_optionals() {
    let meta = ExtensionMeta::<Value>::parse(
        r#"{"id":"a.b","version":"1","title":"T","authors":["A"],"license":"MIT","config":{}}"#,
    )
    .unwrap();
    let value: Value = serde_json::to_value(&meta).unwrap();
    let object = value.as_object().unwrap();
    assert!(!object.contains_key("description"));
    assert!(!object.contains_key("keywords"));
    assert!(!object.contains_key("issueTracker"));
    assert!(!object.contains_key("dependsOn"));
    assert_eq!(object.len(), 6);
}

// ── Builder ─────────────────────────────────────────────────────
#[test]
fn builder_and_parser_agree() {
    let parsed = ExtensionMeta::<ThemeConfig>::parse(
        r#"{
            "id": "org.example.theme.dusk",
            "version": "1.0.0",
            "title": "Dusk",
            "authors": ["Jane Doe <jane@example.com>"],
            "license": "CC-BY-4.0",
            "config": { "themes": [] }
        }"#,
    )
    .unwrap();

    let built = MutableExtension {
        id: "org.example.theme.dusk".into(),
        version: "1.0.0".into(),
        title: "Dusk".into(),
        authors: vec!["Jane Doe <jane@example.com>".into()],
        license: "CC-BY-4.0".into(),
        config: Some(ThemeConfig::default()),
        ..MutableExtension::new()
    }
    .freeze()
    .unwrap();

    assert_eq!(built, parsed);
}
