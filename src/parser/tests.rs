//! Tests for parser module

use super::*;
use crate::store::{Database, Record, RecordKey};
use serde_json::json;

// ============================================================================
// Test domain
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Media {
    Anime { id: String, title: String },
    Genre { id: String, name: String },
    LibraryEntry {
        id: String,
        status: String,
        genre: Option<String>,
    },
}

impl Record for Media {
    fn key(&self) -> RecordKey {
        match self {
            Media::Anime { id, .. } => RecordKey::new("anime", id),
            Media::Genre { id, .. } => RecordKey::new("genres", id),
            Media::LibraryEntry { id, .. } => RecordKey::new("libraryEntries", id),
        }
    }
}

fn registry() -> TypeRegistry<Media> {
    TypeRegistry::new()
        .with("anime", |resource, _| {
            Some(Media::Anime {
                id: resource.id.clone(),
                title: resource.attribute_str("canonicalTitle")?.to_string(),
            })
        })
        .with("genres", |resource, _| {
            Some(Media::Genre {
                id: resource.id.clone(),
                name: resource.attribute_str("name")?.to_string(),
            })
        })
        .with("libraryEntries", |resource, context| {
            let genre = context
                .resolve_related(resource, "genre")
                .and_then(|record| match record {
                    Media::Genre { name, .. } => Some(name),
                    _ => None,
                });
            Some(Media::LibraryEntry {
                id: resource.id.clone(),
                status: resource.attribute_str("status")?.to_string(),
                genre,
            })
        })
}

fn parser() -> Parser<Media> {
    Parser::new(registry(), Database::new())
}

// ============================================================================
// Resource Tests
// ============================================================================

#[test]
fn test_resource_numeric_id() {
    let resource = Resource::from_value(&json!({"type": "anime", "id": 42})).unwrap();
    assert_eq!(resource.id, "42");
    assert!(resource.attributes.is_empty());
    assert!(resource.relationships.is_empty());
}

#[test]
fn test_resource_rejects_bad_id() {
    assert!(Resource::from_value(&json!({"type": "anime", "id": {"x": 1}})).is_err());
    assert!(Resource::from_value(&json!({"type": "anime"})).is_err());
}

#[test]
fn test_resource_null_attributes() {
    let resource = Resource::from_value(&json!({
        "type": "anime", "id": "1", "attributes": null, "relationships": null
    }))
    .unwrap();
    assert!(resource.attributes.is_empty());
}

#[test]
fn test_resource_accessors() {
    let resource = Resource::from_value(&json!({
        "type": "anime",
        "id": "1",
        "attributes": {
            "canonicalTitle": "Cowboy Bebop",
            "episodeCount": 26,
            "endDate": null,
            "abbreviatedTitles": ["COWBOY BEBOP"]
        },
        "relationships": {
            "streamer": {"data": {"type": "streamers", "id": "3"}},
            "genres": {"data": [
                {"type": "genres", "id": "1"},
                {"type": "genres", "id": "2"}
            ]},
            "castings": {"links": {"related": "https://api.example.com/anime/1/castings"}}
        }
    }))
    .unwrap();

    assert_eq!(resource.attribute_str("canonicalTitle"), Some("Cowboy Bebop"));
    assert_eq!(resource.attribute_as::<u32>("episodeCount"), Some(26));
    assert!(resource.attribute("endDate").is_none());
    assert_eq!(
        resource.attribute_as::<Vec<String>>("abbreviatedTitles"),
        Some(vec!["COWBOY BEBOP".to_string()])
    );

    assert_eq!(
        resource.related("streamer"),
        Some(&ResourceIdentifier::new("streamers", "3"))
    );
    assert!(resource.related("genres").is_none());
    assert_eq!(resource.related_all("genres").len(), 2);
    assert_eq!(resource.related_all("streamer").len(), 1);
    assert!(resource.related_all("castings").is_empty());
    assert!(resource.related_all("missing").is_empty());
    assert_eq!(resource.key(), RecordKey::new("anime", "1"));
}

// ============================================================================
// Registry Tests
// ============================================================================

#[test]
fn test_registry_kinds() {
    let registry = registry();
    assert!(registry.is_registered("anime"));
    assert!(!registry.is_registered("manga"));
    assert_eq!(registry.kinds(), ["anime", "genres", "libraryEntries"]);
}

#[test]
fn test_registry_register_replaces() {
    let mut registry: TypeRegistry<Resource> = TypeRegistry::new();
    registry.register("anime", |_, _| None);
    registry.register("anime", |r, _| Some(r.clone()));

    let parser = Parser::new(registry, Database::new());
    let parsed = parser
        .parse(&json!({"data": {"type": "anime", "id": "1"}}))
        .unwrap();
    assert_eq!(parsed.len(), 1);
}

// ============================================================================
// Document Tests
// ============================================================================

#[test]
fn test_parse_array_in_source_order() {
    let parsed = parser()
        .parse(&json!({"data": [
            {"type": "anime", "id": "2", "attributes": {"canonicalTitle": "B"}},
            {"type": "anime", "id": "1", "attributes": {"canonicalTitle": "A"}}
        ]}))
        .unwrap();

    let ids: Vec<String> = parsed.records.iter().map(|r| r.key().id).collect();
    assert_eq!(ids, ["2", "1"]);
    assert_eq!(parsed.dropped, 0);
}

#[test]
fn test_parse_single_object_data() {
    let parsed = parser()
        .parse(&json!({"data": {"type": "anime", "id": "1", "attributes": {"canonicalTitle": "A"}}}))
        .unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed.primary().len(), 1);
}

#[test]
fn test_parse_unrecognized_documents_are_empty() {
    let parser = parser();
    for doc in [
        json!([1, 2, 3]),
        json!("string"),
        json!(null),
        json!({}),
        json!({"meta": {"count": 0}}),
        json!({"data": null}),
        json!({"data": []}),
    ] {
        let parsed = parser.parse(&doc).unwrap();
        assert!(parsed.is_empty(), "expected empty result for {doc}");
        assert_eq!(parsed.dropped, 0);
    }
}

#[test]
fn test_included_resolved_before_data() {
    let parser = parser();
    let parsed = parser
        .parse(&json!({
            "data": [{
                "type": "libraryEntries",
                "id": "100",
                "attributes": {"status": "current"},
                "relationships": {"genre": {"data": {"type": "genres", "id": "7"}}}
            }],
            "included": [
                {"type": "genres", "id": "7", "attributes": {"name": "Space"}}
            ]
        }))
        .unwrap();

    assert_eq!(parsed.included_count, 1);
    assert_eq!(parsed.included(), [Media::Genre {
        id: "7".to_string(),
        name: "Space".to_string()
    }]);
    assert_eq!(
        parsed.primary(),
        [Media::LibraryEntry {
            id: "100".to_string(),
            status: "current".to_string(),
            genre: Some("Space".to_string()),
        }]
    );
    assert!(parser.database().get_by_id("genres", "7").is_some());
    assert!(parser.database().get_by_id("libraryEntries", "100").is_some());
}

#[test]
fn test_malformed_object_dropped_not_fatal() {
    let parsed = parser()
        .parse(&json!({"data": [
            {"type": "anime", "id": "1", "attributes": {"canonicalTitle": "Good"}},
            {"type": "anime", "id": "2", "attributes": {}}
        ]}))
        .unwrap();

    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed.dropped, 1);
    assert_eq!(parsed.records[0].key().id, "1");
}

#[test]
fn test_objects_without_type_are_dropped() {
    let parsed = parser()
        .parse(&json!({"data": [
            {"id": "1", "attributes": {"canonicalTitle": "No type"}},
            {"type": 5, "id": "2"},
            "not an object",
            {"type": "anime", "attributes": {"canonicalTitle": "No id"}},
            {"type": "anime", "id": "", "attributes": {"canonicalTitle": "Empty id"}},
            {"type": "anime", "id": "3", "attributes": {"canonicalTitle": "Fine"}}
        ]}))
        .unwrap();

    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed.dropped, 5);
}

#[test]
fn test_constructor_with_incomplete_key_dropped_before_commit() {
    let registry = registry().with("anime", |resource, _| {
        Some(Media::Anime {
            id: String::new(),
            title: resource.attribute_str("canonicalTitle")?.to_string(),
        })
    });
    let parser = Parser::new(registry, Database::new());
    let parsed = parser
        .parse(&json!({
            "data": [{"type": "anime", "id": "1", "attributes": {"canonicalTitle": "A"}}],
            "included": [{"type": "genres", "id": "7", "attributes": {"name": "Space"}}]
        }))
        .unwrap();

    assert_eq!(parsed.dropped, 1);
    assert_eq!(parsed.len(), 1);
    assert_eq!(parser.database().len(), 1);
    assert!(parser.database().get_by_id("genres", "7").is_some());
}

#[test]
fn test_unregistered_types_skipped() {
    let parser = parser();
    let parsed = parser
        .parse(&json!({
            "data": [{"type": "anime", "id": "1", "attributes": {"canonicalTitle": "A"}}],
            "included": [{"type": "castings", "id": "9"}]
        }))
        .unwrap();

    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed.skipped, 1);
    assert_eq!(parsed.dropped, 0);
    assert!(parser.database().get_by_id("castings", "9").is_none());
}

#[test]
fn test_parsed_records_committed_to_database() {
    let parser = parser();
    parser
        .parse(&json!({"data": [
            {"type": "genres", "id": "1", "attributes": {"name": "Action"}},
            {"type": "genres", "id": "2", "attributes": {"name": "Drama"}}
        ]}))
        .unwrap();

    assert_eq!(parser.database().all_of_kind("genres").len(), 2);
}

#[test]
fn test_passthrough_registry() {
    let parser = Parser::new(TypeRegistry::passthrough(["anime"]), Database::new());
    let parsed = parser
        .parse(&json!({"data": [
            {"type": "anime", "id": 1, "attributes": {"slug": "cowboy-bebop"}},
            {"type": "manga", "id": 2}
        ]}))
        .unwrap();

    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed.skipped, 1);
    assert_eq!(parsed.records[0].attribute_str("slug"), Some("cowboy-bebop"));
}

#[tokio::test]
async fn test_parse_in_background() {
    let parser = parser();
    let parsed = parser
        .parse_in_background(json!({"data": [
            {"type": "anime", "id": "1", "attributes": {"canonicalTitle": "A"}}
        ]}))
        .await
        .unwrap();

    assert_eq!(parsed.len(), 1);
    assert!(parser.database().get_by_id("anime", "1").is_some());
}
