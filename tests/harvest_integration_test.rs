use httpmock::prelude::*;
use std::time::Duration;
use wikidata_people::core::query::{id_lookup_query, people_ids_query};
use wikidata_people::{Language, PersonQuery, RetryPolicy, SparqlClient, WikidataClient};

fn van_gogh_body() -> serde_json::Value {
    let row = |occupation: &str| {
        serde_json::json!({
            "person": {"type": "uri", "value": "http://www.wikidata.org/entity/Q5582"},
            "personLabel": {"type": "literal", "xml:lang": "en", "value": "Vincent van Gogh"},
            "placeOfBirthLabel": {"type": "literal", "xml:lang": "en", "value": "Zundert"},
            "dateOfBirth": {
                "type": "literal",
                "datatype": "http://www.w3.org/2001/XMLSchema#dateTime",
                "value": "1853-03-30T00:00:00Z"
            },
            "occupationLabel": {"type": "literal", "xml:lang": "en", "value": occupation}
        })
    };
    serde_json::json!({
        "head": {"vars": ["person", "personLabel"]},
        "results": {"bindings": [row("painter"), row("painter"), row("drawer")]}
    })
}

fn empty_body() -> serde_json::Value {
    serde_json::json!({"head": {"vars": []}, "results": {"bindings": []}})
}

fn client_for(server: &MockServer) -> WikidataClient {
    let policy = RetryPolicy::fixed(2, Duration::from_millis(10));
    let sparql = SparqlClient::with_retry(server.url("/sparql"), policy).unwrap();
    WikidataClient::with_client(sparql)
}

#[tokio::test]
async fn test_person_info_folds_first_non_null() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/sparql").query_param("format", "json");
        then.status(200).json_body(van_gogh_body());
    });

    let client = client_for(&server);
    let info = client
        .person_info("Vincent van Gogh", &PersonQuery::all())
        .await
        .unwrap()
        .unwrap();

    mock.assert();
    assert_eq!(info.name.as_deref(), Some("Vincent van Gogh"));
    assert_eq!(info.birth_place.as_deref(), Some("Zundert"));
    assert_eq!(info.occupations, vec!["painter", "drawer"]);
}

#[tokio::test]
async fn test_person_info_strict_resolves_id_and_majority_values() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/sparql");
        then.status(200).json_body(van_gogh_body());
    });

    let client = client_for(&server);
    let info = client
        .person_info_strict("Vincent van Gogh")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(info.id.as_deref(), Some("Q5582"));
    assert_eq!(info.birth_date.as_deref(), Some("1853-03-30T00:00:00Z"));
    // 2-of-3 "painter" clears the cutoff, 1-of-3 "drawer" does not
    assert_eq!(info.occupations, vec!["painter"]);
}

#[tokio::test]
async fn test_person_info_returns_none_for_empty_results() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/sparql");
        then.status(200).json_body(serde_json::json!({
            "head": {"vars": []},
            "results": {"bindings": []}
        }));
    });

    let client = client_for(&server);
    let info = client
        .person_info("No Such Person", &PersonQuery::all())
        .await
        .unwrap();
    assert!(info.is_none());
}

#[tokio::test]
async fn test_people_info_issues_one_request_per_chunk() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/sparql");
        then.status(200).json_body(van_gogh_body());
    });

    let client = client_for(&server).with_chunk_size(2);
    let names = vec![
        "Vincent van Gogh".to_string(),
        "Claude Monet".to_string(),
        "Paul Gauguin".to_string(),
    ];
    let records = client.people_info(&names).await.unwrap();

    // two chunks of [2, 1]; only van Gogh's rows match a queried label
    mock.assert_hits(2);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name.as_deref(), Some("Vincent van Gogh"));
    assert_eq!(records[0].id.as_deref(), Some("Q5582"));
}

#[tokio::test]
async fn test_backfill_recovers_names_the_batch_missed() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/sparql");
        then.status(200).json_body(van_gogh_body());
    });

    let client = client_for(&server);
    let names = vec!["Vincent van Gogh".to_string(), "Claude Monet".to_string()];
    let records = client.people_info_backfill(&names).await.unwrap();

    // one batch request plus one strict per-person query for the miss
    mock.assert_hits(2);
    assert_eq!(records.len(), 2);
    let harvested: Vec<&str> = records.iter().filter_map(|r| r.name.as_deref()).collect();
    assert!(harvested.contains(&"Vincent van Gogh"));
    assert!(harvested.contains(&"Claude Monet"));
}

#[tokio::test]
async fn test_person_info_by_id_folds_profile_with_influences() {
    let server = MockServer::start();
    let row = |influence: &str| {
        serde_json::json!({
            "person": {"type": "uri", "value": "http://www.wikidata.org/entity/Q5582"},
            "personLabel": {"type": "literal", "xml:lang": "en", "value": "Vincent van Gogh"},
            "genderLabel": {"type": "literal", "xml:lang": "en", "value": "male"},
            "influenceLabel": {"type": "literal", "xml:lang": "en", "value": influence}
        })
    };
    let mock = server.mock(|when, then| {
        when.method(GET).path("/sparql");
        then.status(200).json_body(serde_json::json!({
            "head": {"vars": ["person", "personLabel"]},
            "results": {"bindings": [row("Anton Mauve"), row("Jean-François Millet"), row("Anton Mauve")]}
        }));
    });

    let client = client_for(&server);
    let info = client.person_info_by_id("Q5582").await.unwrap().unwrap();

    mock.assert();
    assert_eq!(info.id.as_deref(), Some("Q5582"));
    assert_eq!(info.name.as_deref(), Some("Vincent van Gogh"));
    assert_eq!(info.gender.as_deref(), Some("male"));
    assert_eq!(info.influences, vec!["Anton Mauve", "Jean-François Millet"]);
    assert!(info.exhibitions.is_empty());
}

#[tokio::test]
async fn test_exhibitions_by_id_deduplicates_venues() {
    let server = MockServer::start();
    let row = |venue: &str| {
        serde_json::json!({
            "person": {"type": "uri", "value": "http://www.wikidata.org/entity/Q5582"},
            "collectionLabel": {"type": "literal", "xml:lang": "en", "value": venue}
        })
    };
    server.mock(|when, then| {
        when.method(GET).path("/sparql");
        then.status(200).json_body(serde_json::json!({
            "head": {"vars": ["person", "collectionLabel"]},
            "results": {"bindings": [
                row("Van Gogh Museum"),
                row("Van Gogh Museum"),
                row("Musée d'Orsay")
            ]}
        }));
    });

    let client = client_for(&server);
    let venues = client.exhibitions_by_id("Q5582").await.unwrap();
    assert_eq!(venues, vec!["Van Gogh Museum", "Musée d'Orsay"]);
}

#[tokio::test]
async fn test_people_info_by_ids_backfill_recovers_missing_ids() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/sparql");
        then.status(200).json_body(van_gogh_body());
    });

    let client = client_for(&server);
    let ids = vec!["Q5582".to_string(), "Q999".to_string()];
    let records = client.people_info_by_ids_backfill(&ids).await.unwrap();

    // one batch request plus one profile query for the ID the batch missed
    mock.assert_hits(2);
    assert_eq!(records.len(), 2);
    let harvested: Vec<&str> = records.iter().filter_map(|r| r.id.as_deref()).collect();
    assert!(harvested.contains(&"Q5582"));
    assert!(harvested.contains(&"Q999"));
}

#[tokio::test]
async fn test_people_ids_backfill_falls_back_to_any_language() {
    let server = MockServer::start();
    let names = vec!["葛飾北斎".to_string()];

    let batch_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/sparql")
            .query_param("query", people_ids_query(&names));
        then.status(200).json_body(empty_body());
    });
    let english_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/sparql")
            .query_param("query", id_lookup_query("葛飾北斎", Language::AutoEnglish));
        then.status(200).json_body(empty_body());
    });
    let any_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/sparql")
            .query_param("query", id_lookup_query("葛飾北斎", Language::Any));
        then.status(200).json_body(serde_json::json!({
            "head": {"vars": ["person", "personLabel"]},
            "results": {"bindings": [{
                "person": {"type": "uri", "value": "http://www.wikidata.org/entity/Q5586"},
                "personLabel": {"type": "literal", "xml:lang": "ja", "value": "葛飾北斎"}
            }]}
        }));
    });

    let client = client_for(&server);
    let harvest = client.people_ids_backfill(&names).await.unwrap();

    batch_mock.assert();
    english_mock.assert();
    any_mock.assert();
    assert_eq!(harvest.ids.get("葛飾北斎").map(String::as_str), Some("Q5586"));
    assert_eq!(harvest.all_ids.get("葛飾北斎"), Some(&vec!["Q5586".to_string()]));
    assert_eq!(harvest.counts.get("葛飾北斎"), Some(&0));
}

#[tokio::test]
async fn test_people_ids_counts_unresolved_names_as_zero() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/sparql");
        then.status(200).json_body(van_gogh_body());
    });

    let client = client_for(&server);
    let names = vec!["Vincent van Gogh".to_string(), "Nobody At All".to_string()];
    let harvest = client.people_ids(&names).await.unwrap();

    assert_eq!(harvest.ids.get("Vincent van Gogh").map(String::as_str), Some("Q5582"));
    assert_eq!(harvest.counts.get("Vincent van Gogh"), Some(&3));
    assert_eq!(harvest.counts.get("Nobody At All"), Some(&0));
    assert!(!harvest.ids.contains_key("Nobody At All"));
    assert_eq!(
        harvest.all_ids.get("Vincent van Gogh"),
        Some(&vec!["Q5582".to_string(), "Q5582".to_string(), "Q5582".to_string()])
    );
}
