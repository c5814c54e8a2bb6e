//! Chain ordering specs
//!
//! Verify which units run for a stored document and in what order.

use crate::prelude::*;

#[tokio::test]
async fn unversioned_document_runs_every_unit_in_order() {
    let chain = Chain::new();
    let run = chain
        .registry()
        .run(stored(None, json!({})), chain.cx())
        .await
        .unwrap();

    assert_eq!(run.applied, chain.registry().versions());
    assert_eq!(run.document.version(), Some(v(186)));
    assert_eq!(data_of(&run.document), json!({}));
    assert!(run.changed_controllers.is_empty());
}

#[tokio::test]
async fn point_release_document_resumes_after_its_version() {
    let chain = Chain::new();
    let run = chain
        .registry()
        .run(stored(Version::point(120, 2), json!({})), chain.cx())
        .await
        .unwrap();

    assert_eq!(run.applied, vec![v(128), v(157), v(164), v(171), v(174), v(186)]);
}

#[tokio::test]
async fn document_between_units_runs_only_newer_ones() {
    let chain = Chain::new();
    let run = chain
        .registry()
        .run(stored(v(100), json!({})), chain.cx())
        .await
        .unwrap();

    assert_eq!(run.applied.first(), Some(&Version::point(120, 2)));
    assert_eq!(run.applied.len(), 7);
}

#[tokio::test]
async fn current_document_is_returned_unchanged() {
    let chain = Chain::new();
    let document = stored(v(186), json!({ "NetworkController": "whatever" }));

    let migrated = chain.migrate(document.clone()).await;

    assert_eq!(migrated, document);
    assert!(chain.reports().is_empty());
}

#[tokio::test]
async fn migrate_to_stops_at_target() {
    let chain = Chain::new();
    let migrated = chain.migrate_to(stored(v(53), json!({})), v(88)).await;
    assert_eq!(migrated.version(), Some(v(88)));
}

#[tokio::test]
async fn migrate_to_rejects_newer_documents() {
    let chain = Chain::new();
    let error = chain
        .registry()
        .migrate_to(stored(v(174), json!({})), v(94), chain.cx())
        .await
        .unwrap_err();

    assert!(matches!(error, MigrationError::TooNew { .. }), "got {error}");
}

#[test]
fn fresh_install_starts_at_latest_version() {
    let document = production().initial_document(Default::default());
    assert_eq!(document.version(), Some(v(186)));
    assert!(document.data.is_empty());
}

#[tokio::test]
async fn stored_json_round_trips_through_the_chain() {
    let chain = Chain::new();
    let raw = json!({ "meta": { "version": 185 }, "data": { "Other": { "keep": 1 } } });
    let document = VersionedDocument::from_value(raw).unwrap();

    let migrated = chain.migrate(document).await;

    assert_eq!(
        migrated.into_value(),
        json!({ "meta": { "version": 186 }, "data": { "Other": { "keep": 1 } } })
    );
    assert_eq!(
        chain.reports(),
        ["Migration 186: Invalid NetworkController state: missing NetworkController"]
    );
}
