// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Helpers shared by the migration unit tests.

use serde_json::Value;
use statemig_core::{
    FakeReporter, Migration, MigrationContext, Version, VersionedDocument,
};

pub struct Outcome {
    pub version: Option<Version>,
    pub data: Value,
    pub reports: Vec<String>,
}

/// Run `unit` once over `data` at version `from` with a recording reporter.
pub async fn run_with(
    unit: &dyn Migration,
    from: Option<Version>,
    data: Value,
    cx: MigrationContext,
) -> Outcome {
    let reporter = FakeReporter::new();
    let cx = cx.with_reporter(reporter.clone());
    let previous = VersionedDocument::from_value(serde_json::json!({ "data": data }))
        .unwrap_or_else(|e| panic!("bad fixture: {e}"));
    let previous = VersionedDocument::new(from, previous.data);
    let snapshot = previous.clone();

    let next = unit
        .migrate(&previous, &cx)
        .await
        .unwrap_or_else(|e| panic!("unexpected defect: {e}"));

    assert_eq!(previous, snapshot, "input document was modified");
    Outcome {
        version: next.version(),
        data: Value::Object(next.data),
        reports: reporter.messages(),
    }
}

pub async fn run(unit: &dyn Migration, data: Value) -> Outcome {
    run_with(unit, None, data, MigrationContext::new()).await
}
