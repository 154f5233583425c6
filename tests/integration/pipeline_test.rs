//! End-to-end pipeline tests over a seeded database.
//!
//! The LLM side uses the deterministic mock client; the store is real.

use std::sync::Arc;

use askcars::db::{RecordingStore, SqliteStore, Value};
use askcars::llm::{FailingLlmClient, LlmSynthesizer, MockLlmClient};
use askcars::pipeline::{AbortKind, Pipeline, StatusHint};
use askcars::safety::RejectionReason;
use pretty_assertions::assert_eq;
use serde_json::json;

use super::fixtures::seed_cars;

fn mock_synthesizer(client: MockLlmClient) -> LlmSynthesizer {
    LlmSynthesizer::new(Box::new(client))
}

#[tokio::test]
async fn test_question_to_rows() {
    let db = seed_cars().await;
    let pipeline = Pipeline::new(
        mock_synthesizer(MockLlmClient::new()),
        SqliteStore::new(&db.path),
    );

    let answer = pipeline.run("Show me cheap cars").await.unwrap();

    assert_eq!(answer.sql, "SELECT * FROM cars WHERE price_eur < 10000");
    assert_eq!(answer.rows.len(), 3);
    assert_eq!(answer.rows[1].get("brand"), Some(&Value::String("Fiat".into())));
}

#[tokio::test]
async fn test_fenced_response_runs() {
    let db = seed_cars().await;
    let pipeline = Pipeline::new(
        mock_synthesizer(MockLlmClient::new()),
        SqliteStore::new(&db.path),
    );

    let answer = pipeline.run("How many cars are there?").await.unwrap();

    assert_eq!(answer.sql, "SELECT COUNT(*) AS total FROM cars");
    let body = serde_json::to_value(&answer).unwrap();
    assert_eq!(
        body,
        json!({"sql": "SELECT COUNT(*) AS total FROM cars", "rows": [{"total": 5}]})
    );
}

#[tokio::test]
async fn test_generated_drop_never_reaches_store() {
    let store = Arc::new(RecordingStore::new());
    let pipeline = Pipeline::new(mock_synthesizer(MockLlmClient::new()), store.clone());

    let aborted = pipeline.run("drop the cars table").await.unwrap_err();

    assert_eq!(
        aborted.kind,
        AbortKind::UnsafeSql(RejectionReason::ForbiddenKeyword("DROP"))
    );
    assert_eq!(
        serde_json::to_value(aborted.to_response()).unwrap(),
        json!({
            "error": "LLM produced unsafe SQL: forbidden keyword: DROP",
            "sql": "DROP TABLE cars;"
        })
    );
    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn test_generated_drop_leaves_database_intact() {
    let db = seed_cars().await;
    let pipeline = Pipeline::new(
        mock_synthesizer(MockLlmClient::new()),
        SqliteStore::new(&db.path),
    );

    assert!(pipeline.run("delete everything").await.is_err());

    let answer = pipeline.run_sql("SELECT COUNT(*) AS n FROM cars").await.unwrap();
    assert_eq!(answer.rows[0].get("n"), Some(&Value::Int(5)));
}

#[tokio::test]
async fn test_empty_question_makes_no_backend_call() {
    let client = MockLlmClient::new();
    let handle = client.clone();
    let store = Arc::new(RecordingStore::new());
    let pipeline = Pipeline::new(mock_synthesizer(client), store.clone());

    let aborted = pipeline.run("").await.unwrap_err();

    assert_eq!(aborted.kind, AbortKind::NoQuestion);
    assert_eq!(
        serde_json::to_value(aborted.to_response()).unwrap(),
        json!({"error": "No question provided"})
    );
    assert_eq!(handle.call_count(), 0);
    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn test_backend_failure_is_upstream() {
    let store = Arc::new(RecordingStore::new());
    let pipeline = Pipeline::new(
        LlmSynthesizer::new(Box::new(FailingLlmClient::new(
            "Failed to connect to Groq API: connection refused",
        ))),
        store.clone(),
    );

    let aborted = pipeline.run("cheap cars").await.unwrap_err();

    assert_eq!(aborted.kind, AbortKind::Backend);
    assert_eq!(aborted.status_hint(), StatusHint::Upstream);
    assert_eq!(aborted.sql, None);
    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn test_bad_generated_column_is_query_failure() {
    let db = seed_cars().await;
    let client = MockLlmClient::new().with_response("colour", "SELECT colour FROM cars");
    let pipeline = Pipeline::new(mock_synthesizer(client), SqliteStore::new(&db.path));

    let aborted = pipeline.run("What colour are the cars?").await.unwrap_err();

    assert_eq!(aborted.kind, AbortKind::QueryFailed);
    assert_eq!(aborted.status_hint(), StatusHint::Failed);
    assert_eq!(aborted.sql.as_deref(), Some("SELECT colour FROM cars"));
    assert!(aborted.message.contains("colour"));
}

#[tokio::test]
async fn test_run_sql_against_missing_database() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::without_synthesizer(SqliteStore::new(dir.path().join("cars.db")));

    let aborted = pipeline.run_sql("SELECT * FROM cars").await.unwrap_err();

    assert_eq!(aborted.kind, AbortKind::StoreUnavailable);
    assert!(aborted.message.starts_with("Database file not found: "));
}

#[tokio::test]
async fn test_run_sql_refuses_writes() {
    let db = seed_cars().await;
    let pipeline = Pipeline::without_synthesizer(SqliteStore::new(&db.path));

    let aborted = pipeline
        .run_sql("UPDATE cars SET price_eur = 1")
        .await
        .unwrap_err();

    assert_eq!(aborted.message, "Unsafe SQL: forbidden keyword: UPDATE");
    assert_eq!(aborted.status_hint(), StatusHint::Rejected);
}

#[tokio::test]
async fn test_translate_reports_verdict_without_running() {
    let db = seed_cars().await;
    let pipeline = Pipeline::new(
        mock_synthesizer(MockLlmClient::new()),
        SqliteStore::new(&db.path),
    );

    let verdict = pipeline.translate("Which brands are listed?").await.unwrap();

    assert!(verdict.is_accepted());
    assert_eq!(
        verdict.statement_text(),
        "SELECT DISTINCT brand FROM cars ORDER BY brand"
    );
}
