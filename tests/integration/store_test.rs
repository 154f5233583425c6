//! SQLite store integration tests.
//!
//! Runs accepted statements against a seeded database file.

use askcars::db::{SqliteStore, Store, Value};
use askcars::error::AskError;
use askcars::safety::{classify_sql, AcceptedStatement};
use pretty_assertions::assert_eq;

use super::fixtures::{seed_cars, CARS};

fn accepted(sql: &str) -> AcceptedStatement {
    classify_sql(sql).into_result().unwrap()
}

#[tokio::test]
async fn test_round_trip_returns_rows_in_store_order() {
    let db = seed_cars().await;
    let store = SqliteStore::new(&db.path);

    let rows = store
        .execute(&accepted("SELECT id, brand FROM cars"))
        .await
        .unwrap();

    let ids: Vec<Option<&Value>> = rows.iter().map(|row| row.get("id")).collect();
    let expected: Vec<Value> = CARS.iter().map(|car| Value::Int(car.0)).collect();
    assert_eq!(ids, expected.iter().map(Some).collect::<Vec<_>>());

    let brands: Vec<String> = rows
        .iter()
        .map(|row| row.get("brand").unwrap().to_display_string())
        .collect();
    assert_eq!(brands, vec!["Dacia", "BMW", "Fiat", "Toyota", "Skoda"]);
}

#[tokio::test]
async fn test_scenario_cheap_cars() {
    let db = seed_cars().await;
    let store = SqliteStore::new(&db.path);

    let rows = store
        .execute(&accepted("SELECT * FROM cars WHERE price_eur < 10000"))
        .await
        .unwrap();

    let ids: Vec<&Value> = rows.iter().filter_map(|row| row.get("id")).collect();
    assert_eq!(ids, vec![&Value::Int(1), &Value::Int(3), &Value::Int(5)]);

    let columns: Vec<&str> = rows[0].columns().collect();
    assert_eq!(
        columns,
        vec![
            "id",
            "brand",
            "model",
            "year",
            "mileage_km",
            "price_eur",
            "accident_history",
            "fuel_type",
            "transmission",
        ]
    );
    assert_eq!(rows[0].get("price_eur"), Some(&Value::Float(6500.0)));
    assert_eq!(rows[0].get("accident_history"), Some(&Value::Null));
}

#[tokio::test]
async fn test_cte_and_aggregate() {
    let db = seed_cars().await;
    let store = SqliteStore::new(&db.path);

    let rows = store
        .execute(&accepted(
            "WITH recent AS (SELECT * FROM cars WHERE year >= 2017) \
             SELECT COUNT(*) AS total, MAX(price_eur) AS top FROM recent",
        ))
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("total"), Some(&Value::Int(3)));
    assert_eq!(rows[0].get("top"), Some(&Value::Float(24900.0)));
}

#[tokio::test]
async fn test_empty_result() {
    let db = seed_cars().await;
    let store = SqliteStore::new(&db.path);

    let rows = store
        .execute(&accepted("SELECT id FROM cars WHERE brand = 'Lada'"))
        .await
        .unwrap();

    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_unknown_column_is_execution_error() {
    let db = seed_cars().await;
    let store = SqliteStore::new(&db.path);

    let err = store
        .execute(&accepted("SELECT colour FROM cars"))
        .await
        .unwrap_err();

    assert!(matches!(err, AskError::Execution(_)));
    assert!(err.message().contains("colour"));
}

#[tokio::test]
async fn test_missing_database_is_store_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.db");
    let store = SqliteStore::new(&path);

    let err = store.execute(&accepted("SELECT 1")).await.unwrap_err();

    assert!(matches!(err, AskError::StoreUnavailable(_)));
    assert_eq!(
        err.message(),
        format!("Database file not found: {}", path.display())
    );
    assert!(!path.exists());
}

#[tokio::test]
async fn test_concurrent_executions_are_isolated() {
    let db = seed_cars().await;
    let store = std::sync::Arc::new(SqliteStore::new(&db.path));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = std::sync::Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .execute(&accepted("SELECT COUNT(*) AS n FROM cars"))
                    .await
            })
        })
        .collect();

    for handle in handles {
        let rows = handle.await.unwrap().unwrap();
        assert_eq!(rows[0].get("n"), Some(&Value::Int(5)));
    }
}
