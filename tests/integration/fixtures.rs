//! Seeded cars database shared by the integration tests.

use std::path::PathBuf;

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::Connection;
use tempfile::TempDir;

/// A cars database file living as long as the returned directory guard.
pub struct SeededDb {
    pub path: PathBuf,
    _dir: TempDir,
}

/// Rows inserted by [`seed_cars`], in insertion order:
/// (id, brand, model, year, mileage_km, price_eur).
pub const CARS: [(i64, &str, &str, i64, i64, f64); 5] = [
    (1, "Dacia", "Sandero", 2016, 98000, 6500.0),
    (2, "BMW", "320d", 2019, 61000, 24900.0),
    (3, "Fiat", "Panda", 2014, 132000, 4200.0),
    (4, "Toyota", "Yaris", 2020, 35000, 15800.0),
    (5, "Skoda", "Octavia", 2017, 110000, 9990.0),
];

/// Creates a temporary SQLite file with the `cars` table and [`CARS`].
pub async fn seed_cars() -> SeededDb {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cars.db");

    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let mut conn = SqliteConnection::connect_with(&options).await.unwrap();

    sqlx::query(
        "CREATE TABLE cars (
            id INTEGER PRIMARY KEY,
            brand TEXT NOT NULL,
            model TEXT NOT NULL,
            year INTEGER NOT NULL,
            mileage_km INTEGER NOT NULL,
            price_eur REAL NOT NULL,
            accident_history TEXT,
            fuel_type TEXT,
            transmission TEXT
        )",
    )
    .execute(&mut conn)
    .await
    .unwrap();

    for (id, brand, model, year, mileage_km, price_eur) in CARS {
        sqlx::query(
            "INSERT INTO cars (id, brand, model, year, mileage_km, price_eur, \
             accident_history, fuel_type, transmission) \
             VALUES (?, ?, ?, ?, ?, ?, NULL, 'petrol', 'manual')",
        )
        .bind(id)
        .bind(brand)
        .bind(model)
        .bind(year)
        .bind(mileage_km)
        .bind(price_eur)
        .execute(&mut conn)
        .await
        .unwrap();
    }

    conn.close().await.unwrap();

    SeededDb { path, _dir: dir }
}
