//! Prompt construction for SQL synthesis.
//!
//! The system prompt is fixed: it names the `cars` table and its columns and
//! repeats the read-only rules the safety gate enforces.

use crate::llm::types::Message;

/// System prompt sent with every synthesis request.
pub const SYSTEM_PROMPT: &str = "You are a SQL generator for a used cars database. The database has a table named cars with columns: id, brand, model, year, mileage_km, price_eur, accident_history, fuel_type, transmission. Respond ONLY with raw SQL. No backticks. No markdown. No ```sql``` fences. No explanations. The SQL output MUST begin directly with SELECT or WITH. Never generate DELETE, UPDATE, INSERT, or any DDL.";

/// Columns of the `cars` table, in declaration order.
pub const CARS_COLUMNS: [&str; 9] = [
    "id",
    "brand",
    "model",
    "year",
    "mileage_km",
    "price_eur",
    "accident_history",
    "fuel_type",
    "transmission",
];

/// Builds the message list for one synthesis request.
///
/// A single turn: the system prompt followed by the question. No history.
pub fn build_messages(question: &str) -> Vec<Message> {
    vec![Message::system(SYSTEM_PROMPT), Message::user(question)]
}
