//! Question-to-rows pipeline.
//!
//! Drives one request through `Received -> Synthesized -> Validated ->
//! Executed -> Responded`. Any failure moves the request to [`Aborted`] and
//! nothing after that point runs. In particular a statement refused by the
//! gate never reaches the store.

mod outcome;

pub use outcome::{AbortKind, Aborted, ErrorResponse, QueryAnswer, Stage, StatusHint};

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::db::Store;
use crate::llm::Synthesizer;
use crate::safety::{AcceptedStatement, SafetyVerdict, SqlClassifier};

/// Message prefix for refused statements written by the synthesizer.
const UNSAFE_GENERATED_PREFIX: &str = "LLM produced unsafe SQL";
/// Message prefix for refused statements supplied by the caller.
const UNSAFE_SUPPLIED_PREFIX: &str = "Unsafe SQL";

/// Refuses an empty or blank question before any backend is involved.
pub fn check_question(question: &str) -> Result<(), Aborted> {
    if question.trim().is_empty() {
        return Err(Aborted::no_question());
    }
    Ok(())
}

/// Orchestrates synthesis, the safety gate and execution.
///
/// Stateless across requests; share it behind an `Arc` to serve requests
/// concurrently.
pub struct Pipeline<S, T> {
    synthesizer: S,
    store: T,
    classifier: SqlClassifier,
}

impl<S, T> Pipeline<S, T> {
    /// Creates a pipeline over the given synthesizer and store.
    pub fn new(synthesizer: S, store: T) -> Self {
        Self {
            synthesizer,
            store,
            classifier: SqlClassifier::new(),
        }
    }

    /// Returns the synthesizer.
    pub fn synthesizer(&self) -> &S {
        &self.synthesizer
    }

    /// Returns the store.
    pub fn store(&self) -> &T {
        &self.store
    }
}

impl<T: Store> Pipeline<(), T> {
    /// Creates a pipeline that only runs caller-supplied SQL.
    pub fn without_synthesizer(store: T) -> Self {
        Self::new((), store)
    }
}

impl<S: Synthesizer, T: Store> Pipeline<S, T> {
    /// Answers a natural-language question with the rows of a generated query.
    pub async fn run(&self, question: &str) -> Result<QueryAnswer, Aborted> {
        let accepted = match self.translate(question).await? {
            SafetyVerdict::Accepted(accepted) => accepted,
            SafetyVerdict::Rejected(rejection) => {
                warn!(
                    reason = %rejection.reason,
                    sql = %rejection.statement,
                    "Rejected generated SQL"
                );
                return Err(Aborted::rejected(
                    Stage::Synthesized,
                    UNSAFE_GENERATED_PREFIX,
                    rejection,
                ));
            }
        };

        self.execute(accepted).await
    }

    /// Synthesizes and classifies SQL for a question without executing it.
    ///
    /// Backend failures abort; a refused statement is returned as a verdict.
    pub async fn translate(&self, question: &str) -> Result<SafetyVerdict, Aborted> {
        debug!(stage = %Stage::Received, "Question received");
        check_question(question)?;

        let candidate = self
            .synthesizer
            .synthesize(question)
            .await
            .map_err(|e| {
                warn!(error = %e, "Synthesis failed");
                Aborted::from_error(Stage::Received, e, None)
            })?;
        debug!(stage = %Stage::Synthesized, sql = %candidate, "Candidate synthesized");

        Ok(self.classifier.classify(candidate.raw()))
    }
}

impl<S, T: Store> Pipeline<S, T> {
    /// Runs caller-supplied SQL through the gate and the store.
    pub async fn run_sql(&self, sql: &str) -> Result<QueryAnswer, Aborted> {
        debug!(stage = %Stage::Received, "SQL received");
        if sql.trim().is_empty() {
            return Err(Aborted::no_sql());
        }

        let accepted = self.classifier.classify(sql).into_result().map_err(|rejection| {
            warn!(
                reason = %rejection.reason,
                sql = %rejection.statement,
                "Rejected supplied SQL"
            );
            Aborted::rejected(Stage::Received, UNSAFE_SUPPLIED_PREFIX, rejection)
        })?;

        self.execute(accepted).await
    }

    async fn execute(&self, accepted: AcceptedStatement) -> Result<QueryAnswer, Aborted> {
        debug!(stage = %Stage::Validated, sql = %accepted, "Statement accepted");

        let start = Instant::now();
        let rows = self.store.execute(&accepted).await.map_err(|e| {
            warn!(error = %e, sql = %accepted, "Execution failed");
            Aborted::from_error(Stage::Validated, e, Some(accepted.sql().to_string()))
        })?;
        debug!(
            stage = %Stage::Executed,
            row_count = rows.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Statement executed"
        );

        info!(row_count = rows.len(), "Query answered");
        debug!(stage = %Stage::Responded, "Response ready");
        Ok(QueryAnswer {
            sql: accepted.into_sql(),
            rows,
        })
    }
}
