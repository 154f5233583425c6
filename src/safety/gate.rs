//! SQL classification logic.
//!
//! A textual, fail-closed check: the statement must not contain any
//! blacklisted keyword as a whole word, anywhere, and must open with a read
//! verb. Keywords inside string literals or comments still count.

use std::sync::OnceLock;

use regex::Regex;

use super::{
    strip_code_fences, AcceptedStatement, CandidateStatement, Rejection, RejectionReason,
    SafetyVerdict,
};

/// Verbs a statement may start with.
pub const READ_VERBS: [&str; 2] = ["SELECT", "WITH"];

/// Keywords that reject a statement wherever they appear. Checked in order.
pub const FORBIDDEN_KEYWORDS: [&str; 9] = [
    "DELETE", "UPDATE", "INSERT", "DROP", "ALTER", "TRUNCATE", "CREATE", "REPLACE", "MERGE",
];

/// Compiled whole-word patterns, one per forbidden keyword.
fn keyword_patterns() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        FORBIDDEN_KEYWORDS
            .iter()
            .map(|keyword| {
                let pattern = format!(r"\b{}\b", keyword);
                let regex = Regex::new(&pattern).expect("keyword pattern is a valid regex");
                (*keyword, regex)
            })
            .collect()
    })
}

/// SQL classifier deciding whether a statement may reach the store.
#[derive(Debug, Clone)]
pub struct SqlClassifier {
    patterns: &'static [(&'static str, Regex)],
}

impl Default for SqlClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlClassifier {
    /// Creates a new SQL classifier.
    pub fn new() -> Self {
        Self {
            patterns: keyword_patterns(),
        }
    }

    /// Classifies a SQL string.
    ///
    /// Always returns a verdict. The accepted text is the trimmed,
    /// fence-stripped original, not the uppercased inspection copy.
    pub fn classify(&self, sql: &str) -> SafetyVerdict {
        let candidate = CandidateStatement::new(strip_code_fences(sql));

        if candidate.is_blank() {
            return reject(RejectionReason::EmptyStatement, candidate);
        }

        // Inspection copy only
        let upper = candidate.normalized();

        // Keyword scan first: `DROP TABLE x` reports DROP, not the verb
        if let Some(keyword) = self.find_forbidden_keyword(&upper) {
            return reject(RejectionReason::ForbiddenKeyword(keyword), candidate);
        }

        if !READ_VERBS.contains(&leading_token(&upper)) {
            return reject(RejectionReason::NotAReadStatement, candidate);
        }

        SafetyVerdict::Accepted(AcceptedStatement {
            sql: candidate.into_raw(),
        })
    }

    /// Returns the first blacklisted keyword (in list order) found as a whole word.
    fn find_forbidden_keyword(&self, upper: &str) -> Option<&'static str> {
        self.patterns
            .iter()
            .find(|(_, pattern)| pattern.is_match(upper))
            .map(|(keyword, _)| *keyword)
    }
}

/// Convenience function to classify SQL without creating a classifier instance.
pub fn classify_sql(sql: &str) -> SafetyVerdict {
    SqlClassifier::new().classify(sql)
}

/// Returns the first identifier-like token of the text.
///
/// Text starting with punctuation yields an empty token.
fn leading_token(upper: &str) -> &str {
    upper
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .next()
        .unwrap_or("")
}

fn reject(reason: RejectionReason, candidate: CandidateStatement) -> SafetyVerdict {
    SafetyVerdict::Rejected(Rejection {
        reason,
        statement: candidate.into_raw(),
    })
}
