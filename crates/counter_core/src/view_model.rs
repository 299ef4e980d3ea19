use serde::Serialize;

use crate::resolve::NormalizedValue;
use crate::tracker::{BreakKind, SequenceState, StatusKind};

pub const EXPECTING_HEADLINE: &str = "The Next Post Should Be Number";
pub const OUT_OF_ORDER_HEADLINE: &str = "Sequence Break After Post";
pub const UNPARSEABLE_HEADLINE: &str =
    "Potential Break After The Post Number Below. The Next Post Is Either Text Or Incorrect Math.";
pub const EVALUATION_FAILED: &str = "Could not evaluate expression";

/// What observers are shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusView {
    pub headline: &'static str,
    /// Next expected number while intact, otherwise the count the break follows.
    pub count: i64,
    pub intact: bool,
}

impl StatusView {
    pub fn from_state(state: &SequenceState) -> Self {
        match state.status() {
            StatusKind::Expecting { next_expected } => Self {
                headline: EXPECTING_HEADLINE,
                count: next_expected,
                intact: true,
            },
            StatusKind::BreakDetected { after_count, kind } => Self {
                headline: match kind {
                    BreakKind::OutOfOrder => OUT_OF_ORDER_HEADLINE,
                    BreakKind::UnparseableOrNonInteger => UNPARSEABLE_HEADLINE,
                },
                count: after_count,
                intact: false,
            },
        }
    }
}

/// Reply to a one-off expression check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationView {
    pub expression: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl EvaluationView {
    pub fn new(expression: impl Into<String>, value: NormalizedValue) -> Self {
        let (result, error) = match value.as_integer() {
            Some(n) => (Some(n), None),
            None => (None, Some(EVALUATION_FAILED)),
        };
        Self {
            expression: expression.into(),
            result,
            error,
        }
    }

    /// Single line for plain-text consumers.
    pub fn message(&self) -> String {
        match self.result {
            Some(n) => n.to_string(),
            None => EVALUATION_FAILED.to_string(),
        }
    }
}
