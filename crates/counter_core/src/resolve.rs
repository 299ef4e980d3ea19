use counter_logging::{engine_debug, engine_trace};
use serde::Serialize;

use crate::evaluator::{Evaluator, MevalEvaluator};
use crate::notation::{normalize, CanonicalForm};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnparseableReason {
    /// No recognized notation, or the expression failed to parse or evaluate.
    SyntaxError,
    /// Evaluation succeeded but the result is not an integer.
    NonNumericResult,
}

/// What one post title resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizedValue {
    Integer(i64),
    Unparseable(UnparseableReason),
}

impl NormalizedValue {
    pub fn as_integer(self) -> Option<i64> {
        match self {
            NormalizedValue::Integer(n) => Some(n),
            NormalizedValue::Unparseable(_) => None,
        }
    }
}

/// Turns raw titles into [`NormalizedValue`]s.
///
/// Holds no state besides the evaluator, so one resolver can serve the
/// batch pass and ad-hoc requests at the same time.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TitleResolver<E = MevalEvaluator> {
    evaluator: E,
}

impl TitleResolver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: Evaluator> TitleResolver<E> {
    pub fn with_evaluator(evaluator: E) -> Self {
        Self { evaluator }
    }

    pub fn resolve(&self, raw: &str) -> NormalizedValue {
        if let Ok(n) = raw.trim().parse::<i64>() {
            return NormalizedValue::Integer(n);
        }

        let value = match normalize(raw) {
            CanonicalForm::Combinatorial { n, k } => {
                binomial(n, k).ok_or(UnparseableReason::SyntaxError)
            }
            CanonicalForm::BaseConversion { digits, base } => {
                from_base(&digits, base).ok_or(UnparseableReason::SyntaxError)
            }
            CanonicalForm::PlainArithmetic(expression) => {
                match self.evaluator.evaluate(&expression) {
                    Ok(result) => integral(result).ok_or(UnparseableReason::NonNumericResult),
                    Err(err) => {
                        engine_debug!("{}", err);
                        Err(UnparseableReason::SyntaxError)
                    }
                }
            }
            CanonicalForm::Unrecognized => Err(UnparseableReason::SyntaxError),
        };

        match value {
            Ok(n) => {
                engine_trace!("Resolved {:?} to {}", raw, n);
                NormalizedValue::Integer(n)
            }
            Err(reason) => {
                engine_debug!("Could not resolve {:?}: {:?}", raw, reason);
                NormalizedValue::Unparseable(reason)
            }
        }
    }
}

/// Resolve `raw` with the default evaluator.
pub fn resolve(raw: &str) -> NormalizedValue {
    TitleResolver::new().resolve(raw)
}

/// `n choose k` with checked arithmetic; `None` for negative input or overflow.
pub fn binomial(n: i64, k: i64) -> Option<i64> {
    if n < 0 || k < 0 {
        return None;
    }
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut acc: i128 = 1;
    for i in 0..i128::from(k) {
        // Exact at every step: acc is C(n, i) before the division.
        acc = acc.checked_mul(i128::from(n) - i)? / (i + 1);
    }
    i64::try_from(acc).ok()
}

fn from_base(digits: &str, base: u32) -> Option<i64> {
    if !(2..=36).contains(&base) {
        return None;
    }
    i64::from_str_radix(digits, base).ok()
}

fn integral(value: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    if value.is_finite() && value.fract() == 0.0 && in_range {
        Some(value as i64)
    } else {
        None
    }
}
