use meval::Context;

use crate::notation::FACTORIAL_FN;

/// Failure to evaluate an arithmetic expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("malformed expression {expression:?}: {message}")]
    Malformed { expression: String, message: String },
}

pub trait Evaluator: Send + Sync {
    fn evaluate(&self, expression: &str) -> Result<f64, EvalError>;
}

/// Floating point evaluator backed by `meval`: `+ - * / ^ %`, parentheses,
/// the built-in constants and functions (`pi`, `e`, `sqrt`, ...) and
/// `factorial`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MevalEvaluator;

impl Evaluator for MevalEvaluator {
    fn evaluate(&self, expression: &str) -> Result<f64, EvalError> {
        let mut context = Context::new();
        context.func(FACTORIAL_FN, factorial);

        meval::eval_str_with_context(expression, context).map_err(|err| EvalError::Malformed {
            expression: expression.to_string(),
            message: err.to_string(),
        })
    }
}

/// Largest `n` whose factorial is finite as an `f64`.
const MAX_FACTORIAL: f64 = 170.0;

/// `n!` for non-negative integral `n`; NaN for anything else.
fn factorial(n: f64) -> f64 {
    if !(0.0..=MAX_FACTORIAL).contains(&n) || n.fract() != 0.0 {
        return f64::NAN;
    }
    (1..=n as u32).map(f64::from).product()
}
