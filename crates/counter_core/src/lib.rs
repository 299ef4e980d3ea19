//! Counter core: title normalization, sequence tracking and the pure update
//! driver. Nothing in here does I/O.
mod batch;
mod effect;
mod evaluator;
mod msg;
mod notation;
mod resolve;
mod state;
mod tracker;
mod update;
mod view_model;

pub use batch::{process_batch, BatchProcessor, RawPost};
pub use effect::Effect;
pub use evaluator::{EvalError, Evaluator, MevalEvaluator};
pub use msg::Msg;
pub use notation::{
    normalize, subscript_digit, superscript_digit, CanonicalForm, FACTORIAL_FN,
    SUBSCRIPT_DIGITS, SUPERSCRIPT_DIGITS,
};
pub use resolve::{binomial, resolve, NormalizedValue, TitleResolver, UnparseableReason};
pub use state::AppState;
pub use tracker::{
    BreakKind, BreakReport, PassPolicy, SequenceState, StatusKind, UNINITIALIZED,
};
pub use update::update;
pub use view_model::{
    EvaluationView, StatusView, EVALUATION_FAILED, EXPECTING_HEADLINE, OUT_OF_ORDER_HEADLINE,
    UNPARSEABLE_HEADLINE,
};
