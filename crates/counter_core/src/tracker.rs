use serde::{Deserialize, Serialize};

use crate::resolve::{NormalizedValue, UnparseableReason};

/// Display value of the count before anything has been accepted.
pub const UNINITIALIZED: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BreakKind {
    /// A valid integer that does not continue the sequence.
    OutOfOrder,
    /// A title that did not resolve to an integer at all.
    UnparseableOrNonInteger,
}

/// Where and why a pass stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BreakReport {
    pub after_count: i64,
    pub kind: BreakKind,
    /// Set for `UnparseableOrNonInteger` breaks.
    pub reason: Option<UnparseableReason>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusKind {
    Expecting { next_expected: i64 },
    BreakDetected { after_count: i64, kind: BreakKind },
}

/// Whether a pass keeps the count from the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum PassPolicy {
    /// The count carries over between passes.
    #[default]
    Incremental,
    /// Every pass starts from an uninitialized count.
    Recompute,
}

/// Running state of the counting sequence.
///
/// `last_accepted` is `None` exactly until a value has been accepted; the
/// `-1` convention only exists at the [`SequenceState::current_count`]
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceState {
    last_accepted: Option<i64>,
    confirmed_this_cycle: bool,
    status: StatusKind,
}

impl Default for SequenceState {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceState {
    pub fn new() -> Self {
        Self {
            last_accepted: None,
            confirmed_this_cycle: false,
            status: StatusKind::Expecting { next_expected: 0 },
        }
    }

    /// State as if `count` had been accepted in an earlier pass.
    pub fn starting_at(count: i64) -> Self {
        Self {
            last_accepted: Some(count),
            confirmed_this_cycle: false,
            status: StatusKind::Expecting {
                next_expected: count.saturating_add(1),
            },
        }
    }

    pub fn current_count(&self) -> i64 {
        self.last_accepted.unwrap_or(UNINITIALIZED)
    }

    pub fn last_accepted(&self) -> Option<i64> {
        self.last_accepted
    }

    pub fn confirmed_this_cycle(&self) -> bool {
        self.confirmed_this_cycle
    }

    pub fn status(&self) -> StatusKind {
        self.status
    }

    pub fn is_broken(&self) -> bool {
        matches!(self.status, StatusKind::BreakDetected { .. })
    }

    pub(crate) fn begin_pass(&mut self, policy: PassPolicy) {
        self.confirmed_this_cycle = false;
        if policy == PassPolicy::Recompute {
            self.last_accepted = None;
        }
    }

    /// Feed one value in chronological order.
    ///
    /// The first value of a pass may sit at or below the known count: the
    /// fetch window overlaps what earlier passes already walked, so the count
    /// is rebased onto it. Every later value must be exactly one more.
    pub fn feed(&mut self, value: NormalizedValue) -> Result<i64, BreakReport> {
        let count = match value {
            NormalizedValue::Integer(n) => n,
            NormalizedValue::Unparseable(reason) => {
                return Err(self.break_report(BreakKind::UnparseableOrNonInteger, Some(reason)));
            }
        };

        let rebase = !self.confirmed_this_cycle
            && self.last_accepted.is_some_and(|current| count <= current);
        let follows = match self.last_accepted {
            None => true,
            Some(current) => current.checked_add(1) == Some(count),
        };

        if rebase || follows {
            self.last_accepted = Some(count);
            self.confirmed_this_cycle = true;
            Ok(count)
        } else {
            Err(self.break_report(BreakKind::OutOfOrder, None))
        }
    }

    pub(crate) fn settle(&mut self, outcome: Option<&BreakReport>) {
        self.status = match outcome {
            None => StatusKind::Expecting {
                next_expected: self.current_count().saturating_add(1),
            },
            Some(report) => StatusKind::BreakDetected {
                after_count: report.after_count,
                kind: report.kind,
            },
        };
    }

    fn break_report(&self, kind: BreakKind, reason: Option<UnparseableReason>) -> BreakReport {
        BreakReport {
            after_count: self.current_count(),
            kind,
            reason,
        }
    }
}
