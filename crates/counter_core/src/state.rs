use crate::batch::{BatchProcessor, RawPost};
use crate::tracker::{BreakReport, PassPolicy, SequenceState};
use crate::view_model::StatusView;

/// The one process-wide sequence state plus the processor that advances it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    sequence: SequenceState,
    processor: BatchProcessor,
}

impl AppState {
    pub fn new(policy: PassPolicy) -> Self {
        Self {
            sequence: SequenceState::new(),
            processor: BatchProcessor::new(policy),
        }
    }

    pub fn with_sequence(sequence: SequenceState, policy: PassPolicy) -> Self {
        Self {
            sequence,
            processor: BatchProcessor::new(policy),
        }
    }

    pub fn sequence(&self) -> &SequenceState {
        &self.sequence
    }

    pub fn view(&self) -> StatusView {
        StatusView::from_state(&self.sequence)
    }

    pub(crate) fn apply_batch(&mut self, posts: &[RawPost]) -> Option<BreakReport> {
        let (sequence, report) = self.processor.process(self.sequence, posts);
        self.sequence = sequence;
        report
    }
}
