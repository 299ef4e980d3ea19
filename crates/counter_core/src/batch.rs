use counter_logging::engine_debug;

use crate::evaluator::{Evaluator, MevalEvaluator};
use crate::resolve::TitleResolver;
use crate::tracker::{BreakReport, PassPolicy, SequenceState};

/// One fetched post, as delivered by the listing source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPost {
    pub title: String,
    /// Moderator or other official post; never counted.
    pub is_administrative: bool,
}

impl RawPost {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            is_administrative: false,
        }
    }

    pub fn administrative(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            is_administrative: true,
        }
    }
}

/// Runs resolver and tracker over one batch with a fixed [`PassPolicy`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchProcessor<E = MevalEvaluator> {
    resolver: TitleResolver<E>,
    policy: PassPolicy,
}

impl BatchProcessor {
    pub fn new(policy: PassPolicy) -> Self {
        Self {
            resolver: TitleResolver::new(),
            policy,
        }
    }
}

impl<E: Evaluator> BatchProcessor<E> {
    pub fn with_resolver(resolver: TitleResolver<E>, policy: PassPolicy) -> Self {
        Self { resolver, policy }
    }

    pub fn policy(&self) -> PassPolicy {
        self.policy
    }

    pub fn resolver(&self) -> &TitleResolver<E> {
        &self.resolver
    }

    /// Walk `posts` (newest first, as fetched) oldest to newest and stop at
    /// the first break. Progress made before a break is kept.
    pub fn process(
        &self,
        mut state: SequenceState,
        posts: &[RawPost],
    ) -> (SequenceState, Option<BreakReport>) {
        state.begin_pass(self.policy);

        let outcome = posts
            .iter()
            .rev()
            .filter(|post| !post.is_administrative)
            .try_for_each(|post| {
                state
                    .feed(self.resolver.resolve(&post.title))
                    .map(|_| ())
            })
            .err();

        state.settle(outcome.as_ref());
        if outcome.is_none() {
            engine_debug!(
                "Pass over {} posts complete, current count {}",
                posts.len(),
                state.current_count()
            );
        }
        (state, outcome)
    }
}

/// [`BatchProcessor::process`] with the default evaluator and policy.
pub fn process_batch(
    state: SequenceState,
    posts: &[RawPost],
) -> (SequenceState, Option<BreakReport>) {
    BatchProcessor::new(PassPolicy::default()).process(state, posts)
}
