use std::sync::Arc;

use counter_core::{update, AppState, BreakKind, Effect, Msg, RawPost};
use counter_engine::{EngineEvent, ListingPost};
use counter_logging::{engine_info, engine_warn};
use tokio::sync::mpsc;

use crate::hub::StatusHub;

pub struct EffectRunner {
    hub: Arc<StatusHub>,
}

impl EffectRunner {
    pub fn new(hub: Arc<StatusHub>) -> Self {
        Self { hub }
    }

    pub async fn apply(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::PublishStatus(view) => {
                    engine_info!("{} {}", view.headline, view.count);
                    self.hub.publish(view).await;
                }
                Effect::ReportBreak(report) => match report.kind {
                    BreakKind::OutOfOrder => {
                        engine_warn!("Sequence break after post {}", report.after_count);
                    }
                    BreakKind::UnparseableOrNonInteger => {
                        engine_warn!(
                            "Potential break after post {}: next title did not resolve ({:?})",
                            report.after_count,
                            report.reason
                        );
                    }
                },
            }
        }
    }
}

/// Feed engine events through `update` one at a time; the only place the
/// sequence state is mutated. Returns the final state once the engine stops.
pub async fn drive(
    mut state: AppState,
    mut events: mpsc::Receiver<EngineEvent>,
    runner: EffectRunner,
) -> AppState {
    while let Some(event) = events.recv().await {
        let (next, effects) = update(state, to_msg(event));
        state = next;
        runner.apply(effects).await;
    }
    state
}

pub fn to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::BatchFetched(posts) => {
            Msg::BatchFetched(posts.into_iter().map(to_raw_post).collect())
        }
        EngineEvent::FetchFailed(err) => Msg::FetchSkipped {
            reason: err.to_string(),
        },
    }
}

fn to_raw_post(post: ListingPost) -> RawPost {
    RawPost {
        title: post.title,
        is_administrative: post.distinguished.is_some(),
    }
}
