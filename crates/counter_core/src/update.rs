use counter_logging::engine_debug;

use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::BatchFetched(posts) => {
            let report = state.apply_batch(&posts);
            let mut effects = Vec::with_capacity(2);
            if let Some(report) = report {
                effects.push(Effect::ReportBreak(report));
            }
            effects.push(Effect::PublishStatus(state.view()));
            effects
        }
        Msg::FetchSkipped { reason } => {
            engine_debug!("Cycle skipped: {}", reason);
            Vec::new()
        }
    };

    (state, effects)
}
