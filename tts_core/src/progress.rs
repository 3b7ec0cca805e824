use tokio::sync::mpsc::UnboundedSender;

use crate::pipeline::{PipelineState, SynthesisOutput};

/// Advisory notifications from a running pipeline. Nothing an observer does
/// feeds back into control flow.
pub trait ProgressObserver: Send + Sync {
    /// Percent complete in `0.0..=100.0`, non-decreasing within one run.
    fn on_progress(&self, percent: f32);

    fn on_state(&self, _state: &PipelineState) {}
}

impl<F> ProgressObserver for F
where
    F: Fn(f32) + Send + Sync,
{
    fn on_progress(&self, percent: f32) {
        self(percent)
    }
}

/// Everything a pipeline run reports when observed through a channel.
#[derive(Debug, Clone)]
pub enum SynthesisEvent {
    State(PipelineState),
    Progress(f32),
    Completed(SynthesisOutput),
    Failed(String),
}

// A closed receiver means the caller walked away; drop the event.
impl ProgressObserver for UnboundedSender<SynthesisEvent> {
    fn on_progress(&self, percent: f32) {
        let _ = self.send(SynthesisEvent::Progress(percent));
    }

    fn on_state(&self, state: &PipelineState) {
        let _ = self.send(SynthesisEvent::State(state.clone()));
    }
}
