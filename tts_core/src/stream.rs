//! Streaming pipeline events.
//!
//! The pipeline reports through an observer; this module turns one run into
//! a stream of [`SynthesisEvent`]s for consumers that forward progress over a
//! socket. The run happens on its own task and feeds an unbounded channel.
//! Dropping the stream abandons the run: events still in flight are discarded.

use std::sync::Arc;

use async_stream::stream;
use futures_core::Stream;
use tokio::sync::mpsc;

use crate::pipeline::{SpeechRequest, SynthesisPipeline};
use crate::progress::{ProgressObserver, SynthesisEvent};

/// Run `request` and yield state, progress, and finally `Completed` or `Failed`.
pub fn synthesis_events(
    pipeline: Arc<SynthesisPipeline>,
    request: SpeechRequest,
) -> impl Stream<Item = SynthesisEvent> {
    let (tx, mut rx) = mpsc::unbounded_channel::<SynthesisEvent>();

    tokio::spawn(async move {
        let observer: &dyn ProgressObserver = &tx;
        let outcome = pipeline.synthesize(&request, Some(observer)).await;
        let last = match outcome {
            Ok(output) => SynthesisEvent::Completed(output),
            Err(e) => SynthesisEvent::Failed(e.to_string()),
        };
        let _ = tx.send(last);
    });

    stream! {
        while let Some(event) = rx.recv().await {
            let finished = matches!(
                event,
                SynthesisEvent::Completed(_) | SynthesisEvent::Failed(_)
            );
            yield event;
            if finished {
                break;
            }
        }
    }
}
