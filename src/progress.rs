use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStage {
    Conversion,
    Transcription,
    Matching,
    Reporting,
    Completed,
}

/// One ordered progress update from the pipeline worker.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub stage: PipelineStage,
    /// Rough overall completion, 0-100
    pub percent: u8,
    pub message: String,
}

/// Producer side of the pipeline's progress reporting.
///
/// The pipeline worker emits ordered events into a channel consumed by a
/// single status sink (the CLI printer). Shared state is limited to an
/// atomic cancellation flag and the last-known progress value; cancellation
/// is cooperative and checked between pipeline stages.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    tx: mpsc::UnboundedSender<ProgressEvent>,
    last: Arc<RwLock<Option<ProgressEvent>>>,
    cancelled: Arc<AtomicBool>,
}

impl ProgressTracker {
    /// Create a tracker and the receiving end of its event channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let tracker = Self {
            tx,
            last: Arc::new(RwLock::new(None)),
            cancelled: Arc::new(AtomicBool::new(false)),
        };
        (tracker, rx)
    }

    /// Emit a progress event and record it as the last-known progress.
    ///
    /// A dropped receiver is not an error; the pipeline keeps running.
    pub async fn update(&self, stage: PipelineStage, percent: u8, message: impl Into<String>) {
        let event = ProgressEvent {
            stage,
            percent: percent.min(100),
            message: message.into(),
        };
        *self.last.write().await = Some(event.clone());
        let _ = self.tx.send(event);
    }

    /// Request cooperative cancellation of the pipeline.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// The most recent event, for status queries outside the channel.
    pub async fn last_progress(&self) -> Option<ProgressEvent> {
        self.last.read().await.clone()
    }
}
