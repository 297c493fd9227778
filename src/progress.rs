use crate::models::PipelineState;
use std::sync::Arc;
use tokio::sync::watch;

/// Progress at which engine-reported recognition starts.
pub const RECOGNITION_START: u8 = 10;
/// Progress once the engine has returned its text.
pub const RECOGNITION_END: u8 = 90;
/// Engine fraction at which the progress bar already reads `RECOGNITION_END`.
const ENGINE_SATURATION: f32 = 0.7;

/// Publishes `PipelineState` transitions to any number of subscribers.
///
/// Recognition progress only ever moves forward: reports lower than the
/// current percentage are dropped.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    tx: Arc<watch::Sender<PipelineState>>,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new().0
    }
}

impl ProgressReporter {
    pub fn new() -> (Self, watch::Receiver<PipelineState>) {
        let (tx, rx) = watch::channel(PipelineState::Idle);
        (ProgressReporter { tx: Arc::new(tx) }, rx)
    }

    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.tx.subscribe()
    }

    pub fn state(&self) -> PipelineState {
        self.tx.borrow().clone()
    }

    pub fn initializing(&self) {
        self.tx.send_replace(PipelineState::Initializing);
    }

    pub fn recognizing(&self, progress: u8) {
        let progress = progress.min(100);
        self.tx.send_if_modified(|state| {
            let advance = match state {
                PipelineState::Recognizing { progress: current } => progress > *current,
                PipelineState::Done | PipelineState::Failed { .. } => false,
                PipelineState::Idle | PipelineState::Initializing => true,
            };
            if advance {
                *state = PipelineState::Recognizing { progress };
            }
            advance
        });
    }

    /// Map an engine-reported fraction (0.0-1.0) onto the 10-90 recognition band.
    pub fn engine_progress(&self, fraction: f32) {
        self.recognizing(Self::scale_engine_progress(fraction));
    }

    pub fn scale_engine_progress(fraction: f32) -> u8 {
        let scaled = (fraction.max(0.0) / ENGINE_SATURATION).min(1.0);
        let span = (RECOGNITION_END - RECOGNITION_START) as f32;
        RECOGNITION_START + (scaled * span).round() as u8
    }

    pub fn done(&self) {
        self.tx.send_replace(PipelineState::Done);
    }

    pub fn failed(&self, reason: impl Into<String>) {
        self.tx.send_replace(PipelineState::Failed {
            reason: reason.into(),
        });
    }

    pub fn idle(&self) {
        self.tx.send_replace(PipelineState::Idle);
    }
}
