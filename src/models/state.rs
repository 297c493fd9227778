use serde::Serialize;
use std::fmt;

/// Lifecycle of one recognition attempt, as observed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PipelineState {
    #[default]
    Idle,
    Initializing,
    Recognizing { progress: u8 },
    Done,
    Failed { reason: String },
}

impl PipelineState {
    /// Percentage shown in a progress bar, `None` while idle or failed.
    pub fn progress(&self) -> Option<u8> {
        match self {
            PipelineState::Idle | PipelineState::Failed { .. } => None,
            PipelineState::Initializing => Some(0),
            PipelineState::Recognizing { progress } => Some(*progress),
            PipelineState::Done => Some(100),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed { .. })
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self,
            PipelineState::Initializing | PipelineState::Recognizing { .. }
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PipelineState::Idle => write!(f, "idle"),
            PipelineState::Initializing => write!(f, "initializing"),
            PipelineState::Recognizing { progress } => write!(f, "recognizing ({}%)", progress),
            PipelineState::Done => write!(f, "done"),
            PipelineState::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}
