use crate::models::{PassportRecord, PipelineState, RawImage};
use crate::passport_reader::PassportReader;
use crate::progress::ProgressReporter;
use crate::utils::PassportError;
use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// How a scan ended when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Completed(PassportRecord),
    Cancelled,
}

struct ActiveScan {
    cancel: watch::Sender<bool>,
    handle: JoinHandle<Result<ScanOutcome, PassportError>>,
}

/// A logical scanning session with at most one recognition in flight.
///
/// Starting a scan while another is running cancels the running one and
/// waits for it to wind down first. The last image is kept for `retry`.
pub struct ScanSession {
    reader: Arc<PassportReader>,
    progress: ProgressReporter,
    active: Option<ActiveScan>,
    last_image: Option<Arc<RawImage>>,
}

impl ScanSession {
    pub fn new(reader: PassportReader) -> Self {
        ScanSession {
            reader: Arc::new(reader),
            progress: ProgressReporter::default(),
            active: None,
            last_image: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.progress.subscribe()
    }

    pub fn state(&self) -> PipelineState {
        self.progress.state()
    }

    pub fn is_scanning(&self) -> bool {
        self.active
            .as_ref()
            .map(|active| !active.handle.is_finished())
            .unwrap_or(false)
    }

    /// Begin recognizing `image` in the background.
    pub async fn start(&mut self, image: RawImage) {
        self.cancel().await;
        let image = Arc::new(image);
        self.last_image = Some(Arc::clone(&image));
        self.spawn(image);
    }

    /// Wait for the running scan. `None` when nothing was started.
    pub async fn finish(&mut self) -> Option<Result<ScanOutcome, PassportError>> {
        let active = self.active.take()?;
        let outcome = match active.handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                let err = PassportError::Unexpected(format!("scan task failed: {}", e));
                self.progress.failed(err.to_string());
                Err(err)
            }
        };
        Some(outcome)
    }

    /// `start` followed by `finish`.
    pub async fn scan(&mut self, image: RawImage) -> Result<ScanOutcome, PassportError> {
        self.start(image).await;
        self.finish().await.unwrap_or(Ok(ScanOutcome::Cancelled))
    }

    /// Re-run the pipeline on the last image in a fresh attempt.
    pub async fn retry(&mut self) -> Result<(), PassportError> {
        let image = self
            .last_image
            .clone()
            .ok_or_else(|| PassportError::Unexpected("no image to retry".to_string()))?;
        self.cancel().await;
        self.spawn(image);
        Ok(())
    }

    /// Cancel the running scan, if any, and wait for its teardown.
    /// Returns whether a scan was actually interrupted.
    pub async fn cancel(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };

        let interrupted = !active.handle.is_finished();
        // The task may already be gone, in which case nobody is listening.
        let _ = active.cancel.send(true);
        if let Err(e) = active.handle.await {
            warn!("Scan task ended abnormally during cancellation: {}", e);
        }
        if interrupted {
            debug!("Scan cancelled");
            self.progress.idle();
        }
        interrupted
    }

    /// Cancel any scan, forget the last image and go back to idle.
    pub async fn reset(&mut self) {
        self.cancel().await;
        self.last_image = None;
        self.progress.idle();
    }

    fn spawn(&mut self, image: Arc<RawImage>) {
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let reader = Arc::clone(&self.reader);
        let progress = self.progress.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled(&mut cancel_rx) => {
                    progress.idle();
                    Ok(ScanOutcome::Cancelled)
                }
                result = reader.recognize(&image, &progress) => result.map(ScanOutcome::Completed),
            }
        });

        self.active = Some(ActiveScan {
            cancel: cancel_tx,
            handle,
        });
    }
}

/// Resolves once `true` is published. Never resolves if the sender goes away first.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        let requested = *rx.borrow_and_update();
        if requested {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::processing::PrecomputedOcr;

    const LINE1: &str = "P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<";
    const LINE2: &str = "L898902C36UTO7408122F1204159ZE184226B<<<<<10";

    fn session(text: &str, confidence: f32) -> ScanSession {
        let engine = Arc::new(PrecomputedOcr::new(text, confidence));
        ScanSession::new(PassportReader::new(PipelineConfig::default(), engine))
    }

    fn image() -> RawImage {
        RawImage::new(1, 1, vec![0, 0, 0, 255]).unwrap()
    }

    #[tokio::test]
    async fn test_scan_completes() {
        let mut session = session(&format!("PASSPORT\n{}\n{}", LINE1, LINE2), 91.0);
        let outcome = session.scan(image()).await.unwrap();

        match outcome {
            ScanOutcome::Completed(record) => {
                assert_eq!(record.fields[0].value, "ANNA MARIA ERIKSSON");
            }
            ScanOutcome::Cancelled => panic!("scan was not cancelled"),
        }
        assert_eq!(session.state(), PipelineState::Done);
        assert!(!session.is_scanning());
    }

    #[tokio::test]
    async fn test_scan_failure_sets_failed_state() {
        let mut session = session("GROCERY LIST", 91.0);
        let err = session.scan(image()).await.unwrap_err();
        assert!(matches!(err, PassportError::NotAPassport));
        assert!(matches!(session.state(), PipelineState::Failed { .. }));
    }

    #[tokio::test]
    async fn test_finish_without_start() {
        let mut session = session("", 0.0);
        assert!(session.finish().await.is_none());
        assert!(!session.cancel().await);
    }

    #[tokio::test]
    async fn test_retry_without_image() {
        let mut session = session("", 0.0);
        assert!(matches!(
            session.retry().await,
            Err(PassportError::Unexpected(_))
        ));
    }

    #[tokio::test]
    async fn test_retry_reuses_last_image() {
        let mut session = session(&format!("{}\n{}", LINE1, LINE2), 91.0);
        session.scan(image()).await.unwrap();

        session.retry().await.unwrap();
        let outcome = session.finish().await.unwrap().unwrap();
        assert!(matches!(outcome, ScanOutcome::Completed(_)));
    }

    #[tokio::test]
    async fn test_reset_returns_to_idle() {
        let mut session = session(&format!("{}\n{}", LINE1, LINE2), 91.0);
        session.scan(image()).await.unwrap();
        session.reset().await;
        assert_eq!(session.state(), PipelineState::Idle);
        assert!(session.retry().await.is_err());
    }
}
