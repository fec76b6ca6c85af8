//! Background assessment worker.
//!
//! Runs the prediction pipeline (including the blocking chat-model call)
//! off the TUI thread so the interface stays responsive, reporting progress
//! over an mpsc channel polled by the main loop.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::application::AssessmentService;
use crate::domain::{Assessment, PatientData};
use crate::ports::{AttributionExplainer, ExplanationModel, RiskModel};

/// Progress updates from the assessment worker.
#[derive(Debug, Clone)]
pub enum AssessmentProgress {
    /// Scaling the input row
    Scaling,
    /// Running classifier and explainer
    Predicting,
    /// Waiting on the chat model
    Explaining,
    /// Pipeline complete
    Complete(Assessment),
    /// Error occurred
    Error(String),
}

/// Handle to a running assessment worker.
pub struct AssessmentWorkerHandle {
    progress_rx: Receiver<AssessmentProgress>,
    _handle: JoinHandle<()>,
}

impl AssessmentWorkerHandle {
    /// Try to receive the next progress update (non-blocking).
    #[must_use]
    pub fn try_recv(&self) -> Option<AssessmentProgress> {
        self.progress_rx.try_recv().ok()
    }
}

/// Assessment worker that runs the pipeline in the background.
pub struct AssessmentWorker;

impl AssessmentWorker {
    /// Spawn a background assessment task.
    ///
    /// Returns a handle to receive progress updates.
    pub fn spawn<M, A, L>(
        service: Arc<AssessmentService<M, A, L>>,
        patient: PatientData,
    ) -> AssessmentWorkerHandle
    where
        M: RiskModel + 'static,
        A: AttributionExplainer + 'static,
        L: ExplanationModel + 'static,
    {
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            Self::run_with_progress(&service, &patient, &tx);
        });

        AssessmentWorkerHandle {
            progress_rx: rx,
            _handle: handle,
        }
    }

    fn run_with_progress<M, A, L>(
        service: &AssessmentService<M, A, L>,
        patient: &PatientData,
        tx: &Sender<AssessmentProgress>,
    ) where
        M: RiskModel,
        A: AttributionExplainer,
        L: ExplanationModel,
    {
        let _ = tx.send(AssessmentProgress::Scaling);

        // Small delay so the UI can show the first phase.
        thread::sleep(std::time::Duration::from_millis(100));
        let _ = tx.send(AssessmentProgress::Predicting);

        thread::sleep(std::time::Duration::from_millis(50));
        // The chat-model call dominates; report the phase before blocking.
        let _ = tx.send(AssessmentProgress::Explaining);

        match service.assess(patient) {
            Ok(assessment) => {
                let _ = tx.send(AssessmentProgress::Complete(assessment));
            }
            Err(e) => {
                let _ = tx.send(AssessmentProgress::Error(e.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::artifacts::tests::test_artifacts;
    use crate::domain::{Attribution, PatientFeatures, RiskLabel};
    use crate::ports::ExplanationError;
    use std::time::Duration;

    struct SilentExplanation;

    impl ExplanationModel for SilentExplanation {
        fn summarize(
            &self,
            _label: RiskLabel,
            _probability: f64,
            _top: &[Attribution],
        ) -> Result<String, ExplanationError> {
            Ok("ok".to_string())
        }
    }

    #[test]
    fn test_worker_reports_phases_then_completes() {
        let artifacts = Arc::new(test_artifacts());
        let service = Arc::new(AssessmentService::new(
            artifacts.clone(),
            artifacts,
            Arc::new(SilentExplanation),
        ));
        let patient = PatientData::new(PatientFeatures::default());

        let worker = AssessmentWorker::spawn(service, patient);

        let mut updates = Vec::new();
        let deadline = std::time::Instant::now() + Duration::from_secs(10);
        while std::time::Instant::now() < deadline {
            if let Some(update) = worker.try_recv() {
                let done = matches!(
                    update,
                    AssessmentProgress::Complete(_) | AssessmentProgress::Error(_)
                );
                updates.push(update);
                if done {
                    break;
                }
            } else {
                thread::sleep(Duration::from_millis(10));
            }
        }

        assert!(matches!(updates.first(), Some(AssessmentProgress::Scaling)));
        assert!(matches!(
            updates.last(),
            Some(AssessmentProgress::Complete(_))
        ));
    }
}
