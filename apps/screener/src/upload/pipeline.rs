use std::sync::{Arc, Weak};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api_client::ResumeUploader;
use crate::errors::ClientError;
use crate::models::{CandidateId, ResumeFile, UploadResponse};
use crate::presentation::{Navigator, Notifier, Route};
use crate::upload::machine::{step, Effect, UploadEvent, UploadJob, UploadPhase};

/// Resolved result of one upload job.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Succeeded {
        candidate_id: Option<CandidateId>,
        route: Route,
    },
    Failed {
        error: String,
    },
}

/// Result of [`UploadPipeline::start_upload`].
#[derive(Debug)]
pub enum StartUpload {
    Started(UploadHandle),
    /// Another job was already in flight; nothing was submitted.
    Rejected,
}

/// Handle on a spawned upload.
#[derive(Debug)]
pub struct UploadHandle {
    job_id: Uuid,
    task: JoinHandle<Option<UploadOutcome>>,
}

impl UploadHandle {
    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    /// Waits for the job to resolve. `None` if the pipeline was dropped
    /// before the service answered.
    pub async fn outcome(self) -> Option<UploadOutcome> {
        self.task.await.ok().flatten()
    }
}

struct Inner {
    phase: watch::Sender<UploadPhase>,
    uploader: Arc<dyn ResumeUploader>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl Inner {
    /// Applies `event` atomically; returns the phase it produced and the
    /// effects if it was accepted.
    fn apply(&self, event: UploadEvent) -> Option<(UploadPhase, Vec<Effect>)> {
        let mut applied = None;
        self.phase.send_if_modified(|phase| {
            let transition = step(phase, event);
            if !transition.accepted {
                return false;
            }
            *phase = transition.phase.clone();
            applied = Some((transition.phase, transition.effects));
            true
        });
        applied
    }

    fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Notify { kind, message } => self.notifier.notify(kind, &message),
                Effect::Navigate(route) => {
                    info!("Navigating to {route}");
                    self.navigator.navigate(route);
                }
            }
        }
    }

}

/// Outcome carried by a terminal phase.
fn outcome_of(phase: &UploadPhase) -> Option<UploadOutcome> {
    match phase {
        UploadPhase::Succeeded { candidate_id, .. } => Some(UploadOutcome::Succeeded {
            candidate_id: candidate_id.clone(),
            route: Route::for_candidate(candidate_id.clone()),
        }),
        UploadPhase::Failed { error, .. } => Some(UploadOutcome::Failed {
            error: error.clone(),
        }),
        _ => None,
    }
}

/// Drives resume submissions through the upload state machine.
///
/// Must be used from within a Tokio runtime. Clones share the same job.
#[derive(Clone)]
pub struct UploadPipeline {
    inner: Arc<Inner>,
}

impl UploadPipeline {
    pub fn new(
        uploader: Arc<dyn ResumeUploader>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let (phase, _) = watch::channel(UploadPhase::Idle);
        Self {
            inner: Arc::new(Inner {
                phase,
                uploader,
                notifier,
                navigator,
            }),
        }
    }

    pub fn phase(&self) -> UploadPhase {
        self.inner.phase.borrow().clone()
    }

    /// Phase updates; entering `Uploading` is the "upload started" signal.
    pub fn subscribe(&self) -> watch::Receiver<UploadPhase> {
        self.inner.phase.subscribe()
    }

    /// Submits `file` unless a job is already in flight.
    ///
    /// The file type is assumed to have been checked by the picker. The
    /// request runs on a spawned task; it is not retried on failure.
    pub fn start_upload(
        &self,
        file: ResumeFile,
        job_description: Option<String>,
    ) -> StartUpload {
        let job = UploadJob::new(file, job_description);
        let job_id = job.id;

        let Some((_, effects)) = self.inner.apply(UploadEvent::Start(job.clone())) else {
            warn!(%job_id, file = %job.file.file_name, "Upload already in progress; ignoring");
            return StartUpload::Rejected;
        };
        self.inner.run(effects);
        info!(%job_id, file = %job.file.file_name, "Upload started");

        let uploader = self.inner.uploader.clone();
        let pipeline = Arc::downgrade(&self.inner);
        let task = tokio::spawn(async move {
            let result = uploader
                .upload(&job.file, job.job_description.as_deref())
                .await;
            resolve(pipeline, job_id, result)
        });

        StartUpload::Started(UploadHandle { job_id, task })
    }

    /// Discards a finished job and returns to `Idle`. No-op while uploading.
    pub fn acknowledge(&self) -> bool {
        match self.inner.apply(UploadEvent::Acknowledge) {
            Some((_, effects)) => {
                self.inner.run(effects);
                true
            }
            None => false,
        }
    }
}

fn resolve(
    pipeline: Weak<Inner>,
    job_id: Uuid,
    result: Result<UploadResponse, ClientError>,
) -> Option<UploadOutcome> {
    let Some(inner) = pipeline.upgrade() else {
        debug!(%job_id, "Pipeline dropped before the upload resolved; discarding outcome");
        return None;
    };

    let event = match result {
        Ok(response) => {
            info!(%job_id, candidate_id = ?response.candidate_id, "Upload succeeded");
            UploadEvent::Completed { job_id, response }
        }
        Err(e) => {
            warn!(%job_id, "Upload failed: {e}");
            UploadEvent::Errored {
                job_id,
                message: e.user_message(),
                detail: e.to_string(),
            }
        }
    };

    // effects may start the next job, so the outcome comes from this transition
    let (phase, effects) = inner.apply(event)?;
    let outcome = outcome_of(&phase);
    inner.run(effects);
    outcome
}
