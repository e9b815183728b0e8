//! Upload lifecycle as a pure state machine.
//!
//! ```text
//! Idle ──Start──▶ Uploading ──Completed──▶ Succeeded
//!                     └──────Errored─────▶ Failed
//! Succeeded | Failed ──Start──────▶ Uploading
//! Succeeded | Failed ──Acknowledge──▶ Idle
//! ```
//!
//! [`step`] never performs I/O; it returns the next phase plus the effects
//! the caller must carry out.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{CandidateId, ResumeFile, UploadResponse};
use crate::presentation::{NotificationKind, Route};

pub const UPLOAD_SUCCEEDED_MESSAGE: &str = "Resume analyzed successfully!";

/// One user-initiated submission.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadJob {
    pub id: Uuid,
    pub file: ResumeFile,
    pub job_description: Option<String>,
    pub started_at: DateTime<Utc>,
}

impl UploadJob {
    /// Blank job descriptions are dropped.
    pub fn new(file: ResumeFile, job_description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            file,
            job_description: job_description.filter(|jd| !jd.trim().is_empty()),
            started_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum UploadPhase {
    #[default]
    Idle,
    Uploading {
        job: UploadJob,
    },
    Succeeded {
        job_id: Uuid,
        candidate_id: Option<CandidateId>,
    },
    Failed {
        job_id: Uuid,
        /// Opaque detail for logs; not shown to the user.
        error: String,
    },
}

impl UploadPhase {
    pub fn is_uploading(&self) -> bool {
        matches!(self, UploadPhase::Uploading { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UploadPhase::Succeeded { .. } | UploadPhase::Failed { .. }
        )
    }

    pub fn in_flight_job(&self) -> Option<&UploadJob> {
        match self {
            UploadPhase::Uploading { job } => Some(job),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            UploadPhase::Idle => "idle",
            UploadPhase::Uploading { .. } => "uploading",
            UploadPhase::Succeeded { .. } => "succeeded",
            UploadPhase::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    Start(UploadJob),
    Completed {
        job_id: Uuid,
        response: UploadResponse,
    },
    Errored {
        job_id: Uuid,
        /// Technical detail kept on the `Failed` phase.
        detail: String,
        /// Human-readable reason for the notification.
        message: String,
    },
    Acknowledge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Notify {
        kind: NotificationKind,
        message: String,
    },
    Navigate(Route),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub phase: UploadPhase,
    pub effects: Vec<Effect>,
    /// False when the event did not apply to the current phase.
    pub accepted: bool,
}

impl Transition {
    fn to(phase: UploadPhase, effects: Vec<Effect>) -> Self {
        Self {
            phase,
            effects,
            accepted: true,
        }
    }

    fn rejected(current: &UploadPhase) -> Self {
        Self {
            phase: current.clone(),
            effects: Vec::new(),
            accepted: false,
        }
    }
}

pub fn step(current: &UploadPhase, event: UploadEvent) -> Transition {
    match (current, event) {
        // one submission at a time
        (UploadPhase::Uploading { .. }, UploadEvent::Start(_)) => Transition::rejected(current),
        (_, UploadEvent::Start(job)) => Transition::to(UploadPhase::Uploading { job }, Vec::new()),

        (UploadPhase::Uploading { job }, UploadEvent::Completed { job_id, response })
            if job.id == job_id =>
        {
            let route = Route::for_candidate(response.candidate_id.clone());
            Transition::to(
                UploadPhase::Succeeded {
                    job_id,
                    candidate_id: response.candidate_id,
                },
                vec![
                    Effect::Notify {
                        kind: NotificationKind::Success,
                        message: UPLOAD_SUCCEEDED_MESSAGE.to_string(),
                    },
                    Effect::Navigate(route),
                ],
            )
        }

        (
            UploadPhase::Uploading { job },
            UploadEvent::Errored {
                job_id,
                detail,
                message,
            },
        ) if job.id == job_id => Transition::to(
            UploadPhase::Failed {
                job_id,
                error: detail,
            },
            vec![Effect::Notify {
                kind: NotificationKind::Error,
                message: format!("Upload failed: {message}"),
            }],
        ),

        (phase, UploadEvent::Acknowledge) if phase.is_terminal() => {
            Transition::to(UploadPhase::Idle, Vec::new())
        }

        _ => Transition::rejected(current),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> UploadJob {
        UploadJob::new(ResumeFile::new("cv.pdf", vec![1u8, 2, 3]), None)
    }

    fn uploading() -> (UploadPhase, Uuid) {
        let job = job();
        let id = job.id;
        (UploadPhase::Uploading { job }, id)
    }

    #[test]
    fn test_start_from_idle_enters_uploading() {
        let job = job();
        let t = step(&UploadPhase::Idle, UploadEvent::Start(job.clone()));
        assert!(t.accepted);
        assert_eq!(t.phase, UploadPhase::Uploading { job });
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_start_while_uploading_is_rejected() {
        let (phase, id) = uploading();
        let t = step(&phase, UploadEvent::Start(job()));
        assert!(!t.accepted);
        assert_eq!(t.phase.in_flight_job().map(|j| j.id), Some(id));
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_start_after_terminal_goes_straight_to_uploading() {
        let failed = UploadPhase::Failed {
            job_id: Uuid::new_v4(),
            error: "timeout".to_string(),
        };
        let t = step(&failed, UploadEvent::Start(job()));
        assert!(t.accepted);
        assert!(t.phase.is_uploading());
    }

    #[test]
    fn test_success_with_id_navigates_to_detail() {
        let (phase, id) = uploading();
        let t = step(
            &phase,
            UploadEvent::Completed {
                job_id: id,
                response: UploadResponse {
                    candidate_id: Some(CandidateId::Number(42)),
                },
            },
        );
        assert!(t.accepted);
        assert_eq!(
            t.phase,
            UploadPhase::Succeeded {
                job_id: id,
                candidate_id: Some(CandidateId::Number(42))
            }
        );
        assert_eq!(
            t.effects,
            vec![
                Effect::Notify {
                    kind: NotificationKind::Success,
                    message: UPLOAD_SUCCEEDED_MESSAGE.to_string()
                },
                Effect::Navigate(Route::CandidateDetail(CandidateId::Number(42))),
            ]
        );
    }

    #[test]
    fn test_success_without_id_navigates_to_list() {
        let (phase, id) = uploading();
        let t = step(
            &phase,
            UploadEvent::Completed {
                job_id: id,
                response: UploadResponse::default(),
            },
        );
        assert!(t.effects.contains(&Effect::Navigate(Route::CandidateList)));
        assert!(!t
            .effects
            .iter()
            .any(|e| matches!(e, Effect::Navigate(Route::CandidateDetail(_)))));
    }

    #[test]
    fn test_failure_notifies_without_navigation() {
        let (phase, id) = uploading();
        let t = step(
            &phase,
            UploadEvent::Errored {
                job_id: id,
                detail: "API error (status 500): boom".to_string(),
                message: "The analysis service ran into an error".to_string(),
            },
        );
        assert_eq!(
            t.phase,
            UploadPhase::Failed {
                job_id: id,
                error: "API error (status 500): boom".to_string()
            }
        );
        assert_eq!(
            t.effects,
            vec![Effect::Notify {
                kind: NotificationKind::Error,
                message: "Upload failed: The analysis service ran into an error".to_string()
            }]
        );
    }

    #[test]
    fn test_outcome_for_other_job_is_ignored() {
        let (phase, _) = uploading();
        let t = step(
            &phase,
            UploadEvent::Completed {
                job_id: Uuid::new_v4(),
                response: UploadResponse::default(),
            },
        );
        assert!(!t.accepted);
        assert_eq!(t.phase, phase);
    }

    #[test]
    fn test_outcome_when_idle_is_ignored() {
        let t = step(
            &UploadPhase::Idle,
            UploadEvent::Errored {
                job_id: Uuid::new_v4(),
                detail: String::new(),
                message: String::new(),
            },
        );
        assert!(!t.accepted);
        assert_eq!(t.phase, UploadPhase::Idle);
    }

    #[test]
    fn test_acknowledge_only_from_terminal() {
        let (phase, id) = uploading();
        assert!(!step(&phase, UploadEvent::Acknowledge).accepted);
        assert!(!step(&UploadPhase::Idle, UploadEvent::Acknowledge).accepted);

        let done = UploadPhase::Succeeded {
            job_id: id,
            candidate_id: None,
        };
        let t = step(&done, UploadEvent::Acknowledge);
        assert!(t.accepted);
        assert_eq!(t.phase, UploadPhase::Idle);
    }

    #[test]
    fn test_blank_job_description_is_dropped() {
        let file = ResumeFile::new("cv.pdf", vec![1u8]);
        assert_eq!(
            UploadJob::new(file.clone(), Some("  \n".to_string())).job_description,
            None
        );
        assert_eq!(
            UploadJob::new(file, Some("Rust dev".to_string())).job_description,
            Some("Rust dev".to_string())
        );
    }
}
