// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Domain events raised by the orchestrator as a class session advances.
//! Infrastructure subscribes to these for logging, metrics, and webhooks.

use crate::value_objects::{ClassSessionId, ProcessingJobId, StageKind};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub enum PipelineEvent {
    JobCreated {
        job_id: ProcessingJobId,
        class_session_id: ClassSessionId,
        stage: StageKind,
        at: DateTime<Utc>,
    },
    StageCompleted {
        class_session_id: ClassSessionId,
        stage: StageKind,
        at: DateTime<Utc>,
    },
    StageFailed {
        class_session_id: ClassSessionId,
        stage: StageKind,
        error: String,
        at: DateTime<Utc>,
    },
    JobCancelled {
        job_id: ProcessingJobId,
        at: DateTime<Utc>,
    },
}

impl PipelineEvent {
    pub fn class_session_id(&self) -> Option<&ClassSessionId> {
        match self {
            PipelineEvent::JobCreated { class_session_id, .. } => Some(class_session_id),
            PipelineEvent::StageCompleted { class_session_id, .. } => Some(class_session_id),
            PipelineEvent::StageFailed { class_session_id, .. } => Some(class_session_id),
            PipelineEvent::JobCancelled { .. } => None,
        }
    }
}
