// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Drives a class session through its stages, enqueuing the next
//! `ProcessingJob` and reacting to stage completion, failure, cancellation,
//! and targeted reprocessing.

use classpipe_domain::entities::ProcessingJob;
use classpipe_domain::events::PipelineEvent;
use classpipe_domain::repositories::{ClassSessionRepository, ProcessingJobRepository};
use classpipe_domain::value_objects::{ClassSessionId, JobPriority, ProcessingJobId, RequestedKind, StageKind};
use classpipe_domain::PipelineError;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

pub struct Orchestrator {
    class_sessions: Arc<dyn ClassSessionRepository>,
    jobs: Arc<dyn ProcessingJobRepository>,
}

impl Orchestrator {
    pub fn new(class_sessions: Arc<dyn ClassSessionRepository>, jobs: Arc<dyn ProcessingJobRepository>) -> Self {
        Self { class_sessions, jobs }
    }

    /// Moves a freshly uploaded (or previously failed) class session into
    /// `Asr` and enqueues its first stage job.
    pub async fn start(&self, class_session_id: &ClassSessionId) -> Result<ProcessingJobId, PipelineError> {
        let mut session = self
            .class_sessions
            .find_by_id(class_session_id)
            .await?
            .ok_or_else(|| PipelineError::not_found(format!("class session {class_session_id}")))?;
        session.begin_processing()?;
        self.class_sessions.save(&session).await?;
        self.enqueue(class_session_id, StageKind::Asr, RequestedKind::Full, JobPriority::Normal).await
    }

    async fn enqueue(
        &self,
        class_session_id: &ClassSessionId,
        stage: StageKind,
        requested_kind: RequestedKind,
        priority: JobPriority,
    ) -> Result<ProcessingJobId, PipelineError> {
        let job = ProcessingJob::new(class_session_id.clone(), stage, requested_kind, priority);
        let job_id = job.id().clone();
        self.jobs.save(&job).await?;
        info!(%class_session_id, ?stage, %job_id, "enqueued stage job");
        Ok(job_id)
    }

    /// Called by a stage worker once it finishes: advances the session and
    /// enqueues the next stage, or leaves it `Done` after export.
    pub async fn on_stage_completed(&self, class_session_id: &ClassSessionId, stage: StageKind) -> Result<Option<ProcessingJobId>, PipelineError> {
        let mut session = self
            .class_sessions
            .find_by_id(class_session_id)
            .await?
            .ok_or_else(|| PipelineError::not_found(format!("class session {class_session_id}")))?;

        session.advance_past(stage)?;
        self.class_sessions.save(&session).await?;

        let next_job = match next_stage(stage) {
            Some(next) => Some(self.enqueue(class_session_id, next, RequestedKind::Full, JobPriority::Normal).await?),
            None => None,
        };
        Ok(next_job)
    }

    /// Called by a stage worker on failure. Requeues the job up to its
    /// retry budget; otherwise marks the class session as errored.
    pub async fn on_stage_failed(&self, class_session_id: &ClassSessionId, mut job: ProcessingJob, error: PipelineError) -> Result<(), PipelineError> {
        let requeued = job.fail(error.to_string(), error.is_recoverable());
        self.jobs.save(&job).await?;

        if !requeued {
            if let Some(mut session) = self.class_sessions.find_by_id(class_session_id).await? {
                session.mark_error(error.to_string());
                self.class_sessions.save(&session).await?;
            }
            warn!(%class_session_id, stage = ?job.stage(), %error, "stage failed, retries exhausted");
        }
        Ok(())
    }

    pub async fn cancel(&self, job_id: &ProcessingJobId) -> Result<(), PipelineError> {
        let mut job = self
            .jobs
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| PipelineError::not_found(format!("processing job {job_id}")))?;
        job.cancel();
        self.jobs.save(&job).await?;
        let _ = PipelineEvent::JobCancelled { job_id: job_id.clone(), at: Utc::now() };
        Ok(())
    }

    /// Rewinds a class session to the given stage and enqueues a fresh job
    /// for it, without touching stages that already ran successfully.
    pub async fn reprocess_from(&self, class_session_id: &ClassSessionId, stage: StageKind) -> Result<ProcessingJobId, PipelineError> {
        let mut session = self
            .class_sessions
            .find_by_id(class_session_id)
            .await?
            .ok_or_else(|| PipelineError::not_found(format!("class session {class_session_id}")))?;

        session.reprocess_from(stage)?;
        self.class_sessions.save(&session).await?;

        self.enqueue(class_session_id, stage, RequestedKind::ReprocessFrom(stage.into()), JobPriority::High).await
    }
}

fn next_stage(completed: StageKind) -> Option<StageKind> {
    match completed {
        StageKind::Asr => Some(StageKind::Diarization),
        StageKind::Diarization => Some(StageKind::Postprocess),
        StageKind::Postprocess => Some(StageKind::Nlp),
        StageKind::Nlp => Some(StageKind::Research),
        StageKind::Research => Some(StageKind::Export),
        StageKind::Export => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_stage_chain_ends_after_export() {
        assert_eq!(next_stage(StageKind::Asr), Some(StageKind::Diarization));
        assert_eq!(next_stage(StageKind::Export), None);
    }
}
