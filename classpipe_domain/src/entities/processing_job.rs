// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The unit of work a stage worker dequeues and executes.

use crate::value_objects::{ClassSessionId, JobPriority, ProcessingJobId, ProcessingJobState, RequestedKind, StageKind};
use crate::PipelineError;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProcessingJob {
    id: ProcessingJobId,
    class_session_id: ClassSessionId,
    stage: StageKind,
    requested_kind: RequestedKind,
    priority: JobPriority,
    state: ProcessingJobState,
    progress_pct: f64,
    retry_count: u32,
    max_retries: u32,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

impl ProcessingJob {
    pub fn new(class_session_id: ClassSessionId, stage: StageKind, requested_kind: RequestedKind, priority: JobPriority) -> Self {
        Self {
            id: ProcessingJobId::new(),
            class_session_id,
            stage,
            requested_kind,
            priority,
            state: ProcessingJobState::Queued,
            progress_pct: 0.0,
            retry_count: 0,
            max_retries: 3,
            created_at: Utc::now(),
            started_at: None,
            last_error: None,
        }
    }

    pub fn id(&self) -> &ProcessingJobId {
        &self.id
    }

    pub fn class_session_id(&self) -> &ClassSessionId {
        &self.class_session_id
    }

    pub fn stage(&self) -> StageKind {
        self.stage
    }

    pub fn priority(&self) -> JobPriority {
        self.priority
    }

    pub fn state(&self) -> ProcessingJobState {
        self.state
    }

    pub fn start(&mut self) -> Result<(), PipelineError> {
        if self.state != ProcessingJobState::Queued {
            return Err(PipelineError::invalid_state(format!(
                "cannot start job in state {:?}",
                self.state
            )));
        }
        self.state = ProcessingJobState::Running;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    pub fn update_progress(&mut self, pct: f64) {
        self.progress_pct = pct.clamp(0.0, 100.0);
    }

    pub fn complete(&mut self) -> Result<(), PipelineError> {
        if self.state != ProcessingJobState::Running {
            return Err(PipelineError::invalid_state("job must be running to complete"));
        }
        self.state = ProcessingJobState::Completed;
        self.progress_pct = 100.0;
        Ok(())
    }

    /// Records a failure. Returns `true` if the job was requeued for retry,
    /// `false` if the retry budget was exhausted and the job is now failed.
    pub fn fail(&mut self, error: impl Into<String>, recoverable: bool) -> bool {
        self.last_error = Some(error.into());
        if recoverable && self.retry_count < self.max_retries {
            self.retry_count += 1;
            self.state = ProcessingJobState::Queued;
            true
        } else {
            self.state = ProcessingJobState::Failed;
            false
        }
    }

    pub fn cancel(&mut self) {
        self.state = ProcessingJobState::Cancelled;
    }

    /// Linear extrapolation from elapsed time and current progress.
    pub fn estimated_remaining_seconds(&self, now: DateTime<Utc>) -> Option<f64> {
        let started = self.started_at?;
        if self.progress_pct <= 0.0 {
            return None;
        }
        let elapsed_sec = (now - started).num_milliseconds() as f64 / 1000.0;
        let total_estimated = elapsed_sec / (self.progress_pct / 100.0);
        Some((total_estimated - elapsed_sec).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_budget_exhausts_into_failed() {
        let mut job = ProcessingJob::new(ClassSessionId::new(), StageKind::Asr, RequestedKind::Full, JobPriority::Normal);
        job.start().unwrap();
        for _ in 0..3 {
            assert!(job.fail("transient", true));
            job.start().unwrap();
        }
        assert!(!job.fail("transient", true));
        assert_eq!(job.state(), ProcessingJobState::Failed);
    }

    #[test]
    fn non_recoverable_failure_skips_retry() {
        let mut job = ProcessingJob::new(ClassSessionId::new(), StageKind::Asr, RequestedKind::Full, JobPriority::Normal);
        job.start().unwrap();
        assert!(!job.fail("fatal", false));
        assert_eq!(job.state(), ProcessingJobState::Failed);
    }

    #[test]
    fn cannot_complete_a_job_that_never_started() {
        let mut job = ProcessingJob::new(ClassSessionId::new(), StageKind::Asr, RequestedKind::Full, JobPriority::Normal);
        assert!(job.complete().is_err());
    }
}
