// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! In-memory repository fakes shared by the integration tests in this
//! directory. Exercising the orchestrator against fakes keeps these tests
//! fast and independent of a running sqlite file or object store.

use async_trait::async_trait;
use classpipe_domain::entities::{ClassSession, ProcessingJob};
use classpipe_domain::repositories::{ClassSessionRepository, ProcessingJobRepository};
use classpipe_domain::value_objects::{ClassSessionId, ProcessingJobId};
use classpipe_domain::PipelineError;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct InMemoryClassSessions {
    sessions: Mutex<HashMap<ClassSessionId, ClassSession>>,
}

#[async_trait]
impl ClassSessionRepository for InMemoryClassSessions {
    async fn save(&self, session: &ClassSession) -> Result<(), PipelineError> {
        self.sessions.lock().unwrap().insert(session.id().clone(), session.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ClassSessionId) -> Result<Option<ClassSession>, PipelineError> {
        Ok(self.sessions.lock().unwrap().get(id).cloned())
    }

    async fn delete(&self, id: &ClassSessionId) -> Result<(), PipelineError> {
        self.sessions.lock().unwrap().remove(id);
        Ok(())
    }
}

/// Dequeues in FIFO order within a queue name; doesn't model priority, since
/// none of these tests depend on ordering between jobs of different priority.
#[derive(Default)]
pub struct InMemoryJobs {
    jobs: Mutex<HashMap<ProcessingJobId, ProcessingJob>>,
    queues: Mutex<HashMap<String, Vec<ProcessingJobId>>>,
}

#[async_trait]
impl ProcessingJobRepository for InMemoryJobs {
    async fn save(&self, job: &ProcessingJob) -> Result<(), PipelineError> {
        let is_new = !self.jobs.lock().unwrap().contains_key(job.id());
        self.jobs.lock().unwrap().insert(job.id().clone(), job.clone());
        if is_new {
            self.queues.lock().unwrap().entry(queue_for(job).to_string()).or_default().push(job.id().clone());
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &ProcessingJobId) -> Result<Option<ProcessingJob>, PipelineError> {
        Ok(self.jobs.lock().unwrap().get(id).cloned())
    }

    async fn dequeue(&self, queue: &str) -> Result<Option<ProcessingJob>, PipelineError> {
        let mut queues = self.queues.lock().unwrap();
        let Some(ids) = queues.get_mut(queue) else { return Ok(None) };
        let jobs = self.jobs.lock().unwrap();
        let pos = ids.iter().position(|id| jobs.get(id).map(|j| matches!(j.state(), classpipe_domain::value_objects::ProcessingJobState::Queued)).unwrap_or(false));
        match pos {
            Some(idx) => {
                let id = ids.remove(idx);
                Ok(jobs.get(&id).cloned())
            }
            None => Ok(None),
        }
    }
}

/// All stages share one named queue in these tests, mirroring the single
/// `--queue default` worker used when no per-stage routing is configured.
fn queue_for(_job: &ProcessingJob) -> &'static str {
    "default"
}
