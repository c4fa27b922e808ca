// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

mod common;

use classpipe::application::use_cases::Orchestrator;
use classpipe_domain::entities::ClassSession;
use classpipe_domain::value_objects::{ClassSessionState, StageKind};
use common::{InMemoryClassSessions, InMemoryJobs};
use std::sync::Arc;

fn new_orchestrator() -> (Orchestrator, Arc<InMemoryClassSessions>, Arc<InMemoryJobs>) {
    let sessions = Arc::new(InMemoryClassSessions::default());
    let jobs = Arc::new(InMemoryJobs::default());
    (Orchestrator::new(sessions.clone(), jobs.clone()), sessions, jobs)
}

#[tokio::test]
async fn start_moves_a_fresh_session_into_asr_and_enqueues_its_job() {
    let (orchestrator, sessions, jobs) = new_orchestrator();
    let session = ClassSession::new("Cardiology Lecture 3");
    let session_id = session.id().clone();
    sessions.save(&session).await.unwrap();

    let job_id = orchestrator.start(&session_id).await.unwrap();

    let stored = sessions.find_by_id(&session_id).await.unwrap().unwrap();
    assert_eq!(stored.state(), ClassSessionState::Asr);

    let job = jobs.find_by_id(&job_id).await.unwrap().unwrap();
    assert_eq!(job.stage(), StageKind::Asr);
}

#[tokio::test]
async fn a_session_walks_every_stage_to_done() {
    let (orchestrator, sessions, _jobs) = new_orchestrator();
    let session = ClassSession::new("Nephrology Lecture 1");
    let session_id = session.id().clone();
    sessions.save(&session).await.unwrap();

    orchestrator.start(&session_id).await.unwrap();

    for stage in [
        StageKind::Asr,
        StageKind::Diarization,
        StageKind::Postprocess,
        StageKind::Nlp,
        StageKind::Research,
        StageKind::Export,
    ] {
        orchestrator.on_stage_completed(&session_id, stage).await.unwrap();
    }

    let stored = sessions.find_by_id(&session_id).await.unwrap().unwrap();
    assert_eq!(stored.state(), ClassSessionState::Done);
}

#[tokio::test]
async fn on_stage_completed_enqueues_the_following_stage() {
    let (orchestrator, sessions, jobs) = new_orchestrator();
    let session = ClassSession::new("x");
    let session_id = session.id().clone();
    sessions.save(&session).await.unwrap();
    orchestrator.start(&session_id).await.unwrap();

    let next_job_id = orchestrator.on_stage_completed(&session_id, StageKind::Asr).await.unwrap();
    let next_job_id = next_job_id.expect("diarization job should be enqueued after asr");
    let job = jobs.find_by_id(&next_job_id).await.unwrap().unwrap();
    assert_eq!(job.stage(), StageKind::Diarization);
}

#[tokio::test]
async fn on_stage_completed_after_export_enqueues_nothing() {
    let (orchestrator, sessions, _jobs) = new_orchestrator();
    let session = ClassSession::new("x");
    let session_id = session.id().clone();
    sessions.save(&session).await.unwrap();
    orchestrator.start(&session_id).await.unwrap();

    for stage in [StageKind::Asr, StageKind::Diarization, StageKind::Postprocess, StageKind::Nlp, StageKind::Research] {
        orchestrator.on_stage_completed(&session_id, stage).await.unwrap();
    }
    let after_export = orchestrator.on_stage_completed(&session_id, StageKind::Export).await.unwrap();
    assert!(after_export.is_none());
}

#[tokio::test]
async fn reprocess_from_rejects_a_stage_ahead_of_the_current_one() {
    let (orchestrator, sessions, _jobs) = new_orchestrator();
    let session = ClassSession::new("x");
    let session_id = session.id().clone();
    sessions.save(&session).await.unwrap();
    orchestrator.start(&session_id).await.unwrap();

    assert!(orchestrator.reprocess_from(&session_id, StageKind::Export).await.is_err());
}

#[tokio::test]
async fn reprocess_from_rewinds_a_completed_stage_and_enqueues_it() {
    let (orchestrator, sessions, jobs) = new_orchestrator();
    let session = ClassSession::new("x");
    let session_id = session.id().clone();
    sessions.save(&session).await.unwrap();
    orchestrator.start(&session_id).await.unwrap();
    orchestrator.on_stage_completed(&session_id, StageKind::Asr).await.unwrap();
    orchestrator.on_stage_completed(&session_id, StageKind::Diarization).await.unwrap();

    let job_id = orchestrator.reprocess_from(&session_id, StageKind::Diarization).await.unwrap();

    let stored = sessions.find_by_id(&session_id).await.unwrap().unwrap();
    assert_eq!(stored.state(), ClassSessionState::Diarization);
    let job = jobs.find_by_id(&job_id).await.unwrap().unwrap();
    assert_eq!(job.stage(), StageKind::Diarization);
}

#[tokio::test]
async fn start_on_a_previously_errored_session_restarts_from_asr() {
    let (orchestrator, sessions, _jobs) = new_orchestrator();
    let mut session = ClassSession::new("x");
    session.mark_error("asr crashed");
    let session_id = session.id().clone();
    sessions.save(&session).await.unwrap();

    orchestrator.start(&session_id).await.unwrap();

    let stored = sessions.find_by_id(&session_id).await.unwrap().unwrap();
    assert_eq!(stored.state(), ClassSessionState::Asr);
}
