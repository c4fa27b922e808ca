// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Stage worker loop: dequeues a `ProcessingJob` from a named queue, runs
//! the stage's work (synchronous recognizer on a blocking thread, or an
//! async use case for research/export), persists its typed result, and
//! reports the outcome back to the orchestrator.

use crate::application::use_cases::{ArtifactUseCases, Orchestrator, ResearchUseCases};
use crate::infrastructure::metrics;
use classpipe_domain::entities::ExportFilter;
use classpipe_domain::repositories::{ProcessingJobRepository, StageResultRepository};
use classpipe_domain::services::{AsrConfig, AsrRecognizer, Diarizer, LlmAnalyzer, PostProcessor};
use classpipe_domain::value_objects::{ClassSessionId, StageKind};
use classpipe_domain::PipelineError;
use classpipe_bootstrap::shutdown::CancellationToken;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, info_span, Instrument};

/// Polling interval when a named queue has nothing to dequeue. Stage jobs
/// are produced by the orchestrator, not a push-based broker, so workers
/// poll rather than block on a channel.
const EMPTY_QUEUE_BACKOFF: Duration = Duration::from_millis(500);

pub struct StageWorker {
    queue: String,
    jobs: Arc<dyn ProcessingJobRepository>,
    stage_results: Arc<dyn StageResultRepository>,
    orchestrator: Arc<Orchestrator>,
    asr: Arc<dyn AsrRecognizer>,
    diarizer: Arc<dyn Diarizer>,
    post_processor: Arc<dyn PostProcessor>,
    llm: Arc<dyn LlmAnalyzer>,
    research: Arc<ResearchUseCases>,
    artifacts: Arc<ArtifactUseCases>,
    audio_dir: PathBuf,
}

pub struct StageWorkerDeps {
    pub jobs: Arc<dyn ProcessingJobRepository>,
    pub stage_results: Arc<dyn StageResultRepository>,
    pub orchestrator: Arc<Orchestrator>,
    pub asr: Arc<dyn AsrRecognizer>,
    pub diarizer: Arc<dyn Diarizer>,
    pub post_processor: Arc<dyn PostProcessor>,
    pub llm: Arc<dyn LlmAnalyzer>,
    pub research: Arc<ResearchUseCases>,
    pub artifacts: Arc<ArtifactUseCases>,
    pub audio_dir: PathBuf,
}

impl StageWorker {
    pub fn new(queue: impl Into<String>, deps: StageWorkerDeps) -> Self {
        Self {
            queue: queue.into(),
            jobs: deps.jobs,
            stage_results: deps.stage_results,
            orchestrator: deps.orchestrator,
            asr: deps.asr,
            diarizer: deps.diarizer,
            post_processor: deps.post_processor,
            llm: deps.llm,
            research: deps.research,
            artifacts: deps.artifacts,
            audio_dir: deps.audio_dir,
        }
    }

    pub async fn run(&self, cancel: CancellationToken) {
        loop {
            if cancel.is_cancelled() {
                info!(queue = %self.queue, "worker shutting down");
                return;
            }

            match self.jobs.dequeue(&self.queue).await {
                Ok(Some(job)) => {
                    if let Err(e) = self.run_one(job).await {
                        error!(queue = %self.queue, error = %e, "stage job failed");
                    }
                }
                Ok(None) => {
                    tokio::select! {
                        _ = tokio::time::sleep(EMPTY_QUEUE_BACKOFF) => {}
                        _ = cancel.cancelled() => return,
                    }
                }
                Err(e) => {
                    error!(queue = %self.queue, error = %e, "dequeue failed");
                    tokio::time::sleep(EMPTY_QUEUE_BACKOFF).await;
                }
            }
        }
    }

    async fn run_one(&self, mut job: classpipe_domain::entities::ProcessingJob) -> Result<(), PipelineError> {
        job.start()?;
        self.jobs.save(&job).await?;

        let class_session_id = job.class_session_id().clone();
        let stage = job.stage();
        let audio_path = self.audio_dir.join(format!("{class_session_id}.wav"));

        let span = info_span!("stage_worker", %class_session_id, ?stage);
        metrics::metrics().active_jobs.inc();
        let result = self.execute_stage(stage, &class_session_id, &audio_path).instrument(span).await;
        metrics::metrics().active_jobs.dec();

        match result {
            Ok(()) => {
                job.complete()?;
                self.jobs.save(&job).await?;
                metrics::metrics().stage_completions.with_label_values(&[stage_label(stage)]).inc();
                self.orchestrator.on_stage_completed(&class_session_id, stage).await?;
            }
            Err(e) => {
                metrics::metrics().stage_failures.with_label_values(&[stage_label(stage)]).inc();
                self.orchestrator.on_stage_failed(&class_session_id, job, e).await?;
            }
        }
        Ok(())
    }

    /// Runs the stage's work and persists its typed result before
    /// returning, so a result row existing implies the stage ran to
    /// completion (see `StageResultRepository`).
    async fn execute_stage(&self, stage: StageKind, class_session_id: &ClassSessionId, audio_path: &std::path::Path) -> Result<(), PipelineError> {
        match stage {
            StageKind::Asr => {
                let asr = self.asr.clone();
                let session_id = class_session_id.clone();
                let audio_path = audio_path.to_path_buf();
                let result = tokio::task::spawn_blocking(move || asr.transcribe(&session_id, &audio_path, &AsrConfig::default()))
                    .await
                    .map_err(|e| PipelineError::fatal(e.to_string()))??;
                self.stage_results.save_transcription(&result).await
            }
            StageKind::Diarization => {
                let diarizer = self.diarizer.clone();
                let session_id = class_session_id.clone();
                let audio_path = audio_path.to_path_buf();
                let result = tokio::task::spawn_blocking(move || diarizer.diarize(&session_id, &audio_path))
                    .await
                    .map_err(|e| PipelineError::fatal(e.to_string()))??;
                self.stage_results.save_diarization(&result).await
            }
            StageKind::Postprocess => {
                let transcription = self
                    .stage_results
                    .get_transcription(class_session_id)
                    .await?
                    .ok_or_else(|| PipelineError::invalid_state(format!("{class_session_id}: no transcription result to post-process")))?;
                let diarization = self
                    .stage_results
                    .get_diarization(class_session_id)
                    .await?
                    .ok_or_else(|| PipelineError::invalid_state(format!("{class_session_id}: no diarization result to post-process")))?;

                let post_processor = self.post_processor.clone();
                let session_id = class_session_id.clone();
                let result = tokio::task::spawn_blocking(move || post_processor.process(&session_id, &transcription, &diarization))
                    .await
                    .map_err(|e| PipelineError::fatal(e.to_string()))??;
                self.stage_results.save_post_processing(&result).await
            }
            StageKind::Nlp => {
                let post_processing = self
                    .stage_results
                    .get_post_processing(class_session_id)
                    .await?
                    .ok_or_else(|| PipelineError::invalid_state(format!("{class_session_id}: no post-processing result to analyze")))?;

                let llm = self.llm.clone();
                let session_id = class_session_id.clone();
                let cleaned_transcript = post_processing.cleaned_transcript.clone();
                let result = tokio::task::spawn_blocking(move || llm.analyze(&session_id, &cleaned_transcript))
                    .await
                    .map_err(|e| PipelineError::fatal(e.to_string()))??;
                self.stage_results.save_llm_analysis(&result).await
            }
            StageKind::Research => {
                let analysis = self
                    .stage_results
                    .get_llm_analysis(class_session_id)
                    .await?
                    .ok_or_else(|| PipelineError::invalid_state(format!("{class_session_id}: no LLM analysis to research")))?;
                let terms: Vec<String> = analysis.key_terms.iter().map(|t| t.term.clone()).collect();
                let results = self.research.research_terms(&terms).await?;
                self.stage_results.save_research_results(class_session_id, &results).await
            }
            StageKind::Export => {
                let analysis = self
                    .stage_results
                    .get_llm_analysis(class_session_id)
                    .await?
                    .ok_or_else(|| PipelineError::invalid_state(format!("{class_session_id}: no LLM analysis to export")))?;
                let result = self.artifacts.export_session(&analysis, ExportFilter::default()).await?;
                self.stage_results.save_export(&result).await
            }
        }
    }
}

fn stage_label(stage: StageKind) -> &'static str {
    match stage {
        StageKind::Asr => "asr",
        StageKind::Diarization => "diarization",
        StageKind::Postprocess => "postprocess",
        StageKind::Nlp => "nlp",
        StageKind::Research => "research",
        StageKind::Export => "export",
    }
}
