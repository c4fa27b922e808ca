// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Persistence contracts. Infrastructure provides the sqlx-backed
//! implementations; the domain only depends on these traits.

use crate::entities::{
    ClassSession, DiarizationResult, ExportResult, LlmAnalysisResult, PostProcessingResult, ProcessingJob, ResearchResult, SourceCacheEntry,
    TranscriptionResult, UploadSession,
};
use crate::value_objects::{CacheKey, ClassSessionId, ProcessingJobId, StageKind, UploadSessionId};
use crate::PipelineError;
use async_trait::async_trait;

#[async_trait]
pub trait ClassSessionRepository: Send + Sync {
    async fn save(&self, session: &ClassSession) -> Result<(), PipelineError>;
    async fn find_by_id(&self, id: &ClassSessionId) -> Result<Option<ClassSession>, PipelineError>;
    async fn delete(&self, id: &ClassSessionId) -> Result<(), PipelineError>;
}

#[async_trait]
pub trait UploadSessionRepository: Send + Sync {
    async fn save(&self, session: &UploadSession) -> Result<(), PipelineError>;
    async fn find_by_id(&self, id: &UploadSessionId) -> Result<Option<UploadSession>, PipelineError>;

    /// Enforces the at-most-one-active-upload-session invariant per class
    /// session by returning any non-terminal session, if one exists.
    async fn find_active_for_class_session(&self, class_session_id: &ClassSessionId) -> Result<Option<UploadSession>, PipelineError>;
}

#[async_trait]
pub trait ProcessingJobRepository: Send + Sync {
    async fn save(&self, job: &ProcessingJob) -> Result<(), PipelineError>;
    async fn find_by_id(&self, id: &ProcessingJobId) -> Result<Option<ProcessingJob>, PipelineError>;

    /// Pops the next eligible job off a named queue (processing, export,
    /// notion, default), honoring advisory priority ordering.
    async fn dequeue(&self, queue: &str) -> Result<Option<ProcessingJob>, PipelineError>;
}

#[async_trait]
pub trait ResearchCacheRepository: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<SourceCacheEntry>, PipelineError>;
    async fn put(&self, entry: &SourceCacheEntry) -> Result<(), PipelineError>;
    async fn touch(&self, key: &CacheKey) -> Result<(), PipelineError>;

    /// Evicts every entry whose TTL has lapsed. Returns the count removed.
    async fn evict_expired(&self) -> Result<u64, PipelineError>;
}

/// Typed stage-result rows, one per (class session, stage). A stage worker
/// persists the row produced by its stage before marking the job complete,
/// so that a row existing for a given stage is equivalent to the class
/// session having passed through that stage at least once successfully.
#[async_trait]
pub trait StageResultRepository: Send + Sync {
    async fn save_transcription(&self, result: &TranscriptionResult) -> Result<(), PipelineError>;
    async fn get_transcription(&self, class_session_id: &ClassSessionId) -> Result<Option<TranscriptionResult>, PipelineError>;

    async fn save_diarization(&self, result: &DiarizationResult) -> Result<(), PipelineError>;
    async fn get_diarization(&self, class_session_id: &ClassSessionId) -> Result<Option<DiarizationResult>, PipelineError>;

    async fn save_post_processing(&self, result: &PostProcessingResult) -> Result<(), PipelineError>;
    async fn get_post_processing(&self, class_session_id: &ClassSessionId) -> Result<Option<PostProcessingResult>, PipelineError>;

    async fn save_llm_analysis(&self, result: &LlmAnalysisResult) -> Result<(), PipelineError>;
    async fn get_llm_analysis(&self, class_session_id: &ClassSessionId) -> Result<Option<LlmAnalysisResult>, PipelineError>;

    async fn save_research_results(&self, class_session_id: &ClassSessionId, results: &[ResearchResult]) -> Result<(), PipelineError>;
    async fn get_research_results(&self, class_session_id: &ClassSessionId) -> Result<Option<Vec<ResearchResult>>, PipelineError>;

    async fn save_export(&self, result: &ExportResult) -> Result<(), PipelineError>;
    async fn get_export(&self, class_session_id: &ClassSessionId) -> Result<Option<ExportResult>, PipelineError>;

    /// Testable property: a row for (session, stage) exists iff the session
    /// has been through `stage` at least once successfully.
    async fn has_result(&self, class_session_id: &ClassSessionId, stage: StageKind) -> Result<bool, PipelineError>;
}
