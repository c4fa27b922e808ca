// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! sqlx/SQLite implementations of the domain repository ports. Entities
//! round-trip as JSON documents; the indexed columns alongside them exist
//! so the queue and cache-expiry queries don't need to deserialize every row.
//!
//! The processing-job queue (named queues: processing, export, notion,
//! default, per the external interface contract) is implemented on top of
//! this same database rather than a separate broker, since dequeue ordering
//! only needs to be consistent within one SQLite file.

use async_trait::async_trait;
use classpipe_domain::entities::{
    ClassSession, DiarizationResult, ExportResult, LlmAnalysisResult, PostProcessingResult, ProcessingJob, ResearchResult, SourceCacheEntry,
    TranscriptionResult, UploadSession,
};
use classpipe_domain::repositories::{
    ClassSessionRepository, ProcessingJobRepository, ResearchCacheRepository, StageResultRepository, UploadSessionRepository,
};
use classpipe_domain::value_objects::{CacheKey, ClassSessionId, ProcessingJobId, StageKind, UploadSessionId};
use classpipe_domain::PipelineError;
use sqlx::{Row, SqlitePool};

pub struct SqliteClassSessionRepository {
    pool: SqlitePool,
}

impl SqliteClassSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClassSessionRepository for SqliteClassSessionRepository {
    async fn save(&self, session: &ClassSession) -> Result<(), PipelineError> {
        let document = serde_json::to_string(session).map_err(PipelineError::from)?;
        sqlx::query("INSERT INTO class_sessions (id, state, document, updated_at) VALUES (?1, ?2, ?3, datetime('now')) \
                     ON CONFLICT(id) DO UPDATE SET state = excluded.state, document = excluded.document, updated_at = excluded.updated_at")
            .bind(session.id().to_string())
            .bind(format!("{:?}", session.state()))
            .bind(document)
            .execute(&self.pool)
            .await
            .map_err(|e| PipelineError::transient(e.to_string()))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &ClassSessionId) -> Result<Option<ClassSession>, PipelineError> {
        let row = sqlx::query("SELECT document FROM class_sessions WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PipelineError::transient(e.to_string()))?;

        row.map(|row| {
            let document: String = row.get("document");
            serde_json::from_str(&document).map_err(PipelineError::from)
        })
        .transpose()
    }

    async fn delete(&self, id: &ClassSessionId) -> Result<(), PipelineError> {
        sqlx::query("DELETE FROM class_sessions WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| PipelineError::transient(e.to_string()))?;
        Ok(())
    }
}

pub struct SqliteUploadSessionRepository {
    pool: SqlitePool,
}

impl SqliteUploadSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UploadSessionRepository for SqliteUploadSessionRepository {
    async fn save(&self, session: &UploadSession) -> Result<(), PipelineError> {
        let document = serde_json::to_string(session).map_err(PipelineError::from)?;
        sqlx::query("INSERT INTO upload_sessions (id, class_session_id, state, document) VALUES (?1, ?2, ?3, ?4) \
                     ON CONFLICT(id) DO UPDATE SET state = excluded.state, document = excluded.document")
            .bind(session.id().to_string())
            .bind(session.class_session_id().to_string())
            .bind(format!("{:?}", session.state()))
            .bind(document)
            .execute(&self.pool)
            .await
            .map_err(|e| PipelineError::transient(e.to_string()))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &UploadSessionId) -> Result<Option<UploadSession>, PipelineError> {
        let row = sqlx::query("SELECT document FROM upload_sessions WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PipelineError::transient(e.to_string()))?;

        row.map(|row| {
            let document: String = row.get("document");
            serde_json::from_str(&document).map_err(PipelineError::from)
        })
        .transpose()
    }

    async fn find_active_for_class_session(&self, class_session_id: &ClassSessionId) -> Result<Option<UploadSession>, PipelineError> {
        let row = sqlx::query(
            "SELECT document FROM upload_sessions WHERE class_session_id = ?1 \
             AND state NOT IN ('Completed', 'Failed', 'Expired', 'Cancelled') LIMIT 1",
        )
        .bind(class_session_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PipelineError::transient(e.to_string()))?;

        row.map(|row| {
            let document: String = row.get("document");
            serde_json::from_str(&document).map_err(PipelineError::from)
        })
        .transpose()
    }
}

pub struct SqliteProcessingJobRepository {
    pool: SqlitePool,
}

impl SqliteProcessingJobRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProcessingJobRepository for SqliteProcessingJobRepository {
    async fn save(&self, job: &ProcessingJob) -> Result<(), PipelineError> {
        let document = serde_json::to_string(job).map_err(PipelineError::from)?;
        let queue = queue_for_stage(job.stage());
        sqlx::query(
            "INSERT INTO processing_jobs (id, class_session_id, queue, state, priority, created_at, document) \
             VALUES (?1, ?2, ?3, ?4, ?5, datetime('now'), ?6) \
             ON CONFLICT(id) DO UPDATE SET state = excluded.state, document = excluded.document",
        )
        .bind(job.id().to_string())
        .bind(job.class_session_id().to_string())
        .bind(queue)
        .bind(format!("{:?}", job.state()))
        .bind(job.priority() as i64)
        .bind(document)
        .execute(&self.pool)
        .await
        .map_err(|e| PipelineError::transient(e.to_string()))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &ProcessingJobId) -> Result<Option<ProcessingJob>, PipelineError> {
        let row = sqlx::query("SELECT document FROM processing_jobs WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PipelineError::transient(e.to_string()))?;

        row.map(|row| {
            let document: String = row.get("document");
            serde_json::from_str(&document).map_err(PipelineError::from)
        })
        .transpose()
    }

    async fn dequeue(&self, queue: &str) -> Result<Option<ProcessingJob>, PipelineError> {
        let row = sqlx::query(
            "SELECT id, document FROM processing_jobs WHERE queue = ?1 AND state = 'Queued' \
             ORDER BY priority DESC, created_at ASC LIMIT 1",
        )
        .bind(queue)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PipelineError::transient(e.to_string()))?;

        row.map(|row| {
            let document: String = row.get("document");
            serde_json::from_str(&document).map_err(PipelineError::from)
        })
        .transpose()
    }
}

fn queue_for_stage(stage: classpipe_domain::value_objects::StageKind) -> &'static str {
    use classpipe_domain::value_objects::StageKind;
    match stage {
        StageKind::Export => "export",
        StageKind::Research => "notion",
        _ => "processing",
    }
}

pub struct SqliteResearchCacheRepository {
    pool: SqlitePool,
}

impl SqliteResearchCacheRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResearchCacheRepository for SqliteResearchCacheRepository {
    async fn get(&self, key: &CacheKey) -> Result<Option<SourceCacheEntry>, PipelineError> {
        let row = sqlx::query("SELECT document FROM source_cache_entries WHERE cache_key = ?1")
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PipelineError::transient(e.to_string()))?;

        row.map(|row| {
            let document: String = row.get("document");
            serde_json::from_str(&document).map_err(PipelineError::from)
        })
        .transpose()
    }

    async fn put(&self, entry: &SourceCacheEntry) -> Result<(), PipelineError> {
        let document = serde_json::to_string(entry).map_err(PipelineError::from)?;
        sqlx::query(
            "INSERT INTO source_cache_entries (cache_key, expires_at, document) VALUES (?1, ?2, ?3) \
             ON CONFLICT(cache_key) DO UPDATE SET expires_at = excluded.expires_at, document = excluded.document",
        )
        .bind(entry.cache_key.as_str())
        .bind(entry.expires_at.to_rfc3339())
        .bind(document)
        .execute(&self.pool)
        .await
        .map_err(|e| PipelineError::transient(e.to_string()))?;
        Ok(())
    }

    async fn touch(&self, key: &CacheKey) -> Result<(), PipelineError> {
        if let Some(mut entry) = self.get(key).await? {
            entry.touch(chrono::Utc::now());
            self.put(&entry).await?;
        }
        Ok(())
    }

    async fn evict_expired(&self) -> Result<u64, PipelineError> {
        let result = sqlx::query("DELETE FROM source_cache_entries WHERE expires_at < datetime('now')")
            .execute(&self.pool)
            .await
            .map_err(|e| PipelineError::transient(e.to_string()))?;
        Ok(result.rows_affected())
    }
}

fn stage_label(stage: StageKind) -> &'static str {
    match stage {
        StageKind::Asr => "ASR",
        StageKind::Diarization => "DIARIZATION",
        StageKind::Postprocess => "POSTPROCESS",
        StageKind::Nlp => "NLP",
        StageKind::Research => "RESEARCH",
        StageKind::Export => "EXPORT",
    }
}

/// sqlx-backed `StageResultRepository`. Every stage's typed output is
/// upserted as a JSON document keyed by (class session, stage), matching the
/// repository pattern the other sqlite repositories in this module use.
pub struct SqliteStageResultRepository {
    pool: SqlitePool,
}

impl SqliteStageResultRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn put_document(&self, class_session_id: &ClassSessionId, stage: StageKind, document: String) -> Result<(), PipelineError> {
        sqlx::query(
            "INSERT INTO stage_results (class_session_id, stage, document, produced_at) VALUES (?1, ?2, ?3, datetime('now')) \
             ON CONFLICT(class_session_id, stage) DO UPDATE SET document = excluded.document, produced_at = excluded.produced_at",
        )
        .bind(class_session_id.to_string())
        .bind(stage_label(stage))
        .bind(document)
        .execute(&self.pool)
        .await
        .map_err(|e| PipelineError::transient(e.to_string()))?;
        Ok(())
    }

    async fn get_document(&self, class_session_id: &ClassSessionId, stage: StageKind) -> Result<Option<String>, PipelineError> {
        let row = sqlx::query("SELECT document FROM stage_results WHERE class_session_id = ?1 AND stage = ?2")
            .bind(class_session_id.to_string())
            .bind(stage_label(stage))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PipelineError::transient(e.to_string()))?;
        Ok(row.map(|row| row.get("document")))
    }
}

#[async_trait]
impl StageResultRepository for SqliteStageResultRepository {
    async fn save_transcription(&self, result: &TranscriptionResult) -> Result<(), PipelineError> {
        let document = serde_json::to_string(result).map_err(PipelineError::from)?;
        self.put_document(&result.class_session_id, StageKind::Asr, document).await
    }

    async fn get_transcription(&self, class_session_id: &ClassSessionId) -> Result<Option<TranscriptionResult>, PipelineError> {
        self.get_document(class_session_id, StageKind::Asr)
            .await?
            .map(|document| serde_json::from_str(&document).map_err(PipelineError::from))
            .transpose()
    }

    async fn save_diarization(&self, result: &DiarizationResult) -> Result<(), PipelineError> {
        let document = serde_json::to_string(result).map_err(PipelineError::from)?;
        self.put_document(&result.class_session_id, StageKind::Diarization, document).await
    }

    async fn get_diarization(&self, class_session_id: &ClassSessionId) -> Result<Option<DiarizationResult>, PipelineError> {
        self.get_document(class_session_id, StageKind::Diarization)
            .await?
            .map(|document| serde_json::from_str(&document).map_err(PipelineError::from))
            .transpose()
    }

    async fn save_post_processing(&self, result: &PostProcessingResult) -> Result<(), PipelineError> {
        let document = serde_json::to_string(result).map_err(PipelineError::from)?;
        self.put_document(&result.class_session_id, StageKind::Postprocess, document).await
    }

    async fn get_post_processing(&self, class_session_id: &ClassSessionId) -> Result<Option<PostProcessingResult>, PipelineError> {
        self.get_document(class_session_id, StageKind::Postprocess)
            .await?
            .map(|document| serde_json::from_str(&document).map_err(PipelineError::from))
            .transpose()
    }

    async fn save_llm_analysis(&self, result: &LlmAnalysisResult) -> Result<(), PipelineError> {
        let document = serde_json::to_string(result).map_err(PipelineError::from)?;
        self.put_document(&result.class_session_id, StageKind::Nlp, document).await
    }

    async fn get_llm_analysis(&self, class_session_id: &ClassSessionId) -> Result<Option<LlmAnalysisResult>, PipelineError> {
        self.get_document(class_session_id, StageKind::Nlp)
            .await?
            .map(|document| serde_json::from_str(&document).map_err(PipelineError::from))
            .transpose()
    }

    async fn save_research_results(&self, class_session_id: &ClassSessionId, results: &[ResearchResult]) -> Result<(), PipelineError> {
        let document = serde_json::to_string(results).map_err(PipelineError::from)?;
        self.put_document(class_session_id, StageKind::Research, document).await
    }

    async fn get_research_results(&self, class_session_id: &ClassSessionId) -> Result<Option<Vec<ResearchResult>>, PipelineError> {
        self.get_document(class_session_id, StageKind::Research)
            .await?
            .map(|document| serde_json::from_str(&document).map_err(PipelineError::from))
            .transpose()
    }

    async fn save_export(&self, result: &ExportResult) -> Result<(), PipelineError> {
        let document = serde_json::to_string(result).map_err(PipelineError::from)?;
        self.put_document(&result.class_session_id, StageKind::Export, document).await
    }

    async fn get_export(&self, class_session_id: &ClassSessionId) -> Result<Option<ExportResult>, PipelineError> {
        self.get_document(class_session_id, StageKind::Export)
            .await?
            .map(|document| serde_json::from_str(&document).map_err(PipelineError::from))
            .transpose()
    }

    async fn has_result(&self, class_session_id: &ClassSessionId, stage: StageKind) -> Result<bool, PipelineError> {
        Ok(self.get_document(class_session_id, stage).await?.is_some())
    }
}
