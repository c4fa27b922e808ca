// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

pub mod artifacts;
pub mod class_session;
pub mod processing_job;
pub mod research;
pub mod stage_results;
pub mod upload_session;

pub use artifacts::{CardDifficulty, CardType, ExportFilter, ExportFormat, ExportResult, ExportSession, MicroMemoCard, TtsAudio};
pub use class_session::ClassSession;
pub use processing_job::ProcessingJob;
pub use research::{MedicalSource, ResearchJob, ResearchResult, SourceCacheEntry};
pub use stage_results::{
    DiarizationResult, ExtractedTerm, LlmAnalysisResult, PostProcessingResult, SpeakerTurn, TranscriptSegment, TranscriptionResult,
};
pub use upload_session::{ChunkUpload, UploadSession};
