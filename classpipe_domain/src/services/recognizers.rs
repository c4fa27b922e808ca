// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Behavioral contracts for the processing stages. These describe *what*
//! each stage does, not how a particular model or API implements it. All
//! traits are synchronous by design: the infrastructure layer wraps a given
//! implementation in `tokio::task::spawn_blocking` (local models) or an
//! async HTTP adapter (remote APIs) as appropriate.

use crate::entities::{DiarizationResult, LlmAnalysisResult, PostProcessingResult, TranscriptionResult};
use crate::value_objects::ClassSessionId;
use crate::PipelineError;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct AsrConfig {
    pub preset: String,
    pub language_hint: Option<String>,
}

pub trait AsrRecognizer: Send + Sync {
    fn transcribe(
        &self,
        class_session_id: &ClassSessionId,
        audio_path: &Path,
        config: &AsrConfig,
    ) -> Result<TranscriptionResult, PipelineError>;
}

pub trait Diarizer: Send + Sync {
    fn diarize(&self, class_session_id: &ClassSessionId, audio_path: &Path) -> Result<DiarizationResult, PipelineError>;
}

pub trait PostProcessor: Send + Sync {
    fn process(
        &self,
        class_session_id: &ClassSessionId,
        transcription: &TranscriptionResult,
        diarization: &DiarizationResult,
    ) -> Result<PostProcessingResult, PipelineError>;
}

pub trait LlmAnalyzer: Send + Sync {
    fn analyze(&self, class_session_id: &ClassSessionId, cleaned_transcript: &str) -> Result<LlmAnalysisResult, PipelineError>;
}

/// One term's aggregated search result, produced either by a fresh lookup
/// or served from the research cache.
pub trait Researcher: Send + Sync {
    fn research_term(&self, term: &str) -> Result<crate::entities::ResearchResult, PipelineError>;
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TtsQuality {
    Draft,
    Standard,
    High,
}

#[derive(Debug, Clone)]
pub struct TtsConfig {
    pub voice: String,
    pub speed: f64,
    pub quality: TtsQuality,
    pub study_mode: bool,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self { voice: "default".to_string(), speed: 1.0, quality: TtsQuality::Standard, study_mode: false }
    }
}

/// Pluggable speech-synthesis backend, same "behavioral contract, not model
/// internals" framing as the other recognizer traits.
pub trait TtsSynthesizer: Send + Sync {
    fn synthesize(&self, class_session_id: &ClassSessionId, text: &str, config: &TtsConfig) -> Result<crate::entities::TtsAudio, PipelineError>;
}
