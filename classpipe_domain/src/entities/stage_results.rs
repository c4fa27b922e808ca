// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Output records produced by each processing stage. These hold whatever the
//! stage contract promises, not the recognizer internals that produced them.

use crate::value_objects::ClassSessionId;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TranscriptSegment {
    pub start_sec: f64,
    pub end_sec: f64,
    pub text: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TranscriptionResult {
    pub class_session_id: ClassSessionId,
    pub segments: Vec<TranscriptSegment>,
    pub language: String,
    pub produced_at: DateTime<Utc>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SpeakerTurn {
    pub speaker_label: String,
    pub start_sec: f64,
    pub end_sec: f64,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DiarizationResult {
    pub class_session_id: ClassSessionId,
    pub turns: Vec<SpeakerTurn>,
    pub speaker_count: u32,
    pub produced_at: DateTime<Utc>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PostProcessingResult {
    pub class_session_id: ClassSessionId,
    pub cleaned_transcript: String,
    pub punctuation_restored: bool,
    pub produced_at: DateTime<Utc>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ExtractedTerm {
    pub term: String,
    pub category: String,
    pub relevance: f64,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LlmAnalysisResult {
    pub class_session_id: ClassSessionId,
    pub summary: String,
    pub key_terms: Vec<ExtractedTerm>,
    pub produced_at: DateTime<Utc>,
}
