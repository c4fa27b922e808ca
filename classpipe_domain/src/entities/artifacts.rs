// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Study artifacts produced from a session's LLM analysis: flashcard-style
//! micro-memos, the export bundle built from them, and synthesized audio.

use crate::value_objects::ClassSessionId;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Definition,
    Concept,
    Process,
    Case,
    Fact,
    Comparison,
    Symptom,
    Treatment,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardDifficulty {
    VeryEasy,
    Easy,
    Medium,
    Hard,
    Expert,
}

/// A single flashcard-style study artifact. `is_valid` encodes the length
/// and keyword-coverage bounds the export stage enforces before a card is
/// allowed into a bundle.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MicroMemoCard {
    pub class_session_id: ClassSessionId,
    pub card_type: CardType,
    pub difficulty: CardDifficulty,
    pub question: String,
    pub answer: String,
    pub confidence: f64,
    pub tags: Vec<String>,
}

impl MicroMemoCard {
    pub const QUESTION_LEN_MIN: usize = 20;
    pub const QUESTION_LEN_MAX: usize = 200;
    pub const ANSWER_LEN_MIN: usize = 50;
    pub const ANSWER_LEN_MAX: usize = 500;
    pub const MIN_MEDICAL_KEYWORDS: usize = 2;

    pub fn is_valid(&self) -> bool {
        (Self::QUESTION_LEN_MIN..=Self::QUESTION_LEN_MAX).contains(&self.question.len())
            && (Self::ANSWER_LEN_MIN..=Self::ANSWER_LEN_MAX).contains(&self.answer.len())
            && self.tags.len() >= Self::MIN_MEDICAL_KEYWORDS
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExportFormat {
    Pdf,
    Docx,
    Json,
    Csv,
    Html,
    Anki,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
            ExportFormat::Anki => "apkg",
        }
    }
}

/// Filter applied before rendering: only cards at or above `confidence_threshold`
/// make it into the bundle.
#[derive(Debug, Clone, Copy)]
pub struct ExportFilter {
    pub format: ExportFormat,
    pub confidence_threshold: f64,
}

impl Default for ExportFilter {
    fn default() -> Self {
        Self { format: ExportFormat::Json, confidence_threshold: 0.5 }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ExportSession {
    pub class_session_id: ClassSessionId,
    pub format: ExportFormat,
    pub object_key: String,
    pub size_bytes: u64,
    pub cards_included: usize,
    pub quality_score: f64,
    pub produced_at: DateTime<Utc>,
}

/// Synthesized study audio. Kept separate from `ExportResult` since the raw
/// bytes never round-trip through the stage-result store; only the object
/// key the worker uploaded them under does.
#[derive(Debug, Clone)]
pub struct TtsAudio {
    pub class_session_id: ClassSessionId,
    pub format: String,
    pub bytes: Vec<u8>,
    pub duration_sec: f64,
    pub quality_score: f64,
}

/// The stage-result row for `StageKind::Export`: everything the export
/// stage produced for a session in one place.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ExportResult {
    pub class_session_id: ClassSessionId,
    pub cards_generated: usize,
    pub export: ExportSession,
    pub tts_object_key: Option<String>,
    pub produced_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(question: &str, answer: &str, tags: Vec<String>) -> MicroMemoCard {
        MicroMemoCard {
            class_session_id: ClassSessionId::new(),
            card_type: CardType::Concept,
            difficulty: CardDifficulty::Medium,
            question: question.to_string(),
            answer: answer.to_string(),
            confidence: 0.7,
            tags,
        }
    }

    #[test]
    fn rejects_cards_below_length_bounds() {
        let too_short = card("short?", "also short", vec!["a".into(), "b".into()]);
        assert!(!too_short.is_valid());
    }

    #[test]
    fn rejects_cards_with_fewer_than_two_tags() {
        let one_tag = card(
            &"What does this term mean in context?".repeat(1),
            &"A".repeat(60),
            vec!["only-one".into()],
        );
        assert!(!one_tag.is_valid());
    }

    #[test]
    fn accepts_a_well_formed_card() {
        let valid = card("What does hypertension mean in this session's context?", &"A".repeat(60), vec!["a".into(), "b".into()]);
        assert!(valid.is_valid());
    }
}
