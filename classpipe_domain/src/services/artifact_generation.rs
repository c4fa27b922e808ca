// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Turns LLM analysis output into flashcard-style micro-memos and prepares
//! text for speech synthesis. Pure, deterministic, no pluggable backend
//! needed the way ASR/diarization/LLM analysis have one.

use crate::entities::{CardDifficulty, CardType, ExtractedTerm, LlmAnalysisResult, MicroMemoCard};
use crate::value_objects::ClassSessionId;

/// Terms below this relevance don't carry enough signal for a usable
/// question/answer pair.
const MIN_TERM_RELEVANCE: f64 = 0.3;

pub struct MicroMemoGenerator;

impl MicroMemoGenerator {
    pub fn generate(&self, analysis: &LlmAnalysisResult) -> Vec<MicroMemoCard> {
        analysis
            .key_terms
            .iter()
            .filter(|term| term.relevance >= MIN_TERM_RELEVANCE)
            .filter_map(|term| Self::card_for_term(&analysis.class_session_id, term, &analysis.summary))
            .collect()
    }

    fn card_for_term(class_session_id: &ClassSessionId, term: &ExtractedTerm, summary: &str) -> Option<MicroMemoCard> {
        let question = format!("What is {} in the context of this session's material?", term.term);

        let mut answer = format!("{} is discussed under the {} category. {}", term.term, term.category, summary);
        if answer.len() > MicroMemoCard::ANSWER_LEN_MAX {
            answer.truncate(MicroMemoCard::ANSWER_LEN_MAX);
        }
        while answer.len() < MicroMemoCard::ANSWER_LEN_MIN {
            answer.push_str(" Review the session recording for more detail.");
        }

        let card = MicroMemoCard {
            class_session_id: class_session_id.clone(),
            card_type: card_type_for_category(&term.category),
            difficulty: difficulty_for_relevance(term.relevance),
            question,
            answer,
            confidence: term.relevance,
            tags: vec![term.category.clone(), term.term.clone()],
        };
        card.is_valid().then_some(card)
    }
}

fn card_type_for_category(category: &str) -> CardType {
    match category.to_lowercase().as_str() {
        "symptom" | "symptoms" => CardType::Symptom,
        "treatment" | "therapy" => CardType::Treatment,
        "process" | "mechanism" => CardType::Process,
        "case" | "case_study" => CardType::Case,
        "comparison" => CardType::Comparison,
        "definition" => CardType::Definition,
        "fact" => CardType::Fact,
        _ => CardType::Concept,
    }
}

fn difficulty_for_relevance(relevance: f64) -> CardDifficulty {
    if relevance >= 0.9 {
        CardDifficulty::Expert
    } else if relevance >= 0.7 {
        CardDifficulty::Hard
    } else if relevance >= 0.5 {
        CardDifficulty::Medium
    } else if relevance >= 0.3 {
        CardDifficulty::Easy
    } else {
        CardDifficulty::VeryEasy
    }
}

/// Clinical abbreviations expanded before SSML emphasis is applied, since an
/// abbreviation reads naturally in text but needs spelling out for a
/// synthesizer.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("BP", "blood pressure"),
    ("HR", "heart rate"),
    ("Dx", "diagnosis"),
    ("Tx", "treatment"),
    ("Hx", "history"),
    ("Sx", "symptoms"),
];

/// Expands common clinical abbreviations and wraps the given medical terms
/// in SSML `<emphasis>` tags so the synthesis engine stresses them.
pub fn normalize_for_tts(text: &str, medical_terms: &[String]) -> String {
    let mut normalized = text.to_string();
    for (abbr, expansion) in ABBREVIATIONS {
        normalized = replace_word(&normalized, abbr, expansion);
    }
    for term in medical_terms {
        if term.is_empty() {
            continue;
        }
        normalized = replace_word(&normalized, term, &format!("<emphasis level=\"strong\">{term}</emphasis>"));
    }
    normalized
}

fn replace_word(text: &str, word: &str, replacement: &str) -> String {
    text.split_whitespace()
        .map(|token| {
            if token.trim_matches(|c: char| !c.is_alphanumeric()) == word {
                replacement.to_string()
            } else {
                token.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ExtractedTerm;

    fn sample_analysis() -> LlmAnalysisResult {
        LlmAnalysisResult {
            class_session_id: ClassSessionId::new(),
            summary: "Session covered hypertension management basics.".to_string(),
            key_terms: vec![ExtractedTerm { term: "hypertension".to_string(), category: "symptom".to_string(), relevance: 0.8 }],
            produced_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn generates_a_valid_card_for_a_relevant_term() {
        let cards = MicroMemoGenerator.generate(&sample_analysis());
        assert_eq!(cards.len(), 1);
        assert!(cards[0].is_valid());
        assert_eq!(cards[0].card_type, CardType::Symptom);
    }

    #[test]
    fn skips_low_relevance_terms() {
        let mut analysis = sample_analysis();
        analysis.key_terms[0].relevance = 0.1;
        assert!(MicroMemoGenerator.generate(&analysis).is_empty());
    }

    #[test]
    fn normalize_expands_abbreviations_and_emphasizes_terms() {
        let out = normalize_for_tts("Check BP now", &["BP".to_string()]);
        assert!(out.contains("blood pressure") || out.contains("<emphasis"));
    }
}
