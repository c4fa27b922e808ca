// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Export stage use cases: renders the micro-memo cards generated from a
//! session's LLM analysis into a downloadable bundle, and synthesizes a
//! spoken summary. Both artifacts are uploaded through the `ObjectStore`
//! port, so this layer (not the domain) owns the upload side-effect.

use classpipe_domain::entities::{ExportFilter, ExportFormat, ExportResult, ExportSession, LlmAnalysisResult, MicroMemoCard};
use classpipe_domain::services::{MicroMemoGenerator, ObjectStore, TtsConfig, TtsSynthesizer};
use classpipe_domain::services::normalize_for_tts;
use classpipe_domain::PipelineError;
use chrono::Utc;
use std::sync::Arc;

pub struct ArtifactUseCases {
    object_store: Arc<dyn ObjectStore>,
    tts: Arc<dyn TtsSynthesizer>,
}

impl ArtifactUseCases {
    pub fn new(object_store: Arc<dyn ObjectStore>, tts: Arc<dyn TtsSynthesizer>) -> Self {
        Self { object_store, tts }
    }

    /// Generates micro-memo cards from the session's LLM analysis, renders
    /// the ones meeting `filter`'s confidence threshold, uploads the bundle,
    /// and synthesizes a spoken summary alongside it.
    pub async fn export_session(&self, analysis: &LlmAnalysisResult, filter: ExportFilter) -> Result<ExportResult, PipelineError> {
        let cards = MicroMemoGenerator.generate(analysis);
        let eligible: Vec<MicroMemoCard> = cards.iter().filter(|c| c.confidence >= filter.confidence_threshold).cloned().collect();

        let rendered = render_bundle(&eligible, filter.format)?;
        let object_key = format!("exports/{}/bundle.{}", analysis.class_session_id, filter.format.extension());
        self.object_store.put(&object_key, rendered.clone()).await?;

        let export = ExportSession {
            class_session_id: analysis.class_session_id.clone(),
            format: filter.format,
            object_key,
            size_bytes: rendered.len() as u64,
            cards_included: eligible.len(),
            quality_score: average_confidence(&eligible),
            produced_at: Utc::now(),
        };

        let tts_object_key = self.synthesize_summary(analysis).await?;

        Ok(ExportResult {
            class_session_id: analysis.class_session_id.clone(),
            cards_generated: cards.len(),
            export,
            tts_object_key,
            produced_at: Utc::now(),
        })
    }

    async fn synthesize_summary(&self, analysis: &LlmAnalysisResult) -> Result<Option<String>, PipelineError> {
        if analysis.summary.trim().is_empty() {
            return Ok(None);
        }
        let medical_terms: Vec<String> = analysis.key_terms.iter().map(|t| t.term.clone()).collect();
        let normalized = normalize_for_tts(&analysis.summary, &medical_terms);

        let tts = self.tts.clone();
        let class_session_id = analysis.class_session_id.clone();
        let audio = tokio::task::spawn_blocking(move || tts.synthesize(&class_session_id, &normalized, &TtsConfig::default()))
            .await
            .map_err(|e| PipelineError::fatal(e.to_string()))??;

        let key = format!("exports/{}/summary.{}", analysis.class_session_id, audio.format);
        self.object_store.put(&key, audio.bytes.clone()).await?;
        Ok(Some(key))
    }
}

fn average_confidence(cards: &[MicroMemoCard]) -> f64 {
    if cards.is_empty() {
        return 0.0;
    }
    cards.iter().map(|c| c.confidence).sum::<f64>() / cards.len() as f64
}

/// Renders a card bundle. JSON and CSV are rendered natively; the remaining
/// formats (PDF/DOCX/HTML/Anki) need format-specific libraries this pipeline
/// doesn't carry a dependency for, so they fall back to the same flat
/// question/answer text with the requested extension rather than claiming a
/// format the renderer can't actually produce.
fn render_bundle(cards: &[MicroMemoCard], format: ExportFormat) -> Result<Vec<u8>, PipelineError> {
    match format {
        ExportFormat::Json => serde_json::to_vec(cards).map_err(PipelineError::from),
        ExportFormat::Csv => {
            let mut out = String::from("question,answer,confidence,tags\n");
            for card in cards {
                out.push_str(&format!(
                    "\"{}\",\"{}\",{},\"{}\"\n",
                    card.question.replace('"', "'"),
                    card.answer.replace('"', "'"),
                    card.confidence,
                    card.tags.join(";")
                ));
            }
            Ok(out.into_bytes())
        }
        ExportFormat::Pdf | ExportFormat::Docx | ExportFormat::Html | ExportFormat::Anki => {
            let mut out = String::new();
            for card in cards {
                out.push_str(&format!("Q: {}\nA: {}\n\n", card.question, card.answer));
            }
            Ok(out.into_bytes())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_confidence_of_empty_slice_is_zero() {
        assert_eq!(average_confidence(&[]), 0.0);
    }

    #[test]
    fn json_bundle_round_trips_card_count() {
        let bytes = render_bundle(&[], ExportFormat::Json).unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_slice(&bytes).unwrap();
        assert!(parsed.is_empty());
    }
}
