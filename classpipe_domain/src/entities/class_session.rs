// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The top-level entity representing one uploaded class recording moving
//! through the pipeline.

use crate::value_objects::{ClassSessionId, ClassSessionState, StageKind};
use crate::PipelineError;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ClassSession {
    id: ClassSessionId,
    title: String,
    state: ClassSessionState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    error_message: Option<String>,
}

impl ClassSession {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ClassSessionId::new(),
            title: title.into(),
            state: ClassSessionState::Uploaded,
            created_at: now,
            updated_at: now,
            error_message: None,
        }
    }

    pub fn id(&self) -> &ClassSessionId {
        &self.id
    }

    pub fn state(&self) -> ClassSessionState {
        self.state
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Transitions out of `Uploaded` (or back out of `Error`, for a retry)
    /// into `Asr`, the first stage. `advance_past` requires the session to
    /// already be sitting at the stage it's advancing past, so this is the
    /// transition that puts it there for the very first stage.
    pub fn begin_processing(&mut self) -> Result<(), PipelineError> {
        if !matches!(self.state, ClassSessionState::Uploaded | ClassSessionState::Error) {
            return Err(PipelineError::invalid_state(format!("cannot start processing from {:?}", self.state)));
        }
        self.state = ClassSessionState::Asr;
        self.error_message = None;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Advances to the stage that follows the one just completed. Errors if
    /// the session is already terminal.
    pub fn advance_past(&mut self, completed_stage: StageKind) -> Result<(), PipelineError> {
        if self.state.is_terminal() {
            return Err(PipelineError::invalid_state("session already reached a terminal state"));
        }
        let current: ClassSessionState = completed_stage.into();
        if current != self.state {
            return Err(PipelineError::invalid_state(format!(
                "cannot advance past {completed_stage:?}: session is at {:?}",
                self.state
            )));
        }
        self.state = self.state.next().unwrap_or(ClassSessionState::Done);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn mark_error(&mut self, message: impl Into<String>) {
        self.state = ClassSessionState::Error;
        self.error_message = Some(message.into());
        self.updated_at = Utc::now();
    }

    /// Rewinds the session to the start of `stage` for reprocessing. Only
    /// valid for stages at or before the session's current position, since
    /// rewinding forward would skip work.
    pub fn reprocess_from(&mut self, stage: StageKind) -> Result<(), PipelineError> {
        let target: ClassSessionState = stage.into();
        let target_idx = ClassSessionState::ORDER
            .iter()
            .position(|s| *s == target)
            .ok_or_else(|| PipelineError::validation("stage has no session-state counterpart"))?;
        let current_idx = ClassSessionState::ORDER.iter().position(|s| *s == self.state);

        if let Some(current_idx) = current_idx {
            if target_idx > current_idx {
                return Err(PipelineError::invalid_state("cannot reprocess from a stage ahead of the current one"));
            }
        }
        self.state = target;
        self.error_message = None;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_processing_moves_uploaded_to_asr() {
        let mut session = ClassSession::new("x");
        session.begin_processing().unwrap();
        assert_eq!(session.state(), ClassSessionState::Asr);
    }

    #[test]
    fn begin_processing_retries_from_error() {
        let mut session = ClassSession::new("x");
        session.mark_error("asr crashed");
        session.begin_processing().unwrap();
        assert_eq!(session.state(), ClassSessionState::Asr);
    }

    #[test]
    fn begin_processing_rejects_mid_pipeline_session() {
        let mut session = ClassSession::new("x");
        session.state = ClassSessionState::Nlp;
        assert!(session.begin_processing().is_err());
    }

    #[test]
    fn advances_through_stages_in_order() {
        let mut session = ClassSession::new("Cardiology Lecture 3");
        session.state = ClassSessionState::Asr;
        session.advance_past(StageKind::Asr).unwrap();
        assert_eq!(session.state(), ClassSessionState::Diarization);
    }

    #[test]
    fn rejects_advancing_past_the_wrong_stage() {
        let mut session = ClassSession::new("x");
        session.state = ClassSessionState::Nlp;
        assert!(session.advance_past(StageKind::Asr).is_err());
    }

    #[test]
    fn reprocess_from_rejects_forward_rewind() {
        let mut session = ClassSession::new("x");
        session.state = ClassSessionState::Asr;
        assert!(session.reprocess_from(StageKind::Export).is_err());
    }

    #[test]
    fn reprocess_from_clears_error_state() {
        let mut session = ClassSession::new("x");
        session.mark_error("asr timed out");
        session.reprocess_from(StageKind::Asr).unwrap();
        assert_eq!(session.state(), ClassSessionState::Asr);
    }
}
