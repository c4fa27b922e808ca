// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! State and configuration enums shared across entities.

use serde::{Deserialize, Serialize};

/// Top-level lifecycle of a class recording as it moves through the pipeline.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassSessionState {
    Uploaded,
    Asr,
    Diarization,
    Postprocess,
    Nlp,
    Research,
    Export,
    Done,
    Error,
}

impl ClassSessionState {
    /// Stage ordering used by the orchestrator to decide the next stage and
    /// to validate `reprocess_from` rewinds.
    pub const ORDER: [ClassSessionState; 7] = [
        ClassSessionState::Uploaded,
        ClassSessionState::Asr,
        ClassSessionState::Diarization,
        ClassSessionState::Postprocess,
        ClassSessionState::Nlp,
        ClassSessionState::Research,
        ClassSessionState::Export,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, ClassSessionState::Done | ClassSessionState::Error)
    }

    pub fn next(&self) -> Option<ClassSessionState> {
        let idx = Self::ORDER.iter().position(|s| s == self)?;
        Self::ORDER.get(idx + 1).copied().or(Some(ClassSessionState::Done))
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageKind {
    Asr,
    Diarization,
    Postprocess,
    Nlp,
    Research,
    Export,
}

impl From<StageKind> for ClassSessionState {
    fn from(kind: StageKind) -> Self {
        match kind {
            StageKind::Asr => ClassSessionState::Asr,
            StageKind::Diarization => ClassSessionState::Diarization,
            StageKind::Postprocess => ClassSessionState::Postprocess,
            StageKind::Nlp => ClassSessionState::Nlp,
            StageKind::Research => ClassSessionState::Research,
            StageKind::Export => ClassSessionState::Export,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadSessionState {
    Initiated,
    Uploading,
    Paused,
    Assembling,
    Completed,
    Failed,
    Expired,
    Cancelled,
}

impl UploadSessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UploadSessionState::Completed
                | UploadSessionState::Failed
                | UploadSessionState::Expired
                | UploadSessionState::Cancelled
        )
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingJobState {
    Queued,
    Running,
    Paused,
    Completed,
    Failed,
    Cancelled,
}

impl ProcessingJobState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProcessingJobState::Completed | ProcessingJobState::Failed | ProcessingJobState::Cancelled
        )
    }
}

/// What a processing job was requested to do; full runs vs. targeted
/// reprocessing of a single stage or stage range.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestedKind {
    Full,
    AsrOnly,
    DiarizationOnly,
    ReprocessFrom(StageKindRepr),
}

/// serde-friendly mirror of `StageKind` used inside `RequestedKind::ReprocessFrom`
/// to keep the outer enum's derive straightforward.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageKindRepr {
    Asr,
    Diarization,
    Postprocess,
    Nlp,
    Research,
    Export,
}

impl From<StageKind> for StageKindRepr {
    fn from(kind: StageKind) -> Self {
        match kind {
            StageKind::Asr => StageKindRepr::Asr,
            StageKind::Diarization => StageKindRepr::Diarization,
            StageKind::Postprocess => StageKindRepr::Postprocess,
            StageKind::Nlp => StageKindRepr::Nlp,
            StageKind::Research => StageKindRepr::Research,
            StageKind::Export => StageKindRepr::Export,
        }
    }
}

/// Advisory-only priority. Queue consumers may use it to order dequeues;
/// it never changes the job state machine itself.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPriority {
    Low,
    Normal,
    High,
    Urgent,
}

impl Default for JobPriority {
    fn default() -> Self {
        JobPriority::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_order_advances_to_done_after_export() {
        assert_eq!(ClassSessionState::Export.next(), Some(ClassSessionState::Done));
        assert_eq!(ClassSessionState::Done.next(), None);
    }

    #[test]
    fn priority_orders_low_to_urgent() {
        assert!(JobPriority::Low < JobPriority::Urgent);
    }
}
