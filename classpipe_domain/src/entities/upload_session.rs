// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Chunked upload session and its constituent chunks.

use crate::value_objects::{ChunkSize, ChunkUploadId, ClassSessionId, Md5Checksum, UploadSessionId, UploadSessionState};
use crate::PipelineError;
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ChunkUpload {
    pub id: ChunkUploadId,
    pub sequence_number: u32,
    pub size_bytes: u64,
    pub checksum: Option<Md5Checksum>,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UploadSession {
    id: UploadSessionId,
    class_session_id: ClassSessionId,
    state: UploadSessionState,
    total_size_bytes: u64,
    chunk_size: ChunkSize,
    expected_chunks: u32,
    received: HashMap<u32, ChunkUpload>,
    bytes_uploaded: u64,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    upload_started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    upload_speed_bps: Option<f64>,
}

impl UploadSession {
    pub fn new(class_session_id: ClassSessionId, total_size_bytes: u64, chunk_size: ChunkSize) -> Self {
        let now = Utc::now();
        let expected_chunks = chunk_size.chunk_count_for(total_size_bytes).max(1);
        Self {
            id: UploadSessionId::new(),
            class_session_id,
            state: UploadSessionState::Initiated,
            total_size_bytes,
            chunk_size,
            expected_chunks,
            received: HashMap::new(),
            bytes_uploaded: 0,
            created_at: now,
            expires_at: now + Self::default_expiration_span(),
            upload_started_at: None,
            completed_at: None,
            upload_speed_bps: None,
        }
    }

    fn default_expiration_span() -> Duration {
        Duration::hours(24)
    }

    pub fn id(&self) -> &UploadSessionId {
        &self.id
    }

    pub fn class_session_id(&self) -> &ClassSessionId {
        &self.class_session_id
    }

    pub fn state(&self) -> UploadSessionState {
        self.state
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn receive_chunk(&mut self, chunk: ChunkUpload) -> Result<(), PipelineError> {
        if self.state.is_terminal() {
            return Err(PipelineError::invalid_state(format!(
                "cannot upload chunk to session in terminal state {:?}",
                self.state
            )));
        }
        if chunk.sequence_number == 0 || chunk.sequence_number > self.expected_chunks {
            return Err(PipelineError::validation(format!(
                "chunk sequence {} out of range 1..={}",
                chunk.sequence_number, self.expected_chunks
            )));
        }

        if self.upload_started_at.is_none() {
            self.upload_started_at = Some(Utc::now());
            self.state = UploadSessionState::Uploading;
        }

        self.bytes_uploaded += chunk.size_bytes;
        self.received.insert(chunk.sequence_number, chunk);

        if self.received.len() as u32 == self.expected_chunks {
            self.state = UploadSessionState::Assembling;
        }
        Ok(())
    }

    pub fn mark_completed(&mut self) {
        let now = Utc::now();
        self.completed_at = Some(now);
        self.state = UploadSessionState::Completed;
        if let Some(started) = self.upload_started_at {
            let elapsed_sec = (now - started).num_milliseconds() as f64 / 1000.0;
            if elapsed_sec > 0.0 {
                self.upload_speed_bps = Some(self.bytes_uploaded as f64 / elapsed_sec);
            }
        }
    }

    pub fn mark_failed(&mut self) {
        self.state = UploadSessionState::Failed;
    }

    pub fn cancel(&mut self) {
        self.state = UploadSessionState::Cancelled;
    }

    /// Sorted sequence numbers of chunks the server has not yet received.
    pub fn chunks_missing(&self) -> Vec<u32> {
        let expected: BTreeSet<u32> = (1..=self.expected_chunks).collect();
        let received: BTreeSet<u32> = self.received.keys().copied().collect();
        expected.difference(&received).copied().collect()
    }

    pub fn upload_speed_bps(&self) -> Option<f64> {
        self.upload_speed_bps
    }

    /// Estimated seconds remaining, extrapolated from current throughput.
    /// `None` until at least one chunk has landed.
    pub fn eta_seconds(&self, now: DateTime<Utc>) -> Option<f64> {
        let started = self.upload_started_at?;
        let elapsed_sec = (now - started).num_milliseconds() as f64 / 1000.0;
        if elapsed_sec <= 0.0 || self.bytes_uploaded == 0 {
            return None;
        }
        let speed_bps = self.bytes_uploaded as f64 / elapsed_sec;
        let remaining = self.total_size_bytes.saturating_sub(self.bytes_uploaded) as f64;
        Some(remaining / speed_bps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(seq: u32, size: u64) -> ChunkUpload {
        ChunkUpload {
            id: ChunkUploadId::new(),
            sequence_number: seq,
            size_bytes: size,
            checksum: None,
            received_at: Utc::now(),
        }
    }

    #[test]
    fn transitions_to_assembling_once_all_chunks_land() {
        let chunk_size = ChunkSize::new(10).unwrap();
        let mut session = UploadSession::new(ClassSessionId::new(), 25, chunk_size);
        assert_eq!(session.chunks_missing().len(), 3);

        session.receive_chunk(chunk(1, 10)).unwrap();
        session.receive_chunk(chunk(2, 10)).unwrap();
        assert_eq!(session.state(), UploadSessionState::Uploading);

        session.receive_chunk(chunk(3, 5)).unwrap();
        assert_eq!(session.state(), UploadSessionState::Assembling);
        assert!(session.chunks_missing().is_empty());
    }

    #[test]
    fn rejects_chunks_outside_expected_range() {
        let mut session = UploadSession::new(ClassSessionId::new(), 25, ChunkSize::new(10).unwrap());
        assert!(session.receive_chunk(chunk(99, 10)).is_err());
    }

    #[test]
    fn rejects_chunks_after_terminal_state() {
        let mut session = UploadSession::new(ClassSessionId::new(), 10, ChunkSize::new(10).unwrap());
        session.cancel();
        assert!(session.receive_chunk(chunk(1, 10)).is_err());
    }

    #[test]
    fn completion_computes_upload_speed() {
        let mut session = UploadSession::new(ClassSessionId::new(), 10, ChunkSize::new(10).unwrap());
        session.receive_chunk(chunk(1, 10)).unwrap();
        session.mark_completed();
        assert!(session.upload_speed_bps().unwrap() > 0.0);
    }
}
