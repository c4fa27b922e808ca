// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Chunked upload use cases: open a session, accept chunks, assemble the
//! final object once every chunk has landed.

use classpipe_domain::entities::{ChunkUpload, ClassSession, UploadSession};
use classpipe_domain::repositories::{ClassSessionRepository, UploadSessionRepository};
use classpipe_domain::services::{ChecksumService, ObjectStore};
use classpipe_domain::value_objects::{ChunkSize, ChunkUploadId, ClassSessionId, Md5Checksum, UploadSessionId, UploadSessionState};
use classpipe_domain::PipelineError;
use chrono::Utc;
use std::sync::Arc;

pub struct UploadUseCases {
    class_sessions: Arc<dyn ClassSessionRepository>,
    upload_sessions: Arc<dyn UploadSessionRepository>,
    object_store: Arc<dyn ObjectStore>,
    checksums: Arc<dyn ChecksumService>,
}

impl UploadUseCases {
    pub fn new(
        class_sessions: Arc<dyn ClassSessionRepository>,
        upload_sessions: Arc<dyn UploadSessionRepository>,
        object_store: Arc<dyn ObjectStore>,
        checksums: Arc<dyn ChecksumService>,
    ) -> Self {
        Self {
            class_sessions,
            upload_sessions,
            object_store,
            checksums,
        }
    }

    /// Creates the class session and its upload session together. Refuses
    /// to open a second concurrent upload session for the same class
    /// session.
    pub async fn create_upload_session(&self, title: &str, total_size_bytes: u64) -> Result<(ClassSessionId, UploadSessionId), PipelineError> {
        let session = ClassSession::new(title);
        self.class_sessions.save(&session).await?;

        if let Some(existing) = self.upload_sessions.find_active_for_class_session(session.id()).await? {
            return Err(PipelineError::invalid_state(format!(
                "class session {} already has an active upload session {}",
                session.id(),
                existing.id()
            )));
        }

        let chunk_size = ChunkSize::optimal_for_file_size(total_size_bytes);
        let upload = UploadSession::new(session.id().clone(), total_size_bytes, chunk_size);
        self.upload_sessions.save(&upload).await?;
        Ok((session.id().clone(), upload.id().clone()))
    }

    pub async fn upload_chunk(&self, upload_session_id: &UploadSessionId, sequence_number: u32, data: Vec<u8>) -> Result<(), PipelineError> {
        let mut session = self
            .upload_sessions
            .find_by_id(upload_session_id)
            .await?
            .ok_or_else(|| PipelineError::not_found(format!("upload session {upload_session_id}")))?;

        let checksum = self.checksums.md5(&data);
        let size_bytes = data.len() as u64;

        self.object_store
            .put(&chunk_object_key(upload_session_id, sequence_number), data)
            .await?;

        session.receive_chunk(ChunkUpload {
            id: ChunkUploadId::new(),
            sequence_number,
            size_bytes,
            checksum: Some(checksum),
            received_at: Utc::now(),
        })?;
        self.upload_sessions.save(&session).await
    }

    /// Concatenates all received chunks into the final object once the
    /// session has transitioned to `Assembling`.
    pub async fn assemble(&self, upload_session_id: &UploadSessionId, final_key: &str) -> Result<Md5Checksum, PipelineError> {
        let mut session = self
            .upload_sessions
            .find_by_id(upload_session_id)
            .await?
            .ok_or_else(|| PipelineError::not_found(format!("upload session {upload_session_id}")))?;

        if session.state() != UploadSessionState::Assembling {
            return Err(PipelineError::invalid_state("upload session is not ready to assemble"));
        }

        let missing = session.chunks_missing();
        if !missing.is_empty() {
            return Err(PipelineError::invalid_state(format!("missing chunks: {missing:?}")));
        }

        let mut assembled = Vec::new();
        let mut seq = 1u32;
        loop {
            let key = chunk_object_key(upload_session_id, seq);
            match self.object_store.get(&key).await {
                Ok(bytes) => {
                    assembled.extend_from_slice(&bytes);
                    self.object_store.delete(&key).await?;
                    seq += 1;
                }
                Err(_) => break,
            }
        }

        let checksum = self.checksums.md5(&assembled);
        self.object_store.put(final_key, assembled).await?;

        session.mark_completed();
        self.upload_sessions.save(&session).await?;
        Ok(checksum)
    }
}

fn chunk_object_key(upload_session_id: &UploadSessionId, sequence_number: u32) -> String {
    format!("uploads/{upload_session_id}/chunks/{sequence_number:010}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_object_keys_sort_lexicographically_by_sequence() {
        let id = UploadSessionId::new();
        let first = chunk_object_key(&id, 2);
        let second = chunk_object_key(&id, 10);
        assert!(first < second);
    }
}
