// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Orchestrated multi-stage pipeline for processing recorded lectures.
//!
//! A recording moves through chunked upload, ASR transcription, speaker
//! diarization, post-processing, LLM-driven term extraction, medical-term
//! research (backed by a content-addressed cache), and artifact export.
//! The domain layer (`classpipe_domain`) owns entities, value objects, and
//! the synchronous recognizer contracts; this crate wires them to concrete
//! storage, queueing, and external-service adapters.
//!
//! ## Layout
//!
//! - [`application`]: use cases that coordinate domain entities and ports.
//!   No direct SQL, no direct HTTP clients.
//! - [`infrastructure`]: sqlx-backed repositories, the object store
//!   adapter, configuration loading, logging, and metrics.

pub mod application;
pub mod infrastructure;

pub use classpipe_domain::entities::{ChunkUpload, ClassSession, DiarizationResult, LlmAnalysisResult, PostProcessingResult, ProcessingJob, TranscriptionResult, UploadSession};
pub use classpipe_domain::error::PipelineError;
pub use classpipe_domain::value_objects::{ChunkSize, ClassSessionId, ClassSessionState, ProcessingJobId, UploadSessionId};

pub use crate::application::use_cases::{Orchestrator, ResearchUseCases, UploadUseCases};
