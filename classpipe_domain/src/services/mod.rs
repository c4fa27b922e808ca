// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

pub mod artifact_generation;
pub mod checksum_service;
pub mod ports;
pub mod recognizers;

pub use artifact_generation::{normalize_for_tts, MicroMemoGenerator};
pub use checksum_service::{ChecksumService, HashChecksumService};
pub use ports::{ObjectStore, SourceFetcher};
pub use recognizers::{AsrConfig, AsrRecognizer, Diarizer, LlmAnalyzer, PostProcessor, Researcher, TtsConfig, TtsQuality, TtsSynthesizer};
