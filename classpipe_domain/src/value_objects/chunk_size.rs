// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Chunk Size Value Object
//!
//! Bounds-checked chunk size for the chunked upload subsystem. Default is
//! 10MiB, matching the upload session manager's default chunk size.

use crate::PipelineError;
use serde::{Deserialize, Serialize};

const MIN_BYTES: u64 = 64 * 1024; // 64KiB
const MAX_BYTES: u64 = 100 * 1024 * 1024; // 100MiB
const DEFAULT_BYTES: u64 = 10 * 1024 * 1024; // 10MiB, matches upload session default

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct ChunkSize(u64);

impl ChunkSize {
    pub fn new(bytes: u64) -> Result<Self, PipelineError> {
        if bytes < MIN_BYTES {
            return Err(PipelineError::validation(format!(
                "chunk size {bytes} below minimum {MIN_BYTES}"
            )));
        }
        if bytes > MAX_BYTES {
            return Err(PipelineError::validation(format!(
                "chunk size {bytes} exceeds maximum {MAX_BYTES}"
            )));
        }
        Ok(Self(bytes))
    }

    pub fn from_mb(mb: u64) -> Result<Self, PipelineError> {
        Self::new(mb * 1024 * 1024)
    }

    pub fn bytes(&self) -> u64 {
        self.0
    }

    pub fn megabytes(&self) -> f64 {
        self.0 as f64 / (1024.0 * 1024.0)
    }

    /// Picks a chunk size tiered by total file size: small files get a small
    /// chunk, very large files cap out at the maximum allowed chunk size.
    pub fn optimal_for_file_size(file_size_bytes: u64) -> Self {
        let bytes = if file_size_bytes < 10 * 1024 * 1024 {
            1 * 1024 * 1024
        } else if file_size_bytes < 500 * 1024 * 1024 {
            5 * 1024 * 1024
        } else if file_size_bytes < 2 * 1024 * 1024 * 1024 {
            10 * 1024 * 1024
        } else {
            MAX_BYTES
        };
        Self(bytes.clamp(MIN_BYTES, MAX_BYTES))
    }

    /// Number of chunks needed to cover a file of the given size.
    pub fn chunk_count_for(&self, file_size_bytes: u64) -> u32 {
        if file_size_bytes == 0 {
            return 0;
        }
        file_size_bytes.div_ceil(self.0) as u32
    }
}

impl Default for ChunkSize {
    fn default() -> Self {
        Self(DEFAULT_BYTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_bounds_sizes() {
        assert!(ChunkSize::new(16).is_err());
        assert!(ChunkSize::new(MAX_BYTES + 1).is_err());
        assert!(ChunkSize::new(DEFAULT_BYTES).is_ok());
    }

    #[test]
    fn default_is_ten_mib() {
        assert_eq!(ChunkSize::default().bytes(), 10 * 1024 * 1024);
    }

    #[test]
    fn optimal_size_scales_with_file_size() {
        let small = ChunkSize::optimal_for_file_size(1024 * 1024);
        let large = ChunkSize::optimal_for_file_size(5 * 1024 * 1024 * 1024);
        assert!(large.bytes() >= small.bytes());
    }

    #[test]
    fn chunk_count_covers_remainder() {
        let size = ChunkSize::new(10 * 1024 * 1024).unwrap();
        assert_eq!(size.chunk_count_for(25 * 1024 * 1024), 3);
        assert_eq!(size.chunk_count_for(0), 0);
    }
}
