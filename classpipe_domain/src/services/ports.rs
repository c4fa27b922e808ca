// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Infrastructure ports: I/O-bound contracts that stay async since they
//! exist to be implemented by adapters wrapping an object store or an HTTP
//! client, not by CPU-bound domain logic.

use crate::PipelineError;
use async_trait::async_trait;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, data: Vec<u8>) -> Result<(), PipelineError>;
    async fn get(&self, key: &str) -> Result<Vec<u8>, PipelineError>;
    async fn delete(&self, key: &str) -> Result<(), PipelineError>;
    async fn presigned_get_url(&self, key: &str, expires_in_secs: u64) -> Result<String, PipelineError>;
    async fn list(&self, prefix: &str) -> Result<Vec<String>, PipelineError>;
}

/// A single external query against a medical information source (PubMed,
/// WHO, NIH, etc.) used by the research stage on a cache miss.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, term: &str) -> Result<Vec<crate::entities::MedicalSource>, PipelineError>;
}
