// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `ObjectStore` port implementation backed by the `object_store` crate,
//! which abstracts over S3-compatible storage.

use async_trait::async_trait;
use classpipe_domain::services::ObjectStore as ObjectStorePort;
use classpipe_domain::PipelineError;
use object_store::aws::AmazonS3;
use object_store::path::Path as ObjectPath;
use object_store::signer::Signer;
use object_store::{ObjectStore as ObjectStoreClient, PutPayload};
use std::sync::Arc;
use std::time::Duration;

/// Holds the concrete `AmazonS3` client (not a boxed trait object) because
/// presigned URL generation is only available through `object_store`'s
/// `Signer` extension trait, which isn't part of the generic `ObjectStore`
/// trait.
pub struct S3ObjectStoreAdapter {
    client: Arc<AmazonS3>,
}

impl S3ObjectStoreAdapter {
    pub fn new(client: Arc<AmazonS3>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStorePort for S3ObjectStoreAdapter {
    async fn put(&self, key: &str, data: Vec<u8>) -> Result<(), PipelineError> {
        self.client
            .put(&ObjectPath::from(key), PutPayload::from(data))
            .await
            .map_err(|e| PipelineError::transient(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, PipelineError> {
        let result = self
            .client
            .get(&ObjectPath::from(key))
            .await
            .map_err(|e| PipelineError::not_found(format!("{key}: {e}")))?;
        let bytes = result.bytes().await.map_err(|e| PipelineError::transient(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn delete(&self, key: &str) -> Result<(), PipelineError> {
        self.client
            .delete(&ObjectPath::from(key))
            .await
            .map_err(|e| PipelineError::transient(e.to_string()))?;
        Ok(())
    }

    async fn presigned_get_url(&self, key: &str, expires_in_secs: u64) -> Result<String, PipelineError> {
        let signed = self
            .client
            .signed_url(http::Method::GET, &ObjectPath::from(key), Duration::from_secs(expires_in_secs))
            .await
            .map_err(|e| PipelineError::external(e.to_string()))?;
        Ok(signed.to_string())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, PipelineError> {
        use futures::StreamExt;

        let mut stream = self.client.list(Some(&ObjectPath::from(prefix)));
        let mut keys = Vec::new();
        while let Some(meta) = stream.next().await {
            let meta = meta.map_err(|e| PipelineError::transient(e.to_string()))?;
            keys.push(meta.location.to_string());
        }
        Ok(keys)
    }
}
