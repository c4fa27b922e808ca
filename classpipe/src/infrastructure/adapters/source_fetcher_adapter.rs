// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `SourceFetcher` port implementation querying configured medical-source
//! endpoints over HTTP. One domain configured per source; results are
//! merged, not deduplicated, since the research use case scores consensus
//! across all returned sources.

use async_trait::async_trait;
use classpipe_domain::entities::MedicalSource;
use classpipe_domain::services::SourceFetcher;
use classpipe_domain::PipelineError;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct SourceEndpoint {
    pub domain: String,
    pub base_url: String,
    pub authority_score: f64,
}

pub struct HttpSourceFetcher {
    client: reqwest::Client,
    endpoints: Vec<SourceEndpoint>,
}

impl HttpSourceFetcher {
    pub fn new(client: reqwest::Client, endpoints: Vec<SourceEndpoint>) -> Self {
        Self { client, endpoints }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    url: String,
    title: String,
    relevance: f64,
}

#[async_trait]
impl SourceFetcher for HttpSourceFetcher {
    async fn fetch(&self, term: &str) -> Result<Vec<MedicalSource>, PipelineError> {
        let mut sources = Vec::new();
        for endpoint in &self.endpoints {
            let response = self
                .client
                .get(format!("{}/search", endpoint.base_url))
                .query(&[("q", term)])
                .send()
                .await
                .map_err(|e| PipelineError::external(format!("{}: {e}", endpoint.domain)))?;

            if !response.status().is_success() {
                continue;
            }

            let parsed: SearchResponse = response.json().await.map_err(|e| PipelineError::external(format!("{}: {e}", endpoint.domain)))?;
            sources.extend(parsed.results.into_iter().map(|hit| MedicalSource {
                domain: endpoint.domain.clone(),
                url: hit.url,
                title: hit.title,
                authority_score: endpoint.authority_score,
                relevance_score: hit.relevance,
            }));
        }
        Ok(sources)
    }
}
