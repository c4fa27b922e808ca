// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Per-term medical research, backed by the content-addressed research
//! cache. Terms are looked up with a bounded worker pool so a session with
//! many extracted terms doesn't spawn one task per term.

use crate::infrastructure::metrics;
use classpipe_domain::entities::{ResearchResult, SourceCacheEntry};
use classpipe_domain::repositories::ResearchCacheRepository;
use classpipe_domain::value_objects::{boosted_ttl_hours, should_compress, CacheContentType, CacheKey, SourceCacheId};
use classpipe_domain::PipelineError;
use chrono::{Duration, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::Semaphore;

const MAX_CONCURRENT_LOOKUPS: usize = 8;

pub struct ResearchUseCases {
    cache: Arc<dyn ResearchCacheRepository>,
    fetcher: Arc<dyn classpipe_domain::services::SourceFetcher>,
}

impl ResearchUseCases {
    pub fn new(cache: Arc<dyn ResearchCacheRepository>, fetcher: Arc<dyn classpipe_domain::services::SourceFetcher>) -> Self {
        Self { cache, fetcher }
    }

    /// Resolves every term, preferring the cache and falling back to a live
    /// fetch, capped at `MAX_CONCURRENT_LOOKUPS` simultaneous fetches.
    pub async fn research_terms(&self, terms: &[String]) -> Result<Vec<ResearchResult>, PipelineError> {
        let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_LOOKUPS));
        let mut tasks = Vec::with_capacity(terms.len());

        for term in terms {
            let term = term.clone();
            let permit = semaphore.clone().acquire_owned().await.expect("semaphore never closed");
            let cache = self.cache.clone();
            let fetcher = self.fetcher.clone();
            tasks.push(tokio::spawn(async move {
                let _permit = permit;
                research_one_term(cache, fetcher, &term).await
            }));
        }

        let mut results = Vec::with_capacity(tasks.len());
        for task in tasks {
            results.push(task.await.map_err(|e| PipelineError::transient(e.to_string()))??);
        }
        Ok(results)
    }
}

async fn research_one_term(
    cache: Arc<dyn ResearchCacheRepository>,
    fetcher: Arc<dyn classpipe_domain::services::SourceFetcher>,
    term: &str,
) -> Result<ResearchResult, PipelineError> {
    let config = BTreeMap::new();
    let key = CacheKey::generate(term, &config);

    if let Some(entry) = cache.get(&key).await? {
        if !entry.is_expired(Utc::now()) {
            cache.touch(&key).await?;
            let payload = decode_payload(&entry)?;
            metrics::metrics().research_cache_hits.with_label_values(&["hit"]).inc();
            return Ok(payload);
        }
    }
    metrics::metrics().research_cache_hits.with_label_values(&["miss"]).inc();

    let sources = fetcher.fetch(term).await?;
    let consensus_score = ResearchResult::consensus_score_for(sources.len());
    let result = ResearchResult {
        term: term.to_string(),
        summary: format!("{} source(s) consulted for {term}", sources.len()),
        sources: sources.clone(),
        consensus_score,
        from_cache: false,
    };

    let avg_relevance = average(sources.iter().map(|s| s.relevance_score));
    let avg_authority = average(sources.iter().map(|s| s.authority_score));
    let domains: Vec<String> = sources.iter().map(|s| s.domain.clone()).collect();
    let ttl_hours = boosted_ttl_hours(CacheContentType::General, &domains);

    let serialized = serde_json::to_vec(&SerializableResult::from(&result)).map_err(PipelineError::from)?;
    let compressed = gzip(&serialized)?;
    let use_compression = should_compress(serialized.len(), compressed.len());

    let now = Utc::now();
    let entry = SourceCacheEntry {
        id: SourceCacheId::new(),
        cache_key: key.clone(),
        content_type: CacheContentType::General,
        payload: if use_compression { compressed } else { serialized },
        compressed: use_compression,
        created_at: now,
        expires_at: now + Duration::hours(ttl_hours),
        access_count: 0,
        last_accessed_at: now,
        access_frequency: 0.0,
        avg_relevance,
        avg_authority,
        avg_freshness: 1.0,
    };
    cache.put(&entry).await?;

    Ok(result)
}

fn average(values: impl Iterator<Item = f64>) -> f64 {
    let values: Vec<f64> = values.collect();
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn gzip(data: &[u8]) -> Result<Vec<u8>, PipelineError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).map_err(PipelineError::from)?;
    encoder.finish().map_err(PipelineError::from)
}

fn decode_payload(entry: &SourceCacheEntry) -> Result<ResearchResult, PipelineError> {
    let bytes = if entry.compressed {
        use flate2::read::GzDecoder;
        use std::io::Read;
        let mut decoder = GzDecoder::new(&entry.payload[..]);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).map_err(PipelineError::from)?;
        out
    } else {
        entry.payload.clone()
    };
    let mut parsed: SerializableResult = serde_json::from_slice(&bytes).map_err(PipelineError::from)?;
    parsed.from_cache = true;
    Ok(parsed.into())
}

/// JSON-serializable mirror of `ResearchResult` (domain sources aren't serde
/// types since the domain intentionally stays decoupled from wire formats).
#[derive(serde::Serialize, serde::Deserialize)]
struct SerializableResult {
    term: String,
    summary: String,
    sources: Vec<SerializableSource>,
    consensus_score: f64,
    from_cache: bool,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct SerializableSource {
    domain: String,
    url: String,
    title: String,
    authority_score: f64,
    relevance_score: f64,
}

impl From<&ResearchResult> for SerializableResult {
    fn from(r: &ResearchResult) -> Self {
        Self {
            term: r.term.clone(),
            summary: r.summary.clone(),
            sources: r
                .sources
                .iter()
                .map(|s| SerializableSource {
                    domain: s.domain.clone(),
                    url: s.url.clone(),
                    title: s.title.clone(),
                    authority_score: s.authority_score,
                    relevance_score: s.relevance_score,
                })
                .collect(),
            consensus_score: r.consensus_score,
            from_cache: r.from_cache,
        }
    }
}

impl From<SerializableResult> for ResearchResult {
    fn from(r: SerializableResult) -> Self {
        Self {
            term: r.term,
            summary: r.summary,
            sources: r
                .sources
                .into_iter()
                .map(|s| classpipe_domain::entities::MedicalSource {
                    domain: s.domain,
                    url: s.url,
                    title: s.title,
                    authority_score: s.authority_score,
                    relevance_score: s.relevance_score,
                })
                .collect(),
            consensus_score: r.consensus_score,
            from_cache: r.from_cache,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_of_empty_iterator_is_zero() {
        assert_eq!(average(std::iter::empty()), 0.0);
    }
}
