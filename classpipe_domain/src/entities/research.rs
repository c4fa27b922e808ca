// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Research stage entities: per-term lookups, aggregated results, and the
//! content-addressed cache entry backing the research cache.

use crate::value_objects::{CacheContentType, CacheKey, ClassSessionId, ResearchJobId, SourceCacheId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MedicalSource {
    pub domain: String,
    pub url: String,
    pub title: String,
    pub authority_score: f64,
    pub relevance_score: f64,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ResearchResult {
    pub term: String,
    pub summary: String,
    pub sources: Vec<MedicalSource>,
    /// Literal placeholder: `0.8` when more than one source agrees, `0.5`
    /// otherwise. A real agreement/consensus model is future work.
    pub consensus_score: f64,
    pub from_cache: bool,
}

impl ResearchResult {
    pub fn consensus_score_for(sources_count: usize) -> f64 {
        if sources_count > 1 {
            0.8
        } else {
            0.5
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ResearchJob {
    pub id: ResearchJobId,
    pub class_session_id: ClassSessionId,
    pub terms: Vec<String>,
    pub results: Vec<ResearchResult>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ResearchJob {
    pub fn new(class_session_id: ClassSessionId, terms: Vec<String>) -> Self {
        Self {
            id: ResearchJobId::new(),
            class_session_id,
            terms,
            results: Vec::new(),
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SourceCacheEntry {
    pub id: SourceCacheId,
    pub cache_key: CacheKey,
    pub content_type: CacheContentType,
    pub payload: Vec<u8>,
    pub compressed: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub access_count: u64,
    pub last_accessed_at: DateTime<Utc>,
    /// Recomputed lazily at most once every 24h; see `touch`.
    pub access_frequency: f64,
    pub avg_relevance: f64,
    pub avg_authority: f64,
    pub avg_freshness: f64,
}

impl SourceCacheEntry {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn quality_score(&self) -> f64 {
        crate::value_objects::cache_quality_score(self.avg_relevance, self.avg_authority, self.avg_freshness)
    }

    /// Records a cache hit. Recomputes `access_frequency` only if at least
    /// 24h have elapsed since it was last refreshed, to avoid recomputing on
    /// every single hit.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.access_count += 1;
        if (now - self.last_accessed_at).num_hours() >= 24 {
            let days = (now - self.created_at).num_milliseconds() as f64 / (1000.0 * 60.0 * 60.0 * 24.0);
            self.access_frequency = crate::value_objects::research_cache::access_frequency(self.access_count, days);
        }
        self.last_accessed_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consensus_score_rewards_agreement() {
        assert_eq!(ResearchResult::consensus_score_for(3), 0.8);
        assert_eq!(ResearchResult::consensus_score_for(1), 0.5);
        assert_eq!(ResearchResult::consensus_score_for(0), 0.5);
    }
}
