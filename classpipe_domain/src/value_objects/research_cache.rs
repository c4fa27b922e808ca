// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Research cache keying, TTL policy, and quality scoring.
//!
//! Ported from the source system's cache key derivation: SHA-256 over the
//! lowercased, trimmed search term plus the sorted `key=value` pairs of the
//! search configuration. TTL hours are looked up by content type and then
//! boosted by the set of source domains consulted.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheContentType {
    Academic,
    Clinical,
    DrugInfo,
    Epidemiology,
    General,
    News,
}

impl CacheContentType {
    /// Base TTL in hours before source-type boosts are applied. `General` is
    /// also the fallback for any caller-supplied type this enum doesn't cover.
    pub fn base_ttl_hours(&self) -> i64 {
        match self {
            CacheContentType::Academic => 720,
            CacheContentType::Clinical => 168,
            CacheContentType::DrugInfo => 24,
            CacheContentType::Epidemiology => 72,
            CacheContentType::General => 168,
            CacheContentType::News => 6,
        }
    }
}

impl Default for CacheContentType {
    fn default() -> Self {
        CacheContentType::General
    }
}

/// Applies source-type TTL boosts on top of a content type's base TTL.
/// `pubmed` floors the TTL at 720h; `who`/`nih` floor it at 336h.
pub fn boosted_ttl_hours(content_type: CacheContentType, source_domains: &[String]) -> i64 {
    let mut ttl = content_type.base_ttl_hours();
    for domain in source_domains {
        let d = domain.to_lowercase();
        if d.contains("pubmed") {
            ttl = ttl.max(720);
        } else if d.contains("who") || d.contains("nih") {
            ttl = ttl.max(336);
        }
    }
    ttl
}

/// Content-addressed key for a cached research lookup.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// `sha256(lowercase(trim(term)) + "|" + sorted "k=v" config pairs)`.
    pub fn generate(term: &str, config: &BTreeMap<String, String>) -> Self {
        let normalized_term = term.trim().to_lowercase();
        let config_str = config
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",");
        let payload = format!("{normalized_term}|{config_str}");
        let digest = Sha256::digest(payload.as_bytes());
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a payload should be gzip-compressed before being stored: only
/// when it's large enough and compression actually saves more than 20%.
pub fn should_compress(original_size: usize, compressed_size: usize) -> bool {
    if original_size < 1024 {
        return false;
    }
    let ratio = compressed_size as f64 / original_size as f64;
    ratio < 0.8
}

/// `0.4 * avg_relevance + 0.4 * avg_authority + 0.2 * avg_freshness`, each
/// component expected in `[0.0, 1.0]`.
pub fn cache_quality_score(avg_relevance: f64, avg_authority: f64, avg_freshness: f64) -> f64 {
    0.4 * avg_relevance + 0.4 * avg_authority + 0.2 * avg_freshness
}

/// `access_count / days_since_creation`, floored at one day to avoid
/// division blowup for cache entries created less than a day ago.
pub fn access_frequency(access_count: u64, days_since_creation: f64) -> f64 {
    access_count as f64 / days_since_creation.max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_is_stable_for_equivalent_input() {
        let mut cfg = BTreeMap::new();
        cfg.insert("max_sources".to_string(), "5".to_string());
        let a = CacheKey::generate("  Myocardial Infarction ", &cfg);
        let b = CacheKey::generate("myocardial infarction", &cfg);
        assert_eq!(a, b);
    }

    #[test]
    fn pubmed_floors_ttl_at_720_hours() {
        let ttl = boosted_ttl_hours(CacheContentType::News, &["pubmed.ncbi.nlm.nih.gov".to_string()]);
        assert_eq!(ttl, 720);
    }

    #[test]
    fn compression_requires_size_and_ratio_thresholds() {
        assert!(!should_compress(512, 100)); // too small to bother
        assert!(!should_compress(2048, 1800)); // not enough savings
        assert!(should_compress(2048, 1000));
    }

    #[test]
    fn quality_score_weights_relevance_and_authority_equally() {
        let score = cache_quality_score(1.0, 1.0, 0.0);
        assert!((score - 0.8).abs() < 1e-9);
    }
}
