// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Process-wide Prometheus metrics for stage throughput and the research
//! cache hit rate.

use prometheus::{IntCounterVec, IntGauge, Opts, Registry};
use std::sync::OnceLock;

pub struct PipelineMetrics {
    pub stage_completions: IntCounterVec,
    pub stage_failures: IntCounterVec,
    pub research_cache_hits: IntCounterVec,
    pub active_jobs: IntGauge,
}

impl PipelineMetrics {
    fn new(registry: &Registry) -> Self {
        let stage_completions = IntCounterVec::new(Opts::new("stage_completions_total", "Completed stage jobs"), &["stage"]).unwrap();
        let stage_failures = IntCounterVec::new(Opts::new("stage_failures_total", "Failed stage jobs"), &["stage"]).unwrap();
        let research_cache_hits = IntCounterVec::new(Opts::new("research_cache_hits_total", "Research cache lookups"), &["outcome"]).unwrap();
        let active_jobs = IntGauge::new("active_jobs", "Jobs currently running").unwrap();

        registry.register(Box::new(stage_completions.clone())).ok();
        registry.register(Box::new(stage_failures.clone())).ok();
        registry.register(Box::new(research_cache_hits.clone())).ok();
        registry.register(Box::new(active_jobs.clone())).ok();

        Self {
            stage_completions,
            stage_failures,
            research_cache_hits,
            active_jobs,
        }
    }
}

static METRICS: OnceLock<PipelineMetrics> = OnceLock::new();
static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

pub fn metrics() -> &'static PipelineMetrics {
    METRICS.get_or_init(|| PipelineMetrics::new(registry()))
}
