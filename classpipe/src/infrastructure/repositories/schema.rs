// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! SQLite schema. Entities are persisted as JSON documents alongside the
//! indexed columns the repositories actually query on, rather than a fully
//! normalized relational model — the domain entities already own their
//! invariants, so the database's job is durable storage and queue ordering.

pub const MIGRATIONS: &str = r#"
CREATE TABLE IF NOT EXISTS class_sessions (
    id TEXT PRIMARY KEY,
    state TEXT NOT NULL,
    document TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS upload_sessions (
    id TEXT PRIMARY KEY,
    class_session_id TEXT,
    state TEXT NOT NULL,
    document TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_upload_sessions_class_session
    ON upload_sessions(class_session_id, state);

CREATE TABLE IF NOT EXISTS processing_jobs (
    id TEXT PRIMARY KEY,
    class_session_id TEXT NOT NULL,
    queue TEXT NOT NULL,
    state TEXT NOT NULL,
    priority INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    document TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_processing_jobs_queue
    ON processing_jobs(queue, state, priority DESC, created_at ASC);

CREATE TABLE IF NOT EXISTS source_cache_entries (
    cache_key TEXT PRIMARY KEY,
    expires_at TEXT NOT NULL,
    document TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_source_cache_expires ON source_cache_entries(expires_at);

CREATE TABLE IF NOT EXISTS stage_results (
    class_session_id TEXT NOT NULL,
    stage TEXT NOT NULL,
    document TEXT NOT NULL,
    produced_at TEXT NOT NULL,
    PRIMARY KEY (class_session_id, stage)
);
"#;
