// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

pub mod schema;
pub mod sqlite;

pub use sqlite::{
    SqliteClassSessionRepository, SqliteProcessingJobRepository, SqliteResearchCacheRepository, SqliteStageResultRepository,
    SqliteUploadSessionRepository,
};
