// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Value objects: immutable, self-validating types with no identity of
//! their own.

pub mod checksum;
pub mod chunk_size;
pub mod enums;
pub mod generic_id;
pub mod ids;
pub mod research_cache;

pub use checksum::{Md5Checksum, Sha256Checksum};
pub use chunk_size::ChunkSize;
pub use enums::{ClassSessionState, JobPriority, ProcessingJobState, RequestedKind, StageKind, StageKindRepr, UploadSessionState};
pub use generic_id::{GenericId, IdCategory};
pub use ids::{ChunkUploadId, ClassSessionId, ProcessingJobId, ResearchJobId, SourceCacheId, UploadSessionId};
pub use research_cache::{boosted_ttl_hours, cache_quality_score, should_compress, CacheContentType, CacheKey};
