// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

pub mod object_store_adapter;
pub mod recognizer_adapters;
pub mod source_fetcher_adapter;

pub use object_store_adapter::S3ObjectStoreAdapter;
pub use recognizer_adapters::{CliAsrRecognizer, CliDiarizer, CliLlmAnalyzer, CliTtsSynthesizer, TimestampAligningPostProcessor};
pub use source_fetcher_adapter::{HttpSourceFetcher, SourceEndpoint};
