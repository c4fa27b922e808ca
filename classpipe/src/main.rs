// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Composition root: loads configuration, wires repositories and adapters,
//! and dispatches to the command the CLI was invoked with.

use classpipe::application::use_cases::{ArtifactUseCases, Orchestrator, ResearchUseCases, UploadUseCases};
use classpipe::infrastructure::adapters::{
    CliAsrRecognizer, CliDiarizer, CliLlmAnalyzer, CliTtsSynthesizer, HttpSourceFetcher, S3ObjectStoreAdapter, SourceEndpoint,
    TimestampAligningPostProcessor,
};
use classpipe::infrastructure::config::Settings;
use classpipe::infrastructure::repositories::{
    SqliteClassSessionRepository, SqliteProcessingJobRepository, SqliteResearchCacheRepository, SqliteStageResultRepository,
    SqliteUploadSessionRepository,
};
use classpipe::infrastructure::logging;
use classpipe::infrastructure::repositories::schema::MIGRATIONS;
use classpipe::infrastructure::runtime::{StageWorker, StageWorkerDeps};
use classpipe_bootstrap::shutdown::ShutdownCoordinator;
use classpipe_bootstrap::{bootstrap_cli, result_to_exit_code, signals, ValidatedCommand};
use classpipe_domain::services::HashChecksumService;
use classpipe_domain::value_objects::{ClassSessionId, ProcessingJobId};
use classpipe_domain::PipelineError;
use object_store::aws::AmazonS3Builder;
use sqlx::sqlite::SqlitePoolOptions;
use std::str::FromStr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let validated = match bootstrap_cli() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("argument error: {e}");
            return std::process::ExitCode::from(64);
        }
    };

    logging::init_tracing(false);
    result_to_exit_code(run(validated.command).await)
}

async fn run(command: ValidatedCommand) -> Result<(), PipelineError> {
    let settings = Settings::load(&std::env::var("CLASSPIPE_PROFILE").unwrap_or_else(|_| "default".to_string()))?;

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await
        .map_err(|e| PipelineError::configuration(e.to_string()))?;
    sqlx::raw_sql(MIGRATIONS).execute(&pool).await.map_err(|e| PipelineError::configuration(e.to_string()))?;

    let class_sessions = Arc::new(SqliteClassSessionRepository::new(pool.clone()));
    let upload_sessions = Arc::new(SqliteUploadSessionRepository::new(pool.clone()));
    let jobs = Arc::new(SqliteProcessingJobRepository::new(pool.clone()));
    let cache = Arc::new(SqliteResearchCacheRepository::new(pool.clone()));
    let stage_results = Arc::new(SqliteStageResultRepository::new(pool.clone()));

    let mut s3_builder = AmazonS3Builder::new().with_bucket_name(&settings.object_store.bucket);
    if let Some(region) = &settings.object_store.region {
        s3_builder = s3_builder.with_region(region);
    }
    if let Some(endpoint) = &settings.object_store.endpoint {
        s3_builder = s3_builder.with_endpoint(endpoint);
    }
    let s3 = s3_builder.build().map_err(|e| PipelineError::configuration(e.to_string()))?;
    let object_store = Arc::new(S3ObjectStoreAdapter::new(Arc::new(s3)));

    let checksums = Arc::new(HashChecksumService);
    let orchestrator = Arc::new(Orchestrator::new(class_sessions.clone(), jobs.clone()));

    match command {
        ValidatedCommand::Upload { file, title } => {
            let upload_use_cases = UploadUseCases::new(class_sessions, upload_sessions.clone(), object_store.clone(), checksums.clone());
            let data = tokio::fs::read(&file).await.map_err(PipelineError::from)?;
            let (class_session_id, upload_session_id) = upload_use_cases.create_upload_session(&title, data.len() as u64).await?;
            upload_use_cases.upload_chunk(&upload_session_id, 1, data).await?;
            let checksum = upload_use_cases
                .assemble(&upload_session_id, &format!("recordings/{class_session_id}.wav"))
                .await?;
            orchestrator.start(&class_session_id).await?;
            println!("class_session_id={class_session_id} checksum={checksum}");
            Ok(())
        }
        ValidatedCommand::Status { class_session_id } => {
            let id = ClassSessionId::from_str(&class_session_id)?;
            let session = class_sessions.find_by_id(&id).await?.ok_or_else(|| PipelineError::not_found(class_session_id))?;
            println!("{}: {:?}", session.id(), session.state());
            Ok(())
        }
        ValidatedCommand::Cancel { job_id } => {
            let id = ProcessingJobId::from_str(&job_id)?;
            orchestrator.cancel(&id).await
        }
        ValidatedCommand::Retry { class_session_id } => {
            let id = ClassSessionId::from_str(&class_session_id)?;
            orchestrator.start(&id).await.map(|_| ())
        }
        ValidatedCommand::Reprocess { class_session_id, stage } => {
            let id = ClassSessionId::from_str(&class_session_id)?;
            let stage_kind = match stage {
                classpipe_bootstrap::cli::StageArgRepr::Asr => classpipe_domain::value_objects::StageKind::Asr,
                classpipe_bootstrap::cli::StageArgRepr::Diarization => classpipe_domain::value_objects::StageKind::Diarization,
                classpipe_bootstrap::cli::StageArgRepr::Postprocess => classpipe_domain::value_objects::StageKind::Postprocess,
                classpipe_bootstrap::cli::StageArgRepr::Nlp => classpipe_domain::value_objects::StageKind::Nlp,
                classpipe_bootstrap::cli::StageArgRepr::Research => classpipe_domain::value_objects::StageKind::Research,
                classpipe_bootstrap::cli::StageArgRepr::Export => classpipe_domain::value_objects::StageKind::Export,
            };
            orchestrator.reprocess_from(&id, stage_kind).await.map(|_| ())
        }
        ValidatedCommand::Worker { queue } => {
            let coordinator = ShutdownCoordinator::default();
            let shutdown_signal = tokio::spawn(signals::wait_for_shutdown_signal(coordinator.clone()));

            let research_endpoints = vec![
                SourceEndpoint { domain: "pubmed".to_string(), base_url: "https://pubmed.example".to_string(), authority_score: 0.95 },
                SourceEndpoint { domain: "who".to_string(), base_url: "https://who.example".to_string(), authority_score: 0.9 },
            ];
            let fetcher = Arc::new(HttpSourceFetcher::new(reqwest::Client::new(), research_endpoints));
            let research = Arc::new(ResearchUseCases::new(cache, fetcher));
            let artifacts = Arc::new(ArtifactUseCases::new(object_store.clone(), Arc::new(CliTtsSynthesizer::new("classpipe-tts"))));

            let worker = StageWorker::new(
                queue,
                StageWorkerDeps {
                    jobs,
                    stage_results,
                    orchestrator,
                    asr: Arc::new(CliAsrRecognizer::new("classpipe-asr")),
                    diarizer: Arc::new(CliDiarizer::new("classpipe-diarize")),
                    post_processor: Arc::new(TimestampAligningPostProcessor),
                    llm: Arc::new(CliLlmAnalyzer::new("classpipe-llm")),
                    research,
                    artifacts,
                    audio_dir: std::path::PathBuf::from("audio"),
                },
            );

            tokio::select! {
                _ = worker.run(coordinator.token()) => {}
                _ = shutdown_signal => {}
            }
            coordinator.wait_for_shutdown().await;
            Ok(())
        }
    }
}
