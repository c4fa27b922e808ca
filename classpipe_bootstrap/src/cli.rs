// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Command-line surface. Parses with `clap`, then validates paths and
//! numeric ranges before handing a [`ValidatedCommand`] to the application.

use crate::logger::{BootstrapLogger, ConsoleLogger};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "classpipe", about = "Processing pipeline for recorded class audio", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a recording and start it through the pipeline.
    Upload {
        file: PathBuf,
        #[arg(long)]
        title: Option<String>,
    },
    /// Show the current stage and state of a class session.
    Status { class_session_id: String },
    /// Cancel a queued or running processing job.
    Cancel { job_id: String },
    /// Retry the most recent failed job for a class session.
    Retry { class_session_id: String },
    /// Rewind a class session to a given stage and reprocess from there.
    Reprocess {
        class_session_id: String,
        #[arg(value_enum)]
        stage: StageArg,
    },
    /// Run a stage worker loop against a named queue.
    Worker {
        #[arg(long, default_value = "processing")]
        queue: String,
    },
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
pub enum StageArg {
    Asr,
    Diarization,
    Postprocess,
    Nlp,
    Research,
    Export,
}

#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
    pub verbose: bool,
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    Upload { file: PathBuf, title: String },
    Status { class_session_id: String },
    Cancel { job_id: String },
    Retry { class_session_id: String },
    Reprocess { class_session_id: String, stage: StageArgRepr },
    Worker { queue: String },
}

#[derive(Debug, Clone, Copy)]
pub enum StageArgRepr {
    Asr,
    Diarization,
    Postprocess,
    Nlp,
    Research,
    Export,
}

impl From<StageArg> for StageArgRepr {
    fn from(stage: StageArg) -> Self {
        match stage {
            StageArg::Asr => StageArgRepr::Asr,
            StageArg::Diarization => StageArgRepr::Diarization,
            StageArg::Postprocess => StageArgRepr::Postprocess,
            StageArg::Nlp => StageArgRepr::Nlp,
            StageArg::Research => StageArgRepr::Research,
            StageArg::Export => StageArgRepr::Export,
        }
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("invalid value for --{arg}: {reason}")]
    InvalidValue { arg: String, reason: String },
    #[error("path does not exist: {0}")]
    PathNotFound(PathBuf),
}

/// Rejects paths containing `..` components, which would let an argument
/// escape the working directory it was meant to be relative to.
fn validate_no_traversal(path: &std::path::Path, arg: &str) -> Result<(), ParseError> {
    if path.components().any(|c| matches!(c, std::path::Component::ParentDir)) {
        return Err(ParseError::InvalidValue {
            arg: arg.to_string(),
            reason: "must not contain '..' path components".to_string(),
        });
    }
    Ok(())
}

pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    let logger = ConsoleLogger::new();
    validate_cli(Cli::parse(), &logger)
}

/// Validates a parsed [`Cli`], logging through `logger` rather than
/// `tracing` directly, since this runs before `logging::init_tracing`
/// wires up the real subscriber. Tests can pass a capturing/no-op logger
/// instead of a [`ConsoleLogger`].
fn validate_cli(cli: Cli, logger: &dyn BootstrapLogger) -> Result<ValidatedCli, ParseError> {
    logger.debug(&format!("parsed command: {:?}", cli.command));

    let command = match cli.command {
        Commands::Upload { file, title } => {
            validate_no_traversal(&file, "file")?;
            if !file.exists() {
                logger.error(&format!("upload file not found: {}", file.display()));
                return Err(ParseError::PathNotFound(file));
            }
            let title = title.unwrap_or_else(|| {
                file.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_else(|| "untitled".to_string())
            });
            logger.info(&format!("validated upload of {} as \"{}\"", file.display(), title));
            ValidatedCommand::Upload { file, title }
        }
        Commands::Status { class_session_id } => ValidatedCommand::Status { class_session_id },
        Commands::Cancel { job_id } => ValidatedCommand::Cancel { job_id },
        Commands::Retry { class_session_id } => ValidatedCommand::Retry { class_session_id },
        Commands::Reprocess { class_session_id, stage } => ValidatedCommand::Reprocess {
            class_session_id,
            stage: stage.into(),
        },
        Commands::Worker { queue } => {
            if !["processing", "export", "notion", "default"].contains(&queue.as_str()) {
                logger.error(&format!("unknown queue {queue}"));
                return Err(ParseError::InvalidValue {
                    arg: "queue".to_string(),
                    reason: format!("unknown queue {queue}"),
                });
            }
            logger.info(&format!("starting worker loop against queue \"{queue}\""));
            ValidatedCommand::Worker { queue }
        }
    };

    Ok(ValidatedCli {
        command,
        verbose: cli.verbose,
        config: cli.config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::CapturingLogger;

    #[test]
    fn rejects_parent_dir_traversal() {
        let path = PathBuf::from("../../etc/passwd");
        assert!(validate_no_traversal(&path, "file").is_err());
    }

    #[test]
    fn accepts_plain_relative_path() {
        let path = PathBuf::from("recordings/lecture.wav");
        assert!(validate_no_traversal(&path, "file").is_ok());
    }

    #[test]
    fn worker_command_with_unknown_queue_logs_an_error_before_failing() {
        let cli = Cli {
            command: Commands::Worker { queue: "bogus".to_string() },
            verbose: false,
            config: None,
        };
        let logger = CapturingLogger::new();

        let result = validate_cli(cli, &logger);

        assert!(result.is_err());
        assert!(logger.messages().iter().any(|m| m.message.contains("unknown queue bogus")));
    }

    #[test]
    fn worker_command_with_known_queue_logs_info_and_succeeds() {
        let cli = Cli {
            command: Commands::Worker { queue: "processing".to_string() },
            verbose: false,
            config: None,
        };
        let logger = CapturingLogger::new();

        let result = validate_cli(cli, &logger);

        assert!(result.is_ok());
        assert!(logger.messages().iter().any(|m| m.message.contains("processing")));
    }
}
