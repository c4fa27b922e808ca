// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Unix-style exit code mapping so shell scripts and process supervisors can
//! distinguish failure classes without parsing log output.

use classpipe_domain::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    UsageError = 64,
    DataError = 65,
    NotFound = 66,
    Unavailable = 69,
    ConfigError = 78,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

pub fn map_error_to_exit_code(error: &PipelineError) -> ExitCode {
    match error {
        PipelineError::NotFound(_) => ExitCode::NotFound,
        PipelineError::Validation(_) => ExitCode::DataError,
        PipelineError::Configuration(_) => ExitCode::ConfigError,
        PipelineError::Transient(_) | PipelineError::External(_) => ExitCode::Unavailable,
        PipelineError::InvalidState(_) | PipelineError::Fatal(_) => ExitCode::GeneralError,
    }
}

pub fn result_to_exit_code(result: Result<(), PipelineError>) -> std::process::ExitCode {
    match result {
        Ok(()) => ExitCode::Success.into(),
        Err(e) => {
            tracing::error!("{e}");
            map_error_to_exit_code(&e).into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_66() {
        assert_eq!(map_error_to_exit_code(&PipelineError::not_found("x")), ExitCode::NotFound);
    }

    #[test]
    fn configuration_maps_to_78() {
        assert_eq!(map_error_to_exit_code(&PipelineError::configuration("x")), ExitCode::ConfigError);
    }
}
