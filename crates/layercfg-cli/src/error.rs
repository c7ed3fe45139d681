//! CLI exit codes for scripting and automation.
//!
//! Exit codes 1-4 identify the failing stage so wrapper scripts can tell a
//! broken config file from a key that is simply not configured anywhere.

use layercfg_core::{EditorError, LoadError, ResolveError};

/// Structured exit codes for layercfg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Command completed successfully.
    Success = 0,

    /// Unhandled or generic failure, including secret backend setup.
    GeneralError = 1,

    /// The config file could not be opened, read or parsed.
    LoadError = 2,

    /// A requested key is not set in any consulted source.
    NotFound = 3,

    /// The editor could not be launched or exited unsuccessfully.
    EditorError = 4,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }

    /// Pick the exit code for an error returned by a command.
    pub fn from_error(err: &anyhow::Error) -> Self {
        if err.downcast_ref::<LoadError>().is_some() {
            ExitCode::LoadError
        } else if err.downcast_ref::<ResolveError>().is_some() {
            ExitCode::NotFound
        } else if err.downcast_ref::<EditorError>().is_some() {
            ExitCode::EditorError
        } else {
            ExitCode::GeneralError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layercfg_core::ConsultedSources;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::LoadError.as_i32(), 2);
        assert_eq!(ExitCode::NotFound.as_i32(), 3);
        assert_eq!(ExitCode::EditorError.as_i32(), 4);
    }

    #[test]
    fn test_from_error_mapping() {
        let miss = anyhow::Error::new(ResolveError::NotFound {
            key: "K".to_string(),
            consulted: ConsultedSources::default(),
        });
        assert_eq!(ExitCode::from_error(&miss), ExitCode::NotFound);

        let editor = anyhow::Error::new(EditorError::NoConfigPath).context("while editing");
        assert_eq!(ExitCode::from_error(&editor), ExitCode::EditorError);

        let other = anyhow::anyhow!("something else");
        assert_eq!(ExitCode::from_error(&other), ExitCode::GeneralError);
    }
}
