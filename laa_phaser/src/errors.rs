use itertools::Itertools;
use std::path::PathBuf;

/// Coarse classification of a [`LaaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A caller supplied an option the session manages itself.
    Configuration,
    /// The laa executable is not on the search path.
    ToolNotFound,
    /// laa could not be run, or exited unsuccessfully.
    ExternalProcess,
    /// An output artifact could not be read or is malformed.
    Parse,
    /// A sequence record has no summary or subread entry.
    Join,
    /// Records were requested outside of an acquired scope.
    Usage,
}

#[derive(Debug, thiserror::Error)]
pub enum LaaError {
    #[error("invalid options to laa: '{}'", options.iter().join(" "))]
    ReservedOptions { options: Vec<String> },

    #[error(
        "{exe} not found on the search path ({})",
        search_path.iter().map(|p| p.display()).join(":")
    )]
    ToolNotFound {
        exe: String,
        search_path: Vec<PathBuf>,
    },

    #[error("unable to launch `{command}`")]
    Launch {
        command: String,
        source: std::io::Error,
    },

    #[error("`{command}` failed with exit code {}:\n{stderr}", exit_code(code))]
    ExternalProcess {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("unable to create a temporary working directory for laa")]
    Workspace { source: std::io::Error },

    #[error("Error parsing {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("unknown record identifier '{id}' in {path:?}: no matching entry in the {missing}")]
    UnknownRecord {
        id: String,
        path: PathBuf,
        missing: &'static str,
    },

    #[error("{message}")]
    Usage { message: &'static str },
}

fn exit_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none (terminated by signal)".to_string(), |c| c.to_string())
}

impl LaaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LaaError::ReservedOptions { .. } => ErrorKind::Configuration,
            LaaError::ToolNotFound { .. } => ErrorKind::ToolNotFound,
            LaaError::Launch { .. }
            | LaaError::ExternalProcess { .. }
            | LaaError::Workspace { .. } => ErrorKind::ExternalProcess,
            LaaError::Parse { .. } => ErrorKind::Parse,
            LaaError::UnknownRecord { .. } => ErrorKind::Join,
            LaaError::Usage { .. } => ErrorKind::Usage,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        LaaError::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_process_message() {
        let err = LaaError::ExternalProcess {
            command: "/usr/bin/laa --doBc 0--0 data.xml".to_string(),
            code: Some(1),
            stderr: "fatal: bad barcode".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/usr/bin/laa --doBc 0--0 data.xml"));
        assert!(msg.contains("exit code 1"));
        assert!(msg.contains("fatal: bad barcode"));
        assert_eq!(err.kind(), ErrorKind::ExternalProcess);
    }

    #[test]
    fn test_signal_exit_code() {
        let err = LaaError::ExternalProcess {
            command: "laa".to_string(),
            code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_reserved_options_message() {
        let err = LaaError::ReservedOptions {
            options: vec!["--doBc".to_string(), "--resultFile".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "invalid options to laa: '--doBc --resultFile'"
        );
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
