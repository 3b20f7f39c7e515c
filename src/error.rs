use std::path::PathBuf;

use crate::command::ExitCode;

/// Failures reading or writing the configuration document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("can't read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("can't write config {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("config {} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("config section `{key}` is malformed: {source}")]
    Section {
        key: String,
        source: serde_json::Error,
    },
    #[error("config {} must hold a JSON object at the top level", path.display())]
    NotAnObject { path: PathBuf },
}

/// Problems found while assembling the registry. Any of these aborts startup.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("module `{0}` is registered twice")]
    DuplicateModule(String),
    #[error("command `{command}` is registered by both `{first}` and `{second}`")]
    DuplicateCommand {
        command: String,
        first: String,
        second: String,
    },
}

/// Why a dispatched command produced no output.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("command not found: {0}")]
    NotFound(String),
    #[error("{command}: {message}")]
    InvalidArgs { command: String, message: String },
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl DispatchError {
    /// Turn an error returned by a command body back into a typed dispatch error.
    pub fn from_command(err: anyhow::Error) -> Self {
        match err.downcast::<DispatchError>() {
            Ok(typed) => typed,
            Err(other) => DispatchError::Failed(other),
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self {
            DispatchError::NotFound(_) => 127,
            DispatchError::InvalidArgs { .. } => 2,
            DispatchError::Failed(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::invalid_args;

    #[test]
    fn test_from_command_keeps_usage_errors() {
        let err = DispatchError::from_command(invalid_args("goto", "pick one mode"));
        assert!(matches!(err, DispatchError::InvalidArgs { .. }));
        assert_eq!(err.to_string(), "goto: pick one mode");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_from_command_wraps_other_errors() {
        let err = DispatchError::from_command(anyhow::anyhow!("disk on fire"));
        assert!(matches!(err, DispatchError::Failed(_)));
        assert_eq!(err.to_string(), "disk on fire");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_not_found_exit_code() {
        let err = DispatchError::NotFound("nope".to_string());
        assert_eq!(err.to_string(), "command not found: nope");
        assert_eq!(err.exit_code(), 127);
    }
}
