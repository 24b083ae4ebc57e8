use std::path::PathBuf;

/// Errors raised while talking to the engine process.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("could not launch engine '{path}': {source}")]
    Spawn {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("engine process has no {0} pipe")]
    MissingPipe(&'static str),

    #[error("engine worker thread is gone")]
    WorkerGone,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A reply line that could not be turned into a typed response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("engine sent no reply")]
    EmptyReply,

    #[error("expected '{expected}' reply, got '{line}'")]
    UnexpectedReply { expected: &'static str, line: String },

    #[error("malformed {field} in '{line}'")]
    Malformed { field: &'static str, line: String },

    #[error("engine reported owners overlap (A={owner_a:#x}, B={owner_b:#x})")]
    OverlappingOwners { owner_a: u64, owner_b: u64 },

    #[error("engine refused the command: {0}")]
    Refused(String),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("failed to write TOML: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_error_display() {
        let err = EngineError::Spawn {
            path: PathBuf::from("./3d-connect4"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(
            err.to_string(),
            "could not launch engine './3d-connect4': not found"
        );
    }

    #[test]
    fn test_protocol_error_display() {
        let err = ProtocolError::UnexpectedReply {
            expected: "bestmove",
            line: "made_move 0 0 0 1 ongoing".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "expected 'bestmove' reply, got 'made_move 0 0 0 1 ongoing'"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("engine.search_depth must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: engine.search_depth must be > 0"
        );
    }
}
