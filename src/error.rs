//! Error types for registry bridge operations.
//!
//! This module covers every failure a call can end in: malformed input caught
//! before a process is spawned, interpreter launch failures, script exit
//! codes, and output that does not parse. It also holds the fixed table that
//! maps script exit codes to [`ScriptError`] kinds.

use std::io;
use thiserror::Error;

/// Result type alias for registry bridge operations.
pub type Result<T> = std::result::Result<T, RegeditError>;

/// Errors that can occur while running a registry operation.
#[derive(Error, Debug)]
pub enum RegeditError {
    /// A binary or multi-string value was not supplied as an array.
    #[error("invalid value type {actual} for registry type {registry_type}, please use an array")]
    InvalidValueType {
        /// Upper-cased registry type tag, e.g. `REG_BINARY`.
        registry_type: String,
        /// JSON type that was actually received.
        actual: &'static str,
    },

    /// The interpreter process could not be started.
    #[error("failed to launch {program}: {source}")]
    Spawn {
        /// Program that was being launched.
        program: String,
        /// Underlying launch error.
        #[source]
        source: io::Error,
    },

    /// I/O error on one of the child process pipes.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The script exited with a known error code.
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// The script exited with a code that is not in the error table.
    #[error("script process reported unknown error code {0}")]
    UnknownExitCode(i32),

    /// The script was terminated without an exit code.
    #[error("script process was terminated before it exited")]
    Terminated,

    /// The script exited cleanly but wrote to stderr.
    #[error("script process reported an error: {0}")]
    Stderr(String),

    /// Script output was not valid JSON.
    #[error("failed to parse script output: {source}")]
    Parse {
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
        /// Raw output that failed to parse.
        raw: String,
    },

    /// A configuration value could not be used.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl RegeditError {
    /// Creates a parse error that keeps the raw output for diagnostics.
    ///
    /// # Arguments
    ///
    /// * `source` - The JSON error
    /// * `raw` - Raw bytes that were being parsed
    pub fn parse(source: serde_json::Error, raw: &[u8]) -> Self {
        Self::Parse {
            source,
            raw: String::from_utf8_lossy(raw).into_owned(),
        }
    }

    /// Creates a launch error for the given program.
    pub fn spawn(program: impl Into<String>, source: io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    /// Creates the error for a nonzero script exit code.
    ///
    /// Known codes become [`RegeditError::Script`], everything else
    /// [`RegeditError::UnknownExitCode`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use regedit_bridge::error::{RegeditError, ScriptError};
    /// let err = RegeditError::from_exit_code(5);
    /// assert!(matches!(err, RegeditError::Script(ScriptError::AccessDenied)));
    ///
    /// let err = RegeditError::from_exit_code(4242);
    /// assert!(matches!(err, RegeditError::UnknownExitCode(4242)));
    /// ```
    pub fn from_exit_code(code: i32) -> Self {
        map_code(code).unwrap_or(Self::UnknownExitCode(code))
    }

    /// Returns the raw output attached to a parse error, if any.
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            Self::Parse { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// Registry failures reported by the scripts through their exit code.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptError {
    /// Registry key or value not found.
    #[error("registry key or value not found")]
    KeyNotFound,

    /// Access denied.
    #[error("access denied")]
    AccessDenied,

    /// The script was started without its required arguments.
    #[error("script was invoked without its required arguments")]
    MissingArguments,

    /// The requested architecture does not exist on this host.
    #[error("invalid architecture for this host")]
    InvalidArchitecture,

    /// The key path does not begin with a known hive.
    #[error("key path does not start with a known hive")]
    InvalidHive,

    /// The script cannot handle the requested value type.
    #[error("registry value type is not supported by the script")]
    UnsupportedValueType,

    /// The script could not read its input tokens.
    #[error("script could not read its input tokens")]
    MalformedInput,

    /// The registry rejected a value write.
    #[error("registry rejected the value write")]
    ValueNotWritten,
}

/// Exit code table used by the scripts.
const SCRIPT_ERRORS: &[(i32, ScriptError)] = &[
    (2, ScriptError::KeyNotFound),
    (5, ScriptError::AccessDenied),
    (25121, ScriptError::MissingArguments),
    (25122, ScriptError::InvalidArchitecture),
    (25123, ScriptError::InvalidHive),
    (25124, ScriptError::UnsupportedValueType),
    (25125, ScriptError::MalformedInput),
    (25126, ScriptError::ValueNotWritten),
];

impl ScriptError {
    /// Looks up the error kind for a script exit code.
    pub fn from_code(code: i32) -> Option<Self> {
        SCRIPT_ERRORS
            .iter()
            .find(|(known, _)| *known == code)
            .map(|(_, kind)| *kind)
    }

    /// Returns the exit code the scripts use for this error.
    pub fn code(&self) -> i32 {
        SCRIPT_ERRORS
            .iter()
            .find(|(_, kind)| kind == self)
            .map(|(code, _)| *code)
            .unwrap_or_default()
    }

    /// Human-readable description of the registry failure.
    pub fn description(&self) -> String {
        self.to_string()
    }
}

/// Maps a script exit code to its error, or `None` when the code is unknown.
///
/// Callers pick their own fallback for unknown codes.
pub fn map_code(code: i32) -> Option<RegeditError> {
    ScriptError::from_code(code).map(RegeditError::Script)
}
