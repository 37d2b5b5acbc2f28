//! Bridge configuration.
//!
//! Values are fixed once a [`crate::Regedit`] client is built from them.

use crate::error::{RegeditError, Result};
use crate::slicer::TrailingSlice;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable overriding the interpreter program.
pub const ENV_INTERPRETER: &str = "REGEDIT_INTERPRETER";

/// Environment variable overriding the script directory.
pub const ENV_SCRIPT_DIR: &str = "REGEDIT_SCRIPT_DIR";

/// Environment variable selecting the trailing slice policy (`flush` or `discard`).
pub const ENV_TRAILING_SLICE: &str = "REGEDIT_TRAILING_SLICE";

/// Default interpreter program.
pub const DEFAULT_INTERPRETER: &str = "cscript.exe";

/// Default script directory, relative to the working directory.
pub const DEFAULT_SCRIPT_DIR: &str = "vbs";

/// How the bridge launches scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegeditConfig {
    /// Interpreter program.
    pub interpreter: PathBuf,

    /// Arguments placed between the interpreter and the script invocation,
    /// for hosts that launch the interpreter through a wrapper.
    pub launcher_args: Vec<OsString>,

    /// Directory holding the `.wsf` scripts.
    pub script_dir: PathBuf,

    /// Policy for an unterminated last line of streamed output.
    pub trailing_slice: TrailingSlice,
}

impl Default for RegeditConfig {
    fn default() -> Self {
        Self {
            interpreter: PathBuf::from(DEFAULT_INTERPRETER),
            launcher_args: Vec::new(),
            script_dir: PathBuf::from(DEFAULT_SCRIPT_DIR),
            trailing_slice: TrailingSlice::default(),
        }
    }
}

impl RegeditConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration from the default values and the `REGEDIT_*`
    /// environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `REGEDIT_TRAILING_SLICE` holds an unknown policy.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(interpreter) = env::var_os(ENV_INTERPRETER) {
            config.interpreter = PathBuf::from(interpreter);
        }
        if let Some(dir) = env::var_os(ENV_SCRIPT_DIR) {
            config.script_dir = PathBuf::from(dir);
        }
        if let Ok(policy) = env::var(ENV_TRAILING_SLICE) {
            config.trailing_slice = policy.parse()?;
        }
        Ok(config)
    }

    /// Sets the interpreter program.
    pub fn interpreter(mut self, program: impl Into<PathBuf>) -> Self {
        self.interpreter = program.into();
        self
    }

    /// Sets the launcher arguments.
    pub fn launcher_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.launcher_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the script directory.
    pub fn script_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.script_dir = dir.into();
        self
    }

    /// Sets the trailing slice policy.
    pub fn trailing_slice(mut self, policy: TrailingSlice) -> Self {
        self.trailing_slice = policy;
        self
    }

    /// Returns the script directory as an absolute path.
    ///
    /// Relative directories are resolved against the current working
    /// directory at the time of the call.
    pub fn resolved_script_dir(&self) -> Result<PathBuf> {
        absolute(&self.script_dir)
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(RegeditError::Config("script directory is empty".to_string()));
    }
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(env::current_dir()?.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RegeditConfig::default();
        assert_eq!(config.interpreter, PathBuf::from("cscript.exe"));
        assert!(config.launcher_args.is_empty());
        assert_eq!(config.trailing_slice, TrailingSlice::Flush);
    }

    #[test]
    fn test_relative_dir_resolves() {
        let config = RegeditConfig::new().script_dir("scripts");
        let dir = config.resolved_script_dir().unwrap();
        assert!(dir.is_absolute());
        assert!(dir.ends_with("scripts"));
    }

    #[test]
    fn test_empty_dir_rejected() {
        let config = RegeditConfig::new().script_dir("");
        assert!(matches!(
            config.resolved_script_dir(),
            Err(RegeditError::Config(_))
        ));
    }

    #[test]
    fn test_builder_setters() {
        let config = RegeditConfig::new()
            .interpreter("sh")
            .launcher_args(["-c", "exit 0"])
            .trailing_slice(TrailingSlice::Discard);
        assert_eq!(config.interpreter, PathBuf::from("sh"));
        assert_eq!(config.launcher_args, vec![OsString::from("-c"), OsString::from("exit 0")]);
        assert_eq!(config.trailing_slice, TrailingSlice::Discard);
    }
}
