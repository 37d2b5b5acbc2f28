//! Argument vectors for the script interpreter.
//!
//! Every invocation has the shape
//!
//! ```text
//! //Nologo <script dir>\<script>.wsf <A|S|32|64> [key ...]
//! ```
//!
//! Each element is a separate process argument. No shell is involved, so
//! nothing is quoted or escaped.

use crate::arch::Architecture;
use std::ffi::OsString;
use std::path::Path;
use tracing::debug;

/// Flag that stops `cscript.exe` from printing its banner.
pub const NOLOGO_FLAG: &str = "//Nologo";

/// Script programs shipped alongside the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// Buffered listing; keys passed as arguments.
    List,
    /// Streaming listing; keys passed on stdin.
    ListStream,
    /// Key creation; keys passed on stdin.
    CreateKey,
    /// Key deletion; keys passed on stdin.
    DeleteKey,
    /// Value writes; entries passed on stdin.
    PutValue,
}

impl Script {
    /// Returns the script file name inside the script directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Script::List => "regList.wsf",
            Script::ListStream => "regListStream.wsf",
            Script::CreateKey => "regCreateKey.wsf",
            Script::DeleteKey => "regDeleteKey.wsf",
            Script::PutValue => "regPutValue.wsf",
        }
    }
}

/// One or more registry key paths, in caller order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keys(Vec<String>);

impl Keys {
    /// Returns the key paths.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Returns true if no key was given.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the key paths as stdin tokens.
    pub fn to_tokens(&self) -> Vec<String> {
        self.0.clone()
    }
}

impl From<&str> for Keys {
    fn from(key: &str) -> Self {
        Keys(vec![key.to_string()])
    }
}

impl From<String> for Keys {
    fn from(key: String) -> Self {
        Keys(vec![key])
    }
}

impl From<Vec<String>> for Keys {
    fn from(keys: Vec<String>) -> Self {
        Keys(keys)
    }
}

impl From<&[&str]> for Keys {
    fn from(keys: &[&str]) -> Self {
        Keys(keys.iter().map(|k| k.to_string()).collect())
    }
}

impl From<Vec<&str>> for Keys {
    fn from(keys: Vec<&str>) -> Self {
        Keys::from(keys.as_slice())
    }
}

impl<const N: usize> From<[&str; N]> for Keys {
    fn from(keys: [&str; N]) -> Self {
        Keys::from(&keys[..])
    }
}

impl FromIterator<String> for Keys {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Keys(iter.into_iter().collect())
    }
}

/// Builds the fixed part of an invocation: banner flag, script path and
/// architecture token.
///
/// `script_dir` is expected to be absolute; [`crate::config::RegeditConfig`]
/// resolves it before any command is built.
pub fn base_args(script_dir: &Path, script: Script, arch: Architecture) -> Vec<OsString> {
    vec![
        OsString::from(NOLOGO_FLAG),
        script_dir.join(script.file_name()).into_os_string(),
        OsString::from(arch.as_arg()),
    ]
}

/// Builds a full invocation, appending each inline key as its own argument.
pub fn build_args(
    script_dir: &Path,
    script: Script,
    arch: Architecture,
    inline_keys: Option<&Keys>,
) -> Vec<OsString> {
    let mut args = base_args(script_dir, script, arch);
    match inline_keys {
        Some(keys) => args.extend(keys.as_slice().iter().map(OsString::from)),
        None => debug!(script = script.file_name(), "creating command without inline keys"),
    }
    args
}
