//! Public registry operations.

use crate::arch::Architecture;
use crate::command::{base_args, build_args, Keys, Script};
use crate::config::RegeditConfig;
use crate::error::Result;
use crate::listing::{parse_listing, KeyListing, ListEntries};
use crate::process::{ProcessBridge, RecordStream};
use crate::value::{flatten_entries, PutValues};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Client for registry operations.
///
/// Every call starts its own interpreter process, so a client can be shared
/// between threads and used for concurrent calls.
#[derive(Debug, Clone)]
pub struct Regedit {
    script_dir: PathBuf,
    bridge: ProcessBridge,
}

impl Regedit {
    /// Creates a client with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be read to resolve
    /// the default script directory.
    pub fn new() -> Result<Self> {
        Self::with_config(RegeditConfig::default())
    }

    /// Creates a client from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the script directory cannot be made absolute.
    pub fn with_config(config: RegeditConfig) -> Result<Self> {
        Ok(Self {
            script_dir: config.resolved_script_dir()?,
            bridge: ProcessBridge::new(&config),
        })
    }

    /// Returns the absolute script directory.
    pub fn script_dir(&self) -> &Path {
        &self.script_dir
    }

    /// Lists keys and waits for the whole result.
    ///
    /// Returns the document printed by the list script, keyed by path.
    #[instrument(skip(self, keys))]
    pub fn list(&self, keys: impl Into<Keys>, arch: Architecture) -> Result<Value> {
        let keys = keys.into();
        let args = build_args(&self.script_dir, Script::List, arch, Some(&keys));
        self.bridge.execute(&args)
    }

    /// Lists keys and converts the result into [`KeyListing`]s.
    pub fn list_keys(
        &self,
        keys: impl Into<Keys>,
        arch: Architecture,
    ) -> Result<BTreeMap<String, KeyListing>> {
        parse_listing(self.list(keys, arch)?)
    }

    /// Lists keys as a stream of records, one per key.
    ///
    /// Records arrive while the script runs. Dropping the stream stops the
    /// script.
    #[instrument(skip(self, keys))]
    pub fn list_stream(&self, keys: impl Into<Keys>, arch: Architecture) -> Result<RecordStream> {
        let keys = keys.into();
        let args = base_args(&self.script_dir, Script::ListStream, arch);
        self.bridge.spawn_stream(&args, keys.to_tokens())
    }

    /// Like [`Regedit::list_stream`], with each record typed as a
    /// [`ListEntry`](crate::ListEntry).
    pub fn list_entries(
        &self,
        keys: impl Into<Keys>,
        arch: Architecture,
    ) -> Result<ListEntries> {
        Ok(ListEntries::new(self.list_stream(keys, arch)?))
    }

    /// Creates keys. Existing keys are left as they are.
    #[instrument(skip(self, keys))]
    pub fn create_key(&self, keys: impl Into<Keys>, arch: Architecture) -> Result<()> {
        self.run_keys(Script::CreateKey, keys.into(), arch)
    }

    /// Deletes keys.
    #[instrument(skip(self, keys))]
    pub fn delete_key(&self, keys: impl Into<Keys>, arch: Architecture) -> Result<()> {
        self.run_keys(Script::DeleteKey, keys.into(), arch)
    }

    /// Writes values. All entries go to a single script invocation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RegeditError::InvalidValueType`] before anything is
    /// spawned if a binary or multi-string value is not an array.
    #[instrument(skip(self, values))]
    pub fn put_value(&self, values: &PutValues, arch: Architecture) -> Result<()> {
        let tokens = flatten_entries(values)?;
        let args = base_args(&self.script_dir, Script::PutValue, arch);
        self.bridge.run_write_only(&args, tokens)
    }

    /// Returns operations bound to fixed architectures.
    pub fn arch(&self) -> ArchOps<'_> {
        ArchOps { regedit: self }
    }

    fn run_keys(&self, script: Script, keys: Keys, arch: Architecture) -> Result<()> {
        let args = base_args(&self.script_dir, script, arch);
        self.bridge.run_write_only(&args, keys.to_tokens())
    }
}

/// Operations with the architecture fixed.
///
/// The unsuffixed methods use [`Architecture::Specific`]; the `32` and `64`
/// variants force that view.
#[derive(Debug, Clone, Copy)]
pub struct ArchOps<'a> {
    regedit: &'a Regedit,
}

impl ArchOps<'_> {
    /// [`Regedit::list`] with [`Architecture::Specific`].
    pub fn list(&self, keys: impl Into<Keys>) -> Result<Value> {
        self.regedit.list(keys, Architecture::Specific)
    }

    /// [`Regedit::list`] with [`Architecture::X86`].
    pub fn list32(&self, keys: impl Into<Keys>) -> Result<Value> {
        self.regedit.list(keys, Architecture::X86)
    }

    /// [`Regedit::list`] with [`Architecture::X64`].
    pub fn list64(&self, keys: impl Into<Keys>) -> Result<Value> {
        self.regedit.list(keys, Architecture::X64)
    }

    /// [`Regedit::list_stream`] with [`Architecture::Specific`].
    pub fn list_stream(&self, keys: impl Into<Keys>) -> Result<RecordStream> {
        self.regedit.list_stream(keys, Architecture::Specific)
    }

    /// [`Regedit::list_stream`] with [`Architecture::X86`].
    pub fn list_stream32(&self, keys: impl Into<Keys>) -> Result<RecordStream> {
        self.regedit.list_stream(keys, Architecture::X86)
    }

    /// [`Regedit::list_stream`] with [`Architecture::X64`].
    pub fn list_stream64(&self, keys: impl Into<Keys>) -> Result<RecordStream> {
        self.regedit.list_stream(keys, Architecture::X64)
    }

    /// [`Regedit::create_key`] with [`Architecture::Specific`].
    pub fn create_key(&self, keys: impl Into<Keys>) -> Result<()> {
        self.regedit.create_key(keys, Architecture::Specific)
    }

    /// [`Regedit::create_key`] with [`Architecture::X86`].
    pub fn create_key32(&self, keys: impl Into<Keys>) -> Result<()> {
        self.regedit.create_key(keys, Architecture::X86)
    }

    /// [`Regedit::create_key`] with [`Architecture::X64`].
    pub fn create_key64(&self, keys: impl Into<Keys>) -> Result<()> {
        self.regedit.create_key(keys, Architecture::X64)
    }

    /// [`Regedit::delete_key`] with [`Architecture::Specific`].
    pub fn delete_key(&self, keys: impl Into<Keys>) -> Result<()> {
        self.regedit.delete_key(keys, Architecture::Specific)
    }

    /// [`Regedit::delete_key`] with [`Architecture::X86`].
    pub fn delete_key32(&self, keys: impl Into<Keys>) -> Result<()> {
        self.regedit.delete_key(keys, Architecture::X86)
    }

    /// [`Regedit::delete_key`] with [`Architecture::X64`].
    pub fn delete_key64(&self, keys: impl Into<Keys>) -> Result<()> {
        self.regedit.delete_key(keys, Architecture::X64)
    }

    /// [`Regedit::put_value`] with [`Architecture::Specific`].
    pub fn put_value(&self, values: &PutValues) -> Result<()> {
        self.regedit.put_value(values, Architecture::Specific)
    }

    /// [`Regedit::put_value`] with [`Architecture::X86`].
    pub fn put_value32(&self, values: &PutValues) -> Result<()> {
        self.regedit.put_value(values, Architecture::X86)
    }

    /// [`Regedit::put_value`] with [`Architecture::X64`].
    pub fn put_value64(&self, values: &PutValues) -> Result<()> {
        self.regedit.put_value(values, Architecture::X64)
    }
}
