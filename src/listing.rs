//! Typed views of list output.
//!
//! The buffered list script prints one document keyed by the requested paths:
//!
//! ```text
//! {
//!   "HKLM\\SOFTWARE": {
//!     "exists": true,
//!     "keys": ["Classes", "Microsoft"],
//!     "values": { "Version": { "type": "REG_SZ", "value": "1.0" } }
//!   }
//! }
//! ```
//!
//! The streaming script prints one `{ "key": ..., "data": { ... } }` record per
//! line, where `data` has the same shape as a single key above.

use crate::error::{RegeditError, Result};
use crate::process::RecordStream;
use crate::value::RegistryValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Contents of one listed key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyListing {
    /// Whether the key exists. Missing keys list no subkeys or values.
    #[serde(default)]
    pub exists: bool,

    /// Names of direct subkeys.
    #[serde(default)]
    pub keys: Vec<String>,

    /// Values by name.
    #[serde(default)]
    pub values: BTreeMap<String, RegistryValue>,
}

/// One record of a streaming listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEntry {
    /// Key path the record describes.
    pub key: String,

    /// Contents of the key.
    pub data: KeyListing,
}

/// Streaming listing with each record typed as a [`ListEntry`].
#[derive(Debug)]
pub struct ListEntries {
    records: RecordStream,
}

impl ListEntries {
    /// Wraps a record stream. Dropping the wrapper stops the script.
    pub fn new(records: RecordStream) -> Self {
        Self { records }
    }
}

impl Iterator for ListEntries {
    type Item = Result<ListEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.records
            .next()
            .map(|record| record.and_then(parse_entry))
    }
}

/// Converts a buffered list document into typed listings.
pub fn parse_listing(document: Value) -> Result<BTreeMap<String, KeyListing>> {
    from_record(document)
}

/// Converts one streamed record into a [`ListEntry`].
pub fn parse_entry(record: Value) -> Result<ListEntry> {
    from_record(record)
}

fn from_record<T: serde::de::DeserializeOwned>(record: Value) -> Result<T> {
    let raw = record.to_string();
    serde_json::from_value(record).map_err(|source| RegeditError::Parse { source, raw })
}
