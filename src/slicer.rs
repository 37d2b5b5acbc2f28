//! Delimiter slicing and record decoding for script output.
//!
//! [`Slicer`] turns a byte stream into delimiter-bounded slices; [`Records`]
//! parses each slice as one JSON document. Both are forward-only iterators
//! that pull from the underlying reader only when asked for the next item.

use crate::error::{RegeditError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{self, Read};
use std::str::FromStr;
use tracing::debug;

/// Size of each read from the underlying stream.
const READ_CHUNK: usize = 8 * 1024;

/// What to do with bytes left after the last delimiter when the stream ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingSlice {
    /// Emit them as a final slice.
    #[default]
    Flush,
    /// Drop them.
    Discard,
}

impl FromStr for TrailingSlice {
    type Err = RegeditError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flush" => Ok(TrailingSlice::Flush),
            "discard" => Ok(TrailingSlice::Discard),
            other => Err(RegeditError::Config(format!(
                "unknown trailing slice policy '{}'",
                other
            ))),
        }
    }
}

/// Splits a byte stream on a fixed delimiter.
pub struct Slicer<R> {
    reader: R,
    delimiter: Vec<u8>,
    buffer: Vec<u8>,
    /// Bytes of `buffer` already searched without finding a delimiter.
    scanned: usize,
    trailing: TrailingSlice,
    eof: bool,
}

impl<R: Read> Slicer<R> {
    /// Creates a slicer over `reader`.
    ///
    /// # Panics
    ///
    /// Panics if `delimiter` is empty.
    pub fn new(reader: R, delimiter: impl Into<Vec<u8>>, trailing: TrailingSlice) -> Self {
        let delimiter = delimiter.into();
        assert!(!delimiter.is_empty(), "slice delimiter must not be empty");
        Self {
            reader,
            delimiter,
            buffer: Vec::new(),
            scanned: 0,
            trailing,
            eof: false,
        }
    }

    /// Pops the next complete slice out of the buffer, without its delimiter.
    fn take_slice(&mut self) -> Option<Vec<u8>> {
        let start = self.scanned.saturating_sub(self.delimiter.len() - 1);
        let found = self.buffer[start..]
            .windows(self.delimiter.len())
            .position(|w| w == self.delimiter.as_slice());

        match found {
            Some(pos) => {
                let end = start + pos;
                let mut slice: Vec<u8> = self.buffer.drain(..end + self.delimiter.len()).collect();
                slice.truncate(end);
                self.scanned = 0;
                Some(slice)
            }
            None => {
                self.scanned = self.buffer.len();
                None
            }
        }
    }

    fn take_trailing(&mut self) -> Option<Vec<u8>> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        match self.trailing {
            TrailingSlice::Flush => Some(rest),
            TrailingSlice::Discard => {
                debug!(bytes = rest.len(), "discarding trailing partial slice");
                None
            }
        }
    }
}

impl<R: Read> Iterator for Slicer<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(slice) = self.take_slice() {
                return Some(Ok(slice));
            }
            if self.eof {
                return self.take_trailing().map(Ok);
            }
            match self.reader.read(&mut chunk) {
                Ok(0) => self.eof = true,
                Ok(n) => self.buffer.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.eof = true;
                    self.buffer.clear();
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Parses each slice of a [`Slicer`] as one JSON document.
///
/// Empty slices are skipped. A slice that does not parse yields an error for
/// that record and decoding continues with the next slice.
pub struct Records<R> {
    slices: Slicer<R>,
}

impl<R: Read> Records<R> {
    /// Creates a record decoder over `reader`.
    pub fn new(reader: R, delimiter: impl Into<Vec<u8>>, trailing: TrailingSlice) -> Self {
        Self {
            slices: Slicer::new(reader, delimiter, trailing),
        }
    }
}

impl<R: Read> Iterator for Records<R> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let slice = match self.slices.next()? {
                Ok(slice) => slice,
                Err(e) => return Some(Err(RegeditError::Io(e))),
            };
            if slice.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return Some(serde_json::from_slice(&slice).map_err(|e| RegeditError::parse(e, &slice)));
        }
    }
}
