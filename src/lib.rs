//! # Windows Registry Bridge
//!
//! Registry access for hosts that cannot call the registry APIs themselves.
//! Every operation runs a `.wsf` script under `cscript.exe` and talks to it
//! over standard I/O.
//!
//! ## Features
//!
//! - **List** keys, either as one aggregated document or as a lazy stream of
//!   records that arrive while the script runs
//! - **Create** and **delete** keys, several per call
//! - **Put** typed values (`REG_SZ`, `REG_DWORD`, `REG_BINARY`,
//!   `REG_MULTI_SZ`, ...) in a single script invocation
//! - **Registry views**: architecture-agnostic, host-specific, forced 32-bit or
//!   forced 64-bit
//! - **Typed errors** for launch failures, script exit codes, stderr output
//!   and malformed script output
//!
//! ## Architecture
//!
//! 1. **Command builder** ([`command`]): `//Nologo <script> <arch> [keys...]`
//! 2. **Value renderer** ([`value`]): typed values to flat tokens
//! 3. **Stream encoder** ([`encoder`]): tokens to stdin, last token first
//! 4. **Process bridge** ([`process`]): buffered, streaming and write-only
//!    execution
//! 5. **Slicer** ([`slicer`]): stdout split on `\r\n`, one JSON record per slice
//! 6. **Error mapper** ([`error`]): script exit codes to [`ScriptError`]
//!
//! ## Wire Format
//!
//! ```text
//! stdin   token\r\n ... token\r\n      (reverse logical order)
//! stdout  {json}                       (buffered list)
//!         {json}\r\n{json}\r\n ...     (streaming list)
//! exit    0 = success, table code = ScriptError, other = unknown code
//! ```
//!
//! ## Examples
//!
//! ### Buffered listing
//!
//! ```no_run
//! use regedit_bridge::{Architecture, Regedit};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let regedit = Regedit::new()?;
//! let listing = regedit.list_keys("HKLM\\SOFTWARE", Architecture::default())?;
//! for (path, key) in &listing {
//!     println!("{}: {} subkeys", path, key.keys.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Streaming listing
//!
//! ```no_run
//! use regedit_bridge::{Architecture, Regedit};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let regedit = Regedit::new()?;
//! for record in regedit.list_stream(["HKCU\\Software", "HKLM\\SOFTWARE"], Architecture::X64)? {
//!     println!("{}", record?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Writing values
//!
//! ```no_run
//! use regedit_bridge::{PutValues, Regedit, RegistryValue};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let regedit = Regedit::new()?;
//! regedit.arch().create_key64("HKCU\\Software\\MyApp")?;
//!
//! let mut values = PutValues::new();
//! let app = values.entry("HKCU\\Software\\MyApp".to_string()).or_default();
//! app.insert("Name".to_string(), RegistryValue::string("my app"));
//! app.insert("Flags".to_string(), RegistryValue::binary(&[1, 0, 1]));
//! regedit.arch().put_value64(&values)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! Diagnostics are emitted through `tracing`. Install a subscriber to see
//! argument vectors, process lifecycle and the raw output of failed scripts;
//! without one, logging costs nothing.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arch;
pub mod command;
pub mod config;
pub mod encoder;
pub mod error;
pub mod listing;
pub mod process;
pub mod regedit;
pub mod slicer;
pub mod value;

// Re-export main types for convenience
pub use arch::Architecture;
pub use command::{Keys, Script};
pub use config::RegeditConfig;
pub use encoder::WIN_EOL;
pub use error::{map_code, RegeditError, Result, ScriptError};
pub use listing::{KeyListing, ListEntries, ListEntry};
pub use process::{ProcessBridge, RecordStream};
pub use regedit::{ArchOps, Regedit};
pub use slicer::{Records, Slicer, TrailingSlice};
pub use value::{render_value, PutValues, RegistryValue, ValueType};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
