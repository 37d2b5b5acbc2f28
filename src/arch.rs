//! Registry view selection.

use crate::error::{RegeditError, Result};
use std::fmt;
use std::str::FromStr;

/// Which registry view a call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Architecture {
    /// Use whatever view the interpreter process gets.
    ///
    /// A 32-bit interpreter on a 64-bit machine sees `HKLM\Software` redirected
    /// to `HKLM\Software\Wow6432Node`.
    #[default]
    Agnostic,

    /// Use the view matching the host OS, detected by the script.
    ///
    /// The 32-bit software hive on a 64-bit machine must then be addressed
    /// explicitly through `Wow6432Node`.
    Specific,

    /// Force the 32-bit view.
    X86,

    /// Force the 64-bit view. No effect on 32-bit machines.
    X64,
}

impl Architecture {
    /// All selectors, in command-line token order.
    pub const ALL: [Architecture; 4] = [
        Architecture::Agnostic,
        Architecture::Specific,
        Architecture::X86,
        Architecture::X64,
    ];

    /// Returns the token passed to the scripts.
    pub fn as_arg(&self) -> &'static str {
        match self {
            Architecture::Agnostic => "A",
            Architecture::Specific => "S",
            Architecture::X86 => "32",
            Architecture::X64 => "64",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_arg())
    }
}

impl FromStr for Architecture {
    type Err = RegeditError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "agnostic" => Ok(Architecture::Agnostic),
            "s" | "specific" => Ok(Architecture::Specific),
            "32" | "x86" => Ok(Architecture::X86),
            "64" | "x64" => Ok(Architecture::X64),
            other => Err(RegeditError::Config(format!(
                "unknown architecture '{}'",
                other
            ))),
        }
    }
}
