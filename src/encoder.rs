//! Stdin token encoding.
//!
//! The scripts read their input by popping tokens off the end of what they
//! received, so tokens go on the wire last-first. Each token is terminated by
//! [`WIN_EOL`], the same sequence the scripts use to separate output records.

use std::io::{self, Write};
use tracing::debug;

/// Token and record delimiter used by the scripts.
pub const WIN_EOL: &str = "\r\n";

/// Encodes tokens in wire order.
pub fn encode_tokens<S: AsRef<str>>(tokens: &[S]) -> Vec<u8> {
    let capacity = tokens
        .iter()
        .map(|t| t.as_ref().len() + WIN_EOL.len())
        .sum();
    let mut buf = Vec::with_capacity(capacity);
    for token in tokens.iter().rev() {
        buf.extend_from_slice(token.as_ref().as_bytes());
        buf.extend_from_slice(WIN_EOL.as_bytes());
    }
    buf
}

/// Writes tokens to `sink` in wire order and closes it.
///
/// The sink is consumed and dropped after the final flush so the child sees
/// end of input.
pub fn write_tokens<S: AsRef<str>, W: Write>(tokens: &[S], mut sink: W) -> io::Result<()> {
    debug!(count = tokens.len(), "writing tokens to script stdin");
    sink.write_all(&encode_tokens(tokens))?;
    sink.flush()?;
    drop(sink);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_reverses() {
        let bytes = encode_tokens(&["first", "second", "third"]);
        assert_eq!(bytes, b"third\r\nsecond\r\nfirst\r\n");
    }

    #[test]
    fn test_encode_empty() {
        let tokens: [&str; 0] = [];
        assert!(encode_tokens(&tokens).is_empty());
    }

    #[test]
    fn test_write_tokens_to_buffer() {
        let mut out = Vec::new();
        write_tokens(&["HKCU\\a".to_string(), "HKCU\\b".to_string()], &mut out).unwrap();
        assert_eq!(out, b"HKCU\\b\r\nHKCU\\a\r\n");
    }
}
