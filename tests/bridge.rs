//! Process bridge tests against a stand-in interpreter.
//!
//! `sh -c <body> fake-cscript` plays the part of `cscript.exe`, so the body
//! sees the bridge's arguments as `$1` (`//Nologo`), `$2` (script path),
//! `$3` (architecture) and `$4...` (inline keys).

#![cfg(unix)]

use regedit_bridge::{
    Architecture, PutValues, RegeditConfig, RegeditError, Regedit, RegistryValue, ScriptError,
    TrailingSlice,
};
use serde_json::json;
use std::path::PathBuf;

fn script_dir() -> PathBuf {
    std::env::temp_dir().join("regedit-bridge-vbs")
}

fn config(body: &str) -> RegeditConfig {
    RegeditConfig::new()
        .interpreter("sh")
        .launcher_args(["-c", body, "fake-cscript"])
        .script_dir(script_dir())
}

fn regedit(body: &str) -> Regedit {
    Regedit::with_config(config(body)).expect("failed to build client")
}

fn capture_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "regedit-bridge-{}-{}.stdin",
        std::process::id(),
        name
    ))
}

/// Client whose script copies its stdin into a file.
fn capturing(name: &str) -> (Regedit, PathBuf) {
    let path = capture_path(name);
    let _ = std::fs::remove_file(&path);
    let body = format!("cat > '{}'", path.display());
    (regedit(&body), path)
}

fn read_capture(path: &PathBuf) -> String {
    let text = std::fs::read_to_string(path).expect("script did not write capture file");
    let _ = std::fs::remove_file(path);
    text
}

// Buffered listing

#[test]
fn test_list_parses_stdout() {
    let result = regedit(r#"printf '{"a":1}'"#)
        .list("HKCU:Software", Architecture::Agnostic)
        .unwrap();
    assert_eq!(result, json!({"a": 1}));
}

#[test]
fn test_list_command_line() {
    let body = r#"printf '["%s","%s","%s","%s","%s"]' "$1" "$2" "$3" "$4" "$5""#;
    let result = regedit(body)
        .list(["HKCU:first", "HKCU:second"], Architecture::X86)
        .unwrap();

    let expected_script = script_dir().join("regList.wsf");
    assert_eq!(
        result,
        json!([
            "//Nologo",
            expected_script.to_str().unwrap(),
            "32",
            "HKCU:first",
            "HKCU:second"
        ])
    );
}

#[test]
fn test_list_not_json() {
    let err = regedit("printf not-json")
        .list("HKCU:x", Architecture::Agnostic)
        .unwrap_err();
    assert!(matches!(err, RegeditError::Parse { .. }));
    assert_eq!(err.raw_output(), Some("not-json"));
}

#[test]
fn test_list_mapped_exit_code_ignores_stdout() {
    let err = regedit(r#"printf '{"a":1}'; exit 5"#)
        .list("HKCU:x", Architecture::Agnostic)
        .unwrap_err();
    assert!(matches!(err, RegeditError::Script(ScriptError::AccessDenied)));
}

#[test]
fn test_list_unknown_exit_code() {
    let err = regedit("exit 3")
        .list("HKCU:x", Architecture::Agnostic)
        .unwrap_err();
    assert!(matches!(err, RegeditError::UnknownExitCode(3)));
}

#[test]
fn test_list_stderr_with_zero_exit() {
    let err = regedit(r#"printf oops >&2; printf '{}'"#)
        .list("HKCU:x", Architecture::Agnostic)
        .unwrap_err();
    match err {
        RegeditError::Stderr(text) => assert_eq!(text, "oops"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_list_keys_typed() {
    let body = r#"printf '{"%s":{"exists":true,"keys":["Child"],"values":{}}}' "$4""#;
    let listing = regedit(body)
        .list_keys("HKCU:Software", Architecture::Agnostic)
        .unwrap();
    assert!(listing["HKCU:Software"].exists);
    assert_eq!(listing["HKCU:Software"].keys, vec!["Child"]);
}

#[test]
fn test_arch_variants() {
    let client = regedit(r#"printf '"%s"' "$3""#);
    assert_eq!(client.arch().list("k").unwrap(), json!("S"));
    assert_eq!(client.arch().list32("k").unwrap(), json!("32"));
    assert_eq!(client.arch().list64("k").unwrap(), json!("64"));
    assert_eq!(client.list("k", Architecture::default()).unwrap(), json!("A"));
}

#[test]
fn test_concurrent_calls() {
    let client = regedit(r#"printf '{"key":"%s"}' "$4""#);
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let client = &client;
                scope.spawn(move || client.list(format!("key{}", i), Architecture::X64))
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            let result = handle.join().unwrap().unwrap();
            assert_eq!(result, json!({"key": format!("key{}", i)}));
        }
    });
}

// Streaming listing

#[test]
fn test_stream_yields_records_in_order() {
    let mut stream = regedit(r#"printf '{"k":1}\r\n{"k":2}\r\n'"#)
        .list_stream("HKCU:x", Architecture::Agnostic)
        .unwrap();
    assert_eq!(stream.next().unwrap().unwrap(), json!({"k": 1}));
    assert_eq!(stream.next().unwrap().unwrap(), json!({"k": 2}));
    assert!(stream.next().is_none());
    assert!(stream.next().is_none());
}

#[test]
fn test_stream_reads_keys_from_stdin_in_reverse() {
    let records: Vec<_> = regedit("cat")
        .list_stream(["1", "2", "3"], Architecture::Agnostic)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(records, vec![json!(3), json!(2), json!(1)]);
}

#[test]
fn test_stream_nonzero_exit_is_final_error() {
    let mut stream = regedit(r#"printf '{"k":1}\r\n'; exit 2"#)
        .list_stream("HKCU:x", Architecture::Agnostic)
        .unwrap();
    assert_eq!(stream.next().unwrap().unwrap(), json!({"k": 1}));
    let err = stream.next().unwrap().unwrap_err();
    assert!(matches!(err, RegeditError::Script(ScriptError::KeyNotFound)));
    assert!(stream.next().is_none());
}

#[test]
fn test_stream_trailing_slice_flushed() {
    let client = Regedit::with_config(
        config(r#"printf '{"k":1}\r\n{"k":2}'"#).trailing_slice(TrailingSlice::Flush),
    )
    .unwrap();
    let records: Vec<_> = client
        .list_stream("x", Architecture::Agnostic)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(records, vec![json!({"k": 1}), json!({"k": 2})]);
}

#[test]
fn test_stream_trailing_slice_discarded() {
    let client = Regedit::with_config(
        config(r#"printf '{"k":1}\r\n{"k":2}'"#).trailing_slice(TrailingSlice::Discard),
    )
    .unwrap();
    let records: Vec<_> = client
        .list_stream("x", Architecture::Agnostic)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(records, vec![json!({"k": 1})]);
}

#[test]
fn test_stream_bad_record_continues() {
    let records: Vec<_> = regedit(r#"printf '{"k":1}\r\nnope\r\n{"k":3}\r\n'"#)
        .list_stream("x", Architecture::Agnostic)
        .unwrap()
        .collect();
    assert_eq!(records.len(), 3);
    assert!(records[0].is_ok());
    assert_eq!(records[1].as_ref().unwrap_err().raw_output(), Some("nope"));
    assert_eq!(records[2].as_ref().unwrap(), &json!({"k": 3}));
}

#[test]
fn test_dropping_stream_stops_script() {
    let mut stream = regedit(r#"while :; do printf '{"k":1}\r\n'; done"#)
        .list_stream("x", Architecture::Agnostic)
        .unwrap();
    for _ in 0..3 {
        assert_eq!(stream.next().unwrap().unwrap(), json!({"k": 1}));
    }
    let pid = stream.id();

    // Must return instead of waiting for a script that never ends.
    drop(stream);

    let alive = std::process::Command::new("sh")
        .args(["-c", &format!("kill -0 {}", pid)])
        .stderr(std::process::Stdio::null())
        .status()
        .expect("failed to run kill")
        .success();
    assert!(!alive, "script {} still running after the stream was dropped", pid);
}

#[test]
fn test_list_entries_typed() {
    let body = r#"printf '{"key":"a","data":{"exists":true,"keys":["b"],"values":{}}}\r\n'"#;
    let entries: Vec<_> = regedit(body)
        .list_entries("a", Architecture::Agnostic)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].key, "a");
    assert_eq!(entries[0].data.keys, vec!["b"]);
}

// Write-only operations

#[test]
fn test_create_key_writes_reversed_tokens() {
    let (client, path) = capturing("create");
    client
        .create_key(["HKCU\\a", "HKCU\\b"], Architecture::Agnostic)
        .unwrap();
    assert_eq!(read_capture(&path), "HKCU\\b\r\nHKCU\\a\r\n");
}

#[test]
fn test_delete_key_single() {
    let (client, path) = capturing("delete");
    client.arch().delete_key64("HKCU\\gone").unwrap();
    assert_eq!(read_capture(&path), "HKCU\\gone\r\n");
}

#[test]
fn test_put_value_wire_format() {
    let (client, path) = capturing("put");
    let mut values = PutValues::new();
    let key = values.entry("HKCU\\k".to_string()).or_default();
    key.insert("Blob".to_string(), RegistryValue::binary(&[1, 2, 255]));
    key.insert("Name".to_string(), RegistryValue::string("hello"));

    client.put_value(&values, Architecture::Agnostic).unwrap();

    assert_eq!(
        read_capture(&path),
        "HKCU\\k\r\nName\r\nhello\r\nREG_SZ\r\nHKCU\\k\r\nBlob\r\n1,2,255\r\nREG_BINARY\r\n"
    );
}

#[test]
fn test_write_exit_zero_is_success() {
    regedit("exit 0")
        .create_key("HKCU\\a", Architecture::Agnostic)
        .unwrap();
}

#[test]
fn test_write_stderr_does_not_fail() {
    regedit("printf warning >&2")
        .delete_key("HKCU\\a", Architecture::Agnostic)
        .unwrap();
}

#[test]
fn test_write_mapped_exit_code() {
    let err = regedit("exit 5")
        .arch()
        .create_key("HKCU\\a")
        .unwrap_err();
    assert!(matches!(err, RegeditError::Script(ScriptError::AccessDenied)));
}

#[test]
fn test_write_unknown_exit_code() {
    let err = regedit("exit 42")
        .delete_key("HKCU\\a", Architecture::Agnostic)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "script process reported unknown error code 42"
    );
}

#[test]
fn test_write_missing_interpreter() {
    let client = Regedit::with_config(
        RegeditConfig::new()
            .interpreter("regedit-bridge-no-such-interpreter")
            .script_dir(script_dir()),
    )
    .unwrap();
    let err = client
        .create_key("HKCU\\a", Architecture::Agnostic)
        .unwrap_err();
    assert!(matches!(err, RegeditError::Spawn { .. }));
}
