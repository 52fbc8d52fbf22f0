#![cfg(feature = "cli")]

use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wrpc-sysinfo"))
        .arg("--log-level")
        .arg("error")
        .args(args)
        .output()
        .expect("wrpc-sysinfo should run")
}

#[test]
fn request_info_os_reports_host_os() {
    let output = run(&["--format", "json", "request-info", "OS"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(stdout.trim()).expect("output should be JSON");
    assert_eq!(json["function"], "wasmcloud:example/system-info.request-info");
    assert_eq!(json["params"], "OS");
    assert_eq!(json["value"], std::env::consts::OS);

    let os = std::env::consts::OS;
    let expected_wire = format!("{:02x}{}", os.len(), hex::encode(os));
    assert_eq!(json["wire"], expected_wire.as_str());
}

#[test]
fn call_returns_pong_wire() {
    let output = run(&["--format", "json", "call"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"value\":\"pong\""));
    assert!(stdout.contains("\"wire\":\"04706f6e67\""));
}

#[test]
fn call_reply_is_configurable() {
    let output = run(&["--format", "raw", "call", "--reply", "hello"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
}

#[test]
fn unknown_kind_is_usage_error() {
    let output = run(&["request-info", "cpu"]);
    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown kind `cpu`"));
}

#[test]
fn encode_string_to_hex() {
    let output = run(&["--format", "json", "encode", "--type", "string", "linux"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"wire\":\"056c696e7578\""));
    assert!(stdout.contains("\"wire_len\":6"));
}

#[test]
fn encode_raw_writes_wire_bytes() {
    let output = run(&["--format", "raw", "encode", "--type", "u32", "300"]);
    assert!(output.status.success());
    assert_eq!(output.stdout, [0xac, 0x02]);
}

#[test]
fn decode_kind_overflow_returns_60() {
    let output = run(&["decode", "--type", "kind", "8002"]);
    assert_eq!(output.status.code(), Some(60));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("discriminant overflows an 8-bit integer"));
}

#[test]
fn decode_exact_rejects_trailing_bytes() {
    let ok = run(&["--format", "json", "decode", "--type", "kind", "0100"]);
    assert!(ok.status.success());
    assert!(String::from_utf8_lossy(&ok.stdout).contains("\"value\":\"ARCH\""));

    let strict = run(&["decode", "--type", "kind", "0100", "--exact"]);
    assert_eq!(strict.status.code(), Some(60));
}

#[test]
fn decode_invalid_hex_is_usage_error() {
    let output = run(&["decode", "--type", "u8", "zz"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn interface_lists_both_functions() {
    let output = run(&["--format", "raw", "interface"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "wasmcloud:example/system-info.call",
            "wasmcloud:example/system-info.request-info",
        ]
    );
}

#[test]
fn version_prints_package_version() {
    let output = run(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!("wrpc-sysinfo {}", env!("CARGO_PKG_VERSION"))
    );
}
