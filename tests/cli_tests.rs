use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Command, Output};

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_port-scan-rs"))
}

fn shipped_services() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("services.json")
}

fn run(args: &[&str]) -> Output {
    bin().args(args).output().expect("spawn binary")
}

fn temp_services(name: &str, body: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("{}-{}.json", name, std::process::id()));
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn help_exits_zero() {
    let out = run(&["-h"]);
    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Usage"));
}

#[test]
fn wrong_argument_count_exits_one() {
    assert_eq!(run(&[]).status.code(), Some(1));
    assert_eq!(run(&["127.0.0.1", "80"]).status.code(), Some(1));
    assert_eq!(run(&["127.0.0.1", "80", "81", "82"]).status.code(), Some(1));
}

#[test]
fn bad_ports_exit_one() {
    let services = shipped_services();
    let services = services.to_str().unwrap();
    for (start, end) in [("25", "20"), ("0", "10"), ("1", "70000"), ("http", "80")] {
        let out = run(&["127.0.0.1", start, end, "--services", services]);
        assert_eq!(out.status.code(), Some(1), "{start}-{end}");
        assert!(out.stdout.is_empty());
    }
}

#[test]
fn missing_service_directory_is_fatal() {
    let out = run(&["127.0.0.1", "1", "2", "--services", "/nonexistent/services.json"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("failed to read service directory"));
    assert!(out.stdout.is_empty());
}

#[test]
fn malformed_service_directory_is_fatal() {
    let path = temp_services("malformed-services", "{ not json");
    let out = run(&["127.0.0.1", "1", "2", "--services", path.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    let _ = std::fs::remove_file(path);
}

#[test]
fn unresolvable_host_is_fatal() {
    let services = shipped_services();
    let out = run(&[
        "no-such-host.invalid",
        "1",
        "2",
        "--services",
        services.to_str().unwrap(),
    ]);
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
}

#[test]
fn scan_prints_header_then_sorted_lines() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let path = temp_services("cli-services", &format!(r#"{{"{port}": "TestSvc"}}"#));
    let start = (port - 1).to_string();
    let end = port.saturating_add(1).to_string();

    let out = run(&[
        "127.0.0.1",
        &start,
        &end,
        "--services",
        path.to_str().unwrap(),
        "--no-color",
        "--timeout-ms",
        "500",
        "--read-timeout-ms",
        "300",
    ]);
    assert_eq!(out.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&out.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines[0].starts_with("Starting port scan on host 127.0.0.1"));
    let body = &lines[1..];
    assert!(!body.iter().any(|l| l.contains('\u{1b}')));
    let want = format!("[OPEN] Port {port} is open - Service: TestSvc");
    assert!(body.contains(&want.as_str()), "{stdout}");
    let ports: Vec<u16> = body
        .iter()
        .map(|l| l.split_whitespace().nth(2).unwrap().parse().unwrap())
        .collect();
    assert!(ports.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(ports.first(), Some(&(port - 1)));

    drop(listener);
    let _ = std::fs::remove_file(path);
}

#[test]
fn json_mode_emits_report() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let p = port.to_string();
    let services = shipped_services();

    let out = run(&[
        "127.0.0.1",
        &p,
        &p,
        "--services",
        services.to_str().unwrap(),
        "--json",
        "--read-timeout-ms",
        "200",
    ]);
    assert_eq!(out.status.code(), Some(0));
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["scanned_total"], 1);
    assert_eq!(v["entries"][0]["port"], port);
    assert_eq!(v["entries"][0]["state"], "open");
    drop(listener);
}
