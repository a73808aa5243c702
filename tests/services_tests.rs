use port_scan_rs::services::ServiceDirectory;
use std::path::Path;

#[test]
fn shipped_directory_loads() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("services.json");
    let dir = ServiceDirectory::load_from_path(path).expect("load ok");
    assert!(!dir.is_empty());
    assert_eq!(dir.lookup(22), Some("SSH"));
    assert_eq!(dir.lookup(443), Some("HTTPS"));
    assert_eq!(dir.lookup(1), None);
}

#[test]
fn whitespace_around_keys_is_tolerated() {
    let dir = ServiceDirectory::parse_json_str(r#"{" 8080 ": "HTTP-Proxy"}"#).expect("parse ok");
    assert_eq!(dir.lookup(8080), Some("HTTP-Proxy"));
}
