//! CLI Integration Tests
//!
//! These tests verify that the CLI commands work correctly end-to-end.
//! They test the actual binary behavior, not just the library.
//!
//! Run with:
//! ```bash
//! cargo test --test cli_integration
//! ```

use std::path::Path;
use std::process::Command;
use tempfile::tempdir;
use tree_snapshot::{NodeIdentity, NodeKind, SnapshotFile, StoreConfig, TreeSnapshot};

const VIEW: &str = r#"{
    "state": "726f6f74",
    "children": [
        {
            "id": {"kind": {"named": "List"}},
            "tree": {
                "state": "6c697374",
                "children": [
                    {"id": {"kind": {"named": "Row"}, "key": "7"}, "tree": {"state": "07"}}
                ]
            }
        },
        {"id": {"kind": {"named": "Header"}}, "tree": {}}
    ]
}"#;

/// Run treesnap and return (stdout, stderr, success)
fn run_treesnap(args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_treesnap"))
        .args(args)
        .output()
        .expect("Failed to execute treesnap");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

fn write_view(dir: &Path) -> String {
    let path = dir.join("view.json");
    std::fs::write(&path, VIEW).unwrap();
    path.to_str().unwrap().to_string()
}

fn parse_json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout.trim()).expect("stdout should be JSON")
}

// ============================================================================
// Build Tests
// ============================================================================

#[test]
fn test_cli_build_writes_loadable_file() {
    let dir = tempdir().unwrap();
    let view = write_view(dir.path());
    let out = dir.path().join("tree.snap");

    let (stdout, stderr, success) = run_treesnap(&["build", &view, out.to_str().unwrap()]);
    assert!(success, "build should succeed: {}", stderr);

    let json = parse_json(&stdout);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["nodes"], 4);

    let snapshot = SnapshotFile::load(&out, &StoreConfig::default()).unwrap();
    assert_eq!(snapshot.state().unwrap().as_ref(), b"root");
    let row = snapshot
        .descend(&[
            NodeIdentity::unkeyed(NodeKind::named("List")),
            NodeIdentity::new(NodeKind::named("Row"), "7"),
        ])
        .unwrap()
        .unwrap();
    assert_eq!(row.state().unwrap().as_ref(), &[7]);
}

#[test]
fn test_cli_build_raw() {
    let dir = tempdir().unwrap();
    let view = write_view(dir.path());
    let out = dir.path().join("tree.bin");

    let (_stdout, stderr, success) =
        run_treesnap(&["build", &view, out.to_str().unwrap(), "--raw"]);
    assert!(success, "build --raw should succeed: {}", stderr);

    let bytes = std::fs::read(&out).unwrap();
    let snapshot = TreeSnapshot::parse_validated(bytes).unwrap();
    assert_eq!(snapshot.node_count().unwrap(), 4);
}

#[test]
fn test_cli_build_rejects_bad_view() {
    let dir = tempdir().unwrap();
    let view = dir.path().join("bad.json");
    std::fs::write(&view, r#"{"state": "not hex"}"#).unwrap();
    let out = dir.path().join("tree.snap");

    let (_stdout, _stderr, success) =
        run_treesnap(&["build", view.to_str().unwrap(), out.to_str().unwrap()]);
    assert!(!success, "invalid hex state should fail");
    assert!(!out.exists());
}

// ============================================================================
// Inspect / Verify Tests
// ============================================================================

#[test]
fn test_cli_inspect_shows_tree_and_header() {
    let dir = tempdir().unwrap();
    let view = write_view(dir.path());
    let out = dir.path().join("tree.snap");
    let out_str = out.to_str().unwrap();
    run_treesnap(&["build", &view, out_str]);

    let (stdout, stderr, success) = run_treesnap(&["inspect", out_str]);
    assert!(success, "inspect should succeed: {}", stderr);

    let json = parse_json(&stdout);
    assert_eq!(json["tree"]["state"], "726f6f74");
    assert_eq!(json["tree"]["children"].as_array().unwrap().len(), 2);
    assert_eq!(json["header"]["version"], 1);
    assert_eq!(json["header"]["compressed"], true);
}

#[test]
fn test_cli_verify_reports_shape() {
    let dir = tempdir().unwrap();
    let view = write_view(dir.path());
    let out = dir.path().join("tree.snap");
    let out_str = out.to_str().unwrap();
    run_treesnap(&["build", &view, out_str]);

    let (stdout, stderr, success) = run_treesnap(&["verify", out_str]);
    assert!(success, "verify should succeed: {}", stderr);

    let json = parse_json(&stdout);
    assert_eq!(json["nodes"], 4);
    assert_eq!(json["depth"], 3);
    assert_eq!(json["checksum"].as_str().unwrap().len(), 64);
}

#[test]
fn test_cli_verify_fails_on_truncated_raw_snapshot() {
    let dir = tempdir().unwrap();
    let view = write_view(dir.path());
    let out = dir.path().join("tree.bin");
    let out_str = out.to_str().unwrap();
    run_treesnap(&["build", &view, out_str, "--raw"]);

    let mut bytes = std::fs::read(&out).unwrap();
    bytes.pop();
    std::fs::write(&out, &bytes).unwrap();

    let (_stdout, _stderr, success) = run_treesnap(&["verify", out_str, "--raw"]);
    assert!(!success, "verify should reject a truncated snapshot");
}

#[test]
fn test_cli_verify_fails_on_corrupt_file() {
    let dir = tempdir().unwrap();
    let view = write_view(dir.path());
    let out = dir.path().join("tree.snap");
    let out_str = out.to_str().unwrap();
    run_treesnap(&["build", &view, out_str]);

    let mut bytes = std::fs::read(&out).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    std::fs::write(&out, &bytes).unwrap();

    let (_stdout, stderr, success) = run_treesnap(&["verify", out_str]);
    assert!(!success, "verify should reject a corrupt file");
    assert!(stderr.contains("Checksum mismatch"), "stderr: {}", stderr);
}

// ============================================================================
// Extract Tests
// ============================================================================

#[test]
fn test_cli_extract_subtree() {
    let dir = tempdir().unwrap();
    let view = write_view(dir.path());
    let out = dir.path().join("tree.snap");
    let sub = dir.path().join("list.snap");
    run_treesnap(&["build", &view, out.to_str().unwrap()]);

    let (stdout, stderr, success) = run_treesnap(&[
        "extract",
        out.to_str().unwrap(),
        "List",
        "-o",
        sub.to_str().unwrap(),
    ]);
    assert!(success, "extract should succeed: {}", stderr);
    assert_eq!(parse_json(&stdout)["nodes"], 2);

    let config = StoreConfig::default();
    let whole = SnapshotFile::load(&out, &config).unwrap();
    let list = SnapshotFile::load(&sub, &config).unwrap();
    assert_eq!(
        whole
            .child(&NodeIdentity::unkeyed(NodeKind::named("List")))
            .unwrap()
            .unwrap(),
        &list
    );
}

#[test]
fn test_cli_extract_missing_path_fails() {
    let dir = tempdir().unwrap();
    let view = write_view(dir.path());
    let out = dir.path().join("tree.snap");
    let sub = dir.path().join("missing.snap");
    run_treesnap(&["build", &view, out.to_str().unwrap()]);

    let (_stdout, stderr, success) = run_treesnap(&[
        "extract",
        out.to_str().unwrap(),
        "List",
        "Row:8",
        "-o",
        sub.to_str().unwrap(),
    ]);
    assert!(!success);
    assert!(stderr.contains("No child Row:8"), "stderr: {}", stderr);
}

#[test]
fn test_cli_extract_ambiguous_segment_fails() {
    let dir = tempdir().unwrap();
    let view = dir.path().join("colliding.json");
    // Both identities display as `Row:7`
    std::fs::write(
        &view,
        r#"{
            "children": [
                {"id": {"kind": {"named": "Row:7"}}, "tree": {"state": "01"}},
                {"id": {"kind": {"named": "Row"}, "key": "7"}, "tree": {"state": "02"}}
            ]
        }"#,
    )
    .unwrap();
    let out = dir.path().join("tree.snap");
    let sub = dir.path().join("row.snap");
    let (_stdout, stderr, success) =
        run_treesnap(&["build", view.to_str().unwrap(), out.to_str().unwrap()]);
    assert!(success, "build should succeed: {}", stderr);

    let (_stdout, stderr, success) = run_treesnap(&[
        "extract",
        out.to_str().unwrap(),
        "Row:7",
        "-o",
        sub.to_str().unwrap(),
    ]);
    assert!(!success, "ambiguous segment should fail");
    assert!(stderr.contains("Ambiguous child Row:7"), "stderr: {}", stderr);
    assert!(!sub.exists());
}

#[test]
fn test_cli_verify_rejects_overly_deep_snapshot() {
    let dir = tempdir().unwrap();
    let id = NodeIdentity::unkeyed(NodeKind::named("n")).to_bytes().unwrap();
    let levels = tree_snapshot::MAX_TREE_DEPTH * 4;
    let per_level = 16 + id.len();

    let mut raw = Vec::new();
    for depth in 0..levels - 1 {
        let child_len = 8 + (levels - 2 - depth) * per_level;
        raw.extend_from_slice(&0u32.to_be_bytes());
        raw.extend_from_slice(&1i32.to_be_bytes());
        raw.extend_from_slice(&(id.len() as u32).to_be_bytes());
        raw.extend_from_slice(&id);
        raw.extend_from_slice(&(child_len as u32).to_be_bytes());
    }
    raw.extend_from_slice(&[0u8; 8]);
    let path = dir.path().join("deep.bin");
    std::fs::write(&path, &raw).unwrap();

    let (_stdout, stderr, success) = run_treesnap(&["verify", path.to_str().unwrap(), "--raw"]);
    assert!(!success, "verify should reject a too-deep snapshot");
    assert!(stderr.contains("deeper than"), "stderr: {}", stderr);
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_cli_config_disables_compression() {
    let dir = tempdir().unwrap();
    let view = write_view(dir.path());
    let config = dir.path().join("store.json");
    std::fs::write(&config, r#"{"compression": "none"}"#).unwrap();
    let out = dir.path().join("tree.snap");

    let (_stdout, stderr, success) = run_treesnap(&[
        "-c",
        config.to_str().unwrap(),
        "build",
        &view,
        out.to_str().unwrap(),
    ]);
    assert!(success, "build with config should succeed: {}", stderr);

    let header = SnapshotFile::read_header(&out).unwrap();
    assert!(!header.compressed);
}
