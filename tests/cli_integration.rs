use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const NETSCAPE_FIXTURE: &str = "# Netscape HTTP Cookie File\n\
.example.com\tTRUE\t/\tTRUE\t1767225600\tsid\tabc\n\
shop.example\tFALSE\t/cart\tFALSE\t0\tcart\t3\n\
broken line\n";

fn cookiekit(jar: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("cookiekit");
    cmd.arg("--jar").arg(jar);
    cmd
}

fn import_fixture(jar: &Path, dir: &Path) {
    let file = dir.join("cookies.txt");
    fs::write(&file, NETSCAPE_FIXTURE).expect("write fixture");
    let output = cookiekit(jar)
        .arg("import")
        .arg(&file)
        .output()
        .expect("run cookiekit");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Imported 2 cookies, 1 malformed lines skipped"),
        "unexpected import report: {}",
        stderr
    );
}

fn export_json(jar: &Path) -> serde_json::Value {
    let output = cookiekit(jar)
        .args(["export", "--format", "json"])
        .output()
        .expect("run cookiekit");
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).expect("export is JSON")
}

#[test]
fn test_cli_help_succeeds() {
    let output = cargo_bin_cmd!("cookiekit")
        .arg("--help")
        .output()
        .expect("run cookiekit");
    assert!(output.status.success(), "help should exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"), "help should include usage text");
    assert!(stdout.contains("delete-domain"));
}

#[test]
fn test_cli_requires_subcommand() {
    let output = cargo_bin_cmd!("cookiekit").output().expect("run cookiekit");
    assert!(!output.status.success());
}

#[test]
fn test_cli_import_then_list_and_export() {
    let temp = tempdir().expect("tempdir");
    let jar = temp.path().join("jar.sqlite");
    import_fixture(&jar, temp.path());

    let output = cookiekit(&jar).arg("list").output().expect("run cookiekit");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(".example.com (1)"));
    assert!(stdout.contains("sid=abc"));
    assert!(stdout.contains("cart=3"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("2 of 2 cookies across 2 domains"));

    let output = cookiekit(&jar)
        .args(["export", "--format", "netscape", "--filter", "SHOP"])
        .output()
        .expect("run cookiekit");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("# Netscape HTTP Cookie File"));
    assert!(stdout.contains("shop.example\tFALSE\t/cart\tFALSE\t0\tcart\t3"));
    assert!(!stdout.contains("sid"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Exported 1 cookies to Netscape"));
}

#[test]
fn test_cli_export_to_file() {
    let temp = tempdir().expect("tempdir");
    let jar = temp.path().join("jar.sqlite");
    import_fixture(&jar, temp.path());

    let target = temp.path().join("out.json");
    let output = cookiekit(&jar)
        .args(["export", "--domain", ".example.com", "-o"])
        .arg(&target)
        .output()
        .expect("run cookiekit");
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let exported: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&target).expect("read export")).expect("JSON");
    let entries = exported.as_array().expect("array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "sid");
    assert_eq!(entries[0]["secure"], true);
}

#[test]
fn test_cli_edit_updates_value() {
    let temp = tempdir().expect("tempdir");
    let jar = temp.path().join("jar.sqlite");
    import_fixture(&jar, temp.path());

    let output = cookiekit(&jar)
        .args([
            "edit",
            "--name",
            "cart",
            "--domain",
            "shop.example",
            "--path",
            "/cart",
            "--value",
            "7",
            "--same-site",
            "lax",
        ])
        .output()
        .expect("run cookiekit");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Cookie updated successfully!"));

    let exported = export_json(&jar);
    let cart = exported
        .as_array()
        .expect("array")
        .iter()
        .find(|entry| entry["name"] == "cart")
        .expect("cart still present");
    assert_eq!(cart["value"], "7");
    assert_eq!(cart["sameSite"], "lax");
    assert_eq!(cart["path"], "/cart");
}

#[test]
fn test_cli_edit_rejects_line_break() {
    let temp = tempdir().expect("tempdir");
    let jar = temp.path().join("jar.sqlite");
    import_fixture(&jar, temp.path());

    let output = cookiekit(&jar)
        .args(["edit", "--name", "sid", "--domain", ".example.com", "--value", "a\nb"])
        .output()
        .expect("run cookiekit");
    assert_eq!(output.status.code(), Some(4));

    let exported = export_json(&jar);
    let sid = exported
        .as_array()
        .expect("array")
        .iter()
        .find(|entry| entry["name"] == "sid")
        .expect("sid untouched");
    assert_eq!(sid["value"], "abc");
}

#[test]
fn test_cli_edit_unknown_cookie() {
    let temp = tempdir().expect("tempdir");
    let jar = temp.path().join("jar.sqlite");

    let output = cookiekit(&jar)
        .args(["edit", "--name", "ghost", "--domain", "example.com", "--value", "1"])
        .output()
        .expect("run cookiekit");
    assert_eq!(output.status.code(), Some(8));
}

#[test]
fn test_cli_delete_declined_keeps_cookie() {
    let temp = tempdir().expect("tempdir");
    let jar = temp.path().join("jar.sqlite");
    import_fixture(&jar, temp.path());

    let output = cookiekit(&jar)
        .args(["delete", "--name", "sid", "--domain", ".example.com"])
        .write_stdin("n\n")
        .output()
        .expect("run cookiekit");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Delete cookie \"sid\" from .example.com?"));
    assert!(stderr.contains("Cancelled"));
    assert_eq!(export_json(&jar).as_array().expect("array").len(), 2);
}

#[test]
fn test_cli_delete_domain_and_clear() {
    let temp = tempdir().expect("tempdir");
    let jar = temp.path().join("jar.sqlite");
    import_fixture(&jar, temp.path());

    let output = cookiekit(&jar)
        .args(["delete-domain", "shop.example", "--yes"])
        .output()
        .expect("run cookiekit");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Deleted 1 cookies from shop.example"));
    assert_eq!(export_json(&jar).as_array().expect("array").len(), 1);

    let output = cookiekit(&jar)
        .args(["clear", "-y"])
        .output()
        .expect("run cookiekit");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Deleted 1 cookies"));
    assert_eq!(export_json(&jar), serde_json::json!([]));
}

#[test]
fn test_cli_import_rejects_non_array_json() {
    let temp = tempdir().expect("tempdir");
    let jar = temp.path().join("jar.sqlite");
    let file = temp.path().join("cookies.json");
    fs::write(&file, r#"{"name": "sid"}"#).expect("write fixture");

    let output = cookiekit(&jar)
        .arg("import")
        .arg(&file)
        .output()
        .expect("run cookiekit");
    assert_eq!(output.status.code(), Some(5));
    assert_eq!(export_json(&jar), serde_json::json!([]));
}

#[test]
fn test_cli_edit_requires_partition_when_ambiguous() {
    let temp = tempdir().expect("tempdir");
    let jar = temp.path().join("jar.sqlite");
    let file = temp.path().join("cookies.json");
    fs::write(
        &file,
        r#"[
            {"name": "sid", "domain": "example.com", "value": "plain"},
            {"name": "sid", "domain": "example.com", "value": "part", "partitionKey": "p"}
        ]"#,
    )
    .expect("write fixture");
    let output = cookiekit(&jar)
        .arg("import")
        .arg(&file)
        .output()
        .expect("run cookiekit");
    assert!(output.status.success());

    let output = cookiekit(&jar)
        .args(["edit", "--name", "sid", "--domain", "example.com", "--value", "x"])
        .output()
        .expect("run cookiekit");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--partition-key"));

    let output = cookiekit(&jar)
        .args([
            "edit",
            "--name",
            "sid",
            "--domain",
            "example.com",
            "--partition-key",
            "\"p\"",
            "--value",
            "x",
        ])
        .output()
        .expect("run cookiekit");
    assert!(output.status.success());

    let exported = export_json(&jar);
    let values: Vec<&str> = exported
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|entry| entry["value"].as_str())
        .collect();
    assert!(values.contains(&"plain"));
    assert!(values.contains(&"x"));
    assert!(!values.contains(&"part"));
}

#[test]
fn test_cli_import_json_skips_unreadable_entry() {
    let temp = tempdir().expect("tempdir");
    let jar = temp.path().join("jar.sqlite");
    let file = temp.path().join("cookies.json");
    fs::write(
        &file,
        r#"[
            {"name": "a", "domain": "example.com", "value": null},
            {"name": "b", "domain": "example.com", "sameSite": "sometimes"},
            {"name": "c", "domain": "example.com", "sameSite": "None", "secure": true}
        ]"#,
    )
    .expect("write fixture");

    let output = cookiekit(&jar)
        .arg("import")
        .arg(&file)
        .output()
        .expect("run cookiekit");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Imported 2 cookies, 1 failed"));
    assert_eq!(export_json(&jar).as_array().expect("array").len(), 2);
}
