//! CLI integration tests
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("plucker")
}

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

#[test]
fn test_cli_file_input() {
    cmd()
        .args(["--no-js", &get_fixture_path("article.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Ownership in Practice"))
        .stdout(predicate::str::contains("## Borrowing"))
        .stdout(predicate::str::contains("Every value in Rust has a single owner."));
}

#[test]
fn test_cli_removes_boilerplate() {
    cmd()
        .args(["--no-js", &get_fixture_path("article.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Archive").not())
        .stdout(predicate::str::contains("Categories").not())
        .stdout(predicate::str::contains("Copyright").not())
        .stdout(predicate::str::contains("Related: lifetimes").not())
        .stdout(predicate::str::contains("draft").not())
        .stdout(predicate::str::contains("analytics").not());
}

#[test]
fn test_cli_stdin_input() {
    let html = "<html><body><nav>Menu</nav><main><h1>Title</h1><p>Body text.</p></main><footer>F</footer></body></html>";

    cmd()
        .args(["--no-js", "-"])
        .write_stdin(html)
        .assert()
        .success()
        .stdout(predicate::str::contains("# Title\n\nBody text."))
        .stdout(predicate::str::contains("Menu").not());
}

#[test]
fn test_cli_missing_input_reads_stdin() {
    cmd()
        .arg("--no-js")
        .write_stdin("<html><body><article><p>From stdin</p></article></body></html>")
        .assert()
        .success()
        .stdout(predicate::str::contains("From stdin"));
}

#[test]
fn test_cli_markdown_passes_through() {
    cmd().arg(get_fixture_path("notes.md")).assert().success().stdout("# Hello");
}

#[test]
fn test_cli_fallback_to_body() {
    cmd()
        .args(["--no-js", &get_fixture_path("no_landmarks.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Just a paragraph"))
        .stdout(predicate::str::contains("Home").not());
}

#[test]
fn test_cli_selector() {
    cmd()
        .args(["--no-js", "-s", "pre", &get_fixture_path("article.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("String::from"))
        .stdout(predicate::str::contains("Ownership in Practice").not());
}

#[test]
fn test_cli_selector_not_found() {
    cmd()
        .args(["--no-js", "--selector", "#does-not-exist", &get_fixture_path("article.html")])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("#does-not-exist"));
}

#[test]
fn test_cli_raw_output() {
    cmd()
        .args(["--no-js", "--raw", &get_fixture_path("article.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("<nav class=\"top-nav\">"))
        .stdout(predicate::str::contains("Copyright 2024"));
}

#[test]
fn test_cli_link_truncation() {
    cmd()
        .args(["--no-js", "--link-max-length", "30", &get_fixture_path("long_links.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("[full report](https://example.com/reports/20…)"))
        .stdout(predicate::str::contains("[short one](https://example.com/s)"));
}

#[test]
fn test_cli_link_truncation_disabled() {
    cmd()
        .args(["--no-js", "--link-max-length", "0", &get_fixture_path("long_links.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("quarterly-breakdown-by-region-and-product-line.html)"));
}

#[test]
fn test_cli_setext_headings() {
    cmd()
        .args(["--no-js", "--heading-style", "setext", &get_fixture_path("article.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ownership in Practice\n==="))
        .stdout(predicate::str::contains("# Ownership in Practice").not());
}

#[test]
fn test_cli_invalid_heading_style() {
    cmd()
        .args(["--no-js", "--heading-style", "underline", &get_fixture_path("article.html")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid heading style"));
}

#[test]
fn test_cli_output_file() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("output.md");

    cmd()
        .args(["--no-js", "-o", output.to_str().unwrap()])
        .arg(get_fixture_path("article.html"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains("# Ownership in Practice"));
    assert!(written.ends_with('\n'));
}

#[test]
fn test_cli_print_plan_for_url() {
    let output = cmd().args(["--print-plan", "example.com"]).assert().success().get_output().stdout.clone();
    let plan: serde_json::Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(plan["target"], "https://example.com/");
    assert_eq!(plan["mechanism"], "js_render");
    assert_eq!(plan["timeout_ms"], 30000);
    assert_eq!(plan["wait_until"], "networkidle");
    assert_eq!(plan["headless"], true);
}

#[test]
fn test_cli_print_plan_with_flags() {
    let output = cmd()
        .args([
            "--print-plan",
            "--no-js",
            "--timeout",
            "5000",
            "--no-headless",
            "--wait-until",
            "load",
            "https://example.com/page",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let plan: serde_json::Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(plan["mechanism"], "static_http");
    assert_eq!(plan["timeout_ms"], 5000);
    assert_eq!(plan["wait_until"], "load");
    assert_eq!(plan["headless"], false);
    assert_eq!(plan["render_js"], false);
}

#[test]
fn test_cli_print_plan_for_markdown_file() {
    cmd()
        .args(["--print-plan", &get_fixture_path("notes.md")])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"local_file_raw\""));
}

#[test]
fn test_cli_missing_file() {
    cmd()
        .args(["--no-js", "/nonexistent/page.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_cli_invalid_wait_until() {
    cmd()
        .args(["--wait-until", "whenever", "--print-plan", "example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid wait condition"));
}

#[test]
fn test_cli_ignore_robots_txt_is_accepted() {
    cmd()
        .args(["--ignore-robots-txt", "--print-plan", "example.com"])
        .assert()
        .success();
}

#[test]
fn test_cli_verbose_reports_progress() {
    cmd()
        .args(["--no-js", "-v", &get_fixture_path("article.html")])
        .assert()
        .success()
        .stderr(predicate::str::contains("Extracting main content"));
}

#[test]
fn test_cli_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Convert a web page"));
}

#[test]
fn test_cli_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}
