//! Tests for the `throwstrip-bin` binary.
#![allow(clippy::unwrap_used)]

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SERVICE: &str = "\
package com.example;

import java.io.IOException;

public class Service implements Fetcher {
    @Override
    public String fetch(String key) throws IOException {
        return key;
    }
}
";

const FETCHER: &str = "\
package com.example;

import java.io.IOException;

public interface Fetcher {
    String fetch(String key) throws IOException;
}
";

fn create_project(root: &Path) {
    let pkg = root.join("src/main/java/com/example");
    fs::create_dir_all(&pkg).unwrap();
    fs::write(pkg.join("Service.java"), SERVICE).unwrap();
    fs::write(pkg.join("Fetcher.java"), FETCHER).unwrap();
}

fn throwstrip() -> Command {
    let mut cmd = Command::cargo_bin("throwstrip-bin").unwrap();
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_rewrites_project() -> Result<()> {
    let temp = TempDir::new()?;
    create_project(temp.path());

    throwstrip()
        .arg("--method-pattern")
        .arg("com.example.Fetcher fetch(..)")
        .arg("--exception-type")
        .arg("java.io.IOException")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Fixed:"))
        .stdout(predicate::str::contains("Files scanned: 2"));

    let service = fs::read_to_string(temp.path().join("src/main/java/com/example/Service.java"))?;
    assert_eq!(
        service,
        "\
package com.example;

public class Service implements Fetcher {
    @Override
    public String fetch(String key) {
        return key;
    }
}
"
    );
    let fetcher = fs::read_to_string(temp.path().join("src/main/java/com/example/Fetcher.java"))?;
    assert!(!fetcher.contains("throws"));
    assert!(!fetcher.contains("import"));
    Ok(())
}

#[test]
fn test_no_match_overrides_flag() -> Result<()> {
    let temp = TempDir::new()?;
    create_project(temp.path());

    throwstrip()
        .args(["-m", "com.example.Fetcher fetch(..)", "-e", "java.io.IOException"])
        .arg("--no-match-overrides")
        .arg("--quiet")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("[SUMMARY] 1 methods in 1 files"));

    let service = fs::read_to_string(temp.path().join("src/main/java/com/example/Service.java"))?;
    assert_eq!(service, SERVICE);
    Ok(())
}

#[test]
fn test_dry_run_writes_nothing() -> Result<()> {
    let temp = TempDir::new()?;
    create_project(temp.path());

    throwstrip()
        .args(["-m", "com.example.Fetcher fetch(..)", "-e", "java.io.IOException"])
        .arg("--dry-run")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("[DRY-RUN]"))
        .stdout(predicate::str::contains(
            "Would remove java.io.IOException from com.example.Service.fetch",
        ));

    let service = fs::read_to_string(temp.path().join("src/main/java/com/example/Service.java"))?;
    assert_eq!(service, SERVICE);
    Ok(())
}

#[test]
fn test_json_report() -> Result<()> {
    let temp = TempDir::new()?;
    create_project(temp.path());

    let output = throwstrip()
        .args(["-m", "com.example.Service fetch(..)", "-e", "java.io.IOException"])
        .args(["--json", "--dry-run", "--no-match-overrides"])
        .arg(temp.path())
        .output()?;
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["files_scanned"], 2);
    assert_eq!(report["recipe"]["match_overrides"], false);
    let fixed = report["fixed"].as_array().unwrap();
    assert_eq!(fixed.len(), 1);
    assert_eq!(fixed[0]["methods"][0]["type_fqn"], "com.example.Service");
    assert_eq!(fixed[0]["methods"][0]["method"], "fetch");
    assert_eq!(fixed[0]["methods"][0]["line"], 7);
    assert_eq!(fixed[0]["import_removed"], true);
    Ok(())
}

#[test]
fn test_invalid_pattern_exits_one() -> Result<()> {
    let temp = TempDir::new()?;
    create_project(temp.path());

    throwstrip()
        .args(["-m", "fetch(..)", "-e", "java.io.IOException"])
        .arg(temp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no declaring type"));

    let service = fs::read_to_string(temp.path().join("src/main/java/com/example/Service.java"))?;
    assert_eq!(service, SERVICE);
    Ok(())
}

#[test]
fn test_blank_exception_exits_one() -> Result<()> {
    let temp = TempDir::new()?;
    create_project(temp.path());

    throwstrip()
        .args(["-m", "com.example.Service fetch(..)", "-e", "  "])
        .arg(temp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("exception type"));
    Ok(())
}

#[test]
fn test_missing_path_exits_one() {
    throwstrip()
        .args(["-m", "A foo()", "-e", "java.io.IOException"])
        .arg("definitely/not/here")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_parse_error_reported_and_skipped() -> Result<()> {
    let temp = TempDir::new()?;
    create_project(temp.path());
    fs::write(temp.path().join("Broken.java"), "class Broken { void foo( }")?;

    throwstrip()
        .args(["-m", "com.example.Service fetch(..)", "-e", "java.io.IOException"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Parse error:"))
        .stdout(predicate::str::contains("Broken.java"))
        .stdout(predicate::str::contains("Failures: 1"));
    Ok(())
}

#[test]
fn test_excluded_folder_skipped() -> Result<()> {
    let temp = TempDir::new()?;
    create_project(temp.path());
    let generated = temp.path().join("generated");
    fs::create_dir_all(&generated)?;
    let gen_source = "\
package com.example;

class Gen implements Fetcher {
    @Override
    public String fetch(String key) throws java.io.IOException {
        return key;
    }
}
";
    fs::write(generated.join("Gen.java"), gen_source)?;

    throwstrip()
        .args(["-m", "com.example.Fetcher fetch(..)", "-e", "java.io.IOException"])
        .args(["--exclude", "generated", "--quiet"])
        .arg(temp.path())
        .assert()
        .success();

    assert_eq!(fs::read_to_string(generated.join("Gen.java"))?, gen_source);
    Ok(())
}

#[test]
fn test_init_writes_config() -> Result<()> {
    let temp = TempDir::new()?;

    throwstrip()
        .current_dir(temp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created .throwstrip.toml"));

    let config = fs::read_to_string(temp.path().join(".throwstrip.toml"))?;
    assert!(config.contains("[throwstrip]"));
    Ok(())
}
