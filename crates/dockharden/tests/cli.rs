use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;

fn cmd() -> Command {
    Command::cargo_bin("dockharden").unwrap()
}

#[test]
fn harden_stdin_to_stdout() {
    cmd()
        .arg("harden")
        .write_stdin("FROM ubuntu:latest\nRUN apt-get update\nRUN apt-get install -y curl\nCOPY . /srv")
        .assert()
        .success()
        .stdout(
            "FROM ubuntu:20.04\n\
             RUN apt-get update\n\
             RUN apt-get install -y curl \\\n    && apt-get clean \\\n    && rm -rf /var/lib/apt/lists/*\n\
             RUN groupadd -r appuser && useradd -r -g appuser appuser\n\
             USER appuser\n\
             COPY . /srv",
        );
}

#[test]
fn harden_file_with_report() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = temp.child("Dockerfile");
    input.write_str("FROM node:latest\nRUN npm ci\n").unwrap();
    let out = temp.child("Dockerfile.hardened");
    let report = temp.child("report.json");

    cmd()
        .arg("harden")
        .arg("--input")
        .arg(input.path())
        .arg("--out")
        .arg(out.path())
        .arg("--report")
        .arg(report.path())
        .assert()
        .success();

    out.assert(predicate::str::starts_with("FROM node:18-slim\nRUN npm ci\n"));
    out.assert(predicate::str::ends_with("USER appuser"));
    report.assert(contains("\"pin_base_image\""));
    report.assert(contains("\"insert_non_root_user\""));
    report.assert(contains("\"input_sha256\""));
}

#[test]
fn empty_input_is_rejected() {
    for blank in ["", "   \n\t\n"] {
        cmd()
            .arg("harden")
            .write_stdin(blank)
            .assert()
            .code(2)
            .stdout(predicate::str::is_empty())
            .stderr(contains("No Dockerfile content provided"));
    }
}

#[test]
fn missing_input_file_is_generic_failure() {
    let temp = assert_fs::TempDir::new().unwrap();

    cmd()
        .arg("harden")
        .arg("--input")
        .arg(temp.path().join("absent"))
        .assert()
        .code(1)
        .stderr(contains("Failed to process Dockerfile"));
}

#[test]
fn config_changes_user() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config = temp.child("dockharden.yaml");
    config.write_str("user: web\ngroup: www\n").unwrap();

    cmd()
        .arg("--config")
        .arg(config.path())
        .arg("harden")
        .write_stdin("FROM nginx:1.25\nCOPY site /usr/share/nginx/html")
        .assert()
        .success()
        .stdout(contains(
            "RUN groupadd -r www && useradd -r -g www web\nUSER web\nCOPY site",
        ));
}

#[test]
fn compare_html() {
    cmd()
        .args(["compare", "--html"])
        .write_stdin("FROM python:latest\nCOPY . .")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<!DOCTYPE html>"))
        .stdout(contains("FROM python:latest"))
        .stdout(contains("FROM python:3.9-slim"))
        .stdout(contains("Added non-root user"));
}

#[test]
fn batch_directory() {
    let input = assert_fs::TempDir::new().unwrap();
    input.child("Dockerfile").write_str("FROM node:latest").unwrap();
    input
        .child("Dockerfile.dev")
        .write_str("FROM node:20\nRUN addgroup dev")
        .unwrap();
    let out = assert_fs::TempDir::new().unwrap();

    cmd()
        .arg("batch")
        .arg("--dir")
        .arg(input.path())
        .arg("--out")
        .arg(out.path())
        .assert()
        .success()
        .stdout(contains("Hardened: 2"));

    out.child("Dockerfile").assert(contains("USER appuser"));
    out.child("Dockerfile.dev").assert("FROM node:20\nRUN addgroup dev");
}
