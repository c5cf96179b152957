// Copyright (c) 2024 PostFinance AG
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use std::process::{Command, Stdio};

fn passform() -> Command {
    Command::cargo_bin("passform").unwrap()
}

fn generated_lines(output: &[u8]) -> Vec<String> {
    String::from_utf8(output.to_vec())
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

#[test]
fn passform_cli() {
    passform()
        .stdout(Stdio::piped())
        .assert()
        .failure()
        .stderr(contains("passform - Random password candidates, five at a time"))
        .stderr(contains("generate"))
        .stderr(contains("Print one batch of passwords and exit"))
        .stderr(contains("interactive"))
        .stderr(contains("Open the password form in the terminal"))
        .stderr(contains("help"))
        .stderr(contains("-h, --help"))
        .stderr(contains("-V, --version"));
}

#[test]
fn passform_cli_generate_help() {
    passform()
        .arg("generate")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("Print one batch of passwords and exit."))
        .stdout(contains("generate [OPTIONS]"))
        .stdout(contains("-c, --config-path <CONFIG_PATH>"))
        .stdout(contains("-l, --length <LENGTH>"))
        .stdout(contains("--special"))
        .stdout(contains("-o, --output <OUTPUT>"))
        .stdout(contains("[default: text]"));
}

#[test]
fn generate_default_batch() {
    let output = passform().arg("generate").assert().success().get_output().clone();

    let passwords = generated_lines(&output.stdout);
    assert_eq!(passwords.len(), 5);
    for password in passwords {
        assert_eq!(password.len(), 16);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}

#[test]
fn generate_length_bounds() {
    for length in [8, 32] {
        let output = passform()
            .args(["generate", "--length", &length.to_string()])
            .assert()
            .success()
            .get_output()
            .clone();

        let passwords = generated_lines(&output.stdout);
        assert_eq!(passwords.len(), 5);
        assert!(passwords.iter().all(|p| p.len() == length));
    }
}

#[test]
fn generate_rejects_out_of_range_length() {
    for length in ["7", "33"] {
        passform()
            .args(["generate", "--length", length])
            .assert()
            .failure()
            .stderr(contains(format!("invalid value '{length}'")))
            .stdout(predicate::str::is_empty());
    }
}

#[test]
fn generate_rejects_empty_alphabet() {
    passform()
        .args([
            "generate",
            "--lower-case",
            "false",
            "--upper-case",
            "false",
            "--digits",
            "false",
        ])
        .assert()
        .failure()
        .stderr(contains("At least one character class must be enabled"))
        .stdout(predicate::str::is_empty());
}

#[test]
fn generate_special_only() {
    let output = passform()
        .args([
            "generate",
            "--special",
            "--lower-case=false",
            "--upper-case=false",
            "--digits=false",
        ])
        .assert()
        .success()
        .get_output()
        .clone();

    for password in generated_lines(&output.stdout) {
        assert!(password.chars().all(|c| r"!@#$%^&*()_+=-|\/{}[]<>".contains(c)));
    }
}

#[test]
fn generate_json_output() {
    let output = passform()
        .args(["generate", "--output", "json", "--length", "12"])
        .assert()
        .success()
        .get_output()
        .clone();

    let document: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(document["config"]["password_length"], 12);
    assert_eq!(document["config"]["use_special"], false);

    let passwords = document["passwords"].as_array().unwrap();
    assert_eq!(passwords.len(), 5);
    assert!(passwords
        .iter()
        .all(|p| p.as_str().map(str::len) == Some(12)));
}

#[test]
fn generate_with_preset() {
    let output = passform()
        .args([
            "generate",
            "-c",
            "tests/resources/config/preset.yml",
            "-o",
            "json",
        ])
        .assert()
        .success()
        .get_output()
        .clone();

    let document: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(document["config"]["password_length"], 24);
    assert_eq!(document["config"]["use_digits"], false);
    assert_eq!(document["config"]["use_special"], true);
}

#[test]
fn flags_override_preset() {
    let output = passform()
        .args([
            "generate",
            "-c",
            "tests/resources/config/preset.yml",
            "-l",
            "10",
        ])
        .assert()
        .success()
        .get_output()
        .clone();

    assert!(generated_lines(&output.stdout).iter().all(|p| p.len() == 10));
}

#[test]
fn generate_with_invalid_preset() {
    passform()
        .args(["generate", "-c", "tests/resources/config/empty_alphabet.yml"])
        .assert()
        .failure()
        .stderr(contains(
            "Invalid configuration: At least one character class must be enabled",
        ));

    passform()
        .args(["generate", "-c", "tests/resources/config/non_existing.yml"])
        .assert()
        .failure()
        .stderr(contains(
            "Failed to read configuration file 'tests/resources/config/non_existing.yml'",
        ));
}
