//! Integration tests for the codet CLI

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo_bin;
use codet_testkit::{temp_dir_in_workspace, write_fixture};
use predicates::prelude::*;
use std::process::Command;

fn codet() -> Command {
    let mut cmd = Command::new(cargo_bin!("codet"));
    cmd.env_remove("CODET_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help_flag() {
    codet()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("render"));
}

#[test]
fn test_render_hello() {
    let temp = temp_dir_in_workspace();
    let template = write_fixture(temp.path(), "hello.tmpl", "Hello <%= 1+1 %>!");

    codet()
        .arg("render")
        .arg(&template)
        .assert()
        .success()
        .stdout("Hello 2!");
}

#[test]
fn test_render_with_json_state() {
    let temp = temp_dir_in_workspace();
    let template = write_fixture(
        temp.path(),
        "list.tmpl",
        "<% for _, n in ipairs(state.names) do %>\n* <%= n %>\n<% end %>\n",
    );
    let state = write_fixture(temp.path(), "state.json", r#"{ "names": ["a", "b"] }"#);

    codet()
        .arg("render")
        .arg(&template)
        .arg("--state")
        .arg(&state)
        .assert()
        .success()
        .stdout("* a\n* b\n");
}

#[test]
fn test_render_with_toml_state_and_property_parameters() {
    let temp = temp_dir_in_workspace();
    let template = write_fixture(temp.path(), "t.tmpl", "<%= title %> v<%= version %>");
    let state = write_fixture(temp.path(), "state.toml", "title = \"codet\"\nversion = 3\n");

    codet()
        .arg("render")
        .arg(&template)
        .args(["--state"])
        .arg(&state)
        .args(["--param", ""])
        .assert()
        .success()
        .stdout("codet v3");
}

#[test]
fn test_render_with_include() {
    let temp = temp_dir_in_workspace();
    let template = write_fixture(temp.path(), "page.tmpl", "<%@ include header %>\nbody");
    let header = write_fixture(temp.path(), "header.txt", "  HEADER\n");

    codet()
        .arg("render")
        .arg(&template)
        .arg("--include")
        .arg(format!("header={}", header.display()))
        .assert()
        .success()
        .stdout("HEADERbody");
}

#[test]
fn test_render_unresolved_include_fails() {
    let temp = temp_dir_in_workspace();
    let template = write_fixture(temp.path(), "page.tmpl", "<%@ include header %>");

    codet()
        .arg("render")
        .arg(&template)
        .assert()
        .failure()
        .stderr(predicate::str::contains("UNRESOLVED_INCLUDE"));
}

#[test]
fn test_render_syntax_error() {
    let temp = temp_dir_in_workspace();
    let template = write_fixture(temp.path(), "bad.tmpl", "abc\n  <% foo");

    codet()
        .arg("render")
        .arg(&template)
        .assert()
        .failure()
        .stderr(predicate::str::contains("TEMPLATE_SYNTAX"))
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_render_unsupported_language() {
    let temp = temp_dir_in_workspace();
    let template = write_fixture(temp.path(), "cs.tmpl", "<%@ language C#4 %>x");

    codet()
        .arg("render")
        .arg(&template)
        .assert()
        .failure()
        .stderr(predicate::str::contains("C#v4.0"))
        .stderr(predicate::str::contains("Lua5.4"));
}

#[test]
fn test_parse_text_output() {
    let temp = temp_dir_in_workspace();
    let template = write_fixture(
        temp.path(),
        "p.tmpl",
        "<%@ use math %>\n<%@ ref helpers %>\nHi <%= x %>",
    );

    codet()
        .arg("parse")
        .arg(&template)
        .assert()
        .success()
        .stdout(predicate::str::contains("Lua5.4"))
        .stdout(predicate::str::contains("codet, math, string, table"))
        .stdout(predicate::str::contains("helpers.lua"))
        .stdout(predicate::str::contains("[1] \"<%= x %>\""));
}

#[test]
fn test_parse_json_output() {
    let temp = temp_dir_in_workspace();
    let template = write_fixture(temp.path(), "p.tmpl", "<%@ language C# %>a<% b %>");

    let output = codet()
        .arg("parse")
        .arg(&template)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["language"], "C#v3.5");
    assert_eq!(json["code_parts"], serde_json::json!(["a", "<% b %>"]));
    assert_eq!(json["directives"][0]["key"], "language");
}

#[test]
fn test_config_file_changes_parser_defaults() {
    let temp = temp_dir_in_workspace();
    write_fixture(
        temp.path(),
        "codet.toml",
        "[parser]\nlibrary_suffix = \".dll\"\ndefault_imports = [\"string\"]\n",
    );
    let template = write_fixture(temp.path(), "nested/p.tmpl", "<%@ ref MyLib %>");

    codet()
        .arg("parse")
        .arg(&template)
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("MyLib.dll"))
        .stdout(predicate::str::contains("\"codet\"").not());
}

#[test]
fn test_source_prints_program() {
    let temp = temp_dir_in_workspace();
    let template = write_fixture(temp.path(), "s.tmpl", "x<%= state.y %>");

    codet()
        .arg("source")
        .arg(&template)
        .assert()
        .success()
        .stdout(predicate::str::contains("local function __render(state)"))
        .stdout(predicate::str::contains("__write(state.y)"));
}

#[test]
fn test_source_on_compilation_failure_prints_program_and_diagnostics() {
    let temp = temp_dir_in_workspace();
    let template = write_fixture(temp.path(), "s.tmpl", "<% if then %>");

    codet()
        .arg("source")
        .arg(&template)
        .assert()
        .failure()
        .stdout(predicate::str::contains("if then"))
        .stderr(predicate::str::contains("error (line"))
        .stderr(predicate::str::contains("compilation of"));
}

#[test]
fn test_missing_template() {
    let temp = temp_dir_in_workspace();

    codet()
        .arg("render")
        .arg(temp.path().join("absent.tmpl"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read template"));
}
