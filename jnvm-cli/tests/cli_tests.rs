//! Integration tests for the JNVM CLI.
//!
//! These tests invoke the `jnvm` binary as a subprocess and check
//! exit codes, stdout, and stderr.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[allow(deprecated)]
fn jnvm() -> Command {
    Command::cargo_bin("jnvm").unwrap()
}

/// Return the workspace root (parent of jnvm-cli/).
fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .to_path_buf()
}

/// Return the absolute path to a sample program file.
fn test_program(name: &str) -> PathBuf {
    workspace_root().join("tests/programs").join(name)
}

/// Helper: assemble a .jasm file, returning the path to the .jnb output.
fn assemble_to_temp(dir: &TempDir, source: &str) -> PathBuf {
    let input = dir.path().join("test.jasm");
    let output = dir.path().join("test.jnb");
    fs::write(&input, source).unwrap();
    jnvm()
        .args([
            "assemble",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();
    output
}

// ---- No-args / help ----

#[test]
fn no_args_prints_usage_and_exits_1() {
    jnvm()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Usage: jnvm"));
}

#[test]
fn help_flag_exits_0() {
    jnvm()
        .arg("--help")
        .assert()
        .success()
        .stderr(predicate::str::contains("Commands:"));
}

#[test]
fn unknown_command_exits_1() {
    jnvm()
        .arg("frobnicate")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unknown command"));
}

// ---- Assemble ----

#[test]
fn assemble_simple_program() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("test.jasm");
    let output = dir.path().join("test.jnb");
    fs::write(&input, "MOV r0 42\nHALT\n").unwrap();

    jnvm()
        .args([
            "assemble",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("assembled 2 instructions"));

    let bytes = fs::read(&output).unwrap();
    assert_eq!(&bytes[..4], b"JNVM");
    assert_eq!(bytes.len(), 12 + 16); // header + 2 instructions * 8 bytes
}

#[test]
fn assemble_default_output_name() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("prog.jasm");
    fs::write(&input, "HALT\n").unwrap();

    jnvm()
        .args(["assemble", input.to_str().unwrap()])
        .assert()
        .success();

    assert!(dir.path().join("prog.jnb").exists());
}

#[test]
fn assemble_bad_input_exits_1() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("bad.jasm");
    fs::write(&input, "HALT\nPUSH r1\n").unwrap();

    jnvm()
        .args(["assemble", input.to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("line 2: unknown opcode 'PUSH'"));
}

#[test]
fn assemble_missing_file_exits_1() {
    jnvm()
        .args(["assemble", "/nonexistent/file.jasm"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn assemble_warns_when_jmp_cannot_reach_the_end() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("long.jasm");
    let mut source = String::from("JMP 0\n");
    source.push_str(&"HALT\n".repeat(65536));
    fs::write(&input, &source).unwrap();

    jnvm()
        .env_remove("RUST_LOG")
        .args(["assemble", input.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("longer than JMP can address"));

    // One instruction shorter is still fully addressable.
    source.truncate(source.len() - "HALT\n".len());
    fs::write(&input, &source).unwrap();
    jnvm()
        .env_remove("RUST_LOG")
        .args(["assemble", input.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("longer than JMP").not());
}

// ---- Run ----

#[test]
fn run_image_prints_register_zero() {
    let dir = TempDir::new().unwrap();
    let image = assemble_to_temp(&dir, "MOV r1 40\nMOV r2 2\nADD r1 r2 r0\nHALT\n");

    jnvm()
        .args(["run", image.to_str().unwrap()])
        .assert()
        .success()
        .stdout("42\n");
}

#[test]
fn run_text_directly() {
    jnvm()
        .args(["run", test_program("factorial.jasm").to_str().unwrap()])
        .assert()
        .success()
        .stdout("3628800\n");
}

#[test]
fn run_hello_prints_and_returns_reference() {
    jnvm()
        .args(["run", test_program("hello.jasm").to_str().unwrap()])
        .assert()
        .success()
        .stdout("hello\nstr#0\n");
}

#[test]
fn run_reports_profile_on_stderr() {
    jnvm()
        .args(["run", test_program("countdown.jasm").to_str().unwrap()])
        .assert()
        .success()
        .stdout("sum 5050\n5050\n")
        .stderr(predicate::str::contains("profile:"))
        .stderr(predicate::str::contains("(304 instructions)"));
}

#[test]
fn run_debug_does_not_change_output() {
    jnvm()
        .args([
            "run",
            test_program("factorial.jasm").to_str().unwrap(),
            "--debug",
        ])
        .assert()
        .success()
        .stdout("3628800\n");
}

#[test]
fn run_division_by_zero_exits_3() {
    jnvm()
        .args(["run", test_program("divide_by_zero.jasm").to_str().unwrap()])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("division by zero at instruction 2"));
}

#[test]
fn run_max_depth_is_honored() {
    jnvm()
        .args([
            "run",
            test_program("runaway.jasm").to_str().unwrap(),
            "--max-depth",
            "16",
        ])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("call depth limit 16"));

    // fact(10) needs 11 frames.
    jnvm()
        .args([
            "run",
            test_program("factorial.jasm").to_str().unwrap(),
            "--max-depth",
            "10",
        ])
        .assert()
        .failure()
        .code(3);
}

#[test]
fn run_missing_halt_exits_3() {
    let dir = TempDir::new().unwrap();
    let image = assemble_to_temp(&dir, "MOV r0 1\n");

    jnvm()
        .args(["run", image.to_str().unwrap()])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("without HALT"));
}

#[test]
fn run_bad_option_exits_1() {
    jnvm()
        .args([
            "run",
            test_program("hello.jasm").to_str().unwrap(),
            "--max-depth",
            "many",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--max-depth"));
}

#[test]
fn run_corrupt_image_exits_1() {
    let dir = TempDir::new().unwrap();
    let image = dir.path().join("junk.jnb");
    fs::write(&image, b"NOPE\x00\x00\x00\x00").unwrap();

    jnvm()
        .args(["run", image.to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid binary"));
}

// ---- Disassemble ----

#[test]
fn disassemble_canonical_text() {
    let dir = TempDir::new().unwrap();
    let original = ".string \"hi\"\nLOADS r0 0\nCALL @0 r0 1\nHALT\n";
    let image = assemble_to_temp(&dir, original);

    jnvm()
        .args(["disassemble", image.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::eq(original));
}

#[test]
fn disassemble_roundtrip_all_samples() {
    let dir = TempDir::new().unwrap();
    let samples = [
        "hello.jasm",
        "factorial.jasm",
        "countdown.jasm",
        "divide_by_zero.jasm",
        "runaway.jasm",
    ];

    for name in &samples {
        let first = dir.path().join("first.jnb");
        let text = dir.path().join("canonical.jasm");
        let second = dir.path().join("second.jnb");

        jnvm()
            .args([
                "assemble",
                test_program(name).to_str().unwrap(),
                "-o",
                first.to_str().unwrap(),
            ])
            .assert()
            .success();

        let output = jnvm()
            .args(["disassemble", first.to_str().unwrap()])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        fs::write(&text, output).unwrap();

        jnvm()
            .args([
                "assemble",
                text.to_str().unwrap(),
                "-o",
                second.to_str().unwrap(),
            ])
            .assert()
            .success();

        assert_eq!(
            fs::read(&first).unwrap(),
            fs::read(&second).unwrap(),
            "roundtrip failed for {name}"
        );
    }
}
