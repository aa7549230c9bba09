//! End-to-end CLI tests against the `mccomp` binary.
//!
//! Each test writes a fixture `.mc` source into a fresh `tempfile`
//! directory, runs the binary, and asserts on the exit code and (for
//! successful compiles) the emitted `output.ll` contents — covering the
//! six positive and two negative scenarios from §8.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn mccomp_bin() -> Command {
    Command::cargo_bin("mccomp").unwrap()
}

fn write_source(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn addition_compiles_to_an_ir_function() {
    let dir = TempDir::new().unwrap();
    let source = write_source(
        &dir,
        "addition.mc",
        "int addition(int a, int b) { return a + b; }",
    );
    let output = dir.path().join("output.ll");

    mccomp_bin()
        .current_dir(dir.path())
        .arg(&source)
        .assert()
        .success();

    let ir = std::fs::read_to_string(&output).unwrap();
    assert!(ir.contains("define i32 @addition(i32 %a, i32 %b)"));
    assert!(ir.contains("add i32"));
    assert!(ir.contains("ret i32"));
}

#[test]
fn iterative_factorial_compiles_with_a_while_loop() {
    let dir = TempDir::new().unwrap();
    let source = write_source(
        &dir,
        "factorial.mc",
        "int factorial(int n) { int f; f = 1; while (n > 1) { f = f * n; n = n - 1; } return f; }",
    );
    let output = dir.path().join("output.ll");

    mccomp_bin()
        .current_dir(dir.path())
        .arg(&source)
        .assert()
        .success();

    let ir = std::fs::read_to_string(&output).unwrap();
    assert!(ir.contains("while.cond"));
    assert!(ir.contains("while.body"));
    assert!(ir.contains("while.end"));
}

#[test]
fn mixed_widening_inserts_an_sitofp_before_the_add() {
    let dir = TempDir::new().unwrap();
    let source = write_source(
        &dir,
        "widen.mc",
        "float mix() { float f; int i; f = 2.5; i = 3; return f + i; }",
    );
    let output = dir.path().join("output.ll");

    mccomp_bin()
        .current_dir(dir.path())
        .arg(&source)
        .assert()
        .success();

    let ir = std::fs::read_to_string(&output).unwrap();
    assert!(ir.contains("sitofp i32"));
    assert!(ir.contains("fadd"));
}

#[test]
fn a_float_condition_is_legal_narrowing_context() {
    let dir = TempDir::new().unwrap();
    let source = write_source(
        &dir,
        "cond.mc",
        "int pick() { if (3.14) { return 1; } else { return 0; } }",
    );
    let output = dir.path().join("output.ll");

    mccomp_bin()
        .current_dir(dir.path())
        .arg(&source)
        .assert()
        .success();

    let ir = std::fs::read_to_string(&output).unwrap();
    assert!(ir.contains("fcmp une float"));
}

#[test]
fn assigning_a_float_literal_to_an_int_is_a_narrowing_error() {
    let dir = TempDir::new().unwrap();
    let source = write_source(
        &dir,
        "narrow.mc",
        "int bad() { int i; i = 3.14; return 0; }",
    );

    mccomp_bin()
        .current_dir(dir.path())
        .arg(&source)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Narrowing"));
}

#[test]
fn a_2d_global_array_subscript_emits_a_decay_zero_gep() {
    let dir = TempDir::new().unwrap();
    let source = write_source(
        &dir,
        "array.mc",
        "int b[10][10]; int r; int look() { r = b[2][3] + 1; return 0; }",
    );
    let output = dir.path().join("output.ll");

    mccomp_bin()
        .current_dir(dir.path())
        .arg(&source)
        .assert()
        .success();

    let ir = std::fs::read_to_string(&output).unwrap();
    assert!(ir.contains("getelementptr [10 x [10 x i32]], ptr @b, i32 0, i32 2, i32 3"));
}

#[test]
fn short_circuit_and_only_emits_the_rhs_in_its_own_block() {
    let dir = TempDir::new().unwrap();
    let source = write_source(
        &dir,
        "shortcircuit.mc",
        "extern int side();\nint x; int r; int run() { x = 0; r = x && side(); return r; }",
    );
    let output = dir.path().join("output.ll");

    mccomp_bin()
        .current_dir(dir.path())
        .arg(&source)
        .assert()
        .success();

    let ir = std::fs::read_to_string(&output).unwrap();
    assert!(ir.contains("and.rhs"));
    assert!(ir.contains("and.end"));
    assert!(ir.contains("call i32 @side()"));
}

#[test]
fn calling_an_undeclared_function_is_a_scope_error() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "undeclared.mc", "int main() { return foo(); }");

    mccomp_bin()
        .current_dir(dir.path())
        .arg(&source)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Undeclared").or(predicate::str::contains("not declared")));
}

#[test]
fn reassigning_a_float_into_an_int_local_is_a_type_error() {
    let dir = TempDir::new().unwrap();
    let source = write_source(
        &dir,
        "narrow_local.mc",
        "int main() { float f; f = 3.14; int i; i = f; return 0; }",
    );

    mccomp_bin()
        .current_dir(dir.path())
        .arg(&source)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Narrowing"));
}

#[test]
fn custom_output_path_is_honored() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "custom.mc", "int zero() { return 0; }");
    let output = dir.path().join("build").join("custom.ll");
    std::fs::create_dir_all(output.parent().unwrap()).unwrap();

    mccomp_bin()
        .current_dir(dir.path())
        .arg(&source)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    assert!(output.exists());
}

#[test]
fn help_flag_prints_usage() {
    mccomp_bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("mccomp"));
}
