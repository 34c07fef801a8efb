//! End-to-end execution through the rz binary.

#[path = "common/mod.rs"]
mod common;
use common::{rz, scratch};
use predicates::prelude::*;
use std::fs;

#[test]
fn simple_command() {
    let home = scratch();
    rz(&home)
        .args(["-c", "echo hello world"])
        .assert()
        .success()
        .stdout("hello world\n");
}

#[test]
fn variable_assignment_and_expansion() {
    let home = scratch();
    rz(&home)
        .args(["-c", "foo=bar; echo $foo"])
        .assert()
        .success()
        .stdout("bar\n");
}

#[test]
fn list_count_string_and_subscript() {
    let home = scratch();
    rz(&home)
        .args(["-c", "xs=(a b c); echo $#xs $\"xs $xs(2)"])
        .assert()
        .success()
        .stdout("3 a b c b\n");
}

#[test]
fn output_redirection_and_readback() {
    let home = scratch();
    let file = home.path().join("out.txt");
    let file = file.to_str().unwrap();
    rz(&home)
        .args(["-c", &format!("echo one > {file}; cat {file}")])
        .assert()
        .success()
        .stdout("one\n");
}

#[test]
fn append_redirection() {
    let home = scratch();
    let file = home.path().join("log");
    let path = file.to_str().unwrap();
    rz(&home)
        .args(["-c", &format!("echo first > {path}; echo second >> {path}")])
        .assert()
        .success();
    assert_eq!(fs::read_to_string(&file).unwrap(), "first\nsecond\n");
}

#[test]
fn input_redirection() {
    let home = scratch();
    let file = home.path().join("in");
    fs::write(&file, "from file\n").unwrap();
    rz(&home)
        .args(["-c", &format!("cat < {}", file.to_str().unwrap())])
        .assert()
        .success()
        .stdout("from file\n");
}

#[test]
fn function_call_with_positionals() {
    let home = scratch();
    rz(&home)
        .args(["-c", "fn g { echo $1 $2 }; g hi there"])
        .assert()
        .success()
        .stdout("hi there\n");
}

#[test]
fn function_star_holds_all_arguments() {
    let home = scratch();
    rz(&home)
        .args(["-c", "fn g { echo $#* $* }; g a b c"])
        .assert()
        .success()
        .stdout("3 a b c\n");
}

#[test]
fn single_pipe() {
    let home = scratch();
    rz(&home)
        .args(["-c", "echo x | tr x y"])
        .assert()
        .success()
        .stdout("y\n");
}

#[test]
fn pipe_from_a_group() {
    let home = scratch();
    rz(&home)
        .args(["-c", "{ echo a; echo b } | tr a z"])
        .assert()
        .success()
        .stdout("z\nb\n");
}

#[test]
fn chained_pipes() {
    let home = scratch();
    rz(&home)
        .args(["-c", "echo abc | tr a x | tr c z"])
        .assert()
        .success()
        .stdout("xbz\n");
}

#[test]
fn descriptor_alias_routes_stderr_to_stdout() {
    let home = scratch();
    rz(&home)
        .args(["-c", "cat /rz-no-such-file >[2=1]"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("rz-no-such-file"))
        .stderr("");
}

#[test]
fn descriptor_redirection_routes_stderr_to_file() {
    let home = scratch();
    let file = home.path().join("err");
    let path = file.to_str().unwrap();
    rz(&home)
        .args(["-c", &format!("cat /rz-no-such-file >[2] {path}")])
        .assert()
        .code(1)
        .stdout("");
    assert!(fs::read_to_string(&file)
        .unwrap()
        .contains("rz-no-such-file"));
}

#[test]
fn descriptors_are_restored_after_a_command() {
    let home = scratch();
    let file = home.path().join("out");
    let path = file.to_str().unwrap();
    rz(&home)
        .args(["-c", &format!("echo one > {path}; echo two")])
        .assert()
        .success()
        .stdout("two\n");
    assert_eq!(fs::read_to_string(&file).unwrap(), "one\n");
}

#[test]
fn command_substitution_splits_on_ifs() {
    let home = scratch();
    rz(&home)
        .args(["-c", "echo `{echo a b}"])
        .assert()
        .success()
        .stdout("a b\n");
}

#[test]
fn command_substitution_in_assignment() {
    let home = scratch();
    rz(&home)
        .args(["-c", "xs=`{echo a b c}; echo $#xs"])
        .assert()
        .success()
        .stdout("3\n");
}

#[test]
fn quoting_preserves_spacing() {
    let home = scratch();
    rz(&home)
        .args(["-c", "echo 'a  b'"])
        .assert()
        .success()
        .stdout("a  b\n");
}

#[test]
fn embedded_quotes_collapse() {
    let home = scratch();
    rz(&home)
        .args(["-c", "echo ''''"])
        .assert()
        .success()
        .stdout("'\n");
}

#[test]
fn concatenation_broadcasts() {
    let home = scratch();
    rz(&home)
        .args(["-c", "echo a^b"])
        .assert()
        .success()
        .stdout("ab\n");
    rz(&home)
        .args(["-c", "xs=(1 2); echo p^$xs"])
        .assert()
        .success()
        .stdout("p1 p2\n");
    rz(&home)
        .args(["-c", "xs=(x y); echo $xs^.c"])
        .assert()
        .success()
        .stdout("x.c y.c\n");
}

#[test]
fn free_caret_concatenates_adjacent_primaries() {
    let home = scratch();
    rz(&home)
        .args(["-c", "b=bar; echo foo$b.c"])
        .assert()
        .success()
        .stdout("foobar.c\n");
}
