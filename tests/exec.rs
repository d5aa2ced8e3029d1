//! End-to-end checks of the process orchestrator against real programs.

use std::env;
use std::fs;

use cress::shell::jobs;
use cress::shell::syntax::ast::Plan;
use cress::shell::syntax::{lexer, parser};

fn plan(line: &str) -> Plan {
    let tokens = lexer::tokenize(line).unwrap();
    parser::classify(&tokens).unwrap()
}

#[test]
fn external_exit_status_is_reported() {
    assert_eq!(jobs::execute(&plan("true")).unwrap(), 0);
    assert_eq!(jobs::execute(&plan("false")).unwrap(), 1);
}

#[test]
fn missing_program_fails_in_the_child_only() {
    let status = jobs::execute(&plan("definitely-not-a-real-program-cress")).unwrap();
    assert_eq!(status, 127);
}

#[test]
fn output_redirect_truncates_and_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.txt");
    fs::write(&path, "stale contents that must disappear").unwrap();
    let status = jobs::execute(&plan(&format!("echo fresh>{}", path.display()))).unwrap();
    assert_eq!(status, 0);
    assert_eq!(fs::read_to_string(&path).unwrap(), "fresh\n");
}

#[test]
fn pipe_carries_left_stdout_into_right_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let sink = dir.path().join("sink.txt");
    let line = format!("echo piped through|tee {}", sink.display());
    let status = jobs::execute(&plan(&line)).unwrap();
    assert_eq!(status, 0);
    assert_eq!(fs::read_to_string(&sink).unwrap(), "piped through\n");
}

#[test]
fn input_redirect_feeds_the_left_side_of_a_pipe() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("in.txt");
    let sink = dir.path().join("sink.txt");
    fs::write(&source, "alpha\nbeta\n").unwrap();
    let line = format!("cat<{}|tee {}", source.display(), sink.display());
    let status = jobs::execute(&plan(&line)).unwrap();
    assert_eq!(status, 0);
    assert_eq!(fs::read_to_string(&sink).unwrap(), "alpha\nbeta\n");
}

#[test]
fn cd_result_reaches_the_parent() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().canonicalize().unwrap();
    let before = env::current_dir().unwrap();

    let status = jobs::execute(&plan(&format!("cd {}", target.display()))).unwrap();
    assert_eq!(status, 0);
    assert_eq!(env::current_dir().unwrap(), target);

    // A failed chdir in the child writes nothing; the parent must neither
    // move nor block on the empty channel.
    let status = jobs::execute(&plan("cd /definitely/not/a/real/path")).unwrap();
    assert_eq!(status, 1);
    assert_eq!(env::current_dir().unwrap(), target);

    env::set_current_dir(before).unwrap();
}

#[test]
fn source_runs_each_script_line() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.txt");
    let second = dir.path().join("second.txt");
    let script = dir.path().join("script.cress");
    fs::write(
        &script,
        format!(
            "echo one>{}\necho two>{};echo three\n",
            first.display(),
            second.display()
        ),
    )
    .unwrap();
    let status = jobs::execute(&plan(&format!("source {}", script.display()))).unwrap();
    assert_eq!(status, 0);
    assert_eq!(fs::read_to_string(&first).unwrap(), "one\n");
    assert_eq!(fs::read_to_string(&second).unwrap(), "two\n");
}

#[test]
fn missing_script_is_reported_not_fatal() {
    let status = jobs::execute(&plan("source /no/such/script.cress")).unwrap();
    assert_eq!(status, 1);
}
