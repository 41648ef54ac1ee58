// tests/process_executor.rs
#![cfg(unix)]

use std::time::Duration;

use buildagent::exec::{ExecFailure, ProcessExecutor, ProcessSpec, RealProcessExecutor};
use buildagent_test_utils::{init_tracing, with_timeout};

#[tokio::test]
async fn successful_process_captures_output() {
    init_tracing();

    let executor = RealProcessExecutor::default();
    let spec = ProcessSpec::new("sh")
        .args(["-c", "echo \"$GREETING\"; echo oops >&2"])
        .env("GREETING", "hello build");

    let output = with_timeout(executor.execute(spec)).await.unwrap();

    assert_eq!(output.exit_code, 0);
    assert_eq!(output.stdout.trim(), "hello build");
    assert_eq!(output.stderr.trim(), "oops");
}

#[tokio::test]
async fn arguments_are_not_reinterpreted_by_a_shell() {
    init_tracing();

    let executor = RealProcessExecutor::default();
    let spec = ProcessSpec::new("printf").args(["%s|", "$HOME", "a b", "*"]);

    let output = with_timeout(executor.execute(spec)).await.unwrap();

    assert_eq!(output.stdout, "$HOME|a b|*|");
}

#[tokio::test]
async fn working_directory_is_applied() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let executor = RealProcessExecutor::default();
    let spec = ProcessSpec::new("pwd").current_dir(dir.path());

    let output = with_timeout(executor.execute(spec)).await.unwrap();

    let reported = std::path::PathBuf::from(output.stdout.trim());
    assert_eq!(
        reported.canonicalize().unwrap(),
        dir.path().canonicalize().unwrap()
    );
}

#[tokio::test]
async fn non_zero_exit_is_a_failure_outcome() {
    init_tracing();

    let executor = RealProcessExecutor::default();
    let spec = ProcessSpec::new("sh").args(["-c", "echo nope; exit 3"]);

    match with_timeout(executor.execute(spec)).await {
        Err(ExecFailure::NonZeroExit { code, output, .. }) => {
            assert_eq!(code, 3);
            assert_eq!(output.stdout.trim(), "nope");
        }
        other => panic!("expected NonZeroExit, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_program_is_a_spawn_failure() {
    init_tracing();

    let executor = RealProcessExecutor::default();
    let spec = ProcessSpec::new("definitely-not-a-real-program-4242");

    assert!(matches!(
        with_timeout(executor.execute(spec)).await,
        Err(ExecFailure::Spawn { .. })
    ));
}

#[tokio::test]
async fn timeout_terminates_the_process() {
    init_tracing();

    let executor = RealProcessExecutor::default();
    let spec = ProcessSpec::new("sleep")
        .args(["30"])
        .timeout(Some(Duration::from_millis(200)));

    let started = std::time::Instant::now();
    let outcome = with_timeout(executor.execute(spec)).await;

    assert!(matches!(outcome, Err(ExecFailure::TimedOut { .. })), "{outcome:?}");
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn isolated_environment_only_sees_resolved_variables() {
    init_tracing();

    let executor = RealProcessExecutor::new(false);
    let spec = ProcessSpec::new("/bin/sh")
        .args(["-c", "echo \"${HOME:-unset}:$ONLY\""])
        .env("ONLY", "this");

    let output = with_timeout(executor.execute(spec)).await.unwrap();

    assert_eq!(output.stdout.trim(), "unset:this");
}
