// src/exec/task_runner.rs

//! Individual process runner.

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, warn};

use super::process::{ExecFailure, ExecOutcome, ProcessOutput, ProcessSpec};

/// Run a single program to completion and capture its output.
///
/// - The resolved environment is layered over the agent's own environment
///   when `inherit_env` is true, and replaces it otherwise.
/// - If `spec.timeout` elapses first, the pending wait is dropped, which kills
///   the child (`kill_on_drop`), and [`ExecFailure::TimedOut`] is returned.
///
/// Every failure mode is folded into the returned outcome.
pub async fn run_process(spec: &ProcessSpec, inherit_env: bool) -> ExecOutcome {
    info!(
        program = %spec.program,
        args = ?spec.arguments,
        cwd = ?spec.working_directory,
        timeout = ?spec.timeout,
        "starting process"
    );

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.arguments);
    if !inherit_env {
        cmd.env_clear();
    }
    cmd.envs(&spec.environment);
    if let Some(dir) = &spec.working_directory {
        cmd.current_dir(dir);
    }

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd.spawn().map_err(|e| ExecFailure::Spawn {
        program: spec.program.clone(),
        message: e.to_string(),
    })?;

    let waited = match spec.timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
            Ok(res) => res,
            Err(_) => {
                warn!(program = %spec.program, timeout = ?limit, "process timed out; killed");
                return Err(ExecFailure::TimedOut {
                    program: spec.program.clone(),
                    timeout: limit,
                });
            }
        },
        None => child.wait_with_output().await,
    };

    let output = waited.map_err(|e| ExecFailure::Wait {
        program: spec.program.clone(),
        message: e.to_string(),
    })?;

    let captured = ProcessOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    for line in captured.stdout.lines() {
        debug!(program = %spec.program, "stdout: {}", line);
    }
    for line in captured.stderr.lines() {
        debug!(program = %spec.program, "stderr: {}", line);
    }

    info!(
        program = %spec.program,
        exit_code = captured.exit_code,
        success = output.status.success(),
        "process exited"
    );

    if output.status.success() {
        Ok(captured)
    } else {
        Err(ExecFailure::NonZeroExit {
            program: spec.program.clone(),
            code: captured.exit_code,
            output: captured,
        })
    }
}
