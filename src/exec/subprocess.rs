//! Blocking subprocess execution with inherited stdio

use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::error::Step;

/// Result of one external build-tool step
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Which step ran
    pub step: Step,

    /// Whether the command succeeded (exit code 0)
    pub success: bool,

    /// Process exit code, `None` when terminated by a signal
    pub exit_code: Option<i32>,

    /// Execution duration
    pub duration: Duration,
}

impl StepOutcome {
    /// Create a StepOutcome from an exit status
    pub fn from_status(step: Step, status: ExitStatus, duration: Duration) -> Self {
        Self {
            step,
            success: status.success(),
            exit_code: status.code(),
            duration,
        }
    }
}

/// Run a prepared command to completion
///
/// stdout/stderr are inherited so the tool's own diagnostics reach the
/// user; stdin is closed. Only a failure to spawn is an `Err`, a non-zero
/// exit is reported through [`StepOutcome::success`].
pub fn run_step(step: Step, cmd: &mut Command) -> Result<StepOutcome> {
    let start = Instant::now();

    let status = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| {
            format!(
                "Failed to execute {} for the {} step",
                cmd.get_program().to_string_lossy(),
                step
            )
        })?;

    Ok(StepOutcome::from_status(step, status, start.elapsed()))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_run_step_success() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("exit 0");
        let outcome = run_step(Step::Configure, &mut cmd).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.exit_code, Some(0));
        assert_eq!(outcome.step, Step::Configure);
    }

    #[test]
    #[serial]
    fn test_run_step_failure_is_not_an_error() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("exit 7");
        let outcome = run_step(Step::Build, &mut cmd).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.exit_code, Some(7));
    }

    #[test]
    #[serial]
    fn test_run_step_spawn_failure() {
        let mut cmd = Command::new("/nonexistent/depbuild-test-tool");
        let err = run_step(Step::Configure, &mut cmd).unwrap_err();
        assert!(err.to_string().contains("configure step"));
    }
}
