use crate::error::RunnerError;
use std::process::{ExitStatus, Output, Stdio};
use std::time::Duration;
use tracing::{debug, warn};

use super::{CommandSpec, ProcessOutput, ProcessRunner};

/// How long to wait for the output reader once the process tree is killed.
const KILL_GRACE: Duration = Duration::from_secs(5);

/// Native process runner using `std::process::Command`.
///
/// The child gets a null stdin and piped stdout/stderr. Without a timeout
/// the calling thread waits directly. With a timeout, the child leads its own
/// process group (a job object on Windows) and one helper thread owns it
/// while the caller waits on a channel. On expiry the whole tree is killed,
/// so descendants holding the output pipes die with it.
///
/// # Example
///
/// ```rust,no_run
/// use batchprover_runner::{CommandSpec, NativeRunner, ProcessRunner};
/// use std::time::Duration;
///
/// let runner = NativeRunner::new();
/// let cmd = CommandSpec::new("./compute-proof-stub.sh").arg("http://c.example/b1.bin");
///
/// let output = runner.run(&cmd, Some(Duration::from_secs(7200))).unwrap();
/// assert_eq!(output.exit_code, Some(0));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRunner;

impl NativeRunner {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ProcessRunner for NativeRunner {
    fn run(
        &self,
        cmd: &CommandSpec,
        timeout: Option<Duration>,
    ) -> Result<ProcessOutput, RunnerError> {
        use std::sync::mpsc;
        use std::thread;

        let mut command = cmd.to_command();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(unix)]
        if timeout.is_some() {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let child = command.spawn().map_err(|e| RunnerError::SpawnFailed {
            program: cmd.program_display(),
            reason: e.to_string(),
        })?;

        let child_id = child.id();
        debug!(pid = child_id, program = %cmd.program_display(), "Spawned process");

        let Some(timeout) = timeout else {
            let output = child
                .wait_with_output()
                .map_err(|e| RunnerError::ExecutionFailed {
                    reason: format!("Failed to wait for process: {e}"),
                })?;
            return Ok(Self::to_process_output(output));
        };

        #[cfg(windows)]
        let job = match crate::windows_job::contain(&child) {
            Ok(job) => Some(job),
            Err(e) => {
                warn!(pid = child_id, error = %e, "Prover not contained, only it can be killed");
                None
            }
        };

        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let output = child.wait_with_output();
            let _ = tx.send(output);
        });

        match rx.recv_timeout(timeout) {
            Ok(output_result) => {
                let _ = handle.join();

                let output = output_result.map_err(|e| RunnerError::ExecutionFailed {
                    reason: format!("Failed to wait for process: {e}"),
                })?;

                Ok(Self::to_process_output(output))
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                warn!(
                    pid = child_id,
                    timeout_secs = timeout.as_secs(),
                    "Process timed out, killing process tree"
                );

                #[cfg(windows)]
                drop(job);
                Self::terminate_tree(child_id);

                if rx.recv_timeout(KILL_GRACE).is_ok() {
                    let _ = handle.join();
                } else {
                    warn!(pid = child_id, "Output pipes still open after kill, abandoning reader");
                }

                Err(RunnerError::Timeout {
                    timeout_seconds: timeout.as_secs(),
                })
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(RunnerError::ExecutionFailed {
                reason: "Process monitoring thread terminated unexpectedly".to_string(),
            }),
        }
    }
}

impl NativeRunner {
    fn to_process_output(output: Output) -> ProcessOutput {
        match (output.status.code(), Self::termination_signal(output.status)) {
            (Some(code), _) => ProcessOutput::exited(output.stdout, output.stderr, code),
            (None, Some(signal)) => ProcessOutput::signaled(output.stdout, output.stderr, signal),
            (None, None) => ProcessOutput {
                stdout: output.stdout,
                stderr: output.stderr,
                exit_code: None,
                signal: None,
            },
        }
    }

    #[cfg(unix)]
    fn termination_signal(status: ExitStatus) -> Option<i32> {
        use std::os::unix::process::ExitStatusExt;
        status.signal()
    }

    #[cfg(not(unix))]
    fn termination_signal(_status: ExitStatus) -> Option<i32> {
        None
    }

    /// Kill the process tree rooted at `pid`.
    ///
    /// On Unix, sends SIGKILL to the process group `pid` leads.
    /// On Windows, the job object has already been closed; TerminateProcess
    /// covers the case where the child could not be placed in a job.
    fn terminate_tree(pid: u32) {
        #[cfg(unix)]
        {
            // SAFETY: kill(2) on the process group of a child we spawned with
            // process_group(0) and have not yet reaped.
            unsafe {
                libc::kill(-(pid as i32), libc::SIGKILL);
            }
        }

        #[cfg(windows)]
        {
            use windows::Win32::Foundation::CloseHandle;
            use windows::Win32::System::Threading::{
                OpenProcess, PROCESS_TERMINATE, TerminateProcess,
            };

            unsafe {
                if let Ok(handle) = OpenProcess(PROCESS_TERMINATE, false, pid) {
                    let _ = TerminateProcess(handle, 1);
                    let _ = CloseHandle(handle);
                }
            }
        }

        #[cfg(not(any(unix, windows)))]
        {
            let _ = pid;
        }
    }
}
