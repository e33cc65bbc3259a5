//! Job objects so a timed-out prover takes its whole process tree with it.

use std::os::windows::io::AsRawHandle;
use std::process::Child;

use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::JobObjects::{
    AssignProcessToJobObject, CreateJobObjectW, JOB_OBJECT_LIMIT_KILL_ON_JOB_CLOSE,
    JOBOBJECT_EXTENDED_LIMIT_INFORMATION, JobObjectExtendedLimitInformation,
    SetInformationJobObject,
};

use crate::error::RunnerError;

/// Owned job handle. Closing it terminates every process in the job.
pub(crate) struct JobObject {
    handle: HANDLE,
}

// SAFETY: a job HANDLE is an opaque kernel reference usable from any thread.
unsafe impl Send for JobObject {}

impl Drop for JobObject {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.handle);
        }
    }
}

/// Place `child` in a fresh kill-on-close job.
pub(crate) fn contain(child: &Child) -> Result<JobObject, RunnerError> {
    unsafe {
        let handle = CreateJobObjectW(None, None).map_err(|e| RunnerError::ExecutionFailed {
            reason: format!("Failed to create job object: {e}"),
        })?;
        let job = JobObject { handle };

        let mut info: JOBOBJECT_EXTENDED_LIMIT_INFORMATION = std::mem::zeroed();
        info.BasicLimitInformation.LimitFlags = JOB_OBJECT_LIMIT_KILL_ON_JOB_CLOSE;
        SetInformationJobObject(
            job.handle,
            JobObjectExtendedLimitInformation,
            (&raw const info).cast(),
            std::mem::size_of::<JOBOBJECT_EXTENDED_LIMIT_INFORMATION>() as u32,
        )
        .map_err(|e| RunnerError::ExecutionFailed {
            reason: format!("Failed to configure job object: {e}"),
        })?;

        AssignProcessToJobObject(job.handle, HANDLE(child.as_raw_handle())).map_err(|e| {
            RunnerError::ExecutionFailed {
                reason: format!("Failed to assign prover to job object: {e}"),
            }
        })?;

        Ok(job)
    }
}
