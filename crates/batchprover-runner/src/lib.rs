//! Process execution for the external prover program
//!
//! All process execution goes through [`CommandSpec`] to ensure argv-style
//! invocation. Arguments are passed as discrete elements, never through a
//! shell, so a batch location containing shell metacharacters reaches the
//! prover untouched.

pub mod command_spec;
pub mod error;
pub mod native;
pub mod process;
#[cfg(windows)]
mod windows_job;

pub use command_spec::CommandSpec;
pub use error::RunnerError;
pub use native::NativeRunner;
pub use process::{ProcessOutput, ProcessRunner};
