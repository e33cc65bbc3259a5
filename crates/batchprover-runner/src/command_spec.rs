use std::ffi::OsString;
use std::process::Command;

/// Description of a command to execute.
///
/// `CommandSpec` enforces that:
/// - Arguments are `Vec<OsString>`, NOT shell strings
/// - No shell string evaluation (`sh -c`, `cmd /C`) is used
///
/// # Example
///
/// ```rust
/// use batchprover_runner::CommandSpec;
/// use std::ffi::OsString;
///
/// let cmd = CommandSpec::new("./compute-proof-stub.sh")
///     .arg("http://coordinator.example/b1.bin");
///
/// assert_eq!(cmd.program, OsString::from("./compute-proof-stub.sh"));
/// assert_eq!(cmd.args.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    /// The program to execute
    pub program: OsString,
    /// Arguments as discrete elements (NOT shell strings)
    pub args: Vec<OsString>,
}

impl CommandSpec {
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add a single argument to the command.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Program name for messages, lossy on non-UTF-8 paths.
    #[must_use]
    pub fn program_display(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Convert this `CommandSpec` into a `std::process::Command`.
    ///
    /// The resulting `Command` uses argv-style argument passing. Stdio is
    /// left to the caller.
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}
