//! Plumbing shared by the backends that drive an external clipboard tool.
//!
//! Spawning is behind [`CommandRunner`] so the argument and exit-code
//! contracts can be exercised without the tools being installed.

use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use super::error::{ClipboardError, Result, SetupError};

/// One invocation of an external tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Bytes streamed to stdin; `None` connects stdin to null
    pub input: Option<Vec<u8>>,
    /// Capture stdout/stderr. Copy tools that fork a selection owner keep
    /// inherited pipes open, so they run with output discarded instead.
    pub capture: bool,
}

/// Result of a finished tool invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Trait for running external processes
pub trait CommandRunner: Send + Sync {
    fn run(&self, spec: &CommandSpec) -> io::Result<CommandOutput>;
}

/// Runs tools with `std::process`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> io::Result<CommandOutput> {
        let mut command = Command::new(&spec.program);
        command.args(&spec.args);
        command.stdin(if spec.input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        if spec.capture {
            command.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let mut child = command.spawn()?;
        let stdin = child.stdin.take();

        // Feed stdin from a second thread so a tool that writes while
        // reading cannot deadlock against a full pipe.
        let (output, written) = thread::scope(|scope| {
            let writer = match (stdin, spec.input.as_deref()) {
                (Some(mut stdin), Some(input)) => {
                    Some(scope.spawn(move || stdin.write_all(input)))
                }
                _ => None,
            };
            let output = child.wait_with_output();
            let written = match writer {
                Some(handle) => handle
                    .join()
                    .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked"))),
                None => Ok(()),
            };
            (output, written)
        });

        let output = output?;
        match written {
            // tool exited before reading everything; its exit code tells the story
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
            Err(e) => return Err(e),
            Ok(()) => {}
        }

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// An external tool resolved on `PATH`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    pub name: &'static str,
    pub path: PathBuf,
}

impl Tool {
    /// Resolve `name` on `PATH`, failing with a setup error naming `hint`
    pub fn resolve(name: &'static str, hint: &str) -> std::result::Result<Self, SetupError> {
        let path = find_executable(name).ok_or_else(|| {
            SetupError::new(format!("{} not found on PATH. {}", name, hint))
        })?;
        log::debug!("Resolved {} to {:?}", name, path);
        Ok(Tool { name, path })
    }

    /// Tool at a known location, without a `PATH` lookup
    pub fn at(name: &'static str, path: impl Into<PathBuf>) -> Self {
        Tool {
            name,
            path: path.into(),
        }
    }

    /// Run the tool and fail unless it exits with status 0
    pub fn run(
        &self,
        runner: &dyn CommandRunner,
        args: &[&str],
        input: Option<Vec<u8>>,
        capture: bool,
    ) -> Result<CommandOutput> {
        let spec = CommandSpec {
            program: self.path.clone(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
            input,
            capture,
        };
        log::debug!("Running {} {:?}", self.name, spec.args);

        let output = runner.run(&spec).map_err(|source| ClipboardError::Spawn {
            tool: self.name.to_string(),
            source,
        })?;

        if !output.success() {
            return Err(ClipboardError::CommandFailed {
                tool: self.name.to_string(),
                code: output.code,
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(output)
    }
}

/// Search `PATH` for an executable file called `name`
pub fn find_executable(name: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory stand-in for the external tools

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Records every invocation and replays scripted outputs.
    /// With no script left, a call with input stores it as the clipboard
    /// and a call without input returns the stored clipboard.
    #[derive(Default)]
    pub struct FakeRunner {
        pub calls: Mutex<Vec<CommandSpec>>,
        pub script: Mutex<VecDeque<CommandOutput>>,
        pub clipboard: Mutex<Vec<u8>>,
    }

    impl FakeRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_output(&self, output: CommandOutput) {
            self.script.lock().unwrap().push_back(output);
        }

        pub fn fail_next(&self, code: i32) {
            self.push_output(CommandOutput {
                code: Some(code),
                stdout: b"mock stdout".to_vec(),
                stderr: b"mock stderr".to_vec(),
            });
        }

        pub fn calls(&self) -> Vec<CommandSpec> {
            self.calls.lock().unwrap().clone()
        }

        pub fn last_args(&self) -> Vec<String> {
            self.calls().last().map(|c| c.args.clone()).unwrap_or_default()
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, spec: &CommandSpec) -> io::Result<CommandOutput> {
            self.calls.lock().unwrap().push(spec.clone());
            if let Some(output) = self.script.lock().unwrap().pop_front() {
                return Ok(output);
            }
            let mut clipboard = self.clipboard.lock().unwrap();
            match &spec.input {
                Some(input) => {
                    *clipboard = input.clone();
                    Ok(CommandOutput {
                        code: Some(0),
                        ..Default::default()
                    })
                }
                None => Ok(CommandOutput {
                    code: Some(0),
                    stdout: clipboard.clone(),
                    stderr: Vec::new(),
                }),
            }
        }
    }

    impl CommandRunner for std::sync::Arc<FakeRunner> {
        fn run(&self, spec: &CommandSpec) -> io::Result<CommandOutput> {
            self.as_ref().run(spec)
        }
    }
}
