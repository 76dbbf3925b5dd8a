use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use samgraft_core::BuildEnv;

/// A fully resolved child process launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInvocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub cwd: PathBuf,
    /// Complete environment of the child; nothing else is inherited.
    pub env: BTreeMap<OsString, OsString>,
}

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Abstraction over child process execution for testability.
///
/// Production code uses [`RealProcess`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait ProcessExecutor: Send + Sync {
    /// Run the process to completion, streaming its output to the terminal.
    async fn run(&self, invocation: &ProcessInvocation) -> Result<ProcessOutcome, ProcessError>;
}

/// Runs processes with tokio.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealProcess;

impl ProcessExecutor for RealProcess {
    async fn run(&self, invocation: &ProcessInvocation) -> Result<ProcessOutcome, ProcessError> {
        use std::process::Stdio;

        let status = tokio::process::Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .env_clear()
            .envs(&invocation.env)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| ProcessError::Launch {
                program: invocation.program.clone(),
                source: e,
            })?;

        Ok(ProcessOutcome { code: status.code() })
    }
}

/// Finds `name` on the `PATH` of `env`, the way a shell would.
pub fn locate_executable(name: &str, env: &BuildEnv) -> Option<PathBuf> {
    let search_path = env.get_os("PATH")?;
    std::env::split_paths(search_path)
        .flat_map(|dir| candidates(&dir, name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(windows)]
fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    ["", ".exe", ".cmd", ".bat"]
        .iter()
        .map(|ext| dir.join(format!("{name}{ext}")))
        .collect()
}

#[cfg(not(windows))]
fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    vec![dir.join(name)]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to launch {program}")]
    Launch {
        program: PathBuf,
        source: std::io::Error,
    },
}
