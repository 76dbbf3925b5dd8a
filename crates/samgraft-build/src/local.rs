use std::path::Path;

use samgraft_core::{BuildEnv, BuildOutput};

use crate::BUILD_EXECUTABLE;
use crate::process::{ProcessError, ProcessExecutor, ProcessInvocation, locate_executable};

/// Runs `chalice package` as a child process on the host.
pub struct LocalRunner<'a, P: ProcessExecutor> {
    executor: &'a P,
    env: &'a BuildEnv,
}

impl<'a, P: ProcessExecutor> LocalRunner<'a, P> {
    pub fn new(executor: &'a P, env: &'a BuildEnv) -> Self {
        Self { executor, env }
    }

    /// Resolves the `chalice package` invocation for `stage_name`.
    pub fn invocation(
        &self,
        source_dir: &Path,
        stage_name: &str,
        output: &BuildOutput,
    ) -> Result<ProcessInvocation, LocalBuildError> {
        let program = locate_executable(BUILD_EXECUTABLE, self.env)
            .ok_or(LocalBuildError::ExecutableNotFound { name: BUILD_EXECUTABLE })?;

        Ok(ProcessInvocation {
            program,
            args: vec![
                "package".into(),
                "--stage".into(),
                stage_name.into(),
                output.dir().as_os_str().to_owned(),
            ],
            cwd: source_dir.to_path_buf(),
            env: self.env.vars().clone(),
        })
    }

    /// Packages the app into `output`.
    ///
    /// A non-zero exit is only logged: a build that failed leaves no
    /// template behind, which is reported when the template is read.
    pub async fn run(
        &self,
        source_dir: &Path,
        stage_name: &str,
        output: &BuildOutput,
    ) -> Result<(), LocalBuildError> {
        let invocation = self.invocation(source_dir, stage_name, output)?;

        tracing::info!(stage = stage_name, "packaging Chalice app");
        tracing::debug!(
            program = %invocation.program.display(),
            args = ?invocation.args,
            cwd = %invocation.cwd.display(),
            "running chalice package"
        );

        let outcome = self
            .executor
            .run(&invocation)
            .await
            .map_err(|e| LocalBuildError::Launch { source: e })?;

        if !outcome.success() {
            tracing::warn!(
                stage = stage_name,
                code = ?outcome.code,
                "chalice package exited unsuccessfully"
            );
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LocalBuildError {
    #[error("`{name}` not found on PATH — install it with: pip install chalice")]
    ExecutableNotFound { name: &'static str },

    #[error("failed to launch chalice package")]
    Launch { source: ProcessError },
}
