use std::path::Path;

use samgraft_core::{BuildEnv, BuildOutput, ContainerSpec};

use crate::container::{ContainerBuildError, ContainerRunner};
use crate::local::{LocalBuildError, LocalRunner};
use crate::process::ProcessExecutor;
use crate::runtime::ContainerRuntime;

/// The two ways of running `chalice package`, behind one `run`.
pub enum BuildStrategy<'a, P: ProcessExecutor, R: ContainerRuntime> {
    Local(LocalRunner<'a, P>),
    Container(ContainerRunner<'a, R>),
}

impl<'a, P: ProcessExecutor, R: ContainerRuntime> BuildStrategy<'a, P, R> {
    /// Containerized when `container` is given, local otherwise.
    pub fn select(
        container: Option<&'a ContainerSpec>,
        executor: &'a P,
        runtime: &'a R,
        env: &'a BuildEnv,
    ) -> Self {
        match container {
            Some(spec) => Self::Container(ContainerRunner::new(runtime, spec)),
            None => Self::Local(LocalRunner::new(executor, env)),
        }
    }

    pub fn is_containerized(&self) -> bool {
        matches!(self, Self::Container(_))
    }

    /// Builds the app for `stage_name`, leaving the template and archive in
    /// `output`.
    pub async fn run(
        &self,
        source_dir: &Path,
        stage_name: &str,
        output: &BuildOutput,
    ) -> Result<(), BuildError> {
        match self {
            Self::Local(runner) => runner.run(source_dir, stage_name, output).await?,
            Self::Container(runner) => runner.run(source_dir, stage_name, output).await?,
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Local(#[from] LocalBuildError),

    #[error(transparent)]
    Container(#[from] ContainerBuildError),
}
