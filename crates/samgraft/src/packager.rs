use std::path::PathBuf;

use samgraft_build::{
    BuildError, BuildStrategy, ContainerRuntime, DockerRuntime, ProcessExecutor, RealProcess,
};
use samgraft_core::{BuildEnv, BuildOutput, ContainerSpec, StageConfig, merge_stage_config};
use samgraft_template::{ComposeError, Manifest, RewriteError, TreeComposer, rewrite_code_uri};

/// Key under which the rewritten template is included in the tree.
pub const DEFAULT_INCLUSION_KEY: &str = "ChaliceApp";

const DEFAULT_OUTPUT_ROOT: &str = "chalice.out";

/// One packaging run: which app, which stage, and how to build it.
#[derive(Debug, Clone)]
pub struct PackageRequest {
    pub source_dir: PathBuf,
    pub stage: String,
    pub stage_config: StageConfig,
    /// Build inside this container instead of on the host.
    pub container: Option<ContainerSpec>,
}

impl PackageRequest {
    pub fn new(source_dir: impl Into<PathBuf>, stage: impl Into<String>) -> Self {
        Self {
            source_dir: source_dir.into(),
            stage: stage.into(),
            stage_config: StageConfig::new(),
            container: None,
        }
    }

    pub fn with_stage_config(mut self, stage_config: StageConfig) -> Self {
        self.stage_config = stage_config;
        self
    }

    pub fn with_container(mut self, container: ContainerSpec) -> Self {
        self.container = Some(container);
        self
    }
}

/// Runs the packaging pipeline:
///
/// ```text
/// merge stage config → chalice package → rewrite CodeUri → include template
/// ```
///
/// Every step waits for the previous one. A failure stops the pipeline;
/// the stage config written in the first step is not rolled back.
pub struct Packager<
    C: TreeComposer,
    P: ProcessExecutor = RealProcess,
    R: ContainerRuntime = DockerRuntime,
> {
    composer: C,
    process: P,
    runtime: R,
    output_root: PathBuf,
    inclusion_key: String,
    env: Option<BuildEnv>,
}

impl<C: TreeComposer> Packager<C> {
    /// A packager that builds with the host's `chalice` or with Docker.
    pub fn new(composer: C) -> Self {
        Self::with_backends(composer, RealProcess, DockerRuntime)
    }
}

impl<C: TreeComposer, P: ProcessExecutor, R: ContainerRuntime> Packager<C, P, R> {
    pub fn with_backends(composer: C, process: P, runtime: R) -> Self {
        Self {
            composer,
            process,
            runtime,
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            inclusion_key: DEFAULT_INCLUSION_KEY.to_owned(),
            env: None,
        }
    }

    /// Directory under which each run gets its own output directory.
    /// Relative paths resolve against the working directory.
    pub fn with_output_root(mut self, output_root: impl Into<PathBuf>) -> Self {
        self.output_root = output_root.into();
        self
    }

    pub fn with_inclusion_key(mut self, key: impl Into<String>) -> Self {
        self.inclusion_key = key.into();
        self
    }

    /// Environment for local builds. Defaults to the current process
    /// environment, captured when [`package`](Self::package) runs.
    pub fn with_env(mut self, env: BuildEnv) -> Self {
        self.env = Some(env);
        self
    }

    pub fn composer(&self) -> &C {
        &self.composer
    }

    pub async fn package(&self, request: &PackageRequest) -> Result<Manifest, PackageError> {
        let stage = request.stage.as_str();

        merge_stage_config(&request.source_dir, stage, &request.stage_config)?;
        tracing::info!(stage, "stage config merged");

        let output_root =
            std::path::absolute(&self.output_root).map_err(|e| PackageError::OutputRoot {
                path: self.output_root.clone(),
                source: e,
            })?;
        let output = BuildOutput::allocate(&output_root);

        let env = match &self.env {
            Some(env) => env.clone(),
            None => BuildEnv::inherit(),
        };
        let strategy = BuildStrategy::select(
            request.container.as_ref(),
            &self.process,
            &self.runtime,
            &env,
        );
        strategy.run(&request.source_dir, stage, &output).await?;
        tracing::info!(
            stage,
            containerized = strategy.is_containerized(),
            output = %output.dir().display(),
            "chalice package finished"
        );

        let manifest = rewrite_code_uri(&output, &self.composer).await?;
        tracing::info!(stage, "CodeUri rewritten");

        self.composer
            .include_template(&self.inclusion_key, &manifest)
            .await
            .map_err(|e| PackageError::Include {
                key: self.inclusion_key.clone(),
                source: e,
            })?;
        tracing::info!(stage, key = %self.inclusion_key, "template included");

        Ok(manifest)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error(transparent)]
    Config(#[from] samgraft_core::Error),

    #[error("failed to resolve output root {path}")]
    OutputRoot {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Template(#[from] RewriteError),

    #[error("failed to include template under '{key}'")]
    Include { key: String, source: ComposeError },
}
