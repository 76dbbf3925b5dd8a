use std::borrow::Cow;
use std::path::{Path, PathBuf};

use samgraft_core::{BuildOutput, ContainerSpec};

use crate::BUILD_EXECUTABLE;
use crate::runtime::{ContainerRun, ContainerRuntime, RuntimeError, VolumeBind};

/// Mount point of the Chalice source tree; also the working directory.
pub const CONTAINER_SOURCE_DIR: &str = "/app";

/// Mount point of the build output directory.
pub const CONTAINER_OUTPUT_DIR: &str = "/chalice.out";

/// Installs the app's declared dependencies inside the container.
pub const INSTALL_REQUIREMENTS: &str = "pip install --no-cache-dir -r requirements.txt";

/// Shell script run in the build container: init commands, dependency
/// install, then `chalice package` into [`CONTAINER_OUTPUT_DIR`].
///
/// Init commands are shell code and go in verbatim. The stage name is data
/// and is quoted when it contains anything besides word characters.
///
/// # Examples
///
/// ```
/// use samgraft_build::container::package_script;
///
/// let script = package_script(&["pip install chalice".to_owned()], "prod");
/// assert_eq!(
///     script,
///     "pip install chalice; pip install --no-cache-dir -r requirements.txt; \
///      chalice package --stage prod /chalice.out"
/// );
/// ```
pub fn package_script(init_commands: &[String], stage_name: &str) -> String {
    let mut script: String = init_commands
        .iter()
        .map(|command| format!("{command}; "))
        .collect();
    script.push_str(INSTALL_REQUIREMENTS);
    script.push_str("; ");
    script.push_str(&format!(
        "{BUILD_EXECUTABLE} package --stage {} {CONTAINER_OUTPUT_DIR}",
        shell_quote(stage_name)
    ));
    script
}

/// Single-quotes `word` for `bash -c` unless it is made of characters the
/// shell never interprets.
fn shell_quote(word: &str) -> Cow<'_, str> {
    let plain = !word.is_empty()
        && word.chars().all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '@')
        });
    if plain {
        Cow::Borrowed(word)
    } else {
        Cow::Owned(format!("'{}'", word.replace('\'', r"'\''")))
    }
}

/// Runs `chalice package` inside a Lambda-like container.
///
/// Use this when the app depends on natively compiled packages that must
/// be built for the Lambda environment rather than the host.
pub struct ContainerRunner<'a, R: ContainerRuntime> {
    runtime: &'a R,
    spec: &'a ContainerSpec,
}

impl<'a, R: ContainerRuntime> ContainerRunner<'a, R> {
    pub fn new(runtime: &'a R, spec: &'a ContainerSpec) -> Self {
        Self { runtime, spec }
    }

    /// Describes the container run for `stage_name` without starting it.
    pub fn request(
        &self,
        source_dir: &Path,
        stage_name: &str,
        output: &BuildOutput,
    ) -> Result<ContainerRun, ContainerBuildError> {
        let source_dir = absolute(source_dir)?;
        let output_dir = absolute(output.dir())?;

        Ok(ContainerRun {
            image: self.spec.image().to_owned(),
            command: vec![
                "bash".to_owned(),
                "-c".to_owned(),
                package_script(self.spec.init_commands(), stage_name),
            ],
            env: self.spec.env().clone(),
            volumes: vec![
                VolumeBind::read_write(source_dir, CONTAINER_SOURCE_DIR),
                VolumeBind::read_write(output_dir, CONTAINER_OUTPUT_DIR),
            ],
            working_dir: CONTAINER_SOURCE_DIR.to_owned(),
            remove: true,
        })
    }

    /// Packages the app into `output` inside a fresh container.
    pub async fn run(
        &self,
        source_dir: &Path,
        stage_name: &str,
        output: &BuildOutput,
    ) -> Result<(), ContainerBuildError> {
        let request = self.request(source_dir, stage_name, output)?;

        // Bind-mounting a missing host path makes Docker create it as root.
        tokio::fs::create_dir_all(output.dir())
            .await
            .map_err(|e| ContainerBuildError::OutputDir {
                path: output.dir().to_path_buf(),
                source: e,
            })?;

        tracing::info!(
            stage = stage_name,
            image = %request.image,
            "packaging Chalice app in container"
        );

        self.runtime.run(&request).await.map_err(|e| match e {
            RuntimeError::ImageNotFound { image } => ContainerBuildError::UnsupportedImage { image },
            other => ContainerBuildError::Runtime { source: other },
        })
    }
}

fn absolute(path: &Path) -> Result<PathBuf, ContainerBuildError> {
    std::path::absolute(path).map_err(|e| ContainerBuildError::ResolvePath {
        path: path.to_path_buf(),
        source: e,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ContainerBuildError {
    #[error(
        "unsupported Python version in docker image: {image}. The image's Python runtime must \
         match the Lambda runtime Chalice packages for. See AWS Lambda Runtimes documentation \
         for supported versions: https://docs.aws.amazon.com/lambda/latest/dg/lambda-runtimes.html"
    )]
    UnsupportedImage { image: String },

    #[error("failed to resolve {path} for mounting into the build container")]
    ResolvePath {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create build output directory {path}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Runtime { source: RuntimeError },
}
