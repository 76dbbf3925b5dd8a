use std::collections::BTreeMap;
use std::path::PathBuf;

use bollard::Docker;
use bollard::container::{
    Config, LogsOptions, RemoveContainerOptions, StartContainerOptions, WaitContainerOptions,
};
use bollard::errors::Error as DockerError;
use bollard::image::CreateImageOptions;
use bollard::models::HostConfig;
use futures_util::StreamExt;

/// A host directory mounted read-write into the build container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeBind {
    pub host_path: PathBuf,
    pub container_path: String,
}

impl VolumeBind {
    pub fn read_write(host_path: impl Into<PathBuf>, container_path: &str) -> Self {
        Self {
            host_path: host_path.into(),
            container_path: container_path.to_owned(),
        }
    }

    /// Docker `-v` style bind specification.
    pub fn to_bind_spec(&self) -> String {
        format!("{}:{}:rw", self.host_path.display(), self.container_path)
    }
}

/// One container run: create, start, wait, optionally remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRun {
    pub image: String,
    pub command: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub volumes: Vec<VolumeBind>,
    pub working_dir: String,
    /// Remove the container once it has stopped
    pub remove: bool,
}

/// Abstraction over the container runtime for testability.
///
/// Production code uses [`DockerRuntime`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait ContainerRuntime: Send + Sync {
    /// Check that the runtime is reachable.
    async fn ping(&self) -> Result<(), RuntimeError>;

    /// Run a container to completion, forwarding its output to the log.
    ///
    /// Must report an image that cannot be found or pulled as
    /// [`RuntimeError::ImageNotFound`].
    async fn run(&self, request: &ContainerRun) -> Result<(), RuntimeError>;
}

/// Docker daemon runtime via bollard.
///
/// Connects lazily on each call so that a missing daemon only matters
/// when a container build is actually requested.
#[derive(Debug, Default, Clone, Copy)]
pub struct DockerRuntime;

impl DockerRuntime {
    fn connect() -> Result<Docker, RuntimeError> {
        Docker::connect_with_local_defaults().map_err(|e| RuntimeError::Connect { source: e })
    }

    async fn ensure_image(docker: &Docker, image: &str) -> Result<(), RuntimeError> {
        match docker.inspect_image(image).await {
            Ok(_) => return Ok(()),
            Err(e) if is_not_found(&e) => {}
            Err(e) => {
                return Err(RuntimeError::Inspect {
                    image: image.to_owned(),
                    source: e,
                });
            }
        }

        tracing::info!(image, "pulling build image");
        let options = CreateImageOptions {
            from_image: image.to_owned(),
            ..Default::default()
        };
        let mut pull = docker.create_image(Some(options), None, None);
        while let Some(progress) = pull.next().await {
            match progress {
                Ok(info) => {
                    if let Some(status) = info.status {
                        tracing::debug!(image, status = %status, "pull progress");
                    }
                }
                Err(e) if is_not_found(&e) => {
                    return Err(RuntimeError::ImageNotFound {
                        image: image.to_owned(),
                    });
                }
                Err(e) => {
                    return Err(RuntimeError::Pull {
                        image: image.to_owned(),
                        source: e,
                    });
                }
            }
        }

        Ok(())
    }

    async fn start_and_wait(docker: &Docker, id: &str) -> Result<(), RuntimeError> {
        docker
            .start_container(id, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| RuntimeError::Start {
                id: id.to_owned(),
                source: e,
            })?;

        let options = LogsOptions::<String> {
            follow: true,
            stdout: true,
            stderr: true,
            ..Default::default()
        };
        let mut logs = docker.logs(id, Some(options));
        while let Some(chunk) = logs.next().await {
            match chunk {
                Ok(output) => {
                    for line in output.to_string().lines() {
                        tracing::info!(container = short_id(id), "{line}");
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        container = short_id(id),
                        error = %e,
                        "log stream ended early"
                    );
                    break;
                }
            }
        }

        let mut wait = docker.wait_container(id, None::<WaitContainerOptions<String>>);
        match wait.next().await {
            Some(Ok(response)) if response.status_code != 0 => Err(RuntimeError::Exit {
                id: id.to_owned(),
                code: response.status_code,
            }),
            Some(Ok(_)) | None => Ok(()),
            Some(Err(DockerError::DockerContainerWaitError { code, .. })) => {
                Err(RuntimeError::Exit {
                    id: id.to_owned(),
                    code,
                })
            }
            Some(Err(e)) => Err(RuntimeError::Wait {
                id: id.to_owned(),
                source: e,
            }),
        }
    }
}

impl ContainerRuntime for DockerRuntime {
    async fn ping(&self) -> Result<(), RuntimeError> {
        let docker = Self::connect()?;
        docker
            .ping()
            .await
            .map_err(|e| RuntimeError::Connect { source: e })?;
        Ok(())
    }

    async fn run(&self, request: &ContainerRun) -> Result<(), RuntimeError> {
        let docker = Self::connect()?;
        Self::ensure_image(&docker, &request.image).await?;

        let env: Vec<String> = request
            .env
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        let binds: Vec<String> = request.volumes.iter().map(VolumeBind::to_bind_spec).collect();

        let config = Config {
            image: Some(request.image.clone()),
            cmd: Some(request.command.clone()),
            env: Some(env),
            working_dir: Some(request.working_dir.clone()),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            tty: Some(false),
            host_config: Some(HostConfig {
                binds: Some(binds),
                ..Default::default()
            }),
            ..Default::default()
        };

        let container = docker
            .create_container::<String, String>(None, config)
            .await
            .map_err(|e| {
                if is_not_found(&e) {
                    RuntimeError::ImageNotFound {
                        image: request.image.clone(),
                    }
                } else {
                    RuntimeError::Create {
                        image: request.image.clone(),
                        source: e,
                    }
                }
            })?;
        tracing::debug!(
            container = short_id(&container.id),
            image = %request.image,
            "container created"
        );

        let outcome = Self::start_and_wait(&docker, &container.id).await;

        if request.remove {
            let options = RemoveContainerOptions {
                force: true,
                ..Default::default()
            };
            if let Err(e) = docker.remove_container(&container.id, Some(options)).await {
                if outcome.is_ok() {
                    return Err(RuntimeError::Remove {
                        id: container.id,
                        source: e,
                    });
                }
                tracing::warn!(
                    container = short_id(&container.id),
                    error = %e,
                    "failed to remove container"
                );
            }
        }

        outcome
    }
}

fn is_not_found(error: &DockerError) -> bool {
    match error {
        DockerError::DockerResponseServerError { status_code, .. } => *status_code == 404,
        DockerError::DockerStreamError { error } => {
            let error = error.to_ascii_lowercase();
            error.contains("not found") || error.contains("does not exist")
        }
        _ => false,
    }
}

fn short_id(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("could not reach the Docker daemon — is Docker running?")]
    Connect { source: DockerError },

    #[error("image {image} not found")]
    ImageNotFound { image: String },

    #[error("failed to inspect image {image}")]
    Inspect { image: String, source: DockerError },

    #[error("failed to pull image {image}")]
    Pull { image: String, source: DockerError },

    #[error("failed to create container from {image}")]
    Create { image: String, source: DockerError },

    #[error("failed to start container {id}")]
    Start { id: String, source: DockerError },

    #[error("container {id} exited with status {code}")]
    Exit { id: String, code: i64 },

    #[error("failed waiting for container {id}")]
    Wait { id: String, source: DockerError },

    #[error("failed to remove container {id}")]
    Remove { id: String, source: DockerError },
}
