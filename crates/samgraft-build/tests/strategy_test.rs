use std::collections::BTreeMap;
use std::path::Path;

use mockall::mock;
use samgraft_build::process::{ProcessError, ProcessExecutor, ProcessInvocation, ProcessOutcome};
use samgraft_build::runtime::{ContainerRun, ContainerRuntime, RuntimeError};
use samgraft_build::{BuildError, BuildStrategy, ContainerBuildError, LocalBuildError};
use samgraft_core::{BuildEnv, BuildOutput, ContainerSpec};
use tempfile::TempDir;

mock! {
    Process {}

    impl ProcessExecutor for Process {
        async fn run(&self, invocation: &ProcessInvocation) -> Result<ProcessOutcome, ProcessError>;
    }
}

mock! {
    Runtime {}

    impl ContainerRuntime for Runtime {
        async fn ping(&self) -> Result<(), RuntimeError>;
        async fn run(&self, request: &ContainerRun) -> Result<(), RuntimeError>;
    }
}

fn env_with_chalice(dir: &Path) -> BuildEnv {
    let bin = dir.join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    let exe = bin.join("chalice");
    std::fs::write(&exe, "#!/bin/sh\n").unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
    BuildEnv::from_vars([("PATH".to_owned(), bin.to_string_lossy().into_owned())])
}

// ── Selection ──

#[test]
fn select_without_spec_is_local() {
    let process = MockProcess::new();
    let runtime = MockRuntime::new();
    let env = BuildEnv::from_vars([]);

    let strategy = BuildStrategy::select(None, &process, &runtime, &env);

    assert!(!strategy.is_containerized());
    assert!(matches!(strategy, BuildStrategy::Local(_)));
}

#[test]
fn select_with_spec_is_container() {
    let process = MockProcess::new();
    let runtime = MockRuntime::new();
    let env = BuildEnv::from_vars([]);
    let spec = ContainerSpec::new("", BTreeMap::new(), vec![]);

    let strategy = BuildStrategy::select(Some(&spec), &process, &runtime, &env);

    assert!(strategy.is_containerized());
    assert!(matches!(strategy, BuildStrategy::Container(_)));
}

// ── Dispatch ──

#[tokio::test]
async fn local_strategy_never_touches_container_runtime() {
    let tmp = TempDir::new().unwrap();
    let env = env_with_chalice(tmp.path());

    let mut process = MockProcess::new();
    process
        .expect_run()
        .times(1)
        .returning(|_| Ok(ProcessOutcome { code: Some(0) }));
    let runtime = MockRuntime::new();

    let strategy = BuildStrategy::select(None, &process, &runtime, &env);
    strategy
        .run(tmp.path(), "prod", &BuildOutput::at(tmp.path().join("out")))
        .await
        .unwrap();
}

#[tokio::test]
async fn container_strategy_never_launches_local_process() {
    let tmp = TempDir::new().unwrap();
    let env = env_with_chalice(tmp.path());
    let spec = ContainerSpec::new("", BTreeMap::new(), vec![]);

    let process = MockProcess::new();
    let mut runtime = MockRuntime::new();
    runtime.expect_run().times(1).returning(|_| Ok(()));

    let strategy = BuildStrategy::select(Some(&spec), &process, &runtime, &env);
    strategy
        .run(tmp.path(), "prod", &BuildOutput::at(tmp.path().join("out")))
        .await
        .unwrap();
}

#[tokio::test]
async fn errors_keep_their_runner_kind() {
    let tmp = TempDir::new().unwrap();
    let empty_env = BuildEnv::from_vars([]);
    let spec = ContainerSpec::new("missing/image", BTreeMap::new(), vec![]);

    let process = MockProcess::new();
    let mut runtime = MockRuntime::new();
    runtime.expect_run().returning(|req| {
        Err(RuntimeError::ImageNotFound {
            image: req.image.clone(),
        })
    });
    let output = BuildOutput::at(tmp.path().join("out"));

    let local = BuildStrategy::select(None, &process, &runtime, &empty_env);
    let local_err = local.run(tmp.path(), "prod", &output).await.unwrap_err();
    assert!(matches!(
        local_err,
        BuildError::Local(LocalBuildError::ExecutableNotFound { .. })
    ));

    let container = BuildStrategy::select(Some(&spec), &process, &runtime, &empty_env);
    let container_err = container.run(tmp.path(), "prod", &output).await.unwrap_err();
    assert!(matches!(
        container_err,
        BuildError::Container(ContainerBuildError::UnsupportedImage { .. })
    ));
    assert!(container_err.to_string().contains("missing/image"));
}
