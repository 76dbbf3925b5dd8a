//! Runners for `chalice package`, on the host or in a container.
//!
//! # Build step
//!
//! ```text
//! BuildStrategy::select(container_spec)
//!   None       ── LocalRunner     ── chalice package --stage <stage> <output>
//!   Some(spec) ── ContainerRunner ── bash -c "<init>; pip install ...; chalice package ..."
//! ```
//!
//! # Container layout
//!
//! - Source tree bind-mounted at `/app`, which is also the working directory
//! - Build output bind-mounted at `/chalice.out`
//! - Container removed after the build
//!
//! Both runners leave `sam.json` and `deployment.zip` in the output
//! directory. Neither inspects the generated files.

pub mod container;
pub mod local;
pub mod process;
pub mod runtime;
pub mod strategy;

/// The build CLI invoked by both runners.
pub const BUILD_EXECUTABLE: &str = "chalice";

pub use container::{ContainerBuildError, ContainerRunner, package_script};
pub use local::{LocalBuildError, LocalRunner};
pub use process::{ProcessError, ProcessExecutor, ProcessInvocation, ProcessOutcome, RealProcess};
pub use runtime::{ContainerRun, ContainerRuntime, DockerRuntime, RuntimeError, VolumeBind};
pub use strategy::{BuildError, BuildStrategy};
