use std::fmt;
use std::path::Path;

use samgraft::build::{BUILD_EXECUTABLE, ContainerRuntime, DockerRuntime, RuntimeError, process};
use samgraft::{BuildEnv, CONFIG_FILE, CONFIG_STORE_PATH, SamgraftConfig, stage_names};

#[derive(Debug, Default, Clone)]
struct CheckResult {
    passed: bool,
    /// Reported, but irrelevant for this project.
    informational: bool,
    detail: String,
}

impl CheckResult {
    fn ok(detail: &str) -> Self {
        Self {
            passed: true,
            informational: false,
            detail: detail.to_owned(),
        }
    }

    fn fail(detail: &str) -> Self {
        Self {
            passed: false,
            informational: false,
            detail: detail.to_owned(),
        }
    }

    fn info(detail: &str) -> Self {
        Self {
            passed: true,
            informational: true,
            detail: detail.to_owned(),
        }
    }

    fn icon(&self) -> &'static str {
        match (self.informational, self.passed) {
            (true, _) => "--",
            (false, true) => "OK",
            (false, false) => "NG",
        }
    }
}

#[derive(Debug, Default)]
struct DoctorReport {
    config_file: CheckResult,
    chalice: CheckResult,
    config_store: CheckResult,
    docker: CheckResult,
}

impl DoctorReport {
    fn all_passed(&self) -> bool {
        self.config_file.passed
            && self.chalice.passed
            && self.config_store.passed
            && self.docker.passed
    }
}

impl fmt::Display for DoctorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "samgraft doctor")?;
        writeln!(f, "{}", "-".repeat(40))?;
        for (name, check) in [
            ("samgraft.toml", &self.config_file),
            ("chalice", &self.chalice),
            ("config store", &self.config_store),
            ("docker", &self.docker),
        ] {
            writeln!(f, "{name:<15}{:<4}{}", check.icon(), check.detail)?;
        }
        write!(f, "{}", "-".repeat(40))
    }
}

pub async fn doctor() -> anyhow::Result<()> {
    let mut report = DoctorReport::default();

    // An unreadable samgraft.toml still lets the remaining checks run.
    let config = match SamgraftConfig::load(Path::new(".")) {
        Ok(config) => {
            report.config_file = if Path::new(CONFIG_FILE).exists() {
                CheckResult::ok("Found")
            } else {
                CheckResult::ok("Not found, using defaults")
            };
            config
        }
        Err(e) => {
            report.config_file = CheckResult::fail(&e.to_string());
            SamgraftConfig::default()
        }
    };

    let env = BuildEnv::inherit();
    report.chalice = match process::locate_executable(BUILD_EXECUTABLE, &env) {
        Some(path) => CheckResult::ok(&path.display().to_string()),
        None => CheckResult::fail("not on PATH (pip install chalice)"),
    };

    let source_dir = &config.project.source_dir;
    report.config_store = match stage_names(source_dir) {
        Ok(stages) if stages.is_empty() => CheckResult::ok("no stages yet"),
        Ok(stages) => CheckResult::ok(&format!("stages: {}", stages.join(", "))),
        Err(e) => CheckResult::fail(&format!(
            "{} ({})",
            e,
            source_dir.join(CONFIG_STORE_PATH).display()
        )),
    };

    let ping = DockerRuntime.ping().await;
    report.docker = docker_check(ping, config.container.is_some());

    println!();
    println!("{report}");

    if !report.all_passed() {
        anyhow::bail!("some checks failed, see above for details");
    }

    Ok(())
}

/// Docker only has to be reachable when the project builds in a container.
fn docker_check(ping: Result<(), RuntimeError>, container_build: bool) -> CheckResult {
    match (ping, container_build) {
        (Ok(()), _) => CheckResult::ok("daemon reachable"),
        (Err(e), true) => CheckResult::fail(&e.to_string()),
        (Err(e), false) => CheckResult::info(&format!("{e} (only needed for container builds)")),
    }
}
