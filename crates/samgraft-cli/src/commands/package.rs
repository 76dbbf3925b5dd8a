use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use samgraft::{
    ContainerSpec, DEFAULT_INCLUSION_KEY, DEFAULT_PYTHON_VERSION, FsComposer, PackageRequest,
    Packager, SamgraftConfig, StageConfig,
};

#[derive(clap::Args)]
pub struct PackageArgs {
    /// Chalice stage to package (overrides project.stage)
    #[arg(long)]
    stage: Option<String>,

    /// Chalice app root (overrides project.source_dir)
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// JSON file with the stage config (overrides [stage_config])
    #[arg(long, value_name = "FILE")]
    stage_config: Option<PathBuf>,

    /// Package inside a build container
    #[arg(long)]
    container: bool,

    /// Build image (implies --container)
    #[arg(long)]
    image: Option<String>,

    /// Command run in the container before installing requirements (repeatable)
    #[arg(long = "init-command", value_name = "CMD")]
    init_commands: Vec<String>,

    /// Container environment variable in KEY=VALUE format (repeatable)
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    env: Vec<(String, String)>,

    /// Directory receiving the template and assets (overrides project.out_dir)
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

pub async fn package(args: PackageArgs) -> anyhow::Result<()> {
    let config = SamgraftConfig::load(Path::new("."))?;

    let Some(stage) = args.stage.clone().or_else(|| config.project.stage.clone()) else {
        anyhow::bail!("no stage given: pass --stage or set project.stage in samgraft.toml");
    };
    let source_dir = args
        .source_dir
        .clone()
        .unwrap_or_else(|| config.project.source_dir.clone());
    let stage_config = match &args.stage_config {
        Some(path) => read_stage_config(path)?,
        None => config.stage_config.clone(),
    };

    let mut request = PackageRequest::new(source_dir, &stage).with_stage_config(stage_config);
    if let Some(spec) = container_spec(&args, &config) {
        println!("Building in container image {}", spec.image());
        request = request.with_container(spec);
    }

    let out_dir = args.out_dir.unwrap_or(config.project.out_dir);
    let composer = FsComposer::new(&out_dir, config.project.bucket);
    let packager = Packager::new(composer).with_output_root(config.project.output_root);

    let manifest = packager.package(&request).await?;
    let functions = manifest.function_names()?;

    println!();
    println!("Packaged stage '{stage}'");
    println!(
        "  Template:  {}",
        packager
            .composer()
            .template_path(DEFAULT_INCLUSION_KEY)
            .display()
    );
    println!("  Functions: {}", functions.len());
    if let Some(code_uri) = functions.first().and_then(|name| {
        manifest.as_value()["Resources"][name.as_str()]["Properties"].get("CodeUri")
    }) {
        println!(
            "  Asset:     s3://{}/{}",
            code_uri["Bucket"].as_str().unwrap_or_default(),
            code_uri["Key"].as_str().unwrap_or_default()
        );
    }

    Ok(())
}

/// Container settings from samgraft.toml, with command-line overrides.
/// `None` means a local build.
fn container_spec(args: &PackageArgs, config: &SamgraftConfig) -> Option<ContainerSpec> {
    let file = config.container.as_ref();
    if !args.container && args.image.is_none() && file.is_none() {
        return None;
    }

    let image = args
        .image
        .as_deref()
        .or_else(|| file.and_then(|c| c.image.as_deref()))
        .unwrap_or_default();
    let python_version = file
        .and_then(|c| c.python_version.as_deref())
        .unwrap_or(DEFAULT_PYTHON_VERSION);

    let mut env: BTreeMap<String, String> = file.map(|c| c.env.clone()).unwrap_or_default();
    env.extend(args.env.iter().cloned());

    let init_commands = if args.init_commands.is_empty() {
        file.map(|c| c.init_commands.clone()).unwrap_or_default()
    } else {
        args.init_commands.clone()
    };

    Some(ContainerSpec::with_python_version(
        image,
        python_version,
        env,
        init_commands,
    ))
}

fn read_stage_config(path: &Path) -> anyhow::Result<StageConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read stage config {}: {e}", path.display()))?;
    match serde_json::from_str(&content)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => anyhow::bail!("stage config {} must be a JSON object", path.display()),
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_owned(), value.to_owned())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}
