use std::path::Path;

use samgraft::CONFIG_FILE;

const TEMPLATE: &str = r#"[project]
# Root of the Chalice app (holds app.py and .chalice/config.json)
source_dir = "."
# stage = "dev"
# output_root = "chalice.out"
# out_dir = "cdk.out"
# bucket = "samgraft-assets"

# Written to stages.<stage> in .chalice/config.json before packaging
[stage_config]
# api_gateway_stage = "v1"

# Uncomment to package inside a Lambda build image instead of on the host
# [container]
# image = ""
# python_version = "3.8"
# init_commands = ["pip install chalice"]
# [container.env]
# PIP_INDEX_URL = "https://pypi.org/simple"
"#;

/// Write a commented samgraft.toml into the current directory.
pub async fn init_project() -> anyhow::Result<()> {
    let config_path = Path::new(CONFIG_FILE);
    if config_path.exists() {
        eprintln!("{CONFIG_FILE} already exists, skipping");
        return Ok(());
    }

    std::fs::write(config_path, TEMPLATE)?;
    println!("Created {CONFIG_FILE}");

    if !Path::new(samgraft::CONFIG_STORE_PATH).exists() {
        println!();
        println!("No {} found here.", samgraft::CONFIG_STORE_PATH);
        println!("Point project.source_dir at your Chalice app, or create one with:");
        println!("  chalice new-project <name>");
    }

    println!();
    println!("Next steps:");
    println!("  samgraft doctor");
    println!("  samgraft package --stage dev");

    Ok(())
}
