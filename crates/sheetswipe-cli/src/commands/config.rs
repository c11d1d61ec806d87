use std::path::Path;

use anyhow::Result;

use sheetswipe_core::AppConfig;

pub fn run(config: &AppConfig, path: Option<&Path>, write: bool) -> Result<()> {
    let default_path = AppConfig::config_path();
    let path = path.unwrap_or(&default_path);

    if write {
        config.save_to(path)?;
        println!("Wrote configuration to {}", path.display());
        return Ok(());
    }

    let status = if path.exists() { "" } else { " (not found, using defaults)" };
    println!("# {}{}\n", path.display(), status);
    print!("{}", config.to_toml()?);

    Ok(())
}
