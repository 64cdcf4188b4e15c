//! `scoutclaw onboard`: first-time setup.

use scoutclaw_config::AppConfig;
use std::path::Path;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();

    println!("ScoutClaw First-Time Setup");
    println!("==========================\n");

    let created = write_default_config(&config_dir)?;
    let config_path = config_dir.join("config.toml");
    if created {
        println!("Created config.toml at: {}", config_path.display());
        println!("\nNext steps:");
        println!("   1. Set SCOUTCLAW_API_KEY (or OPENAI_API_KEY), or edit api_key in the file");
        println!("   2. Run: scoutclaw run --task \"What is new in RLHF?\"");
        println!("   3. Or serve the web page: scoutclaw gateway\n");
    } else {
        println!("Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete it and re-run onboard.\n");
    }

    Ok(())
}

/// Write `config.toml` with defaults unless it already exists.
fn write_default_config(config_dir: &Path) -> Result<bool, std::io::Error> {
    let config_path = config_dir.join("config.toml");
    if config_path.exists() {
        return Ok(false);
    }
    std::fs::create_dir_all(config_dir)?;
    std::fs::write(&config_path, AppConfig::default_toml())?;
    Ok(true)
}
