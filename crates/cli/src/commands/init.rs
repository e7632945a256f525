//! `pincer init` — write a default configuration file.

use pincer_config::RuntimeConfig;

pub async fn run() -> anyhow::Result<()> {
    let config_dir = RuntimeConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("created {}", config_dir.display());
    }

    if config_path.exists() {
        println!("config already exists at {}", config_path.display());
        println!("edit it in place, or delete it and re-run `pincer init`.");
        return Ok(());
    }

    std::fs::write(&config_path, RuntimeConfig::default_toml())?;
    println!("wrote {}", config_path.display());
    println!();
    println!("next steps:");
    println!("  1. set PINCER_API_KEY (or add api_key under [reasoner])");
    println!("  2. run `pincer chat`");

    Ok(())
}
