//! `coursewise config`: Configuration management commands.

use coursewise_config::AppConfig;
use std::path::Path;

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   OK  Config parsed successfully");

            let warnings = warnings(&config);
            if warnings.is_empty() {
                println!("   OK  All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   !!  {w}");
                }
            }

            println!();
            println!("   Model:       {}", config.model);
            println!("   Rounds:      {}", config.max_tool_rounds);
            println!("   Max tokens:  {}", config.max_tokens);
            println!("   Results:     {}", config.max_results);
            println!("   History:     {}", config.max_history);
        }
        Err(e) => {
            println!("   ERR Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

/// Non-fatal problems worth pointing out.
fn warnings(config: &AppConfig) -> Vec<&'static str> {
    let mut warnings = Vec::new();
    if !config.has_api_key() {
        warnings.push("No API key set (set ANTHROPIC_API_KEY or add api_key to the config file)");
    }
    if config.max_tool_rounds == 0 {
        warnings.push("max_tool_rounds = 0: course search is disabled, every answer is direct");
    }
    if config.max_tool_rounds > 5 {
        warnings.push("max_tool_rounds above 5 makes each answer slow and costly");
    }
    warnings
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if config.api_key.is_some() {
        config.api_key = Some("[REDACTED]".into());
    }
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}

pub async fn init(force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");
    write_starter(&config_path, force)?;
    println!("Wrote {}", config_path.display());
    Ok(())
}

fn write_starter(path: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() && !force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )
        .into());
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, AppConfig::default_toml())?;
    Ok(())
}
