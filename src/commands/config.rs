use colored::*;
use eyre::{Context, Result};

use crate::cli::{ConfigAction, OutputFormat};
use crate::config::Config;

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
        ConfigAction::Get { key } => get(&key, config),
        ConfigAction::Set { key, value } => set(&key, &value, config),
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(config)?);
        }
        OutputFormat::Text => {
            println!("{}", "tripcrew Configuration".bold());
            println!();

            println!("{}:", "paths".cyan());
            println!("  history: {}", config.paths.history.display());
            println!("  crew: {}", config.paths.crew.display());
            println!("  exports: {}", config.paths.exports.display());
            println!();

            println!("{}:", "gateway".cyan());
            println!("  base_url: {}", config.gateway.base_url);
            println!("  model: {}", config.gateway.model);
            println!("  api_key_env: {}", config.gateway.api_key_env);
            println!("  timeout_secs: {}", config.gateway.timeout_secs);
            println!();

            println!("{}:", "history".cyan());
            println!("  limit: {}", config.history.limit);
            println!();

            println!("{}: {}", "log_level".cyan(), config.log_level.as_filter());
        }
    }

    Ok(())
}

fn lookup(key: &str, config: &Config) -> Option<String> {
    match key {
        "paths.history" => Some(config.paths.history.display().to_string()),
        "paths.crew" => Some(config.paths.crew.display().to_string()),
        "paths.exports" => Some(config.paths.exports.display().to_string()),
        "gateway.base_url" => Some(config.gateway.base_url.clone()),
        "gateway.model" => Some(config.gateway.model.clone()),
        "gateway.api_key_env" => Some(config.gateway.api_key_env.clone()),
        "gateway.timeout_secs" => Some(config.gateway.timeout_secs.to_string()),
        "history.limit" => Some(config.history.limit.to_string()),
        "log_level" | "log-level" => Some(config.log_level.as_filter().to_string()),
        _ => None,
    }
}

fn get(key: &str, config: &Config) -> Result<()> {
    match lookup(key, config) {
        Some(v) => println!("{}", v),
        None => {
            eprintln!("{} Unknown config key: {}", "✗".red(), key);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn apply(key: &str, value: &str, config: &mut Config) -> Result<()> {
    match key {
        "paths.history" => config.paths.history = value.into(),
        "paths.crew" => config.paths.crew = value.into(),
        "paths.exports" => config.paths.exports = value.into(),
        "gateway.base_url" => config.gateway.base_url = value.to_string(),
        "gateway.model" => config.gateway.model = value.to_string(),
        "gateway.api_key_env" => config.gateway.api_key_env = value.to_string(),
        "gateway.timeout_secs" => {
            config.gateway.timeout_secs = value.parse().context("Invalid number of seconds")?;
        }
        "history.limit" => {
            config.history.limit = value.parse().context("Invalid history limit")?;
        }
        "log_level" | "log-level" => config.log_level = value.parse()?,
        _ => {
            eyre::bail!("Unknown config key: {}", key);
        }
    }
    Ok(())
}

fn set(key: &str, value: &str, config: &Config) -> Result<()> {
    println!("{} Setting {} = {}", "→".blue(), key.cyan(), value.green());

    let mut new_config = config.clone();
    apply(key, value, &mut new_config)?;
    let config_path = new_config.save()?;

    println!("  {} Saved to {}", "✓".green(), config_path.display());

    Ok(())
}
