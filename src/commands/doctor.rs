//! Diagnose tripcrew setup issues

use colored::*;
use eyre::Result;

use crate::agent::CrewLoader;
use crate::config::Config;
use crate::history::HistoryStore;

pub fn run(config: &Config) -> Result<()> {
    println!("{}", "tripcrew Doctor".bold());
    println!("{}", "═".repeat(50));
    println!();

    let mut issues = 0;

    // Check tripcrew directory
    let dir = Config::tripcrew_dir();
    if dir.exists() {
        println!("{} tripcrew directory: {}", "✓".green(), dir.display());
    } else {
        println!("{} tripcrew directory missing: {}", "⚠".yellow(), dir.display());
        println!("  Run {} to create it", "tripcrew agent init".cyan());
    }

    // Check config file
    let config_file = dir.join("tripcrew.yaml");
    if config_file.exists() {
        println!("{} Config file: {}", "✓".green(), config_file.display());
    } else {
        println!("{} Config file: {} (using defaults)", "⚠".yellow(), config_file.display());
    }

    // Check crew
    let loader = CrewLoader::new(Config::expand_path(&config.paths.crew));
    match loader.load() {
        Ok(crew) if loader.crew_path().exists() => {
            println!(
                "{} Crew file: {} ({} agents)",
                "✓".green(),
                loader.crew_path().display(),
                crew.len()
            );
        }
        Ok(crew) => {
            println!("{} Crew: built-in default ({} agents)", "✓".green(), crew.len());
        }
        Err(e) => {
            println!("{} Crew file invalid: {:#}", "✗".red(), e);
            issues += 1;
        }
    }

    // Check history
    let store = HistoryStore::new(Config::expand_path(&config.paths.history), config.history.limit);
    match store.load() {
        Ok(history) => println!(
            "{} History: {} ({} of {} runs)",
            "✓".green(),
            store.path().display(),
            history.len(),
            history.capacity()
        ),
        Err(e) => {
            println!("{} History file unreadable: {:#}", "✗".red(), e);
            issues += 1;
        }
    }

    println!();

    // Check gateway
    println!("{}", "Gateway:".bold());
    println!("  Endpoint: {}", config.gateway.base_url);
    println!("  Model:    {}", config.gateway.model);
    match config.resolve_credential(None) {
        Ok(Some(_)) => println!("  {} API key found", "✓".green()),
        Ok(None) => {
            println!("  {} No API key", "✗".red());
            println!(
                "    Set {} or pass {} to {}",
                config.gateway.api_key_env.cyan(),
                "--api-key".cyan(),
                "tripcrew plan".cyan()
            );
            issues += 1;
        }
        Err(e) => {
            println!("  {} Failed to read API key: {:#}", "✗".red(), e);
            issues += 1;
        }
    }

    println!();

    // Summary
    println!("{}", "═".repeat(50));
    if issues == 0 {
        println!("{} All checks passed!", "✓".green().bold());
    } else {
        println!("{} {} issue(s) found", "⚠".yellow().bold(), issues);
    }

    Ok(())
}
