use colored::*;
use eyre::Result;
use serde::Serialize;

use crate::cli::{HistoryAction, OutputFormat};
use crate::commands::plan::print_plan;
use crate::config::Config;
use crate::history::{HistoryStore, RunRecord};

pub fn run(action: HistoryAction, config: &Config) -> Result<()> {
    let store = HistoryStore::new(Config::expand_path(&config.paths.history), config.history.limit);

    match action {
        HistoryAction::Recent { count, format } => recent(&store, count, OutputFormat::resolve(format)),
        HistoryAction::Show { index, format } => show(&store, index, OutputFormat::resolve(format)),
        HistoryAction::Clear => clear(&store),
    }
}

fn recent(store: &HistoryStore, count: Option<usize>, format: OutputFormat) -> Result<()> {
    let history = store.load()?;
    let records: Vec<&RunRecord> = history.iter().take(count.unwrap_or(usize::MAX)).collect();

    #[derive(Serialize)]
    struct RunSummary<'a> {
        index: usize,
        timestamp: &'a str,
        origin: &'a str,
        destination: &'a str,
        dates: String,
        roles: Vec<&'a str>,
        failed: Vec<&'a str>,
    }

    let summaries: Vec<RunSummary> = records
        .iter()
        .enumerate()
        .map(|(i, r)| RunSummary {
            index: i + 1,
            timestamp: &r.timestamp,
            origin: &r.request.origin,
            destination: &r.request.destination,
            dates: r.request.dates.to_string(),
            roles: r.result.iter().map(|(role, _)| role).collect(),
            failed: r.result.failed_roles(),
        })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&summaries)?),
        OutputFormat::Text => {
            println!("{} Previous Plans:", "📋".blue());
            println!();

            if history.is_empty() {
                println!("  {}", "(no history yet)".dimmed());
            }
            for (summary, record) in summaries.iter().zip(&records) {
                println!(
                    "  {} {} {}",
                    format!("[{}]", summary.index).dimmed(),
                    summary.timestamp.cyan(),
                    record.request.summary().bold()
                );
                println!("    Dates: {}", summary.dates);
                println!("    Sections: {}", summary.roles.join(", "));
                if !summary.failed.is_empty() {
                    println!("    {} {}", "Failed:".red(), summary.failed.join(", "));
                }
            }
        }
    }

    Ok(())
}

fn show(store: &HistoryStore, index: usize, format: OutputFormat) -> Result<()> {
    let history = store.load()?;
    let Some(record) = index.checked_sub(1).and_then(|i| history.get(i)) else {
        eyre::bail!(
            "No run #{} in history ({} stored, 1 is the newest)",
            index,
            history.len()
        );
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(record)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(record)?),
        OutputFormat::Text => {
            println!("{} {}  {}", "🗓️".blue(), record.timestamp.cyan(), record.request.summary().bold());
            println!("   Dates: {}", record.request.dates);
            println!("   Preferences: {}", record.request.preferences);
            println!();
            print_plan(&record.result);
        }
    }

    Ok(())
}

fn clear(store: &HistoryStore) -> Result<()> {
    if store.clear()? {
        println!("{} Cleared history at {}", "✓".green(), store.path().display());
    } else {
        println!("  {}", "(no history yet)".dimmed());
    }
    Ok(())
}
