//! Generate a travel plan from the crew

use colored::*;
use eyre::{Context, Result};
use serde::Serialize;

use crate::agent::CrewLoader;
use crate::agent::role::is_failure;
use crate::cli::{OutputFormat, PlanArgs};
use crate::config::Config;
use crate::export;
use crate::gateway::GroqGateway;
use crate::history::{HistoryStore, RunRecord};
use crate::planner::coordinator::preview_prompts;
use crate::planner::{Coordinator, PlanResult, TravelDates, TripRequest};

pub fn run(args: PlanArgs, config: &Config, quiet: bool) -> Result<()> {
    let request = TripRequest {
        origin: args.origin.trim().to_string(),
        destination: args.destination.trim().to_string(),
        dates: TravelDates::from_pair(args.start, args.end)?,
        budget: args.budget,
        travelers: args.travelers,
        preferences: args.preferences.trim().to_string(),
    };
    request.validate()?;

    let crew_path = Config::expand_path(&config.paths.crew);
    let crew = CrewLoader::new(crew_path).load().context("Failed to load crew")?;
    let format = OutputFormat::resolve(args.format);

    if args.dry_run {
        return print_preview(&preview_prompts(&crew, &request), format);
    }

    let Some(credential) = config.resolve_credential(args.api_key.as_deref())? else {
        eprintln!(
            "{} Please provide a Groq API key: pass {}, set {}, or add it to {}",
            "⚠".yellow(),
            "--api-key".cyan(),
            config.gateway.api_key_env.cyan(),
            Config::tripcrew_dir().join(".env").display()
        );
        log::warn!("Plan not started: no API key available");
        std::process::exit(1);
    };

    let gateway = GroqGateway::new(&config.gateway, credential);
    log::info!("Using completion endpoint {}", gateway.endpoint());
    let coordinator = Coordinator::new(crew, gateway, config.gateway.model.as_str())?;

    if format == OutputFormat::Text && !quiet {
        println!(
            "{} Planning {} → {} with {} agents...",
            "→".blue(),
            request.origin.cyan(),
            request.destination.cyan(),
            coordinator.agents().len()
        );
        println!();
    }

    let result = coordinator.execute_plan(&request);

    let store = HistoryStore::new(Config::expand_path(&config.paths.history), config.history.limit);
    if let Err(e) = store.append(RunRecord::new(request, result.clone())) {
        log::warn!("Failed to record run in history: {:#}", e);
        eprintln!("{} Could not save this run to history: {}", "⚠".yellow(), e);
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&result)?),
        OutputFormat::Text => print_plan(&result),
    }

    if let Some(dir) = args.export {
        let dir = dir.unwrap_or_else(|| Config::expand_path(&config.paths.exports));
        match export::write_pdf(&result, &dir) {
            Ok((path, bytes)) => {
                eprintln!("{} Exported: {}", "✓".green(), path.display());
                if args.data_uri {
                    let link = export::data_uri_link(&bytes);
                    // stdout stays parseable in json/yaml mode
                    if format == OutputFormat::Text {
                        println!("{}", link);
                    } else {
                        eprintln!("{}", link);
                    }
                }
            }
            Err(e) => {
                log::warn!("Export failed: {:#}", e);
                eprintln!("{} Export failed: {:#}", "⚠".yellow(), e);
            }
        }
    }

    Ok(())
}

/// Human-readable rendering of a plan, one section per role
pub fn print_plan(result: &PlanResult) {
    println!("{}", "🌟 Your Personalized Travel Plan".bold());
    println!("{}", "═".repeat(50));

    for (role, text) in result.iter() {
        println!();
        println!("{} {}", "🔍".blue(), role.cyan().bold());
        println!("{}", "─".repeat(50).dimmed());
        if is_failure(text) {
            println!("{}", text.red());
        } else {
            println!("{}", text.trim_end());
        }
    }

    let failed = result.failed_roles();
    if !failed.is_empty() {
        println!();
        println!(
            "{} {} of {} sections could not be generated",
            "⚠".yellow(),
            failed.len(),
            result.len()
        );
    }
}

fn print_preview(prompts: &[(String, String)], format: OutputFormat) -> Result<()> {
    #[derive(Serialize)]
    struct PromptPreview<'a> {
        role: &'a str,
        prompt: &'a str,
    }

    let previews: Vec<PromptPreview> = prompts
        .iter()
        .map(|(role, prompt)| PromptPreview { role, prompt })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&previews)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&previews)?),
        OutputFormat::Text => {
            for preview in &previews {
                println!("{} {}", "●".green(), preview.role.bold());
                println!("{}", "─".repeat(50).dimmed());
                println!("{}", preview.prompt.trim_end());
                println!();
            }
        }
    }

    Ok(())
}
