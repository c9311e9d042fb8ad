//! Crew inspection commands

use colored::*;
use eyre::Result;
use serde::Serialize;

use crate::agent::CrewLoader;
use crate::cli::{AgentAction, OutputFormat};
use crate::config::Config;
use crate::planner::TripRequest;
use crate::planner::coordinator::task_description;

pub fn run(action: AgentAction, config: &Config) -> Result<()> {
    let loader = CrewLoader::new(Config::expand_path(&config.paths.crew));

    match action {
        AgentAction::List { format } => list_agents(&loader, OutputFormat::resolve(format)),
        AgentAction::Show { role, format } => show_agent(&loader, &role, OutputFormat::resolve(format)),
        AgentAction::Prompt { role } => show_prompt(&loader, &role),
        AgentAction::Init { force } => init_crew(&loader, force),
    }
}

fn list_agents(loader: &CrewLoader, format: OutputFormat) -> Result<()> {
    let crew = loader.load()?;

    #[derive(Serialize)]
    struct AgentSummary<'a> {
        role: &'a str,
        goal: &'a str,
        capabilities: Vec<&'a str>,
    }

    let summaries: Vec<AgentSummary> = crew
        .iter()
        .map(|a| AgentSummary {
            role: &a.role,
            goal: &a.goal,
            capabilities: a.capabilities.iter().map(|c| c.name.as_str()).collect(),
        })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&summaries)?),
        OutputFormat::Text => {
            println!("{}", "Crew (run order):".bold());
            if !loader.crew_path().exists() {
                println!("  {}", "built-in default crew".dimmed());
            }
            println!();

            for (i, agent) in crew.iter().enumerate() {
                println!("  {} {}", format!("{}.", i + 1).green(), agent.role.bold());
                println!("    {}", agent.goal.dimmed());
                if !agent.capabilities.is_empty() {
                    let names: Vec<&str> = agent.capabilities.iter().map(|c| c.name.as_str()).collect();
                    println!("    Tools: {}", names.join(", ").cyan());
                }
                println!();
            }
        }
    }

    Ok(())
}

fn show_agent(loader: &CrewLoader, role: &str, format: OutputFormat) -> Result<()> {
    let Some(agent) = loader.get(role)? else {
        eprintln!("{} Agent '{}' not found in crew", "✗".red(), role);
        return Ok(());
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&agent)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&agent)?),
        OutputFormat::Text => {
            println!("{} {}", "Agent:".bold(), agent.role.green().bold());
            println!();
            println!("{} {}", "Goal:".bold(), agent.goal);
            println!("{} {}", "Backstory:".bold(), agent.backstory);

            if !agent.capabilities.is_empty() {
                println!();
                println!("{}", "Tools:".bold());
                for capability in &agent.capabilities {
                    println!(
                        "  {} {} - {}",
                        "•".cyan(),
                        capability.name.bold(),
                        capability.description
                    );
                }
            }
        }
    }

    Ok(())
}

fn show_prompt(loader: &CrewLoader, role: &str) -> Result<()> {
    let Some(agent) = loader.get(role)? else {
        eprintln!("{} Agent '{}' not found in crew", "✗".red(), role);
        return Ok(());
    };

    let task = task_description(&agent, &TripRequest::default());
    println!("{}", agent.prompt(&task));

    Ok(())
}

fn init_crew(loader: &CrewLoader, force: bool) -> Result<()> {
    if !loader.write_template(force)? {
        eprintln!(
            "{} Crew file already exists at {} (use --force to overwrite)",
            "✗".red(),
            loader.crew_path().display()
        );
        return Ok(());
    }

    println!("{} Created crew file: {}", "✓".green(), loader.crew_path().display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to add, remove or reorder agents", loader.crew_path().display());
    println!("  2. Run {} to verify", "tripcrew agent list".cyan());

    Ok(())
}
