use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::planner::request::{
    DEFAULT_BUDGET, DEFAULT_DESTINATION, DEFAULT_ORIGIN, DEFAULT_PREFERENCES, DEFAULT_TRAVELERS,
};

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "tripcrew",
    about = "Plan trips with a crew of role-scoped LLM agents",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/tripcrew/logs/tripcrew.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to tripcrew.yaml config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, help = "Suppress non-error output")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a travel plan
    Plan(PlanArgs),

    /// Show recent planning runs
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Inspect the crew of role agents
    Agent {
        #[command(subcommand)]
        action: AgentAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Diagnose setup issues
    Doctor,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, clap::Args)]
pub struct PlanArgs {
    /// Departure city
    #[arg(long = "from", default_value = DEFAULT_ORIGIN)]
    pub origin: String,

    /// Destination city
    #[arg(long = "to", default_value = DEFAULT_DESTINATION)]
    pub destination: String,

    /// First day of travel (YYYY-MM-DD)
    #[arg(long, requires = "end")]
    pub start: Option<NaiveDate>,

    /// Last day of travel (YYYY-MM-DD)
    #[arg(long, requires = "start")]
    pub end: Option<NaiveDate>,

    /// Total budget in dollars
    #[arg(long, default_value_t = DEFAULT_BUDGET)]
    pub budget: f64,

    /// Number of travelers
    #[arg(long, default_value_t = DEFAULT_TRAVELERS, value_parser = clap::value_parser!(u32).range(1..))]
    pub travelers: u32,

    /// Free-text preferences
    #[arg(long, default_value = DEFAULT_PREFERENCES)]
    pub preferences: String,

    /// Groq API key (falls back to the configured env var, then .env)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Export the plan as travel_plan.pdf into DIR (default: paths.exports)
    #[arg(long, value_name = "DIR", num_args = 0..=1)]
    pub export: Option<Option<PathBuf>>,

    /// Print the exported PDF as a base64 data-URI download link
    #[arg(long, requires = "export")]
    pub data_uri: bool,

    /// Print the prompts each agent would send, without calling the API
    #[arg(long)]
    pub dry_run: bool,

    /// Output format (default: text for TTY, json for pipes)
    #[arg(long, short = 'o', value_enum)]
    pub format: Option<OutputFormat>,
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recent runs, newest first
    Recent {
        /// Number of runs to show
        #[arg(long)]
        count: Option<usize>,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Show the full plan of one run (1 = newest)
    Show {
        index: usize,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Forget all stored runs
    Clear,
}

#[derive(Subcommand)]
pub enum AgentAction {
    /// List the crew in run order
    List {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Show one agent
    Show {
        /// Agent role (case-insensitive)
        role: String,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Print the prompt an agent would send for the default trip
    Prompt {
        /// Agent role (case-insensitive)
        role: String,
    },

    /// Write the default crew to crew.yaml for editing
    Init {
        /// Overwrite an existing crew file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Get a configuration value
    Get {
        /// Configuration key (dot notation)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,

        /// New value
        value: String,
    },
}
