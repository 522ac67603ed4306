//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for run results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every target's output or failure, then the synthesis
    Full,
    /// Only the synthesis (or the successful outputs without one)
    Synthesis,
    /// JSON output
    Json,
}

impl From<OutputFormat> for fanout_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => Self::Full,
            OutputFormat::Synthesis => Self::Synthesis,
            OutputFormat::Json => Self::Json,
        }
    }
}

/// CLI arguments for llm-fanout
#[derive(Parser, Debug)]
#[command(name = "llm-fanout")]
#[command(author, version, about = "Send one prompt to many LLMs concurrently")]
#[command(long_about = r#"
llm-fanout sends one prompt to several models at once, retries transient
failures with backoff, respects per-provider rate limits, and reports every
model's answer (or why it failed). An optional synthesis model can merge the
successful answers into one.

Targets are written as <provider>/<model>, e.g. openai/gpt-4o.

Configuration files are loaded from (in priority order):
1. FANOUT_* environment variables
2. --config <path>     Explicit config file
3. ./fanout.toml       Project-level config
4. ~/.config/llm-fanout/config.toml   Global config

Exit status: 0 all targets succeeded, 2 partial success, 1 all failed or error.

Example:
  llm-fanout -m openai/gpt-4o -m groq/llama-3.3-70b-versatile "Explain Pin in Rust"
  llm-fanout -m openai/gpt-4o -m openai/gpt-4o-mini --synthesis openai/gpt-4o -f prompt.md
  cat prompt.md | llm-fanout -m ollama/llama3.2 -o json
"#)]
pub struct Cli {
    /// The prompt (read from --prompt-file or stdin when omitted)
    pub prompt: Option<String>,

    /// Target model as <provider>/<model> (can be specified multiple times)
    #[arg(short, long = "model", value_name = "TARGET")]
    pub models: Vec<String>,

    /// Model that merges the successful outputs into one answer
    #[arg(long, value_name = "TARGET")]
    pub synthesis: Option<String>,

    /// Read the prompt from a file
    #[arg(short = 'f', long, value_name = "PATH", conflicts_with = "prompt")]
    pub prompt_file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Maximum simultaneous in-flight calls across all targets
    #[arg(long, value_name = "N")]
    pub max_concurrency: Option<usize>,

    /// Attempts per target, including the first
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u32>,

    /// Per-call timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
