use clap::{Parser, ValueEnum};
use engine_logging::LogDestination;
use veogen_core::DEFAULT_MODEL;

/// Generate a short video through the apicore chat-completions API.
#[derive(Debug, Parser)]
#[command(name = "veogen", version, about)]
pub struct Cli {
    /// Prompt describing the video (natural language; aspect hints allowed).
    pub prompt: Option<String>,

    /// Model to use. See `--list-models` for the options.
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// First-frame image URL (must be a direct image link).
    #[arg(long = "image-url")]
    pub image_url: Option<String>,

    /// Extra instructions appended after the prompt.
    #[arg(long)]
    pub extra: Option<String>,

    /// Receive the response incrementally over an event stream.
    #[arg(long)]
    pub stream: bool,

    /// API token (an apicore key, `sk-...`).
    #[arg(long, env = "VEOGEN_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Print the model options and exit.
    #[arg(long = "list-models")]
    pub list_models: bool,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogChoice::File)]
    pub log: LogChoice,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogChoice {
    /// ./veogen.log in the current directory.
    File,
    /// Terminal (stderr).
    Terminal,
    /// Both file and terminal.
    Both,
}

impl Cli {
    pub fn log_destination(&self) -> LogDestination {
        match self.log {
            LogChoice::File => LogDestination::File,
            LogChoice::Terminal => LogDestination::Terminal,
            LogChoice::Both => LogDestination::Both,
        }
    }
}
