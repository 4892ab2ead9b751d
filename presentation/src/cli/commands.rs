//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for roundtable
#[derive(Parser, Debug)]
#[command(name = "roundtable")]
#[command(author, version, about = "Writing room - LLM personas discuss your story")]
#[command(long_about = r#"
Roundtable runs a round-based discussion among LLM personas (writer, editor,
proofreader, mediator) about a topic you choose.

Each round every participant speaks once; mediators speak last. The discussion
ends after the round limit, when someone records a `DECISION:` line, when a
budget runs out, or when you stop it.

While it runs, type into the terminal:
  /pause  /resume  /stop  /status
  anything else          adds your own message to the discussion
  !high <text>           ... marked as high impact (!low for low)

Configuration files are loaded from (in priority order):
1. ROUNDTABLE_* environment variables
2. --config <path>     Explicit config file
3. ./roundtable.toml   Project-level config
4. ~/.config/roundtable/config.toml   Global config

Example:
  roundtable "The heroine's hometown: what does it look like?"
  roundtable -p writer -p editor --max-rounds 3 "Should the mentor die in act two?"
"#)]
pub struct Cli {
    /// The topic to discuss (not required with --show-config)
    pub topic: Option<String>,

    /// Background material for the discussion
    #[arg(long, value_name = "TEXT")]
    pub context: Option<String>,

    /// Personas to include, in speaking order (can be specified multiple times)
    #[arg(short = 'p', long = "persona", value_name = "ID")]
    pub personas: Vec<String>,

    /// Rounds before the discussion ends
    #[arg(long, value_name = "N")]
    pub max_rounds: Option<u32>,

    /// Active-time budget in seconds (0 disables)
    #[arg(long, value_name = "SECS")]
    pub time_limit: Option<u64>,

    /// Token budget for agent turns (0 disables)
    #[arg(long, value_name = "TOKENS")]
    pub token_limit: Option<u64>,

    /// Warn instead of stopping when a budget runs out
    #[arg(long)]
    pub no_auto_stop: bool,

    /// Default model for personas without an override
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print messages and the final report
    #[arg(short, long)]
    pub quiet: bool,

    /// Append every event as JSON lines to this file
    #[arg(long, value_name = "PATH")]
    pub event_log: Option<PathBuf>,

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

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_full_invocation() {
        let cli = Cli::try_parse_from([
            "roundtable",
            "-p",
            "writer",
            "--persona",
            "editor",
            "--max-rounds",
            "3",
            "--time-limit",
            "600",
            "--no-auto-stop",
            "-vv",
            "Glacier port",
        ])
        .unwrap();
        assert_eq!(cli.topic.as_deref(), Some("Glacier port"));
        assert_eq!(cli.personas, vec!["writer", "editor"]);
        assert_eq!(cli.max_rounds, Some(3));
        assert_eq!(cli.time_limit, Some(600));
        assert!(cli.no_auto_stop);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_show_config_needs_no_topic() {
        let cli = Cli::try_parse_from(["roundtable", "--show-config"]).unwrap();
        assert!(cli.show_config);
        assert!(cli.topic.is_none());
    }
}
