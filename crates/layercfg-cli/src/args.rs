//! CLI argument definitions and parsing.
//!
//! Global options select the config file and the secret backend; the
//! subcommands decide what to do with the resulting store.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use layercfg_core::LogLevel;

#[derive(Parser)]
#[command(name = "layercfg")]
#[command(about = "Resolve configuration from a JSON file, the environment and a secret backend", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  layercfg --config app.json --print_config\n  layercfg --config app.json get DB_HOST DB_PORT\n  layercfg --config app.json --secret-project my-proj get DB_PASSWORD --show-source\n  layercfg --config app.json edit\n  layercfg edit --set-editor 'code --wait'\n"
)]
pub struct Cli {
    /// Path to the JSON config file. Without it only the environment and
    /// the secret backend are consulted.
    #[arg(long, global = true, env = "LAYERCFG_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print every key/value pair loaded from the config file and exit
    #[arg(long = "print_config", global = true)]
    pub print_config: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Keep raw JSON text for values (only one surrounding quote pair is stripped)
    #[arg(long, global = true)]
    pub raw_values: bool,

    /// Google Cloud project whose Secret Manager backs missing keys
    #[arg(long, global = true, env = "LAYERCFG_SECRET_PROJECT", value_name = "PROJECT_ID")]
    pub secret_project: Option<String>,

    /// Keychain service name to use as the secret backend instead
    #[arg(
        long,
        global = true,
        env = "LAYERCFG_KEYCHAIN_SERVICE",
        value_name = "SERVICE",
        conflicts_with = "secret_project"
    )]
    pub keychain_service: Option<String>,

    /// Timeout for each secret backend request
    #[arg(long, global = true, default_value_t = 5, value_name = "SECONDS")]
    pub secret_timeout: u64,

    /// Minimum log level written to stderr (debug, info, warn, error)
    #[arg(long, global = true, env = "LAYERCFG_LOG_LEVEL", value_parser = parse_log_level)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve one or more keys and print their values
    Get {
        /// Keys to resolve
        #[arg(required = true, value_name = "KEY")]
        keys: Vec<String>,

        /// Also print which source supplied each value
        #[arg(long)]
        show_source: bool,
    },

    /// Open the config file in an editor
    Edit {
        /// Remember PROGRAM as the preferred editor and exit
        #[arg(long, value_name = "PROGRAM", conflicts_with = "print")]
        set_editor: Option<String>,

        /// Forget the preferred editor and fall back to $VISUAL/$EDITOR
        #[arg(long, conflicts_with_all = ["set_editor", "print"])]
        clear_editor: bool,

        /// Print the loaded configuration instead of editing it
        #[arg(long)]
        print: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `key = value` lines
    Text,
    /// A JSON object
    Json,
}

fn parse_log_level(s: &str) -> Result<LogLevel, String> {
    LogLevel::parse(s).ok_or_else(|| format!("unknown log level '{}'", s))
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
    fn test_print_config_flag_spelling() {
        let cli = Cli::try_parse_from(["layercfg", "--config", "a.json", "--print_config"]).unwrap();
        assert!(cli.print_config);
        assert_eq!(cli.config, Some(PathBuf::from("a.json")));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_get_requires_keys() {
        assert!(Cli::try_parse_from(["layercfg", "get"]).is_err());
        let cli = Cli::try_parse_from(["layercfg", "get", "A", "B", "--show-source"]).unwrap();
        match cli.command {
            Some(Commands::Get { keys, show_source }) => {
                assert_eq!(keys, vec!["A".to_string(), "B".to_string()]);
                assert!(show_source);
            }
            _ => panic!("expected get"),
        }
    }

    #[test]
    fn test_log_level_parsing() {
        let cli = Cli::try_parse_from(["layercfg", "--log-level", "warn", "get", "A"]).unwrap();
        assert_eq!(cli.log_level, Some(LogLevel::Warn));
        assert!(Cli::try_parse_from(["layercfg", "--log-level", "loud", "get", "A"]).is_err());
    }

    #[test]
    fn test_edit_flags_conflict() {
        assert!(Cli::try_parse_from(["layercfg", "edit", "--set-editor", "nano", "--print"]).is_err());
        assert!(
            Cli::try_parse_from(["layercfg", "edit", "--clear-editor", "--set-editor", "nano"]).is_err()
        );
        assert!(Cli::try_parse_from(["layercfg", "edit", "--clear-editor", "--print"]).is_err());
    }

    #[test]
    fn test_print_config_combines_with_subcommand() {
        let cli = Cli::try_parse_from(["layercfg", "--print_config", "edit"]).unwrap();
        assert!(cli.print_config);
        assert!(matches!(cli.command, Some(Commands::Edit { .. })));
    }
}
