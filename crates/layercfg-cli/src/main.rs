//! layercfg - command-line front end for layered configuration.
//!
//! Responsibilities:
//! - Parse command-line arguments and environment variables.
//! - Load the config file once and enable the selected secret backend.
//! - Print, resolve or edit configuration, exiting with a structured code.
//!
//! Invariants:
//! - `--print_config` prints only the file layer and never touches the
//!   secret backend.
//! - `--print_config` wins over any subcommand, `edit` included.
//! - `edit` does not parse the config file, so a broken file can be fixed.

mod args;
mod commands;
mod error;
mod output;

use std::sync::Arc;

use anyhow::Result;
use args::{Cli, Commands};
use clap::{CommandFactory, Parser};
use error::ExitCode;
use layercfg_core::{ConfigStore, ConsoleLogger, SharedLogger, ValueMode};

fn main() {
    let cli = Cli::parse();

    let code = match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from_error(&err)
        }
    };
    std::process::exit(code.as_i32());
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let mut console = ConsoleLogger::new();
    if let Some(level) = cli.log_level {
        console = console.with_level(level);
    }
    let logger: SharedLogger = Arc::new(console);

    // Editing works on the file as-is, without loading it. `--print_config`
    // overrides any subcommand.
    if !cli.print_config {
        match &cli.command {
            Some(Commands::Edit {
                set_editor: Some(program),
                ..
            }) => return commands::set_editor(program),
            Some(Commands::Edit {
                clear_editor: true, ..
            }) => return commands::clear_editor(),
            Some(Commands::Edit { print: false, .. }) => {
                return commands::edit(cli.config.as_deref())
            }
            _ => {}
        }
    }

    if cli.config.is_none() && (cli.print_config || cli.command.is_none()) {
        logger.info("Config file not set\n\t'layercfg --config /path/to/json/configfile'");
    }

    let store = ConfigStore::builder()
        .config_file_opt(cli.config.clone())
        .value_mode(if cli.raw_values {
            ValueMode::Raw
        } else {
            ValueMode::Typed
        })
        .logger(logger)
        .build()?;

    if cli.print_config {
        return commands::print_config(&store, cli.format);
    }

    let code = match &cli.command {
        None => {
            Cli::command().print_help()?;
            ExitCode::Success
        }
        Some(Commands::Edit { .. }) => commands::print_config(&store, cli.format)?,
        Some(Commands::Get { keys, show_source }) => {
            commands::enable_secret_backend(&store, cli)?;
            let result = commands::get(&store, keys, cli.format, *show_source);
            store.cleanup();
            result?
        }
    };
    Ok(code)
}
