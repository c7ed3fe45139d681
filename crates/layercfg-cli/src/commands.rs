//! Command handlers.
//!
//! Each handler writes its result to stdout and returns the exit code; errors
//! are returned to `main`, which maps them to exit codes.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use layercfg_core::editor::{self, EditorPreference};
use layercfg_core::{ConfigStore, EditorError, GsmOptions, ResolveError};

use crate::args::{Cli, OutputFormat};
use crate::error::ExitCode;
use crate::output;

/// Print the file layer and finish
pub fn print_config(store: &ConfigStore, format: OutputFormat) -> Result<ExitCode> {
    write_stdout(&output::render_entries(store, format)?)?;
    Ok(ExitCode::Success)
}

/// Resolve `keys` in order, stopping at the first miss
pub fn get(
    store: &ConfigStore,
    keys: &[String],
    format: OutputFormat,
    show_source: bool,
) -> Result<ExitCode> {
    let mut resolved = Vec::with_capacity(keys.len());
    for key in keys {
        match store.resolve(key) {
            Some(value) => resolved.push((key.clone(), value)),
            None => {
                // Surface what did resolve before failing
                if !resolved.is_empty() {
                    write_stdout(&output::render_resolved(&resolved, format, show_source)?)?;
                }
                return Err(ResolveError::NotFound {
                    key: key.clone(),
                    consulted: store.consulted_sources(),
                }
                .into());
            }
        }
    }
    write_stdout(&output::render_resolved(&resolved, format, show_source)?)?;
    Ok(ExitCode::Success)
}

/// Persist the preferred editor
pub fn set_editor(program: &str) -> Result<ExitCode> {
    let preference = EditorPreference::user()?;
    preference.save(program)?;
    eprintln!("Preferred editor set to '{}' ({})", program.trim(), preference.path().display());
    Ok(ExitCode::Success)
}

/// Forget the persisted editor preference
pub fn clear_editor() -> Result<ExitCode> {
    let preference = EditorPreference::user()?;
    preference.clear()?;
    eprintln!("Preferred editor cleared ({})", preference.path().display());
    Ok(ExitCode::Success)
}

/// Open the config file in the preferred editor
pub fn edit(config: Option<&Path>) -> Result<ExitCode> {
    let path = config.ok_or(EditorError::NoConfigPath)?;
    // A missing preference file is not an error; an unreadable one is
    let preferred = match EditorPreference::user() {
        Ok(preference) => preference.load()?,
        Err(_) => None,
    };
    let editor = editor::resolve_editor(preferred.as_deref());
    editor::launch(&editor, path)?;
    Ok(ExitCode::Success)
}

/// Activate the secret backend selected on the command line, if any
pub fn enable_secret_backend(store: &ConfigStore, cli: &Cli) -> Result<()> {
    if let Some(project) = &cli.secret_project {
        let options = GsmOptions::default().with_timeout(Duration::from_secs(cli.secret_timeout));
        store.enable_gsm(project, options)?;
    } else if let Some(service) = &cli.keychain_service {
        store.enable_keychain(service)?;
    }
    Ok(())
}

fn write_stdout(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
