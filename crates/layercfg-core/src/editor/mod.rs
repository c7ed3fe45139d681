//! Interactive editing of the config file
//!
//! Operator tooling around the store, not part of resolution:
//! - a persisted editor preference under the user config dir
//! - launching that editor on the config file with inherited stdio

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;

/// Used when no preference, `$VISUAL` or `$EDITOR` is set
pub const DEFAULT_EDITOR: &str = "vi";

/// Errors from the editing helper
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("No config file to edit; pass --config <path>")]
    NoConfigPath,

    #[error("Editor command is empty")]
    EmptyCommand,

    #[error("Could not determine the user config directory")]
    NoConfigDir,

    #[error("Failed to launch editor '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Editor '{program}' exited with {status}")]
    ExitStatus { program: String, status: ExitStatus },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Persisted editor preference
///
/// A single line holding the editor command, stored at
/// `<config dir>/layercfg/editor` by default.
#[derive(Debug, Clone)]
pub struct EditorPreference {
    path: PathBuf,
}

impl EditorPreference {
    /// Preference file under the platform config dir (~/.config on Linux)
    pub fn user() -> Result<Self, EditorError> {
        let config_dir = dirs::config_dir().ok_or(EditorError::NoConfigDir)?;
        Ok(Self::at(config_dir.join("layercfg").join("editor")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored editor, if any
    pub fn load(&self) -> Result<Option<String>, EditorError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let editor = content.trim();
                Ok((!editor.is_empty()).then(|| editor.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, editor: &str) -> Result<(), EditorError> {
        let editor = editor.trim();
        if editor.is_empty() {
            return Err(EditorError::EmptyCommand);
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, format!("{}\n", editor))?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), EditorError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Pick the editor: explicit preference, then `$VISUAL`, then `$EDITOR`,
/// then `vi`
pub fn resolve_editor(preferred: Option<&str>) -> String {
    let from_env = |name: &str| std::env::var(name).ok();
    preferred
        .map(str::to_string)
        .into_iter()
        .chain(from_env("VISUAL"))
        .chain(from_env("EDITOR"))
        .map(|e| e.trim().to_string())
        .find(|e| !e.is_empty())
        .unwrap_or_else(|| DEFAULT_EDITOR.to_string())
}

/// Split `code --wait` into program and arguments
pub fn split_command(command: &str) -> Result<(String, Vec<String>), EditorError> {
    let mut parts = command.split_whitespace().map(str::to_string);
    let program = parts.next().ok_or(EditorError::EmptyCommand)?;
    Ok((program, parts.collect()))
}

/// Run `editor` on `file`, inheriting this process's stdio, and wait for it
pub fn launch(editor: &str, file: &Path) -> Result<(), EditorError> {
    let (program, args) = split_command(editor)?;

    let status = Command::new(&program)
        .args(&args)
        .arg(file)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|source| EditorError::Spawn {
            program: program.clone(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(EditorError::ExitStatus { program, status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_preference_round_trip() {
        let dir = tempdir().unwrap();
        let pref = EditorPreference::at(dir.path().join("nested").join("editor"));

        assert_eq!(pref.load().unwrap(), None);
        pref.save("  nano  ").unwrap();
        assert_eq!(pref.load().unwrap(), Some("nano".to_string()));

        pref.clear().unwrap();
        assert_eq!(pref.load().unwrap(), None);
        // Clearing twice is fine
        pref.clear().unwrap();
    }

    #[test]
    fn test_save_rejects_empty() {
        let dir = tempdir().unwrap();
        let pref = EditorPreference::at(dir.path().join("editor"));
        assert!(matches!(pref.save("   "), Err(EditorError::EmptyCommand)));
    }

    #[test]
    fn test_preferred_editor_wins() {
        assert_eq!(resolve_editor(Some("hx")), "hx");
    }

    #[test]
    fn test_blank_preference_ignored() {
        let editor = resolve_editor(Some("   "));
        assert!(!editor.trim().is_empty());
    }

    #[test]
    fn test_split_command() {
        let (program, args) = split_command("code --wait").unwrap();
        assert_eq!(program, "code");
        assert_eq!(args, vec!["--wait".to_string()]);

        assert!(matches!(split_command("  "), Err(EditorError::EmptyCommand)));
    }

    #[cfg(unix)]
    #[test]
    fn test_launch_reports_exit_status() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("config.json");
        fs::write(&file, "{}").unwrap();

        assert!(launch("true", &file).is_ok());
        assert!(matches!(
            launch("false", &file),
            Err(EditorError::ExitStatus { .. })
        ));
    }

    #[test]
    fn test_launch_missing_program() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("config.json");
        assert!(matches!(
            launch("layercfg-no-such-editor-xyz", &file),
            Err(EditorError::Spawn { .. })
        ));
    }
}
