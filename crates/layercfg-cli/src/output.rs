//! Rendering of loaded and resolved values.
//!
//! Everything here returns a `String`; callers decide where it goes. Values
//! are printed as stored, secrets included.

use anyhow::Result;
use layercfg_core::{ConfigStore, ResolvedValue};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::args::OutputFormat;

/// Render every file-layer entry of `store`
pub fn render_entries(store: &ConfigStore, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(store
            .entries()
            .map(|(key, entry)| format!("{} = {}\n", key, entry.value()))
            .collect()),
        OutputFormat::Json => {
            let map: Map<String, Value> = store
                .entries()
                .map(|(key, entry)| (key.to_string(), Value::String(entry.value().to_string())))
                .collect();
            Ok(format!("{}\n", serde_json::to_string_pretty(&map)?))
        }
    }
}

#[derive(Serialize)]
struct SourcedValue<'a> {
    value: &'a str,
    source: String,
}

/// Render the result of `get`, in the order the keys were requested
pub fn render_resolved(
    resolved: &[(String, ResolvedValue)],
    format: OutputFormat,
    show_source: bool,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(resolved
            .iter()
            .map(|(key, r)| {
                if show_source {
                    format!("{} = {} ({})\n", key, r.value, r.source)
                } else {
                    format!("{}\n", r.value)
                }
            })
            .collect()),
        OutputFormat::Json => {
            let mut map = Map::new();
            for (key, r) in resolved {
                let value = if show_source {
                    serde_json::to_value(SourcedValue {
                        value: &r.value,
                        source: r.source.to_string(),
                    })?
                } else {
                    Value::String(r.value.clone())
                };
                map.insert(key.clone(), value);
            }
            Ok(format!("{}\n", serde_json::to_string_pretty(&map)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layercfg_core::{MemorySecretStore, NoOpLogger, ValueSource};
    use std::sync::Arc;

    fn store() -> ConfigStore {
        ConfigStore::builder()
            .document(r#"{"b": "two", "a": 1, "empty": ""}"#)
            .environment(Arc::new(MemorySecretStore::new()))
            .logger(Arc::new(NoOpLogger::new()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_render_entries_text() {
        let out = render_entries(&store(), OutputFormat::Text).unwrap();
        assert_eq!(out, "a = 1\nb = two\nempty = \n");
    }

    #[test]
    fn test_render_entries_json() {
        let out = render_entries(&store(), OutputFormat::Json).unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["a"], "1");
        assert_eq!(parsed["empty"], "");
    }

    #[test]
    fn test_render_resolved() {
        let resolved = vec![
            (
                "HOST".to_string(),
                ResolvedValue {
                    value: "db.local".to_string(),
                    source: ValueSource::File,
                },
            ),
            (
                "TOKEN".to_string(),
                ResolvedValue {
                    value: "abc".to_string(),
                    source: ValueSource::Environment,
                },
            ),
        ];

        let plain = render_resolved(&resolved, OutputFormat::Text, false).unwrap();
        assert_eq!(plain, "db.local\nabc\n");

        let sourced = render_resolved(&resolved, OutputFormat::Text, true).unwrap();
        assert_eq!(sourced, "HOST = db.local (file)\nTOKEN = abc (env)\n");

        let json = render_resolved(&resolved, OutputFormat::Json, true).unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["TOKEN"]["source"], "env");
        assert_eq!(parsed["HOST"]["value"], "db.local");
    }
}
