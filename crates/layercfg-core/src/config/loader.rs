//! JSON config file loading
//!
//! The file must hold a single flat JSON object. Nested objects and arrays
//! are not flattened: they are stored as their raw JSON text.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde_json::value::RawValue;

use super::entry::{ConfigEntry, ValueKind, ValueMode};
use super::error::LoadError;

/// Read and parse the config file at `path`
pub fn load_file(path: &Path, mode: ValueMode) -> Result<BTreeMap<String, ConfigEntry>, LoadError> {
    let mut file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    parse_document(&content, mode).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a JSON object into config entries
///
/// Duplicate keys keep the last value.
pub fn parse_document(
    text: &str,
    mode: ValueMode,
) -> Result<BTreeMap<String, ConfigEntry>, serde_json::Error> {
    let raw: BTreeMap<String, Box<RawValue>> = serde_json::from_str(text)?;

    let mut entries = BTreeMap::new();
    for (key, value) in raw {
        if let Some(entry) = normalize(value.get(), mode)? {
            entries.insert(key, entry);
        }
    }
    Ok(entries)
}

/// Turn one raw JSON value into a stored entry
///
/// Returns `None` for `null` in typed mode so the key falls through to the
/// environment and the secret backend.
fn normalize(raw: &str, mode: ValueMode) -> Result<Option<ConfigEntry>, serde_json::Error> {
    let raw = raw.trim();
    let kind = ValueKind::of_raw(raw);

    let entry = match mode {
        ValueMode::Raw => ConfigEntry::new(strip_quotes(raw), kind),
        ValueMode::Typed => match kind {
            ValueKind::Null => return Ok(None),
            ValueKind::String => ConfigEntry::new(serde_json::from_str::<String>(raw)?, kind),
            ValueKind::Number | ValueKind::Bool | ValueKind::Object | ValueKind::Array => {
                ConfigEntry::new(raw, kind)
            }
        },
    };
    Ok(Some(entry))
}

/// Strip at most one leading and one trailing double quote
///
/// This is not JSON unescaping: `"a\"b"` becomes `a\"b`.
pub fn strip_quotes(raw: &str) -> &str {
    let raw = raw.strip_prefix('"').unwrap_or(raw);
    raw.strip_suffix('"').unwrap_or(raw)
}
