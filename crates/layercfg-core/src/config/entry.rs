//! Stored configuration values

/// JSON type a configuration value was decoded from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Number,
    Bool,
    Null,
    Object,
    Array,
}

impl ValueKind {
    /// Classify a raw JSON value by its first significant character
    pub(crate) fn of_raw(raw: &str) -> Self {
        match raw.trim_start().as_bytes().first() {
            Some(b'"') => ValueKind::String,
            Some(b'{') => ValueKind::Object,
            Some(b'[') => ValueKind::Array,
            Some(b't') | Some(b'f') => ValueKind::Bool,
            Some(b'n') => ValueKind::Null,
            _ => ValueKind::Number,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Bool => "bool",
            ValueKind::Null => "null",
            ValueKind::Object => "object",
            ValueKind::Array => "array",
        }
    }
}

/// How JSON values are turned into stored text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueMode {
    /// Decode strings properly, keep number/bool literals, capture nested
    /// values as raw JSON, skip `null`
    #[default]
    Typed,
    /// Take the raw JSON text and strip one leading and one trailing `"`
    Raw,
}

/// A key recorded in the config file
///
/// Presence in the store is what matters for resolution: an entry whose
/// value is `""` still wins over the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    value: String,
    kind: ValueKind,
}

impl ConfigEntry {
    pub fn new(value: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            value: value.into(),
            kind,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn into_value(self) -> String {
        self.value
    }
}
