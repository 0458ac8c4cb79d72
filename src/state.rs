use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Key marking the original, unformatted message template in structured
/// state. Never written to the store.
pub const ORIGINAL_FORMAT_KEY: &str = "{OriginalFormat}";

/// State attached to a log call.
#[derive(Debug, Clone, PartialEq)]
pub enum LogState {
    /// Ordered key/value pairs, as produced by message templates.
    Pairs(Vec<(String, Value)>),
    /// Any other state, kept as its textual rendering.
    Text(String),
}

impl LogState {
    /// Build pair-shaped state from anything yielding `(key, value)`.
    pub fn pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        LogState::Pairs(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Capture a non key/value state through its `Display` rendering.
    pub fn display(value: &impl fmt::Display) -> Self {
        LogState::Text(value.to_string())
    }
}

impl From<&str> for LogState {
    fn from(value: &str) -> Self {
        LogState::Text(value.to_string())
    }
}

impl From<String> for LogState {
    fn from(value: String) -> Self {
        LogState::Text(value)
    }
}

impl<K: Into<String>> From<Vec<(K, Value)>> for LogState {
    fn from(pairs: Vec<(K, Value)>) -> Self {
        LogState::pairs(pairs)
    }
}

impl fmt::Display for LogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogState::Text(text) => f.write_str(text),
            LogState::Pairs(pairs) => {
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match value {
                        Value::String(s) => write!(f, "{}={}", key, s)?,
                        other => write!(f, "{}={}", key, other)?,
                    }
                }
                Ok(())
            }
        }
    }
}

/// State as it appears in the `state` field of a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CapturedState {
    Map(Map<String, Value>),
    Text(String),
}

/// Normalize caller state for the wire.
///
/// Pairs become a map without [`ORIGINAL_FORMAT_KEY`]. A key given more
/// than once keeps its first position and its last value.
pub fn capture_state(state: Option<&LogState>) -> Option<CapturedState> {
    match state? {
        LogState::Pairs(pairs) => {
            let map = pairs
                .iter()
                .filter(|(key, _)| key != ORIGINAL_FORMAT_KEY)
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect::<Map<String, Value>>();
            Some(CapturedState::Map(map))
        }
        LogState::Text(text) => Some(CapturedState::Text(text.clone())),
    }
}
