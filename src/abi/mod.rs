mod event;
pub mod explorer;
mod local;
pub mod naming;

pub use event::{build_event_signature, extract_events, Event};
pub use explorer::ExplorerClient;
pub use local::{load_abi_from_file, load_abi_from_paste, write_abi_to_file};
pub use naming::{get_entity_field_name, get_entity_name, get_handler_name, to_camel_case};

use crate::error::{Result, WizardError};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

/// ABIs keyed by contract or template name
pub type AbiMap = HashMap<String, Abi>;

/// One input of an ABI event entry, as found in the JSON
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawParam {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub ty: String,
    #[serde(default)]
    pub indexed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub inputs: Vec<RawParam>,
}

/// A single ABI entry. Only events are modelled; functions, constructors,
/// errors and the rest keep just their `type` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiEntry {
    Event(RawEvent),
    Other(String),
}

impl AbiEntry {
    fn from_value(value: &Value) -> Self {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if kind != "event" {
            return AbiEntry::Other(kind);
        }

        match RawEvent::deserialize(value) {
            Ok(event) => AbiEntry::Event(event),
            Err(e) => {
                warn!("Skipping malformed event entry in ABI: {}", e);
                AbiEntry::Other(kind)
            }
        }
    }
}

/// A validated contract ABI. The raw JSON is kept so the ABI can be written
/// back out unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Abi {
    raw: Vec<Value>,
    entries: Vec<AbiEntry>,
}

impl Abi {
    pub fn from_value(value: Value) -> Result<Self> {
        let raw = match value {
            Value::Array(items) => items,
            other => {
                return Err(WizardError::validation(format!(
                    "ABI must be a JSON array, got {}",
                    json_kind(&other)
                )))
            }
        };
        validate_abi(&raw)?;

        let entries = raw.iter().map(AbiEntry::from_value).collect();
        Ok(Self { raw, entries })
    }

    pub fn entries(&self) -> &[AbiEntry] {
        &self.entries
    }

    pub fn raw(&self) -> &[Value] {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn events(&self) -> Vec<Event> {
        extract_events(&self.entries)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.raw)?)
    }
}

/// Parse ABI JSON text into a validated [`Abi`]
pub fn parse_abi(text: &str) -> Result<Abi> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| WizardError::validation(format!("Invalid ABI JSON: {}", e)))?;
    Abi::from_value(value)
}

/// Check the ABI shape: a non-empty list of objects that each carry `type`
pub fn validate_abi(entries: &[Value]) -> Result<()> {
    if entries.is_empty() {
        return Err(WizardError::validation("ABI cannot be empty"));
    }

    for (idx, entry) in entries.iter().enumerate() {
        let obj = entry.as_object().ok_or_else(|| {
            WizardError::validation(format!("ABI entry {} must be an object", idx))
        })?;
        if !obj.contains_key("type") {
            return Err(WizardError::validation(format!(
                "ABI entry {} missing 'type' field",
                idx
            )));
        }
    }

    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
