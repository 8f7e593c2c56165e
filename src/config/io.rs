use super::model::SubgraphConfig;
use crate::error::{Result, WizardError};
use crate::fs_utils::safe_write;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

const REQUIRED_FIELDS: [&str; 4] = ["name", "network", "output_dir", "mappings_mode"];
const REQUIRED_CONTRACT_FIELDS: [&str; 4] = ["name", "address", "start_block", "abi_path"];

/// Load a [`SubgraphConfig`] from a `subgraph-config.json` file. Every
/// failure is reported as a validation error.
pub fn load_config(path: &Path) -> Result<SubgraphConfig> {
    if !path.exists() {
        return Err(WizardError::validation(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(WizardError::validation(format!(
            "Configuration path is not a file: {}",
            path.display()
        )));
    }

    let content = fs::read_to_string(path).map_err(|e| {
        WizardError::validation(format!("Could not read configuration file: {}", e))
    })?;
    let data: Value = serde_json::from_str(&content).map_err(|e| {
        WizardError::validation(format!("Invalid JSON in configuration file: {}", e))
    })?;

    check_required_fields(&data)?;

    let config = SubgraphConfig::from_value(data)?;
    debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

fn check_required_fields(data: &Value) -> Result<()> {
    let object = data.as_object().ok_or_else(|| {
        WizardError::validation("Configuration file must contain a JSON object")
    })?;

    let missing: Vec<&str> = REQUIRED_FIELDS
        .into_iter()
        .filter(|field| !object.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(WizardError::validation(format!(
            "Configuration file is missing required fields: {}",
            missing.join(", ")
        )));
    }

    let contracts = match object.get("contracts") {
        None => return Ok(()),
        Some(Value::Array(contracts)) => contracts,
        Some(_) => return Err(WizardError::validation("'contracts' field must be a list")),
    };

    for (idx, contract) in contracts.iter().enumerate() {
        let missing: Vec<&str> = REQUIRED_CONTRACT_FIELDS
            .into_iter()
            .filter(|field| contract.get(*field).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(WizardError::validation(format!(
                "Contract at index {} is missing required fields: {}",
                idx,
                missing.join(", ")
            )));
        }
    }

    Ok(())
}

/// Write the config as pretty JSON, creating parent directories
pub fn save_config(config: &SubgraphConfig, path: &Path) -> Result<()> {
    let mut content = serde_json::to_string_pretty(&config.to_value()?)?;
    content.push('\n');
    safe_write(path, &content).map_err(|e| {
        WizardError::validation(format!("Could not write configuration file: {}", e))
    })?;
    debug!("Saved configuration to {}", path.display());
    Ok(())
}
