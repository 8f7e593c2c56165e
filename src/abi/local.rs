use super::{parse_abi, Abi};
use crate::error::{Result, WizardError};
use crate::fs_utils::safe_write;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Load an ABI from a JSON file on disk
pub fn load_abi_from_file(path: &Path) -> Result<Abi> {
    if !path.exists() {
        return Err(WizardError::abi_fetch(format!(
            "ABI file not found: {}",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(WizardError::abi_fetch(format!(
            "Path is not a file: {}",
            path.display()
        )));
    }

    info!("Loading ABI from file: {}", path.display());
    let content = fs::read_to_string(path)
        .map_err(|e| WizardError::abi_fetch(format!("Failed to read ABI file: {}", e)))?;

    if content.trim().is_empty() {
        return Err(WizardError::validation(format!(
            "ABI file is empty: {}",
            path.display()
        )));
    }

    let abi = parse_abi(&content).map_err(|e| {
        WizardError::validation(format!("Invalid ABI in {}: {}", path.display(), e))
    })?;
    debug!(
        "Loaded ABI with {} entries from {}",
        abi.len(),
        path.display()
    );
    Ok(abi)
}

/// Load an ABI from text pasted by the user
pub fn load_abi_from_paste(text: &str) -> Result<Abi> {
    let text = text.trim();
    if text.is_empty() {
        return Err(WizardError::validation("No ABI content provided"));
    }

    let abi = parse_abi(text)?;
    debug!("Parsed pasted ABI with {} entries", abi.len());
    Ok(abi)
}

pub fn write_abi_to_file(abi: &Abi, path: &Path) -> Result<()> {
    safe_write(path, &abi.to_json_pretty()?)?;
    debug!("Wrote ABI with {} entries to {}", abi.len(), path.display());
    Ok(())
}
