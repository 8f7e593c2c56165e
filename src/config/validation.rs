use super::model::{
    Complexity, ContractConfig, EntityRelationship, RelationType, SubgraphConfig, TemplateConfig,
    SUPPORTED_CONFIG_VERSIONS,
};
use crate::error::{Result, WizardError};
use crate::network::validate_network;
use alloy_json_abi::Function;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, warn};

lazy_static! {
    static ref ADDRESS_PATTERN: Regex = Regex::new(r"^0x[a-fA-F0-9]{40}$").unwrap();
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Names that appear more than once, sorted and de-duplicated
fn duplicates<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    let dups: BTreeSet<&str> = values.into_iter().filter(|v| !seen.insert(*v)).collect();
    dups.into_iter().collect()
}

pub fn validate_address(address: &str, contract_name: &str) -> Result<()> {
    if ADDRESS_PATTERN.is_match(address) {
        return Ok(());
    }
    Err(WizardError::validation(format!(
        "Invalid address for contract '{}': '{}'. Address must be '0x' followed by 40 hexadecimal characters.",
        contract_name, address
    )))
}

/// Check a call handler signature of the form `name(type1,type2,...)`
pub fn validate_call_handler_signature(signature: &str, owner: &str) -> Result<()> {
    if is_blank(signature) {
        return Err(WizardError::validation(format!(
            "Empty call handler signature for contract '{}'",
            owner
        )));
    }

    if !signature.contains('(') || !signature.contains(')') {
        return Err(WizardError::validation(format!(
            "Invalid call handler signature for contract '{}': '{}'. Expected format: functionName(type1,type2,...)",
            owner, signature
        )));
    }

    if is_blank(signature.split('(').next().unwrap_or_default()) {
        return Err(WizardError::validation(format!(
            "Call handler signature missing function name for contract '{}': '{}'",
            owner, signature
        )));
    }

    Function::parse(signature.trim()).map_err(|e| {
        WizardError::validation(format!(
            "Invalid call handler signature for contract '{}': '{}' ({})",
            owner, signature, e
        ))
    })?;

    Ok(())
}

pub fn validate_contract(contract: &ContractConfig, complexity: Complexity) -> Result<()> {
    if is_blank(&contract.name) {
        return Err(WizardError::validation("Contract name cannot be empty"));
    }

    validate_address(&contract.address, &contract.name)?;

    if is_blank(&contract.abi_path) {
        return Err(WizardError::validation(format!(
            "ABI path cannot be empty for contract '{}'",
            contract.name
        )));
    }

    if complexity.has_handlers() {
        for signature in contract.call_handlers.iter().flatten() {
            validate_call_handler_signature(signature, &contract.name)?;
        }
    } else {
        if contract.call_handlers.as_ref().is_some_and(|h| !h.is_empty()) {
            warn!(
                "Contract '{}' has call_handlers but complexity is 'basic'. Call handlers will be ignored.",
                contract.name
            );
        }
        if contract.block_handler {
            warn!(
                "Contract '{}' has block_handler enabled but complexity is 'basic'. Block handler will be ignored.",
                contract.name
            );
        }
    }

    Ok(())
}

pub fn validate_template(template: &TemplateConfig, contract_names: &BTreeSet<&str>) -> Result<()> {
    if is_blank(&template.name) {
        return Err(WizardError::validation("Template name cannot be empty"));
    }

    if is_blank(&template.abi_path) {
        return Err(WizardError::validation(format!(
            "ABI path cannot be empty for template '{}'",
            template.name
        )));
    }

    if !contract_names.contains(template.source_contract.as_str()) {
        return Err(WizardError::validation(format!(
            "Template '{}' references unknown source_contract '{}'. Must be one of: {}",
            template.name,
            template.source_contract,
            contract_names.iter().copied().collect::<Vec<_>>().join(", ")
        )));
    }

    if is_blank(&template.source_event) {
        return Err(WizardError::validation(format!(
            "Source event cannot be empty for template '{}'",
            template.name
        )));
    }

    if template.event_handlers.is_empty() {
        return Err(WizardError::validation(format!(
            "Template '{}' must have at least one event handler",
            template.name
        )));
    }
    if template.event_handlers.iter().any(|h| is_blank(h)) {
        return Err(WizardError::validation(format!(
            "Empty event handler name in template '{}'",
            template.name
        )));
    }

    for signature in template.call_handlers.iter().flatten() {
        validate_call_handler_signature(signature, &format!("template:{}", template.name))?;
    }

    Ok(())
}

/// Relationships are not checked against real entity names; entities are
/// only known once ABIs are read at generation time.
pub fn validate_entity_relationship(relationship: &EntityRelationship) -> Result<()> {
    if is_blank(&relationship.from_entity) {
        return Err(WizardError::validation(
            "Entity relationship 'from_entity' cannot be empty",
        ));
    }
    if is_blank(&relationship.to_entity) {
        return Err(WizardError::validation(
            "Entity relationship 'to_entity' cannot be empty",
        ));
    }
    if is_blank(&relationship.field_name) {
        return Err(WizardError::validation(format!(
            "Entity relationship field_name cannot be empty (from '{}' to '{}')",
            relationship.from_entity, relationship.to_entity
        )));
    }
    if let RelationType::Unknown(other) = &relationship.relation_type {
        return Err(WizardError::validation(format!(
            "Invalid relation_type '{}' in relationship from '{}' to '{}'. Must be one of: {}",
            other,
            relationship.from_entity,
            relationship.to_entity,
            RelationType::VALID.join(", ")
        )));
    }
    Ok(())
}

/// Validate the whole config before generation
pub fn validate_config(config: &SubgraphConfig) -> Result<()> {
    debug!("Validating configuration: {}", config.name);

    if !SUPPORTED_CONFIG_VERSIONS.contains(&config.config_version) {
        return Err(WizardError::validation(format!(
            "Unsupported config_version: {}. Supported versions: {:?}",
            config.config_version, SUPPORTED_CONFIG_VERSIONS
        )));
    }

    if is_blank(&config.name) {
        return Err(WizardError::validation("Subgraph name cannot be empty"));
    }

    validate_network(&config.network)?;

    if config.output_dir.as_os_str().is_empty() {
        return Err(WizardError::validation("Output directory cannot be empty"));
    }

    if config.contracts.is_empty() {
        return Err(WizardError::validation(
            "At least one contract must be specified",
        ));
    }

    for contract in &config.contracts {
        validate_contract(contract, config.complexity)?;
    }

    let names = duplicates(config.contracts.iter().map(|c| c.name.as_str()));
    if !names.is_empty() {
        return Err(WizardError::validation(format!(
            "Duplicate contract names found: {}",
            names.join(", ")
        )));
    }

    let lowered: Vec<String> = config
        .contracts
        .iter()
        .map(|c| c.address.to_lowercase())
        .collect();
    let addresses = duplicates(lowered.iter().map(String::as_str));
    if !addresses.is_empty() {
        return Err(WizardError::validation(format!(
            "Duplicate contract addresses found: {}",
            addresses.join(", ")
        )));
    }

    if config.complexity.has_templates() {
        let contract_names: BTreeSet<&str> =
            config.contracts.iter().map(|c| c.name.as_str()).collect();
        for template in &config.templates {
            validate_template(template, &contract_names)?;
        }

        let template_names = duplicates(config.templates.iter().map(|t| t.name.as_str()));
        if !template_names.is_empty() {
            return Err(WizardError::validation(format!(
                "Duplicate template names found: {}",
                template_names.join(", ")
            )));
        }

        // Templates and contracts share mapping files and ABI lookups by name
        let clashing: Vec<&str> = config
            .templates
            .iter()
            .map(|t| t.name.as_str())
            .filter(|name| contract_names.contains(name))
            .collect();
        if !clashing.is_empty() {
            return Err(WizardError::validation(format!(
                "Duplicate data source names found: {} (template names must differ from contract names)",
                clashing.join(", ")
            )));
        }

        for relationship in &config.entity_relationships {
            validate_entity_relationship(relationship)?;
        }
    } else {
        if !config.templates.is_empty() {
            warn!(
                "Config has {} template(s) but complexity is '{}'. Templates will be ignored. Set complexity to 'advanced' to enable templates.",
                config.templates.len(),
                config.complexity
            );
        }
        if !config.entity_relationships.is_empty() {
            warn!(
                "Config has {} entity relationship(s) but complexity is '{}'. Relationships will be ignored. Set complexity to 'advanced' to enable entity relationships.",
                config.entity_relationships.len(),
                config.complexity
            );
        }
    }

    debug!("Configuration validation passed for: {}", config.name);
    Ok(())
}
