//! On-disk config formats. Each `config_version` has its own shape; older
//! shapes are upgraded step by step into the in-memory [`SubgraphConfig`].

use super::model::{
    Complexity, ContractConfig, EntityRelationship, MappingsMode, SubgraphConfig,
    TemplateConfig, SUPPORTED_CONFIG_VERSIONS,
};
use crate::error::{Result, WizardError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

fn default_true() -> bool {
    true
}

fn default_complexity() -> String {
    Complexity::Basic.as_str().to_string()
}

/// Top-level fields shared by every version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigHeader {
    pub name: String,
    pub network: String,
    pub output_dir: String,
    pub mappings_mode: String,
    #[serde(default = "default_complexity")]
    pub complexity: String,
}

/// Version 1 contract: events only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractV1 {
    pub name: String,
    pub address: String,
    pub start_block: i64,
    pub abi_path: String,
    #[serde(default = "default_true")]
    pub index_events: bool,
}

/// Version 2 contract: adds call and block handlers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractV2 {
    #[serde(flatten)]
    pub base: ContractV1,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_handlers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub block_handler: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigV1 {
    #[serde(flatten)]
    pub header: ConfigHeader,
    #[serde(default)]
    pub contracts: Vec<ContractV1>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigV2 {
    #[serde(flatten)]
    pub header: ConfigHeader,
    #[serde(default)]
    pub contracts: Vec<ContractV2>,
}

/// Version 3: adds templates and entity relationships
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigV3 {
    #[serde(flatten)]
    pub header: ConfigHeader,
    #[serde(default)]
    pub contracts: Vec<ContractV2>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<TemplateConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entity_relationships: Vec<EntityRelationship>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VersionedConfig {
    V1(ConfigV1),
    V2(ConfigV2),
    V3(ConfigV3),
}

impl ConfigV1 {
    pub fn upgrade(self) -> ConfigV2 {
        ConfigV2 {
            header: self.header,
            contracts: self
                .contracts
                .into_iter()
                .map(|base| ContractV2 {
                    base,
                    call_handlers: None,
                    block_handler: false,
                })
                .collect(),
        }
    }
}

impl ConfigV2 {
    pub fn upgrade(self) -> ConfigV3 {
        ConfigV3 {
            header: self.header,
            contracts: self.contracts,
            templates: Vec::new(),
            entity_relationships: Vec::new(),
        }
    }
}

impl VersionedConfig {
    pub fn version(&self) -> u32 {
        match self {
            VersionedConfig::V1(_) => 1,
            VersionedConfig::V2(_) => 2,
            VersionedConfig::V3(_) => 3,
        }
    }

    /// Read a config object. The shape is chosen from `config_version`
    /// (default 1), raised to the minimum version of the declared tier.
    pub fn from_value(value: Value) -> Result<Self> {
        let stored = match value.get("config_version") {
            None | Some(Value::Null) => 1,
            Some(v) => v
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| {
                    WizardError::validation(format!("Invalid config_version: {}", v))
                })?,
        };
        check_version(stored)?;

        let complexity: Complexity = value
            .get("complexity")
            .and_then(Value::as_str)
            .unwrap_or(Complexity::Basic.as_str())
            .parse()?;

        let invalid = |e: serde_json::Error| {
            WizardError::validation(format!("Invalid configuration: {}", e))
        };

        Ok(match stored.max(complexity.min_config_version()) {
            1 => VersionedConfig::V1(serde_json::from_value(value).map_err(invalid)?),
            2 => VersionedConfig::V2(serde_json::from_value(value).map_err(invalid)?),
            _ => VersionedConfig::V3(serde_json::from_value(value).map_err(invalid)?),
        })
    }

    /// Pick the smallest shape that holds everything in `config`
    pub fn from_config(config: &SubgraphConfig) -> Self {
        let header = ConfigHeader {
            name: config.name.clone(),
            network: config.network.clone(),
            output_dir: config.output_dir.to_string_lossy().into_owned(),
            mappings_mode: config.mappings_mode.as_str().to_string(),
            complexity: config.complexity.as_str().to_string(),
        };
        let contracts: Vec<ContractV2> = config.contracts.iter().map(contract_to_v2).collect();

        match config.effective_version() {
            1 => VersionedConfig::V1(ConfigV1 {
                header,
                contracts: contracts.into_iter().map(|c| c.base).collect(),
            }),
            2 => VersionedConfig::V2(ConfigV2 { header, contracts }),
            _ => VersionedConfig::V3(ConfigV3 {
                header,
                contracts,
                templates: config.templates.clone(),
                entity_relationships: config.entity_relationships.clone(),
            }),
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        let mut value = match self {
            VersionedConfig::V1(c) => serde_json::to_value(c)?,
            VersionedConfig::V2(c) => serde_json::to_value(c)?,
            VersionedConfig::V3(c) => serde_json::to_value(c)?,
        };
        if let Value::Object(map) = &mut value {
            map.insert("config_version".to_string(), Value::from(self.version()));
        }
        Ok(value)
    }

    /// Lift any version to the in-memory config
    pub fn upgrade(self) -> Result<SubgraphConfig> {
        let version = self.version();
        let latest = match self {
            VersionedConfig::V1(c) => c.upgrade().upgrade(),
            VersionedConfig::V2(c) => c.upgrade(),
            VersionedConfig::V3(c) => c,
        };

        let contracts = latest
            .contracts
            .into_iter()
            .map(contract_from_v2)
            .collect::<Result<Vec<_>>>()?;

        Ok(SubgraphConfig {
            name: latest.header.name,
            network: latest.header.network,
            output_dir: PathBuf::from(latest.header.output_dir),
            mappings_mode: latest.header.mappings_mode.parse::<MappingsMode>()?,
            config_version: version,
            complexity: latest.header.complexity.parse()?,
            contracts,
            templates: latest.templates,
            entity_relationships: latest.entity_relationships,
        })
    }
}

fn check_version(version: u32) -> Result<()> {
    if SUPPORTED_CONFIG_VERSIONS.contains(&version) {
        Ok(())
    } else {
        Err(WizardError::validation(format!(
            "Unsupported config_version: {}. Supported versions: {:?}",
            version, SUPPORTED_CONFIG_VERSIONS
        )))
    }
}

fn contract_to_v2(contract: &ContractConfig) -> ContractV2 {
    ContractV2 {
        base: ContractV1 {
            name: contract.name.clone(),
            address: contract.address.clone(),
            start_block: i64::try_from(contract.start_block).unwrap_or(i64::MAX),
            abi_path: contract.abi_path.clone(),
            index_events: contract.index_events,
        },
        call_handlers: contract.call_handlers.clone(),
        block_handler: contract.block_handler,
    }
}

fn contract_from_v2(contract: ContractV2) -> Result<ContractConfig> {
    let ContractV2 {
        base,
        call_handlers,
        block_handler,
    } = contract;

    let start_block = u64::try_from(base.start_block).map_err(|_| {
        WizardError::validation(format!(
            "Invalid start_block for contract '{}': {}. Start block must be a non-negative integer.",
            base.name, base.start_block
        ))
    })?;

    Ok(ContractConfig {
        name: base.name,
        address: base.address,
        start_block,
        abi_path: base.abi_path,
        index_events: base.index_events,
        call_handlers,
        block_handler,
    })
}
