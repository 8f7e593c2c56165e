use super::validation::validate_config;
use super::versions::VersionedConfig;
use crate::error::{Result, WizardError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const CONFIG_FILE_NAME: &str = "subgraph-config.json";
pub const SUPPORTED_CONFIG_VERSIONS: [u32; 3] = [1, 2, 3];

/// Feature tier of a generated subgraph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Complexity {
    #[default]
    Basic,
    Intermediate,
    Advanced,
}

impl Complexity {
    pub const ALL: [Complexity; 3] = [
        Complexity::Basic,
        Complexity::Intermediate,
        Complexity::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Basic => "basic",
            Complexity::Intermediate => "intermediate",
            Complexity::Advanced => "advanced",
        }
    }

    /// Lowest config file version able to describe this tier
    pub fn min_config_version(&self) -> u32 {
        match self {
            Complexity::Basic => 1,
            Complexity::Intermediate => 2,
            Complexity::Advanced => 3,
        }
    }

    /// Call and block handlers are recognized
    pub fn has_handlers(&self) -> bool {
        *self >= Complexity::Intermediate
    }

    /// Templates and entity relationships are recognized
    pub fn has_templates(&self) -> bool {
        *self == Complexity::Advanced
    }
}

impl FromStr for Complexity {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self> {
        Complexity::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                WizardError::validation(format!(
                    "Invalid complexity: '{}'. Must be one of: advanced, basic, intermediate",
                    s
                ))
            })
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How mapping handlers are generated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MappingsMode {
    /// Commented-out example code with TODO markers
    Stub,
    /// Working handlers that save one entity per event
    #[default]
    Auto,
}

impl MappingsMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingsMode::Stub => "stub",
            MappingsMode::Auto => "auto",
        }
    }
}

impl FromStr for MappingsMode {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "stub" => Ok(MappingsMode::Stub),
            "auto" => Ok(MappingsMode::Auto),
            other => Err(WizardError::validation(format!(
                "Invalid mappings_mode: '{}'. Must be one of: auto, stub",
                other
            ))),
        }
    }
}

impl fmt::Display for MappingsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cardinality of an entity relationship. Unrecognized strings are kept so
/// they survive a load/save cycle and can be reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationType {
    OneToOne,
    OneToMany,
    ManyToMany,
    Unknown(String),
}

impl RelationType {
    pub const VALID: [&'static str; 3] = ["many_to_many", "one_to_many", "one_to_one"];

    pub fn as_str(&self) -> &str {
        match self {
            RelationType::OneToOne => "one_to_one",
            RelationType::OneToMany => "one_to_many",
            RelationType::ManyToMany => "many_to_many",
            RelationType::Unknown(other) => other,
        }
    }
}

impl From<String> for RelationType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "one_to_one" => RelationType::OneToOne,
            "one_to_many" => RelationType::OneToMany,
            "many_to_many" => RelationType::ManyToMany,
            _ => RelationType::Unknown(value),
        }
    }
}

impl From<&str> for RelationType {
    fn from(value: &str) -> Self {
        RelationType::from(value.to_string())
    }
}

impl From<RelationType> for String {
    fn from(value: RelationType) -> Self {
        value.as_str().to_string()
    }
}

fn default_true() -> bool {
    true
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A contract deployed at a fixed address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    pub name: String,
    pub address: String,
    pub start_block: u64,
    /// File name of the ABI inside the project's `abis/` directory
    pub abi_path: String,
    #[serde(default = "default_true")]
    pub index_events: bool,
    /// Function signatures such as `transfer(address,uint256)`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_handlers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub block_handler: bool,
}

impl ContractConfig {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        start_block: u64,
        abi_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            start_block,
            abi_path: abi_path.into(),
            index_events: true,
            call_handlers: None,
            block_handler: false,
        }
    }

    pub fn with_call_handlers<S: Into<String>>(mut self, signatures: Vec<S>) -> Self {
        self.call_handlers = Some(signatures.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_block_handler(mut self, enabled: bool) -> Self {
        self.block_handler = enabled;
        self
    }

    pub(crate) fn uses_handlers(&self) -> bool {
        self.call_handlers.as_ref().is_some_and(|h| !h.is_empty()) || self.block_handler
    }
}

/// A dynamically created data source, instantiated by `source_contract`
/// whenever it emits `source_event`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateConfig {
    pub name: String,
    pub abi_path: String,
    #[serde(default)]
    pub event_handlers: Vec<String>,
    pub source_contract: String,
    pub source_event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_handlers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub block_handler: bool,
}

impl TemplateConfig {
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        abi_path: impl Into<String>,
        source_contract: impl Into<String>,
        source_event: impl Into<String>,
        event_handlers: Vec<S>,
    ) -> Self {
        Self {
            name: name.into(),
            abi_path: abi_path.into(),
            event_handlers: event_handlers.into_iter().map(Into::into).collect(),
            source_contract: source_contract.into(),
            source_event: source_event.into(),
            call_handlers: None,
            block_handler: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRelationship {
    pub from_entity: String,
    pub to_entity: String,
    pub relation_type: RelationType,
    pub field_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_from: Option<String>,
}

impl EntityRelationship {
    pub fn new(
        from_entity: impl Into<String>,
        to_entity: impl Into<String>,
        relation_type: impl Into<RelationType>,
        field_name: impl Into<String>,
    ) -> Self {
        Self {
            from_entity: from_entity.into(),
            to_entity: to_entity.into(),
            relation_type: relation_type.into(),
            field_name: field_name.into(),
            derived_from: None,
        }
    }

    pub fn derived_from(mut self, field: impl Into<String>) -> Self {
        self.derived_from = Some(field.into());
        self
    }
}

/// Everything needed to generate one subgraph project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubgraphConfig {
    pub name: String,
    pub network: String,
    pub output_dir: PathBuf,
    pub mappings_mode: MappingsMode,
    pub config_version: u32,
    pub complexity: Complexity,
    pub contracts: Vec<ContractConfig>,
    pub templates: Vec<TemplateConfig>,
    pub entity_relationships: Vec<EntityRelationship>,
}

impl SubgraphConfig {
    pub fn builder() -> SubgraphConfigBuilder {
        SubgraphConfigBuilder::default()
    }

    /// Version written to disk: high enough for the tier and for every
    /// populated field, never lower than the stored version
    pub fn effective_version(&self) -> u32 {
        let fields_version = if !self.templates.is_empty() || !self.entity_relationships.is_empty()
        {
            3
        } else if self.contracts.iter().any(ContractConfig::uses_handlers) {
            2
        } else {
            1
        };

        self.config_version
            .max(self.complexity.min_config_version())
            .max(fields_version)
    }

    /// Templates that apply to this config's tier
    pub fn active_templates(&self) -> &[TemplateConfig] {
        if self.complexity.has_templates() {
            &self.templates
        } else {
            &[]
        }
    }

    pub fn active_relationships(&self) -> &[EntityRelationship] {
        if self.complexity.has_templates() {
            &self.entity_relationships
        } else {
            &[]
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        VersionedConfig::from_config(self).to_value()
    }

    pub fn from_value(value: Value) -> Result<Self> {
        VersionedConfig::from_value(value)?.upgrade()
    }
}

/// Builder for SubgraphConfig
#[derive(Default)]
pub struct SubgraphConfigBuilder {
    name: Option<String>,
    network: Option<String>,
    output_dir: Option<PathBuf>,
    mappings_mode: Option<MappingsMode>,
    config_version: Option<u32>,
    complexity: Complexity,
    contracts: Vec<ContractConfig>,
    templates: Vec<TemplateConfig>,
    entity_relationships: Vec<EntityRelationship>,
}

impl SubgraphConfigBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn mappings_mode(mut self, mode: MappingsMode) -> Self {
        self.mappings_mode = Some(mode);
        self
    }

    pub fn config_version(mut self, version: u32) -> Self {
        self.config_version = Some(version);
        self
    }

    pub fn complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn add_contract(mut self, contract: ContractConfig) -> Self {
        self.contracts.push(contract);
        self
    }

    pub fn add_template(mut self, template: TemplateConfig) -> Self {
        self.templates.push(template);
        self
    }

    pub fn add_relationship(mut self, relationship: EntityRelationship) -> Self {
        self.entity_relationships.push(relationship);
        self
    }

    /// Assemble and validate the config. Without an explicit version the
    /// tier's minimum version is used.
    pub fn build(self) -> Result<SubgraphConfig> {
        let required = |field: &str| WizardError::validation(format!("{} is required", field));

        let config_version = self
            .config_version
            .unwrap_or_else(|| self.complexity.min_config_version());

        let mut config = SubgraphConfig {
            name: self.name.ok_or_else(|| required("Name"))?,
            network: self.network.ok_or_else(|| required("Network"))?,
            output_dir: self.output_dir.ok_or_else(|| required("Output directory"))?,
            mappings_mode: self.mappings_mode.ok_or_else(|| required("Mappings mode"))?,
            config_version,
            complexity: self.complexity,
            contracts: self.contracts,
            templates: self.templates,
            entity_relationships: self.entity_relationships,
        };

        validate_config(&config)?;
        config.config_version = config.effective_version();
        Ok(config)
    }
}
