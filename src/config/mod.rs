mod io;
mod model;
mod validation;
pub mod versions;

pub use io::{load_config, save_config};
pub use model::{
    Complexity, ContractConfig, EntityRelationship, MappingsMode, RelationType, SubgraphConfig,
    SubgraphConfigBuilder, TemplateConfig, CONFIG_FILE_NAME, SUPPORTED_CONFIG_VERSIONS,
};
pub use validation::{
    validate_address, validate_call_handler_signature, validate_config, validate_contract,
    validate_entity_relationship, validate_template,
};
pub use versions::VersionedConfig;
