use crate::abi::AbiMap;
use crate::config::{MappingsMode, SubgraphConfig};
use crate::error::Result;
use crate::templating::{TemplateRenderer, README_TEMPLATE};
use serde::Serialize;
use tracing::info;

#[derive(Serialize)]
struct ContractRow<'a> {
    name: &'a str,
    address: &'a str,
    start_block: u64,
    abi_path: &'a str,
    /// Event names from the ABI, empty when the ABI is missing
    events: String,
}

#[derive(Serialize)]
struct TemplateRow<'a> {
    name: &'a str,
    source_contract: &'a str,
    source_event: &'a str,
    abi_path: &'a str,
}

#[derive(Serialize)]
struct ReadmeContext<'a> {
    name: &'a str,
    network: &'a str,
    complexity: &'a str,
    mappings_mode: &'a str,
    contracts: Vec<ContractRow<'a>>,
    templates: Vec<TemplateRow<'a>>,
    stub: bool,
}

pub fn render_readme(config: &SubgraphConfig, abis: &AbiMap, renderer: &TemplateRenderer) -> Result<String> {
    info!("Rendering README for: {}", config.name);

    let contracts = config
        .contracts
        .iter()
        .map(|contract| ContractRow {
            name: &contract.name,
            address: &contract.address,
            start_block: contract.start_block,
            abi_path: &contract.abi_path,
            events: abis
                .get(&contract.name)
                .map(|abi| {
                    abi.events()
                        .iter()
                        .map(|e| e.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default(),
        })
        .collect();

    let templates = config
        .active_templates()
        .iter()
        .map(|t| TemplateRow {
            name: &t.name,
            source_contract: &t.source_contract,
            source_event: &t.source_event,
            abi_path: &t.abi_path,
        })
        .collect();

    renderer.render(
        README_TEMPLATE,
        &ReadmeContext {
            name: &config.name,
            network: &config.network,
            complexity: config.complexity.as_str(),
            mappings_mode: config.mappings_mode.as_str(),
            contracts,
            templates,
            stub: config.mappings_mode == MappingsMode::Stub,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::parse_abi;
    use crate::config::Complexity;
    use crate::test_utils::{create_test_config, ERC20_ABI};

    #[test]
    fn test_readme_lists_contracts_and_events() {
        let config = create_test_config(Complexity::Basic, MappingsMode::Auto);
        let contract = &config.contracts[0];
        let mut abis = AbiMap::new();
        abis.insert(contract.name.clone(), parse_abi(ERC20_ABI).unwrap());

        let readme = render_readme(&config, &abis, &TemplateRenderer::new().unwrap()).unwrap();
        assert!(readme.starts_with(&format!("# {}\n", config.name)));
        assert!(readme.contains("- **Network:** ethereum"));
        assert!(readme.contains("- **Complexity:** basic"));
        assert!(readme.contains(&format!("`{}`", contract.address)));
        assert!(readme.contains("| Transfer, Approval |"));
        assert!(readme.contains("npm run codegen"));
        assert!(!readme.contains("## Templates"));
        assert!(!readme.contains("are stubs"));
    }

    #[test]
    fn test_readme_stub_and_missing_abi() {
        let config = create_test_config(Complexity::Intermediate, MappingsMode::Stub);

        let readme = render_readme(&config, &AbiMap::new(), &TemplateRenderer::new().unwrap()).unwrap();
        assert!(readme.contains("none (placeholder handler)"));
        assert!(readme.contains("- **Mappings mode:** stub"));
        assert!(readme.contains("are stubs"));
    }
}
