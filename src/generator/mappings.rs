use super::sources::{address_param, BlockHandler, CallHandler, SourcePlan};
use crate::abi::{get_entity_field_name, get_entity_name, get_handler_name, Abi, AbiMap, Event};
use crate::config::{Complexity, ContractConfig, MappingsMode, SubgraphConfig, TemplateConfig};
use crate::error::Result;
use crate::templating::{
    TemplateRenderer, MAPPING_AUTO_TEMPLATE, MAPPING_HEADER_TEMPLATE, MAPPING_STUB_TEMPLATE,
};
use serde::Serialize;
use tracing::{info, warn};

const GRAPH_TS: &str = "@graphprotocol/graph-ts";
const GENERATED_SCHEMA: &str = "../../generated/schema";
const GENERATED_TEMPLATES: &str = "../../generated/templates";

#[derive(Debug, Serialize)]
struct Import {
    /// Comma separated import list
    names: String,
    from: String,
}

#[derive(Serialize)]
struct HeaderContext<'a> {
    contract_name: &'a str,
    network: &'a str,
    imports: Vec<Import>,
}

#[derive(Debug, Serialize)]
struct ParamAssignment {
    entity_field: String,
    event_param: String,
}

#[derive(Debug, Serialize)]
struct TemplateCreation {
    template_name: String,
    address_param: Option<String>,
    event_name: String,
}

#[derive(Debug, Serialize)]
struct EventHandlerContext {
    name: String,
    event_name: String,
    event_type: String,
    entity_name: String,
    params: Vec<ParamAssignment>,
    template_creations: Vec<TemplateCreation>,
}

impl EventHandlerContext {
    fn new(event: &Event, template_creations: Vec<TemplateCreation>) -> Self {
        Self {
            name: get_handler_name(&event.name),
            event_name: event.name.clone(),
            event_type: event_type_alias(&event.name),
            entity_name: get_entity_name(&event.name),
            params: event
                .params
                .iter()
                .map(|p| ParamAssignment {
                    entity_field: get_entity_field_name(&p.name),
                    event_param: p.name.clone(),
                })
                .collect(),
            template_creations,
        }
    }
}

#[derive(Serialize)]
struct MappingContext {
    header: String,
    handlers: Vec<EventHandlerContext>,
    call_handlers: Vec<CallHandler>,
    block_handler: Option<BlockHandler>,
}

fn event_type_alias(event_name: &str) -> String {
    format!("{}Event", event_name)
}

/// Renders one mapping file per data source, in auto or stub mode
pub struct MappingGenerator<'a> {
    network: &'a str,
    mode: MappingsMode,
    renderer: &'a TemplateRenderer,
}

impl<'a> MappingGenerator<'a> {
    pub fn new(network: &'a str, mode: MappingsMode, renderer: &'a TemplateRenderer) -> Self {
        Self {
            network,
            mode,
            renderer,
        }
    }

    /// Mapping for a fixed-address contract. `templates` are the active
    /// templates of the config; those created by this contract get a
    /// `create(...)` call in the handler of their source event.
    pub fn contract(
        &self,
        contract: &ContractConfig,
        abi: Option<&Abi>,
        complexity: Complexity,
        templates: &[TemplateConfig],
    ) -> Result<String> {
        info!(
            "Rendering {} mapping for contract: {}",
            self.mode, contract.name
        );
        let plan = SourcePlan::for_contract(contract, abi, complexity);
        let created: Vec<&TemplateConfig> = templates
            .iter()
            .filter(|t| t.source_contract == contract.name)
            .collect();

        for template in &created {
            if !plan.events.iter().any(|e| e.name == template.source_event) {
                warn!(
                    "Template {} is created on {}, which is not an event of {}",
                    template.name, template.source_event, contract.name
                );
            }
        }

        let handlers = plan
            .events
            .iter()
            .map(|event| EventHandlerContext::new(event, template_creations(event, &created)))
            .collect();

        let generated = format!("../../generated/{0}/{0}", contract.name);
        let template_names: Vec<&str> = created.iter().map(|t| t.name.as_str()).collect();
        self.render(&plan, &generated, &template_names, handlers)
    }

    /// Mapping for a dynamic data source template
    pub fn template(&self, template: &TemplateConfig, abi: Option<&Abi>) -> Result<String> {
        info!(
            "Rendering {} mapping for template: {}",
            self.mode, template.name
        );
        let plan = SourcePlan::for_template(template, abi);
        let handlers = plan
            .events
            .iter()
            .map(|event| EventHandlerContext::new(event, Vec::new()))
            .collect();

        let generated = format!("{0}/{1}/{1}", GENERATED_TEMPLATES, template.name);
        self.render(&plan, &generated, &[], handlers)
    }

    fn render(
        &self,
        plan: &SourcePlan,
        generated: &str,
        template_names: &[&str],
        handlers: Vec<EventHandlerContext>,
    ) -> Result<String> {
        let header = self.renderer.render(
            MAPPING_HEADER_TEMPLATE,
            &HeaderContext {
                contract_name: &plan.name,
                network: self.network,
                imports: imports(plan, generated, template_names),
            },
        )?;

        let template = match self.mode {
            MappingsMode::Auto => MAPPING_AUTO_TEMPLATE,
            MappingsMode::Stub => MAPPING_STUB_TEMPLATE,
        };
        self.renderer.render(
            template,
            &MappingContext {
                header,
                handlers,
                call_handlers: plan.call_handlers.clone(),
                block_handler: plan.block_handler.clone(),
            },
        )
    }
}

fn template_creations(event: &Event, created: &[&TemplateConfig]) -> Vec<TemplateCreation> {
    created
        .iter()
        .filter(|t| t.source_event == event.name)
        .map(|t| {
            let address_param = address_param(event).map(str::to_string);
            if address_param.is_none() {
                warn!(
                    "Template {} is created on {} but the event has no address parameter. \
                     The create call is left commented out.",
                    t.name, event.name
                );
            }
            TemplateCreation {
                template_name: t.name.clone(),
                address_param,
                event_name: event.name.clone(),
            }
        })
        .collect()
}

fn imports(plan: &SourcePlan, generated: &str, template_names: &[&str]) -> Vec<Import> {
    let mut imports = Vec::new();
    let mut push = |names: Vec<String>, from: &str| {
        if !names.is_empty() {
            imports.push(Import {
                names: names.join(", "),
                from: from.to_string(),
            });
        }
    };

    let generated_types = plan
        .events
        .iter()
        .map(|e| format!("{} as {}", e.name, event_type_alias(&e.name)))
        .chain(
            plan.call_handlers
                .iter()
                .map(|c| format!("{} as {}", c.entity_name, c.call_type)),
        )
        .collect();
    push(generated_types, generated);
    push(plan.entity_names(), GENERATED_SCHEMA);
    push(
        template_names.iter().map(|n| n.to_string()).collect(),
        GENERATED_TEMPLATES,
    );
    if plan.block_handler.is_some() {
        push(vec!["ethereum".to_string()], GRAPH_TS);
    }

    imports
}

/// Render the mapping of every contract and active template, keyed by
/// data source name
pub fn render_all_mappings(
    config: &SubgraphConfig,
    abis: &AbiMap,
    renderer: &TemplateRenderer,
) -> Result<Vec<(String, String)>> {
    let generator = MappingGenerator::new(&config.network, config.mappings_mode, renderer);
    let templates = config.active_templates();
    let mut mappings = Vec::with_capacity(config.contracts.len() + templates.len());

    for contract in &config.contracts {
        let content = generator.contract(contract, abis.get(&contract.name), config.complexity, templates)?;
        mappings.push((contract.name.clone(), content));
    }
    for template in templates {
        let content = generator.template(template, abis.get(&template.name))?;
        mappings.push((template.name.clone(), content));
    }

    Ok(mappings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::parse_abi;
    use crate::test_utils::{create_test_contract, ERC1155_ABI, ERC20_ABI, FACTORY_ABI, PAIR_ABI};

    fn renderer() -> TemplateRenderer {
        TemplateRenderer::new().unwrap()
    }

    #[test]
    fn test_auto_mapping_from_abi() {
        let renderer = renderer();
        let generator = MappingGenerator::new("ethereum", MappingsMode::Auto, &renderer);
        let abi = parse_abi(ERC20_ABI).unwrap();
        let contract = create_test_contract("Token");

        let mapping = generator
            .contract(&contract, Some(&abi), Complexity::Basic, &[])
            .unwrap();
        assert!(mapping.contains(
            "import { Transfer as TransferEvent, Approval as ApprovalEvent } from \"../../generated/Token/Token\""
        ));
        assert!(mapping.contains("import { Transfer, Approval } from \"../../generated/schema\""));
        assert!(mapping.contains("export function handleTransfer(event: TransferEvent): void {"));
        assert!(mapping.contains("let entity = new Transfer("));
        assert!(mapping.contains("  entity.from = event.params.from\n"));
        assert!(mapping.contains("  entity.value = event.params.value\n"));
        assert!(mapping.contains("  entity.transactionHash = event.transaction.hash\n"));
        assert_eq!(mapping.matches("  entity.save()").count(), 2);
        assert!(!mapping.contains("generated/templates"));
        assert!(!mapping.contains("TODO"));
    }

    #[test]
    fn test_param_named_id_keeps_entity_key() {
        let renderer = renderer();
        let abi = parse_abi(ERC1155_ABI).unwrap();
        let contract = create_test_contract("Items");

        for mode in [MappingsMode::Auto, MappingsMode::Stub] {
            let mapping = MappingGenerator::new("ethereum", mode, &renderer)
                .contract(&contract, Some(&abi), Complexity::Basic, &[])
                .unwrap();
            assert!(mapping.contains("entity.eventId = event.params.id\n"));
            assert!(!mapping.contains("entity.id ="));
        }
    }

    #[test]
    fn test_stub_mapping_is_commented() {
        let renderer = renderer();
        let generator = MappingGenerator::new("ethereum", MappingsMode::Stub, &renderer);
        let abi = parse_abi(ERC20_ABI).unwrap();

        let mapping = generator
            .contract(&create_test_contract("Token"), Some(&abi), Complexity::Basic, &[])
            .unwrap();
        assert!(mapping.contains("export function handleTransfer(event: TransferEvent): void {"));
        assert!(mapping.contains("// TODO: Implement the Transfer handler."));
        assert!(mapping.contains("  // entity.from = event.params.from\n"));
        assert!(mapping.contains("// entity.save()"));
        assert!(!mapping.contains("\n  entity.save()"));
    }

    #[test]
    fn test_placeholder_handler() {
        let renderer = renderer();
        let generator = MappingGenerator::new("ethereum", MappingsMode::Auto, &renderer);

        let mapping = generator
            .contract(&create_test_contract("Vault"), None, Complexity::Basic, &[])
            .unwrap();
        assert!(mapping.contains("export function handleVaultEvent(event: VaultEventEvent): void {"));
        assert!(mapping.contains("  entity.sender = event.params.sender\n"));
        assert!(mapping.contains("  entity.value = event.params.value\n"));
    }

    #[test]
    fn test_call_and_block_handlers() {
        let renderer = renderer();
        let generator = MappingGenerator::new("ethereum", MappingsMode::Auto, &renderer);
        let contract = create_test_contract("Token")
            .with_call_handlers(vec!["transfer(address,uint256)"])
            .with_block_handler(true);

        let mapping = generator
            .contract(&contract, None, Complexity::Intermediate, &[])
            .unwrap();
        assert!(mapping.contains("TransferCall as TransferFunctionCall"));
        assert!(mapping.contains("import { ethereum } from \"@graphprotocol/graph-ts\""));
        assert!(mapping.contains("export function handleTransferCall(call: TransferFunctionCall): void {"));
        assert!(mapping.contains("let entity = new TransferCall("));
        assert!(mapping.contains("export function handleTokenBlock(block: ethereum.Block): void {"));
        assert!(mapping.contains("let entity = new TokenBlock(block.hash)"));

        let basic = generator
            .contract(&contract, None, Complexity::Basic, &[])
            .unwrap();
        assert!(!basic.contains("handleTransferCall"));
        assert!(!basic.contains("ethereum.Block"));
        assert!(!basic.contains(GRAPH_TS));
    }

    #[test]
    fn test_factory_creates_template() {
        let renderer = renderer();
        let generator = MappingGenerator::new("ethereum", MappingsMode::Auto, &renderer);
        let abi = parse_abi(FACTORY_ABI).unwrap();
        let templates = vec![TemplateConfig::new("Pair", "Pair.json", "Factory", "PairCreated", vec!["Swap"])];

        let mapping = generator
            .contract(&create_test_contract("Factory"), Some(&abi), Complexity::Advanced, &templates)
            .unwrap();
        assert!(mapping.contains("import { Pair } from \"../../generated/templates\""));
        assert!(mapping.contains("  Pair.create(event.params.pair)\n"));
    }

    #[test]
    fn test_template_creation_without_address_param() {
        let renderer = renderer();
        let generator = MappingGenerator::new("ethereum", MappingsMode::Auto, &renderer);
        let abi = parse_abi(PAIR_ABI).unwrap();
        let templates = vec![TemplateConfig::new("Child", "Child.json", "Pool", "Sync", vec!["Swap"])];

        let mapping = generator
            .contract(&create_test_contract("Pool"), Some(&abi), Complexity::Advanced, &templates)
            .unwrap();
        assert!(mapping.contains("// TODO: Sync has no address parameter."));
        assert!(mapping.contains("  // Child.create(event.params.ADDRESS_PARAM_HERE)\n"));
        assert!(!mapping.contains("\n  Child.create("));
    }

    #[test]
    fn test_template_mapping() {
        let renderer = renderer();
        let generator = MappingGenerator::new("ethereum", MappingsMode::Auto, &renderer);
        let abi = parse_abi(PAIR_ABI).unwrap();
        let template = TemplateConfig::new("Pair", "Pair.json", "Factory", "PairCreated", vec!["Swap"]);

        let mapping = generator.template(&template, Some(&abi)).unwrap();
        assert!(mapping.contains("import { Swap as SwapEvent } from \"../../generated/templates/Pair/Pair\""));
        assert!(mapping.contains("export function handleSwap(event: SwapEvent): void {"));
        assert!(!mapping.contains("handleSync"));

        let placeholder = generator.template(&template, None).unwrap();
        assert!(placeholder.contains("export function handleSwap(event: SwapEvent): void {"));
        assert!(!placeholder.contains("event.params."));
    }
}
