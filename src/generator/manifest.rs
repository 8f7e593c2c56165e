use super::sources::{BlockHandler, CallHandler, SourcePlan};
use crate::abi::{get_handler_name, AbiMap};
use crate::config::SubgraphConfig;
use crate::error::Result;
use crate::templating::{TemplateRenderer, MANIFEST_TEMPLATE};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
struct EventHandler {
    event_signature: String,
    handler_name: String,
}

#[derive(Debug, Serialize)]
struct AbiRef {
    name: String,
    path: String,
}

#[derive(Debug, Serialize)]
struct DataSource<'a> {
    name: String,
    network: &'a str,
    /// Absent for templates
    address: Option<&'a str>,
    start_block: Option<u64>,
    abi_path: &'a str,
    entities: Vec<String>,
    /// ABIs of the templates this contract instantiates
    template_abis: Vec<AbiRef>,
    event_handlers: Vec<EventHandler>,
    call_handlers: Vec<CallHandler>,
    block_handler: Option<BlockHandler>,
}

impl<'a> DataSource<'a> {
    fn new(plan: SourcePlan, network: &'a str, abi_path: &'a str) -> Self {
        let entities = plan.entity_names();
        let event_handlers = plan
            .events
            .iter()
            .map(|event| EventHandler {
                event_signature: event.signature.clone(),
                handler_name: get_handler_name(&event.name),
            })
            .collect();

        Self {
            name: plan.name,
            network,
            address: None,
            start_block: None,
            abi_path,
            entities,
            template_abis: Vec::new(),
            event_handlers,
            call_handlers: plan.call_handlers,
            block_handler: plan.block_handler,
        }
    }
}

#[derive(Serialize)]
struct ManifestContext<'a> {
    /// Pre-quoted so any subgraph name stays a valid YAML scalar
    description: String,
    data_sources: Vec<DataSource<'a>>,
    templates: Vec<DataSource<'a>>,
}

/// Render `subgraph.yaml`
pub fn render_subgraph_yaml(config: &SubgraphConfig, abis: &AbiMap, renderer: &TemplateRenderer) -> Result<String> {
    info!("Rendering subgraph.yaml for: {}", config.name);
    let templates = config.active_templates();

    let data_sources = config
        .contracts
        .iter()
        .map(|contract| {
            let plan = SourcePlan::for_contract(contract, abis.get(&contract.name), config.complexity);
            DataSource {
                address: Some(contract.address.as_str()),
                start_block: Some(contract.start_block),
                template_abis: templates
                    .iter()
                    .filter(|t| t.source_contract == contract.name)
                    .map(|t| AbiRef {
                        name: t.name.clone(),
                        path: t.abi_path.clone(),
                    })
                    .collect(),
                ..DataSource::new(plan, &config.network, &contract.abi_path)
            }
        })
        .collect();

    let templates = templates
        .iter()
        .map(|template| {
            let plan = SourcePlan::for_template(template, abis.get(&template.name));
            DataSource::new(plan, &config.network, &template.abi_path)
        })
        .collect();

    let context = ManifestContext {
        description: serde_json::to_string(&format!("{} subgraph", config.name))?,
        data_sources,
        templates,
    };
    renderer.render(MANIFEST_TEMPLATE, &context)
}
