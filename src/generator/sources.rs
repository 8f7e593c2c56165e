//! What each data source handles, derived once from config and ABI and
//! shared by the schema, manifest and mapping builders.

use crate::abi::naming::{
    function_name, get_block_entity_name, get_block_handler_name, get_call_entity_name,
    get_call_handler_name, get_call_type_alias,
};
use crate::abi::{get_entity_name, Abi, Event};
use crate::config::{Complexity, ContractConfig, TemplateConfig};
use crate::types::{solidity_type_to_graph, EventParam};
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallHandler {
    pub function_signature: String,
    pub function_name: String,
    pub handler_name: String,
    pub entity_name: String,
    pub call_type: String,
}

impl CallHandler {
    fn from_signature(signature: &str) -> Self {
        let name = function_name(signature);
        Self {
            function_signature: signature.trim().to_string(),
            function_name: name.to_string(),
            handler_name: get_call_handler_name(name),
            entity_name: get_call_entity_name(name),
            call_type: get_call_type_alias(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockHandler {
    pub handler_name: String,
    pub entity_name: String,
}

/// Everything one data source (contract or template) handles
#[derive(Debug, Clone)]
pub struct SourcePlan {
    pub name: String,
    pub events: Vec<Event>,
    /// True when `events` are stand-ins because the ABI had nothing usable
    pub placeholder: bool,
    pub call_handlers: Vec<CallHandler>,
    pub block_handler: Option<BlockHandler>,
}

impl SourcePlan {
    /// Every ABI event of the contract, or a single `<Name>Event` placeholder.
    /// Call and block handlers only apply from the intermediate tier up.
    pub fn for_contract(contract: &ContractConfig, abi: Option<&Abi>, complexity: Complexity) -> Self {
        let events = abi.map(Abi::events).unwrap_or_default();

        let (events, placeholder) = if !events.is_empty() {
            (events, false)
        } else {
            match abi {
                Some(_) => warn!(
                    "No events found in ABI for {}, using placeholder entity",
                    contract.name
                ),
                None => debug!("No ABI provided for {}, using placeholder", contract.name),
            }
            (vec![contract_placeholder_event(&contract.name)], true)
        };

        let (call_handlers, block_handler) = if complexity.has_handlers() {
            (
                call_handlers(contract.call_handlers.as_deref()),
                block_handler(&contract.name, contract.block_handler),
            )
        } else {
            (Vec::new(), None)
        };

        Self {
            name: contract.name.clone(),
            events,
            placeholder,
            call_handlers,
            block_handler,
        }
    }

    /// ABI events named in the template's `event_handlers`, or one
    /// parameterless placeholder per declared handler when none match
    pub fn for_template(template: &TemplateConfig, abi: Option<&Abi>) -> Self {
        let matching: Vec<Event> = abi
            .map(Abi::events)
            .unwrap_or_default()
            .into_iter()
            .filter(|event| template.event_handlers.contains(&event.name))
            .collect();

        let (events, placeholder) = if !matching.is_empty() {
            (matching, false)
        } else {
            match abi {
                Some(_) => warn!(
                    "No events in ABI match template event_handlers for {}",
                    template.name
                ),
                None => debug!("No ABI provided for template {}", template.name),
            }
            let events = template
                .event_handlers
                .iter()
                .map(|name| template_placeholder_event(name))
                .collect();
            (events, true)
        };

        Self {
            name: template.name.clone(),
            events,
            placeholder,
            call_handlers: call_handlers(template.call_handlers.as_deref()),
            block_handler: block_handler(&template.name, template.block_handler),
        }
    }

    /// Entity names in manifest order: events, then calls, then the block
    pub fn entity_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .events
            .iter()
            .map(|e| get_entity_name(&e.name))
            .collect();
        let extra = self
            .call_handlers
            .iter()
            .map(|c| c.entity_name.clone())
            .chain(self.block_handler.iter().map(|b| b.entity_name.clone()));
        for name in extra {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

fn call_handlers(signatures: Option<&[String]>) -> Vec<CallHandler> {
    signatures
        .unwrap_or_default()
        .iter()
        .map(|sig| CallHandler::from_signature(sig))
        .collect()
}

fn block_handler(source_name: &str, enabled: bool) -> Option<BlockHandler> {
    enabled.then(|| BlockHandler {
        handler_name: get_block_handler_name(source_name),
        entity_name: get_block_entity_name(source_name),
    })
}

fn placeholder_param(name: &str, solidity_type: &str) -> EventParam {
    EventParam {
        name: name.to_string(),
        solidity_type: solidity_type.to_string(),
        graph_type: solidity_type_to_graph(solidity_type),
        indexed: false,
    }
}

/// `<Name>Event(address sender, uint256 value)`
pub fn contract_placeholder_event(contract_name: &str) -> Event {
    let name = format!("{}Event", contract_name);
    Event {
        signature: format!("{}(address,uint256)", name),
        params: vec![
            placeholder_param("sender", "address"),
            placeholder_param("value", "uint256"),
        ],
        name,
    }
}

/// `<name>()`, used for template handlers without a matching ABI event
pub fn template_placeholder_event(event_name: &str) -> Event {
    Event {
        name: event_name.to_string(),
        params: Vec::new(),
        signature: format!("{}()", event_name),
    }
}

/// Parameter passed to `<Template>.create(...)`: the first non-indexed
/// `address`, else the first indexed one
pub fn address_param(event: &Event) -> Option<&str> {
    let addresses = || event.params.iter().filter(|p| p.solidity_type == "address");
    addresses()
        .find(|p| !p.indexed)
        .or_else(|| addresses().next())
        .map(|p| p.name.as_str())
}
