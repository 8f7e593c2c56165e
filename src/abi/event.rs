use super::{AbiEntry, RawParam};
use crate::types::{solidity_type_to_graph, EventParam};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A contract event normalised from its ABI entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub params: Vec<EventParam>,
    /// Canonical `Name(type1,type2,...)` form used by manifest event handlers
    pub signature: String,
}

impl Event {
    pub fn param(&self, name: &str) -> Option<&EventParam> {
        self.params.iter().find(|p| p.name == name)
    }
}

/// Extract every named event from the ABI, in declaration order
pub fn extract_events(entries: &[AbiEntry]) -> Vec<Event> {
    let mut events = Vec::new();

    for entry in entries {
        let AbiEntry::Event(raw) = entry else {
            continue;
        };

        let name = match raw.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => {
                warn!("Found event without name, skipping");
                continue;
            }
        };

        let mut params: Vec<EventParam> = Vec::with_capacity(raw.inputs.len());
        for input in &raw.inputs {
            let param_name = match input.name.as_deref() {
                Some(n) if !n.is_empty() => n.to_string(),
                _ => format!("param{}", params.len()),
            };

            params.push(EventParam {
                name: param_name,
                solidity_type: input.ty.clone(),
                graph_type: solidity_type_to_graph(&input.ty),
                indexed: input.indexed,
            });
        }

        events.push(Event {
            name: name.to_string(),
            params,
            signature: build_event_signature(name, &raw.inputs),
        });
    }

    events
}

/// Build `Name(type1,type2,...)` from the raw input types. The `indexed`
/// flag is not part of the signature.
pub fn build_event_signature(name: &str, inputs: &[RawParam]) -> String {
    let types: Vec<&str> = inputs.iter().map(|input| input.ty.as_str()).collect();
    format!("{}({})", name, types.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::Abi;
    use serde_json::json;

    fn transfer_abi() -> Abi {
        Abi::from_value(json!([{
            "type": "event",
            "name": "Transfer",
            "inputs": [
                {"name": "from", "type": "address", "indexed": true},
                {"name": "to", "type": "address", "indexed": true},
                {"name": "value", "type": "uint256", "indexed": false}
            ]
        }]))
        .unwrap()
    }

    #[test]
    fn test_extract_transfer_event() {
        let events = transfer_abi().events();
        assert_eq!(events.len(), 1);

        let event = &events[0];
        assert_eq!(event.name, "Transfer");
        assert_eq!(event.signature, "Transfer(address,address,uint256)");

        let graph_types: Vec<_> = event.params.iter().map(|p| p.graph_type.as_str()).collect();
        assert_eq!(graph_types, vec!["Bytes", "Bytes", "BigInt"]);
        assert!(event.params[0].indexed);
        assert!(!event.params[2].indexed);
        assert_eq!(event.param("value").unwrap().solidity_type, "uint256");
    }

    #[test]
    fn test_no_events() {
        let abi = Abi::from_value(json!([
            {"type": "function", "name": "balanceOf", "inputs": [{"name": "a", "type": "address"}]}
        ]))
        .unwrap();
        assert!(abi.events().is_empty());
    }

    #[test]
    fn test_unnamed_events_are_skipped() {
        let abi = Abi::from_value(json!([
            {"type": "event", "inputs": []},
            {"type": "event", "name": "", "inputs": []},
            {"type": "event", "name": "Sync", "inputs": []}
        ]))
        .unwrap();

        let events = abi.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].signature, "Sync()");
    }

    #[test]
    fn test_unnamed_params_are_synthesized() {
        let abi = Abi::from_value(json!([{
            "type": "event",
            "name": "Swap",
            "inputs": [
                {"name": "", "type": "address", "indexed": true},
                {"name": "amount", "type": "uint112"},
                {"type": "int24"}
            ]
        }]))
        .unwrap();

        let params = &abi.events()[0].params;
        assert_eq!(params[0].name, "param0");
        assert_eq!(params[1].name, "amount");
        assert_eq!(params[2].name, "param2");
        assert_eq!(params[2].graph_type, "Int");
        assert!(!params[1].indexed);
    }
}
