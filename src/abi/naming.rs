//! Name derivations shared by the schema, manifest and mapping builders.

pub fn get_handler_name(event_name: &str) -> String {
    format!("handle{}", event_name)
}

/// Entity types are named exactly like the event they record
pub fn get_entity_name(event_name: &str) -> String {
    event_name.to_string()
}

pub fn get_call_handler_name(function_name: &str) -> String {
    format!("handle{}Call", capitalize(function_name))
}

pub fn get_call_entity_name(function_name: &str) -> String {
    format!("{}Call", capitalize(function_name))
}

/// Alias for the generated `<Fn>Call` class, which would otherwise clash
/// with the `<Fn>Call` entity
pub fn get_call_type_alias(function_name: &str) -> String {
    format!("{}FunctionCall", capitalize(function_name))
}

pub fn get_block_handler_name(contract_name: &str) -> String {
    format!("handle{}Block", contract_name)
}

pub fn get_block_entity_name(contract_name: &str) -> String {
    format!("{}Block", contract_name)
}

/// `token_id` -> `tokenId`. The first segment is lowercased; later segments
/// only get their first letter uppercased.
pub fn to_camel_case(name: &str) -> String {
    let mut parts = name.split('_');
    let mut result = parts.next().unwrap_or_default().to_lowercase();
    for part in parts {
        result.push_str(&capitalize(part));
    }
    result
}

/// Fields every event entity already carries
const RESERVED_ENTITY_FIELDS: [&str; 4] = ["id", "blockNumber", "blockTimestamp", "transactionHash"];

/// Entity field for an event parameter: camelCased, with names that clash
/// with the entity's own fields prefixed by `event` (`id` -> `eventId`)
pub fn get_entity_field_name(param_name: &str) -> String {
    let field = to_camel_case(param_name);
    if RESERVED_ENTITY_FIELDS.contains(&field.as_str()) {
        format!("event{}", capitalize(&field))
    } else {
        field
    }
}

/// Function name part of a `name(type,...)` signature
pub fn function_name(signature: &str) -> &str {
    signature.split('(').next().unwrap_or_default().trim()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
