use serde::{Deserialize, Serialize};
use tracing::warn;

/// Represents a parsed Solidity event parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventParam {
    pub name: String,
    pub solidity_type: String,
    pub graph_type: String,
    pub indexed: bool,
}

/// Solidity types as they appear in ABI `type` strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolidityType {
    Address,
    Bool,
    String,
    Bytes(Option<usize>), // None for dynamic bytes, Some(n) for fixed
    Uint(u32),            // e.g., uint256, uint8; bare `uint` is 256
    Int(u32),             // e.g., int256, int8; bare `int` is 256
    Array(Box<SolidityType>, Option<usize>), // Fixed size is Some(size), dynamic is None
    // Anything we do not recognize (tuples, user-defined types, typos)
    Custom(String),
}

impl SolidityType {
    /// Helper function to convert type string to SolidityType
    pub fn from_type_string(type_str: &str) -> Self {
        let type_str = type_str.trim();

        if let Some(base) = type_str.strip_suffix(']') {
            if let Some(open) = base.rfind('[') {
                let size = &base[open + 1..];
                let inner = Self::from_type_string(&base[..open]);
                return SolidityType::Array(Box::new(inner), size.parse().ok());
            }
        }

        match type_str {
            "address" => SolidityType::Address,
            "bool" => SolidityType::Bool,
            "string" => SolidityType::String,
            "bytes" => SolidityType::Bytes(None),
            "uint" => SolidityType::Uint(256),
            "int" => SolidityType::Int(256),
            name => {
                if let Some(size) = name.strip_prefix("bytes").and_then(parse_width) {
                    SolidityType::Bytes(Some(size as usize))
                } else if let Some(bits) = name.strip_prefix("uint").and_then(parse_width) {
                    SolidityType::Uint(bits)
                } else if let Some(bits) = name.strip_prefix("int").and_then(parse_width) {
                    SolidityType::Int(bits)
                } else {
                    SolidityType::Custom(name.to_string())
                }
            }
        }
    }

    /// Convert Solidity type to the GraphQL / AssemblyScript scalar used by
    /// graph-ts. Integers up to 32 bits fit in `Int`, wider ones need `BigInt`.
    pub fn to_graph_type(&self) -> String {
        match self {
            SolidityType::Address => "Bytes".to_string(),
            SolidityType::Bool => "Boolean".to_string(),
            SolidityType::String => "String".to_string(),
            SolidityType::Bytes(_) => "Bytes".to_string(),
            SolidityType::Uint(bits) | SolidityType::Int(bits) => {
                if *bits <= 32 {
                    "Int".to_string()
                } else {
                    "BigInt".to_string()
                }
            }
            SolidityType::Array(inner, _) => format!("[{}!]", inner.to_graph_type()),
            SolidityType::Custom(name) => {
                warn!("Unknown Solidity type '{}', defaulting to Bytes", name);
                "Bytes".to_string()
            }
        }
    }
}

fn parse_width(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Map a raw ABI type string to its graph type. Never fails: unrecognized
/// types map to `Bytes` with a warning.
pub fn solidity_type_to_graph(solidity_type: &str) -> String {
    SolidityType::from_type_string(solidity_type).to_graph_type()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_graph_type_conversion() {
        let test_cases = vec![
            (SolidityType::Address, "Bytes"),
            (SolidityType::Bool, "Boolean"),
            (SolidityType::String, "String"),
            (SolidityType::Bytes(None), "Bytes"),
            (SolidityType::Bytes(Some(32)), "Bytes"),
            (SolidityType::Uint(256), "BigInt"),
            (SolidityType::Int(256), "BigInt"),
            (SolidityType::Uint(32), "Int"),
            (SolidityType::Int(8), "Int"),
        ];

        for (sol_type, expected) in test_cases {
            assert_eq!(sol_type.to_graph_type(), expected);
        }
    }

    #[test]
    fn test_integer_widths() {
        for bits in (8..=256).step_by(8) {
            let expected = if bits <= 32 { "Int" } else { "BigInt" };
            assert_eq!(solidity_type_to_graph(&format!("uint{}", bits)), expected);
            assert_eq!(solidity_type_to_graph(&format!("int{}", bits)), expected);
        }
    }

    #[test]
    fn test_bare_integer_aliases() {
        assert_eq!(solidity_type_to_graph("uint"), "BigInt");
        assert_eq!(solidity_type_to_graph("int"), "BigInt");
    }

    #[test]
    fn test_width_fallback_outside_table() {
        // Widths that are not real Solidity types still follow the width rule
        assert_eq!(solidity_type_to_graph("uint999"), "BigInt");
        assert_eq!(solidity_type_to_graph("int12"), "Int");
        assert_eq!(solidity_type_to_graph("bytes77"), "Bytes");
        assert_eq!(solidity_type_to_graph("bytes20"), "Bytes");
    }

    #[test]
    fn test_array_graph_type_conversion() {
        let test_cases = vec![
            ("address[]", "[Bytes!]"),
            ("uint256[]", "[BigInt!]"),
            ("uint8[4]", "[Int!]"),
            ("bool[][]", "[[Boolean!]!]"),
            ("string[2][]", "[[String!]!]"),
        ];

        for (type_str, expected) in test_cases {
            assert_eq!(solidity_type_to_graph(type_str), expected);
        }
    }

    #[test]
    fn test_array_law_holds_for_base_types() {
        for base in ["address", "bool", "string", "bytes", "bytes4", "uint16", "int128", "tuple"] {
            assert_eq!(
                solidity_type_to_graph(&format!("{}[]", base)),
                format!("[{}!]", solidity_type_to_graph(base))
            );
        }
    }

    #[test]
    fn test_basic_solidity_type_conversion() {
        let test_cases = vec![
            ("address", SolidityType::Address),
            ("bool", SolidityType::Bool),
            ("string", SolidityType::String),
            ("bytes", SolidityType::Bytes(None)),
            ("bytes32", SolidityType::Bytes(Some(32))),
            ("uint256", SolidityType::Uint(256)),
            ("uint8", SolidityType::Uint(8)),
            ("int256", SolidityType::Int(256)),
            ("int128", SolidityType::Int(128)),
        ];

        for (type_str, expected) in test_cases {
            assert_eq!(SolidityType::from_type_string(type_str), expected);
        }
    }

    #[test]
    fn test_array_solidity_type_conversion() {
        let test_cases = vec![
            (
                "address[]",
                SolidityType::Array(Box::new(SolidityType::Address), None),
            ),
            (
                "uint256[5]",
                SolidityType::Array(Box::new(SolidityType::Uint(256)), Some(5)),
            ),
            (
                "bool[][]",
                SolidityType::Array(
                    Box::new(SolidityType::Array(Box::new(SolidityType::Bool), None)),
                    None,
                ),
            ),
        ];

        for (type_str, expected) in test_cases {
            assert_eq!(SolidityType::from_type_string(type_str), expected);
        }
    }

    #[test]
    fn test_unknown_types_default_to_bytes() {
        assert_eq!(
            SolidityType::from_type_string("TokenData"),
            SolidityType::Custom("TokenData".to_string())
        );
        assert_eq!(solidity_type_to_graph("TokenData"), "Bytes");
        assert_eq!(solidity_type_to_graph("tuple"), "Bytes");
        assert_eq!(solidity_type_to_graph("uintx"), "Bytes");
        assert_eq!(solidity_type_to_graph(""), "Bytes");
    }
}
