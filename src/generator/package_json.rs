use crate::config::SubgraphConfig;
use crate::error::Result;
use serde_json::json;
use tracing::info;

pub const GRAPH_CLI_VERSION: &str = "0.71.0";
pub const GRAPH_TS_VERSION: &str = "0.32.0";

/// Render `package.json` with the graph-cli scripts and dependencies
pub fn render_package_json(config: &SubgraphConfig) -> Result<String> {
    info!("Rendering package.json for: {}", config.name);
    let name = sanitize_package_name(&config.name);

    let package = json!({
        "name": name,
        "version": "0.1.0",
        "private": true,
        "description": format!("{} subgraph on {}", config.name, config.network),
        "scripts": {
            "codegen": "graph codegen",
            "build": "graph build",
            "deploy": format!("graph deploy --node https://api.studio.thegraph.com/deploy/ {}", name),
            "create-local": format!("graph create --node http://localhost:8020/ {}", name),
            "deploy-local": format!(
                "graph deploy --node http://localhost:8020/ --ipfs http://localhost:5001 {}",
                name
            ),
            "test": "graph test"
        },
        "dependencies": {
            "@graphprotocol/graph-cli": GRAPH_CLI_VERSION,
            "@graphprotocol/graph-ts": GRAPH_TS_VERSION
        }
    });

    let mut content = serde_json::to_string_pretty(&package)?;
    content.push('\n');
    Ok(content)
}

/// Lowercase, spaces and underscores become hyphens, anything outside
/// `[a-z0-9-]` is dropped, and leading `.`, `-` or `_` are stripped
pub fn sanitize_package_name(name: &str) -> String {
    let sanitized: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '_' { '-' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect();
    let sanitized = sanitized.trim_start_matches(['.', '-', '_']);

    if sanitized.is_empty() {
        "subgraph".to_string()
    } else {
        sanitized.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Complexity, MappingsMode};
    use crate::test_utils::create_test_config;
    use serde_json::Value;

    #[test]
    fn test_sanitize_package_name() {
        let cases = vec![
            ("My Subgraph", "my-subgraph"),
            ("uniswap_v2", "uniswap-v2"),
            ("--Token!!", "token"),
            ("_private", "private"),
            ("@scope/pkg", "scopepkg"),
            ("!!!", "subgraph"),
            ("", "subgraph"),
        ];
        for (input, expected) in cases {
            assert_eq!(sanitize_package_name(input), expected, "input: {:?}", input);
        }
    }

    #[test]
    fn test_package_json() {
        let mut config = create_test_config(Complexity::Basic, MappingsMode::Auto);
        config.name = "My Token_Subgraph".to_string();

        let content = render_package_json(&config).unwrap();
        let package: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(package["name"], "my-token-subgraph");
        assert_eq!(package["scripts"]["codegen"], "graph codegen");
        assert_eq!(package["scripts"]["build"], "graph build");
        assert!(package["scripts"]["deploy"]
            .as_str()
            .unwrap()
            .ends_with("my-token-subgraph"));
        assert_eq!(package["dependencies"]["@graphprotocol/graph-cli"], GRAPH_CLI_VERSION);
        assert_eq!(package["dependencies"]["@graphprotocol/graph-ts"], GRAPH_TS_VERSION);
        assert!(content.ends_with("}\n"));
    }
}
