use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub name: String,
    pub chain_id: u64,
    /// Host of the Etherscan-compatible API for this chain
    pub explorer: String,
    /// Environment variable holding the explorer API key
    pub api_key_env: String,
    pub default_start_block: u64,
}

// Macro to make network definition more concise and maintainable
macro_rules! define_networks {
    ($(
        $name:expr => {
            chain_id: $chain_id:expr,
            explorer: $explorer:expr,
            api_key_env: $api_key_env:expr,
            start_block: $start_block:expr
        }
    ),* $(,)?) => {
        lazy_static! {
            pub static ref SUPPORTED_NETWORKS: BTreeMap<&'static str, NetworkInfo> = {
                let mut m = BTreeMap::new();
                $(
                    m.insert($name, NetworkInfo {
                        name: $name.to_string(),
                        chain_id: $chain_id,
                        explorer: $explorer.to_string(),
                        api_key_env: $api_key_env.to_string(),
                        default_start_block: $start_block,
                    });
                )*
                m
            };
        }
    };
}

define_networks! {
    "ethereum" => {
        chain_id: 1,
        explorer: "api.etherscan.io",
        api_key_env: "ETHERSCAN_API_KEY",
        start_block: 0
    },
    "optimism" => {
        chain_id: 10,
        explorer: "api-optimistic.etherscan.io",
        api_key_env: "OPTIMISM_ETHERSCAN_API_KEY",
        start_block: 0
    },
    "arbitrum" => {
        chain_id: 42161,
        explorer: "api.arbiscan.io",
        api_key_env: "ARBITRUM_ETHERSCAN_API_KEY",
        start_block: 0
    },
}
