use crate::config::{Complexity, ContractConfig, MappingsMode, SubgraphConfig};
use fake::faker::company::en::CompanyName;
use fake::Fake;

/// ERC-20 events only: `Transfer` then `Approval`, plus one function
pub const ERC20_ABI: &str = r#"[
  {
    "anonymous": false,
    "inputs": [
      { "indexed": true, "internalType": "address", "name": "from", "type": "address" },
      { "indexed": true, "internalType": "address", "name": "to", "type": "address" },
      { "indexed": false, "internalType": "uint256", "name": "value", "type": "uint256" }
    ],
    "name": "Transfer",
    "type": "event"
  },
  {
    "anonymous": false,
    "inputs": [
      { "indexed": true, "internalType": "address", "name": "owner", "type": "address" },
      { "indexed": true, "internalType": "address", "name": "spender", "type": "address" },
      { "indexed": false, "internalType": "uint256", "name": "value", "type": "uint256" }
    ],
    "name": "Approval",
    "type": "event"
  },
  {
    "inputs": [
      { "internalType": "address", "name": "to", "type": "address" },
      { "internalType": "uint256", "name": "amount", "type": "uint256" }
    ],
    "name": "transfer",
    "outputs": [{ "internalType": "bool", "name": "", "type": "bool" }],
    "stateMutability": "nonpayable",
    "type": "function"
  }
]"#;

/// Uniswap V2 style factory with a single `PairCreated` event
pub const FACTORY_ABI: &str = r#"[
  {
    "anonymous": false,
    "inputs": [
      { "indexed": true, "internalType": "address", "name": "token0", "type": "address" },
      { "indexed": true, "internalType": "address", "name": "token1", "type": "address" },
      { "indexed": false, "internalType": "address", "name": "pair", "type": "address" },
      { "indexed": false, "internalType": "uint256", "name": "", "type": "uint256" }
    ],
    "name": "PairCreated",
    "type": "event"
  },
  {
    "inputs": [
      { "internalType": "address", "name": "tokenA", "type": "address" },
      { "internalType": "address", "name": "tokenB", "type": "address" }
    ],
    "name": "createPair",
    "outputs": [{ "internalType": "address", "name": "pair", "type": "address" }],
    "stateMutability": "nonpayable",
    "type": "function"
  }
]"#;

/// Pair contract: `Swap` then `Sync`
pub const PAIR_ABI: &str = r#"[
  {
    "anonymous": false,
    "inputs": [
      { "indexed": true, "internalType": "address", "name": "sender", "type": "address" },
      { "indexed": false, "internalType": "uint256", "name": "amount0In", "type": "uint256" },
      { "indexed": false, "internalType": "uint256", "name": "amount1In", "type": "uint256" },
      { "indexed": false, "internalType": "uint256", "name": "amount0Out", "type": "uint256" },
      { "indexed": false, "internalType": "uint256", "name": "amount1Out", "type": "uint256" },
      { "indexed": true, "internalType": "address", "name": "to", "type": "address" }
    ],
    "name": "Swap",
    "type": "event"
  },
  {
    "anonymous": false,
    "inputs": [
      { "indexed": false, "internalType": "uint112", "name": "reserve0", "type": "uint112" },
      { "indexed": false, "internalType": "uint112", "name": "reserve1", "type": "uint112" }
    ],
    "name": "Sync",
    "type": "event"
  }
]"#;

/// ERC-1155 `TransferSingle`, whose `id` parameter clashes with the entity key
pub const ERC1155_ABI: &str = r#"[
  {
    "anonymous": false,
    "inputs": [
      { "indexed": true, "internalType": "address", "name": "operator", "type": "address" },
      { "indexed": true, "internalType": "address", "name": "from", "type": "address" },
      { "indexed": true, "internalType": "address", "name": "to", "type": "address" },
      { "indexed": false, "internalType": "uint256", "name": "id", "type": "uint256" },
      { "indexed": false, "internalType": "uint256", "name": "value", "type": "uint256" }
    ],
    "name": "TransferSingle",
    "type": "event"
  }
]"#;

// Random data generation utilities
pub fn generate_random_address() -> String {
    format!("0x{:040x}", rand::random::<u64>())
}

pub fn generate_random_contract_name() -> String {
    let name: String = CompanyName()
        .fake::<String>()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    format!("{}Contract", name)
}

pub fn create_test_contract(name: &str) -> ContractConfig {
    ContractConfig::new(
        name,
        generate_random_address(),
        0,
        format!("{}.json", name),
    )
}

/// A valid single-contract config on ethereum writing to `./out`
pub fn create_test_config(complexity: Complexity, mappings_mode: MappingsMode) -> SubgraphConfig {
    SubgraphConfig::builder()
        .name("test-subgraph")
        .network("ethereum")
        .output_dir("./out")
        .mappings_mode(mappings_mode)
        .complexity(complexity)
        .add_contract(create_test_contract(&generate_random_contract_name()))
        .build()
        .expect("test config is valid")
}
