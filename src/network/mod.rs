pub mod definitions;
pub use definitions::{NetworkInfo, SUPPORTED_NETWORKS};

use crate::error::{Result, WizardError};

/// Validates if a network name is supported and returns its information
pub fn validate_network(name: &str) -> Result<&'static NetworkInfo> {
    SUPPORTED_NETWORKS.get(name).ok_or_else(|| {
        WizardError::validation(format!(
            "Unsupported network: '{}'. Supported networks: {}",
            name,
            supported_network_names().join(", ")
        ))
    })
}

/// Returns all supported network names in a stable order
pub fn supported_network_names() -> Vec<&'static str> {
    SUPPORTED_NETWORKS.keys().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_validation() {
        let info = validate_network("ethereum").unwrap();
        assert_eq!(info.chain_id, 1);
        assert_eq!(info.explorer, "api.etherscan.io");

        let err = validate_network("solana").unwrap_err();
        assert!(matches!(err, WizardError::Validation(_)));
        assert!(err.to_string().contains("arbitrum, ethereum, optimism"));
    }

    #[test]
    fn test_api_key_env_vars() {
        assert_eq!(SUPPORTED_NETWORKS["optimism"].api_key_env, "OPTIMISM_ETHERSCAN_API_KEY");
        assert_eq!(SUPPORTED_NETWORKS["arbitrum"].api_key_env, "ARBITRUM_ETHERSCAN_API_KEY");
        assert_eq!(SUPPORTED_NETWORKS["arbitrum"].chain_id, 42161);
    }
}
