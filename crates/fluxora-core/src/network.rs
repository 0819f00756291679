//! Chain id lookup for the network panel.

use crate::error::WalletError;

/// Well-known chains by decimal id.
const KNOWN_NETWORKS: &[(u64, &str)] = &[
    (1, "Ethereum Mainnet"),
    (10, "Optimism"),
    (56, "BNB Smart Chain"),
    (137, "Polygon"),
    (8453, "Base"),
    (42161, "Arbitrum One"),
    (43114, "Avalanche"),
    (11155111, "Sepolia"),
];

/// Chain ids shown with a testnet badge. Anything not listed is mainnet.
const TESTNET_IDS: &[u64] = &[11155111];

/// Display information for a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInfo {
    pub chain_id: u64,
    pub display_name: String,
    pub is_testnet: bool,
}

impl NetworkInfo {
    /// Resolves a decimal chain id.
    pub fn resolve(chain_id: u64) -> Self {
        let display_name = KNOWN_NETWORKS
            .iter()
            .find(|(id, _)| *id == chain_id)
            .map(|(_, name)| name.to_string())
            .unwrap_or_else(|| format!("Chain ID: {chain_id}"));

        Self {
            chain_id,
            display_name,
            is_testnet: TESTNET_IDS.contains(&chain_id),
        }
    }

    /// Resolves a hex chain id as reported by the provider.
    pub fn from_hex(chain_id: &str) -> Result<Self, WalletError> {
        parse_chain_id(chain_id).map(Self::resolve)
    }
}

/// Parses a provider chain id (`"0x89"`) into its decimal value.
pub fn parse_chain_id(chain_id: &str) -> Result<u64, WalletError> {
    let trimmed = chain_id.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() {
        return Err(WalletError::invalid_chain_id(chain_id));
    }

    u64::from_str_radix(digits, 16).map_err(|_| WalletError::invalid_chain_id(chain_id))
}
