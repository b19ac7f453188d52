//! Chain and token definitions, and the registry that resolves them.
//!
//! Static chain data is declared as [`ChainInfo`] slices (see
//! [`networks`](crate::networks)); applications assemble a [`ChainRegistry`]
//! from those slices at startup. The registry is immutable once built and is
//! the single source of truth for "is this chain supported" and "is this
//! token supported on that chain".

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use crate::error::{Error, Result};

/// Chain family, selecting the address grammar and payment-URI grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    /// EIP-155 compatible chains (Ethereum, Polygon, ...).
    Evm,
    /// Bitcoin mainnet.
    Bitcoin,
    /// Cardano mainnet.
    Cardano,
    /// Solana mainnet.
    Solana,
}

impl Display for ChainFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Evm => "evm",
            Self::Bitcoin => "bitcoin",
            Self::Cardano => "cardano",
            Self::Solana => "solana",
        };
        f.write_str(name)
    }
}

/// Chain-specific identifier of a non-native token.
///
/// The serialized key mirrors the chain family's own vocabulary, so a token
/// definition flattens to `{"contractAddress": ...}`, `{"policyId": ...}` or
/// `{"address": ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenReference {
    /// ERC-20 contract address on an EVM chain.
    ContractAddress(&'static str),
    /// Cardano native-asset policy id.
    PolicyId(&'static str),
    /// Solana SPL token mint address.
    Address(&'static str),
}

impl TokenReference {
    /// Returns the raw identifier string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ContractAddress(s) | Self::PolicyId(s) | Self::Address(s) => s,
        }
    }
}

/// Token metadata: precision and native-vs-contract classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDefinition {
    /// Smallest-unit exponent (e.g. 18 for ETH, 0 for whole-ADA transfers).
    pub decimals: u8,
    /// `true` if this is the chain's base currency.
    pub is_native: bool,
    /// Contract / policy / mint reference; `None` iff `is_native`.
    #[serde(flatten)]
    pub reference: Option<TokenReference>,
}

impl TokenDefinition {
    /// A chain's base currency.
    #[must_use]
    pub const fn native(decimals: u8) -> Self {
        Self {
            decimals,
            is_native: true,
            reference: None,
        }
    }

    /// A non-native token identified by `reference`.
    #[must_use]
    pub const fn token(reference: TokenReference, decimals: u8) -> Self {
        Self {
            decimals,
            is_native: false,
            reference: Some(reference),
        }
    }
}

/// A token symbol paired with its definition, as declared in static tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenInfo {
    /// Token symbol (e.g. `"USDC"`).
    pub symbol: &'static str,
    /// Token metadata.
    pub definition: TokenDefinition,
}

/// Static declaration of a supported chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainInfo {
    /// Lowercase chain identifier (e.g. `"ethereum"`).
    pub id: &'static str,
    /// Chain family.
    pub family: ChainFamily,
    /// Tokens payable on this chain.
    pub tokens: &'static [TokenInfo],
}

/// A resolved chain entry with case-normalized token lookup.
#[derive(Debug, Clone)]
pub struct ChainDefinition {
    id: &'static str,
    family: ChainFamily,
    tokens: HashMap<String, TokenDefinition>,
}

impl ChainDefinition {
    fn from_info(info: &ChainInfo) -> Self {
        let tokens = info
            .tokens
            .iter()
            .map(|t| (t.symbol.to_ascii_uppercase(), t.definition))
            .collect();
        Self {
            id: info.id,
            family: info.family,
            tokens,
        }
    }

    /// Returns the chain identifier.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        self.id
    }

    /// Returns the chain family.
    #[must_use]
    pub const fn family(&self) -> ChainFamily {
        self.family
    }

    /// Looks up a token by symbol (case-insensitive).
    #[must_use]
    pub fn token(&self, symbol: &str) -> Option<&TokenDefinition> {
        self.tokens.get(&symbol.to_ascii_uppercase())
    }

    /// Iterates over `(symbol, definition)` pairs.
    pub fn tokens(&self) -> impl Iterator<Item = (&str, &TokenDefinition)> {
        self.tokens.iter().map(|(s, d)| (s.as_str(), d))
    }
}

/// Registry of supported chains indexed by lowercase chain id.
///
/// # Example
///
/// ```
/// use qrpay::chain::ChainRegistry;
///
/// let registry = ChainRegistry::builtin();
/// let eth = registry.lookup_token("ethereum", "eth").unwrap();
/// assert_eq!(eth.decimals, 18);
/// assert!(registry.lookup("dogecoin").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChainRegistry {
    chains: HashMap<&'static str, ChainDefinition>,
}

impl ChainRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated from a chain info slice.
    #[must_use]
    pub fn from_chains(chains: &[ChainInfo]) -> Self {
        let mut registry = Self::new();
        registry.register(chains);
        registry
    }

    /// Creates a registry holding every built-in chain.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_chains(crate::networks::EVM_CHAINS)
            .with_chains(crate::networks::BITCOIN_CHAINS)
            .with_chains(crate::networks::CARDANO_CHAINS)
            .with_chains(crate::networks::SOLANA_CHAINS)
    }

    /// Registers additional chains. Chains declaring no tokens are skipped.
    pub fn register(&mut self, chains: &[ChainInfo]) {
        for info in chains {
            if info.tokens.is_empty() {
                #[cfg(feature = "telemetry")]
                tracing::warn!(chain = info.id, "Skipping chain without tokens");
                continue;
            }
            self.chains.insert(info.id, ChainDefinition::from_info(info));
        }
    }

    /// Builder-style method: registers additional chains and returns `self`.
    #[must_use]
    pub fn with_chains(mut self, chains: &[ChainInfo]) -> Self {
        self.register(chains);
        self
    }

    /// Looks up a chain by identifier (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedChain`] if the chain is not registered.
    pub fn lookup(&self, chain_id: &str) -> Result<&ChainDefinition> {
        self.chains
            .get(chain_id.to_ascii_lowercase().as_str())
            .ok_or_else(|| Error::UnsupportedChain(chain_id.to_owned()))
    }

    /// Looks up a token on a chain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedChain`] if the chain is unknown, or
    /// [`Error::UnsupportedToken`] if the chain is known but the token is not.
    pub fn lookup_token(&self, chain_id: &str, symbol: &str) -> Result<&TokenDefinition> {
        let chain = self.lookup(chain_id)?;
        chain
            .token(symbol)
            .ok_or_else(|| Error::unsupported_token(chain.id(), symbol.to_ascii_uppercase()))
    }

    /// Iterates over all registered chains.
    pub fn chains(&self) -> impl Iterator<Item = &ChainDefinition> {
        self.chains.values()
    }

    /// Returns the number of registered chains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Returns `true` if no chains are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = ChainRegistry::builtin();
        assert_eq!(registry.lookup("Ethereum").unwrap().id(), "ethereum");
        assert_eq!(
            registry.lookup_token("polygon", "matic").unwrap().decimals,
            18
        );
    }

    #[test]
    fn test_unknown_chain_and_unknown_token_are_distinct() {
        let registry = ChainRegistry::builtin();
        assert_eq!(
            registry.lookup_token("dogecoin", "DOGE").unwrap_err(),
            Error::UnsupportedChain("dogecoin".into())
        );
        assert_eq!(
            registry.lookup_token("ethereum", "btc").unwrap_err(),
            Error::unsupported_token("ethereum", "BTC")
        );
    }

    #[test]
    fn test_every_builtin_chain_has_tokens() {
        let registry = ChainRegistry::builtin();
        assert_eq!(registry.len(), 5);
        for chain in registry.chains() {
            assert!(chain.tokens().next().is_some(), "{} has no tokens", chain.id());
        }
    }

    #[test]
    fn test_reference_present_iff_not_native() {
        let registry = ChainRegistry::builtin();
        for chain in registry.chains() {
            for (symbol, token) in chain.tokens() {
                assert_eq!(
                    token.is_native,
                    token.reference.is_none(),
                    "{symbol} on {}",
                    chain.id()
                );
            }
        }
    }

    #[test]
    fn test_register_skips_empty_chain() {
        static EMPTY: &[ChainInfo] = &[ChainInfo {
            id: "void",
            family: ChainFamily::Evm,
            tokens: &[],
        }];
        let registry = ChainRegistry::from_chains(EMPTY);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_token_definition_serializes_like_chain_table() {
        let usdc = ChainRegistry::builtin()
            .lookup_token("ethereum", "USDC")
            .copied()
            .unwrap();
        let json = serde_json::to_value(usdc).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "decimals": 6,
                "isNative": false,
                "contractAddress": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
            })
        );

        let ada = ChainRegistry::builtin()
            .lookup_token("cardano", "ADA")
            .copied()
            .unwrap();
        assert_eq!(
            serde_json::to_value(ada).unwrap(),
            serde_json::json!({ "decimals": 0, "isNative": true })
        );
    }
}
