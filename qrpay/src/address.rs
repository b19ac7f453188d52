//! Per-chain recipient address validation.
//!
//! These are syntactic sanity checks only: no checksum verification and no
//! on-chain existence check. Each [`ChainFamily`] has one
//! [`AddressValidator`] implementation.

use std::str::FromStr;
use std::sync::LazyLock;

use alloy_primitives::Address;
use regex::Regex;

use crate::chain::{ChainFamily, ChainRegistry};
use crate::error::Result;

/// Accepts or rejects a candidate address string for one chain family.
pub trait AddressValidator: Send + Sync {
    /// Returns `true` if `address` conforms to the family's grammar.
    fn is_valid(&self, address: &str) -> bool;
}

static BITCOIN_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(1|3|bc1)[a-zA-HJ-NP-Z0-9]{25,39}$").expect("valid bitcoin address regex")
});

static CARDANO_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^addr1[a-zA-Z0-9]{98}$").expect("valid cardano address regex")
});

static SOLANA_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$").expect("valid solana address regex")
});

/// `0x` followed by 40 hex digits, any case. Mixed-case checksums are not enforced.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvmAddressValidator;

impl AddressValidator for EvmAddressValidator {
    fn is_valid(&self, address: &str) -> bool {
        address.len() == 42 && address.starts_with("0x") && Address::from_str(address).is_ok()
    }
}

/// Legacy (`1`), P2SH (`3`) or bech32 (`bc1`) prefix followed by 25–39
/// base58/bech32-compatible characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitcoinAddressValidator;

impl AddressValidator for BitcoinAddressValidator {
    fn is_valid(&self, address: &str) -> bool {
        BITCOIN_ADDRESS.is_match(address)
    }
}

/// Shelley-era `addr1` followed by exactly 98 alphanumerics.
#[derive(Debug, Clone, Copy, Default)]
pub struct CardanoAddressValidator;

impl AddressValidator for CardanoAddressValidator {
    fn is_valid(&self, address: &str) -> bool {
        CARDANO_ADDRESS.is_match(address)
    }
}

/// 32–44 base58 characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolanaAddressValidator;

impl AddressValidator for SolanaAddressValidator {
    fn is_valid(&self, address: &str) -> bool {
        SOLANA_ADDRESS.is_match(address)
    }
}

impl ChainFamily {
    /// Returns the address validator for this family.
    #[must_use]
    pub fn validator(self) -> &'static dyn AddressValidator {
        match self {
            Self::Evm => &EvmAddressValidator,
            Self::Bitcoin => &BitcoinAddressValidator,
            Self::Cardano => &CardanoAddressValidator,
            Self::Solana => &SolanaAddressValidator,
        }
    }
}

/// Validates `address` against the grammar of the chain `chain_id`.
///
/// # Errors
///
/// Returns [`Error::UnsupportedChain`](crate::Error::UnsupportedChain) if the
/// chain is not registered (and therefore has no validator).
pub fn validate_address(registry: &ChainRegistry, chain_id: &str, address: &str) -> Result<bool> {
    let chain = registry.lookup(chain_id)?;
    Ok(chain.family().validator().is_valid(address))
}
