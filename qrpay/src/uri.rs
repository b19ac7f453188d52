//! Chain-specific payment URI construction.
//!
//! | Family | Native | Non-native |
//! |---|---|---|
//! | bitcoin | `bitcoin:<addr>?amount=<decimal>` | n/a |
//! | cardano | `cardano:<addr>?amount=<whole ADA>` | `cardano:<addr>?amount=<smallest>&policy_id=<policy>` |
//! | solana | `solana:<addr>?amount=<smallest>` | `solana:<addr>?spl-token=<mint>&amount=<smallest>` |
//! | EVM | `<chain>:<addr>?value=<smallest>` | `<chain>:<contract>/transfer?address=<addr>&uint256=<smallest>` |
//!
//! A non-empty label is appended as `&label=<percent-encoded>` on every chain.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::amount::{to_smallest_unit, to_whole_units};
use crate::chain::{ChainFamily, ChainRegistry, TokenDefinition, TokenReference};
use crate::error::{Error, Result};
use crate::intent::PaymentIntent;

/// Characters left unescaped by JavaScript's `encodeURIComponent`.
const LABEL_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Builds the payment URI for `intent`.
///
/// The address is re-validated here rather than trusted from parse time,
/// since parsing and encoding may be invoked independently.
///
/// # Errors
///
/// - [`Error::UnsupportedChain`] / [`Error::UnsupportedToken`] if the intent
///   does not resolve against `registry`.
/// - [`Error::InvalidAddress`] if the address fails the chain's grammar.
/// - [`Error::InvalidAmount`] if the amount cannot be converted.
pub fn encode_uri(registry: &ChainRegistry, intent: &PaymentIntent) -> Result<String> {
    let chain = registry.lookup(&intent.chain)?;
    let token = registry.lookup_token(&intent.chain, &intent.token)?;

    if !chain.family().validator().is_valid(&intent.address) {
        return Err(Error::invalid_address(chain.id()));
    }

    let mut uri = base_uri(chain.family(), chain.id(), token, intent)?;
    if !intent.label.is_empty() {
        uri.push_str("&label=");
        uri.extend(utf8_percent_encode(&intent.label, LABEL_ENCODE_SET));
    }
    Ok(uri)
}

fn base_uri(
    family: ChainFamily,
    chain_id: &str,
    token: &TokenDefinition,
    intent: &PaymentIntent,
) -> Result<String> {
    let address = &intent.address;
    let reference = token.reference.as_ref().map(TokenReference::as_str);

    let uri = match (family, reference) {
        (ChainFamily::Bitcoin, _) => format!("bitcoin:{address}?amount={}", intent.amount),
        (ChainFamily::Cardano, None) => {
            format!("cardano:{address}?amount={}", to_whole_units(&intent.amount)?)
        }
        (ChainFamily::Cardano, Some(policy_id)) => format!(
            "cardano:{address}?amount={}&policy_id={policy_id}",
            to_smallest_unit(&intent.amount, token.decimals)?
        ),
        (ChainFamily::Solana, None) => format!(
            "solana:{address}?amount={}",
            to_smallest_unit(&intent.amount, token.decimals)?
        ),
        (ChainFamily::Solana, Some(mint)) => format!(
            "solana:{address}?spl-token={mint}&amount={}",
            to_smallest_unit(&intent.amount, token.decimals)?
        ),
        (ChainFamily::Evm, None) => format!(
            "{chain_id}:{address}?value={}",
            to_smallest_unit(&intent.amount, token.decimals)?
        ),
        (ChainFamily::Evm, Some(contract)) => format!(
            "{chain_id}:{contract}/transfer?address={address}&uint256={}",
            to_smallest_unit(&intent.amount, token.decimals)?
        ),
    };
    Ok(uri)
}
