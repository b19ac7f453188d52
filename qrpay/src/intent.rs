//! Free-text payment intent extraction.
//!
//! Each field (chain, amount + token, address, label) is matched
//! independently against the whole input. There is no positional linkage
//! between them: the address need not follow the amount, the chain keyword
//! may appear anywhere, and so on. Callers phrase requests freely and rely on
//! this.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::chain::ChainRegistry;
use crate::error::{Error, Result};

static CHAIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)on\s+(ethereum|polygon|solana|bitcoin|cardano)").expect("valid chain regex")
});

static AMOUNT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]*\.?[0-9]+)\s*(ETH|MATIC|SOL|BTC|ADA|USDT|USDC|USDM)")
        .expect("valid amount regex")
});

// Alternatives are tried in priority order at each position: cardano,
// legacy/P2SH bitcoin, bech32 bitcoin, EVM hex, solana base58.
static ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(addr1[a-zA-Z0-9]{98}",
        r"|[13][a-km-zA-HJ-NP-Z1-9]{25,34}",
        r"|bc1[ac-hj-np-z02-9]{39}",
        r"|0x[a-fA-F0-9]{40}",
        r"|[1-9A-HJ-NP-Za-km-z]{32,44})",
    ))
    .expect("valid address regex")
});

static LABEL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"]([^'"]+)['"]"#).expect("valid label regex"));

/// Structured payment parameters extracted from free text.
///
/// Produced by [`parse_intent`]; the address is not validated until the
/// intent reaches [`encode_uri`](crate::uri::encode_uri).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentIntent {
    /// Lowercase chain identifier.
    pub chain: String,
    /// Uppercase token symbol.
    pub token: String,
    /// Decimal amount in whole-token units, exactly as written.
    pub amount: String,
    /// Raw recipient address.
    pub address: String,
    /// Optional annotation; empty if absent.
    pub label: String,
}

fn capture<'a>(pattern: &Regex, input: &'a str, group: usize) -> Option<&'a str> {
    pattern
        .captures(input)
        .and_then(|c| c.get(group))
        .map(|m| m.as_str())
}

/// Extracts a [`PaymentIntent`] from free text.
///
/// # Errors
///
/// - [`Error::MalformedInput`] if no chain keyword, amount + token pair, or
///   address-shaped substring is found.
/// - [`Error::UnsupportedToken`] if the token is not registered on the chain.
/// - [`Error::UnsupportedChain`] if the chain keyword is recognized but
///   missing from `registry`.
///
/// # Example
///
/// ```
/// use qrpay::chain::ChainRegistry;
/// use qrpay::intent::parse_intent;
///
/// let intent = parse_intent(
///     &ChainRegistry::builtin(),
///     "pay 12.5 usdc on polygon to 0x1111111111111111111111111111111111111111",
/// )
/// .unwrap();
/// assert_eq!(intent.chain, "polygon");
/// assert_eq!(intent.token, "USDC");
/// assert_eq!(intent.amount, "12.5");
/// assert!(intent.label.is_empty());
/// ```
pub fn parse_intent(registry: &ChainRegistry, input: &str) -> Result<PaymentIntent> {
    let chain = capture(&CHAIN_PATTERN, input, 1);
    let amount = AMOUNT_PATTERN.captures(input);
    let address = capture(&ADDRESS_PATTERN, input, 1);

    let (Some(chain), Some(amount), Some(address)) = (chain, amount, address) else {
        #[cfg(feature = "telemetry")]
        tracing::debug!(
            chain = chain.is_some(),
            address = address.is_some(),
            "Incomplete payment request"
        );
        return Err(Error::MalformedInput);
    };

    let chain = chain.to_ascii_lowercase();
    let token = amount[2].to_ascii_uppercase();
    registry.lookup_token(&chain, &token)?;

    Ok(PaymentIntent {
        chain,
        token,
        amount: amount[1].to_owned(),
        address: address.to_owned(),
        label: capture(&LABEL_PATTERN, input, 1)
            .unwrap_or_default()
            .to_owned(),
    })
}
