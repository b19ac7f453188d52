//! Error types for payment-request interpretation and encoding.
//!
//! Every stage of the pipeline (registry lookup, intent parsing, address
//! validation, URI construction, rendering) reports failures through the
//! single [`Error`] enum so the job orchestrator can store a uniform message.

/// Errors produced while turning free text into a payment URI.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The text does not yield a complete intent (chain, amount/token, address).
    #[error("Invalid input format. Please specify chain, amount, token, and address.")]
    MalformedInput,

    /// The chain identifier is not present in the registry.
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    /// The chain is known but the token is not registered on it.
    #[error("{token} is not supported on {chain}")]
    UnsupportedToken {
        /// Chain the token was requested on.
        chain: String,
        /// Uppercased token symbol.
        token: String,
    },

    /// The recipient address does not match the chain's address grammar.
    #[error("Invalid {chain} address")]
    InvalidAddress {
        /// Chain whose grammar rejected the address.
        chain: String,
    },

    /// The amount cannot be represented in the token's smallest unit.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// The rendering collaborator failed to produce an image.
    #[error("Rendering failed: {0}")]
    Render(String),
}

impl Error {
    /// Creates an [`Error::UnsupportedToken`] for the given chain and symbol.
    #[must_use]
    pub fn unsupported_token(chain: impl Into<String>, token: impl Into<String>) -> Self {
        Self::UnsupportedToken {
            chain: chain.into(),
            token: token.into(),
        }
    }

    /// Creates an [`Error::InvalidAddress`] for the given chain.
    #[must_use]
    pub fn invalid_address(chain: impl Into<String>) -> Self {
        Self::InvalidAddress {
            chain: chain.into(),
        }
    }
}

/// Convenience alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_user_facing_wording() {
        assert_eq!(
            Error::unsupported_token("ethereum", "BTC").to_string(),
            "BTC is not supported on ethereum"
        );
        assert_eq!(
            Error::invalid_address("solana").to_string(),
            "Invalid solana address"
        );
        assert_eq!(
            Error::UnsupportedChain("dogecoin".into()).to_string(),
            "Unsupported chain: dogecoin"
        );
    }
}
