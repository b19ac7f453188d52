//! Built-in chain and token tables.
//!
//! Each chain family gets its own slice so applications can assemble a
//! narrower [`ChainRegistry`](crate::chain::ChainRegistry) when they only
//! accept some of them.

use crate::chain::{ChainFamily, ChainInfo, TokenDefinition, TokenInfo, TokenReference};

/// USDC contract address on Ethereum Mainnet.
pub const USDC_ETHEREUM: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";

/// USDT contract address on Ethereum Mainnet.
pub const USDT_ETHEREUM: &str = "0xdAC17F958D2ee523a2206206994597C13D831ec7";

/// USDC contract address on Polygon Mainnet.
pub const USDC_POLYGON: &str = "0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359";

/// USDT contract address on Polygon Mainnet.
pub const USDT_POLYGON: &str = "0xc2132D05D31c914a87C6611C10748AEb04B58e8F";

/// USDC SPL mint on Solana mainnet.
pub const USDC_SOLANA: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

/// USDT SPL mint on Solana mainnet.
pub const USDT_SOLANA: &str = "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB";

/// USDM (Mehen) policy id on Cardano mainnet.
pub const USDM_CARDANO_POLICY: &str = "c48cbb3d5e57ed56e276bc45f99ab39abe94e6cd7ac39fb402da47ad";

/// Default decimals for fiat-backed stablecoins.
pub const STABLECOIN_DECIMALS: u8 = 6;

/// EVM chains: Ethereum and Polygon.
pub static EVM_CHAINS: &[ChainInfo] = &[
    ChainInfo {
        id: "ethereum",
        family: ChainFamily::Evm,
        tokens: &[
            TokenInfo {
                symbol: "ETH",
                definition: TokenDefinition::native(18),
            },
            TokenInfo {
                symbol: "USDC",
                definition: TokenDefinition::token(
                    TokenReference::ContractAddress(USDC_ETHEREUM),
                    STABLECOIN_DECIMALS,
                ),
            },
            TokenInfo {
                symbol: "USDT",
                definition: TokenDefinition::token(
                    TokenReference::ContractAddress(USDT_ETHEREUM),
                    STABLECOIN_DECIMALS,
                ),
            },
        ],
    },
    ChainInfo {
        id: "polygon",
        family: ChainFamily::Evm,
        tokens: &[
            TokenInfo {
                symbol: "MATIC",
                definition: TokenDefinition::native(18),
            },
            TokenInfo {
                symbol: "USDC",
                definition: TokenDefinition::token(
                    TokenReference::ContractAddress(USDC_POLYGON),
                    STABLECOIN_DECIMALS,
                ),
            },
            TokenInfo {
                symbol: "USDT",
                definition: TokenDefinition::token(
                    TokenReference::ContractAddress(USDT_POLYGON),
                    STABLECOIN_DECIMALS,
                ),
            },
        ],
    },
];

/// Bitcoin mainnet. Only the native coin is payable.
pub static BITCOIN_CHAINS: &[ChainInfo] = &[ChainInfo {
    id: "bitcoin",
    family: ChainFamily::Bitcoin,
    tokens: &[TokenInfo {
        symbol: "BTC",
        definition: TokenDefinition::native(8),
    }],
}];

/// Cardano mainnet.
///
/// Native ADA is requested in whole ADA, so it carries zero decimals.
pub static CARDANO_CHAINS: &[ChainInfo] = &[ChainInfo {
    id: "cardano",
    family: ChainFamily::Cardano,
    tokens: &[
        TokenInfo {
            symbol: "ADA",
            definition: TokenDefinition::native(0),
        },
        TokenInfo {
            symbol: "USDM",
            definition: TokenDefinition::token(
                TokenReference::PolicyId(USDM_CARDANO_POLICY),
                STABLECOIN_DECIMALS,
            ),
        },
    ],
}];

/// Solana mainnet.
pub static SOLANA_CHAINS: &[ChainInfo] = &[ChainInfo {
    id: "solana",
    family: ChainFamily::Solana,
    tokens: &[
        TokenInfo {
            symbol: "SOL",
            definition: TokenDefinition::native(9),
        },
        TokenInfo {
            symbol: "USDC",
            definition: TokenDefinition::token(
                TokenReference::Address(USDC_SOLANA),
                STABLECOIN_DECIMALS,
            ),
        },
        TokenInfo {
            symbol: "USDT",
            definition: TokenDefinition::token(
                TokenReference::Address(USDT_SOLANA),
                STABLECOIN_DECIMALS,
            ),
        },
    ],
}];
