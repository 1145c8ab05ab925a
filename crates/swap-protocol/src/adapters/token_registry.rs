//! Static Token Registry Adapter
//!
//! Implements `TokenRegistry` from a fixed table.

use crate::domain::TokenIndex;
use crate::ports::outbound::{TokenInfo, TokenRegistry};

/// Fixed symbol → index table.
#[derive(Clone, Debug)]
pub struct StaticTokenRegistry {
    tokens: Vec<TokenInfo>,
}

impl StaticTokenRegistry {
    /// Create from explicit entries.
    pub fn new(tokens: Vec<TokenInfo>) -> Self {
        Self { tokens }
    }
}

impl Default for StaticTokenRegistry {
    /// USDC = 1, USDT = 2, UCT = 255, all with 6 decimals.
    fn default() -> Self {
        let token = |symbol: &str, index| TokenInfo {
            symbol: symbol.to_string(),
            index,
            decimals: 6,
        };
        Self::new(vec![token("USDC", 1), token("USDT", 2), token("UCT", 255)])
    }
}

impl TokenRegistry for StaticTokenRegistry {
    fn resolve(&self, symbol: &str) -> Option<TokenInfo> {
        self.tokens
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
            .cloned()
    }

    fn by_index(&self, index: TokenIndex) -> Option<TokenInfo> {
        self.tokens.iter().find(|t| t.index == index).cloned()
    }

    fn supported_tokens(&self) -> Vec<TokenInfo> {
        self.tokens.clone()
    }
}
