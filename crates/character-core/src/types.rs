//! Common types

use std::{fmt, str::FromStr};

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// NFT token identifier (first minted token is 1)
pub type TokenId = u64;

/// Asset amount in 18-decimal base units
pub type Amount = U256;

/// Number of per-attribute stats carried by every token
pub const STAT_COUNT: usize = 7;

/// Per-attribute stat vector
pub type Stats = [u64; STAT_COUNT];

/// Base units in one whole token (10^18)
pub const ONE_TOKEN: Amount = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Convert whole tokens to base units.
pub fn units(whole: u64) -> Amount {
    U256::from(whole) * ONE_TOKEN
}

/// Accepted payment rail
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Denomination {
    /// Governance/utility asset (asset-A)
    Primary,
    /// Secondary asset (asset-B), also used to pay for level-ups
    Secondary,
    /// Native chain currency, swapped into the primary asset
    Native,
}

impl Denomination {
    /// Returns the string representation of the rail
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Native => "native",
        }
    }
}

impl fmt::Display for Denomination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Denomination {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "primary" | "game" => Ok(Self::Primary),
            "secondary" | "genesis" => Ok(Self::Secondary),
            "native" | "matic" => Ok(Self::Native),
            _ => Err(EngineError::UnsupportedDenomination(s.to_string())),
        }
    }
}

impl TryFrom<u8> for Denomination {
    type Error = EngineError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Self::Primary),
            1 => Ok(Self::Secondary),
            2 => Ok(Self::Native),
            other => Err(EngineError::UnsupportedDenomination(other.to_string())),
        }
    }
}

/// How a buyer pays for a mint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payment {
    /// Pre-approved primary asset
    Primary,
    /// Pre-approved secondary asset
    Secondary,
    /// Native value attached to the call, swapped along `path`
    Native {
        /// Swap path from wrapped native to the primary asset
        path: Vec<Address>,
        /// Attached native value
        value: Amount,
    },
}

impl Payment {
    /// Rail this payment uses
    pub const fn denomination(&self) -> Denomination {
        match self {
            Self::Primary => Denomination::Primary,
            Self::Secondary => Denomination::Secondary,
            Self::Native { .. } => Denomination::Native,
        }
    }
}

/// Mutable progression state of one token
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenState {
    /// Token identifier
    pub token_id: TokenId,
    /// Current level
    pub level: u64,
    /// Accumulated stats
    pub stats: Stats,
}

impl TokenState {
    /// Baseline state of a freshly minted token
    pub const fn baseline(token_id: TokenId) -> Self {
        Self { token_id, level: 0, stats: [0; STAT_COUNT] }
    }

    /// Whether `next` keeps level and every stat at or above `self`
    pub fn is_dominated_by(&self, next: &Self) -> bool {
        next.level >= self.level && self.stats.iter().zip(&next.stats).all(|(old, new)| new >= old)
    }
}

/// Receipt of a paid mint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    /// Newly minted token
    pub token_id: TokenId,
    /// Buyer and owner of the token
    pub buyer: Address,
    /// Rail used for payment
    pub denomination: Denomination,
    /// Amount actually charged
    pub paid: Amount,
    /// Native value returned to the buyer (zero for token rails)
    pub refund: Amount,
}

/// Receipt of a paid level-up
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUp {
    /// Token that advanced
    pub token_id: TokenId,
    /// Level reached
    pub level: u64,
    /// Amount of the secondary asset charged
    pub cost: Amount,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units() {
        assert_eq!(units(0), U256::ZERO);
        assert_eq!(units(10).to_string(), "10000000000000000000");
    }

    #[test]
    fn test_denomination_tags() {
        assert_eq!("GAME".parse::<Denomination>().unwrap(), Denomination::Primary);
        assert_eq!(Denomination::try_from(2).unwrap(), Denomination::Native);
        assert!(matches!(
            Denomination::try_from(3),
            Err(EngineError::UnsupportedDenomination(_))
        ));
        assert!("usdc".parse::<Denomination>().is_err());
    }

    #[test]
    fn test_domination() {
        let base = TokenState::baseline(1);
        let mut next = base;
        next.level = 2;
        next.stats[6] = 1;
        assert!(base.is_dominated_by(&next));
        assert!(!next.is_dominated_by(&base));
    }
}
