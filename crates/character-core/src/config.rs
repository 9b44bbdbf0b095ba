//! Configuration

use std::{env, str::FromStr};

use alloy_primitives::{address, Address};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{error::EngineError, pricing::PriceSchedule, types::units};

/// Wrapped MATIC on Polygon PoS
pub const DEFAULT_WRAPPED_NATIVE: Address = address!("0d500b1d8e8ef31e21c99d1db9a6444d3adf1270");

/// Engine configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterConfig {
    /// Mint and level prices
    pub prices: PriceSchedule,
    /// Recipient of every payment
    pub fee_receiver: Address,
    /// Metadata base URI; token URIs append the decimal token id
    pub base_uri: String,
    /// Wrapped native token every native swap path starts with
    pub wrapped_native: Address,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            prices: PriceSchedule::default(),
            fee_receiver: Address::ZERO,
            base_uri: String::new(),
            wrapped_native: DEFAULT_WRAPPED_NATIVE,
        }
    }
}

impl CharacterConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from any key lookup. Prices are whole tokens.
    ///
    /// - `CHARACTER_FEE_RECEIVER` (required)
    /// - `CHARACTER_PRIMARY_PRICE`, `CHARACTER_SECONDARY_PRICE`,
    ///   `CHARACTER_LEVEL_STEP`
    /// - `CHARACTER_BASE_URI`, `CHARACTER_WRAPPED_NATIVE`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let fee_receiver = lookup("CHARACTER_FEE_RECEIVER")
            .context("CHARACTER_FEE_RECEIVER must be set")
            .and_then(|s| parse_address("CHARACTER_FEE_RECEIVER", &s))?;
        let wrapped_native = match lookup("CHARACTER_WRAPPED_NATIVE") {
            Some(s) => parse_address("CHARACTER_WRAPPED_NATIVE", &s)?,
            None => defaults.wrapped_native,
        };

        let price = |key: &str, fallback| -> Result<_> {
            match lookup(key) {
                Some(s) => {
                    let whole = u64::from_str(s.trim()).with_context(|| format!("invalid {key}: {s}"))?;
                    Ok(units(whole))
                }
                None => Ok(fallback),
            }
        };

        let config = Self {
            prices: PriceSchedule {
                primary: price("CHARACTER_PRIMARY_PRICE", defaults.prices.primary)?,
                secondary: price("CHARACTER_SECONDARY_PRICE", defaults.prices.secondary)?,
                level_step: price("CHARACTER_LEVEL_STEP", defaults.prices.level_step)?,
            },
            fee_receiver,
            base_uri: lookup("CHARACTER_BASE_URI").unwrap_or(defaults.base_uri),
            wrapped_native,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject zero addresses for required collaborators
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.fee_receiver.is_zero() {
            return Err(EngineError::ZeroAddress("fee receiver"));
        }
        if self.wrapped_native.is_zero() {
            return Err(EngineError::ZeroAddress("wrapped native"));
        }
        Ok(())
    }
}

fn parse_address(key: &str, value: &str) -> Result<Address> {
    Address::from_str(value.trim()).with_context(|| format!("invalid {key}: {value}"))
}
