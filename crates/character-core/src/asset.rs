//! Fungible asset collaborators
//!
//! The engine never holds custody of funds. It moves a buyer's pre-approved
//! balance through [`FungibleAsset::transfer_from`], the same transfer-on-behalf
//! contract an ERC-20 token exposes. [`TokenLedger`] is an in-memory
//! implementation used for simulation and tests.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};
use thiserror::Error;

use crate::types::Amount;

/// Transfer error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    /// Owner balance below the amount
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Requested amount
        required: Amount,
        /// Owner balance
        available: Amount,
    },

    /// Spender allowance below the amount
    #[error("insufficient allowance: required {required}, available {available}")]
    InsufficientAllowance {
        /// Requested amount
        required: Amount,
        /// Remaining allowance
        available: Amount,
    },

    /// Recipient balance would overflow
    #[error("recipient balance overflow")]
    BalanceOverflow,
}

/// Transfer-on-behalf interface of a fungible asset
pub trait FungibleAsset {
    /// Asset contract address
    fn address(&self) -> Address;

    /// Balance held by `owner`
    fn balance_of(&self, owner: Address) -> Amount;

    /// Amount `spender` may still move out of `owner`'s balance
    fn allowance(&self, owner: Address, spender: Address) -> Amount;

    /// Move `amount` from `from` to `to` on behalf of `spender`.
    ///
    /// Either the whole transfer happens or nothing changes.
    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), AssetError>;
}

/// In-memory ERC-20 style ledger
#[derive(Clone, Debug, Default)]
pub struct TokenLedger {
    address: Address,
    symbol: String,
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
    total_supply: Amount,
}

impl TokenLedger {
    /// Create an empty ledger for the asset deployed at `address`
    pub fn new(address: Address, symbol: impl Into<String>) -> Self {
        Self { address, symbol: symbol.into(), ..Default::default() }
    }

    /// Ticker symbol
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Total amount in circulation
    pub const fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Credit newly issued funds to `to`
    pub fn mint(&mut self, to: Address, amount: Amount) -> Result<(), AssetError> {
        let supply = self.total_supply.checked_add(amount).ok_or(AssetError::BalanceOverflow)?;
        let balance = self.balance_of(to).checked_add(amount).ok_or(AssetError::BalanceOverflow)?;
        self.total_supply = supply;
        self.balances.insert(to, balance);
        Ok(())
    }

    /// Let `spender` move up to `amount` of `owner`'s funds.
    /// `U256::MAX` is an unlimited approval that transfers never decrement.
    pub fn approve(&mut self, owner: Address, spender: Address, amount: Amount) {
        self.allowances.insert((owner, spender), amount);
    }

    /// Direct transfer signed by the owner
    pub fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> Result<(), AssetError> {
        let (new_from, new_to) = self.settle(from, to, amount)?;
        self.balances.insert(from, new_from);
        self.balances.insert(to, new_to);
        Ok(())
    }

    /// Compute post-transfer balances without applying them
    fn settle(&self, from: Address, to: Address, amount: Amount) -> Result<(Amount, Amount), AssetError> {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(AssetError::InsufficientBalance { required: amount, available: from_balance });
        }
        if from == to {
            return Ok((from_balance, from_balance));
        }

        let new_from = from_balance - amount;
        let new_to = self.balance_of(to).checked_add(amount).ok_or(AssetError::BalanceOverflow)?;
        Ok((new_from, new_to))
    }
}

impl FungibleAsset for TokenLedger {
    fn address(&self) -> Address {
        self.address
    }

    fn balance_of(&self, owner: Address) -> Amount {
        self.balances.get(&owner).copied().unwrap_or_default()
    }

    fn allowance(&self, owner: Address, spender: Address) -> Amount {
        self.allowances.get(&(owner, spender)).copied().unwrap_or_default()
    }

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), AssetError> {
        let allowance = self.allowance(from, spender);
        if allowance < amount {
            return Err(AssetError::InsufficientAllowance { required: amount, available: allowance });
        }

        let (new_from, new_to) = self.settle(from, to, amount)?;
        if allowance != U256::MAX {
            self.allowances.insert((from, spender), allowance - amount);
        }
        self.balances.insert(from, new_from);
        self.balances.insert(to, new_to);
        Ok(())
    }
}
