//! Swap-rate collaborator
//!
//! Native currency prices are never stored: they are derived from a router
//! quote of how much native currency buys a target amount of the primary
//! asset. The quote moves with liquidity, so it is fetched at execution time.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};
use thiserror::Error;

use crate::types::Amount;

/// Swap router error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwapError {
    /// Path shorter than two hops or not starting at wrapped native
    #[error("invalid swap path")]
    InvalidPath,

    /// Requested output is zero
    #[error("insufficient output amount")]
    InsufficientOutputAmount,

    /// Pool cannot provide the requested output
    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    /// No pool for a hop of the path
    #[error("no pair for {0} / {1}")]
    PairNotFound(Address, Address),

    /// Attached value below the required input
    #[error("excessive input amount: required {required}, provided {provided}")]
    ExcessiveInputAmount {
        /// Input the path requires
        required: Amount,
        /// Value attached to the call
        provided: Amount,
    },

    /// Arithmetic overflow in the pricing formula
    #[error("swap arithmetic overflow")]
    Overflow,
}

/// Router able to quote and execute exact-output swaps from native currency
pub trait SwapRouter {
    /// Router contract address
    fn address(&self) -> Address;

    /// Input amounts required along `path` to receive `amount_out` of its last
    /// token. The first element is the native amount to send.
    fn get_amounts_in(&self, amount_out: Amount, path: &[Address]) -> Result<Vec<Amount>, SwapError>;

    /// Swap at most `value` native currency for exactly `amount_out` of the
    /// last token of `path`, delivered to `to`. Unspent value is refunded to
    /// the sender by the router.
    fn swap_native_for_exact_tokens(
        &mut self,
        amount_out: Amount,
        path: &[Address],
        to: Address,
        value: Amount,
    ) -> Result<Vec<Amount>, SwapError>;
}

/// Constant-product router with a 0.3% fee per hop
#[derive(Clone, Debug)]
pub struct ConstantProductRouter {
    address: Address,
    wrapped_native: Address,
    /// Pool reserves keyed by sorted token pair
    pairs: HashMap<(Address, Address), (Amount, Amount)>,
    /// Output tokens delivered per (token, recipient)
    delivered: HashMap<(Address, Address), Amount>,
    /// Native currency taken in by swaps
    native_received: Amount,
}

impl ConstantProductRouter {
    /// Create a router without liquidity
    pub fn new(address: Address, wrapped_native: Address) -> Self {
        Self {
            address,
            wrapped_native,
            pairs: HashMap::new(),
            delivered: HashMap::new(),
            native_received: U256::ZERO,
        }
    }

    /// Wrapped native token the router expects at the start of a path
    pub const fn wrapped_native(&self) -> Address {
        self.wrapped_native
    }

    /// Seed or top up a pool
    pub fn add_liquidity(
        &mut self,
        token_a: Address,
        amount_a: Amount,
        token_b: Address,
        amount_b: Amount,
    ) -> Result<(), SwapError> {
        let (reserve_a, reserve_b) = self.reserves(token_a, token_b).unwrap_or_default();
        let reserve_a = reserve_a.checked_add(amount_a).ok_or(SwapError::Overflow)?;
        let reserve_b = reserve_b.checked_add(amount_b).ok_or(SwapError::Overflow)?;
        self.set_reserves(token_a, token_b, reserve_a, reserve_b);
        Ok(())
    }

    /// Reserves of `token_a` and `token_b` in their pool, in argument order
    pub fn reserves(&self, token_a: Address, token_b: Address) -> Option<(Amount, Amount)> {
        let (key, flipped) = pair_key(token_a, token_b);
        self.pairs
            .get(&key)
            .map(|&(r0, r1)| if flipped { (r1, r0) } else { (r0, r1) })
    }

    /// Amount of `token` delivered to `recipient` by swaps so far
    pub fn delivered(&self, token: Address, recipient: Address) -> Amount {
        self.delivered.get(&(token, recipient)).copied().unwrap_or_default()
    }

    /// Total native currency consumed by swaps
    pub const fn native_received(&self) -> Amount {
        self.native_received
    }

    fn set_reserves(&mut self, token_a: Address, token_b: Address, reserve_a: Amount, reserve_b: Amount) {
        let (key, flipped) = pair_key(token_a, token_b);
        let value = if flipped { (reserve_b, reserve_a) } else { (reserve_a, reserve_b) };
        self.pairs.insert(key, value);
    }
}

impl SwapRouter for ConstantProductRouter {
    fn address(&self) -> Address {
        self.address
    }

    fn get_amounts_in(&self, amount_out: Amount, path: &[Address]) -> Result<Vec<Amount>, SwapError> {
        if path.len() < 2 {
            return Err(SwapError::InvalidPath);
        }

        let mut amounts = vec![U256::ZERO; path.len()];
        amounts[path.len() - 1] = amount_out;
        for i in (1..path.len()).rev() {
            let (reserve_in, reserve_out) = self
                .reserves(path[i - 1], path[i])
                .ok_or(SwapError::PairNotFound(path[i - 1], path[i]))?;
            amounts[i - 1] = get_amount_in(amounts[i], reserve_in, reserve_out)?;
        }
        Ok(amounts)
    }

    fn swap_native_for_exact_tokens(
        &mut self,
        amount_out: Amount,
        path: &[Address],
        to: Address,
        value: Amount,
    ) -> Result<Vec<Amount>, SwapError> {
        if path.first() != Some(&self.wrapped_native) {
            return Err(SwapError::InvalidPath);
        }

        let amounts = self.get_amounts_in(amount_out, path)?;
        if amounts[0] > value {
            return Err(SwapError::ExcessiveInputAmount { required: amounts[0], provided: value });
        }

        // Quote succeeded for every hop, so every pair exists and every
        // output is below its reserve. Plan all writes before applying any.
        let mut updates = Vec::with_capacity(path.len() - 1);
        for (hop, window) in path.windows(2).enumerate() {
            let (reserve_in, reserve_out) = self.reserves(window[0], window[1]).unwrap_or_default();
            let reserve_in = reserve_in.checked_add(amounts[hop]).ok_or(SwapError::Overflow)?;
            let reserve_out =
                reserve_out.checked_sub(amounts[hop + 1]).ok_or(SwapError::InsufficientLiquidity)?;
            updates.push((window[0], window[1], reserve_in, reserve_out));
        }

        let token_out = path[path.len() - 1];
        let delivered = self.delivered(token_out, to).checked_add(amount_out).ok_or(SwapError::Overflow)?;
        let native_received = self.native_received.checked_add(amounts[0]).ok_or(SwapError::Overflow)?;

        for (hop_in, hop_out, reserve_in, reserve_out) in updates {
            self.set_reserves(hop_in, hop_out, reserve_in, reserve_out);
        }
        self.delivered.insert((token_out, to), delivered);
        self.native_received = native_received;
        Ok(amounts)
    }
}

/// Input required to take `amount_out` from a pool, fee included
pub fn get_amount_in(amount_out: Amount, reserve_in: Amount, reserve_out: Amount) -> Result<Amount, SwapError> {
    if amount_out.is_zero() {
        return Err(SwapError::InsufficientOutputAmount);
    }
    if reserve_in.is_zero() || reserve_out <= amount_out {
        return Err(SwapError::InsufficientLiquidity);
    }

    let numerator = reserve_in
        .checked_mul(amount_out)
        .and_then(|n| n.checked_mul(U256::from(1000)))
        .ok_or(SwapError::Overflow)?;
    let denominator = (reserve_out - amount_out)
        .checked_mul(U256::from(997))
        .ok_or(SwapError::Overflow)?;
    Ok(numerator / denominator + U256::from(1))
}

fn pair_key(a: Address, b: Address) -> ((Address, Address), bool) {
    if a <= b {
        ((a, b), false)
    } else {
        ((b, a), true)
    }
}
