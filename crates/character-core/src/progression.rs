//! Per-token progression state and ownership
//!
//! Every mutation is split in two: a pure planning step that computes the
//! next [`TokenState`] (and fails on overflow or decrease), and a commit
//! that re-checks the plan against the stored state. Callers collect payment
//! between the two, so a failed payment or a failed plan leaves the ledger
//! untouched.

use std::collections::{BTreeMap, HashMap};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::{
    error::EngineError,
    types::{Stats, TokenId, TokenState},
};

/// Token record: owner plus progression
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Current owner
    pub owner: Address,
    /// Level and stats
    pub state: TokenState,
}

/// Ledger of minted tokens
#[derive(Clone, Debug)]
pub struct ProgressionLedger {
    tokens: BTreeMap<TokenId, TokenRecord>,
    holdings: HashMap<Address, u64>,
    next_id: TokenId,
}

impl Default for ProgressionLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressionLedger {
    /// Create an empty ledger; the first token minted gets id 1
    pub fn new() -> Self {
        Self { tokens: BTreeMap::new(), holdings: HashMap::new(), next_id: 1 }
    }

    /// Id the next mint will receive
    pub const fn next_token_id(&self) -> TokenId {
        self.next_id
    }

    /// Fail if a mint to `owner` would be rejected
    pub fn ensure_mintable(&self, owner: Address) -> Result<(), EngineError> {
        if owner.is_zero() {
            return Err(EngineError::ZeroAddress("token owner"));
        }
        self.next_id.checked_add(1).map(drop).ok_or(EngineError::Overflow("token id"))
    }

    /// Mint a baseline token to `owner`
    pub fn mint(&mut self, owner: Address) -> Result<TokenId, EngineError> {
        self.ensure_mintable(owner)?;
        let token_id = self.next_id;
        self.next_id += 1;
        self.tokens.insert(token_id, TokenRecord { owner, state: TokenState::baseline(token_id) });
        *self.holdings.entry(owner).or_default() += 1;
        Ok(token_id)
    }

    /// Record of a token
    pub fn record(&self, token_id: TokenId) -> Result<&TokenRecord, EngineError> {
        self.tokens.get(&token_id).ok_or(EngineError::TokenNotFound(token_id))
    }

    /// Progression state of a token
    pub fn state(&self, token_id: TokenId) -> Result<TokenState, EngineError> {
        self.record(token_id).map(|record| record.state)
    }

    /// Level of a token. The stored level is the only source for this value.
    pub fn level_of(&self, token_id: TokenId) -> Result<u64, EngineError> {
        self.record(token_id).map(|record| record.state.level)
    }

    /// Owner of a token
    pub fn owner_of(&self, token_id: TokenId) -> Result<Address, EngineError> {
        self.record(token_id).map(|record| record.owner)
    }

    /// Number of tokens held by `owner`
    pub fn balance_of(&self, owner: Address) -> u64 {
        self.holdings.get(&owner).copied().unwrap_or_default()
    }

    /// Number of tokens minted
    pub fn total_supply(&self) -> u64 {
        self.tokens.len() as u64
    }

    /// Tokens owned by `owner`, ascending
    pub fn tokens_of(&self, owner: Address) -> impl Iterator<Item = TokenId> + '_ {
        self.tokens.iter().filter(move |(_, record)| record.owner == owner).map(|(id, _)| *id)
    }

    /// Fail unless `caller` owns `token_id`
    pub fn ensure_owner(&self, caller: Address, token_id: TokenId) -> Result<(), EngineError> {
        if self.owner_of(token_id)? == caller {
            Ok(())
        } else {
            Err(EngineError::NotTokenOwner { caller, token_id })
        }
    }

    /// State after adding `levels` and `stat_deltas`
    pub fn plan_advance(
        &self,
        token_id: TokenId,
        levels: u64,
        stat_deltas: &Stats,
    ) -> Result<TokenState, EngineError> {
        let mut next = self.state(token_id)?;
        next.level = next.level.checked_add(levels).ok_or(EngineError::Overflow("level"))?;
        for (stat, delta) in next.stats.iter_mut().zip(stat_deltas) {
            *stat = stat.checked_add(*delta).ok_or(EngineError::Overflow("stat"))?;
        }
        Ok(next)
    }

    /// State after raising level and stats to absolute values
    pub fn plan_set(&self, token_id: TokenId, level: u64, stats: &Stats) -> Result<TokenState, EngineError> {
        let current = self.state(token_id)?;
        let next = TokenState { token_id, level, stats: *stats };
        if !current.is_dominated_by(&next) {
            return Err(EngineError::ProgressionDecrease(token_id));
        }
        Ok(next)
    }

    /// Store a planned state. A state that would lower the stored level or
    /// any stat is rejected and nothing changes.
    pub fn commit(&mut self, next: TokenState) -> Result<(), EngineError> {
        let record = self.tokens.get_mut(&next.token_id).ok_or(EngineError::TokenNotFound(next.token_id))?;
        if !record.state.is_dominated_by(&next) {
            return Err(EngineError::ProgressionDecrease(next.token_id));
        }
        record.state = next;
        Ok(())
    }
}
