//! Character collection engine
//!
//! [`Character`] sequences every state-changing operation of the collection:
//! paid mints on three rails, paid level-ups, role-gated progression grants,
//! airdrops and whitelist claims, and the administrative configuration
//! surface. Operations run one at a time (`&mut self`); each one validates,
//! collects payment, then commits, so a failure at any step leaves no trace.

use alloy_primitives::{Address, B256};
use tracing::{debug, info};

use crate::{
    access::{AccessControl, CapabilityCheck, Role},
    asset::FungibleAsset,
    claims::ClaimRegistry,
    config::CharacterConfig,
    error::EngineError,
    pricing::{PriceSchedule, PricingTable},
    progression::ProgressionLedger,
    swap::SwapRouter,
    types::{Amount, Denomination, LevelUp, Payment, Purchase, Stats, TokenId, TokenState, STAT_COUNT},
};

/// Character NFT collection with its payment rails
#[derive(Debug)]
pub struct Character<A, R> {
    /// Address the engine acts as when spending approved funds
    address: Address,
    access: AccessControl,
    pricing: PricingTable,
    ledger: ProgressionLedger,
    claims: ClaimRegistry,
    primary: A,
    secondary: A,
    router: Option<R>,
    fee_receiver: Address,
    base_uri: String,
    wrapped_native: Address,
}

impl<A, R> Character<A, R>
where
    A: FungibleAsset,
    R: SwapRouter,
{
    /// Create a collection administered by `admin`.
    ///
    /// `address` is the spender buyers approve on both assets.
    pub fn new(
        address: Address,
        admin: Address,
        config: CharacterConfig,
        primary: A,
        secondary: A,
    ) -> Result<Self, EngineError> {
        if address.is_zero() {
            return Err(EngineError::ZeroAddress("engine"));
        }
        config.validate()?;

        info!(
            target: "character::engine",
            engine = %address,
            %admin,
            fee_receiver = %config.fee_receiver,
            primary = %primary.address(),
            secondary = %secondary.address(),
            "Character collection created"
        );

        Ok(Self {
            address,
            access: AccessControl::new(admin)?,
            pricing: PricingTable::new(config.prices),
            ledger: ProgressionLedger::new(),
            claims: ClaimRegistry::new(),
            primary,
            secondary,
            router: None,
            fee_receiver: config.fee_receiver,
            base_uri: config.base_uri,
            wrapped_native: config.wrapped_native,
        })
    }

    // ---------------------------------------------------------------------
    // Administration
    // ---------------------------------------------------------------------

    /// Set the unit price of a token rail. The native rail is always
    /// derived from the primary price and cannot be set.
    pub fn set_price(&mut self, caller: Address, denomination: Denomination, value: Amount) -> Result<(), EngineError> {
        self.access.ensure_admin(caller)?;
        self.pricing.set_price(denomination, value)?;
        info!(target: "character::engine", %denomination, %value, "Price updated");
        Ok(())
    }

    /// Set the per-level step
    pub fn set_price_step(&mut self, caller: Address, value: Amount) -> Result<(), EngineError> {
        self.access.ensure_admin(caller)?;
        self.pricing.set_price_step(value);
        info!(target: "character::engine", %value, "Price step updated");
        Ok(())
    }

    /// Set the recipient of every payment
    pub fn set_fee_receiver(&mut self, caller: Address, fee_receiver: Address) -> Result<(), EngineError> {
        self.access.ensure_admin(caller)?;
        if fee_receiver.is_zero() {
            return Err(EngineError::ZeroAddress("fee receiver"));
        }
        self.fee_receiver = fee_receiver;
        info!(target: "character::engine", %fee_receiver, "Fee receiver updated");
        Ok(())
    }

    /// Set the metadata base URI
    pub fn set_base_uri(&mut self, caller: Address, base_uri: impl Into<String>) -> Result<(), EngineError> {
        self.access.ensure_admin(caller)?;
        self.base_uri = base_uri.into();
        info!(target: "character::engine", base_uri = %self.base_uri, "Base URI updated");
        Ok(())
    }

    /// Install the swap router used by the native rail
    pub fn set_swap_router(&mut self, caller: Address, router: R) -> Result<(), EngineError> {
        self.access.ensure_admin(caller)?;
        if router.address().is_zero() {
            return Err(EngineError::ZeroAddress("swap router"));
        }
        info!(target: "character::engine", router = %router.address(), "Swap router updated");
        self.router = Some(router);
        Ok(())
    }

    /// Grant a capability
    pub fn grant_role(&mut self, caller: Address, role: Role, who: Address) -> Result<(), EngineError> {
        self.access.grant(caller, role, who)
    }

    /// Revoke a capability
    pub fn revoke_role(&mut self, caller: Address, role: Role, who: Address) -> Result<(), EngineError> {
        self.access.revoke(caller, role, who)
    }

    /// Hand administration to another address
    pub fn transfer_admin(&mut self, caller: Address, new_admin: Address) -> Result<(), EngineError> {
        self.access.transfer_admin(caller, new_admin)
    }

    /// Publish the whitelist root for claims
    pub fn set_merkle_root(&mut self, caller: Address, root: B256) -> Result<(), EngineError> {
        self.access.ensure_admin(caller)?;
        self.claims.publish(root);
        info!(target: "character::engine", %root, "Merkle root published");
        Ok(())
    }

    /// Mint one baseline token to each recipient
    pub fn distribute_tokens(&mut self, caller: Address, recipients: &[Address]) -> Result<Vec<TokenId>, EngineError> {
        self.access.ensure_admin(caller)?;
        if recipients.iter().any(|recipient| recipient.is_zero()) {
            return Err(EngineError::ZeroAddress("recipient"));
        }
        let last_id = self.ledger.next_token_id().checked_add(recipients.len() as u64);
        if last_id.is_none() {
            return Err(EngineError::Overflow("token id"));
        }

        let minted = recipients
            .iter()
            .map(|recipient| self.ledger.mint(*recipient))
            .collect::<Result<Vec<_>, _>>()?;
        info!(target: "character::engine", count = minted.len(), "Distributed tokens");
        Ok(minted)
    }

    // ---------------------------------------------------------------------
    // Pricing
    // ---------------------------------------------------------------------

    /// Current price of `quantity` units. Native quotes are fetched from the
    /// router on every call and must be re-checked at purchase time.
    pub fn quote(&self, denomination: Denomination, quantity: u64, path: &[Address]) -> Result<Amount, EngineError> {
        if denomination == Denomination::Native {
            self.check_swap_path(path)?;
        }
        self.pricing.price_for(denomination, quantity, self.router.as_ref(), path)
    }

    /// Secondary-asset cost of the next level of `token_id`
    pub fn level_up_cost(&self, token_id: TokenId) -> Result<Amount, EngineError> {
        self.pricing.level_up_cost(self.ledger.level_of(token_id)?)
    }

    // ---------------------------------------------------------------------
    // Paid mint and level-up
    // ---------------------------------------------------------------------

    /// Mint one token to `caller`, paid on the chosen rail
    pub fn buy(&mut self, caller: Address, payment: Payment) -> Result<Purchase, EngineError> {
        match payment {
            Payment::Primary => self.buy_with_primary(caller),
            Payment::Secondary => self.buy_with_secondary(caller),
            Payment::Native { path, value } => self.buy_with_native(caller, &path, value),
        }
    }

    /// Mint one token paid in the primary asset
    pub fn buy_with_primary(&mut self, caller: Address) -> Result<Purchase, EngineError> {
        self.ledger.ensure_mintable(caller)?;
        let price = self.pricing.flat_price(Denomination::Primary, 1)?;
        self.primary.transfer_from(self.address, caller, self.fee_receiver, price)?;
        self.finish_purchase(caller, Denomination::Primary, price, Amount::ZERO)
    }

    /// Mint one token paid in the secondary asset
    pub fn buy_with_secondary(&mut self, caller: Address) -> Result<Purchase, EngineError> {
        self.ledger.ensure_mintable(caller)?;
        let price = self.pricing.flat_price(Denomination::Secondary, 1)?;
        self.secondary.transfer_from(self.address, caller, self.fee_receiver, price)?;
        self.finish_purchase(caller, Denomination::Secondary, price, Amount::ZERO)
    }

    /// Mint one token paid with attached native `value`, swapped along `path`
    /// into the primary asset for the fee receiver
    pub fn buy_with_native(&mut self, caller: Address, path: &[Address], value: Amount) -> Result<Purchase, EngineError> {
        self.ledger.ensure_mintable(caller)?;
        self.check_swap_path(path)?;
        let target = self.pricing.native_target(1)?;

        let router = self.router.as_mut().ok_or(EngineError::RouterNotSet)?;
        let quote = self.pricing.native_price(1, &*router, path)?;
        if value < quote {
            return Err(EngineError::InsufficientPayment { required: quote, available: value });
        }

        let amounts = router.swap_native_for_exact_tokens(target, path, self.fee_receiver, value)?;
        let paid = amounts.first().copied().unwrap_or(quote);
        self.finish_purchase(caller, Denomination::Native, paid, value.saturating_sub(paid))
    }

    /// Advance one level, paying `(level + 1) × step` in the secondary asset
    pub fn level_up(&mut self, caller: Address, token_id: TokenId) -> Result<LevelUp, EngineError> {
        self.ledger.ensure_owner(caller, token_id)?;
        let cost = self.pricing.level_up_cost(self.ledger.level_of(token_id)?)?;
        let next = self.ledger.plan_advance(token_id, 1, &[0; STAT_COUNT])?;

        self.secondary.transfer_from(self.address, caller, self.fee_receiver, cost)?;
        self.ledger.commit(next)?;

        info!(target: "character::engine", token_id, level = next.level, %cost, "Token leveled up");
        Ok(LevelUp { token_id, level: next.level, cost })
    }

    // ---------------------------------------------------------------------
    // Role-gated progression
    // ---------------------------------------------------------------------

    /// Add levels and stats without payment. Requires
    /// [`Role::ApprovedContract`].
    pub fn grant_progression(
        &mut self,
        caller: Address,
        token_id: TokenId,
        levels: u64,
        stat_deltas: Stats,
    ) -> Result<TokenState, EngineError> {
        self.access.ensure_role(Role::ApprovedContract, caller)?;
        let next = self.ledger.plan_advance(token_id, levels, &stat_deltas)?;
        self.ledger.commit(next)?;
        info!(target: "character::engine", %caller, token_id, levels, level = next.level, "Progression granted");
        Ok(next)
    }

    /// Raise level and stats to absolute values without payment. Lower values
    /// are rejected. Requires [`Role::ApprovedContract`].
    pub fn set_progression(
        &mut self,
        caller: Address,
        token_id: TokenId,
        level: u64,
        stats: Stats,
    ) -> Result<TokenState, EngineError> {
        self.access.ensure_role(Role::ApprovedContract, caller)?;
        let next = self.ledger.plan_set(token_id, level, &stats)?;
        self.ledger.commit(next)?;
        info!(target: "character::engine", %caller, token_id, level, "Progression set");
        Ok(next)
    }

    // ---------------------------------------------------------------------
    // Whitelist claims
    // ---------------------------------------------------------------------

    /// Whether `proof` shows `address` is whitelisted under the current root
    pub fn is_eligible(&self, address: Address, proof: &[B256]) -> bool {
        self.claims.is_eligible(address, proof)
    }

    /// Whether `address` already claimed under the current root
    pub fn is_claimed(&self, address: Address) -> bool {
        self.claims.is_claimed(address)
    }

    /// Claim the one token `caller` is entitled to
    pub fn claim(&mut self, caller: Address, proof: &[B256]) -> Result<TokenId, EngineError> {
        self.ledger.ensure_mintable(caller)?;
        let root = self.claims.check(caller, proof)?;
        let token_id = self.ledger.mint(caller)?;
        self.claims.consume(root, caller);
        info!(target: "character::engine", %caller, token_id, %root, "Whitelist claim");
        Ok(token_id)
    }

    // ---------------------------------------------------------------------
    // Views
    // ---------------------------------------------------------------------

    /// Level of a token
    pub fn level_of(&self, token_id: TokenId) -> Result<u64, EngineError> {
        self.ledger.level_of(token_id)
    }

    /// Level and stats of a token
    pub fn token_state(&self, token_id: TokenId) -> Result<TokenState, EngineError> {
        self.ledger.state(token_id)
    }

    /// Owner of a token
    pub fn owner_of(&self, token_id: TokenId) -> Result<Address, EngineError> {
        self.ledger.owner_of(token_id)
    }

    /// Number of tokens held by `owner`
    pub fn balance_of(&self, owner: Address) -> u64 {
        self.ledger.balance_of(owner)
    }

    /// Number of tokens minted
    pub fn total_supply(&self) -> u64 {
        self.ledger.total_supply()
    }

    /// Metadata URI of a token; empty while no base URI is set
    pub fn token_uri(&self, token_id: TokenId) -> Result<String, EngineError> {
        self.ledger.record(token_id)?;
        if self.base_uri.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("{}{}", self.base_uri, token_id))
    }

    /// Engine address buyers approve
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Current administrator
    pub const fn admin(&self) -> Address {
        self.access.admin()
    }

    /// Access-control table
    pub const fn access(&self) -> &AccessControl {
        &self.access
    }

    /// Stored prices
    pub const fn prices(&self) -> &PriceSchedule {
        self.pricing.schedule()
    }

    /// Recipient of payments
    pub const fn fee_receiver(&self) -> Address {
        self.fee_receiver
    }

    /// Metadata base URI
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Published whitelist root
    pub const fn merkle_root(&self) -> Option<B256> {
        self.claims.root()
    }

    /// Installed swap router
    pub const fn router(&self) -> Option<&R> {
        self.router.as_ref()
    }

    /// Primary asset collaborator
    pub const fn primary(&self) -> &A {
        &self.primary
    }

    /// Secondary asset collaborator
    pub const fn secondary(&self) -> &A {
        &self.secondary
    }

    /// Primary asset collaborator, for funding and approvals in simulations
    pub fn primary_mut(&mut self) -> &mut A {
        &mut self.primary
    }

    /// Secondary asset collaborator, for funding and approvals in simulations
    pub fn secondary_mut(&mut self) -> &mut A {
        &mut self.secondary
    }

    /// Installed swap router, mutable
    pub fn router_mut(&mut self) -> Option<&mut R> {
        self.router.as_mut()
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn check_swap_path(&self, path: &[Address]) -> Result<(), EngineError> {
        let primary = self.primary.address();
        match path {
            [start, .., end] if *start == self.wrapped_native && *end == primary => Ok(()),
            _ => Err(EngineError::InvalidSwapPath {
                expected_start: self.wrapped_native,
                expected_end: primary,
            }),
        }
    }

    fn finish_purchase(
        &mut self,
        buyer: Address,
        denomination: Denomination,
        paid: Amount,
        refund: Amount,
    ) -> Result<Purchase, EngineError> {
        let token_id = self.ledger.mint(buyer)?;
        info!(target: "character::engine", %buyer, token_id, %denomination, %paid, "Token purchased");
        if !refund.is_zero() {
            debug!(target: "character::engine", %buyer, %refund, "Native overpayment refunded");
        }
        Ok(Purchase { token_id, buyer, denomination, paid, refund })
    }
}
