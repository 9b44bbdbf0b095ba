//! Price table for minting and leveling

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::EngineError,
    swap::SwapRouter,
    types::{units, Amount, Denomination},
};

/// Stored prices, all in 18-decimal base units
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSchedule {
    /// Unit price in the primary asset. A native purchase sources this
    /// amount of the primary asset through the router.
    pub primary: Amount,
    /// Unit price in the secondary asset
    pub secondary: Amount,
    /// Secondary-asset cost per level when leveling up
    pub level_step: Amount,
}

impl Default for PriceSchedule {
    fn default() -> Self {
        Self { primary: units(1000), secondary: units(100), level_step: units(10) }
    }
}

/// Current prices per rail
#[derive(Clone, Debug, Default)]
pub struct PricingTable {
    schedule: PriceSchedule,
}

impl PricingTable {
    /// Create a table from a schedule
    pub const fn new(schedule: PriceSchedule) -> Self {
        Self { schedule }
    }

    /// Stored schedule
    pub const fn schedule(&self) -> &PriceSchedule {
        &self.schedule
    }

    /// Stored unit price of a token rail. The native rail has no stored
    /// price.
    pub fn unit_price(&self, denomination: Denomination) -> Result<Amount, EngineError> {
        match denomination {
            Denomination::Primary => Ok(self.schedule.primary),
            Denomination::Secondary => Ok(self.schedule.secondary),
            Denomination::Native => Err(EngineError::UnsupportedDenomination(denomination.to_string())),
        }
    }

    /// Replace the stored unit price of a token rail
    pub fn set_price(&mut self, denomination: Denomination, value: Amount) -> Result<(), EngineError> {
        match denomination {
            Denomination::Primary => self.schedule.primary = value,
            Denomination::Secondary => self.schedule.secondary = value,
            Denomination::Native => {
                return Err(EngineError::UnsupportedDenomination(denomination.to_string()))
            }
        }
        Ok(())
    }

    /// Replace the per-level step
    pub fn set_price_step(&mut self, value: Amount) {
        self.schedule.level_step = value;
    }

    /// Stored unit price times `quantity`
    pub fn flat_price(&self, denomination: Denomination, quantity: u64) -> Result<Amount, EngineError> {
        self.unit_price(denomination)?
            .checked_mul(U256::from(quantity))
            .ok_or(EngineError::Overflow("price"))
    }

    /// Primary asset a native purchase of `quantity` units must deliver
    pub fn native_target(&self, quantity: u64) -> Result<Amount, EngineError> {
        self.flat_price(Denomination::Primary, quantity)
    }

    /// Native currency needed for `quantity` units, quoted fresh from `router`
    pub fn native_price<R>(&self, quantity: u64, router: &R, path: &[Address]) -> Result<Amount, EngineError>
    where
        R: SwapRouter + ?Sized,
    {
        let target = self.native_target(quantity)?;
        let amounts = router.get_amounts_in(target, path)?;
        let quote = amounts.first().copied().unwrap_or_default();
        debug!(target: "character::pricing", quantity, %target, %quote, "Quoted native price");
        Ok(quote)
    }

    /// Price of `quantity` units in `denomination`
    pub fn price_for<R>(
        &self,
        denomination: Denomination,
        quantity: u64,
        router: Option<&R>,
        path: &[Address],
    ) -> Result<Amount, EngineError>
    where
        R: SwapRouter + ?Sized,
    {
        match denomination {
            Denomination::Primary | Denomination::Secondary => self.flat_price(denomination, quantity),
            Denomination::Native => {
                let router = router.ok_or(EngineError::RouterNotSet)?;
                self.native_price(quantity, router, path)
            }
        }
    }

    /// Secondary-asset cost of leveling from `current_level` to the next
    /// level: the resulting level times the step.
    pub fn level_up_cost(&self, current_level: u64) -> Result<Amount, EngineError> {
        let next = current_level.checked_add(1).ok_or(EngineError::Overflow("level"))?;
        self.schedule
            .level_step
            .checked_mul(U256::from(next))
            .ok_or(EngineError::Overflow("level-up cost"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swap::{get_amount_in, ConstantProductRouter};

    #[test]
    fn test_flat_prices() {
        let table = PricingTable::default();
        assert_eq!(table.flat_price(Denomination::Primary, 1).unwrap(), units(1000));
        assert_eq!(table.flat_price(Denomination::Secondary, 3).unwrap(), units(300));
        assert_eq!(
            table
                .price_for::<ConstantProductRouter>(Denomination::Secondary, 2, None, &[])
                .unwrap(),
            units(200)
        );
    }

    #[test]
    fn test_level_up_cost() {
        let table = PricingTable::default();
        assert_eq!(table.level_up_cost(0).unwrap(), units(10));
        assert_eq!(table.level_up_cost(3).unwrap(), units(40));
        assert_eq!(table.level_up_cost(u64::MAX), Err(EngineError::Overflow("level")));
    }

    #[test]
    fn test_zero_price_still_quotes() {
        let mut table = PricingTable::default();
        table.set_price(Denomination::Primary, U256::ZERO).unwrap();
        assert_eq!(table.flat_price(Denomination::Primary, 5).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_native_price_from_router() {
        let wnative = Address::repeat_byte(0x0d);
        let game = Address::repeat_byte(0x6a);
        let mut router = ConstantProductRouter::new(Address::repeat_byte(0xa5), wnative);
        router.add_liquidity(wnative, units(29), game, units(678_579)).unwrap();

        let table = PricingTable::default();
        let quote = table.price_for(Denomination::Native, 2, Some(&router), &[wnative, game]).unwrap();
        assert_eq!(quote, get_amount_in(units(2000), units(29), units(678_579)).unwrap());
    }

    #[test]
    fn test_native_price_needs_router() {
        let table = PricingTable::default();
        assert_eq!(
            table.price_for::<ConstantProductRouter>(Denomination::Native, 1, None, &[]),
            Err(EngineError::RouterNotSet)
        );
    }

    #[test]
    fn test_setters() {
        let mut table = PricingTable::default();
        table.set_price(Denomination::Secondary, units(500)).unwrap();
        table.set_price_step(units(25));
        assert_eq!(table.unit_price(Denomination::Secondary).unwrap(), units(500));
        assert_eq!(table.level_up_cost(1).unwrap(), units(50));
    }

    #[test]
    fn test_native_has_no_stored_price() {
        let mut table = PricingTable::default();
        assert!(matches!(
            table.set_price(Denomination::Native, units(500)),
            Err(EngineError::UnsupportedDenomination(_))
        ));
        assert!(table.unit_price(Denomination::Native).is_err());
        assert_eq!(table.schedule(), &PriceSchedule::default());
    }

    #[test]
    fn test_native_target_follows_primary_price() {
        let mut table = PricingTable::default();
        assert_eq!(table.native_target(2).unwrap(), units(2000));
        table.set_price(Denomination::Primary, units(1500)).unwrap();
        assert_eq!(table.native_target(2).unwrap(), units(3000));
    }
}
