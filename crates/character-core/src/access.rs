//! Access-control table
//!
//! Administrative and granted-capability membership lives here and nowhere
//! else. Pricing and progression logic only ever asks [`CapabilityCheck`].

use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::EngineError;

/// Capability an administrator can grant to external callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Pre-approved game contract allowed to advance tokens without payment
    ApprovedContract,
}

impl Role {
    /// Returns the string representation of the role
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ApprovedContract => "approved_contract",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Yes/no capability predicate
pub trait CapabilityCheck {
    /// Whether `who` is the administrator
    fn is_admin(&self, who: Address) -> bool;

    /// Whether `who` holds `role`
    fn has_role(&self, role: Role, who: Address) -> bool;

    /// Fail unless `who` is the administrator
    fn ensure_admin(&self, who: Address) -> Result<(), EngineError> {
        if self.is_admin(who) {
            Ok(())
        } else {
            warn!(target: "character::access", caller = %who, "Rejected non-admin caller");
            Err(EngineError::NotAdmin { caller: who })
        }
    }

    /// Fail unless `who` holds `role`
    fn ensure_role(&self, role: Role, who: Address) -> Result<(), EngineError> {
        if self.has_role(role, who) {
            Ok(())
        } else {
            warn!(target: "character::access", caller = %who, %role, "Rejected caller without capability");
            Err(EngineError::MissingRole { caller: who, role })
        }
    }
}

/// Administrator plus granted capability sets
#[derive(Debug, Clone)]
pub struct AccessControl {
    admin: Address,
    members: HashMap<Role, HashSet<Address>>,
}

impl AccessControl {
    /// Create a table administered by `admin`
    pub fn new(admin: Address) -> Result<Self, EngineError> {
        if admin.is_zero() {
            return Err(EngineError::ZeroAddress("admin"));
        }
        Ok(Self { admin, members: HashMap::new() })
    }

    /// Current administrator
    pub const fn admin(&self) -> Address {
        self.admin
    }

    /// Grant `role` to `who`
    pub fn grant(&mut self, caller: Address, role: Role, who: Address) -> Result<(), EngineError> {
        self.ensure_admin(caller)?;
        if who.is_zero() {
            return Err(EngineError::ZeroAddress("role member"));
        }
        if self.members.entry(role).or_default().insert(who) {
            info!(target: "character::access", %role, member = %who, "Granted capability");
        }
        Ok(())
    }

    /// Revoke `role` from `who`
    pub fn revoke(&mut self, caller: Address, role: Role, who: Address) -> Result<(), EngineError> {
        self.ensure_admin(caller)?;
        if self.members.get_mut(&role).is_some_and(|set| set.remove(&who)) {
            info!(target: "character::access", %role, member = %who, "Revoked capability");
        }
        Ok(())
    }

    /// Hand the administrator role to `new_admin`
    pub fn transfer_admin(&mut self, caller: Address, new_admin: Address) -> Result<(), EngineError> {
        self.ensure_admin(caller)?;
        if new_admin.is_zero() {
            return Err(EngineError::ZeroAddress("admin"));
        }
        info!(target: "character::access", from = %self.admin, to = %new_admin, "Transferred administration");
        self.admin = new_admin;
        Ok(())
    }

    /// Holders of `role`
    pub fn members(&self, role: Role) -> impl Iterator<Item = Address> + '_ {
        self.members.get(&role).into_iter().flatten().copied()
    }
}

impl CapabilityCheck for AccessControl {
    fn is_admin(&self, who: Address) -> bool {
        who == self.admin
    }

    fn has_role(&self, role: Role, who: Address) -> bool {
        self.members.get(&role).is_some_and(|set| set.contains(&who))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: Address = Address::repeat_byte(1);
    const GAME: Address = Address::repeat_byte(2);
    const ALICE: Address = Address::repeat_byte(3);

    #[test]
    fn test_grant_and_revoke() {
        let mut access = AccessControl::new(ADMIN).unwrap();
        assert!(!access.has_role(Role::ApprovedContract, GAME));

        access.grant(ADMIN, Role::ApprovedContract, GAME).unwrap();
        access.grant(ADMIN, Role::ApprovedContract, ALICE).unwrap();
        assert!(access.has_role(Role::ApprovedContract, GAME));
        assert_eq!(access.members(Role::ApprovedContract).count(), 2);

        access.revoke(ADMIN, Role::ApprovedContract, GAME).unwrap();
        assert!(!access.has_role(Role::ApprovedContract, GAME));
        assert!(access.ensure_role(Role::ApprovedContract, ALICE).is_ok());
    }

    #[test]
    fn test_non_admin_cannot_grant() {
        let mut access = AccessControl::new(ADMIN).unwrap();
        assert_eq!(
            access.grant(ALICE, Role::ApprovedContract, ALICE),
            Err(EngineError::NotAdmin { caller: ALICE })
        );
        assert!(!access.has_role(Role::ApprovedContract, ALICE));
    }

    #[test]
    fn test_transfer_admin() {
        let mut access = AccessControl::new(ADMIN).unwrap();
        assert_eq!(access.transfer_admin(ADMIN, Address::ZERO), Err(EngineError::ZeroAddress("admin")));

        access.transfer_admin(ADMIN, ALICE).unwrap();
        assert!(access.is_admin(ALICE));
        assert!(access.ensure_admin(ADMIN).is_err());
    }
}
