//! One-time entitlement claims against a published whitelist root

use std::collections::HashSet;

use alloy_primitives::{Address, B256};
use character_merkle::ProofVerifier;

use crate::error::EngineError;

/// Published root and consumed entitlements
#[derive(Clone, Debug, Default)]
pub struct ClaimRegistry {
    root: Option<B256>,
    /// Consumed entitlements, per root
    claimed: HashSet<(B256, Address)>,
}

impl ClaimRegistry {
    /// Create a registry with no root published
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently published root
    pub const fn root(&self) -> Option<B256> {
        self.root
    }

    /// Publish a new root. Entitlements consumed under earlier roots stay
    /// consumed for those roots only.
    pub fn publish(&mut self, root: B256) {
        self.root = Some(root);
    }

    /// Whether `address` already claimed under the current root
    pub fn is_claimed(&self, address: Address) -> bool {
        self.root.is_some_and(|root| self.claimed.contains(&(root, address)))
    }

    /// Whether `proof` shows `address` is in the current whitelist
    pub fn is_eligible(&self, address: Address, proof: &[B256]) -> bool {
        self.root.is_some_and(|root| ProofVerifier::verify(&address, proof, &root))
    }

    /// Check a claim without consuming it. An invalid proof and a spent
    /// entitlement are reported separately.
    pub fn check(&self, address: Address, proof: &[B256]) -> Result<B256, EngineError> {
        let root = self.root.ok_or(EngineError::NoMerkleRoot)?;
        if !ProofVerifier::verify(&address, proof, &root) {
            return Err(EngineError::NotEligible(address));
        }
        if self.claimed.contains(&(root, address)) {
            return Err(EngineError::AlreadyClaimed(address));
        }
        Ok(root)
    }

    /// Mark a checked entitlement as consumed
    pub fn consume(&mut self, root: B256, address: Address) {
        self.claimed.insert((root, address));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use character_merkle::MerkleTree;

    const ALICE: Address = Address::repeat_byte(1);
    const BOB: Address = Address::repeat_byte(2);
    const MALLORY: Address = Address::repeat_byte(9);

    #[test]
    fn test_claim_once() {
        let tree = MerkleTree::new([ALICE, BOB]).unwrap();
        let mut registry = ClaimRegistry::new();
        let proof = tree.proof(&ALICE).unwrap();

        assert_eq!(registry.check(ALICE, &proof.siblings), Err(EngineError::NoMerkleRoot));
        registry.publish(tree.root());

        let root = registry.check(ALICE, &proof.siblings).unwrap();
        registry.consume(root, ALICE);
        assert!(registry.is_claimed(ALICE));
        assert!(registry.is_eligible(ALICE, &proof.siblings));
        assert_eq!(registry.check(ALICE, &proof.siblings), Err(EngineError::AlreadyClaimed(ALICE)));
    }

    #[test]
    fn test_invalid_proof_is_not_eligible() {
        let tree = MerkleTree::new([ALICE, BOB]).unwrap();
        let mut registry = ClaimRegistry::new();
        registry.publish(tree.root());

        let alice_proof = tree.proof(&ALICE).unwrap();
        assert_eq!(
            registry.check(MALLORY, &alice_proof.siblings),
            Err(EngineError::NotEligible(MALLORY))
        );
        assert!(!registry.is_eligible(MALLORY, &alice_proof.siblings));
    }

    #[test]
    fn test_new_root_opens_new_epoch() {
        let first = MerkleTree::new([ALICE, BOB]).unwrap();
        let second = MerkleTree::new([ALICE, MALLORY]).unwrap();
        let mut registry = ClaimRegistry::new();

        registry.publish(first.root());
        let root = registry.check(ALICE, &first.proof(&ALICE).unwrap().siblings).unwrap();
        registry.consume(root, ALICE);

        registry.publish(second.root());
        assert!(!registry.is_claimed(ALICE));
        let proof = second.proof(&ALICE).unwrap();
        assert_eq!(registry.check(ALICE, &proof.siblings).unwrap(), second.root());
        assert_eq!(
            registry.check(BOB, &first.proof(&BOB).unwrap().siblings),
            Err(EngineError::NotEligible(BOB))
        );
    }
}
