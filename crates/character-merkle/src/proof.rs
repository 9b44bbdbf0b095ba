//! Inclusion proofs and stateless verification

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::hasher::Keccak256Hasher;

/// Inclusion proof for one whitelisted address
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Sibling hashes from the leaf level up to just below the root
    pub siblings: Vec<B256>,
}

impl MerkleProof {
    /// Wrap an ordered list of sibling hashes.
    pub const fn new(siblings: Vec<B256>) -> Self {
        Self { siblings }
    }

    /// Number of hashing steps between leaf and root
    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    /// Whether the proof has no siblings (single-leaf tree)
    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }

    /// Verify this proof for `address` against a published root
    pub fn verify(&self, root: &B256, address: &Address) -> bool {
        ProofVerifier::verify(address, &self.siblings, root)
    }

    /// Root implied by this proof for `address`
    pub fn compute_root(&self, address: &Address) -> B256 {
        ProofVerifier::compute_root(Keccak256Hasher::leaf(address), &self.siblings)
    }
}

impl From<Vec<B256>> for MerkleProof {
    fn from(siblings: Vec<B256>) -> Self {
        Self::new(siblings)
    }
}

/// Sorted-pair proof verifier.
///
/// Holds no state: a relying party needs only the published root, the
/// claimed address and the proof. Sibling position is never consulted
/// because every node hashes its children in ascending order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProofVerifier;

impl ProofVerifier {
    /// Check that `address` is committed under `root`.
    pub fn verify(address: &Address, proof: &[B256], root: &B256) -> bool {
        Self::compute_root(Keccak256Hasher::leaf(address), proof) == *root
    }

    /// Fold a leaf hash up through its siblings.
    pub fn compute_root(leaf: B256, proof: &[B256]) -> B256 {
        proof
            .iter()
            .fold(leaf, |acc, sibling| Keccak256Hasher::node(&acc, sibling))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_empty_proof_is_leaf() {
        let wallet = address!("1111111111111111111111111111111111111111");
        let proof = MerkleProof::default();
        assert!(proof.is_empty());
        assert!(proof.verify(&Keccak256Hasher::leaf(&wallet), &wallet));
    }

    #[test]
    fn test_rejects_wrong_root() {
        let wallet = address!("1111111111111111111111111111111111111111");
        let proof = MerkleProof::new(vec![B256::repeat_byte(7)]);
        let root = proof.compute_root(&wallet);
        assert!(proof.verify(&root, &wallet));
        assert!(!proof.verify(&B256::ZERO, &wallet));
        assert!(!proof.verify(&root, &address!("2222222222222222222222222222222222222222")));
    }

    #[test]
    fn test_proof_json_shape() {
        let proof = MerkleProof::new(vec![B256::repeat_byte(0xab)]);
        let json = serde_json::to_string(&proof).unwrap();
        assert!(json.contains(&format!("0x{}", "ab".repeat(32))));
        let back: MerkleProof = serde_json::from_str(&json).unwrap();
        assert_eq!(back, proof);
    }
}
