//! Whitelist commitments for character NFT distribution
//!
//! This crate builds the Merkle root that is published next to the NFT
//! collection and verifies membership claims against it:
//! - Leaf: keccak256 of the ABI-encoded (left-padded) wallet address
//! - Node: keccak256 of both children, smaller hash first
//! - Leaves are deduplicated and sorted; an unpaired node is promoted

mod error;
mod hasher;
mod proof;
mod tree;
mod whitelist;

pub use error::MerkleError;
pub use hasher::{abi_encode_address, Keccak256Hasher};
pub use proof::{MerkleProof, ProofVerifier};
pub use tree::MerkleTree;
pub use whitelist::{Whitelist, WhitelistEntry};

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;

    #[test]
    fn test_build_and_verify() {
        let whitelist: Whitelist = (1u8..=5).map(Address::with_last_byte).collect();
        let tree = whitelist.commit().unwrap();
        let root = tree.root();

        let wallet = Address::with_last_byte(3);
        let proof = tree.proof(&wallet).unwrap();
        assert!(proof.verify(&root, &wallet));
        assert!(!proof.verify(&root, &Address::with_last_byte(6)));
    }
}
