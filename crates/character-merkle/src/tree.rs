//! Sorted-pair Merkle tree over whitelisted addresses

use std::collections::BTreeSet;

use alloy_primitives::{Address, B256};
use tracing::debug;

use crate::{hasher::Keccak256Hasher, proof::MerkleProof, whitelist::WhitelistEntry, MerkleError};

/// Immutable Merkle tree committing to a set of addresses.
///
/// Leaves are deduplicated and sorted before hashing, so any ordering of the
/// same address set yields the same root. An unpaired node at the end of a
/// level is promoted to the next level unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleTree {
    /// Node layers, `layers[0]` being the sorted leaf hashes and the last
    /// layer holding only the root
    layers: Vec<Vec<B256>>,
}

impl MerkleTree {
    /// Build a tree from whitelisted addresses.
    pub fn new<I>(addresses: I) -> Result<Self, MerkleError>
    where
        I: IntoIterator<Item = Address>,
    {
        let mut supplied = 0usize;
        let leaves = addresses
            .into_iter()
            .inspect(|_| supplied += 1)
            .map(|address| Keccak256Hasher::leaf(&address));
        let tree = Self::from_leaf_hashes(leaves)?;

        let dropped = supplied - tree.leaf_count();
        if dropped > 0 {
            debug!(target: "character::merkle", dropped, "Collapsed duplicate whitelist addresses");
        }
        Ok(tree)
    }

    /// Build a tree from whitelist records.
    pub fn from_whitelist(entries: &[WhitelistEntry]) -> Result<Self, MerkleError> {
        Self::new(entries.iter().map(|entry| entry.wallet))
    }

    /// Build a tree from already-hashed leaves.
    pub fn from_leaf_hashes<I>(leaves: I) -> Result<Self, MerkleError>
    where
        I: IntoIterator<Item = B256>,
    {
        let leaves: Vec<B256> = leaves.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
        if leaves.is_empty() {
            return Err(MerkleError::EmptyLeafSet);
        }

        let mut layers = vec![leaves];
        while let Some(level) = layers.last().filter(|level| level.len() > 1) {
            let parent: Vec<B256> = level
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => Keccak256Hasher::node(left, right),
                    _ => pair[0],
                })
                .collect();
            layers.push(parent);
        }

        let tree = Self { layers };
        debug!(
            target: "character::merkle",
            leaves = tree.leaf_count(),
            depth = tree.depth(),
            root = %tree.root(),
            "Built whitelist merkle tree"
        );
        Ok(tree)
    }

    /// Get the root hash
    pub fn root(&self) -> B256 {
        // A tree always holds at least one leaf, so the top layer is non-empty.
        self.layers.last().and_then(|top| top.first()).copied().unwrap_or_default()
    }

    /// Number of distinct leaves
    pub fn leaf_count(&self) -> usize {
        self.layers[0].len()
    }

    /// Number of hashing levels above the leaves
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }

    /// Sorted leaf hashes
    pub fn leaves(&self) -> &[B256] {
        &self.layers[0]
    }

    /// All node layers, leaves first
    pub fn layers(&self) -> &[Vec<B256>] {
        &self.layers
    }

    /// Whether `address` is committed in this tree
    pub fn contains(&self, address: &Address) -> bool {
        self.position(&Keccak256Hasher::leaf(address)).is_some()
    }

    /// Generate a proof for an address
    pub fn proof(&self, address: &Address) -> Result<MerkleProof, MerkleError> {
        self.proof_for_leaf(&Keccak256Hasher::leaf(address))
            .ok_or(MerkleError::LeafNotFound(*address))
    }

    /// Generate a proof for an already-hashed leaf
    pub fn proof_for_leaf(&self, leaf: &B256) -> Option<MerkleProof> {
        let mut index = self.position(leaf)?;
        let mut siblings = Vec::with_capacity(self.depth());

        // Walk from leaf to root, collecting sibling hashes
        for level in &self.layers[..self.depth()] {
            let sibling = index ^ 1;
            if let Some(hash) = level.get(sibling) {
                siblings.push(*hash);
            }
            index /= 2;
        }

        Some(MerkleProof::new(siblings))
    }

    fn position(&self, leaf: &B256) -> Option<usize> {
        self.leaves().binary_search(leaf).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProofVerifier;
    use alloy_primitives::{address, b256};

    const ALICE: Address = address!("1111111111111111111111111111111111111111");
    const BOB: Address = address!("2222222222222222222222222222222222222222");
    const CAROL: Address = address!("3333333333333333333333333333333333333333");
    const DAVE: Address = address!("4444444444444444444444444444444444444444");

    #[test]
    fn test_empty_whitelist() {
        assert_eq!(MerkleTree::new(Vec::new()), Err(MerkleError::EmptyLeafSet));
    }

    #[test]
    fn test_golden_roots() {
        let single = MerkleTree::new([ALICE]).unwrap();
        assert_eq!(single.root(), Keccak256Hasher::leaf(&ALICE));
        assert_eq!(single.depth(), 0);

        let pair = MerkleTree::new([ALICE, BOB]).unwrap();
        assert_eq!(
            pair.root(),
            b256!("6a486616bc86091cacdd17307700bf13d1d2c65a67fec41bccab081f8f7b4fb2")
        );

        let odd = MerkleTree::new([ALICE, BOB, CAROL]).unwrap();
        assert_eq!(
            odd.root(),
            b256!("a81bc8d1019ebdab2e8e76c82326c2b8c90eee20914b948d60893d2cf7d9536c")
        );

        let full = MerkleTree::new([ALICE, BOB, CAROL, DAVE]).unwrap();
        assert_eq!(
            full.root(),
            b256!("81f6421669641d479d1b0b96d2e6f9a204486ea5b4799a53fb66af962e44aec8")
        );
    }

    #[test]
    fn test_odd_node_is_promoted() {
        let tree = MerkleTree::new([ALICE, BOB, CAROL]).unwrap();
        let leaves = tree.leaves();
        assert_eq!(tree.layers()[1].len(), 2);
        assert_eq!(tree.layers()[1][1], leaves[2]);
        assert_eq!(
            tree.root(),
            Keccak256Hasher::node(&Keccak256Hasher::node(&leaves[0], &leaves[1]), &leaves[2])
        );
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let a = MerkleTree::new([ALICE, BOB, CAROL, DAVE]).unwrap();
        let b = MerkleTree::new([DAVE, BOB, ALICE, CAROL]).unwrap();
        assert_eq!(a.root(), b.root());
    }

    #[test]
    fn test_duplicates_collapse() {
        let deduped = MerkleTree::new([ALICE, BOB, ALICE, BOB, BOB]).unwrap();
        assert_eq!(deduped.leaf_count(), 2);
        assert_eq!(deduped.root(), MerkleTree::new([ALICE, BOB]).unwrap().root());
    }

    #[test]
    fn test_every_leaf_verifies() {
        let wallets: Vec<Address> = (1u8..=11).map(Address::repeat_byte).collect();
        let tree = MerkleTree::new(wallets.clone()).unwrap();
        let root = tree.root();

        for wallet in &wallets {
            let proof = tree.proof(wallet).unwrap();
            assert!(proof.len() <= tree.depth());
            assert!(ProofVerifier::verify(wallet, &proof.siblings, &root));
        }
    }

    #[test]
    fn test_proof_for_absent_address() {
        let tree = MerkleTree::new([ALICE, BOB]).unwrap();
        assert!(!tree.contains(&CAROL));
        assert_eq!(tree.proof(&CAROL), Err(MerkleError::LeafNotFound(CAROL)));
    }

    #[test]
    fn test_foreign_proof_fails() {
        let tree = MerkleTree::new([ALICE, BOB, CAROL]).unwrap();
        let root = tree.root();
        let alice_proof = tree.proof(&ALICE).unwrap();
        assert!(!alice_proof.verify(&root, &DAVE));
        assert!(!alice_proof.verify(&root, &BOB));
    }

    #[test]
    fn test_changing_one_address_changes_root() {
        let original = MerkleTree::new([ALICE, BOB, CAROL]).unwrap();
        let mutated = MerkleTree::new([ALICE, BOB, DAVE]).unwrap();
        assert_ne!(original.root(), mutated.root());
    }
}
