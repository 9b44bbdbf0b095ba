//! Keccak256 hasher for whitelist leaves and sorted-pair nodes

use alloy_primitives::{Address, B256};
use tiny_keccak::{Hasher, Keccak};

/// Keccak256 hasher
#[derive(Debug, Clone, Copy, Default)]
pub struct Keccak256Hasher;

impl Keccak256Hasher {
    /// Hash a single value
    pub fn hash(data: &[u8]) -> B256 {
        let mut hasher = Keccak::v256();
        hasher.update(data);
        let mut output = [0u8; 32];
        hasher.finalize(&mut output);
        B256::from(output)
    }

    /// Hash a whitelisted address into its leaf: the ABI encoding of a single
    /// `address`, left-padded with zeros to a 32-byte word.
    pub fn leaf(address: &Address) -> B256 {
        Self::hash(&abi_encode_address(address))
    }

    /// Hash two nodes together, smaller one first.
    pub fn node(a: &B256, b: &B256) -> B256 {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        let mut hasher = Keccak::v256();
        hasher.update(first.as_slice());
        hasher.update(second.as_slice());
        let mut output = [0u8; 32];
        hasher.finalize(&mut output);
        B256::from(output)
    }
}

/// Left-pad an address to a 32-byte ABI word.
pub fn abi_encode_address(address: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_slice());
    word
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};

    #[test]
    fn test_empty_input() {
        assert_eq!(
            Keccak256Hasher::hash(&[]),
            b256!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
        );
    }

    #[test]
    fn test_abi_padding() {
        let word = abi_encode_address(&address!("1111111111111111111111111111111111111111"));
        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(&word[12..], &[0x11u8; 20]);
    }

    #[test]
    fn test_leaf_golden() {
        assert_eq!(
            Keccak256Hasher::leaf(&address!("1111111111111111111111111111111111111111")),
            b256!("aafae41182fdefb0af836c3b506e127c7f229f33360c66de1139f4b0316f09d8")
        );
        assert_eq!(
            Keccak256Hasher::leaf(&address!("2222222222222222222222222222222222222222")),
            b256!("761d1673706b12d7996f463b3ee41f89445e41739a7b2688d9e00d8e45cf27f3")
        );
    }

    #[test]
    fn test_node_is_order_independent() {
        let left = B256::repeat_byte(1);
        let right = B256::repeat_byte(2);
        let hash = Keccak256Hasher::node(&left, &right);
        assert_eq!(hash, Keccak256Hasher::node(&right, &left));
        assert_ne!(hash, B256::ZERO);

        let mut concat = [0u8; 64];
        concat[..32].copy_from_slice(left.as_slice());
        concat[32..].copy_from_slice(right.as_slice());
        assert_eq!(hash, Keccak256Hasher::hash(&concat));
    }
}
