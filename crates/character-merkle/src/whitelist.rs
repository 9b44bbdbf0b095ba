//! Whitelist input records

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::{MerkleError, MerkleTree};

/// One eligibility record supplied by the off-chain whitelist process
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WhitelistEntry {
    /// Eligible wallet
    pub wallet: Address,
}

impl From<Address> for WhitelistEntry {
    fn from(wallet: Address) -> Self {
        Self { wallet }
    }
}

/// Ordered whitelist as delivered, e.g. `[{"wallet": "0x..."}, ...]`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Whitelist {
    /// Records in delivery order, possibly with duplicates
    pub entries: Vec<WhitelistEntry>,
}

impl Whitelist {
    /// Parse a JSON whitelist document.
    pub fn from_json(json: &str) -> Result<Self, MerkleError> {
        serde_json::from_str(json).map_err(|e| MerkleError::InvalidWhitelist(e.to_string()))
    }

    /// Commit to this whitelist.
    pub fn commit(&self) -> Result<MerkleTree, MerkleError> {
        MerkleTree::from_whitelist(&self.entries)
    }

    /// Number of records, duplicates included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no record was supplied
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Address> for Whitelist {
    fn from_iter<T: IntoIterator<Item = Address>>(iter: T) -> Self {
        Self { entries: iter.into_iter().map(WhitelistEntry::from).collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_parse_document() {
        let json = r#"[
            {"wallet": "0x1111111111111111111111111111111111111111"},
            {"wallet": "0x2222222222222222222222222222222222222222"}
        ]"#;
        let whitelist = Whitelist::from_json(json).unwrap();
        assert_eq!(whitelist.len(), 2);
        assert_eq!(whitelist.entries[1].wallet, address!("2222222222222222222222222222222222222222"));

        let expected: Whitelist = [
            address!("1111111111111111111111111111111111111111"),
            address!("2222222222222222222222222222222222222222"),
        ]
        .into_iter()
        .collect();
        assert_eq!(whitelist.commit().unwrap().root(), expected.commit().unwrap().root());
    }

    #[test]
    fn test_rejects_malformed_wallet() {
        let err = Whitelist::from_json(r#"[{"wallet": "0x1234"}]"#).unwrap_err();
        assert!(matches!(err, MerkleError::InvalidWhitelist(_)));
    }

    #[test]
    fn test_empty_document() {
        let whitelist = Whitelist::from_json("[]").unwrap();
        assert!(whitelist.is_empty());
        assert_eq!(whitelist.commit(), Err(MerkleError::EmptyLeafSet));
    }
}
