//! Error types for tree construction and proof lookup

use alloy_primitives::Address;
use thiserror::Error;

/// Errors raised while building a tree or producing a proof.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerkleError {
    /// No leaves were supplied, so the tree has no root.
    #[error("cannot build a merkle tree from an empty whitelist")]
    EmptyLeafSet,

    /// A proof was requested for an address outside the committed set.
    #[error("address {0} is not part of the committed whitelist")]
    LeafNotFound(Address),

    /// The whitelist document could not be parsed.
    #[error("invalid whitelist document: {0}")]
    InvalidWhitelist(String),
}
