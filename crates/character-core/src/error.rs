//! Engine error types

use alloy_primitives::Address;
use character_merkle::MerkleError;
use thiserror::Error;

use crate::{
    access::Role,
    asset::AssetError,
    swap::SwapError,
    types::{Amount, TokenId},
};

/// Error category surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller lacks the administrative role or a granted capability
    Authorization,
    /// Membership proof did not verify
    NotEligible,
    /// Entitlement was already consumed
    AlreadyClaimed,
    /// Supplied or approved funds are below the price
    InsufficientPayment,
    /// Malformed or forbidden argument
    InvalidParameter,
    /// Referenced item does not exist
    NotFound,
    /// An external collaborator failed
    Collaborator,
}

/// Errors returned by engine operations. A rejected operation never leaves
/// partial state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Caller is not the administrator
    #[error("{caller} is not the administrator")]
    NotAdmin {
        /// Rejected caller
        caller: Address,
    },

    /// Caller does not hold the required capability
    #[error("{caller} lacks the {role} capability")]
    MissingRole {
        /// Rejected caller
        caller: Address,
        /// Capability required by the operation
        role: Role,
    },

    /// Caller does not own the token
    #[error("{caller} does not own token {token_id}")]
    NotTokenOwner {
        /// Rejected caller
        caller: Address,
        /// Token the caller tried to act on
        token_id: TokenId,
    },

    /// Proof does not verify against the published root
    #[error("{0} is not eligible under the published root")]
    NotEligible(Address),

    /// Proof is valid but the entitlement was already used
    #[error("{0} already claimed under the published root")]
    AlreadyClaimed(Address),

    /// Funds below the price at execution time
    #[error("insufficient payment: required {required}, available {available}")]
    InsufficientPayment {
        /// Price quoted at execution time
        required: Amount,
        /// Funds the caller made available
        available: Amount,
    },

    /// Zero address given where a real collaborator is required
    #[error("{0} must not be the zero address")]
    ZeroAddress(&'static str),

    /// Denomination tag outside the accepted rails
    #[error("unsupported denomination: {0}")]
    UnsupportedDenomination(String),

    /// No entitlement root has been published
    #[error("no merkle root has been published")]
    NoMerkleRoot,

    /// Native purchase attempted without a swap router
    #[error("swap router is not configured")]
    RouterNotSet,

    /// Swap path does not lead from wrapped native to the primary asset
    #[error("swap path must start at {expected_start} and end at {expected_end}")]
    InvalidSwapPath {
        /// Wrapped native currency
        expected_start: Address,
        /// Primary asset
        expected_end: Address,
    },

    /// Administrative value would lower a token's level or stats
    #[error("progression of token {0} cannot decrease")]
    ProgressionDecrease(TokenId),

    /// Arithmetic overflow in a price or progression computation
    #[error("arithmetic overflow while computing {0}")]
    Overflow(&'static str),

    /// Token does not exist
    #[error("token {0} does not exist")]
    TokenNotFound(TokenId),

    /// Tree construction or proof lookup failed
    #[error(transparent)]
    Merkle(#[from] MerkleError),

    /// Swap router failed
    #[error("swap failed: {0}")]
    Swap(#[from] SwapError),

    /// Fungible asset collaborator failed for a reason other than funds
    #[error("asset transfer failed: {0}")]
    Asset(AssetError),
}

impl EngineError {
    /// Category of this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAdmin { .. } | Self::MissingRole { .. } | Self::NotTokenOwner { .. } => {
                ErrorKind::Authorization
            }
            Self::NotEligible(_) => ErrorKind::NotEligible,
            Self::AlreadyClaimed(_) => ErrorKind::AlreadyClaimed,
            Self::InsufficientPayment { .. } => ErrorKind::InsufficientPayment,
            Self::ZeroAddress(_) |
            Self::UnsupportedDenomination(_) |
            Self::NoMerkleRoot |
            Self::RouterNotSet |
            Self::InvalidSwapPath { .. } |
            Self::ProgressionDecrease(_) |
            Self::Overflow(_) |
            Self::Merkle(MerkleError::EmptyLeafSet | MerkleError::InvalidWhitelist(_)) => {
                ErrorKind::InvalidParameter
            }
            Self::TokenNotFound(_) | Self::Merkle(MerkleError::LeafNotFound(_)) => {
                ErrorKind::NotFound
            }
            Self::Swap(_) | Self::Asset(_) => ErrorKind::Collaborator,
        }
    }
}

impl From<AssetError> for EngineError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::InsufficientBalance { required, available } |
            AssetError::InsufficientAllowance { required, available } => {
                Self::InsufficientPayment { required, available }
            }
            other => Self::Asset(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    #[test]
    fn test_funds_errors_become_payment_errors() {
        let err = EngineError::from(AssetError::InsufficientAllowance {
            required: U256::from(10),
            available: U256::from(3),
        });
        assert_eq!(err.kind(), ErrorKind::InsufficientPayment);
        assert_eq!(err.to_string(), "insufficient payment: required 10, available 3");
    }

    #[test]
    fn test_kinds() {
        assert_eq!(EngineError::NotAdmin { caller: Address::ZERO }.kind(), ErrorKind::Authorization);
        assert_eq!(EngineError::Merkle(MerkleError::EmptyLeafSet).kind(), ErrorKind::InvalidParameter);
        assert_eq!(
            EngineError::Merkle(MerkleError::LeafNotFound(Address::ZERO)).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(EngineError::ZeroAddress("fee receiver").kind(), ErrorKind::InvalidParameter);
    }
}
