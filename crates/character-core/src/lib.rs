//! Character NFT pricing and progression engine
//!
//! This crate holds the accounting that sits behind a character collection:
//! - Pricing on three rails (primary asset, secondary asset, native currency
//!   quoted through a swap router)
//! - Paid mints and level-ups, collected through transfer-on-behalf
//! - Role-gated progression grants that never lower a token's level or stats
//! - Admin airdrops and one-time whitelist claims against a published
//!   [`character_merkle`] root

pub mod access;
pub mod asset;
pub mod claims;
pub mod config;
pub mod engine;
pub mod error;
pub mod pricing;
pub mod progression;
pub mod swap;
pub mod types;

pub use access::{AccessControl, CapabilityCheck, Role};
pub use asset::{AssetError, FungibleAsset, TokenLedger};
pub use claims::ClaimRegistry;
pub use config::CharacterConfig;
pub use engine::Character;
pub use error::{EngineError, ErrorKind};
pub use pricing::{PriceSchedule, PricingTable};
pub use progression::{ProgressionLedger, TokenRecord};
pub use swap::{ConstantProductRouter, SwapError, SwapRouter};
pub use types::*;
