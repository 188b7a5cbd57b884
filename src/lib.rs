//! Pegnode - price-anchored supply absorption and an embedded order book.
//!
//! Miners report a market price in every block header. Once per epoch, or
//! earlier when the price moves sharply, the node absorbs the deviation by
//! minting or burning supply spread over the following blocks. Orders that
//! swap the two native tokens wait in an order book until a block settles
//! them against that supply change.
//!
//! # Modules
//!
//! - [`chain`] - Block index with parent links and network parameters
//! - [`absorption`] - Price oracle, absorption trigger and supply calculator
//! - [`feed`] - Latest market price offered to miners
//! - [`book`] - Price-sorted order book with conflict-free admission
//! - [`domain`] - Hashes, outpoints, token amounts and transaction handles
//! - [`config`] - TOML configuration and logging setup
//! - [`error`] - Error types for the crate
//!
//! # Features
//!
//! - `testkit` - Export chain and order builders for integration tests
//!
//! # Example
//!
//! ```no_run
//! use num_bigint::BigInt;
//! use pegnode::absorption::{AbsorptionState, ChainState};
//! use pegnode::chain::{ChainIndex, EpochParams};
//! use pegnode::domain::Hash256;
//!
//! # fn main() -> pegnode::error::Result<()> {
//! let supply = BigInt::from(1_000_000);
//! let chain = ChainState::new(
//!     ChainIndex::with_genesis(Hash256::ZERO, Some(0.0)),
//!     AbsorptionState::new(0, supply.clone(), supply),
//!     EpochParams::new(4096)?,
//! );
//! let candidate = chain.candidate(Hash256::new([1; 32]), Some(0.02))?;
//! if let Some(price) = chain.check_new_absorption_rate(&candidate)? {
//!     println!("absorbing at {price}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod absorption;
pub mod book;
pub mod chain;
pub mod config;
pub mod domain;
pub mod error;
pub mod feed;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
