//! Chain-agnostic primitives: identifiers, money and transaction handles.

mod id;
mod money;
mod tx;

pub use id::{Hash256, OutPoint};
pub use money::{Amount, Balance, Token, ATOMS_PER_COIN};
pub use tx::Transaction;
