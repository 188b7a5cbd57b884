//! Transaction validation collaborator used during order admission.

use crate::chain::Height;
use crate::domain::{Balance, Transaction};
use crate::error::RuleError;

/// Validation rules owned by the surrounding node.
///
/// The order book calls these in admission order and passes any
/// [`RuleError`] through unchanged. Policy checks default to accepting so
/// a node that allows non-standard orders only implements the consensus
/// rules.
pub trait OrderValidator: Send + Sync {
    /// Input view fetched for a transaction (typically a UTXO viewpoint).
    type Inputs;

    /// Height of the current best chain tip.
    fn best_height(&self) -> Height;

    /// Context-free sanity checks.
    fn check_sanity(&self, tx: &Transaction) -> Result<(), RuleError>;

    fn is_coinbase(&self, tx: &Transaction) -> bool;

    /// Standardness policy for the transaction itself.
    fn check_standard(&self, _tx: &Transaction, _next_height: Height) -> Result<(), RuleError> {
        Ok(())
    }

    /// Load the outputs spent by `tx` from the chain.
    fn fetch_inputs(&self, tx: &Transaction) -> Result<Self::Inputs, RuleError>;

    /// Relative lock times must allow inclusion in the next block.
    fn check_sequence_lock(
        &self,
        tx: &Transaction,
        inputs: &Self::Inputs,
        next_height: Height,
    ) -> Result<(), RuleError>;

    /// Check spends against inputs and return the net per-token balance.
    fn check_inputs(
        &self,
        tx: &Transaction,
        inputs: &Self::Inputs,
        next_height: Height,
    ) -> Result<Balance, RuleError>;

    /// Standardness policy for the spent outputs.
    fn check_inputs_standard(
        &self,
        _tx: &Transaction,
        _inputs: &Self::Inputs,
    ) -> Result<(), RuleError> {
        Ok(())
    }

    /// Signature operation cost limit.
    fn check_sig_op_cost(&self, _tx: &Transaction, _inputs: &Self::Inputs) -> Result<(), RuleError> {
        Ok(())
    }

    /// Script and signature verification.
    fn verify_signatures(&self, tx: &Transaction, inputs: &Self::Inputs) -> Result<(), RuleError>;
}
