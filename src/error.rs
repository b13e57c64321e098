//! Domain errors raised before or around a submission.
//!
//! Operations return `anyhow::Result`; the variants here are carried inside the
//! `anyhow::Error` so the GUI can downcast and decide between a blocking alert
//! and a plain failure status.

use ethers::types::{Address, TxHash};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SplitterError {
    #[error("No wallet available: {0}")]
    MissingWallet(String),

    #[error("Unsupported network (chain id {0}). No splitter contract is deployed there.")]
    UnsupportedChain(u64),

    #[error("No splitter contract code at {address:?} on chain {chain_id}. Point SPLITTER_DEPLOYMENTS at the deployed address.")]
    NoSplitterCode { chain_id: u64, address: Address },

    #[error("Percentages must add up to 100 (current total: {0})")]
    PercentageTotal(u64),

    #[error("Row {row}: invalid recipient address '{address}'")]
    InvalidRecipient { row: usize, address: String },

    #[error("Invalid token address '{0}'")]
    InvalidToken(String),

    #[error("Invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: String },

    #[error("Another transaction is still in flight")]
    Busy,

    #[error("Transaction {0:?} reverted")]
    Reverted(TxHash),
}

impl SplitterError {
    /// Errors the user must acknowledge before doing anything else.
    pub fn is_blocking(&self) -> bool {
        !matches!(self, SplitterError::Reverted(_))
    }
}

/// Find a `SplitterError` anywhere in an error chain.
pub fn find_splitter_error(err: &anyhow::Error) -> Option<&SplitterError> {
    err.chain().find_map(|cause| cause.downcast_ref::<SplitterError>())
}
