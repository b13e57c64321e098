//! In-memory [`ChainClient`] used by the operation tests.

use crate::error::SplitterError;
use crate::session::ChainClient;
use anyhow::{anyhow, Result};
use ethers::types::{Address, Bytes, TransactionReceipt, TxHash, U64};
use std::cell::{Cell, RefCell};

pub const SPLITTER: Address = Address::repeat_byte(0x5a);
pub const TOKEN: Address = Address::repeat_byte(0x70);

pub struct FakeChain {
    decimals: Option<u8>,
    revert: bool,
    reject_send: bool,
    decimals_queries: Cell<usize>,
    sent: RefCell<Vec<(Address, Bytes)>>,
}

impl FakeChain {
    pub const BLOCK: u64 = 1234;

    pub fn new() -> Self {
        Self {
            decimals: None,
            revert: false,
            reject_send: false,
            decimals_queries: Cell::new(0),
            sent: RefCell::new(Vec::new()),
        }
    }

    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = Some(decimals);
        self
    }

    pub fn reverting(mut self) -> Self {
        self.revert = true;
        self
    }

    pub fn rejecting(mut self) -> Self {
        self.reject_send = true;
        self
    }

    pub fn sent_calls(&self) -> Vec<(Address, Bytes)> {
        self.sent.borrow().clone()
    }

    pub fn decimals_queries(&self) -> usize {
        self.decimals_queries.get()
    }
}

impl ChainClient for FakeChain {
    fn splitter_address(&self) -> Address {
        SPLITTER
    }

    async fn token_decimals(&self, _token: Address) -> Result<u8> {
        self.decimals_queries.set(self.decimals_queries.get() + 1);
        self.decimals.ok_or_else(|| anyhow!("execution reverted"))
    }

    async fn send_call(&self, to: Address, calldata: Bytes) -> Result<TxHash> {
        if self.reject_send {
            return Err(anyhow!("Transaction was rejected on the Ledger device."));
        }
        let mut sent = self.sent.borrow_mut();
        sent.push((to, calldata));
        Ok(TxHash::from_low_u64_be(sent.len() as u64))
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TransactionReceipt> {
        if self.revert {
            return Err(SplitterError::Reverted(tx_hash).into());
        }
        Ok(TransactionReceipt {
            transaction_hash: tx_hash,
            block_number: Some(U64::from(Self::BLOCK)),
            status: Some(U64::one()),
            ..Default::default()
        })
    }
}
