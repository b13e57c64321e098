//! Connection manager and the signing session it produces.
//!
//! A [`Session`] is created by [`connect`] and handed explicitly to every
//! operation through the [`ChainClient`] trait, so nothing can run against a
//! half-initialised connection.

use crate::config::{chain_supports_eip1559, Config, SplitterDeployments};
use crate::contract::{self, ContractBinding};
use crate::error::SplitterError;
use crate::utils;
use crate::wallet::{self, WalletSigner};
use anyhow::{anyhow, Context, Result};
use ethers::prelude::*;
use ethers::providers::{Http, Provider};
use ethers::types::transaction::eip2718::TypedTransaction;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Gas estimates are padded by this percentage.
const GAS_LIMIT_BUFFER_PERCENT: u64 = 20;

/// The chain-facing operations the allowance and split flows need.
///
/// Implemented by [`Session`]; tests substitute an in-memory fake.
#[allow(async_fn_in_trait)]
pub trait ChainClient {
    /// Address of the bound splitter contract.
    fn splitter_address(&self) -> Address;

    /// Read `decimals()` from an ERC-20 token.
    async fn token_decimals(&self, token: Address) -> Result<u8>;

    /// Sign and broadcast a call; returns once the node accepted it.
    async fn send_call(&self, to: Address, calldata: Bytes) -> Result<TxHash>;

    /// Wait until the transaction is mined. Fails with [`SplitterError::Reverted`] on a failed receipt.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TransactionReceipt>;
}

#[derive(Debug)]
pub struct Session {
    provider: Arc<Provider<Http>>,
    signer: WalletSigner,
    address: Address,
    chain_id: u64,
    splitter: ContractBinding,
    gas_speed_multiplier: f32,
    receipt_poll_interval: Duration,
}

/// Open a session: request the wallet, read the chain id, bind the splitter for the chain.
pub async fn connect(config: &Config) -> Result<Session> {
    let provider = config.get_provider().await?;

    // The wallet opens against the selected network and is re-bound once the RPC reports its chain.
    let signer = wallet::open_wallet(config, config.chain_id).await?;

    let chain_id = provider
        .get_chainid()
        .await
        .with_context(|| format!("Failed to query chain id from {}", config.rpc_url))?
        .as_u64();
    info!("RPC {} reports chain id {}", config.rpc_url, chain_id);
    if chain_id != config.chain_id {
        warn!("Selected chain {} but the RPC serves chain {}", config.chain_id, chain_id);
    }
    let signer = signer.with_chain_id(chain_id);

    let splitter = bind_splitter(&config.deployments, chain_id)?;
    let code = provider
        .get_code(splitter.address, None)
        .await
        .with_context(|| format!("Failed to read contract code at {:?}", splitter.address))?;
    ensure_contract_code(chain_id, splitter.address, &code)?;
    info!(
        "Bound splitter {:?} ({} selector {})",
        splitter.address,
        contract::SPLIT_TOKEN_SIGNATURE,
        splitter.selector_hex()
    );

    let address = signer.address();
    Ok(Session {
        provider,
        signer,
        address,
        chain_id,
        splitter,
        gas_speed_multiplier: config.gas_speed_multiplier,
        receipt_poll_interval: config.receipt_poll_interval,
    })
}

/// Bind the splitter deployed on `chain_id`.
pub fn bind_splitter(
    deployments: &SplitterDeployments,
    chain_id: u64,
) -> Result<ContractBinding, SplitterError> {
    deployments
        .resolve(chain_id)
        .map(ContractBinding::splitter)
        .ok_or(SplitterError::UnsupportedChain(chain_id))
}

/// An address without bytecode accepts any call with a successful receipt, so it
/// must never be used as the splitter.
fn ensure_contract_code(chain_id: u64, address: Address, code: &Bytes) -> Result<(), SplitterError> {
    if code.is_empty() {
        return Err(SplitterError::NoSplitterCode { chain_id, address });
    }
    Ok(())
}

impl Session {
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn splitter(&self) -> &ContractBinding {
        &self.splitter
    }

    pub fn wallet_name(&self) -> &'static str {
        self.signer.kind().display_name()
    }

    /// Badge text for the connected account.
    pub fn address_badge(&self) -> String {
        utils::short_address(self.address)
    }

    /// Badge text for the connected chain.
    pub fn chain_badge(&self) -> String {
        format!("Chain {}", self.chain_id)
    }

    async fn build_transaction(&self, to: Address, calldata: Bytes) -> Result<TypedTransaction> {
        let nonce = self
            .provider
            .get_transaction_count(self.address, Some(BlockNumber::Pending.into()))
            .await?;
        let base_gas_price = self.provider.get_gas_price().await?;
        let gas_price = base_gas_price * U256::from((self.gas_speed_multiplier * 100.0) as u64)
            / U256::from(100u64);

        let mut tx: TypedTransaction = if chain_supports_eip1559(self.chain_id) {
            Eip1559TransactionRequest::new()
                .from(self.address)
                .to(to)
                .data(calldata)
                .max_fee_per_gas(gas_price)
                .max_priority_fee_per_gas(gas_price / 10)
                .nonce(nonce)
                .chain_id(self.chain_id)
                .into()
        } else {
            TransactionRequest::new()
                .from(self.address)
                .to(to)
                .data(calldata)
                .gas_price(gas_price)
                .nonce(nonce)
                .chain_id(self.chain_id)
                .into()
        };

        let estimate = self
            .provider
            .estimate_gas(&tx, None)
            .await
            .context("Gas estimation failed (the call would revert)")?;
        tx.set_gas(estimate * U256::from(100 + GAS_LIMIT_BUFFER_PERCENT) / U256::from(100u64));
        Ok(tx)
    }
}

impl ChainClient for Session {
    fn splitter_address(&self) -> Address {
        self.splitter.address
    }

    async fn token_decimals(&self, token: Address) -> Result<u8> {
        let tx: TypedTransaction = TransactionRequest::new()
            .to(token)
            .data(contract::encode_decimals()?)
            .into();
        let output = self
            .provider
            .call(&tx, None)
            .await
            .with_context(|| format!("decimals() call on {:?} failed", token))?;
        contract::decode_decimals(&output)
    }

    async fn send_call(&self, to: Address, calldata: Bytes) -> Result<TxHash> {
        let tx = self.build_transaction(to, calldata).await?;
        info!(
            "Call built: to={:?}, data_len={}, gas={:?}",
            to,
            tx.data().map(|d| d.len()).unwrap_or(0),
            tx.gas()
        );

        let signature = self.signer.sign_transaction(&tx).await?;
        let pending = self
            .provider
            .send_raw_transaction(tx.rlp_signed(&signature))
            .await
            .map_err(|e| anyhow!("Failed to send transaction: {}", e))?;
        let tx_hash = pending.tx_hash();
        info!("Transaction sent: {:?}", tx_hash);
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TransactionReceipt> {
        // No timeout: the wait lasts until the transaction is mined.
        let receipt = loop {
            match self.provider.get_transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => break receipt,
                Ok(None) => {}
                Err(e) => warn!("Receipt lookup for {:?} failed: {}", tx_hash, e),
            }
            tokio::time::sleep(self.receipt_poll_interval).await;
        };

        if receipt.status == Some(U64::zero()) {
            return Err(SplitterError::Reverted(tx_hash).into());
        }
        info!(
            "Transaction {:?} mined in block {:?}, gas used {:?}",
            tx_hash, receipt.block_number, receipt.gas_used
        );
        Ok(receipt)
    }
}

/// Busy flag shared by every submission path.
///
/// Only one approve or split may be in flight at a time; the flag is released when
/// the returned [`SubmissionTicket`] drops.
#[derive(Clone, Default)]
pub struct SubmissionGuard {
    busy: Arc<AtomicBool>,
}

#[must_use = "the guard is released as soon as the ticket drops"]
pub struct SubmissionTicket {
    busy: Arc<AtomicBool>,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_begin(&self) -> Result<SubmissionTicket, SplitterError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SplitterError::Busy)?;
        Ok(SubmissionTicket {
            busy: Arc::clone(&self.busy),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for SubmissionTicket {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
