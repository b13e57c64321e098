//! Signing backends: Ledger over HID via ethers-rs, or a local private key.

use crate::config::{Config, WalletSource};
use crate::error::SplitterError;
use anyhow::{anyhow, Result};
use ethers::prelude::*;
use ethers::signers::{HDPath, Ledger};
use ethers::types::transaction::eip2718::TypedTransaction;
use std::sync::OnceLock;
use tokio::sync::Mutex;
use tracing::{error, info};

/// Global mutex to serialize all Ledger/HID access.
static LEDGER_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn ledger_lock() -> &'static Mutex<()> {
    LEDGER_LOCK.get_or_init(|| Mutex::new(()))
}

/// A signer the session can hand transactions to.
#[derive(Debug)]
pub enum WalletSigner {
    Ledger(Ledger),
    Local(LocalWallet),
}

impl WalletSigner {
    pub fn address(&self) -> Address {
        match self {
            WalletSigner::Ledger(ledger) => ledger.address(),
            WalletSigner::Local(wallet) => wallet.address(),
        }
    }

    /// Re-bind the signer to the chain the RPC actually serves.
    pub fn with_chain_id(self, chain_id: u64) -> Self {
        match self {
            WalletSigner::Ledger(ledger) => WalletSigner::Ledger(ledger.with_chain_id(chain_id)),
            WalletSigner::Local(wallet) => WalletSigner::Local(wallet.with_chain_id(chain_id)),
        }
    }

    pub fn kind(&self) -> WalletSource {
        match self {
            WalletSigner::Ledger(_) => WalletSource::Ledger,
            WalletSigner::Local(_) => WalletSource::PrivateKey,
        }
    }

    pub async fn sign_transaction(&self, tx: &TypedTransaction) -> Result<Signature> {
        match self {
            WalletSigner::Ledger(ledger) => {
                let _lock = ledger_lock().lock().await;
                info!("Waiting for transaction approval on the Ledger device");
                ledger.sign_transaction(tx).await.map_err(map_ledger_error)
            }
            WalletSigner::Local(wallet) => wallet
                .sign_transaction(tx)
                .await
                .map_err(|e| anyhow!("Failed to sign transaction: {}", e)),
        }
    }
}

/// Request account access from the configured wallet source.
///
/// Any reason the wallet cannot be reached is reported as [`SplitterError::MissingWallet`].
pub async fn open_wallet(config: &Config, chain_id: u64) -> Result<WalletSigner, SplitterError> {
    match config.wallet_source {
        WalletSource::Ledger => open_ledger(&config.ledger_derivation_path(), chain_id).await,
        WalletSource::PrivateKey => {
            let key = config.private_key.as_deref().ok_or_else(|| {
                SplitterError::MissingWallet("SPLITTER_PRIVATE_KEY is not set".to_string())
            })?;
            open_local_wallet(key, chain_id)
        }
    }
}

async fn open_ledger(hd_path: &str, chain_id: u64) -> Result<WalletSigner, SplitterError> {
    let _lock = ledger_lock().lock().await;
    info!("Connecting to Ledger at path {} (chain {})", hd_path, chain_id);

    let ledger = Ledger::new(HDPath::Other(hd_path.to_string()), chain_id)
        .await
        .map_err(|e| SplitterError::MissingWallet(map_ledger_error(e).to_string()))?;
    info!("Ledger connected: {:?}", ledger.address());
    Ok(WalletSigner::Ledger(ledger))
}

fn open_local_wallet(key: &str, chain_id: u64) -> Result<WalletSigner, SplitterError> {
    let wallet: LocalWallet = key
        .trim()
        .parse()
        .map_err(|_| SplitterError::MissingWallet("SPLITTER_PRIVATE_KEY is not a valid private key".to_string()))?;
    let wallet = wallet.with_chain_id(chain_id);
    info!("Using local key for {:?}", wallet.address());
    Ok(WalletSigner::Local(wallet))
}

/// Map Ledger errors to user-friendly messages
fn map_ledger_error<E: std::fmt::Display>(e: E) -> anyhow::Error {
    let err_str = e.to_string();
    error!("Ledger error: {}", err_str);

    let lower = err_str.to_lowercase();

    if lower.contains("device not found") || lower.contains("no device") || lower.contains("hidapi") {
        anyhow!("Ledger device not found. Please ensure it's connected and unlocked.")
    } else if lower.contains("locked") || lower.contains("6983") || lower.contains("6985") {
        anyhow!("Ledger is locked or Ethereum app is not open.")
    } else if lower.contains("denied") || lower.contains("rejected") {
        anyhow!("Transaction was rejected on the Ledger device.")
    } else {
        anyhow!("Ledger error: {}", err_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known anvil/hardhat test key #0
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    #[test]
    fn test_open_local_wallet() {
        let signer = open_local_wallet(TEST_KEY, 1).unwrap();
        assert_eq!(signer.address(), TEST_ADDRESS.parse::<Address>().unwrap());
        assert_eq!(signer.kind(), WalletSource::PrivateKey);
    }

    #[test]
    fn test_open_local_wallet_invalid_key() {
        let err = open_local_wallet("0x1234", 1).unwrap_err();
        assert!(matches!(err, SplitterError::MissingWallet(_)));
    }

    #[test]
    fn test_open_wallet_without_key_is_missing_wallet() {
        let mut config = Config::default();
        config.wallet_source = WalletSource::PrivateKey;
        config.private_key = None;
        let err = tokio_test::block_on(open_wallet(&config, 1)).unwrap_err();
        assert_eq!(
            err,
            SplitterError::MissingWallet("SPLITTER_PRIVATE_KEY is not set".to_string())
        );
    }

    #[test]
    fn test_with_chain_id_rebinds_local_wallet() {
        let signer = open_local_wallet(TEST_KEY, 1).unwrap().with_chain_id(56);
        match signer {
            WalletSigner::Local(wallet) => assert_eq!(wallet.chain_id(), 56),
            other => panic!("unexpected signer {:?}", other.kind()),
        }
    }

    #[test]
    fn test_local_wallet_signs_for_its_address() {
        let signer = open_local_wallet(TEST_KEY, 137).unwrap();
        let tx: TypedTransaction = TransactionRequest::new()
            .to(Address::repeat_byte(0x22))
            .value(1u64)
            .nonce(0u64)
            .gas(21_000u64)
            .gas_price(1u64)
            .chain_id(137u64)
            .into();
        let signature = tokio_test::block_on(signer.sign_transaction(&tx)).unwrap();
        let recovered = signature.recover(tx.sighash()).unwrap();
        assert_eq!(recovered, signer.address());
    }

    #[test]
    fn test_map_ledger_error_messages() {
        assert!(map_ledger_error("hidapi: no device")
            .to_string()
            .contains("not found"));
        assert!(map_ledger_error("APDU 6985").to_string().contains("locked"));
        assert!(map_ledger_error("user rejected").to_string().contains("rejected"));
    }
}
