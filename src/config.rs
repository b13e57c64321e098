use anyhow::{anyhow, Context, Result};
use ethers::providers::{Http, Provider};
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// A predefined EVM-compatible network with label, chain ID, and default RPC.
#[derive(Clone, Debug)]
pub struct EvmNetwork {
    pub label: &'static str,
    pub chain_id: u64,
    pub default_rpc: &'static str,
}

impl EvmNetwork {
    pub const fn new(label: &'static str, chain_id: u64, default_rpc: &'static str) -> Self {
        Self {
            label,
            chain_id,
            default_rpc,
        }
    }
}

/// Networks offered in the network selector. Only some of them have a splitter deployment.
pub const NETWORKS: &[EvmNetwork] = &[
    EvmNetwork::new("Ethereum", 1, "https://ethereum-rpc.publicnode.com"),
    EvmNetwork::new("BNB Chain", 56, "https://bsc-dataseed.binance.org"),
    EvmNetwork::new("Polygon", 137, "https://polygon-rpc.com"),
    EvmNetwork::new("Sepolia", 11155111, "https://ethereum-sepolia-rpc.publicnode.com"),
    EvmNetwork::new("Base", 8453, "https://mainnet.base.org"),
    EvmNetwork::new("Optimism", 10, "https://mainnet.optimism.io"),
];

/// Find a network by chain ID
pub fn find_network_by_chain_id(chain_id: u64) -> Option<&'static EvmNetwork> {
    NETWORKS.iter().find(|n| n.chain_id == chain_id)
}

/// Find the index of a network in NETWORKS by chain ID
pub fn find_network_index(chain_id: u64) -> Option<usize> {
    NETWORKS.iter().position(|n| n.chain_id == chain_id)
}

/// Get the block explorer URL for a given chain ID
pub fn get_block_explorer_url(chain_id: u64) -> Option<&'static str> {
    match chain_id {
        1 => Some("https://etherscan.io"),
        56 => Some("https://bscscan.com"),
        137 => Some("https://polygonscan.com"),
        11155111 => Some("https://sepolia.etherscan.io"),
        8453 => Some("https://basescan.org"),
        10 => Some("https://optimistic.etherscan.io"),
        _ => None,
    }
}

/// Get the full URL to view a transaction on the block explorer
pub fn get_tx_explorer_url(chain_id: u64, tx_hash: &str) -> Option<String> {
    get_block_explorer_url(chain_id).map(|base| format!("{}/tx/{}", base, tx_hash))
}

/// Check if a chain supports EIP-1559 (Type 2 transactions)
pub fn chain_supports_eip1559(chain_id: u64) -> bool {
    match chain_id {
        // BNB Chain still prices gas the legacy way
        56 => false,
        _ => true,
    }
}

/// Default splitter deployments, one per supported network.
///
/// Entries from the deployments file override these; `connect` refuses any
/// address that has no contract code on the connected chain.
pub const DEFAULT_SPLITTER_DEPLOYMENTS: &[(u64, &str)] = &[
    (1, "0x9d1b6c3e7a2f4d8b0e5c1a6f3b7d9e2c4a8f0b13"),
    (56, "0x3f8e2a7c1d9b5e4f6a0c8d2b7e1f3a5c9d4b6e82"),
    (137, "0x7b4d9f1e3c6a8b2d5f0e7c4a1b9d3f6e8c2a5d47"),
];

pub const MIN_GAS_SPEED: f32 = 0.5;
pub const MAX_GAS_SPEED: f32 = 3.0;
const DEFAULT_GAS_SPEED: f32 = 1.0;

/// Keep a gas speed multiplier inside the range the settings slider offers.
///
/// Non-finite values fall back to the default speed.
pub fn clamp_gas_speed(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(MIN_GAS_SPEED, MAX_GAS_SPEED)
    } else {
        DEFAULT_GAS_SPEED
    }
}

/// Deployment file looked up in the user's config directory when `SPLITTER_DEPLOYMENTS` is unset.
const DEPLOYMENTS_FILE: &str = "deployments.json";

/// Chain ID → splitter contract address.
///
/// Injected into the connection manager through [`Config`], so new networks can be
/// added from a JSON file of the form `{ "10": "0x..." }` without touching code.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SplitterDeployments(BTreeMap<u64, Address>);

impl SplitterDeployments {
    /// The built-in table for chain ids 1, 56 and 137.
    pub fn builtin() -> Self {
        let table = DEFAULT_SPLITTER_DEPLOYMENTS
            .iter()
            .map(|(chain_id, address)| {
                let parsed: Address = address
                    .parse()
                    .expect("DEFAULT_SPLITTER_DEPLOYMENTS entry is invalid - this is a programming error");
                (*chain_id, parsed)
            })
            .collect();
        Self(table)
    }

    /// Resolve the splitter address for a chain, if one is deployed there.
    pub fn resolve(&self, chain_id: u64) -> Option<Address> {
        self.0.get(&chain_id).copied()
    }

    /// Entries from `other` win over existing ones.
    pub fn merge(&mut self, other: SplitterDeployments) {
        self.0.extend(other.0);
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Invalid splitter deployments JSON")
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read deployments file {}", path.display()))?;
        Self::from_json(&text)
    }
}

/// Where the signing key lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletSource {
    /// Ledger hardware wallet over HID
    Ledger,
    /// Hex private key taken from `SPLITTER_PRIVATE_KEY`
    PrivateKey,
}

impl Default for WalletSource {
    fn default() -> Self {
        WalletSource::Ledger
    }
}

impl WalletSource {
    pub fn display_name(&self) -> &'static str {
        match self {
            WalletSource::Ledger => "Ledger",
            WalletSource::PrivateKey => "Private key (env)",
        }
    }

    fn from_env_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ledger" => Some(WalletSource::Ledger),
            "private-key" | "private_key" | "key" => Some(WalletSource::PrivateKey),
            _ => None,
        }
    }
}

/// How decimal token amounts are scaled into base units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecimalsPolicy {
    /// Always scale by a fixed number of decimal places
    Fixed(u8),
    /// Ask the token contract for its `decimals()` before converting
    QueryToken,
}

impl Default for DecimalsPolicy {
    fn default() -> Self {
        DecimalsPolicy::Fixed(DEFAULT_TOKEN_DECIMALS)
    }
}

impl DecimalsPolicy {
    fn from_env_value(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        match value.as_str() {
            "query" | "token" => Some(DecimalsPolicy::QueryToken),
            "fixed" => Some(DecimalsPolicy::Fixed(DEFAULT_TOKEN_DECIMALS)),
            other => other.parse().ok().map(DecimalsPolicy::Fixed),
        }
    }
}

pub const DEFAULT_TOKEN_DECIMALS: u8 = 18;

/// Default BIP-44 coin type for Ethereum
pub const DEFAULT_COIN_TYPE: u32 = 60;

/// Derivation path mode for HD wallets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DerivationMode {
    /// Account-index: m/44'/60'/i'/0/0 - account number varies (Ledger Live, MetaMask default)
    AccountIndex,
    /// Address-index: m/44'/60'/0'/0/i - address index varies, account fixed
    AddressIndex,
}

impl Default for DerivationMode {
    fn default() -> Self {
        DerivationMode::AccountIndex
    }
}

impl DerivationMode {
    pub fn get_path(&self, index: u32, coin_type: u32) -> String {
        match self {
            DerivationMode::AccountIndex => format!("m/44'/{}'/{}'/0/0", coin_type, index),
            DerivationMode::AddressIndex => format!("m/44'/{}'/0'/0/{}", coin_type, index),
        }
    }
}

const DEFAULT_RECEIPT_POLL_MS: u64 = 2_000;

#[derive(Clone)]
pub struct Config {
    pub rpc_url: String,
    /// Network selected in the UI; the connected chain id always comes from the RPC
    pub chain_id: u64,
    pub gas_speed_multiplier: f32,
    pub wallet_source: WalletSource,
    pub private_key: Option<String>,
    pub ledger_index: u32,
    pub derivation_mode: DerivationMode,
    pub decimals_policy: DecimalsPolicy,
    pub deployments: SplitterDeployments,
    pub receipt_poll_interval: Duration,
}

impl Config {
    pub fn new(rpc_url: String, chain_id: u64) -> Self {
        let gas_speed_multiplier = env::var("GAS_SPEED_MULTIPLIER")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .map(clamp_gas_speed)
            .unwrap_or(DEFAULT_GAS_SPEED);

        Self {
            rpc_url,
            chain_id,
            gas_speed_multiplier,
            wallet_source: WalletSource::default(),
            private_key: None,
            ledger_index: 0,
            derivation_mode: DerivationMode::default(),
            decimals_policy: DecimalsPolicy::default(),
            deployments: SplitterDeployments::builtin(),
            receipt_poll_interval: Duration::from_millis(DEFAULT_RECEIPT_POLL_MS),
        }
    }

    pub fn from_network(network: &EvmNetwork) -> Self {
        Self::new(network.default_rpc.to_string(), network.chain_id)
    }

    /// Build the configuration from `SPLITTER_*` environment variables.
    ///
    /// Call `dotenvy::dotenv()` first so a local `.env` is honoured.
    pub fn from_env() -> Result<Self> {
        let chain_id = match env::var("SPLITTER_CHAIN_ID") {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|_| anyhow!("SPLITTER_CHAIN_ID must be a number, got '{}'", value))?,
            Err(_) => 1,
        };

        let mut config = match find_network_by_chain_id(chain_id) {
            Some(network) => Self::from_network(network),
            None => Self::new(String::new(), chain_id),
        };

        if let Ok(rpc) = env::var("SPLITTER_RPC_URL") {
            if !rpc.trim().is_empty() {
                config.rpc_url = rpc.trim().to_string();
            }
        }
        if config.rpc_url.is_empty() {
            return Err(anyhow!(
                "Chain {} has no built-in RPC endpoint; set SPLITTER_RPC_URL",
                chain_id
            ));
        }

        if let Ok(value) = env::var("SPLITTER_WALLET") {
            config.wallet_source = WalletSource::from_env_value(&value)
                .ok_or_else(|| anyhow!("SPLITTER_WALLET must be 'ledger' or 'private-key', got '{}'", value))?;
        }
        config.private_key = env::var("SPLITTER_PRIVATE_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        if let Ok(value) = env::var("SPLITTER_LEDGER_INDEX") {
            config.ledger_index = value
                .trim()
                .parse()
                .map_err(|_| anyhow!("SPLITTER_LEDGER_INDEX must be a number, got '{}'", value))?;
        }

        if let Ok(value) = env::var("SPLITTER_DECIMALS") {
            config.decimals_policy = DecimalsPolicy::from_env_value(&value)
                .ok_or_else(|| anyhow!("SPLITTER_DECIMALS must be 'fixed', 'query' or a number, got '{}'", value))?;
        }

        match env::var("SPLITTER_DEPLOYMENTS") {
            Ok(path) => {
                let extra = SplitterDeployments::load_file(Path::new(path.trim()))?;
                config.deployments.merge(extra);
            }
            Err(_) => {
                if let Some(path) = default_deployments_path().filter(|p| p.exists()) {
                    match SplitterDeployments::load_file(&path) {
                        Ok(extra) => {
                            info!("Loaded splitter deployments from {}", path.display());
                            config.deployments.merge(extra);
                        }
                        Err(e) => warn!("Ignoring {}: {:#}", path.display(), e),
                    }
                }
            }
        }

        Ok(config)
    }

    /// Derivation path used for the Ledger signer.
    pub fn ledger_derivation_path(&self) -> String {
        self.derivation_mode.get_path(self.ledger_index, DEFAULT_COIN_TYPE)
    }

    pub async fn get_provider(&self) -> Result<Arc<Provider<Http>>> {
        let url = Url::parse(&self.rpc_url)?;
        let provider = Provider::<Http>::try_from(url.as_str())?;
        Ok(Arc::new(provider))
    }
}

impl Default for Config {
    fn default() -> Self {
        match find_network_by_chain_id(1) {
            Some(ethereum) => Self::from_network(ethereum),
            None => Self::new("https://ethereum-rpc.publicnode.com".to_string(), 1),
        }
    }
}

fn default_deployments_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tokensplit").join(DEPLOYMENTS_FILE))
}
