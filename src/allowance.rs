//! Allowance authorizer: lets the splitter contract move the user's tokens.

use crate::activity_log::ActivityLog;
use crate::config::DecimalsPolicy;
use crate::contract;
use crate::session::{ChainClient, SubmissionGuard};
use crate::utils;
use anyhow::{Context, Result};
use ethers::types::{Address, TxHash, U256};
use tracing::{info, warn};

/// Token and amount exactly as typed in the form.
#[derive(Debug, Clone, Default)]
pub struct TokenAmountInput {
    pub token: String,
    pub amount: String,
}

/// A mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
}

/// Decimal places used to convert amounts of `token`.
pub async fn resolve_decimals<C: ChainClient>(
    client: &C,
    token: Address,
    policy: DecimalsPolicy,
) -> Result<u8> {
    match policy {
        DecimalsPolicy::Fixed(decimals) => Ok(decimals),
        DecimalsPolicy::QueryToken => {
            let decimals = client.token_decimals(token).await?;
            info!("Token {:?} reports {} decimals", token, decimals);
            Ok(decimals)
        }
    }
}

/// Parse the token address and convert the amount into base units.
pub(crate) async fn resolve_token_amount<C: ChainClient>(
    client: &C,
    input: &TokenAmountInput,
    policy: DecimalsPolicy,
) -> Result<(Address, U256, u8)> {
    let token = utils::parse_token_address(&input.token)?;
    let decimals = resolve_decimals(client, token, policy).await?;
    let amount = utils::parse_token_amount(&input.amount, decimals)?;
    Ok((token, amount, decimals))
}

/// Submit `approve(splitter, amount)` on the token and wait for it to be mined.
pub async fn approve_allowance<C: ChainClient>(
    client: &C,
    guard: &SubmissionGuard,
    log: &ActivityLog,
    input: &TokenAmountInput,
    policy: DecimalsPolicy,
) -> Result<SubmissionOutcome> {
    let (token, amount, decimals) = resolve_token_amount(client, input, policy).await?;
    let spender = client.splitter_address();

    let _ticket = guard.try_begin()?;
    info!(
        "Approving {} (base units {}) of token {:?} for splitter {:?}",
        utils::format_token_amount(amount, decimals),
        amount,
        token,
        spender
    );

    let calldata = contract::encode_approve(spender, amount)?;
    let tx_hash = client
        .send_call(token, calldata)
        .await
        .context("Approval was not submitted")?;
    log.append(format!("Approval sent: {:?}", tx_hash));

    let receipt = client.wait_for_receipt(tx_hash).await.map_err(|e| {
        warn!("Approval {:?} did not confirm: {:#}", tx_hash, e);
        e
    })?;
    let block_number = receipt.block_number.map(|n| n.as_u64());
    log.append(match block_number {
        Some(block) => format!("Approval confirmed in block {}", block),
        None => "Approval confirmed".to_string(),
    });

    Ok(SubmissionOutcome {
        tx_hash,
        block_number,
    })
}
