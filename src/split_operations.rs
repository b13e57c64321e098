//! Split executor: validates recipient rows and submits `splitToken`.

use crate::activity_log::ActivityLog;
use crate::allowance::{resolve_token_amount, SubmissionOutcome, TokenAmountInput};
use crate::config::DecimalsPolicy;
use crate::contract;
use crate::recipients::{self, RecipientRow};
use crate::session::{ChainClient, SubmissionGuard};
use crate::utils;
use anyhow::{Context, Result};
use tracing::{info, warn};

/// Everything the executor reads from the form at the moment "execute" is pressed.
#[derive(Debug, Clone, Default)]
pub struct SplitRequest {
    pub transfer: TokenAmountInput,
    pub rows: Vec<RecipientRow>,
}

/// Validate the rows, then submit the split and wait for it to be mined.
///
/// Percentage and address problems are reported before any chain access.
pub async fn execute_split<C: ChainClient>(
    client: &C,
    guard: &SubmissionGuard,
    log: &ActivityLog,
    request: &SplitRequest,
    policy: DecimalsPolicy,
) -> Result<SubmissionOutcome> {
    utils::parse_token_address(&request.transfer.token)?;
    let plan = recipients::build_split_plan(&request.rows)?;
    let (token, amount, decimals) = resolve_token_amount(client, &request.transfer, policy).await?;

    let _ticket = guard.try_begin()?;
    info!(
        "Splitting {} of token {:?} across {} recipients via {:?}",
        utils::format_token_amount(amount, decimals),
        token,
        plan.recipients.len(),
        client.splitter_address()
    );
    for (recipient, percentage) in plan.recipients.iter().zip(plan.percentages.iter()) {
        info!("  {:?} → {}%", recipient, percentage);
    }

    let calldata = contract::encode_split_token(token, amount, &plan.recipients, &plan.percentages)?;
    let tx_hash = client
        .send_call(client.splitter_address(), calldata)
        .await
        .context("Split was not submitted")?;
    log.append(format!("Split sent: {:?}", tx_hash));

    let receipt = client.wait_for_receipt(tx_hash).await.map_err(|e| {
        warn!("Split {:?} did not complete: {:#}", tx_hash, e);
        e
    })?;
    let block_number = receipt.block_number.map(|n| n.as_u64());
    log.append(match block_number {
        Some(block) => format!("Split completed in block {}", block),
        None => "Split completed".to_string(),
    });

    Ok(SubmissionOutcome {
        tx_hash,
        block_number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{find_splitter_error, SplitterError};
    use crate::recipients::RecipientList;
    use crate::testing::{FakeChain, SPLITTER, TOKEN};
    use ethers::abi::Token;
    use ethers::types::{Address, U256};

    const A: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const B: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
    const C: &str = "0xcccccccccccccccccccccccccccccccccccccccc";

    fn request(rows: &[(&str, &str)], amount: &str) -> SplitRequest {
        let mut list = RecipientList::new();
        for (address, percentage) in rows {
            let id = list.add();
            let row = list.get_mut(id).unwrap();
            row.address = address.to_string();
            row.percentage = percentage.to_string();
        }
        SplitRequest {
            transfer: TokenAmountInput {
                token: format!("{:?}", TOKEN),
                amount: amount.to_string(),
            },
            rows: list.rows().to_vec(),
        }
    }

    fn run(chain: &FakeChain, log: &ActivityLog, request: &SplitRequest) -> Result<SubmissionOutcome> {
        tokio_test::block_on(execute_split(
            chain,
            &SubmissionGuard::new(),
            log,
            request,
            DecimalsPolicy::Fixed(18),
        ))
    }

    fn decode_split(calldata: &[u8]) -> Vec<Token> {
        contract::split_token_function().decode_input(&calldata[4..]).unwrap()
    }

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    #[test]
    fn test_split_sixty_forty_issues_call() {
        let chain = FakeChain::new();
        let log = ActivityLog::new();
        let outcome = run(&chain, &log, &request(&[(A, "60"), (B, "40")], "1")).unwrap();

        let calls = chain.sent_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, SPLITTER);
        let tokens = decode_split(&calls[0].1);
        assert_eq!(tokens[0], Token::Address(TOKEN));
        assert_eq!(tokens[1], Token::Uint(U256::exp10(18)));
        assert_eq!(
            tokens[2],
            Token::Array(vec![Token::Address(addr(A)), Token::Address(addr(B))])
        );
        assert_eq!(
            tokens[3],
            Token::Array(vec![Token::Uint(U256::from(60)), Token::Uint(U256::from(40))])
        );

        assert_eq!(outcome.block_number, Some(FakeChain::BLOCK));
        let lines = log.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Split sent"));
        assert!(lines[1].starts_with("Split completed"));
    }

    #[test]
    fn test_split_sum_ninety_no_call() {
        let chain = FakeChain::new();
        let log = ActivityLog::new();
        let err = run(&chain, &log, &request(&[(A, "60"), (B, "30")], "1")).unwrap_err();

        assert_eq!(find_splitter_error(&err), Some(&SplitterError::PercentageTotal(90)));
        assert!(chain.sent_calls().is_empty());
        assert!(log.is_empty());
    }

    #[test]
    fn test_split_empty_address_row_filtered_then_rejected() {
        let chain = FakeChain::new();
        let err = run(&chain, &ActivityLog::new(), &request(&[("", "50"), (C, "50")], "1")).unwrap_err();

        assert_eq!(find_splitter_error(&err), Some(&SplitterError::PercentageTotal(50)));
        assert!(chain.sent_calls().is_empty());
    }

    #[test]
    fn test_split_only_filtered_rows_submitted_in_order() {
        let chain = FakeChain::new();
        let rows = [(C, "25"), ("", "40"), (A, "0"), (B, "75"), (A, "n/a")];
        run(&chain, &ActivityLog::new(), &request(&rows, "3")).unwrap();

        let tokens = decode_split(&chain.sent_calls()[0].1);
        assert_eq!(
            tokens[2],
            Token::Array(vec![Token::Address(addr(C)), Token::Address(addr(B))])
        );
        assert_eq!(
            tokens[3],
            Token::Array(vec![Token::Uint(U256::from(25)), Token::Uint(U256::from(75))])
        );
    }

    #[test]
    fn test_split_validation_precedes_decimals_query() {
        let chain = FakeChain::new().with_decimals(6);
        let err = tokio_test::block_on(execute_split(
            &chain,
            &SubmissionGuard::new(),
            &ActivityLog::new(),
            &request(&[(A, "10")], "1"),
            DecimalsPolicy::QueryToken,
        ))
        .unwrap_err();

        assert_eq!(find_splitter_error(&err), Some(&SplitterError::PercentageTotal(10)));
        assert_eq!(chain.decimals_queries(), 0);
    }

    #[test]
    fn test_split_invalid_amount_no_call() {
        let chain = FakeChain::new();
        let err = run(&chain, &ActivityLog::new(), &request(&[(A, "100")], "")).unwrap_err();
        assert!(matches!(
            find_splitter_error(&err),
            Some(SplitterError::InvalidAmount { .. })
        ));
        assert!(chain.sent_calls().is_empty());
    }

    #[test]
    fn test_split_while_busy_no_call() {
        let chain = FakeChain::new();
        let guard = SubmissionGuard::new();
        let _held = guard.try_begin().unwrap();
        let err = tokio_test::block_on(execute_split(
            &chain,
            &guard,
            &ActivityLog::new(),
            &request(&[(A, "100")], "1"),
            DecimalsPolicy::Fixed(18),
        ))
        .unwrap_err();

        assert_eq!(find_splitter_error(&err), Some(&SplitterError::Busy));
        assert!(chain.sent_calls().is_empty());
    }

    #[test]
    fn test_split_rejected_signature_logs_nothing() {
        let chain = FakeChain::new().rejecting();
        let log = ActivityLog::new();
        let guard = SubmissionGuard::new();
        let err = tokio_test::block_on(execute_split(
            &chain,
            &guard,
            &log,
            &request(&[(A, "100")], "1"),
            DecimalsPolicy::Fixed(18),
        ))
        .unwrap_err();

        assert!(format!("{:#}", err).contains("rejected"));
        assert!(find_splitter_error(&err).is_none());
        assert!(log.is_empty());
        assert!(!guard.is_busy());
    }

    #[test]
    fn test_split_revert_leaves_sent_only() {
        let chain = FakeChain::new().reverting();
        let log = ActivityLog::new();
        let err = run(&chain, &log, &request(&[(A, "50"), (B, "50")], "1")).unwrap_err();

        assert!(matches!(find_splitter_error(&err), Some(SplitterError::Reverted(_))));
        assert_eq!(log.lines().len(), 1);
        assert!(log.lines()[0].starts_with("Split sent"));
    }
}
