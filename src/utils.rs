use crate::error::SplitterError;
use ethers::types::{Address, U256};

/// Format a base-unit amount as a decimal string with the given number of decimals.
pub fn format_token_amount(amount: U256, decimals: u8) -> String {
    ethers::utils::format_units(amount, decimals as u32).unwrap_or_else(|_| "0.0".to_string())
}

/// Parse a decimal token amount into base units.
///
/// Works on the string directly so "0.1" does not pick up float rounding.
pub fn parse_token_amount(input: &str, decimals: u8) -> Result<U256, SplitterError> {
    let trimmed = input.trim();
    let invalid = |reason: &str| SplitterError::InvalidAmount {
        input: trimmed.to_string(),
        reason: reason.to_string(),
    };

    if trimmed.is_empty() {
        return Err(invalid("amount cannot be empty"));
    }
    if trimmed.starts_with('-') {
        return Err(invalid("amount cannot be negative"));
    }

    let amount: U256 = ethers::utils::parse_units(trimmed, decimals as u32)
        .map_err(|e| invalid(&e.to_string()))?
        .into();
    if amount.is_zero() {
        return Err(invalid("amount must be greater than zero"));
    }
    Ok(amount)
}

/// Parse a token contract address typed by the user.
pub fn parse_token_address(input: &str) -> Result<Address, SplitterError> {
    let trimmed = input.trim();
    trimmed
        .parse()
        .map_err(|_| SplitterError::InvalidToken(trimmed.to_string()))
}

/// Shorten an address for badge display: `0x1234…abcd`.
pub fn short_address(address: Address) -> String {
    let full = format!("{:?}", address);
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}
