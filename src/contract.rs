//! ABI descriptors for the splitter contract and the ERC-20 calls it relies on.

use anyhow::{anyhow, Result};
use ethers::abi::{Function, Param, ParamType, StateMutability, Token};
use ethers::types::{Address, Bytes, U256};

/// Human-readable signature of the splitter entry point.
pub const SPLIT_TOKEN_SIGNATURE: &str = "splitToken(address,uint256,address[],uint256[])";

/// Splitter contract function: splitToken(address token, uint256 amount, address[] recipients, uint256[] percentages)
#[allow(deprecated)]
pub fn split_token_function() -> Function {
    Function {
        name: "splitToken".to_string(),
        inputs: vec![
            Param {
                name: "token".to_string(),
                kind: ParamType::Address,
                internal_type: None,
            },
            Param {
                name: "amount".to_string(),
                kind: ParamType::Uint(256),
                internal_type: None,
            },
            Param {
                name: "recipients".to_string(),
                kind: ParamType::Array(Box::new(ParamType::Address)),
                internal_type: None,
            },
            Param {
                name: "percentages".to_string(),
                kind: ParamType::Array(Box::new(ParamType::Uint(256))),
                internal_type: None,
            },
        ],
        outputs: vec![],
        constant: None,
        state_mutability: StateMutability::NonPayable,
    }
}

/// ERC-20 approve(address spender, uint256 amount) returns (bool)
#[allow(deprecated)]
pub fn approve_function() -> Function {
    Function {
        name: "approve".to_string(),
        inputs: vec![
            Param {
                name: "spender".to_string(),
                kind: ParamType::Address,
                internal_type: None,
            },
            Param {
                name: "amount".to_string(),
                kind: ParamType::Uint(256),
                internal_type: None,
            },
        ],
        outputs: vec![Param {
            name: "".to_string(),
            kind: ParamType::Bool,
            internal_type: None,
        }],
        constant: None,
        state_mutability: StateMutability::NonPayable,
    }
}

/// ERC-20 decimals() returns (uint8)
#[allow(deprecated)]
pub fn decimals_function() -> Function {
    Function {
        name: "decimals".to_string(),
        inputs: vec![],
        outputs: vec![Param {
            name: "".to_string(),
            kind: ParamType::Uint(8),
            internal_type: None,
        }],
        constant: None,
        state_mutability: StateMutability::View,
    }
}

/// The splitter contract as bound for one session.
#[derive(Debug, Clone)]
pub struct ContractBinding {
    pub address: Address,
    pub function: Function,
}

impl ContractBinding {
    pub fn splitter(address: Address) -> Self {
        Self {
            address,
            function: split_token_function(),
        }
    }

    /// Four-byte selector of the bound function, hex encoded with `0x`.
    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.function.short_signature()))
    }
}

pub fn encode_split_token(
    token: Address,
    amount: U256,
    recipients: &[Address],
    percentages: &[U256],
) -> Result<Bytes> {
    if recipients.len() != percentages.len() {
        return Err(anyhow!(
            "Recipient count ({}) does not match percentage count ({})",
            recipients.len(),
            percentages.len()
        ));
    }
    let recipient_tokens: Vec<Token> = recipients.iter().map(|a| Token::Address(*a)).collect();
    let percentage_tokens: Vec<Token> = percentages.iter().map(|p| Token::Uint(*p)).collect();
    let calldata = split_token_function().encode_input(&[
        Token::Address(token),
        Token::Uint(amount),
        Token::Array(recipient_tokens),
        Token::Array(percentage_tokens),
    ])?;
    Ok(calldata.into())
}

pub fn encode_approve(spender: Address, amount: U256) -> Result<Bytes> {
    let calldata = approve_function().encode_input(&[Token::Address(spender), Token::Uint(amount)])?;
    Ok(calldata.into())
}

pub fn encode_decimals() -> Result<Bytes> {
    Ok(decimals_function().encode_input(&[])?.into())
}

/// Decode the return data of a `decimals()` call.
pub fn decode_decimals(output: &[u8]) -> Result<u8> {
    let tokens = decimals_function().decode_output(output)?;
    match tokens.as_slice() {
        [Token::Uint(value)] if *value <= U256::from(u8::MAX) => Ok(value.as_u32() as u8),
        _ => Err(anyhow!("Unexpected decimals() return value")),
    }
}
