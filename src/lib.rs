//! Tokensplit: approve an ERC-20 allowance and split a token amount across
//! recipients by percentage through the splitter contract.

pub mod activity_log;
pub mod allowance;
pub mod config;
pub mod contract;
pub mod error;
pub mod gui;
pub mod recipients;
pub mod session;
pub mod split_operations;
pub mod utils;
pub mod wallet;

#[cfg(test)]
mod testing;
