//! JitoX Backend Client
//!
//! Talks to the JitoX backend for wallet, balance, PNL, operations and
//! global statistics, and submits deposits and withdrawals.
//!
//! ## Error contract
//!
//! - Non-2xx responses become `HTTP <status>: <reason>`
//! - Network, timeout and decoding failures carry the underlying message
//! - Both surface as [`ApiResult::Failure`]; callers branch on the tag
//! - The SOL price lookup degrades to [`FALLBACK_SOL_PRICE`] instead

#[allow(clippy::module_inception)]
mod client;
mod types;

pub use client::{ApiResult, BackendClient, ClientError, FALLBACK_SOL_PRICE};
pub use types::{
    BalanceInfo, MevStatsInfo, OperationFilter, OperationsInfo, ParseParamError, Period,
    PnlInfo, SubmissionReceipt, SubmissionRequest, WalletInfo, DEFAULT_OPERATIONS_LIMIT,
};
