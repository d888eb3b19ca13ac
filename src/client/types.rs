//! Backend payload types
//!
//! Records exchanged with the JitoX backend. Only the wallet record is
//! interpreted; every other payload is handed to consumers unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// Balance payload from `/get_balance`
pub type BalanceInfo = Value;
/// PNL payload from `/get_pnl`
pub type PnlInfo = Value;
/// Operations payload from `/get_operations`
pub type OperationsInfo = Value;
/// Global statistics payload from `/get_mev_stats`
pub type MevStatsInfo = Value;
/// Deposit/withdrawal acknowledgement
pub type SubmissionReceipt = Value;

/// Default number of operations requested
pub const DEFAULT_OPERATIONS_LIMIT: u32 = 10;

/// Wallet record for a user, exactly as the backend sent it.
///
/// The payload is kept whole so it serializes back unchanged. The `wallet`
/// field counts as provisioned when it holds anything other than `null`,
/// `false`, `0` or an empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletInfo(Value);

impl WalletInfo {
    /// Wallet record with an assigned address
    pub fn assigned(address: impl Into<String>) -> Self {
        Self(json!({ "wallet": address.into() }))
    }

    /// Wallet record that has not been provisioned yet
    pub fn pending() -> Self {
        Self(json!({ "wallet": null }))
    }

    /// Raw `wallet` field, if present
    pub fn wallet_value(&self) -> Option<&Value> {
        self.0.get("wallet")
    }

    /// Wallet address when the backend sent it as a string
    pub fn wallet(&self) -> Option<&str> {
        self.wallet_value().and_then(Value::as_str)
    }

    /// Whether an address has been provisioned
    pub fn has_wallet(&self) -> bool {
        match self.wallet_value() {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        }
    }

    /// Any field of the payload
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for WalletInfo {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// JSON body for deposit and withdrawal submissions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub user_id: String,
    pub amount: f64,
}

/// Error parsing a query parameter value
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid {kind} '{value}', expected one of: {expected}")]
pub struct ParseParamError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

/// PNL reporting period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[default]
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "all")]
    All,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "24h",
            Period::Week => "7d",
            Period::Month => "30d",
            Period::All => "all",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ParseParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "24h" => Ok(Period::Day),
            "7d" => Ok(Period::Week),
            "30d" => Ok(Period::Month),
            "all" => Ok(Period::All),
            _ => Err(ParseParamError {
                kind: "period",
                value: s.to_string(),
                expected: "24h, 7d, 30d, all",
            }),
        }
    }
}

/// Operation type filter for `/get_operations`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationFilter {
    #[default]
    All,
    Arbitrage,
    Sandwich,
    Liquidation,
}

impl OperationFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationFilter::All => "all",
            OperationFilter::Arbitrage => "arbitrage",
            OperationFilter::Sandwich => "sandwich",
            OperationFilter::Liquidation => "liquidation",
        }
    }
}

impl fmt::Display for OperationFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationFilter {
    type Err = ParseParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(OperationFilter::All),
            "arbitrage" => Ok(OperationFilter::Arbitrage),
            "sandwich" => Ok(OperationFilter::Sandwich),
            "liquidation" => Ok(OperationFilter::Liquidation),
            _ => Err(ParseParamError {
                kind: "filter",
                value: s.to_string(),
                expected: "all, arbitrage, sandwich, liquidation",
            }),
        }
    }
}
