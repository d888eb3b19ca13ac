//! Display Helpers
//!
//! Pure formatting and classification used by dashboard consumers:
//! tier lookup by balance, wallet address shortening, SOL/USD amounts and
//! relative timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Balance at or above which a user is a Predator (SOL)
pub const PREDATOR_THRESHOLD: f64 = 15.0;
/// Balance at or above which a user is an Operator (SOL)
pub const OPERATOR_THRESHOLD: f64 = 5.0;

/// Strategy access tier, ordered from lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Recruit,
    Scout,
    Operator,
    Predator,
}

impl Tier {
    /// All tiers in ascending order
    pub const ALL: [Tier; 4] = [Tier::Recruit, Tier::Scout, Tier::Operator, Tier::Predator];

    /// Classify a balance.
    ///
    /// Each threshold belongs to the higher tier: `15.0` is Predator,
    /// `5.0` is Operator. Zero, negative and NaN balances are Recruit.
    pub fn from_balance(balance: f64) -> Self {
        if balance >= PREDATOR_THRESHOLD {
            Tier::Predator
        } else if balance >= OPERATOR_THRESHOLD {
            Tier::Operator
        } else if balance > 0.0 {
            Tier::Scout
        } else {
            Tier::Recruit
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tier::Recruit => "RECRUIT",
            Tier::Scout => "SCOUT",
            Tier::Operator => "OPERATOR",
            Tier::Predator => "PREDATOR",
        }
    }

    pub fn level(&self) -> u8 {
        match self {
            Tier::Recruit => 0,
            Tier::Scout => 1,
            Tier::Operator => 2,
            Tier::Predator => 3,
        }
    }

    /// Badge color as a hex string
    pub fn color(&self) -> &'static str {
        match self {
            Tier::Recruit => "#666666",
            Tier::Scout => "#00ffff",
            Tier::Operator => "#ffbb00",
            Tier::Predator => "#ff4444",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Tier::Recruit => "No active deployment",
            Tier::Scout => "Basic arbitrage and sandwich operations",
            Tier::Operator => "Advanced sandwich patterns and priority routing",
            Tier::Predator => "Highest priority execution with all strategies unlocked",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shorten a wallet address to `ABCD...WXYZ`.
///
/// Addresses shorter than 8 characters are returned unchanged.
pub fn format_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() < 8 {
        return address.to_string();
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Format a SOL amount with fixed precision
pub fn format_sol(amount: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, amount)
}

/// Format a SOL amount with two decimals
pub fn format_sol2(amount: f64) -> String {
    format_sol(amount, 2)
}

/// Format a SOL amount taken from a JSON payload; non-numbers yield `"0.00"`
pub fn format_sol_value(amount: &Value, decimals: usize) -> String {
    match amount.as_f64() {
        Some(amount) => format_sol(amount, decimals),
        None => "0.00".to_string(),
    }
}

/// Format a USD amount as en-US currency, e.g. `$1,234.50` or `-$3.00`.
///
/// Non-finite amounts yield `"$0.00"`. Negative amounts that round to zero
/// are printed unsigned: `-0.001` gives `"$0.00"`, not `"-$0.00"`.
pub fn format_usd(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0.00".to_string();
    }

    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let negative = amount < 0.0 && fixed != "0.00";

    format!(
        "{}${}.{}",
        if negative { "-" } else { "" },
        group_thousands(whole),
        cents
    )
}

/// Format a USD amount taken from a JSON payload; non-numbers yield `"$0.00"`
pub fn format_usd_value(amount: &Value) -> String {
    match amount.as_f64() {
        Some(amount) => format_usd(amount),
        None => "$0.00".to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Relative time since `date`, e.g. `3d ago`
pub fn time_ago(date: Option<DateTime<Utc>>) -> String {
    time_ago_at(date, Utc::now())
}

/// Relative time since `date`, measured from `now`.
///
/// Uses the largest whole unit of days, hours or minutes; anything under a
/// minute (or in the future) is `Just now`.
pub fn time_ago_at(date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(date) = date else {
        return "Unknown".to_string();
    };

    let elapsed = now.signed_duration_since(date);
    let days = elapsed.num_days();
    let hours = elapsed.num_hours();
    let minutes = elapsed.num_minutes();

    if days > 0 {
        format!("{}d ago", days)
    } else if hours > 0 {
        format!("{}h ago", hours)
    } else if minutes > 0 {
        format!("{}m ago", minutes)
    } else {
        "Just now".to_string()
    }
}
