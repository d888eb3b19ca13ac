//! Demo Data
//!
//! Synthetic profits and operations for placeholder display. Nothing here
//! reflects real trading activity.

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest generated profit (SOL)
pub const MIN_PROFIT: f64 = 0.2;
/// Hard ceiling on generated profit (SOL)
pub const MAX_PROFIT: f64 = 14.0;
/// Rate of the exponential tail
pub const LAMBDA: f64 = 0.5;
/// Scale applied to the uniform draw before the log transform
pub const SKEW: f64 = 0.95;

/// Window that simulated operation timestamps fall in
const OPERATION_WINDOW_MS: i64 = 3_600_000;

/// Map a uniform draw `u` in `[0, 1)` to a profit in `[MIN_PROFIT, MAX_PROFIT]`.
///
/// `MIN_PROFIT + -ln(1 - SKEW·u) / LAMBDA`, clamped to `MAX_PROFIT`. Small
/// profits are far more likely than large ones.
pub fn profit_from_uniform(u: f64) -> f64 {
    let profit = MIN_PROFIT + (-(1.0 - u * SKEW).ln() / LAMBDA);
    profit.min(MAX_PROFIT)
}

/// Draw a random profit
pub fn generate_profit<R: Rng>(rng: &mut R) -> f64 {
    profit_from_uniform(rng.gen::<f64>())
}

/// Draw a random profit from the thread RNG
pub fn random_profit() -> f64 {
    generate_profit(&mut rand::thread_rng())
}

/// Kind of simulated trading action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    Arbitrage,
    Sandwich,
    Liquidation,
}

impl OperationKind {
    pub const ALL: [OperationKind; 3] = [
        OperationKind::Arbitrage,
        OperationKind::Sandwich,
        OperationKind::Liquidation,
    ];
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// DEX a simulated operation is routed through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    Jupiter,
    Orca,
    Raydium,
    Serum,
}

impl Venue {
    pub const ALL: [Venue; 4] = [Venue::Jupiter, Venue::Orca, Venue::Raydium, Venue::Serum];
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A fake completed operation for demo feeds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedOperation {
    #[serde(rename = "type")]
    pub kind: OperationKind,
    pub dex: Venue,
    pub profit: f64,
    pub time: DateTime<Utc>,
    pub status: String,
}

/// Generate an operation with a timestamp in the hour before `now`
pub fn generate_operation_at<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> SimulatedOperation {
    let kind = *OperationKind::ALL.choose(rng).unwrap_or(&OperationKind::Arbitrage);
    let dex = *Venue::ALL.choose(rng).unwrap_or(&Venue::Jupiter);
    let profit = generate_profit(rng);
    let age_ms = rng.gen_range(0..OPERATION_WINDOW_MS);

    SimulatedOperation {
        kind,
        dex,
        profit,
        time: now - Duration::milliseconds(age_ms),
        status: "completed".to_string(),
    }
}

/// Generate an operation from the thread RNG, timestamped within the last hour
pub fn random_operation() -> SimulatedOperation {
    generate_operation_at(&mut rand::thread_rng(), Utc::now())
}
