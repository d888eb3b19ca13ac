//! # JitoX
//!
//! Client-side core of the JitoX Terminal MEV dashboard.
//!
//! ## Features
//!
//! - **Backend client**: wallet, balance, PNL, operations and MEV statistics
//!   with a tagged success/failure result instead of errors
//! - **Price lookup**: SOL/USD price that falls back to a fixed value
//! - **Wallet polling**: cancellable loop that waits for a wallet to be provisioned
//! - **Display helpers**: tiers, address shortening, SOL/USD and relative time
//! - **Demo data**: right-skewed synthetic profits and operations
//!
//! ## Modules
//!
//! - [`client`]: HTTP client for the JitoX backend
//! - [`polling`]: Wallet polling sessions
//! - [`display`]: Pure formatting and classification
//! - [`simulation`]: Synthetic demo data
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jitox::client::{BackendClient, Period};
//! use jitox::config::ClientConfig;
//! use jitox::display::{format_usd, Tier};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BackendClient::new(ClientConfig::default())?;
//!
//!     match client.fetch_pnl("123456789", Period::Week).await.into_result() {
//!         Ok(pnl) => println!("PNL: {}", pnl),
//!         Err(e) => eprintln!("PNL unavailable: {}", e),
//!     }
//!
//!     let price = client.fetch_sol_price().await;
//!     println!("SOL: {} ({})", format_usd(price), Tier::from_balance(7.5));
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod display;
pub mod polling;
pub mod simulation;

// Re-export top-level types for convenience
pub use client::{
    ApiResult, BackendClient, ClientError, OperationFilter, Period, WalletInfo, FALLBACK_SOL_PRICE,
};

pub use polling::{PollEvent, PollState, WalletPoller, WalletSource, DEFAULT_POLL_INTERVAL};

pub use display::{format_address, format_sol, format_usd, time_ago, Tier};

pub use simulation::{random_operation, random_profit, OperationKind, SimulatedOperation, Venue};

pub use config::{ClientConfig, Config, ConfigError, LoggingConfig, PollingConfig};
