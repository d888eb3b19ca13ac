//! JitoX CLI
//!
//! Command-line interface for the JitoX backend:
//! - Query wallet, balance, PNL, operations and global stats
//! - Submit deposits and withdrawals
//! - Wait for a wallet to be provisioned
//! - Preview tiers and demo data

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use jitox::client::{
    ApiResult, BackendClient, OperationFilter, Period, WalletInfo, DEFAULT_OPERATIONS_LIMIT,
};
use jitox::config::{generate_default_config, Config, LoggingConfig};
use jitox::display::{format_address, format_sol, format_usd, time_ago, Tier};
use jitox::polling::{PollEvent, WalletPoller};
use jitox::simulation::random_operation;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "jitox")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "JitoX Terminal backend client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the backend base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Look up a user's wallet
    Wallet { user_id: String },

    /// Show a user's trading balance
    Balance { user_id: String },

    /// Show a user's PNL
    Pnl {
        user_id: String,
        /// Period (24h, 7d, 30d, all)
        #[arg(short, long, default_value = "24h")]
        period: Period,
    },

    /// List recent operations
    Operations {
        user_id: String,
        /// Filter (all, arbitrage, sandwich, liquidation)
        #[arg(short = 'F', long, default_value = "all")]
        filter: OperationFilter,
        /// Number of operations
        #[arg(short, long, default_value_t = DEFAULT_OPERATIONS_LIMIT)]
        limit: u32,
    },

    /// Show global MEV statistics
    Stats,

    /// Show the current SOL price
    Price,

    /// Submit a deposit request
    Deposit { user_id: String, amount: f64 },

    /// Submit a withdrawal request
    Withdraw { user_id: String, amount: f64 },

    /// Poll until the user's wallet is provisioned
    Poll {
        user_id: String,
        /// Polling interval (default: from config)
        #[arg(short, long)]
        interval_ms: Option<u64>,
        /// Give up after this many seconds
        #[arg(short, long)]
        timeout_secs: Option<u64>,
    },

    /// Classify a balance into a tier
    Tier {
        #[arg(allow_negative_numbers = true)]
        balance: f64,
    },

    /// Print simulated demo operations
    Simulate {
        #[arg(long, default_value_t = 5)]
        count: usize,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.base_url {
        config.client.base_url = url.clone();
    }

    init_logging(&config.logging);
    tracing::debug!(
        base_url = %config.client.base_url,
        "JitoX CLI v{}",
        env!("CARGO_PKG_VERSION")
    );

    let format = cli.format;
    let client = BackendClient::new(config.client.clone())?;

    match cli.command {
        Commands::Wallet { user_id } => {
            let result = client.fetch_wallet(&user_id).await;
            print_result(format, &result, wallet_line)
        }
        Commands::Balance { user_id } => {
            let result = client.fetch_balance(&user_id).await;
            print_result(format, &result, |data| {
                let balance = data.get("balance").and_then(|b| b.as_f64()).unwrap_or(0.0);
                let tier = Tier::from_balance(balance);
                format!(
                    "Balance: {} SOL  Tier: {} ({})",
                    format_sol(balance, 4),
                    tier,
                    tier.description()
                )
            })
        }
        Commands::Pnl { user_id, period } => {
            let result = client.fetch_pnl(&user_id, period).await;
            print_result(format, &result, |data| format!("PNL ({}): {}", period, data))
        }
        Commands::Operations {
            user_id,
            filter,
            limit,
        } => {
            let result = client.fetch_operations(&user_id, filter, limit).await;
            print_result(format, &result, |data| format!("Operations ({}): {}", filter, data))
        }
        Commands::Stats => {
            let result = client.fetch_mev_stats().await;
            print_result(format, &result, |data| format!("MEV stats: {}", data))
        }
        Commands::Price => {
            let price = client.fetch_sol_price().await;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::json!({ "solana": { "usd": price } }))
                }
                OutputFormat::Table => println!("SOL: {}", format_usd(price)),
            }
            Ok(())
        }
        Commands::Deposit { user_id, amount } => {
            let result = client.submit_deposit(&user_id, amount).await;
            print_result(format, &result, |data| {
                format!("Deposit of {} SOL submitted: {}", format_sol(amount, 4), data)
            })
        }
        Commands::Withdraw { user_id, amount } => {
            let result = client.submit_withdrawal(&user_id, amount).await;
            print_result(format, &result, |data| {
                format!("Withdrawal of {} SOL submitted: {}", format_sol(amount, 4), data)
            })
        }
        Commands::Poll {
            user_id,
            interval_ms,
            timeout_secs,
        } => {
            let interval = Duration::from_millis(interval_ms.unwrap_or(config.polling.interval_ms));
            let timeout = timeout_secs.map(Duration::from_secs);
            poll_wallet(client, &user_id, interval, timeout, format).await
        }
        Commands::Tier { balance } => {
            let tier = Tier::from_balance(balance);
            match format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::json!({
                        "name": tier.name(),
                        "level": tier.level(),
                        "color": tier.color(),
                        "description": tier.description(),
                    })
                ),
                OutputFormat::Table => {
                    println!("{} (level {}): {}", tier, tier.level(), tier.description())
                }
            }
            Ok(())
        }
        Commands::Simulate { count } => {
            for _ in 0..count {
                let op = random_operation();
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string(&op)?),
                    OutputFormat::Table => println!(
                        "{:<12} {:<8} +{} SOL  {}",
                        op.kind.to_string(),
                        op.dex.to_string(),
                        format_sol(op.profit, 3),
                        time_ago(Some(op.time))
                    ),
                }
            }
            Ok(())
        }
        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
            Ok(())
        }
    }
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("jitox={}", logging.level)));
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so command output stays parseable
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_result<T, F>(format: OutputFormat, result: &ApiResult<T>, table: F) -> anyhow::Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Table => match result {
            ApiResult::Success(data) => println!("{}", table(data)),
            ApiResult::Failure(error) => eprintln!("Error: {}", error),
        },
    }

    if result.is_success() {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

fn wallet_line(info: &WalletInfo) -> String {
    if !info.has_wallet() {
        return "Wallet: not yet provisioned".to_string();
    }
    match (info.wallet(), info.wallet_value()) {
        (Some(wallet), _) => format!("Wallet: {} ({})", format_address(wallet), wallet),
        (None, Some(other)) => format!("Wallet: {}", other),
        (None, None) => "Wallet: not yet provisioned".to_string(),
    }
}

async fn poll_wallet(
    client: BackendClient,
    user_id: &str,
    interval: Duration,
    timeout: Option<Duration>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let poller = WalletPoller::for_client(client);
    let (_, mut events) = poller.start_channel(user_id, interval);
    let deadline = async {
        match timeout {
            Some(timeout) => tokio::time::sleep(timeout).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(PollEvent::Found(info)) => {
                    match format {
                        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&info)?),
                        OutputFormat::Table => println!("{}", wallet_line(&info)),
                    }
                    return Ok(());
                }
                Some(PollEvent::Error(error)) => eprintln!("Poll failed: {} (retrying)", error),
                None => anyhow::bail!("polling ended without a wallet"),
            },
            _ = &mut deadline => {
                poller.stop();
                anyhow::bail!("no wallet provisioned for user {} before timeout", user_id);
            }
            _ = tokio::signal::ctrl_c() => {
                poller.stop();
                anyhow::bail!("interrupted");
            }
        }
    }
}
