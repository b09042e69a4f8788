//! eth-facade command line.
//!
//! ```text
//!   amounts ──▶ units ──▶ lifecycle ──▶ gateway ──▶ node (JSON-RPC)
//!                 ▲           │
//!                 └───────────┘  display strings back to the user
//! ```
//!
//! Offline commands (`new-wallet`, `derive`, `validate`, `convert`) never
//! build a gateway. Node commands build exactly one per process.

use std::path::PathBuf;
use std::sync::Arc;

use alloy::primitives::U256;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;

use eth_facade::blockchain::{
    checksum_address, generate_wallet, is_valid_address, wallet_from_mnemonic, FacadeError,
    RpcGateway, TransactionLifecycle, Wallet,
};
use eth_facade::config::{load_config, validate_config, ConfigError, FacadeConfig};
use eth_facade::observability::init_logging;
use eth_facade::units;

#[derive(Parser)]
#[command(name = "eth-facade")]
#[command(about = "Wallet, balance and transaction tool for an Ethereum node", long_about = None)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the node JSON-RPC URL.
    #[arg(long)]
    rpc_url: Option<String>,

    /// Override the expected chain ID.
    #[arg(long)]
    chain_id: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new mnemonic and derive its first account
    NewWallet {
        #[arg(long)]
        words: Option<usize>,
    },
    /// Derive the account of an existing mnemonic
    Derive {
        phrase: String,
    },
    /// Check an address string
    Validate {
        address: String,
    },
    /// Convert amounts between display and raw units
    Convert {
        #[command(subcommand)]
        direction: ConvertCommand,
    },
    /// Native balance in ether
    Balance {
        address: String,
    },
    /// ERC20 balance
    TokenBalance {
        address: String,
        contract: String,
        /// Skip the decimals lookup
        #[arg(long)]
        decimals: Option<u8>,
    },
    /// ERC20 symbol, name and decimals
    TokenInfo {
        contract: String,
    },
    /// Estimate gas for an ERC20 transfer
    EstimateGas {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        token: String,
        /// Amount in token units, e.g. 1.5
        #[arg(long)]
        amount: String,
    },
    /// Prepare, sign and broadcast a transfer with the key from the environment
    Send {
        #[arg(long)]
        to: String,
        /// Amount in ether or token units
        #[arg(long)]
        amount: String,
        /// ERC20 contract; native transfer when omitted
        #[arg(long)]
        token: Option<String>,
    },
    /// Broadcast a hex-encoded signed transaction
    Broadcast {
        payload: String,
    },
    /// Whether a transaction is mined with a successful receipt
    Confirmed {
        tx_id: String,
    },
    /// Pending, included or reverted
    Status {
        tx_id: String,
    },
    /// Look up a transaction
    Tx {
        tx_id: String,
    },
    /// List the transactions of a block
    Block {
        height: u64,
    },
}

#[derive(Subcommand)]
enum ConvertCommand {
    /// Raw integer to display string
    ToDisplay {
        raw: String,
        #[arg(long, default_value_t = units::ETHER_DECIMALS)]
        decimals: u8,
    },
    /// Display string to raw integer
    FromDisplay {
        amount: String,
        #[arg(long, default_value_t = units::ETHER_DECIMALS)]
        decimals: u8,
    },
    /// Legacy 9-decimal amount to i64
    ToWei {
        amount: String,
    },
    /// Legacy i64 to 9-decimal amount
    FromWei {
        #[arg(allow_hyphen_values = true)]
        amount: i64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => FacadeConfig::default(),
    };
    if let Some(rpc_url) = cli.rpc_url {
        config.node.rpc_url = rpc_url;
    }
    if let Some(chain_id) = cli.chain_id {
        config.node.chain_id = chain_id;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    init_logging(&config.observability.log_level);

    match cli.command {
        Commands::NewWallet { words } => {
            let word_count = words.unwrap_or(config.wallet.word_count);
            let wallet = generate_wallet(word_count, &config.wallet.derivation_path)?;
            print_json(&wallet)?;
        }
        Commands::Derive { phrase } => {
            let wallet = wallet_from_mnemonic(&phrase, &config.wallet.derivation_path)?;
            print_json(&wallet)?;
        }
        Commands::Validate { address } => {
            let valid = is_valid_address(&address);
            let checksummed = valid.then(|| checksum_address(&address)).transpose()?;
            print_json(&json!({ "address": address, "valid": valid, "checksum": checksummed }))?;
        }
        Commands::Convert { direction } => run_convert(direction)?,
        Commands::Balance { address } => {
            let balance = connect(&config)?.native_balance(&address).await?;
            print_json(&json!({ "address": address, "balance": balance }))?;
        }
        Commands::TokenBalance {
            address,
            contract,
            decimals,
        } => {
            let lifecycle = connect(&config)?;
            let balance = match decimals {
                Some(decimals) => {
                    lifecycle
                        .token_balance_with_decimals(&address, &contract, decimals)
                        .await?
                }
                None => lifecycle.token_balance(&address, &contract).await?,
            };
            print_json(&json!({ "address": address, "contract": contract, "balance": balance }))?;
        }
        Commands::TokenInfo { contract } => {
            print_json(&connect(&config)?.token_metadata(&contract).await?)?;
        }
        Commands::EstimateGas {
            from,
            to,
            token,
            amount,
        } => {
            let gas = connect(&config)?
                .estimate_transfer_gas(&from, &to, &amount, Some(token.as_str()))
                .await?;
            print_json(&json!({ "gas": gas }))?;
        }
        Commands::Send { to, amount, token } => {
            let wallet = Wallet::from_env()?;
            let from = wallet.address().to_string();

            let lifecycle = connect(&config)?;
            let request = lifecycle
                .prepare_display_transfer(
                    &from,
                    &to,
                    &amount,
                    token.as_deref(),
                    config.node.chain_id,
                )
                .await?;
            let payload = wallet.sign_transaction(request).await?;
            let tx_hash = lifecycle.broadcast_bytes(payload).await?;
            print_json(&json!({ "tx_id": tx_hash }))?;
        }
        Commands::Broadcast { payload } => {
            let tx_hash = connect(&config)?.broadcast(&payload).await?;
            print_json(&json!({ "tx_id": tx_hash }))?;
        }
        Commands::Confirmed { tx_id } => {
            let confirmed = connect(&config)?.is_confirmed(&tx_id).await?;
            print_json(&json!({ "tx_id": tx_id, "confirmed": confirmed }))?;
        }
        Commands::Status { tx_id } => {
            let status = connect(&config)?.transaction_status(&tx_id).await?;
            print_json(&json!({ "tx_id": tx_id, "status": status }))?;
        }
        Commands::Tx { tx_id } => {
            print_json(&connect(&config)?.transaction(&tx_id).await?)?;
        }
        Commands::Block { height } => {
            print_json(&connect(&config)?.block_transactions(height).await?)?;
        }
    }

    Ok(())
}

/// Build the process's single node gateway.
fn connect(config: &FacadeConfig) -> Result<TransactionLifecycle<RpcGateway>, FacadeError> {
    let gateway = Arc::new(RpcGateway::connect(&config.node)?);
    Ok(TransactionLifecycle::new(gateway))
}

fn run_convert(direction: ConvertCommand) -> Result<(), Box<dyn std::error::Error>> {
    match direction {
        ConvertCommand::ToDisplay { raw, decimals } => {
            let raw = U256::from_str_radix(&raw, 10)
                .map_err(|_| FacadeError::InvalidFormat(format!("raw amount '{raw}'")))?;
            println!("{}", units::to_display(raw, decimals));
        }
        ConvertCommand::FromDisplay { amount, decimals } => {
            println!("{}", units::from_display(&amount, decimals)?);
        }
        ConvertCommand::ToWei { amount } => println!("{}", units::to_wei(&amount)?),
        ConvertCommand::FromWei { amount } => println!("{}", units::from_wei(amount)),
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
