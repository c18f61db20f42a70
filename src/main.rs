use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::Path;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cosmos_wallet::chain::coin::{format_coins, parse_coins};
use cosmos_wallet::chain::{BroadcastMode, ChainClient, KeyPair, SendMsg, TransactionRequest};
use cosmos_wallet::config::Config;
use cosmos_wallet::Wallet;

#[derive(Parser)]
#[command(name = "cosmos-wallet")]
#[command(about = "Wallet client for Cosmos SDK chains", version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "wallet.toml")]
    config: String,

    /// Mnemonic, overrides the one in the configuration file
    #[arg(long, global = true, env = "WALLET_MNEMONIC", hide_env_values = true)]
    mnemonic: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a default configuration file
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "wallet.toml")]
        output: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the account address for the configured key
    Address,

    /// Print the chain id reported by the node
    ChainId,

    /// Show account number and sequence
    Account {
        /// Address to query, defaults to the configured key
        address: Option<String>,
    },

    /// Send tokens
    Send {
        /// Recipient address
        to: String,

        /// Amount, e.g. 10000udaric
        amount: String,

        #[arg(long, default_value = "")]
        memo: String,

        /// Gas limit; simulated when omitted
        #[arg(long)]
        gas: Option<u64>,

        /// Fee coins; computed from the gas price when omitted
        #[arg(long)]
        fees: Option<String>,

        /// Account paying the fees through a fee grant
        #[arg(long)]
        fee_granter: Option<String>,

        /// async, sync or commit
        #[arg(long, default_value = "sync")]
        mode: BroadcastMode,
    },

    /// Estimate the gas of a send without broadcasting it
    Simulate {
        /// Recipient address
        to: String,

        /// Amount, e.g. 10000udaric
        amount: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cosmos_wallet=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { output, force } => {
            if Path::new(&output).exists() && !force {
                bail!("{} already exists, use --force to overwrite it", output);
            }
            Config::default().save(&output)?;
            info!("Configuration file created at: {}", output);
        }
        Commands::Address => {
            let config = load_config(&cli.config, cli.mnemonic)?;
            let keys = KeyPair::derive(
                &config.account.mnemonic,
                &config.account.passphrase,
                &config.account.hd_path,
            )?;
            println!("{}", keys.address(&config.chain.bech32_prefix)?);
        }
        Commands::ChainId => {
            let config = load_config(&cli.config, cli.mnemonic)?;
            let client = ChainClient::connect(&config.chain).await?;
            println!("{}", client.get_chain_id().await?);
        }
        Commands::Account { address } => {
            let config = load_config(&cli.config, cli.mnemonic)?;
            let client = ChainClient::connect(&config.chain).await?;
            let address = match address {
                Some(address) => address,
                None => Wallet::new(&config.account, client.clone())?.address()?,
            };

            let account = client.get_account(&address).await?;
            println!("address:        {}", account.address);
            println!("account number: {}", account.account_number);
            println!("sequence:       {}", account.sequence);
        }
        Commands::Send {
            to,
            amount,
            memo,
            gas,
            fees,
            fee_granter,
            mode,
        } => {
            let config = load_config(&cli.config, cli.mnemonic)?;
            let wallet = connect_wallet(&config).await?;

            let mut request = send_request(&wallet, &to, &amount)?.with_memo(memo);
            request = match gas {
                Some(gas) => request.with_gas_limit(gas),
                None => request.with_gas_auto(),
            };
            request = match fees {
                Some(fees) => request.with_fee_amount(parse_coins(&fees)?),
                None => request.with_fee_auto(),
            };
            if let Some(granter) = fee_granter {
                request = request.with_fee_granter(granter);
            }

            let tx = wallet.build_tx(&request).await?;
            info!(
                "Broadcasting {} (gas {}, fee {})",
                tx.tx_hash(),
                tx.gas_limit(),
                format_coins(tx.fee())
            );

            let result = wallet.client().broadcast_tx(&tx, mode).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.is_success() {
                bail!("transaction rejected with code {}: {}", result.code, result.raw_log);
            }
        }
        Commands::Simulate { to, amount } => {
            let config = load_config(&cli.config, cli.mnemonic)?;
            let wallet = connect_wallet(&config).await?;

            let request = send_request(&wallet, &to, &amount)?;
            let gas = wallet.simulate_tx(&request).await?;
            let fees = wallet.client().get_fees(gas)?;
            println!("gas: {}", gas);
            println!("fee: {}", format_coins(&fees));
        }
    }

    Ok(())
}

fn load_config(path: &str, mnemonic: Option<String>) -> Result<Config> {
    let mut config = Config::load(path)
        .with_context(|| format!("run `cosmos-wallet init -o {}` to create a configuration", path))?;

    if let Some(mnemonic) = mnemonic {
        config.account.mnemonic = mnemonic;
    }
    Ok(config)
}

async fn connect_wallet(config: &Config) -> Result<Wallet> {
    let client = ChainClient::connect(&config.chain).await?;
    let wallet = Wallet::new(&config.account, client)?;
    info!("Using account {}", wallet.address()?);
    Ok(wallet)
}

fn send_request(wallet: &Wallet, to: &str, amount: &str) -> Result<TransactionRequest> {
    wallet
        .client()
        .parse_address(to)
        .context("invalid recipient")?;

    let amount = parse_coins(amount)?;
    if amount.is_empty() {
        bail!("amount must not be empty");
    }

    let msg = SendMsg::new(wallet.address()?, to, amount);
    Ok(TransactionRequest::new(msg))
}
