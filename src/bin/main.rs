//! TRON DEX liquidity command line
//!
//! `quote` prints what an add-liquidity deposit would look like against the
//! live pool. `tui` opens the interactive form (needs the `tui` feature).

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use tron_dex_sdk::client::{resolve_token_details, ChainReader, TronClient};
use tron_dex_sdk::logging::{init_logging, LoggingConfig};
use tron_dex_sdk::session::{
    AddLiquiditySession, SessionEvent, SessionSettings, SessionView, TransactionDetails,
};
use tron_dex_sdk::{Config, LaunchParams, TronAddress};

#[derive(Parser)]
#[command(name = "tron-dex-liquidity")]
#[command(about = "Add liquidity to TRON DEX exchanges")]
#[command(version)]
struct Cli {
    /// Network section of config/network.toml (mainnet, nile)
    #[arg(short, long, default_value = "mainnet", global = true)]
    network: String,

    /// Path to a configuration file (defaults to the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Account whose balances and allowance are checked
    #[arg(short, long, global = true)]
    account: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Preview a deposit against the current pool
    Quote {
        /// Token address
        #[arg(short, long)]
        token: String,

        /// Amount of TRX to deposit
        #[arg(long, conflicts_with = "token_amount")]
        trx_amount: Option<String>,

        /// Amount of the token to deposit
        #[arg(long)]
        token_amount: Option<String>,

        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },
    /// Open the interactive add-liquidity form
    Tui {
        /// Launch parameters, e.g. "trxAmount=10&token=T..."
        #[arg(short, long)]
        launch: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.debug {
        logging.level = tron_dex_sdk::logging::LogLevel::Debug;
    }
    if matches!(cli.command, Commands::Tui { .. }) && logging.log_file_path.is_none() {
        // The form owns the terminal
        logging.log_file_path = Some(LoggingConfig::default_log_file());
    }
    init_logging(&logging)?;

    let config = Config::load_or_network(cli.config.as_ref(), &cli.network)
        .with_context(|| format!("loading configuration for {}", cli.network))?;
    debug!(network = %config.network.network_name, url = %config.network.full_node_url, "configuration loaded");

    let account = cli
        .account
        .as_deref()
        .map(str::parse::<TronAddress>)
        .transpose()
        .context("invalid --account")?;

    match cli.command {
        Commands::Quote {
            token,
            trx_amount,
            token_amount,
            json,
        } => {
            let launch = LaunchParams {
                base_amount: trx_amount,
                token_amount,
                token: Some(token),
                consumed: false,
            };
            let view = quote(config, launch, account).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_view(&view);
            }
        }
        Commands::Tui { launch } => run_form(config, launch, account).await?,
    }

    Ok(())
}

async fn quote(
    config: Config,
    launch: LaunchParams,
    account: Option<TronAddress>,
) -> Result<SessionView> {
    let client = TronClient::new(config.network.clone())?;
    let mut session = AddLiquiditySession::new(SessionSettings::from_config(&config), launch);
    session.apply(SessionEvent::AccountChanged(account));

    let currency = session.form().output_currency.clone();
    let details = resolve_token_details(&client, &config, &currency)
        .await
        .with_context(|| format!("resolving token {}", currency))?;
    let Some(details) = details else {
        bail!("{} is not a token", currency);
    };
    info!(symbol = %details.symbol, exchange = ?details.exchange_address, "token resolved");
    session.apply(SessionEvent::TokenResolved(Some(details.clone())));

    let snapshot = client.pool_snapshot(&details, account.as_ref()).await?;
    session.apply(SessionEvent::ReservesUpdated(snapshot));
    Ok(session.view())
}

fn print_view(view: &SessionView) {
    let symbol = view.symbol.as_deref().unwrap_or("?");
    println!("Deposit:        {} TRX", or_dash(&view.form.input_value));
    println!("                {} {}", or_dash(&view.form.output_value), symbol);
    if let Some(rate) = &view.summary.exchange_rate {
        println!("Exchange rate:  {}", rate);
    }
    if let Some(size) = &view.summary.pool_size {
        println!("Pool size:      {}", size);
    }
    if let (Some(percent), Some(amounts)) = (&view.summary.share_percent, &view.summary.share_amounts) {
        println!("Your share:     {}% ({})", percent, amounts);
    }
    match &view.details {
        Some(TransactionDetails::NewExchange {
            initial_rate,
            minted,
            ..
        }) => {
            println!("New exchange, initial rate {}", initial_rate.as_deref().unwrap_or("-"));
            println!("Pool tokens:    {}", minted);
        }
        Some(TransactionDetails::Existing {
            max_token_amount,
            minted,
            total_supply,
            ..
        }) => {
            println!("Max tokens:     {} {}", max_token_amount, symbol);
            println!("Pool tokens:    {} of {}", minted, total_supply);
        }
        None => {}
    }
    if let Some(info) = &view.contextual_info {
        println!("{}", info.message);
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

#[cfg(feature = "tui")]
async fn run_form(config: Config, launch: Option<String>, account: Option<TronAddress>) -> Result<()> {
    use std::sync::Arc;
    use tron_dex_sdk::controller::{AddLiquidityController, ControllerDeps};
    use tron_dex_sdk::submit::InMemoryPendingTransactions;

    let launch = match launch {
        Some(query) => LaunchParams::from_query(&query)?,
        None => LaunchParams::default(),
    };
    let network_name = config.network.network_name.clone();
    let client = Arc::new(TronClient::new(config.network.clone())?);
    let deps = ControllerDeps {
        reader: client.clone(),
        submitter: client,
        pending: Arc::new(InMemoryPendingTransactions::new()),
    };
    let handle = AddLiquidityController::spawn(deps, Arc::new(config), launch, account);
    tron_dex_sdk::tui::run_tui(handle, network_name).await?;
    Ok(())
}

#[cfg(not(feature = "tui"))]
async fn run_form(_config: Config, _launch: Option<String>, _account: Option<TronAddress>) -> Result<()> {
    bail!("this binary was built without the `tui` feature; rebuild with --features tui")
}
