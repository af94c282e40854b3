use clap::{Parser, Subcommand};
use config::{Config, ConfigError};
use std::path::PathBuf;
use std::process;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use walletlib::{dump::history_to_files, AggregateConfig, Wallet, WalletError};

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Parser, Debug)]
#[command(name = "wallet", version, about = "Payment ledger over a dump directory")]
struct Cli {
    /// Directory holding accounts.dump, payments.dump and favorites.dump
    #[arg(short = 'd', long = "dir", default_value = ".")]
    dir: PathBuf,

    /// TOML file with aggregation settings (WALLET_* env vars override it)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a new account
    Register { phone: String },
    /// Credit an account
    Deposit { account: i64, amount: i64 },
    /// Pay from an account
    Pay {
        account: i64,
        amount: i64,
        category: String,
    },
    /// Reject a payment and refund it
    Reject { payment: String },
    /// Repeat an earlier payment
    Repeat { payment: String },
    /// Save a payment as a favorite
    Favorite { payment: String, name: String },
    /// Pay using a saved favorite
    PayFavorite { favorite: String },
    /// Sum of all payments
    Sum {
        #[arg(short = 'w', long = "workers", default_value_t = 100)]
        workers: usize,
    },
    /// List the payments of an account
    Filter {
        account: i64,
        #[arg(short = 'w', long = "workers", default_value_t = 100)]
        workers: usize,
    },
    /// Sum of all payments, reported chunk by chunk
    Progress,
    /// Write the payment history of an account in pages
    History {
        account: i64,
        /// Output directory
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
        /// Records per file
        #[arg(short = 'r', long = "records", default_value_t = 1000)]
        records: usize,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    if let Err(err) = run() {
        eprintln!("wallet failed: {err}");
        process::exit(1);
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<AggregateConfig, ConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path.as_path()));
    }
    builder
        .add_source(config::Environment::with_prefix("WALLET").try_parsing(true))
        .build()?
        .try_deserialize()
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    debug!(?config, dir = %cli.dir.display(), "loaded wallet config");

    let mut wallet = Wallet::with_config(config)?;
    wallet.import(&cli.dir)?;

    let mutated = match cli.command {
        Command::Register { phone } => {
            let account = wallet.register_account(&phone)?;
            println!("account {} registered", account.id);
            true
        }
        Command::Deposit { account, amount } => {
            wallet.deposit(account, amount)?;
            println!("balance {}", wallet.find_account_by_id(account)?.balance);
            true
        }
        Command::Pay {
            account,
            amount,
            category,
        } => {
            let payment = wallet.pay(account, amount, &category)?;
            println!("{}", payment.id);
            true
        }
        Command::Reject { payment } => {
            wallet.reject(&payment)?;
            true
        }
        Command::Repeat { payment } => {
            println!("{}", wallet.repeat(&payment)?.id);
            true
        }
        Command::Favorite { payment, name } => {
            println!("{}", wallet.favorite_payment(&payment, &name)?.id);
            true
        }
        Command::PayFavorite { favorite } => {
            println!("{}", wallet.pay_from_favorite(&favorite)?.id);
            true
        }
        Command::Sum { workers } => {
            println!("{}", wallet.sum_payments(workers)?);
            false
        }
        Command::Filter { account, workers } => {
            for p in wallet.filter_payments(account, workers)? {
                println!("{};{};{};{}", p.id, p.amount, p.category, p.status);
            }
            false
        }
        Command::Progress => {
            let mut stream = wallet.sum_payments_with_progress()?;
            let parts = stream.parts();
            for progress in stream.by_ref() {
                println!("part {}/{}: {}", progress.part + 1, parts, progress.result);
            }
            println!("total {}", stream.finish()?);
            false
        }
        Command::History {
            account,
            output,
            records,
        } => {
            let history = wallet.export_account_history(account);
            history_to_files(&history, &output, records)?;
            false
        }
    };

    if mutated {
        wallet.export(&cli.dir)?;
    }
    Ok(())
}
