//! walletlib — in-process payment ledger with parallel aggregation over the payment log.

pub mod aggregate;
pub mod config;
pub mod dump;
pub mod error;
pub mod model;
pub mod progress;
pub mod service;
pub mod traits;

pub mod formats {
    pub mod lines;
    pub mod pipe;
    pub(crate) mod record;
}

pub use config::AggregateConfig;
pub use error::{Result, WalletError};
pub use model::{Account, AccountId, Favorite, Money, Payment, PaymentStatus, Progress};
pub use progress::ProgressStream;
pub use service::Wallet;
