//! Single error type of the public API.

use thiserror::Error;

use crate::model::AccountId;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("phone already registered")]
    DuplicatePhone,

    #[error("account id {0} already exists")]
    DuplicateAccountId(AccountId),

    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("account not found")]
    AccountNotFound,

    #[error("amount overflows the balance range")]
    AmountOverflow,

    #[error("not enough balance")]
    InsufficientBalance,

    #[error("payment not found")]
    PaymentNotFound,

    #[error("favorite not found")]
    FavoriteNotFound,

    #[error("worker count must be at least 1")]
    InvalidWorkerCount,

    #[error("records per file must be at least 1")]
    InvalidRecordsPerFile,

    #[error("aggregation worker panicked")]
    WorkerPanicked,

    #[error("thread pool error: {0}")]
    ThreadPool(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, WalletError>;
