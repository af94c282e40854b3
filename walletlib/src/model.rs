//! Ledger entities shared by the store, the aggregation engine and the dump formats.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WalletError;

/// Amount in the smallest currency unit.
pub type Money = i64;
pub type Phone = String;
pub type PaymentCategory = String;
pub type AccountId = i64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub phone: Phone,
    pub balance: Money,
}

/// There is no terminal success state: a payment that is never rejected
/// stays `InProgress`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    InProgress,
    Fail,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::InProgress => "INPROGRESS",
            PaymentStatus::Fail => "FAIL",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INPROGRESS" => Ok(PaymentStatus::InProgress),
            "FAIL" => Ok(PaymentStatus::Fail),
            other => Err(WalletError::Parse(format!("unknown payment status: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Payment {
    pub id: String,
    pub account_id: AccountId,
    pub amount: Money,
    pub category: PaymentCategory,
    pub status: PaymentStatus,
}

/// Template for re-paying a past payment. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Favorite {
    pub id: String,
    pub account_id: AccountId,
    pub amount: Money,
    pub category: PaymentCategory,
    pub name: String,
}

/// Partial sum of one chunk of the payment log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Progress {
    pub part: usize,
    pub result: Money,
}
