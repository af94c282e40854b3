//! Ledger store: accounts, payments and favorites with sequential mutators.

use std::collections::HashSet;
use std::sync::Arc;

use rayon::ThreadPool;
use tracing::debug;
use uuid::Uuid;

use crate::{
    aggregate::build_pool,
    config::AggregateConfig,
    error::{Result, WalletError},
    model::{Account, AccountId, Favorite, Money, Payment, PaymentStatus},
};

/// Owns the authoritative ledger state.
///
/// Mutators take `&mut self`, aggregations take `&self`, so an aggregation
/// always reads a snapshot that cannot change underneath it.
#[derive(Debug, Default)]
pub struct Wallet {
    next_account_id: AccountId,
    pub(crate) accounts: Vec<Account>,
    pub(crate) payments: Vec<Payment>,
    pub(crate) favorites: Vec<Favorite>,
    pub(crate) config: AggregateConfig,
    pub(crate) pool: Option<Arc<ThreadPool>>,
}

impl Wallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the dedicated rayon pool once when `config.threads` is set.
    pub fn with_config(config: AggregateConfig) -> Result<Self> {
        let pool = config.threads.map(build_pool).transpose()?.map(Arc::new);
        Ok(Self {
            config,
            pool,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &AggregateConfig {
        &self.config
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn favorites(&self) -> &[Favorite] {
        &self.favorites
    }

    pub fn register_account(&mut self, phone: &str) -> Result<Account> {
        if self.accounts.iter().any(|a| a.phone == phone) {
            return Err(WalletError::DuplicatePhone);
        }

        self.next_account_id += 1;
        let account = Account {
            id: self.next_account_id,
            phone: phone.to_string(),
            balance: 0,
        };
        self.accounts.push(account.clone());
        debug!(account_id = account.id, "registered account");
        Ok(account)
    }

    pub fn find_account_by_id(&self, account_id: AccountId) -> Result<&Account> {
        self.accounts
            .iter()
            .find(|a| a.id == account_id)
            .ok_or(WalletError::AccountNotFound)
    }

    fn account_mut(&mut self, account_id: AccountId) -> Result<&mut Account> {
        self.accounts
            .iter_mut()
            .find(|a| a.id == account_id)
            .ok_or(WalletError::AccountNotFound)
    }

    /// Credits the account. Deposits are not recorded as payments.
    pub fn deposit(&mut self, account_id: AccountId, amount: Money) -> Result<()> {
        if amount <= 0 {
            return Err(WalletError::InvalidAmount);
        }
        let account = self.account_mut(account_id)?;
        account.balance = account
            .balance
            .checked_add(amount)
            .ok_or(WalletError::AmountOverflow)?;
        Ok(())
    }

    pub fn pay(&mut self, account_id: AccountId, amount: Money, category: &str) -> Result<Payment> {
        if amount <= 0 {
            return Err(WalletError::InvalidAmount);
        }
        let account = self.account_mut(account_id)?;
        if account.balance < amount {
            return Err(WalletError::InsufficientBalance);
        }
        account.balance -= amount;

        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            account_id,
            amount,
            category: category.to_string(),
            status: PaymentStatus::InProgress,
        };
        self.payments.push(payment.clone());
        debug!(payment_id = %payment.id, account_id, amount, "payment created");
        Ok(payment)
    }

    pub fn find_payment_by_id(&self, payment_id: &str) -> Result<&Payment> {
        self.payments
            .iter()
            .find(|p| p.id == payment_id)
            .ok_or(WalletError::PaymentNotFound)
    }

    /// Marks the payment failed and credits its amount back.
    ///
    /// Rejecting a payment that is already `Fail` changes nothing.
    pub fn reject(&mut self, payment_id: &str) -> Result<()> {
        let idx = self
            .payments
            .iter()
            .position(|p| p.id == payment_id)
            .ok_or(WalletError::PaymentNotFound)?;
        let (account_id, amount, status) = {
            let p = &self.payments[idx];
            (p.account_id, p.amount, p.status)
        };
        let account = self.account_mut(account_id)?;
        if status == PaymentStatus::Fail {
            return Ok(());
        }
        account.balance = account
            .balance
            .checked_add(amount)
            .ok_or(WalletError::AmountOverflow)?;
        self.payments[idx].status = PaymentStatus::Fail;
        debug!(payment_id, account_id, amount, "payment rejected");
        Ok(())
    }

    pub fn repeat(&mut self, payment_id: &str) -> Result<Payment> {
        let payment = self.find_payment_by_id(payment_id)?;
        let (account_id, amount, category) =
            (payment.account_id, payment.amount, payment.category.clone());
        self.pay(account_id, amount, &category)
    }

    pub fn favorite_payment(&mut self, payment_id: &str, name: &str) -> Result<Favorite> {
        let payment = self.find_payment_by_id(payment_id)?;
        let favorite = Favorite {
            id: Uuid::new_v4().to_string(),
            account_id: payment.account_id,
            amount: payment.amount,
            category: payment.category.clone(),
            name: name.to_string(),
        };
        self.favorites.push(favorite.clone());
        Ok(favorite)
    }

    pub fn find_favorite_by_id(&self, favorite_id: &str) -> Result<&Favorite> {
        self.favorites
            .iter()
            .find(|f| f.id == favorite_id)
            .ok_or(WalletError::FavoriteNotFound)
    }

    pub fn pay_from_favorite(&mut self, favorite_id: &str) -> Result<Payment> {
        let favorite = self.find_favorite_by_id(favorite_id)?;
        let (account_id, amount, category) =
            (favorite.account_id, favorite.amount, favorite.category.clone());
        self.pay(account_id, amount, &category)
    }

    /// Copies of every payment of `account_id`, in insertion order.
    pub fn export_account_history(&self, account_id: AccountId) -> Vec<Payment> {
        self.payments
            .iter()
            .filter(|p| p.account_id == account_id)
            .cloned()
            .collect()
    }

    /// Appends an imported batch. The whole batch is validated first, so a
    /// rejected import leaves the wallet unchanged:
    ///
    /// - account ids and phones stay unique across the wallet and the batch;
    /// - every payment and favorite references a known or imported account.
    ///
    /// The id counter moves past the largest imported account id.
    pub(crate) fn merge(
        &mut self,
        accounts: Vec<Account>,
        payments: Vec<Payment>,
        favorites: Vec<Favorite>,
    ) -> Result<()> {
        let mut ids: HashSet<AccountId> = self.accounts.iter().map(|a| a.id).collect();
        let mut phones: HashSet<&str> = self.accounts.iter().map(|a| a.phone.as_str()).collect();
        for account in &accounts {
            if !ids.insert(account.id) {
                return Err(WalletError::DuplicateAccountId(account.id));
            }
            if !phones.insert(account.phone.as_str()) {
                return Err(WalletError::DuplicatePhone);
            }
        }
        let dangling = payments
            .iter()
            .map(|p| p.account_id)
            .chain(favorites.iter().map(|f| f.account_id))
            .any(|id| !ids.contains(&id));
        if dangling {
            return Err(WalletError::AccountNotFound);
        }

        if let Some(max_id) = accounts.iter().map(|a| a.id).max() {
            self.next_account_id = self.next_account_id.max(max_id);
        }
        self.accounts.extend(accounts);
        self.payments.extend(payments);
        self.favorites.extend(favorites);
        Ok(())
    }
}
