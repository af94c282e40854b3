//! Parallel reductions over the payment log.
//!
//! The log is split into contiguous chunks of `workers` payments each (the
//! last chunk may be shorter). Every chunk is reduced on its own rayon task
//! into a local result; the local results are combined only after all tasks
//! have joined, so no lock is held while a chunk is being scanned.
//!
//! Note that `workers` is the chunk *size*, not the number of chunks.

use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{debug, warn};

use crate::{
    error::{Result, WalletError},
    model::{AccountId, Money, Payment},
    service::Wallet,
};

impl Wallet {
    /// Total amount of every payment in the log, regardless of status.
    pub fn sum_payments(&self, workers: usize) -> Result<Money> {
        check_workers(workers)?;
        let payments = &self.payments;
        let subtotals = self.run_parallel(|| {
            payments
                .par_chunks(workers)
                .map(|chunk| checked_sum(chunk.iter().map(|p| p.amount)))
                .collect::<Vec<Option<Money>>>()
        })?;
        let total = subtotals
            .into_iter()
            .try_fold(0, |acc: Money, sub| acc.checked_add(sub?))
            .ok_or(WalletError::AmountOverflow)?;
        debug!(
            payments = payments.len(),
            chunks = payments.len().div_ceil(workers),
            total,
            "sum_payments done"
        );
        Ok(total)
    }

    /// Payments of `account_id`.
    ///
    /// Order is preserved inside a chunk; the relative order of chunks in
    /// the result is not guaranteed. Sort afterwards if a total order is
    /// needed.
    pub fn filter_payments(&self, account_id: AccountId, workers: usize) -> Result<Vec<Payment>> {
        self.filter_payment_by_fn(move |p| p.account_id == account_id, workers)
    }

    /// Payments for which `filter` returns true, with the same ordering
    /// caveat as [`Wallet::filter_payments`].
    ///
    /// The predicate runs concurrently on disjoint chunks, hence `Sync`. If
    /// it panics the whole call fails with [`WalletError::WorkerPanicked`].
    pub fn filter_payment_by_fn<F>(&self, filter: F, workers: usize) -> Result<Vec<Payment>>
    where
        F: Fn(&Payment) -> bool + Sync + Send,
    {
        check_workers(workers)?;
        let payments = &self.payments;
        let parts = self.run_parallel(|| {
            payments
                .par_chunks(workers)
                .map(|chunk| filter_chunk(chunk, &filter))
                .collect::<Vec<Vec<Payment>>>()
        })?;
        let matched: Vec<Payment> = parts.into_iter().flatten().collect();
        debug!(
            payments = payments.len(),
            matched = matched.len(),
            "filter_payment_by_fn done"
        );
        Ok(matched)
    }

    /// Runs `op` on the wallet's pool, or the global one. A panic in any task
    /// surfaces as `WorkerPanicked` instead of a partially combined result.
    fn run_parallel<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce() -> T + Send,
        T: Send,
    {
        let outcome = match &self.pool {
            Some(pool) => panic::catch_unwind(AssertUnwindSafe(|| pool.install(op))),
            None => panic::catch_unwind(AssertUnwindSafe(op)),
        };
        outcome.map_err(|_| {
            warn!("aggregation aborted: worker panicked");
            WalletError::WorkerPanicked
        })
    }
}

pub(crate) fn check_workers(workers: usize) -> Result<()> {
    if workers == 0 {
        return Err(WalletError::InvalidWorkerCount);
    }
    Ok(())
}

pub(crate) fn build_pool(threads: usize) -> Result<rayon::ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|idx| format!("wallet-agg-{idx}"))
        .build()
        .map_err(|e| WalletError::ThreadPool(e.to_string()))
}

/// `None` once the running total leaves the `Money` range.
pub(crate) fn checked_sum<I>(amounts: I) -> Option<Money>
where
    I: IntoIterator<Item = Money>,
{
    amounts
        .into_iter()
        .try_fold(0, |acc: Money, amount| acc.checked_add(amount))
}

fn filter_chunk<F>(chunk: &[Payment], filter: &F) -> Vec<Payment>
where
    F: Fn(&Payment) -> bool,
{
    chunk.iter().filter(|p| filter(p)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PaymentStatus;

    fn payment(n: i64) -> Payment {
        Payment {
            id: format!("p{n}"),
            account_id: n % 2,
            amount: n,
            category: "misc".into(),
            status: PaymentStatus::InProgress,
        }
    }

    #[test]
    fn checked_sum_detects_overflow() {
        assert_eq!(checked_sum([1, 2, 3, 4]), Some(10));
        assert_eq!(checked_sum([]), Some(0));
        assert_eq!(checked_sum([Money::MAX, 1]), None);
    }

    #[test]
    fn filter_chunk_keeps_order() {
        let chunk: Vec<Payment> = (1..=4).map(payment).collect();
        let odd = filter_chunk(&chunk, &|p: &Payment| p.account_id == 1);
        let ids: Vec<&str> = odd.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["p1", "p3"]);
    }

    #[test]
    fn zero_workers_rejected() {
        assert!(matches!(check_workers(0), Err(WalletError::InvalidWorkerCount)));
        assert!(check_workers(1).is_ok());
    }
}
