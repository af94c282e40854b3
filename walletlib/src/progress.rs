//! Streaming variant of `sum_payments`: one `Progress` per chunk, delivered
//! as soon as the chunk is summed.

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::{
    aggregate::{check_workers, checked_sum},
    error::{Result, WalletError},
    model::{Money, Progress},
    service::Wallet,
};

/// Partial sums in completion order.
///
/// The underlying channel holds one slot per chunk, so workers never block
/// on a consumer that stopped reading. The stream ends once every chunk has
/// been delivered.
pub struct ProgressStream {
    rx: Receiver<Progress>,
    coordinator: Option<JoinHandle<Result<()>>>,
    parts: usize,
    received: usize,
    // `None` once the running total overflowed.
    total: Option<Money>,
}

impl ProgressStream {
    /// Number of chunks the log was split into.
    pub fn parts(&self) -> usize {
        self.parts
    }

    /// Blocks until every worker is done, without reading any subtotal.
    /// The subtotals stay buffered and can still be iterated afterwards.
    pub fn wait(&mut self) -> Result<()> {
        let Some(handle) = self.coordinator.take() else {
            return Ok(());
        };
        match handle.join() {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!("progress aggregation aborted: worker panicked");
                Err(WalletError::WorkerPanicked)
            }
        }
    }

    /// Waits for the workers, drains whatever is left and returns the sum
    /// over every chunk, including the ones already yielded by the iterator.
    pub fn finish(mut self) -> Result<Money> {
        self.wait()?;
        while self.next().is_some() {}
        if self.received != self.parts {
            return Err(WalletError::WorkerPanicked);
        }
        self.total.ok_or(WalletError::AmountOverflow)
    }
}

impl Iterator for ProgressStream {
    type Item = Progress;

    fn next(&mut self) -> Option<Progress> {
        let progress = self.rx.recv().ok()?;
        self.received += 1;
        self.total = self.total.and_then(|t| t.checked_add(progress.result));
        Some(progress)
    }
}

impl Wallet {
    /// Sums the log in chunks of `progress_chunk_size` payments and streams
    /// each chunk's subtotal. A trailing short chunk is reported as well.
    ///
    /// Amounts are copied before returning, so the wallet may be mutated
    /// while the stream is still being consumed.
    pub fn sum_payments_with_progress(&self) -> Result<ProgressStream> {
        let chunk_size = self.config.progress_chunk_size;
        check_workers(chunk_size)?;

        let amounts: Arc<[Money]> = self.payments.iter().map(|p| p.amount).collect();
        let parts = amounts.len().div_ceil(chunk_size);
        let (tx, rx) = mpsc::sync_channel(parts.max(1));
        let pool = self.pool.clone();

        debug!(payments = amounts.len(), parts, chunk_size, "starting progress sum");
        let coordinator = thread::Builder::new()
            .name("wallet-progress".into())
            .spawn(move || {
                let work = move || {
                    amounts
                        .par_chunks(chunk_size)
                        .enumerate()
                        .try_for_each_with(tx, |tx, (part, chunk)| -> Result<()> {
                            let result = checked_sum(chunk.iter().copied())
                                .ok_or(WalletError::AmountOverflow)?;
                            // The receiver may be gone already; the result is simply dropped.
                            let _ = tx.send(Progress { part, result });
                            Ok(())
                        })
                };
                match pool {
                    Some(pool) => pool.install(work),
                    None => work(),
                }
            })?;

        Ok(ProgressStream {
            rx,
            coordinator: Some(coordinator),
            parts,
            received: 0,
            total: Some(0),
        })
    }
}
