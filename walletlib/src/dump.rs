//! Plain-text export/import of the whole wallet.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::Path;

use tracing::info;

use crate::{
    error::{Result, WalletError},
    formats::{lines::Lines, pipe::Pipe},
    model::{Account, Favorite, Payment},
    service::Wallet,
    traits::{ReadRecords, Record, WriteRecords},
};

pub const ACCOUNTS_FILE: &str = "accounts.dump";
pub const PAYMENTS_FILE: &str = "payments.dump";
pub const FAVORITES_FILE: &str = "favorites.dump";

impl Wallet {
    /// Writes one `.dump` file per entity kind into `dir`. Empty collections
    /// produce no file.
    pub fn export(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        write_if_any(&dir.join(ACCOUNTS_FILE), &self.accounts)?;
        write_if_any(&dir.join(PAYMENTS_FILE), &self.payments)?;
        write_if_any(&dir.join(FAVORITES_FILE), &self.favorites)?;
        info!(
            dir = %dir.display(),
            accounts = self.accounts.len(),
            payments = self.payments.len(),
            favorites = self.favorites.len(),
            "wallet exported"
        );
        Ok(())
    }

    /// Appends the records found in `dir`. A missing file counts as an
    /// empty collection. All three files are read and validated before
    /// anything is added, so a failed import leaves the wallet unchanged.
    pub fn import(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        let accounts: Vec<Account> = read_optional(&dir.join(ACCOUNTS_FILE))?;
        let payments: Vec<Payment> = read_optional(&dir.join(PAYMENTS_FILE))?;
        let favorites: Vec<Favorite> = read_optional(&dir.join(FAVORITES_FILE))?;
        info!(
            dir = %dir.display(),
            accounts = accounts.len(),
            payments = payments.len(),
            favorites = favorites.len(),
            "wallet imported"
        );

        self.merge(accounts, payments, favorites)
    }

    /// Writes the accounts only, as `|`-terminated records in a single file.
    pub fn export_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = BufWriter::new(File::create(path.as_ref())?);
        Pipe::write(file, &self.accounts)
    }

    /// Reads accounts written by [`Wallet::export_to_file`]; all or nothing.
    pub fn import_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let file = BufReader::new(File::open(path.as_ref())?);
        let accounts: Vec<Account> = Pipe::read(file)?;
        self.merge(accounts, Vec::new(), Vec::new())
    }
}

/// Writes `payments` into `dir` in pages of `records` entries.
///
/// Up to `records` payments go into a single `payments.dump`; larger sets are
/// split into `payments1.dump`, `payments2.dump`, and so on.
pub fn history_to_files(payments: &[Payment], dir: impl AsRef<Path>, records: usize) -> Result<()> {
    if records == 0 {
        return Err(WalletError::InvalidRecordsPerFile);
    }
    let dir = dir.as_ref();
    if payments.len() <= records {
        return write_records(&dir.join(PAYMENTS_FILE), payments);
    }
    for (idx, page) in payments.chunks(records).enumerate() {
        write_records(&dir.join(format!("payments{}.dump", idx + 1)), page)?;
    }
    info!(
        dir = %dir.display(),
        payments = payments.len(),
        files = payments.len().div_ceil(records),
        "history exported"
    );
    Ok(())
}

fn write_records<T: Record>(path: &Path, records: &[T]) -> Result<()> {
    let file = BufWriter::new(File::create(path)?);
    Lines::write(file, records)
}

fn write_if_any<T: Record>(path: &Path, records: &[T]) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    write_records(path, records)
}

fn read_optional<T: Record>(path: &Path) -> Result<Vec<T>> {
    match File::open(path) {
        Ok(file) => Lines::read(BufReader::new(file)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}
