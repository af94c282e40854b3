//! Field layout of the dump records:
//!
//! - account:  `id;phone;balance`
//! - payment:  `id;amount;category;status;accountID`
//! - favorite: `id;amount;category;name;accountID`

use crate::{
    error::{Result, WalletError},
    model::{Account, Favorite, Money, Payment},
    traits::Record,
};
use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use std::io::{BufRead, Write};
use std::str::FromStr;

pub(crate) const DELIMITER: u8 = b';';

fn field<'a>(rec: &'a StringRecord, idx: usize, name: &str) -> Result<&'a str> {
    rec.get(idx)
        .ok_or_else(|| WalletError::Parse(format!("missing field {name}")))
}

fn parse_field<T>(rec: &StringRecord, idx: usize, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    field(rec, idx, name)?
        .trim()
        .parse()
        .map_err(|e| WalletError::Parse(format!("{name}: {e}")))
}

fn non_negative(value: Money, name: &str) -> Result<Money> {
    if value < 0 {
        return Err(WalletError::Parse(format!("{name}: must not be negative")));
    }
    Ok(value)
}

fn positive(value: Money, name: &str) -> Result<Money> {
    if value <= 0 {
        return Err(WalletError::Parse(format!("{name}: must be greater than zero")));
    }
    Ok(value)
}

fn check_len<T: Record>(rec: &StringRecord, kind: &str) -> Result<()> {
    if rec.len() != T::FIELDS {
        return Err(WalletError::Parse(format!(
            "{kind} record: expected {} fields, got {}",
            T::FIELDS,
            rec.len()
        )));
    }
    Ok(())
}

impl Record for Account {
    const FIELDS: usize = 3;

    fn to_fields(&self) -> Vec<String> {
        vec![self.id.to_string(), self.phone.clone(), self.balance.to_string()]
    }

    fn from_fields(rec: &StringRecord) -> Result<Self> {
        check_len::<Self>(rec, "account")?;
        Ok(Account {
            id: parse_field(rec, 0, "account id")?,
            phone: field(rec, 1, "phone")?.to_string(),
            balance: non_negative(parse_field(rec, 2, "balance")?, "balance")?,
        })
    }
}

impl Record for Payment {
    const FIELDS: usize = 5;

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.amount.to_string(),
            self.category.clone(),
            self.status.to_string(),
            self.account_id.to_string(),
        ]
    }

    fn from_fields(rec: &StringRecord) -> Result<Self> {
        check_len::<Self>(rec, "payment")?;
        Ok(Payment {
            id: field(rec, 0, "payment id")?.to_string(),
            amount: positive(parse_field(rec, 1, "amount")?, "amount")?,
            category: field(rec, 2, "category")?.to_string(),
            status: field(rec, 3, "status")?.parse()?,
            account_id: parse_field(rec, 4, "account id")?,
        })
    }
}

impl Record for Favorite {
    const FIELDS: usize = 5;

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.amount.to_string(),
            self.category.clone(),
            self.name.clone(),
            self.account_id.to_string(),
        ]
    }

    fn from_fields(rec: &StringRecord) -> Result<Self> {
        check_len::<Self>(rec, "favorite")?;
        Ok(Favorite {
            id: field(rec, 0, "favorite id")?.to_string(),
            amount: positive(parse_field(rec, 1, "amount")?, "amount")?,
            category: field(rec, 2, "category")?.to_string(),
            name: field(rec, 3, "name")?.to_string(),
            account_id: parse_field(rec, 4, "account id")?,
        })
    }
}

/// Reads `T` records separated by `terminator`. Empty segments, such as the
/// one after a trailing terminator, are skipped.
pub(crate) fn read_terminated<R: BufRead, T: Record>(
    r: R,
    terminator: Terminator,
) -> Result<Vec<T>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .terminator(terminator)
        .from_reader(r);

    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        if rec.len() == 1 && rec.get(0).is_some_and(|f| f.trim().is_empty()) {
            continue;
        }
        out.push(T::from_fields(&rec)?);
    }
    Ok(out)
}

pub(crate) fn write_terminated<W: Write, T: Record>(
    w: W,
    records: &[T],
    terminator: Terminator,
) -> Result<()> {
    let mut wrt = WriterBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .terminator(terminator)
        .from_writer(w);

    for r in records {
        wrt.write_record(r.to_fields())?;
    }
    wrt.flush()?;
    Ok(())
}
