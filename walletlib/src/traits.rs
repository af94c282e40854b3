//! Record-level reading/writing on top of std::io::{BufRead, Write}.

use crate::error::Result;
use csv::StringRecord;
use std::io::{BufRead, Write};

/// One entity as one `;`-delimited record with a fixed field order.
pub trait Record: Sized {
    const FIELDS: usize;

    fn to_fields(&self) -> Vec<String>;
    fn from_fields(rec: &StringRecord) -> Result<Self>;
}

pub trait ReadRecords {
    fn read<R: BufRead, T: Record>(r: R) -> Result<Vec<T>>;
}

pub trait WriteRecords {
    fn write<W: Write, T: Record>(w: W, records: &[T]) -> Result<()>;
}
