//! Newline-terminated records, one file per entity kind (`accounts.dump`,
//! `payments.dump`, `favorites.dump`).

use crate::{
    error::Result,
    formats::record::{read_terminated, write_terminated},
    traits::{ReadRecords, Record, WriteRecords},
};
use csv::Terminator;
use std::io::{BufRead, Write};

/// Fields containing `;`, `"` or a line break are written csv-quoted.
pub struct Lines;

impl ReadRecords for Lines {
    fn read<R: BufRead, T: Record>(r: R) -> Result<Vec<T>> {
        read_terminated(r, Terminator::CRLF)
    }
}

impl WriteRecords for Lines {
    fn write<W: Write, T: Record>(w: W, records: &[T]) -> Result<()> {
        write_terminated(w, records, Terminator::Any(b'\n'))
    }
}
