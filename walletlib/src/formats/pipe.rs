//! Single-file variant: every record is terminated by `|`, e.g.
//! `1;+992000000001;100|2;+992000000002;0|`.

use crate::{
    error::Result,
    formats::record::{read_terminated, write_terminated},
    traits::{ReadRecords, Record, WriteRecords},
};
use csv::Terminator;
use std::io::{BufRead, Write};

pub const SEPARATOR: u8 = b'|';

/// Fields containing `;`, `"` or `|` are written csv-quoted.
pub struct Pipe;

impl ReadRecords for Pipe {
    fn read<R: BufRead, T: Record>(r: R) -> Result<Vec<T>> {
        read_terminated(r, Terminator::Any(SEPARATOR))
    }
}

impl WriteRecords for Pipe {
    fn write<W: Write, T: Record>(w: W, records: &[T]) -> Result<()> {
        write_terminated(w, records, Terminator::Any(SEPARATOR))
    }
}
