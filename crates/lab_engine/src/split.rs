use std::io::{self, BufRead};

use crate::MoleculeRecord;

/// Line that closes every record of a molecule file.
pub const TERMINATOR: &str = "$$$$";

/// Streams terminator-delimited records out of a reader, numbered from 1.
///
/// Lines after the last terminator never form a record. Bytes that are not
/// valid UTF-8 (Latin-1 data fields) are replaced, never rejected.
pub struct RecordSplitter<R> {
    reader: R,
    raw: Vec<u8>,
    buffer: Vec<String>,
    next_index: usize,
}

impl<R: BufRead> RecordSplitter<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            raw: Vec::new(),
            buffer: Vec::new(),
            next_index: 1,
        }
    }

    fn next_line(&mut self) -> io::Result<Option<String>> {
        self.raw.clear();
        if self.reader.read_until(b'\n', &mut self.raw)? == 0 {
            return Ok(None);
        }
        if self.raw.ends_with(b"\n") {
            self.raw.pop();
            if self.raw.ends_with(b"\r") {
                self.raw.pop();
            }
        }
        Ok(Some(String::from_utf8_lossy(&self.raw).into_owned()))
    }
}

impl<R: BufRead> Iterator for RecordSplitter<R> {
    type Item = io::Result<MoleculeRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => return None,
                Err(err) => return Some(Err(err)),
            };
            let closes_record = line.trim() == TERMINATOR;
            self.buffer.push(line);
            if closes_record {
                let record = MoleculeRecord {
                    index: self.next_index,
                    lines: std::mem::take(&mut self.buffer),
                };
                self.next_index += 1;
                return Some(Ok(record));
            }
        }
    }
}

pub fn split_records<R: BufRead>(reader: R) -> io::Result<Vec<MoleculeRecord>> {
    RecordSplitter::new(reader).collect()
}
