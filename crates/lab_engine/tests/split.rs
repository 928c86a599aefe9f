use std::io::{self, BufRead, BufReader, Cursor, Read};

use lab_engine::{split_records, MoleculeRecord, RecordSplitter};

const TWO_RECORDS: &str = "benzene\n  RDKit\nM  END\n$$$$\nphenol\nM  END\n$$$$\n";

#[test]
fn records_keep_their_lines_and_terminator() {
    let records = split_records(Cursor::new(TWO_RECORDS)).unwrap();

    assert_eq!(
        records,
        vec![
            MoleculeRecord {
                index: 1,
                lines: vec![
                    "benzene".to_string(),
                    "  RDKit".to_string(),
                    "M  END".to_string(),
                    "$$$$".to_string(),
                ],
            },
            MoleculeRecord {
                index: 2,
                lines: vec![
                    "phenol".to_string(),
                    "M  END".to_string(),
                    "$$$$".to_string(),
                ],
            },
        ]
    );
    assert_eq!(records[1].text(), "phenol\nM  END\n$$$$\n");
}

#[test]
fn splitting_is_deterministic() {
    let first = split_records(Cursor::new(TWO_RECORDS)).unwrap();
    let second = split_records(Cursor::new(TWO_RECORDS)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn crlf_and_padded_terminators_close_records() {
    let records = split_records(Cursor::new("a\r\n$$$$\r\nb\n  $$$$  \n")).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].lines, vec!["a", "$$$$"]);
}

#[test]
fn terminator_inside_text_does_not_split() {
    let records = split_records(Cursor::new("name $$$$ x\n$$$$\n")).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].lines.len(), 2);
}

#[test]
fn empty_and_unterminated_inputs_have_no_records() {
    assert!(split_records(Cursor::new("")).unwrap().is_empty());
    assert!(split_records(Cursor::new("one\ntwo\n")).unwrap().is_empty());
}

#[test]
fn splitter_streams_one_record_at_a_time() {
    let mut splitter = RecordSplitter::new(Cursor::new("x\n$$$$\n$$$$\n"));
    assert_eq!(splitter.next().unwrap().unwrap().index, 1);
    let second = splitter.next().unwrap().unwrap();
    assert_eq!(second.index, 2);
    assert_eq!(second.lines, vec!["$$$$"]);
    assert!(splitter.next().is_none());
}

#[test]
fn invalid_utf8_is_replaced_not_rejected() {
    let records = split_records(Cursor::new(&b"caf\xE9\r\n$$$$\n"[..])).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].lines, vec!["caf\u{FFFD}", "$$$$"]);
}

/// Yields `data` once, then fails.
struct FailingAfter {
    data: Option<&'static [u8]>,
}

impl Read for FailingAfter {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.data.take() {
            Some(data) => {
                buf[..data.len()].copy_from_slice(data);
                Ok(data.len())
            }
            None => Err(io::Error::other("disk gone")),
        }
    }
}

#[test]
fn read_errors_surface_after_complete_records() {
    let reader: Box<dyn BufRead> = Box::new(BufReader::new(FailingAfter {
        data: Some(b"a\n$$$$\nb\n"),
    }));
    let mut splitter = RecordSplitter::new(reader);
    assert_eq!(splitter.next().unwrap().unwrap().index, 1);
    assert!(splitter.next().unwrap().is_err());
}
