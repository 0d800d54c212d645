//! Reading zones in presentation format.
//!
//! The signer reads its input line by line. Every non-empty line is one
//! [`Entry`]:
//!
//! * lines starting with `;` are comments that are passed through to the
//!   output unchanged,
//! * lines starting with `:` are [directives][Directive] that change the
//!   signing configuration, and
//! * all other lines are resource records of the form
//!   `<owner> <ttl> <class> <type> <rdata>` with an absolute owner name.
//!
//! There are no `$ORIGIN` or `$TTL` control entries, relative names, or
//! records spanning multiple lines. Records printed by the signer follow the
//! same format, so the output of one run can be read back as the signed
//! input of the next one.

use core::fmt;
use core::str::FromStr;

use std::io::{self, BufRead};
use std::string::String;
use std::vec::Vec;

use tracing::trace;

use crate::base::iana::{Class, Rtype};
use crate::base::name::{Name, NameError};
use crate::base::record::Record;
use crate::base::Ttl;
use crate::rdata::{RdataError, RecordData};
use crate::sign::directive::{Directive, DirectiveError};

//------------ Entry ---------------------------------------------------------

/// An entry of a zone in presentation format.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Entry {
    /// A DNS record.
    Record(Record),

    /// A directive for the signer.
    Directive(Directive),

    /// A comment line to be passed through unchanged.
    Text(String),
}

impl Entry {
    /// Scans a single line.
    ///
    /// Returns `Ok(None)` for lines that are blank.
    pub fn scan_line(line: &str) -> Result<Option<Self>, EntryError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        if line.starts_with(';') {
            return Ok(Some(Entry::Text(line.into())));
        }
        if line.starts_with(':') {
            return Directive::from_str(line)
                .map(|directive| Some(Entry::Directive(directive)))
                .map_err(EntryError::Directive);
        }
        scan_record(line).map(|record| Some(Entry::Record(record)))
    }
}

fn scan_record(line: &str) -> Result<Record, EntryError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let [owner, ttl, class, rtype, rdata @ ..] = tokens.as_slice() else {
        return Err(EntryError::MissingField);
    };
    let owner = Name::from_str(owner).map_err(EntryError::Owner)?;
    let ttl = Ttl::from_str(ttl).map_err(|_| EntryError::Ttl)?;
    let class = Class::from_str(class).map_err(|_| EntryError::Class)?;
    let rtype = Rtype::from_str(rtype).map_err(|_| EntryError::Rtype)?;
    let data = RecordData::scan(rtype, rdata).map_err(EntryError::Rdata)?;
    Ok(Record::new(owner, class, ttl, data))
}

//------------ Zonefile ------------------------------------------------------

/// An iterator over the entries of a zone read from a buffered reader.
pub struct Zonefile<R> {
    /// The reader to read lines from.
    source: R,

    /// The buffer for the current line.
    buf: String,

    /// The number of the current line, starting at 1.
    line: usize,

    /// Reading failed and nothing more will be returned.
    failed: bool,
}

impl<R: BufRead> Zonefile<R> {
    /// Creates a new zone reader atop `source`.
    pub fn new(source: R) -> Self {
        Zonefile {
            source,
            buf: String::new(),
            line: 0,
            failed: false,
        }
    }

    /// Returns the next entry of the zone.
    ///
    /// Returns `Ok(None)` at the end of the input. A line that cannot be
    /// scanned results in an error, but the next call continues with the
    /// line after it. An I/O error ends reading.
    pub fn next_entry(&mut self) -> Result<Option<Entry>, ScanError> {
        if self.failed {
            return Ok(None);
        }
        loop {
            self.buf.clear();
            self.line += 1;
            match self.source.read_line(&mut self.buf) {
                Ok(0) => return Ok(None),
                Ok(_) => {}
                Err(err) => {
                    self.failed = true;
                    return Err(ScanError::new(self.line, EntryError::Io(err)));
                }
            }
            match Entry::scan_line(&self.buf) {
                Ok(Some(entry)) => return Ok(Some(entry)),
                Ok(None) => {
                    trace!("Skipping blank line {}", self.line);
                }
                Err(err) => return Err(ScanError::new(self.line, err)),
            }
        }
    }
}

impl<R: BufRead> Iterator for Zonefile<R> {
    type Item = Result<Entry, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}

//------------ EntryError ----------------------------------------------------

/// A line could not be scanned into an entry.
#[derive(Debug)]
pub enum EntryError {
    /// The record had fewer than four fields before the record data.
    MissingField,

    /// The owner name was invalid.
    Owner(NameError),

    /// The TTL was invalid.
    Ttl,

    /// The class was unknown.
    Class,

    /// The record type was unknown.
    Rtype,

    /// The record data was invalid.
    Rdata(RdataError),

    /// The directive was invalid.
    Directive(DirectiveError),

    /// Reading from the source failed.
    Io(io::Error),
}

impl fmt::Display for EntryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EntryError::MissingField => f.write_str("missing record field"),
            EntryError::Owner(err) => write!(f, "invalid owner: {err}"),
            EntryError::Ttl => f.write_str("invalid TTL"),
            EntryError::Class => f.write_str("unknown class"),
            EntryError::Rtype => f.write_str("unknown record type"),
            EntryError::Rdata(err) => write!(f, "invalid record data: {err}"),
            EntryError::Directive(err) => write!(f, "{err}"),
            EntryError::Io(err) => write!(f, "read error: {err}"),
        }
    }
}

impl std::error::Error for EntryError {}

//------------ ScanError -----------------------------------------------------

/// A line of a zone could not be scanned.
#[derive(Debug)]
pub struct ScanError {
    line: usize,
    err: EntryError,
}

impl ScanError {
    fn new(line: usize, err: EntryError) -> Self {
        ScanError { line, err }
    }

    /// Returns the number of the offending line, starting at 1.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Returns the reason why scanning failed.
    pub fn error(&self) -> &EntryError {
        &self.err
    }

    /// Trades the error for the line number and the reason.
    pub fn into_error(self) -> (usize, EntryError) {
        (self.line, self.err)
    }

    /// Returns whether the error ended reading of the source.
    pub fn is_fatal(&self) -> bool {
        matches!(self.err, EntryError::Io(_))
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.err)
    }
}

impl std::error::Error for ScanError {}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::Serial;

    #[test]
    fn scan_entries() {
        let zone = "; generated zone\n\
                    :origin example.\n\
                    \n\
                    example.  3600 IN SOA ns.example. host.example. \
                    1 3600 900 604800 300\n\
                    www.example. 300 IN A   192.0.2.1\n";
        let entries: Vec<Entry> = Zonefile::new(zone.as_bytes())
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0], Entry::Text("; generated zone".into()));
        assert_eq!(
            entries[1],
            Entry::Directive(Directive::Origin(
                Name::from_str("example.").unwrap()
            ))
        );
        let Entry::Record(soa) = &entries[2] else {
            panic!("expected a record")
        };
        assert_eq!(soa.data().as_soa().unwrap().serial(), Serial(1));
        let Entry::Record(a) = &entries[3] else {
            panic!("expected a record")
        };
        assert_eq!(a.to_string(), "www.example. 300 IN A 192.0.2.1");
    }

    #[test]
    fn bad_lines_are_reported_and_skipped() {
        let zone = "www.example. 300 IN\n\
                    www 300 IN A 192.0.2.1\n\
                    www.example. 300 IN A 192.0.2.1\n";
        let mut zonefile = Zonefile::new(zone.as_bytes());
        let err = zonefile.next_entry().unwrap_err();
        assert_eq!(err.line(), 1);
        assert!(matches!(err.error(), EntryError::MissingField));
        let err = zonefile.next_entry().unwrap_err();
        assert_eq!(err.line(), 2);
        assert!(matches!(
            err.error(),
            EntryError::Owner(NameError::RelativeName)
        ));
        assert!(!err.is_fatal());
        assert!(matches!(zonefile.next_entry(), Ok(Some(Entry::Record(_)))));
        assert!(matches!(zonefile.next_entry(), Ok(None)));
    }
}
