//! RRsets and reading them from a stream of records.
use core::cmp::Ordering;

use std::collections::VecDeque;
use std::string::String;
use std::vec::Vec;
use std::{io, slice};

use tracing::{trace, warn};

use crate::base::cmp::CanonicalOrd;
use crate::base::iana::{Class, Rtype};
use crate::base::name::Name;
use crate::base::record::Record;
use crate::base::Ttl;
use crate::zonefile::{Entry, EntryError, ScanError};

use super::directive::Directive;

//------------ Rrset ---------------------------------------------------------

/// A set of records with the same owner name, class, record type, and TTL.
///
/// An RRset is never empty.
#[derive(Clone, Debug)]
pub struct Rrset {
    records: Vec<Record>,
}

impl Rrset {
    /// Creates a new RRset starting with `first`.
    pub fn new(first: Record) -> Self {
        Rrset {
            records: vec![first],
        }
    }

    /// Creates an RRset from a list of records.
    ///
    /// Returns `None` if the list is empty or if the records don’t all
    /// belong to the same RRset.
    pub fn from_records(records: Vec<Record>) -> Option<Self> {
        let mut records = records.into_iter();
        let mut res = Rrset::new(records.next()?);
        for record in records {
            res.push(record).ok()?;
        }
        Some(res)
    }

    /// Adds a record to the RRset.
    ///
    /// If the record doesn’t belong to the RRset, it is handed back.
    pub fn push(&mut self, record: Record) -> Result<(), Record> {
        if self.belongs(&record) {
            self.records.push(record);
            Ok(())
        } else {
            Err(record)
        }
    }

    /// Returns whether `record` would be part of this RRset.
    pub fn belongs(&self, record: &Record) -> bool {
        let first = self.first();
        record.owner() == first.owner()
            && record.rtype() == first.rtype()
            && record.class() == first.class()
            && record.ttl() == first.ttl()
    }

    /// Returns whether `record` is a signature over this RRset.
    pub fn is_covered_by(&self, record: &Record) -> bool {
        match record.data().as_rrsig() {
            Some(rrsig) => {
                record.owner() == self.owner()
                    && rrsig.type_covered() == self.rtype()
            }
            None => false,
        }
    }

    pub fn owner(&self) -> &Name {
        self.first().owner()
    }

    pub fn class(&self) -> Class {
        self.first().class()
    }

    pub fn rtype(&self) -> Rtype {
        self.first().rtype()
    }

    pub fn ttl(&self) -> Ttl {
        self.first().ttl()
    }

    pub fn first(&self) -> &Record {
        &self.records[0]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always returns `false`: an RRset has at least one record.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Returns mutable access to the records.
    ///
    /// Changing the owner, type, or class of a record through this breaks
    /// the RRset.
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, Record> {
        self.records.iter_mut()
    }

    /// Sets the TTL of all records.
    pub fn set_ttl(&mut self, ttl: Ttl) {
        self.records.iter_mut().for_each(|record| record.set_ttl(ttl))
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Compares the owner names and record types of two RRsets.
    ///
    /// This is the order of RRsets in a sorted zone.
    pub fn cmp_identity(&self, other: &Self) -> Ordering {
        self.owner()
            .canonical_cmp(other.owner())
            .then_with(|| self.rtype().cmp(&other.rtype()))
    }
}

//--- PartialEq and Eq

/// Two RRsets are equal if they have the same owner, class, type, and TTL
/// and contain the same records in any order.
impl PartialEq for Rrset {
    fn eq(&self, other: &Self) -> bool {
        self.owner() == other.owner()
            && self.rtype() == other.rtype()
            && self.class() == other.class()
            && self.ttl() == other.ttl()
            && self.len() == other.len()
            && self.iter().all(|record| other.records.contains(record))
            && other.iter().all(|record| self.records.contains(record))
    }
}

impl Eq for Rrset {}

impl<'a> IntoIterator for &'a Rrset {
    type Item = &'a Record;
    type IntoIter = slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

//------------ RecordSource --------------------------------------------------

/// A source of zone entries.
///
/// This is implemented for every iterator over scanned entries, such as a
/// [`Zonefile`][crate::zonefile::Zonefile].
pub trait RecordSource {
    /// Returns the next entry or `None` at the end of the input.
    fn read_entry(&mut self) -> Option<Result<Entry, ScanError>>;
}

impl<I> RecordSource for I
where
    I: Iterator<Item = Result<Entry, ScanError>>,
{
    fn read_entry(&mut self) -> Option<Result<Entry, ScanError>> {
        self.next()
    }
}

//------------ ReaderItem ----------------------------------------------------

/// An item produced by an [`RrsetReader`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReaderItem {
    /// The next RRset.
    Rrset(Rrset),

    /// A directive.
    Directive(Directive),

    /// A comment line.
    Text(String),
}

//------------ RrsetReader ---------------------------------------------------

/// Groups a sorted stream of records into RRsets and their signatures.
///
/// Records are collected into an RRset for as long as they share owner,
/// type, class, and TTL with the first record. The first record that
/// doesn’t is kept back and starts the next RRset.
///
/// Directives and comments met while collecting an RRset or its signatures
/// are kept in order and returned before the next RRset.
pub struct RrsetReader<S> {
    /// Where the entries come from.
    source: S,

    /// The record read ahead.
    skipped: Option<Record>,

    /// Directives and comments not yet returned.
    pending: VecDeque<ReaderItem>,

    /// A read error that ended the input.
    failure: Option<io::Error>,

    /// A label for log messages.
    label: &'static str,
}

impl<S: RecordSource> RrsetReader<S> {
    pub fn new(source: S, label: &'static str) -> Self {
        RrsetReader {
            source,
            skipped: None,
            pending: VecDeque::new(),
            failure: None,
            label,
        }
    }

    /// Returns the next RRset, directive, or comment.
    ///
    /// Returns `None` at the end of the input. Signatures that don’t follow
    /// the RRset they cover are dropped.
    pub fn next_item(&mut self) -> Option<ReaderItem> {
        loop {
            if self.skipped.is_none() {
                self.skipped = self.read_record();
            }
            if let Some(item) = self.pending.pop_front() {
                return Some(item);
            }
            let first = self.skipped.take()?;
            if first.rtype() == Rtype::RRSIG {
                warn!(
                    "{}: dropping signature without RRset: {first}",
                    self.label
                );
                continue;
            }
            let mut rrset = Rrset::new(first);
            while let Some(record) = self.read_record() {
                if let Err(record) = rrset.push(record) {
                    self.skipped = Some(record);
                    break;
                }
            }
            trace!(
                "{}: read {} RRset at {} with {} records",
                self.label,
                rrset.rtype(),
                rrset.owner(),
                rrset.len()
            );
            return Some(ReaderItem::Rrset(rrset));
        }
    }

    /// Returns the next RRset, skipping directives and comments.
    pub fn next_rrset(&mut self) -> Option<Rrset> {
        loop {
            match self.next_item()? {
                ReaderItem::Rrset(rrset) => return Some(rrset),
                ReaderItem::Directive(directive) => {
                    trace!("{}: ignoring directive {directive}", self.label)
                }
                ReaderItem::Text(_) => {}
            }
        }
    }

    /// Returns the signatures over `rrset` that follow it.
    ///
    /// The result is empty if the next record is not a signature over
    /// `rrset`, including at the end of the input.
    pub fn next_signatures(&mut self, rrset: &Rrset) -> Vec<Record> {
        let mut res = Vec::new();
        loop {
            if self.skipped.is_none() {
                self.skipped = self.read_record();
            }
            match self.skipped.take() {
                Some(record) if rrset.is_covered_by(&record) => {
                    res.push(record)
                }
                other => {
                    self.skipped = other;
                    return res;
                }
            }
        }
    }

    /// Returns whether reading has failed.
    pub fn has_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Takes the read error that ended the input if there was one.
    pub fn take_failure(&mut self) -> Option<io::Error> {
        self.failure.take()
    }

    /// Reads the next record, queueing everything else.
    fn read_record(&mut self) -> Option<Record> {
        if self.failure.is_some() {
            return None;
        }
        loop {
            match self.source.read_entry()? {
                Ok(Entry::Record(record)) => return Some(record),
                Ok(Entry::Directive(directive)) => {
                    self.pending.push_back(ReaderItem::Directive(directive))
                }
                Ok(Entry::Text(text)) => {
                    self.pending.push_back(ReaderItem::Text(text))
                }
                Err(err) => match err.into_error() {
                    (_, EntryError::Io(err)) => {
                        self.failure = Some(err);
                        return None;
                    }
                    (line, err) => {
                        warn!("{}: line {line}: {err}, skipping", self.label)
                    }
                },
            }
        }
    }
}

//============ Testing =======================================================
