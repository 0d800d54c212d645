//! Comparing a new zone against its previously signed version.
//!
//! Both zones are read as sorted streams of RRsets and walked side by side
//! in a merge join. Every RRset ends up in exactly one of four classes:
//! new, removed, unchanged, or changed. Only RRsets of the first and last
//! class need to be signed from scratch. For unchanged RRsets, the existing
//! signatures can be reused as long as they are still fresh enough.

use core::cmp::Ordering;
use core::fmt;

use std::collections::VecDeque;
use std::io;
use std::string::String;
use std::vec::Vec;

use tracing::trace;

use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::base::record::Record;

use super::directive::Directive;
use super::records::{ReaderItem, RecordSource, Rrset, RrsetReader};

//------------ Diff ----------------------------------------------------------

/// The classification of an RRset.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Diff {
    /// The RRset is only present in the new zone.
    New {
        rrset: Rrset,

        /// The signatures following the RRset in the new zone.
        signatures: Vec<Record>,
    },

    /// The RRset is only present in the signed zone.
    Removed {
        rrset: Rrset,

        /// The signatures of the RRset in the signed zone.
        signatures: Vec<Record>,
    },

    /// The RRset is present in both zones with the same content.
    Unchanged {
        /// The RRset as read from the new zone.
        rrset: Rrset,

        /// The signatures following the RRset in the new zone.
        signatures: Vec<Record>,

        /// The signatures of the RRset in the signed zone.
        signed: Vec<Record>,
    },

    /// The RRset is present in both zones but its content differs.
    Changed {
        /// The RRset as read from the new zone.
        rrset: Rrset,

        /// The signatures following the RRset in the new zone.
        signatures: Vec<Record>,

        /// The signatures of the RRset in the signed zone.
        signed: Vec<Record>,
    },
}

impl Diff {
    /// Returns the RRset.
    ///
    /// This is the RRset from the new zone unless it was removed.
    pub fn rrset(&self) -> &Rrset {
        match self {
            Diff::New { rrset, .. }
            | Diff::Removed { rrset, .. }
            | Diff::Unchanged { rrset, .. }
            | Diff::Changed { rrset, .. } => rrset,
        }
    }

    /// Returns the name of the class for logging.
    pub fn class(&self) -> DiffClass {
        match self {
            Diff::New { .. } => DiffClass::New,
            Diff::Removed { .. } => DiffClass::Removed,
            Diff::Unchanged { .. } => DiffClass::Unchanged,
            Diff::Changed { .. } => DiffClass::Changed,
        }
    }
}

//------------ DiffClass -----------------------------------------------------

/// The class of a [`Diff`] without its data.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DiffClass {
    New,
    Removed,
    Unchanged,
    Changed,
}

impl fmt::Display for DiffClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            DiffClass::New => "new",
            DiffClass::Removed => "removed",
            DiffClass::Unchanged => "unchanged",
            DiffClass::Changed => "changed",
        })
    }
}

//------------ DiffItem ------------------------------------------------------

/// An item produced by a [`MergeDiff`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DiffItem {
    /// A classified RRset.
    Rrset(Diff),

    /// A directive from the new zone.
    Directive(Directive),

    /// A comment line from the new zone.
    Text(String),
}

//------------ MergeDiff -----------------------------------------------------

/// Walks a new zone and its previously signed version side by side.
///
/// Directives and comments of the new zone are passed through in their
/// place: a directive is returned after the RRset before it and before the
/// RRset after it. Directives and comments in the signed zone are ignored.
///
/// The new zone is read one owner name at a time, so that whether there is
/// a delegation at a name is known before the first RRset at that name is
/// returned. See [`is_delegation`][Self::is_delegation].
pub struct MergeDiff<N, S> {
    new: RrsetReader<N>,
    signed: RrsetReader<S>,

    /// The items of the new zone up to the last RRset of the current owner.
    new_queue: VecDeque<NewItem>,

    /// The first RRset of the next owner in the new zone.
    new_held: Option<(Rrset, Vec<Record>)>,

    /// The current owner of the new zone if it has an NS RRset.
    new_delegation: Option<Name>,

    /// The next RRset of the new zone and its signatures.
    new_head: Option<(Rrset, Vec<Record>)>,

    /// The next RRset of the signed zone and its signatures.
    signed_head: Option<(Rrset, Vec<Record>)>,

    /// The new zone has been read completely.
    new_done: bool,

    /// The signed zone has been read completely.
    signed_done: bool,
}

/// An item of the new zone read ahead.
enum NewItem {
    Rrset(Rrset, Vec<Record>),
    Directive(Directive),
    Text(String),
}

impl<N: RecordSource, S: RecordSource> MergeDiff<N, S> {
    pub fn new(new: N, signed: S) -> Self {
        MergeDiff {
            new: RrsetReader::new(new, "new zone"),
            signed: RrsetReader::new(signed, "signed zone"),
            new_queue: VecDeque::new(),
            new_held: None,
            new_delegation: None,
            new_head: None,
            signed_head: None,
            new_done: false,
            signed_done: false,
        }
    }

    /// Returns whether the new zone has an NS RRset at `owner`.
    ///
    /// This is only known for the owner of the RRsets currently returned.
    pub fn is_delegation(&self, owner: &Name) -> bool {
        self.new_delegation.as_ref() == Some(owner)
    }

    /// Returns whether reading one of the zones has failed.
    ///
    /// Once this happens, the classification of the remaining RRsets is
    /// meaningless.
    pub fn has_failed(&self) -> bool {
        self.new.has_failed() || self.signed.has_failed()
    }

    /// Returns the next item or `None` once both zones are exhausted.
    pub fn next_item(&mut self) -> Option<DiffItem> {
        if self.new_head.is_none() && !self.new_done {
            if self.new_queue.is_empty() {
                self.read_owner();
            }
            match self.new_queue.pop_front() {
                Some(NewItem::Rrset(rrset, signatures)) => {
                    self.new_head = Some((rrset, signatures));
                }
                Some(NewItem::Directive(directive)) => {
                    return Some(DiffItem::Directive(directive))
                }
                Some(NewItem::Text(text)) => {
                    return Some(DiffItem::Text(text))
                }
                None => self.new_done = true,
            }
        }
        if self.signed_head.is_none() && !self.signed_done {
            match self.signed.next_rrset() {
                Some(rrset) => {
                    let signatures = self.signed.next_signatures(&rrset);
                    self.signed_head = Some((rrset, signatures));
                }
                None => self.signed_done = true,
            }
        }

        let order = match (&self.new_head, &self.signed_head) {
            (None, None) => return None,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some((new, _)), Some((signed, _))) => merge_cmp(new, signed),
        };
        let diff = match order {
            Ordering::Less => {
                let (rrset, signatures) = self.new_head.take()?;
                Diff::New { rrset, signatures }
            }
            Ordering::Greater => {
                let (rrset, signatures) = self.signed_head.take()?;
                Diff::Removed { rrset, signatures }
            }
            Ordering::Equal => {
                let (rrset, signatures) = self.new_head.take()?;
                let (signed_rrset, signed) = self.signed_head.take()?;
                if rrset.rtype() != Rtype::SOA && rrset == signed_rrset {
                    Diff::Unchanged {
                        rrset,
                        signatures,
                        signed,
                    }
                } else {
                    Diff::Changed {
                        rrset,
                        signatures,
                        signed,
                    }
                }
            }
        };
        trace!(
            "{} {} RRset at {}",
            diff.class(),
            diff.rrset().rtype(),
            diff.rrset().owner()
        );
        Some(DiffItem::Rrset(diff))
    }

    /// Reads the new zone up to and including the last RRset of the next
    /// owner name.
    fn read_owner(&mut self) {
        let mut owner = None;
        if let Some((rrset, signatures)) = self.new_held.take() {
            owner = Some(rrset.owner().clone());
            self.push_new_rrset(rrset, signatures);
        }
        while let Some(item) = self.new.next_item() {
            match item {
                ReaderItem::Rrset(rrset) => {
                    let signatures = self.new.next_signatures(&rrset);
                    if owner.is_none() {
                        owner = Some(rrset.owner().clone());
                    } else if owner.as_ref() != Some(rrset.owner()) {
                        self.new_held = Some((rrset, signatures));
                        break;
                    }
                    self.push_new_rrset(rrset, signatures);
                }
                ReaderItem::Directive(directive) => {
                    self.new_queue.push_back(NewItem::Directive(directive))
                }
                ReaderItem::Text(text) => {
                    self.new_queue.push_back(NewItem::Text(text))
                }
            }
        }
        self.new_delegation = self.new_queue.iter().find_map(|item| match item {
            NewItem::Rrset(rrset, _) if rrset.rtype() == Rtype::NS => {
                Some(rrset.owner().clone())
            }
            _ => None,
        });
    }

    fn push_new_rrset(&mut self, rrset: Rrset, signatures: Vec<Record>) {
        self.new_queue.push_back(NewItem::Rrset(rrset, signatures))
    }

    /// Takes a read error that ended one of the zones.
    pub fn take_failure(&mut self) -> Option<io::Error> {
        self.new
            .take_failure()
            .or_else(|| self.signed.take_failure())
    }
}

impl<N: RecordSource, S: RecordSource> Iterator for MergeDiff<N, S> {
    type Item = DiffItem;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_item()
    }
}

/// Compares the next RRsets of the two zones.
///
/// NSEC3 RRsets only compare normally against each other. Against any
/// other type, a new NSEC3 RRset sorts first and a signed NSEC3 RRset sorts
/// last, so that a change of the denial scheme replaces all denial records.
fn merge_cmp(new: &Rrset, signed: &Rrset) -> Ordering {
    match (new.rtype() == Rtype::NSEC3, signed.rtype() == Rtype::NSEC3) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => new.cmp_identity(signed),
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sign::test_util::*;
    use crate::zonefile::Zonefile;
    use pretty_assertions::assert_eq;

    fn classes(new: &str, signed: &str) -> Vec<String> {
        MergeDiff::new(
            Zonefile::new(new.as_bytes()),
            Zonefile::new(signed.as_bytes()),
        )
        .filter_map(|item| match item {
            DiffItem::Rrset(diff) => Some(format!(
                "{} {} {}",
                diff.class(),
                diff.rrset().owner(),
                diff.rrset().rtype()
            )),
            _ => None,
        })
        .collect()
    }

    #[test]
    fn removed_and_added() {
        let base = "example. 3600 IN SOA ns.example. host.example. \
                    1 3600 900 604800 300\n\
                    a.example. 300 IN A 192.0.2.1\n\
                    b.example. 300 IN A 192.0.2.2\n";
        let new = "example. 3600 IN SOA ns.example. host.example. \
                   1 3600 900 604800 300\n\
                   a.example. 300 IN A 192.0.2.1\n\
                   c.example. 300 IN A 192.0.2.3\n";
        assert_eq!(
            classes(new, base),
            [
                "changed example. SOA",
                "unchanged a.example. A",
                "removed b.example. A",
                "new c.example. A",
            ]
        );
    }

    #[test]
    fn changed_content_and_ttl() {
        let signed = "a.example. 300 IN A 192.0.2.1\n\
                      a.example. 300 IN TXT \"a\"\n";
        let new = "a.example. 300 IN A 192.0.2.9\n\
                   a.example. 600 IN TXT \"a\"\n";
        assert_eq!(
            classes(new, signed),
            [
                "changed a.example. A",
                "changed a.example. TXT",
            ]
        );
    }

    #[test]
    fn nsec3_is_always_new() {
        let signed = "a.example. 300 IN A 192.0.2.1\n\
                      a.example. 300 IN NSEC b.example. A RRSIG NSEC\n";
        let new = "a.example. 300 IN A 192.0.2.1\n\
                   h.example. 300 IN NSEC3 1 0 0 - J A\n";
        assert_eq!(
            classes(new, signed),
            [
                "unchanged a.example. A",
                "new h.example. NSEC3",
                "removed a.example. NSEC",
            ]
        );
    }

    #[test]
    fn signatures_travel_with_their_rrset() {
        let sig = mk_rrsig("a.example.", Rtype::A, 1, 2000);
        let zone = format!("a.example. 300 IN A 192.0.2.1\n{sig}\n");
        let mut diff = MergeDiff::new(
            Zonefile::new(":jitter 5\n".as_bytes()),
            Zonefile::new(zone.as_bytes()),
        );
        assert_eq!(
            diff.next_item(),
            Some(DiffItem::Directive(Directive::Jitter(5)))
        );
        match diff.next_item() {
            Some(DiffItem::Rrset(Diff::Removed { signatures, .. })) => {
                assert_eq!(signatures, [sig])
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(diff.next_item(), None);
    }

    #[test]
    fn delegation_known_before_first_rrset() {
        let new = "sub.example. 300 IN A 192.0.2.1\n\
                   :jitter 5\n\
                   sub.example. 300 IN NS ns.example.\n\
                   www.example. 300 IN A 192.0.2.2\n";
        let mut diff = MergeDiff::new(
            Zonefile::new(new.as_bytes()),
            Zonefile::new("".as_bytes()),
        );
        let sub = mk_name("sub.example.");
        let www = mk_name("www.example.");
        let next_rrset = |diff: &mut MergeDiff<_, _>| match diff.next_item() {
            Some(DiffItem::Rrset(item)) => item.rrset().clone(),
            other => panic!("expected RRset, got {other:?}"),
        };

        assert_eq!(next_rrset(&mut diff).rtype(), Rtype::A);
        assert!(diff.is_delegation(&sub));
        assert_eq!(
            diff.next_item(),
            Some(DiffItem::Directive(Directive::Jitter(5)))
        );
        assert_eq!(next_rrset(&mut diff).rtype(), Rtype::NS);
        assert!(diff.is_delegation(&sub));
        assert_eq!(next_rrset(&mut diff).owner(), &www);
        assert!(!diff.is_delegation(&www));
        assert!(!diff.is_delegation(&sub));
        assert_eq!(diff.next_item(), None);
        assert!(!diff.has_failed());
    }
}
