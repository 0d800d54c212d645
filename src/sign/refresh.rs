//! Deciding which existing signatures can be reused.
//!
//! When a zone is signed again, most of its signatures are still good. A
//! signature is reused unless it expires before the refresh time. Reusing
//! a signature means that the key that made it doesn’t need to sign the
//! RRset again, so the key is disabled for the RRset.

use core::cmp::Ordering;

use std::collections::HashSet;
use std::vec::Vec;

use tracing::trace;

use crate::base::iana::{Rtype, SecAlg};
use crate::base::record::Record;

use super::config::PipelineConfig;
use super::keys::KeySet;

//------------ Evaluation ----------------------------------------------------

/// The outcome of evaluating the existing signatures of an RRset.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Evaluation {
    /// The signatures to be kept.
    pub reused: Vec<Record>,

    /// The number of signatures that were dropped.
    pub dropped: usize,
}

//------------ evaluate ------------------------------------------------------

/// Evaluates the existing signatures of an RRset.
///
/// Signatures earlier in `signatures` take precedence over later ones made
/// by the same key. For every signature kept, the key that made it is
/// disabled in `keys`.
///
/// Signatures over an SOA RRset are never kept since the SOA record is
/// rewritten on every run.
pub fn evaluate<H>(
    signatures: impl IntoIterator<Item = Record>,
    keys: &mut KeySet<H>,
    config: &PipelineConfig,
) -> Evaluation {
    let mut res = Evaluation::default();
    let mut seen: HashSet<(u16, SecAlg)> = HashSet::new();
    for record in signatures {
        let Some(rrsig) = record.data().as_rrsig() else {
            res.dropped += 1;
            continue;
        };
        let covered = rrsig.type_covered();
        if covered == Rtype::SOA {
            trace!("Dropping SOA signature of key {}", rrsig.key_tag());
            res.dropped += 1;
            continue;
        }
        let refresh = config.refresh_for(covered);
        match rrsig.expiration().partial_cmp(&refresh) {
            Some(Ordering::Equal | Ordering::Greater) => {}
            _ => {
                trace!(
                    "Signature of key {} over {} {} expires at {}, \
                     refreshing",
                    rrsig.key_tag(),
                    record.owner(),
                    covered,
                    rrsig.expiration()
                );
                res.dropped += 1;
                continue;
            }
        }
        if !seen.insert((rrsig.key_tag(), rrsig.algorithm())) {
            trace!("Dropping duplicate signature of key {}", rrsig.key_tag());
            res.dropped += 1;
            continue;
        }
        keys.disable_signer_of(rrsig);
        res.reused.push(record);
    }
    res
}

//============ Testing =======================================================
