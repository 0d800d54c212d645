//! Incremental DNSSEC signing.
//!
//! Signing a large zone from scratch is expensive, yet between two versions
//! of a zone most RRsets and most of their signatures stay the same. The
//! types in this module re-sign a zone by comparing the new, unsigned
//! version against the previously signed one:
//!
//! * RRsets that did not change keep their signatures as long as these
//!   don’t expire too soon (see [refresh]),
//! * RRsets that are new or changed are signed by every key, and
//! * signatures of removed RRsets are dropped.
//!
//! The [`Pipeline`] puts it all together. It walks both zones in a merge
//! join (see [diff]), hands signing work to a pool of worker threads that
//! talk to a [`KeyStore`] (see [dispatch]), and writes the signed zone
//! through a reorder buffer (see [reorder]) so that the output is in the
//! same order as the input no matter in which order signatures are made.
//!
//! The behaviour is controlled through a [`PipelineConfig`] and through
//! [directives][directive] embedded in the new zone.
//!
//! ```no_run
//! use std::io;
//! use std::sync::Arc;
//! use domain_resign::sign::{KeyStore, Pipeline, PipelineConfig};
//! use domain_resign::sign::reorder::PresentationSink;
//! use domain_resign::zonefile::Zonefile;
//!
//! fn resign<S: KeyStore + 'static>(store: S) -> Result<(), Box<dyn std::error::Error>> {
//!     let new = Zonefile::new(io::BufReader::new(std::fs::File::open("zone")?));
//!     let signed = Zonefile::new(io::BufReader::new(std::fs::File::open("zone.signed")?));
//!     let sink = PresentationSink::new(io::BufWriter::new(
//!         std::fs::File::create("zone.signed.new")?,
//!     ));
//!     let (_, stats) = Pipeline::new(Arc::new(store), PipelineConfig::default())
//!         .run(new, signed, sink)?;
//!     println!("{stats}");
//!     Ok(())
//! }
//! ```

pub use self::config::PipelineConfig;
pub use self::directive::Directive;
pub use self::error::{ErrorKind, KeyStoreError, ResignError, SignError};
pub use self::keys::{KeyInfo, KeyStore, SignParams};
pub use self::pipeline::{Pipeline, RunStats};
pub use self::records::{RecordSource, Rrset, RrsetReader};
pub use self::reorder::{OutputEntry, OutputSink, Payload};

pub mod config;
pub mod diff;
pub mod directive;
pub mod dispatch;
pub mod error;
pub mod keys;
pub mod pipeline;
pub mod records;
pub mod refresh;
pub mod reorder;

#[cfg(test)]
pub(crate) mod test_util;
