//! Basics.
//!
//! This module provides the fundamental types for working with DNS data in
//! the re-signer: domain names, the IANA-assigned values for record types,
//! classes, and security algorithms, time-to-live values, serial numbers,
//! and resource records.
//!
//! Types are arranged in submodules. The most important types are
//! re-exported here:
//!
//! * [name](name/index.html) for domain names,
//! * [iana](iana/index.html) for IANA-assigned values,
//! * [record](record/index.html) for resource records,
//! * [serial](serial/index.html) for RFC 1982 serial numbers, and
//! * [ttl](ttl/index.html) for time-to-live values.
//!
//! The [cmp](cmp/index.html) module defines the [`CanonicalOrd`] trait for
//! the DNSSEC canonical ordering.

pub use self::cmp::CanonicalOrd;
pub use self::iana::{Class, Rtype, SecAlg};
pub use self::name::Name;
pub use self::record::Record;
pub use self::serial::Serial;
pub use self::ttl::Ttl;

pub mod cmp;
pub mod iana;
pub mod name;
pub mod record;
pub mod serial;
pub mod ttl;
