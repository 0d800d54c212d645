//! Incremental re-signing of DNSSEC zones.
//!
//! This crate takes a newly generated zone and the previously signed
//! version of the same zone and produces a new signed zone, creating only
//! those signatures that are actually missing or about to expire. Signing
//! itself is left to a key store, typically an HSM, that is used through
//! the [`KeyStore`][sign::KeyStore] trait.
//!
//! # Modules
//!
//! * [base] contains the fundamental types for DNS data such as domain
//!   names, record types, serial numbers, and resource records,
//! * [rdata] contains the record data types the signer needs to look
//!   into,
//! * [zonefile] reads zones in the line-oriented presentation format
//!   used for the signer’s input and output,
//! * [sign] contains the re-signing pipeline itself, and
//! * [logging] helps setting up diagnostic output.
//!
//! # Reference of Feature Flags
//!
//! * `serde`: Enables serde serialization for a number of basic types as
//!   well as the signing configuration and run statistics.

#![allow(renamed_and_removed_lints)]
#![allow(clippy::unknown_clippy_lints)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod base;
pub mod logging;
pub mod rdata;
pub mod sign;
pub mod zonefile;
