//! Resource record data.
//!
//! The re-signing pipeline only needs to look into the record data of a few
//! record types: it rewrites fields of the SOA record and it reads the
//! fields of RRSIG records in order to decide whether a signature can be
//! reused. These two types have their own structured representation,
//! [`Soa`] and [`Rrsig`]. The data of all other record types is carried as
//! opaque [`Generic`] data in presentation format.

use core::fmt;

use crate::base::iana::Rtype;
use crate::base::name::NameError;

pub use self::generic::Generic;
pub use self::rrsig::Rrsig;
pub use self::soa::Soa;

pub mod generic;
pub mod rrsig;
pub mod soa;

//------------ RecordData ----------------------------------------------------

/// The data of a resource record.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum RecordData {
    /// The data of an SOA record.
    Soa(Soa),

    /// The data of an RRSIG record.
    Rrsig(Rrsig),

    /// The data of any other record type.
    Generic(Generic),
}

impl RecordData {
    /// Scans record data of the given type from presentation format tokens.
    pub fn scan(rtype: Rtype, tokens: &[&str]) -> Result<Self, RdataError> {
        match rtype {
            Rtype::SOA => Soa::scan(tokens).map(RecordData::Soa),
            Rtype::RRSIG => Rrsig::scan(tokens).map(RecordData::Rrsig),
            _ => Generic::scan(rtype, tokens).map(RecordData::Generic),
        }
    }

    /// Returns the record type of the data.
    #[must_use]
    pub fn rtype(&self) -> Rtype {
        match self {
            RecordData::Soa(_) => Rtype::SOA,
            RecordData::Rrsig(_) => Rtype::RRSIG,
            RecordData::Generic(data) => data.rtype(),
        }
    }

    /// Returns the RRSIG data if this is an RRSIG record.
    #[must_use]
    pub fn as_rrsig(&self) -> Option<&Rrsig> {
        match self {
            RecordData::Rrsig(rrsig) => Some(rrsig),
            _ => None,
        }
    }

    /// Returns the SOA data if this is an SOA record.
    #[must_use]
    pub fn as_soa(&self) -> Option<&Soa> {
        match self {
            RecordData::Soa(soa) => Some(soa),
            _ => None,
        }
    }
}

//--- From

impl From<Soa> for RecordData {
    fn from(soa: Soa) -> Self {
        RecordData::Soa(soa)
    }
}

impl From<Rrsig> for RecordData {
    fn from(rrsig: Rrsig) -> Self {
        RecordData::Rrsig(rrsig)
    }
}

impl From<Generic> for RecordData {
    fn from(data: Generic) -> Self {
        RecordData::Generic(data)
    }
}

//--- Display

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecordData::Soa(soa) => soa.fmt(f),
            RecordData::Rrsig(rrsig) => rrsig.fmt(f),
            RecordData::Generic(data) => data.fmt(f),
        }
    }
}

//------------ RdataError ----------------------------------------------------

/// Record data could not be scanned from its presentation format.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RdataError {
    /// The record data had the wrong number of fields.
    FieldCount {
        /// The number of fields expected.
        expected: usize,

        /// The number of fields found.
        found: usize,
    },

    /// A domain name field was invalid.
    Name(NameError),

    /// An integer field was invalid.
    Number(&'static str),

    /// A time field was invalid.
    Time(&'static str),

    /// The record type covered by an RRSIG was unknown.
    Rtype,

    /// The algorithm of an RRSIG was unknown.
    Algorithm,

    /// The signature was not valid Base 64.
    Base64,
}

impl From<NameError> for RdataError {
    fn from(err: NameError) -> Self {
        RdataError::Name(err)
    }
}

impl fmt::Display for RdataError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RdataError::FieldCount { expected, found } => {
                write!(f, "expected {expected} fields, found {found}")
            }
            RdataError::Name(err) => write!(f, "invalid name: {err}"),
            RdataError::Number(field) => write!(f, "invalid {field}"),
            RdataError::Time(field) => write!(f, "invalid {field} time"),
            RdataError::Rtype => f.write_str("unknown record type"),
            RdataError::Algorithm => f.write_str("unknown algorithm"),
            RdataError::Base64 => f.write_str("invalid Base 64 signature"),
        }
    }
}

impl std::error::Error for RdataError {}
