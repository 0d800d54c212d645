//! Resource Records.
//!
//! This module defines the type [`Record`] that represents a single resource
//! record as read from or written to a zone in presentation format.

use core::fmt;

use super::iana::{Class, Rtype};
use super::name::Name;
use super::ttl::Ttl;
use crate::rdata::RecordData;

//------------ Record --------------------------------------------------------

/// A DNS resource record.
///
/// The record type is not stored separately. It is derived from the record
/// data, since the two are inseparably entwined.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Record {
    /// The owner of the record.
    owner: Name,

    /// The class of the record.
    class: Class,

    /// The time-to-live value of the record.
    ttl: Ttl,

    /// The record data. The value also specifies the record’s type.
    data: RecordData,
}

/// # Creation and Element Access
///
impl Record {
    /// Creates a new record from its parts.
    pub fn new(
        owner: Name,
        class: Class,
        ttl: Ttl,
        data: impl Into<RecordData>,
    ) -> Self {
        Record {
            owner,
            class,
            ttl,
            data: data.into(),
        }
    }

    /// Returns a reference to the owner domain name.
    pub fn owner(&self) -> &Name {
        &self.owner
    }

    /// Returns the record type.
    pub fn rtype(&self) -> Rtype {
        self.data.rtype()
    }

    /// Returns the record class.
    pub fn class(&self) -> Class {
        self.class
    }

    /// Returns the record’s time-to-live.
    pub fn ttl(&self) -> Ttl {
        self.ttl
    }

    /// Sets the record’s time-to-live.
    pub fn set_ttl(&mut self, ttl: Ttl) {
        self.ttl = ttl
    }

    /// Return a reference to the record data.
    pub fn data(&self) -> &RecordData {
        &self.data
    }

    /// Returns a mutable reference to the record data.
    pub fn data_mut(&mut self) -> &mut RecordData {
        &mut self.data
    }

    /// Trades the record for its record data.
    pub fn into_data(self) -> RecordData {
        self.data
    }
}

//--- Display

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.owner,
            self.ttl.as_secs(),
            self.class,
            self.data.rtype(),
            self.data
        )
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::rdata::Generic;
    use core::str::FromStr;

    #[test]
    fn display() {
        let record = Record::new(
            Name::from_str("www.example.").unwrap(),
            Class::IN,
            Ttl::from_secs(300),
            Generic::new(Rtype::A, "192.0.2.1"),
        );
        assert_eq!(record.rtype(), Rtype::A);
        assert_eq!(record.to_string(), "www.example. 300 IN A 192.0.2.1");
    }
}
